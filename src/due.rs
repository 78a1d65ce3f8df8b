use chrono::{Datelike, NaiveDate};
use tracing::{debug, warn};

use crate::config::{DuePolicy, PreAdmissionPolicy, UnknownMemberPolicy};
use crate::decimal::Money;
use crate::errors::{LedgerError, Result};
use crate::member::Member;
use crate::types::{DueSnapshot, PaymentRecord};

/// raw count of billed months: the admission month is month 1 and every
/// calendar-month boundary after it adds one, whatever the day of month
pub fn billed_months(admission_date: NaiveDate, as_of: NaiveDate) -> i64 {
    let years = as_of.year() as i64 - admission_date.year() as i64;
    let months = as_of.month() as i64 - admission_date.month() as i64;
    years * 12 + months + 1
}

/// sum of payment amounts
pub fn total_paid(payments: &[PaymentRecord]) -> Result<Money> {
    Money::checked_sum(payments.iter().map(|p| p.amount)).ok_or_else(|| overflow("total paid"))
}

fn overflow(what: impl Into<String>) -> LedgerError {
    LedgerError::Overflow { what: what.into() }
}

/// stateless due calculator
#[derive(Debug, Clone, Copy, Default)]
pub struct DueCalculator {
    policy: DuePolicy,
}

impl DueCalculator {
    pub fn new(policy: DuePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> DuePolicy {
        self.policy
    }

    /// billed months after the pre-admission policy
    pub fn effective_billed_months(&self, admission_date: NaiveDate, as_of: NaiveDate) -> i64 {
        let raw = billed_months(admission_date, as_of);
        match self.policy.pre_admission {
            PreAdmissionPolicy::ClampToOneMonth => raw.max(1),
            PreAdmissionPolicy::Propagate => raw,
        }
    }

    /// full breakdown for a known member
    ///
    /// Payments carrying a different code are ignored, so a whole-ledger
    /// slice can be passed safely. Payments dated after `as_of` still count.
    /// Amounts loaded from a store are not range-checked, so every step is
    /// checked and overflow comes back as `LedgerError::Overflow`.
    pub fn snapshot(&self, member: &Member, payments: &[PaymentRecord], as_of: NaiveDate) -> Result<DueSnapshot> {
        let months = self.effective_billed_months(member.admission_date, as_of);
        let total_billed = member
            .monthly_fee
            .checked_times(months)
            .ok_or_else(|| overflow(format!("amount billed to {}", member.code)))?;
        let total_paid = Money::checked_sum(
            payments
                .iter()
                .filter(|p| p.code == member.code)
                .map(|p| p.amount),
        )
        .ok_or_else(|| overflow(format!("amount paid by {}", member.code)))?;
        let outstanding = total_billed
            .checked_sub(total_paid)
            .ok_or_else(|| overflow(format!("due for {}", member.code)))?;

        debug!(
            code = %member.code,
            %as_of,
            billed_months = months,
            %total_billed,
            %total_paid,
            %outstanding,
            "due calculated"
        );

        Ok(DueSnapshot {
            code: member.code.clone(),
            as_of,
            billed_months: months,
            total_billed,
            total_paid,
            outstanding,
        })
    }

    /// breakdown for a code that may not resolve to a member
    pub fn due_snapshot(
        &self,
        code: &str,
        member: Option<&Member>,
        payments: &[PaymentRecord],
        as_of: NaiveDate,
    ) -> Result<DueSnapshot> {
        match member {
            Some(member) => self.snapshot(member, payments, as_of),
            None => match self.policy.unknown_member {
                UnknownMemberPolicy::ZeroDue => {
                    warn!(code, "due requested for unknown member, reporting zero");
                    Ok(DueSnapshot::empty(code, as_of))
                }
                UnknownMemberPolicy::Strict => Err(LedgerError::InvalidMember {
                    code: code.to_string(),
                }),
            },
        }
    }

    /// outstanding amount; negative when the member has overpaid
    pub fn calculate_due(
        &self,
        code: &str,
        member: Option<&Member>,
        payments: &[PaymentRecord],
        as_of: NaiveDate,
    ) -> Result<Money> {
        Ok(self.due_snapshot(code, member, payments, as_of)?.outstanding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn member() -> Member {
        Member::new("A1", "Name", "G", "Addr", "123", date(2024, 1, 15), Money::from_major(200)).unwrap()
    }

    fn payment(id: u64, d: NaiveDate, amount: i64) -> PaymentRecord {
        PaymentRecord {
            id,
            code: "A1".to_string(),
            date: d,
            amount: Money::from_major(amount),
        }
    }

    #[test]
    fn test_billed_months_ignores_day_of_month() {
        assert_eq!(billed_months(date(2024, 1, 15), date(2024, 3, 20)), 3);
        assert_eq!(billed_months(date(2024, 1, 31), date(2024, 2, 1)), 2);
        assert_eq!(billed_months(date(2024, 1, 15), date(2024, 1, 15)), 1);
        assert_eq!(billed_months(date(2023, 11, 5), date(2024, 2, 5)), 4);
    }

    #[test]
    fn test_billed_months_before_admission() {
        assert_eq!(billed_months(date(2024, 3, 1), date(2024, 2, 28)), 0);
        assert_eq!(billed_months(date(2024, 3, 1), date(2023, 12, 1)), -2);
    }

    #[test]
    fn test_no_payments() {
        let calc = DueCalculator::default();
        let snap = calc.snapshot(&member(), &[], date(2024, 3, 20)).unwrap();
        assert_eq!(snap.billed_months, 3);
        assert_eq!(snap.total_billed, Money::from_major(600));
        assert_eq!(snap.outstanding, Money::from_major(600));
        assert!(snap.is_pending());
    }

    #[test]
    fn test_partial_payment() {
        let calc = DueCalculator::default();
        let due = calc
            .calculate_due("A1", Some(&member()), &[payment(1, date(2024, 2, 1), 500)], date(2024, 3, 20))
            .unwrap();
        assert_eq!(due, Money::from_major(100));
    }

    #[test]
    fn test_overpayment_goes_negative() {
        let calc = DueCalculator::default();
        let payments = [payment(1, date(2024, 2, 1), 500), payment(2, date(2024, 3, 1), 200)];
        let snap = calc.snapshot(&member(), &payments, date(2024, 3, 20)).unwrap();
        assert_eq!(snap.outstanding, Money::from_major(-100));
        assert!(snap.is_overpaid());
    }

    #[test]
    fn test_foreign_payments_ignored() {
        let calc = DueCalculator::default();
        let mut other = payment(2, date(2024, 2, 1), 300);
        other.code = "B2".to_string();
        let snap = calc
            .snapshot(&member(), &[payment(1, date(2024, 2, 1), 100), other], date(2024, 3, 20))
            .unwrap();
        assert_eq!(snap.total_paid, Money::from_major(100));
    }

    #[test]
    fn test_unknown_member_lenient() {
        let calc = DueCalculator::default();
        let due = calc.calculate_due("ghost", None, &[], date(2024, 3, 20)).unwrap();
        assert_eq!(due, Money::ZERO);
    }

    #[test]
    fn test_unknown_member_strict() {
        let calc = DueCalculator::new(DuePolicy {
            unknown_member: UnknownMemberPolicy::Strict,
            pre_admission: PreAdmissionPolicy::ClampToOneMonth,
        });
        let err = calc.calculate_due("ghost", None, &[], date(2024, 3, 20)).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidMember { code } if code == "ghost"));
    }

    #[test]
    fn test_pre_admission_policies() {
        let clamp = DueCalculator::default();
        let snap = clamp.snapshot(&member(), &[], date(2023, 11, 1)).unwrap();
        assert_eq!(snap.billed_months, 1);
        assert_eq!(snap.outstanding, Money::from_major(200));

        let raw = DueCalculator::new(DuePolicy {
            unknown_member: UnknownMemberPolicy::ZeroDue,
            pre_admission: PreAdmissionPolicy::Propagate,
        });
        let snap = raw.snapshot(&member(), &[], date(2023, 11, 1)).unwrap();
        assert_eq!(snap.billed_months, -1);
        assert_eq!(snap.outstanding, Money::from_major(-200));
    }

    #[test]
    fn test_total_paid() {
        let payments = [payment(1, date(2024, 1, 1), 50), payment(2, date(2024, 1, 2), 75)];
        assert_eq!(total_paid(&payments).unwrap(), Money::from_major(125));
        assert_eq!(total_paid(&[]).unwrap(), Money::ZERO);
    }

    #[test]
    fn test_huge_fee_overflows_without_panic() {
        // bypasses validation the way a hand-edited store row would
        let mut m = member();
        m.monthly_fee = Money::from_str_exact("79228162514264337593543950335").unwrap();
        let calc = DueCalculator::default();

        let err = calc.snapshot(&m, &[], date(2024, 3, 20)).unwrap_err();
        assert!(matches!(err, LedgerError::Overflow { .. }));
        assert!(matches!(
            calc.calculate_due("A1", Some(&m), &[], date(2024, 3, 20)),
            Err(LedgerError::Overflow { .. })
        ));

        // a single billed month still fits
        assert_eq!(calc.snapshot(&m, &[], date(2024, 1, 20)).unwrap().total_billed, m.monthly_fee);
    }

    #[test]
    fn test_huge_payments_overflow_without_panic() {
        let mut big = payment(1, date(2024, 2, 1), 0);
        big.amount = Money::from_str_exact("79228162514264337593543950335").unwrap();
        let payments = [big.clone(), PaymentRecord { id: 2, ..big }];

        assert!(matches!(total_paid(&payments), Err(LedgerError::Overflow { .. })));
        assert!(matches!(
            DueCalculator::default().snapshot(&member(), &payments, date(2024, 3, 20)),
            Err(LedgerError::Overflow { .. })
        ));
    }
}
