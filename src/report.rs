use std::collections::HashMap;

use chrono::NaiveDate;
use hourglass_rs::{SafeTimeProvider, TimeSource};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::decimal::Money;
use crate::due::DueCalculator;
use crate::errors::{LedgerError, Result};
use crate::ledger::sort_payments;
use crate::library::Library;
use crate::member::Member;
use crate::storage::Storage;
use crate::types::{DueSnapshot, PaymentRecord};

/// one report line; field order is the export column order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRow {
    pub code: String,
    pub name: String,
    pub guardian_name: String,
    pub address: String,
    pub contact: String,
    pub admission_date: NaiveDate,
    pub monthly_fee: Money,
    pub due: Money,
}

impl ReportRow {
    pub fn new(member: &Member, due: Money) -> Self {
        Self {
            code: member.code.clone(),
            name: member.name.clone(),
            guardian_name: member.guardian_name.clone(),
            address: member.address.clone(),
            contact: member.contact.clone(),
            admission_date: member.admission_date,
            monthly_fee: member.monthly_fee,
            due,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.due.is_positive()
    }
}

/// dues for every member at one date, in registry order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub as_of: NaiveDate,
    pub rows: Vec<ReportRow>,
}

impl Report {
    /// join members with their payments; pure over the given snapshot
    pub fn build(
        members: &[Member],
        payments: &[PaymentRecord],
        calculator: &DueCalculator,
        as_of: NaiveDate,
    ) -> Result<Self> {
        let mut by_code: HashMap<&str, Vec<PaymentRecord>> = HashMap::new();
        for payment in payments {
            by_code.entry(payment.code.as_str()).or_default().push(payment.clone());
        }

        let rows = members
            .iter()
            .map(|member| {
                let member_payments = by_code
                    .get(member.code.as_str())
                    .map(Vec::as_slice)
                    .unwrap_or(&[]);
                let snapshot = calculator.snapshot(member, member_payments, as_of)?;
                Ok(ReportRow::new(member, snapshot.outstanding))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { as_of, rows })
    }

    /// rows with a positive due, same order and values
    pub fn pending_dues(&self) -> Report {
        Report {
            as_of: self.as_of,
            rows: filter_pending_dues(&self.rows),
        }
    }

    /// sum of positive dues; overpayments do not offset other members
    pub fn total_outstanding(&self) -> Result<Money> {
        Money::checked_sum(self.rows.iter().filter(|r| r.is_pending()).map(|r| r.due)).ok_or_else(|| {
            LedgerError::Overflow {
                what: "report total".to_string(),
            }
        })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// keep rows whose due is greater than zero
pub fn filter_pending_dues(rows: &[ReportRow]) -> Vec<ReportRow> {
    rows.iter().filter(|r| r.is_pending()).cloned().collect()
}

/// everything shown on a member lookup: details, due and history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberStatement {
    pub member: Member,
    pub due: DueSnapshot,
    pub payments: Vec<PaymentRecord>,
}

impl<S: Storage> Library<S> {
    /// due for a code as of today
    pub fn calculate_due(&self, code: &str, time_provider: &SafeTimeProvider) -> Result<Money> {
        self.calculate_due_on(code, time_provider.now().date_naive())
    }

    pub fn calculate_due_now(&self, code: &str) -> Result<Money> {
        let time = SafeTimeProvider::new(TimeSource::System);
        self.calculate_due(code, &time)
    }

    /// due for a code as of a date; unknown codes follow the configured policy
    pub fn calculate_due_on(&self, code: &str, as_of: NaiveDate) -> Result<Money> {
        Ok(self.due_snapshot_on(code, as_of)?.outstanding)
    }

    pub fn due_snapshot_on(&self, code: &str, as_of: NaiveDate) -> Result<DueSnapshot> {
        let code = code.trim();
        let member = self.store.load_member(code)?;
        let payments = match member {
            Some(_) => self.store.load_payments(code)?,
            None => Vec::new(),
        };
        self.calculator.due_snapshot(code, member.as_ref(), &payments, as_of)
    }

    /// member details, due and payment history in one lookup
    pub fn member_statement(&self, code: &str, as_of: NaiveDate) -> Result<MemberStatement> {
        let member = self.get_member(code)?;
        let mut payments = self.store.load_payments(&member.code)?;
        let due = self.calculator.snapshot(&member, &payments, as_of)?;
        sort_payments(&mut payments);
        Ok(MemberStatement { member, due, payments })
    }

    /// report as of today
    pub fn build_report(&self, time_provider: &SafeTimeProvider) -> Result<Report> {
        self.build_report_on(time_provider.now().date_naive())
    }

    pub fn build_report_now(&self) -> Result<Report> {
        let time = SafeTimeProvider::new(TimeSource::System);
        self.build_report(&time)
    }

    pub fn build_report_on(&self, as_of: NaiveDate) -> Result<Report> {
        let members = self.store.load_all_members()?;
        let payments = self.store.load_all_payments()?;
        let report = Report::build(&members, &payments, &self.calculator, as_of)?;
        let total_outstanding = report.total_outstanding()?;

        info!(
            %as_of,
            members = report.len(),
            pending = report.pending_dues().len(),
            %total_outstanding,
            "report built"
        );
        Ok(report)
    }
}
