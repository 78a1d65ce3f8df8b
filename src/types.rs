use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::decimal::Money;

/// identifier of a ledger row, assigned in increasing order by the ledger
pub type PaymentId = u64;

/// a single fee payment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub id: PaymentId,
    /// member code, resolved by lookup only
    pub code: String,
    pub date: NaiveDate,
    pub amount: Money,
}

/// outstanding balance of one member at a given date
///
/// Derived on demand from the registry and ledger. It goes stale as soon as a
/// payment is recorded or the calculation date crosses a month boundary, so
/// it is never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DueSnapshot {
    pub code: String,
    pub as_of: NaiveDate,
    /// months billed after the pre-admission policy is applied
    pub billed_months: i64,
    pub total_billed: Money,
    pub total_paid: Money,
    pub outstanding: Money,
}

impl DueSnapshot {
    /// snapshot for a code with nothing billed and nothing paid
    pub fn empty(code: &str, as_of: NaiveDate) -> Self {
        Self {
            code: code.to_string(),
            as_of,
            billed_months: 0,
            total_billed: Money::ZERO,
            total_paid: Money::ZERO,
            outstanding: Money::ZERO,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.outstanding.is_positive()
    }

    pub fn is_overpaid(&self) -> bool {
        self.outstanding.is_negative()
    }
}
