use chrono::NaiveDate;
use hourglass_rs::{SafeTimeProvider, TimeSource};
use tracing::{info, warn};

use crate::decimal::Money;
use crate::errors::{LedgerError, Result};
use crate::events::Event;
use crate::library::Library;
use crate::storage::Storage;
use crate::types::PaymentRecord;

/// order payments by date, keeping insertion order within a day
pub fn sort_payments(payments: &mut [PaymentRecord]) {
    // stable sort, input is in insertion order
    payments.sort_by_key(|p| p.date);
}

impl<S: Storage> Library<S> {
    /// record a payment dated today, using system time
    pub fn record_payment_now(&mut self, code: &str, amount: Money) -> Result<PaymentRecord> {
        let time = SafeTimeProvider::new(TimeSource::System);
        self.record_payment(code, amount, &time)
    }

    /// record a payment dated today
    pub fn record_payment(
        &mut self,
        code: &str,
        amount: Money,
        time_provider: &SafeTimeProvider,
    ) -> Result<PaymentRecord> {
        let today = time_provider.now().date_naive();
        self.record_payment_on(code, amount, today, time_provider)
    }

    /// append a payment with an explicit date
    ///
    /// Checks run in order: the code must resolve to a member, the amount
    /// must be positive and within range, then the configured minimum applies. A rejected
    /// payment leaves the ledger untouched.
    pub fn record_payment_on(
        &mut self,
        code: &str,
        amount: Money,
        date: NaiveDate,
        time_provider: &SafeTimeProvider,
    ) -> Result<PaymentRecord> {
        let code = code.trim();

        if self.store.load_member(code)?.is_none() {
            warn!(code, %amount, "payment for unknown member rejected");
            return Err(LedgerError::InvalidMember {
                code: code.to_string(),
            });
        }

        if !amount.is_positive() {
            warn!(code, %amount, "non-positive payment rejected");
            return Err(LedgerError::InvalidAmount { amount });
        }
        if !amount.is_within_limit() {
            warn!(code, %amount, "oversized payment rejected");
            return Err(LedgerError::AmountTooLarge {
                amount,
                maximum: Money::MAX_AMOUNT,
            });
        }

        if let Some(minimum) = self.config.limits.minimum_payment {
            if amount < minimum {
                return Err(LedgerError::PaymentBelowMinimum {
                    minimum,
                    provided: amount,
                });
            }
        }

        let record = PaymentRecord {
            id: self.store.next_payment_id()?,
            code: code.to_string(),
            date,
            amount,
        };
        self.store.append_payment(&record)?;

        info!(payment_id = record.id, code, %amount, %date, "payment recorded");
        self.events.emit(Event::PaymentRecorded {
            payment_id: record.id,
            code: record.code.clone(),
            amount,
            date,
            timestamp: time_provider.now(),
        });

        Ok(record)
    }

    /// payments for a code by date ascending; empty for unknown codes
    pub fn get_payments(&self, code: &str) -> Result<Vec<PaymentRecord>> {
        let mut payments = self.store.load_payments(code.trim())?;
        sort_payments(&mut payments);
        Ok(payments)
    }

    pub fn total_paid(&self, code: &str) -> Result<Money> {
        crate::due::total_paid(&self.store.load_payments(code.trim())?)
    }

    /// number of rows in the whole ledger
    pub fn ledger_len(&self) -> Result<usize> {
        self.store.payment_count()
    }
}
