use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::types::PaymentId;

/// notifications emitted by registry and ledger writes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    MemberRegistered {
        code: String,
        admission_date: NaiveDate,
        monthly_fee: Money,
        timestamp: DateTime<Utc>,
    },
    PaymentRecorded {
        payment_id: PaymentId,
        code: String,
        amount: Money,
        date: NaiveDate,
        timestamp: DateTime<Utc>,
    },
}

/// event store for collecting events during operations
#[derive(Debug, Default)]
pub struct EventStore {
    events: Vec<Event>,
}

impl EventStore {
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
        }
    }

    pub fn emit(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }
}
