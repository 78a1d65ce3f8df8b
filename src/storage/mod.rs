pub mod memory;
pub mod sqlite;

use crate::errors::Result;
use crate::member::Member;
use crate::types::{PaymentId, PaymentRecord};

pub use memory::InMemoryStore;
pub use sqlite::SqliteStore;

/// persistence for member records, keyed by code
pub trait MemberStore {
    /// all members in insertion order
    fn load_all_members(&self) -> Result<Vec<Member>>;

    fn load_member(&self, code: &str) -> Result<Option<Member>>;

    /// insert or replace the member stored under `member.code`
    fn save_member(&mut self, member: &Member) -> Result<()>;
}

/// append-only persistence for payment rows
pub trait PaymentStore {
    /// payments for one code in insertion order
    fn load_payments(&self, code: &str) -> Result<Vec<PaymentRecord>>;

    /// every payment in insertion order
    fn load_all_payments(&self) -> Result<Vec<PaymentRecord>>;

    fn append_payment(&mut self, record: &PaymentRecord) -> Result<()>;

    /// id the next appended payment should carry
    fn next_payment_id(&self) -> Result<PaymentId>;

    fn payment_count(&self) -> Result<usize>;
}

/// a storage handle that backs both the registry and the ledger
pub trait Storage: MemberStore + PaymentStore {}

impl<T: MemberStore + PaymentStore> Storage for T {}
