pub mod config;
pub mod decimal;
pub mod due;
pub mod errors;
pub mod events;
pub mod export;
pub mod ledger;
pub mod library;
pub mod member;
pub mod registry;
pub mod report;
pub mod storage;
pub mod types;

// re-export key types
pub use config::{DuePolicy, FeeLimits, LedgerConfig, PreAdmissionPolicy, UnknownMemberPolicy};
pub use decimal::Money;
pub use due::{billed_months, DueCalculator};
pub use errors::{LedgerError, Result};
pub use events::{Event, EventStore};
pub use export::{ExportFormat, REPORT_COLUMNS};
pub use library::Library;
pub use member::{Member, MemberBuilder};
pub use report::{filter_pending_dues, MemberStatement, Report, ReportRow};
pub use storage::{InMemoryStore, MemberStore, PaymentStore, SqliteStore, Storage};
pub use types::{DueSnapshot, PaymentId, PaymentRecord};

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
