use thiserror::Error;

use crate::decimal::Money;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("member code already registered: {code}")]
    DuplicateCode {
        code: String,
    },

    #[error("no member registered under code: {code}")]
    InvalidMember {
        code: String,
    },

    #[error("invalid payment amount: {amount}")]
    InvalidAmount {
        amount: Money,
    },

    #[error("member not found: {code}")]
    NotFound {
        code: String,
    },

    #[error("member code has surrounding whitespace: {code:?}")]
    InvalidCode {
        code: String,
    },

    #[error("amount too large: {amount}, maximum {maximum}")]
    AmountTooLarge {
        amount: Money,
        maximum: Money,
    },

    #[error("arithmetic overflow while computing {what}")]
    Overflow {
        what: String,
    },

    #[error("required field is empty: {field}")]
    EmptyField {
        field: &'static str,
    },

    #[error("invalid monthly fee: {fee}")]
    InvalidMonthlyFee {
        fee: Money,
    },

    #[error("payment less than minimum: minimum {minimum}, provided {provided}")]
    PaymentBelowMinimum {
        minimum: Money,
        provided: Money,
    },

    #[error("monthly fee less than minimum: minimum {minimum}, provided {provided}")]
    FeeBelowMinimum {
        minimum: Money,
        provided: Money,
    },

    #[error("stored row is malformed: {message}")]
    CorruptRow {
        message: String,
    },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration {
        message: String,
    },

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("export error: {0}")]
    Export(#[from] csv::Error),

    #[error("spreadsheet error: {0}")]
    Spreadsheet(#[from] rust_xlsxwriter::XlsxError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl LedgerError {
    /// true for errors caused by operator input rather than the store or filesystem
    pub fn is_input_error(&self) -> bool {
        !matches!(
            self,
            LedgerError::Storage(_)
                | LedgerError::Export(_)
                | LedgerError::Spreadsheet(_)
                | LedgerError::Io(_)
                | LedgerError::Serialization(_)
                | LedgerError::CorruptRow { .. }
                | LedgerError::Overflow { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, LedgerError>;
