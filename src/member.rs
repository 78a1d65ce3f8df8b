use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::FeeLimits;
use crate::decimal::Money;
use crate::errors::{LedgerError, Result};

/// a registered member and their fee plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub code: String,
    pub name: String,
    pub guardian_name: String,
    pub address: String,
    pub contact: String,
    pub admission_date: NaiveDate,
    pub monthly_fee: Money,
}

impl Member {
    /// create a validated member
    pub fn new(
        code: impl Into<String>,
        name: impl Into<String>,
        guardian_name: impl Into<String>,
        address: impl Into<String>,
        contact: impl Into<String>,
        admission_date: NaiveDate,
        monthly_fee: Money,
    ) -> Result<Self> {
        let member = Self {
            code: code.into().trim().to_string(),
            name: name.into().trim().to_string(),
            guardian_name: guardian_name.into().trim().to_string(),
            address: address.into().trim().to_string(),
            contact: contact.into().trim().to_string(),
            admission_date,
            monthly_fee,
        };
        member.validate()?;
        Ok(member)
    }

    pub fn builder() -> MemberBuilder {
        MemberBuilder::new()
    }

    /// check the record invariants: non-empty display fields, a code stored
    /// exactly as lookups see it, and a positive fee within range
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("code", &self.code),
            ("name", &self.name),
            ("guardian_name", &self.guardian_name),
            ("address", &self.address),
            ("contact", &self.contact),
        ];
        for (field, value) in fields {
            if value.trim().is_empty() {
                return Err(LedgerError::EmptyField { field });
            }
        }

        // lookups trim, so a padded code could never be found again
        if self.code.trim() != self.code {
            return Err(LedgerError::InvalidCode {
                code: self.code.clone(),
            });
        }

        if !self.monthly_fee.is_positive() {
            return Err(LedgerError::InvalidMonthlyFee {
                fee: self.monthly_fee,
            });
        }
        if !self.monthly_fee.is_within_limit() {
            return Err(LedgerError::AmountTooLarge {
                amount: self.monthly_fee,
                maximum: Money::MAX_AMOUNT,
            });
        }

        Ok(())
    }

    /// check the fee against configured desk limits
    pub fn check_limits(&self, limits: &FeeLimits) -> Result<()> {
        if let Some(minimum) = limits.minimum_monthly_fee {
            if self.monthly_fee < minimum {
                return Err(LedgerError::FeeBelowMinimum {
                    minimum,
                    provided: self.monthly_fee,
                });
            }
        }
        Ok(())
    }
}

/// builder for members collected field by field from a form
#[derive(Debug, Default)]
pub struct MemberBuilder {
    code: Option<String>,
    name: Option<String>,
    guardian_name: Option<String>,
    address: Option<String>,
    contact: Option<String>,
    admission_date: Option<NaiveDate>,
    monthly_fee: Option<Money>,
}

impl MemberBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn guardian_name(mut self, guardian_name: impl Into<String>) -> Self {
        self.guardian_name = Some(guardian_name.into());
        self
    }

    pub fn address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    pub fn contact(mut self, contact: impl Into<String>) -> Self {
        self.contact = Some(contact.into());
        self
    }

    pub fn admission_date(mut self, date: NaiveDate) -> Self {
        self.admission_date = Some(date);
        self
    }

    pub fn monthly_fee(mut self, fee: Money) -> Self {
        self.monthly_fee = Some(fee);
        self
    }

    /// build the member; a missing admission date defaults to `today`
    pub fn build_on(self, today: NaiveDate) -> Result<Member> {
        let admission_date = self.admission_date.unwrap_or(today);
        self.admission_date(admission_date).build()
    }

    pub fn build(self) -> Result<Member> {
        let admission_date = self
            .admission_date
            .ok_or(LedgerError::EmptyField { field: "admission_date" })?;
        let monthly_fee = self
            .monthly_fee
            .ok_or(LedgerError::EmptyField { field: "monthly_fee" })?;

        Member::new(
            self.code.unwrap_or_default(),
            self.name.unwrap_or_default(),
            self.guardian_name.unwrap_or_default(),
            self.address.unwrap_or_default(),
            self.contact.unwrap_or_default(),
            admission_date,
            monthly_fee,
        )
    }
}
