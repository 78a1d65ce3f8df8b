use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::errors::{LedgerError, Result};

/// ledger configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerConfig {
    #[serde(default)]
    pub due_policy: DuePolicy,
    #[serde(default)]
    pub limits: FeeLimits,
}

/// how the due calculator treats the two edge cases of the billing formula
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuePolicy {
    #[serde(default)]
    pub unknown_member: UnknownMemberPolicy,
    #[serde(default)]
    pub pre_admission: PreAdmissionPolicy,
}

/// result of a due lookup for a code that is not registered
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnknownMemberPolicy {
    /// report zero due, keeps report loops running
    #[default]
    ZeroDue,
    /// fail with an invalid member error
    Strict,
}

/// billed months when the calculation date precedes the admission date
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PreAdmissionPolicy {
    /// bill at least the admission month
    #[default]
    ClampToOneMonth,
    /// keep the raw month difference, which may be zero or negative
    Propagate,
}

/// desk limits on fees and payments
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeLimits {
    pub minimum_monthly_fee: Option<Money>,
    pub minimum_payment: Option<Money>,
}

impl LedgerConfig {
    /// lenient defaults with strict unknown member handling
    pub fn strict() -> Self {
        Self::default().with_due_policy(DuePolicy {
            unknown_member: UnknownMemberPolicy::Strict,
            pre_admission: PreAdmissionPolicy::ClampToOneMonth,
        })
    }

    /// limits used at the front desk: fee of at least 100, payments of at least 50
    pub fn reference_desk() -> Self {
        Self::default().with_limits(FeeLimits {
            minimum_monthly_fee: Some(Money::from_decimal(dec!(100.00))),
            minimum_payment: Some(Money::from_decimal(dec!(50.00))),
        })
    }

    pub fn with_due_policy(mut self, policy: DuePolicy) -> Self {
        self.due_policy = policy;
        self
    }

    pub fn with_limits(mut self, limits: FeeLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn is_strict(&self) -> bool {
        self.due_policy.unknown_member == UnknownMemberPolicy::Strict
    }

    /// reject limits that could never be satisfied
    pub fn validate(&self) -> Result<()> {
        if let Some(minimum) = self.limits.minimum_monthly_fee {
            if !minimum.is_positive() {
                return Err(LedgerError::InvalidConfiguration {
                    message: format!("minimum monthly fee must be positive, got {}", minimum),
                });
            }
        }
        if let Some(minimum) = self.limits.minimum_payment {
            if !minimum.is_positive() {
                return Err(LedgerError::InvalidConfiguration {
                    message: format!("minimum payment must be positive, got {}", minimum),
                });
            }
        }
        Ok(())
    }

    /// parse and validate a json configuration
    pub fn from_json(json: &str) -> Result<Self> {
        let config: LedgerConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
