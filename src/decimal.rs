use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};
use std::str::FromStr;

/// decimal places kept for every amount (single denomination, 1/100 minor unit)
pub const MONEY_DP: u32 = 2;

/// Money type with 2 decimal places, used for fees, payments and dues
///
/// Serializes as its 2-place display string so every export agrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Money = Money(Decimal::ZERO);
    pub const ONE: Money = Money(Decimal::ONE);
    /// largest fee or payment accepted from input (10^15)
    pub const MAX_AMOUNT: Money = Money(Decimal::from_parts(0xA4C6_8000, 0x0003_8D7E, 0, false, 0));

    /// create from decimal
    pub fn from_decimal(d: Decimal) -> Self {
        Money(d.round_dp(MONEY_DP))
    }

    /// create from string with exact parsing
    pub fn from_str_exact(s: &str) -> Result<Self, rust_decimal::Error> {
        Ok(Money(Decimal::from_str(s.trim())?.round_dp(MONEY_DP)))
    }

    /// create from whole currency units
    pub fn from_major(amount: i64) -> Self {
        Money(Decimal::from(amount))
    }

    /// create from minor units (paise, cents)
    pub fn from_minor(amount: i64) -> Self {
        Money(Decimal::new(amount, MONEY_DP))
    }

    /// get underlying decimal
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// strictly greater than zero
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// strictly less than zero
    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    pub fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// multiply by a whole number of billing units
    pub fn times(&self, units: i64) -> Self {
        Money((self.0 * Decimal::from(units)).round_dp(MONEY_DP))
    }

    pub fn checked_times(&self, units: i64) -> Option<Self> {
        self.0
            .checked_mul(Decimal::from(units))
            .map(|d| Money(d.round_dp(MONEY_DP)))
    }

    pub fn checked_add(self, other: Money) -> Option<Self> {
        self.0.checked_add(other.0).map(|d| Money(d.round_dp(MONEY_DP)))
    }

    pub fn checked_sub(self, other: Money) -> Option<Self> {
        self.0.checked_sub(other.0).map(|d| Money(d.round_dp(MONEY_DP)))
    }

    /// sum without panicking, `None` on overflow
    pub fn checked_sum<I: IntoIterator<Item = Money>>(iter: I) -> Option<Self> {
        iter.into_iter()
            .try_fold(Money::ZERO, |acc, m| acc.checked_add(m))
    }

    /// within the range accepted from operator input
    pub fn is_within_limit(&self) -> bool {
        self.abs() <= Money::MAX_AMOUNT
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        <Decimal as Deserialize>::deserialize(deserializer).map(Money::from_decimal)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl FromStr for Money {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Money::from_str_exact(s)
    }
}

impl From<Decimal> for Money {
    fn from(d: Decimal) -> Self {
        Money::from_decimal(d)
    }
}

impl From<i32> for Money {
    fn from(i: i32) -> Self {
        Money::from_major(i as i64)
    }
}

impl From<u32> for Money {
    fn from(i: u32) -> Self {
        Money::from_major(i as i64)
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, other: Money) -> Money {
        Money((self.0 + other.0).round_dp(MONEY_DP))
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, other: Money) {
        self.0 = (self.0 + other.0).round_dp(MONEY_DP);
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, other: Money) -> Money {
        Money((self.0 - other.0).round_dp(MONEY_DP))
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, other: Money) {
        self.0 = (self.0 - other.0).round_dp(MONEY_DP);
    }
}

impl Neg for Money {
    type Output = Money;

    fn neg(self) -> Money {
        Money(-self.0)
    }
}

impl Mul<Decimal> for Money {
    type Output = Money;

    fn mul(self, other: Decimal) -> Money {
        Money((self.0 * other).round_dp(MONEY_DP))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, |acc, m| acc + m)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, |acc, m| acc + *m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_money_precision() {
        let m = Money::from_str_exact("100.126").unwrap();
        assert_eq!(m.to_string(), "100.13");
    }

    #[test]
    fn test_minor_units() {
        assert_eq!(Money::from_minor(20_050), Money::from_str_exact("200.50").unwrap());
        assert_eq!(Money::from_minor(100), Money::ONE);
    }

    #[test]
    fn test_display_pads_to_two_places() {
        assert_eq!(Money::from_major(600).to_string(), "600.00");
        assert_eq!((-Money::from_major(100)).to_string(), "-100.00");
    }

    #[test]
    fn test_sign_checks() {
        assert!(Money::from_major(1).is_positive());
        assert!(!Money::ZERO.is_positive());
        assert!(!Money::ZERO.is_negative());
        assert!((Money::ZERO - Money::ONE).is_negative());
    }

    #[test]
    fn test_times_and_sum() {
        let fee = Money::from_major(200);
        assert_eq!(fee.times(3), Money::from_major(600));
        assert_eq!(fee.times(-1), Money::from_major(-200));

        let total: Money = [Money::from_major(500), Money::from_major(200)].iter().sum();
        assert_eq!(total, Money::from_major(700));
        assert_eq!(fee * dec!(0.5), Money::from_major(100));
    }

    #[test]
    fn test_checked_ops_report_overflow() {
        let huge = Money::from_str_exact("79228162514264337593543950335").unwrap();
        assert_eq!(huge.checked_times(3), None);
        assert_eq!(huge.checked_add(huge), None);
        assert_eq!(Money::checked_sum([huge, Money::ONE]), None);
        assert_eq!(
            Money::checked_sum([Money::from_major(2), Money::ONE]),
            Some(Money::from_major(3))
        );
        assert_eq!(Money::from_major(200).checked_times(3), Some(Money::from_major(600)));
    }

    #[test]
    fn test_max_amount() {
        assert_eq!(Money::MAX_AMOUNT, Money::from_major(1_000_000_000_000_000));
        assert!(Money::MAX_AMOUNT.is_within_limit());
        assert!(!(Money::MAX_AMOUNT + Money::ONE).is_within_limit());
    }

    #[test]
    fn test_serializes_as_two_place_string() {
        let json = serde_json::to_string(&Money::from_major(600)).unwrap();
        assert_eq!(json, "\"600.00\"");
        let back: Money = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Money::from_major(600));
        let from_number: Money = serde_json::from_str("12.5").unwrap();
        assert_eq!(from_number, Money::from_minor(1250));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("twelve".parse::<Money>().is_err());
        assert_eq!(" 50 ".parse::<Money>().unwrap(), Money::from_major(50));
    }
}
