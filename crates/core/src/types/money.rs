//! Monetary amounts.
//!
//! Prices are whole Indonesian rupiah, which has no minor unit in practice, so
//! an amount is a plain `i64`. All arithmetic is checked; an overflow is
//! reported instead of wrapping into a bogus total.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors produced by [`Money`] arithmetic and parsing.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoneyError {
    /// The amount is below zero.
    #[error("amount cannot be negative")]
    Negative,
    /// An intermediate result does not fit in 64 bits.
    #[error("amount overflow")]
    Overflow,
}

/// A non-negative amount of money in whole currency units.
///
/// ```
/// use kedai_core::Money;
///
/// let espresso = Money::parse(15_000).unwrap();
/// assert_eq!(espresso.times(2).unwrap(), Money::parse(30_000).unwrap());
/// assert!(Money::parse(-1).is_err());
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(try_from = "i64", into = "i64")]
pub struct Money(i64);

impl Money {
    /// Zero.
    pub const ZERO: Self = Self(0);

    /// Validate a raw amount.
    ///
    /// # Errors
    ///
    /// Returns [`MoneyError::Negative`] for amounts below zero.
    pub const fn parse(amount: i64) -> Result<Self, MoneyError> {
        if amount < 0 {
            return Err(MoneyError::Negative);
        }
        Ok(Self(amount))
    }

    /// The raw amount.
    #[must_use]
    pub const fn amount(self) -> i64 {
        self.0
    }

    /// `self + other`.
    ///
    /// # Errors
    ///
    /// Returns [`MoneyError::Overflow`] if the sum does not fit.
    pub const fn checked_add(self, other: Self) -> Result<Self, MoneyError> {
        match self.0.checked_add(other.0) {
            Some(v) => Ok(Self(v)),
            None => Err(MoneyError::Overflow),
        }
    }

    /// `self - other`. A discount larger than the amount is an error.
    ///
    /// # Errors
    ///
    /// Returns [`MoneyError::Negative`] if the result would drop below zero.
    pub const fn checked_sub(self, other: Self) -> Result<Self, MoneyError> {
        match self.0.checked_sub(other.0) {
            Some(v) if v >= 0 => Ok(Self(v)),
            Some(_) => Err(MoneyError::Negative),
            None => Err(MoneyError::Overflow),
        }
    }

    /// Unit price times a quantity.
    ///
    /// # Errors
    ///
    /// Returns [`MoneyError::Overflow`] if the product does not fit.
    pub fn times(self, qty: u32) -> Result<Self, MoneyError> {
        match self.0.checked_mul(i64::from(qty)) {
            Some(v) => Ok(Self(v)),
            None => Err(MoneyError::Overflow),
        }
    }
}

impl TryFrom<i64> for Money {
    type Error = MoneyError;

    fn try_from(amount: i64) -> Result<Self, Self::Error> {
        Self::parse(amount)
    }
}

impl From<Money> for i64 {
    fn from(money: Money) -> Self {
        money.0
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Money {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <i64 as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <i64 as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Money {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let amount = <i64 as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self::parse(amount)?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Money {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <i64 as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_times() {
        let price = Money::parse(20_000).unwrap();
        assert_eq!(price.times(3).unwrap().amount(), 60_000);
        assert_eq!(price.times(0).unwrap(), Money::ZERO);
    }

    #[test]
    fn test_times_overflow() {
        let price = Money::parse(i64::MAX / 2 + 1).unwrap();
        assert_eq!(price.times(2), Err(MoneyError::Overflow));
    }

    #[test]
    fn test_checked_sub_below_zero() {
        let a = Money::parse(5).unwrap();
        let b = Money::parse(6).unwrap();
        assert_eq!(a.checked_sub(b), Err(MoneyError::Negative));
        assert_eq!(b.checked_sub(a).unwrap().amount(), 1);
    }

    #[test]
    fn test_deserialize_is_plain_number() {
        let m: Money = serde_json::from_str("15000").unwrap();
        assert_eq!(m.amount(), 15_000);
        assert_eq!(serde_json::to_string(&m).unwrap(), "15000");
    }

    #[test]
    fn test_deserialize_rejects_negative() {
        assert!(serde_json::from_str::<Money>("-500").is_err());
    }
}
