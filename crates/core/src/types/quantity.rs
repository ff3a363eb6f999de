//! Cart line quantities.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when validating a [`Quantity`].
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityError {
    /// Zero or negative.
    #[error("qty must be greater than zero")]
    NotPositive,
    /// Larger than a line can hold.
    #[error("qty must be at most {max}")]
    TooLarge {
        /// Maximum allowed quantity.
        max: i64,
    },
}

/// A strictly positive item count, stored as `INTEGER`.
///
/// ```
/// use kedai_core::Quantity;
///
/// assert_eq!(Quantity::parse(2).unwrap().get(), 2);
/// assert!(Quantity::parse(0).is_err());
/// assert!(Quantity::parse(-3).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i32")]
pub struct Quantity(i32);

impl Quantity {
    /// Largest quantity accepted for a single line.
    pub const MAX: i64 = i32::MAX as i64;

    /// Validate a raw client-supplied quantity.
    ///
    /// # Errors
    ///
    /// Returns [`QuantityError::NotPositive`] for `qty <= 0` and
    /// [`QuantityError::TooLarge`] when it does not fit a database integer.
    pub fn parse(qty: i64) -> Result<Self, QuantityError> {
        if qty <= 0 {
            return Err(QuantityError::NotPositive);
        }
        i32::try_from(qty)
            .map(Self)
            .map_err(|_| QuantityError::TooLarge { max: Self::MAX })
    }

    /// The count as `u32`, for money arithmetic.
    #[must_use]
    pub fn get(self) -> u32 {
        self.0.unsigned_abs()
    }

    /// The count as stored in the database.
    #[must_use]
    pub const fn as_i32(self) -> i32 {
        self.0
    }
}

impl TryFrom<i64> for Quantity {
    type Error = QuantityError;

    fn try_from(qty: i64) -> Result<Self, Self::Error> {
        Self::parse(qty)
    }
}

impl From<Quantity> for i32 {
    fn from(qty: Quantity) -> Self {
        qty.0
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Quantity {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <i32 as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <i32 as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Quantity {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let qty = <i32 as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self::parse(i64::from(qty))?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Quantity {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <i32 as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_zero_and_negative() {
        assert_eq!(Quantity::parse(0), Err(QuantityError::NotPositive));
        assert_eq!(Quantity::parse(-1), Err(QuantityError::NotPositive));
    }

    #[test]
    fn test_rejects_values_beyond_integer_column() {
        assert!(matches!(
            Quantity::parse(i64::from(i32::MAX) + 1),
            Err(QuantityError::TooLarge { .. })
        ));
        assert!(Quantity::parse(i64::from(i32::MAX)).is_ok());
    }

    #[test]
    fn test_deserialize_validates() {
        assert!(serde_json::from_str::<Quantity>("3").is_ok());
        assert!(serde_json::from_str::<Quantity>("0").is_err());
    }
}
