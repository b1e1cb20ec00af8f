//! Type-safe price representation using decimal arithmetic.
//!
//! Prices travel as plain JSON numbers (the storefront writes `"price": 19.99`),
//! but arithmetic is done on [`Decimal`] so cart totals never accumulate
//! binary floating point error.
//!
//! A unit price is held to two decimal places and at most [`Price::MAX`], so
//! it survives the trip through an `f64` JSON number unchanged. Totals
//! saturate instead of overflowing.

use core::fmt;
use core::iter::Sum;
use core::ops::{Add, Mul};
use core::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Errors that can occur when constructing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The amount is below zero.
    #[error("price cannot be negative (got {0})")]
    Negative(Decimal),
    /// The amount is above [`Price::MAX`].
    #[error("price exceeds {max} (got {0})", max = Price::MAX)]
    TooLarge(Decimal),
    /// The input is not a decimal number.
    #[error("invalid price: {0:?}")]
    Invalid(String),
}

/// Decimal places kept on a unit price.
const SCALE: u32 = 2;

/// A non-negative unit price in the store currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Price(Decimal);

impl Price {
    /// A price of zero.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// The largest accepted unit price.
    pub const MAX: Self = Self(Decimal::from_parts(3_567_587_328, 232, 0, false, 0));

    /// Create a new price, rounded half away from zero to two decimal places.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Negative`] if `amount` is below zero and
    /// [`PriceError::TooLarge`] if it is above [`Price::MAX`].
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative(amount));
        }
        let amount = amount
            .round_dp_with_strategy(SCALE, RoundingStrategy::MidpointAwayFromZero)
            .normalize();
        if amount > Self::MAX.0 {
            return Err(PriceError::TooLarge(amount));
        }
        Ok(Self(amount))
    }

    /// Create a price from an amount in minor units (e.g. cents).
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Negative`] if `minor` is below zero and
    /// [`PriceError::TooLarge`] if it is above [`Price::MAX`].
    pub fn from_minor(minor: i64) -> Result<Self, PriceError> {
        Self::new(Decimal::new(minor, 2))
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Price of `quantity` units, saturating at `Decimal::MAX`.
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        Self(
            self.0
                .checked_mul(Decimal::from(quantity))
                .unwrap_or(Decimal::MAX),
        )
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0.round_dp(2))
    }
}

impl FromStr for Price {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let amount = Decimal::from_str(s.trim()).map_err(|_| PriceError::Invalid(s.to_string()))?;
        Self::new(amount)
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0.checked_add(rhs.0).unwrap_or(Decimal::MAX))
    }
}

impl Mul<u32> for Price {
    type Output = Self;

    fn mul(self, rhs: u32) -> Self {
        self.times(rhs)
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        rust_decimal::serde::float::serialize(&self.0, serializer)
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let amount = rust_decimal::serde::float::deserialize(deserializer)?;
        Self::new(amount).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_negative() {
        assert!(matches!(
            Price::new(Decimal::new(-1, 2)),
            Err(PriceError::Negative(_))
        ));
        assert!(Price::new(Decimal::ZERO).is_ok());
    }

    #[test]
    fn test_display_two_decimals() {
        assert_eq!(Price::from_minor(1999).unwrap().to_string(), "19.99");
        assert_eq!(Price::from_minor(500).unwrap().to_string(), "5.00");
    }

    #[test]
    fn test_from_str() {
        assert_eq!("19.99".parse::<Price>().unwrap(), Price::from_minor(1999).unwrap());
        assert!(matches!("abc".parse::<Price>(), Err(PriceError::Invalid(_))));
        assert!(matches!("-1".parse::<Price>(), Err(PriceError::Negative(_))));
    }

    #[test]
    fn test_sum_is_exact() {
        let dime = Price::from_minor(10).unwrap();
        let total: Price = std::iter::repeat_n(dime, 3).sum();
        assert_eq!(total, Price::from_minor(30).unwrap());
    }

    #[test]
    fn test_json_number_round_trip() {
        let price = Price::from_minor(1999).unwrap();
        let json = serde_json::to_string(&price).unwrap();
        assert_eq!(json, "19.99");
        let back: Price = serde_json::from_str(&json).unwrap();
        assert_eq!(back, price);
    }

    #[test]
    fn test_rounds_to_cents() {
        let price: Price = "12345678901.123456789".parse().unwrap();
        assert_eq!(price, Price::from_minor(1_234_567_890_112).unwrap());
        assert_eq!("0.005".parse::<Price>().unwrap(), Price::from_minor(1).unwrap());
        assert_eq!("2.50".parse::<Price>().unwrap().amount().scale(), 1);
    }

    #[test]
    fn test_rejects_too_large() {
        assert_eq!(Price::MAX.amount(), Decimal::from(1_000_000_000_000_u64));
        assert_eq!(Price::new(Price::MAX.amount()).unwrap(), Price::MAX);
        assert!(matches!(
            "1000000000000.01".parse::<Price>(),
            Err(PriceError::TooLarge(_))
        ));
        assert!(serde_json::from_str::<Price>("1e28").is_err());
    }

    #[test]
    fn test_arithmetic_saturates() {
        let line = Price::MAX.times(u32::MAX);
        assert!(line > Price::MAX);

        let ceiling = Price(Decimal::MAX);
        assert_eq!((ceiling + line).amount(), Decimal::MAX);
        assert_eq!(ceiling.times(2).amount(), Decimal::MAX);
        let total: Price = [ceiling, line, line].into_iter().sum();
        assert_eq!(total.amount(), Decimal::MAX);
    }

    #[test]
    fn test_high_precision_json_round_trip() {
        let price: Price = "12345678901.123456789".parse().unwrap();
        let json = serde_json::to_string(&price).unwrap();
        let back: Price = serde_json::from_str(&json).unwrap();
        assert_eq!(back, price);
    }

    #[test]
    fn test_deserialize_integer_and_negative() {
        let whole: Price = serde_json::from_str("20").unwrap();
        assert_eq!(whole.to_string(), "20.00");
        assert!(serde_json::from_str::<Price>("-3.5").is_err());
    }
}
