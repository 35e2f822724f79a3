//! Type-safe price representation using decimal arithmetic.
//!
//! The store sells in Indian rupees only, so a price is just a non-negative
//! decimal amount. The remote API sends prices as JSON numbers; cart lines
//! keep a [`Price`] snapshot taken when the variant was added.

use core::fmt;
use core::ops::{Add, Mul};

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The amount is below zero.
    #[error("price cannot be negative: {0}")]
    Negative(Decimal),
}

/// A price in rupees.
///
/// ## Examples
///
/// ```
/// use navdana_core::Price;
/// use rust_decimal::Decimal;
///
/// let price = Price::new(Decimal::new(1299, 0)).unwrap();
/// assert_eq!(price.to_string(), "₹1299");
/// assert!(Price::new(Decimal::new(-1, 0)).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// A price of zero.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a new price.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Negative`] if the amount is below zero.
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative(amount));
        }
        Ok(Self(amount))
    }

    /// Create a price from a whole number of rupees.
    #[must_use]
    pub fn from_rupees(rupees: u32) -> Self {
        Self(Decimal::from(rupees))
    }

    /// The decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Percentage saved against a strike-through price.
    ///
    /// Returns `None` unless `self` is strictly below `strike`. The result is
    /// rounded half away from zero, so 1000 against 1500 is 33 and 1000
    /// against 1199 is 17.
    #[must_use]
    pub fn discount_percent(&self, strike: Self) -> Option<u32> {
        if strike.0.is_zero() || self.0 >= strike.0 {
            return None;
        }
        let percent = (strike.0 - self.0) / strike.0 * Decimal::ONE_HUNDRED;
        percent
            .round_dp_with_strategy(0, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
            .to_u32()
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "₹{}", self.0.normalize())
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Mul<u32> for Price {
    type Output = Self;

    fn mul(self, rhs: u32) -> Self {
        Self(self.0 * Decimal::from(rhs))
    }
}

impl core::iter::Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_negative() {
        assert!(matches!(
            Price::new(Decimal::new(-5, 0)),
            Err(PriceError::Negative(_))
        ));
        assert!(Price::new(Decimal::ZERO).is_ok());
    }

    #[test]
    fn test_display_uses_rupee_sign() {
        assert_eq!(Price::from_rupees(2499).to_string(), "₹2499");
        assert_eq!(Price::new(Decimal::new(99950, 2)).unwrap().to_string(), "₹999.5");
    }

    #[test]
    fn test_discount_percent() {
        let price = Price::from_rupees(1000);
        assert_eq!(price.discount_percent(Price::from_rupees(1500)), Some(33));
        assert_eq!(price.discount_percent(Price::from_rupees(1199)), Some(17));
        assert_eq!(price.discount_percent(Price::from_rupees(2000)), Some(50));
    }

    #[test]
    fn test_no_discount_when_not_cheaper() {
        let price = Price::from_rupees(1000);
        assert_eq!(price.discount_percent(Price::from_rupees(1000)), None);
        assert_eq!(price.discount_percent(Price::from_rupees(800)), None);
        assert_eq!(price.discount_percent(Price::ZERO), None);
    }

    #[test]
    fn test_deserializes_from_json_number() {
        let price: Price = serde_json::from_str("1299").unwrap();
        assert_eq!(price, Price::from_rupees(1299));
    }

    #[test]
    fn test_line_arithmetic() {
        let total: Price = [Price::from_rupees(100) * 2, Price::from_rupees(50)]
            .into_iter()
            .sum();
        assert_eq!(total, Price::from_rupees(250));
    }
}
