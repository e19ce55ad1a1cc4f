//! Price representation in the smallest currency unit.
//!
//! Prices are whole Rupiah amounts. Arithmetic saturates instead of
//! overflowing, so a pathological cart produces a capped total rather than a
//! panic.

use core::fmt;
use core::iter::Sum;

use serde::{Deserialize, Serialize};

/// A non-negative price in the smallest currency unit.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Price(u64);

impl Price {
    /// A zero price.
    pub const ZERO: Self = Self(0);

    /// Create a new price.
    #[must_use]
    pub const fn new(amount: u64) -> Self {
        Self(amount)
    }

    /// Get the underlying amount.
    #[must_use]
    pub const fn amount(self) -> u64 {
        self.0
    }

    /// Price of `quantity` units at this unit price.
    #[must_use]
    pub const fn times(self, quantity: u32) -> Self {
        Self(self.0.saturating_mul(quantity as u64))
    }

    /// Add two prices.
    #[must_use]
    pub const fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    /// Whether the price is zero.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Amount with `.` as the thousands separator (e.g. `105.000`).
    #[must_use]
    pub fn grouped(self) -> String {
        let digits = self.0.to_string();
        let mut out = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                out.push('.');
            }
            out.push(ch);
        }
        out
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rp {}", self.grouped())
    }
}

impl From<u64> for Price {
    fn from(amount: u64) -> Self {
        Self(amount)
    }
}

impl From<Price> for u64 {
    fn from(price: Price) -> Self {
        price.0
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Self::saturating_add)
    }
}

impl<'a> Sum<&'a Self> for Price {
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grouped() {
        assert_eq!(Price::new(0).grouped(), "0");
        assert_eq!(Price::new(999).grouped(), "999");
        assert_eq!(Price::new(1000).grouped(), "1.000");
        assert_eq!(Price::new(75000).grouped(), "75.000");
        assert_eq!(Price::new(105_000).grouped(), "105.000");
        assert_eq!(Price::new(1_234_567).grouped(), "1.234.567");
    }

    #[test]
    fn test_display() {
        assert_eq!(Price::new(15000).to_string(), "Rp 15.000");
    }

    #[test]
    fn test_times() {
        assert_eq!(Price::new(15000).times(2), Price::new(30000));
        assert_eq!(Price::new(15000).times(0), Price::ZERO);
    }

    #[test]
    fn test_saturates_instead_of_overflowing() {
        assert_eq!(Price::new(u64::MAX).times(2), Price::new(u64::MAX));
        assert_eq!(
            Price::new(u64::MAX).saturating_add(Price::new(1)),
            Price::new(u64::MAX)
        );
    }

    #[test]
    fn test_sum() {
        let total: Price = [Price::new(75000), Price::new(30000)].iter().sum();
        assert_eq!(total, Price::new(105_000));
    }
}
