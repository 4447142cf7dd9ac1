//! # Quantity Module
//!
//! Fixed-point quantities for goods sold by the unit, bag, kilogram, meter
//! or square meter.
//!
//! ## Representation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Quantity(i64) in thousandths                                           │
//! │                                                                         │
//! │    1 bag of cement      →  Quantity(1_000)                              │
//! │    2.5 m² of tiles      →  Quantity(2_500)                              │
//! │    0.333 m³ of sand     →  Quantity(333)                                │
//! │    stock after oversell →  Quantity(-3_000)   (negative is allowed)     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::{div_round_half_away, parse_fixed};

/// A quantity or stock level, in thousandths of the product's unit.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS,
)]
#[ts(export)]
pub struct Quantity(i64);

impl Quantity {
    /// Milli-units per whole unit.
    pub const SCALE: i64 = 1_000;

    #[inline]
    pub const fn from_milli(milli: i64) -> Self {
        Quantity(milli)
    }

    #[inline]
    pub const fn from_whole(units: i64) -> Self {
        Quantity(units * Self::SCALE)
    }

    #[inline]
    pub const fn one() -> Self {
        Quantity(Self::SCALE)
    }

    #[inline]
    pub const fn zero() -> Self {
        Quantity(0)
    }

    #[inline]
    pub const fn milli(&self) -> i64 {
        self.0
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    #[inline]
    pub const fn is_whole(&self) -> bool {
        self.0 % Self::SCALE == 0
    }

    /// Parses typed input such as `"2.5"`, `"2,5"` or `"12"`.
    ///
    /// At most 3 decimal places.
    pub fn parse(input: &str) -> Result<Quantity, ValidationError> {
        parse_fixed(input, 3, "quantity").map(Quantity)
    }

    /// Multiplies two measurements (length × width → area).
    ///
    /// ```rust
    /// use construflow_core::Quantity;
    ///
    /// let area = Quantity::parse("2.5").unwrap().times(Quantity::parse("1.2").unwrap());
    /// assert_eq!(area.unwrap(), Quantity::from_whole(3));
    /// ```
    pub fn times(&self, other: Quantity) -> Result<Quantity, ValidationError> {
        let raw = self.0 as i128 * other.0 as i128;
        i64::try_from(div_round_half_away(raw, Self::SCALE as i128))
            .map(Quantity)
            .map_err(|_| ValidationError::out_of_range("quantity"))
    }

    /// `None` on overflow.
    pub fn checked_add(self, other: Quantity) -> Option<Quantity> {
        self.0.checked_add(other.0).map(Quantity)
    }
}

/// Renders without trailing zeros: `12`, `2.5`, `0.333`, `-3`.
impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let whole = (self.0 / Self::SCALE).abs();
        let frac = (self.0 % Self::SCALE).abs();

        if frac == 0 {
            return write!(f, "{}{}", sign, whole);
        }

        let frac = format!("{:03}", frac);
        write!(f, "{}{}.{}", sign, whole, frac.trim_end_matches('0'))
    }
}

impl Add for Quantity {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Quantity(self.0 + other.0)
    }
}

impl AddAssign for Quantity {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Quantity {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Quantity(self.0 - other.0)
    }
}

impl SubAssign for Quantity {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Neg for Quantity {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Quantity(-self.0)
    }
}

impl Sum for Quantity {
    fn sum<I: Iterator<Item = Quantity>>(iter: I) -> Self {
        iter.fold(Quantity::zero(), |acc, q| acc + q)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!(Quantity::parse("3").unwrap(), Quantity::from_whole(3));
        assert_eq!(Quantity::parse("2,5").unwrap().milli(), 2_500);
        assert_eq!(Quantity::parse("0.333").unwrap().milli(), 333);
        assert!(Quantity::parse("0.3333").is_err());
        assert!(Quantity::parse("x").is_err());
    }

    #[test]
    fn test_times() {
        let area = Quantity::from_whole(3).times(Quantity::from_whole(4)).unwrap();
        assert_eq!(area, Quantity::from_whole(12));

        let area = Quantity::from_milli(1_250).times(Quantity::from_milli(333)).unwrap();
        // 1.25 × 0.333 = 0.41625 → 0.416
        assert_eq!(area.milli(), 416);
    }

    #[test]
    fn test_overflow_is_reported() {
        let huge = Quantity::parse("9223372036854775").unwrap();
        assert_eq!(huge.checked_add(huge), None);
        assert_eq!(
            huge.times(Quantity::from_whole(2)).unwrap_err(),
            ValidationError::out_of_range("quantity")
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(Quantity::from_whole(12).to_string(), "12");
        assert_eq!(Quantity::from_milli(2_500).to_string(), "2.5");
        assert_eq!(Quantity::from_milli(333).to_string(), "0.333");
        assert_eq!(Quantity::from_whole(-3).to_string(), "-3");
        assert_eq!(Quantity::from_milli(-1_050).to_string(), "-1.05");
    }

    #[test]
    fn test_is_whole() {
        assert!(Quantity::from_whole(2).is_whole());
        assert!(!Quantity::from_milli(2_500).is_whole());
    }
}
