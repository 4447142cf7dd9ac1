//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    29.90 × 3 = 89.69999999999999  ❌ WRONG!                             │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    2990 cents × 3 = 8970 cents     ✅ exact                            │
//! │                                                                         │
//! │  Fractional quantities (2.5 m²) multiply through `Quantity`, with a    │
//! │  single rounding step to whole cents per line.                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use construflow_core::{Money, Quantity};
//!
//! let price = Money::from_cents(2990); // R$ 29.90 per m²
//! let line = price.times(Quantity::from_milli(2_500)).unwrap(); // 2.5 m²
//! assert_eq!(line.cents(), 7475);
//!
//! let typed = Money::parse("35,00").unwrap();
//! assert_eq!(typed.cents(), 3500);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::quantity::Quantity;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in cents (centavos).
///
/// ## Design Decisions
/// - **i64 (signed)**: ledger math produces negative intermediate values
///   (pending expenses, balances)
/// - **Single field tuple struct**: serializes as a plain integer
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS,
)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from whole reais and centavos.
    ///
    /// ```rust
    /// use construflow_core::Money;
    ///
    /// assert_eq!(Money::from_major_minor(35, 0).cents(), 3500);
    /// assert_eq!(Money::from_major_minor(-5, 50).cents(), -550);
    /// ```
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Parses a typed amount such as `"12.50"` or `"12,50"`.
    ///
    /// ## Rules
    /// - `.` or `,` as decimal separator
    /// - At most 2 decimal places
    /// - Optional leading `-`
    pub fn parse(input: &str) -> Result<Money, ValidationError> {
        parse_fixed(input, 2, "amount").map(Money)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the whole-currency portion (truncated toward zero).
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the cents portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
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
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Multiplies a unit price by a fractional quantity.
    ///
    /// ## Rounding
    /// `cents × milli / 1000`, rounded half away from zero to whole cents.
    /// This is the only place a line total is rounded.
    ///
    /// ## Errors
    /// `OutOfRange` when the product does not fit in i64 cents.
    ///
    /// ```rust
    /// use construflow_core::{Money, Quantity};
    ///
    /// // R$ 120.00 per m³ × 0.333 m³ = R$ 39.96
    /// let total = Money::from_cents(12_000).times(Quantity::from_milli(333)).unwrap();
    /// assert_eq!(total.cents(), 3996);
    /// ```
    pub fn times(&self, quantity: Quantity) -> Result<Money, ValidationError> {
        let raw = self.0 as i128 * quantity.milli() as i128;
        i64::try_from(div_round_half_away(raw, Quantity::SCALE as i128))
            .map(Money)
            .map_err(|_| ValidationError::out_of_range("line total"))
    }

    /// `None` on overflow.
    pub fn checked_add(self, other: Money) -> Option<Money> {
        self.0.checked_add(other.0).map(Money)
    }

    /// Percentage of `self` relative to `base`, as a float for display only.
    ///
    /// Returns `None` when `base` is zero.
    pub fn percent_of(&self, base: Money) -> Option<f64> {
        if base.is_zero() {
            return None;
        }
        Some(self.0 as f64 / base.0 as f64 * 100.0)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Debug-friendly rendering. Locale formatting belongs to the caller
/// (see `ConfigState::format_currency` in the app).
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}R$ {}.{:02}", sign, self.major().abs(), self.cents_part())
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Neg for Money {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Money(-self.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

// =============================================================================
// Fixed-Point Helpers
// =============================================================================

/// Integer division rounding half away from zero.
pub(crate) fn div_round_half_away(value: i128, divisor: i128) -> i128 {
    let half = divisor / 2;
    if value >= 0 {
        (value + half) / divisor
    } else {
        (value - half) / divisor
    }
}

/// Parses decimal text into a fixed-point integer with `decimals` places.
///
/// Shared by [`Money::parse`] and [`Quantity::parse`].
pub(crate) fn parse_fixed(input: &str, decimals: u32, field: &str) -> Result<i64, ValidationError> {
    let text = input.trim();
    if text.is_empty() {
        return Err(ValidationError::required(field));
    }

    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };

    let normalized = digits.replace(',', ".");
    let mut parts = normalized.splitn(2, '.');
    let whole_part = parts.next().unwrap_or("");
    let frac_part = parts.next().unwrap_or("");

    let is_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    if (whole_part.is_empty() && frac_part.is_empty()) || !is_digits(whole_part) || !is_digits(frac_part) {
        return Err(ValidationError::invalid_format(field, "not a number"));
    }

    if frac_part.len() > decimals as usize {
        return Err(ValidationError::invalid_format(
            field,
            format!("at most {} decimal places", decimals),
        ));
    }

    let too_large = || ValidationError::invalid_format(field, "value is too large");

    let whole: i64 = if whole_part.is_empty() {
        0
    } else {
        whole_part.parse().map_err(|_| too_large())?
    };

    let frac: i64 = if decimals == 0 {
        0
    } else {
        format!("{:0<width$}", frac_part, width = decimals as usize)
            .parse()
            .map_err(|_| too_large())?
    };

    let value = whole
        .checked_mul(10_i64.pow(decimals))
        .and_then(|v| v.checked_add(frac))
        .ok_or_else(too_large)?;

    Ok(if negative { -value } else { value })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(1099);
        assert_eq!(money.cents(), 1099);
        assert_eq!(money.major(), 10);
        assert_eq!(money.cents_part(), 99);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(3500).to_string(), "R$ 35.00");
        assert_eq!(Money::from_cents(-550).to_string(), "-R$ 5.50");
        assert_eq!(Money::zero().to_string(), "R$ 0.00");
    }

    #[test]
    fn test_arithmetic_and_sum() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(250);

        assert_eq!((a + b).cents(), 1250);
        assert_eq!((a - b).cents(), 750);
        assert_eq!((-a).cents(), -1000);

        let total: Money = [a, b, b].iter().sum();
        assert_eq!(total.cents(), 1500);
    }

    #[test]
    fn test_times_whole_quantity() {
        let price = Money::from_cents(3500);
        assert_eq!(price.times(Quantity::from_whole(3)).unwrap().cents(), 10_500);
    }

    #[test]
    fn test_times_out_of_range() {
        let price = Money::from_cents(1_000_000);
        let huge = Quantity::parse("9223372036854775").unwrap();
        assert_eq!(
            price.times(huge).unwrap_err(),
            ValidationError::out_of_range("line total")
        );
        assert_eq!(Money::from_cents(i64::MAX).checked_add(Money::from_cents(1)), None);
    }

    #[test]
    fn test_times_rounds_half_away_from_zero() {
        // 0.5 cent rounds up
        assert_eq!(Money::from_cents(1).times(Quantity::from_milli(500)).unwrap().cents(), 1);
        // 0.4 cent rounds down
        assert_eq!(Money::from_cents(1).times(Quantity::from_milli(400)).unwrap().cents(), 0);
        // negative rounds away from zero
        assert_eq!(Money::from_cents(-1).times(Quantity::from_milli(500)).unwrap().cents(), -1);
    }

    #[test]
    fn test_parse_accepts_both_separators() {
        assert_eq!(Money::parse("12.50").unwrap().cents(), 1250);
        assert_eq!(Money::parse("12,5").unwrap().cents(), 1250);
        assert_eq!(Money::parse(" 7 ").unwrap().cents(), 700);
        assert_eq!(Money::parse(".99").unwrap().cents(), 99);
        assert_eq!(Money::parse("-3").unwrap().cents(), -300);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(
            Money::parse("").unwrap_err(),
            ValidationError::required("amount")
        );
        assert!(Money::parse("abc").is_err());
        assert!(Money::parse("1.2.3").is_err());
        assert!(Money::parse("1.234").is_err());
        assert!(Money::parse("-").is_err());
        assert!(Money::parse("99999999999999999999").is_err());
    }

    #[test]
    fn test_percent_of() {
        let margin = Money::from_cents(650).percent_of(Money::from_cents(2850));
        assert!((margin.unwrap() - 22.807).abs() < 0.001);
        assert!(Money::from_cents(100).percent_of(Money::zero()).is_none());
    }
}
