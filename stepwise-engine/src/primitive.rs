//! Functions to construct [`Integer`]s and exact [`Decimal`]s.

use rug::{ops::Pow, Integer};
use std::fmt;

/// Creates an [`Integer`] with the given value.
pub fn int<T>(n: T) -> Integer
where
    Integer: From<T>,
{
    Integer::from(n)
}

/// Returns `10^exp`.
pub fn pow10(exp: u32) -> Integer {
    int(10).pow(exp)
}

/// An exact, non-negative decimal number, stored as an integer and the number of digits after
/// the decimal point.
///
/// `Decimal { digits: 1250, scale: 3 }` is `1.250`. Trailing zeros are kept; two decimals with
/// the same value but different scales are different literals.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Decimal {
    /// The digits of the number, without the decimal point.
    pub digits: Integer,

    /// The number of digits after the decimal point.
    pub scale: u32,
}

impl Decimal {
    /// Creates a decimal from its digits and scale. Negative digits are made positive; signs are
    /// represented with a `Minus` operator instead.
    pub fn new(digits: Integer, scale: u32) -> Self {
        Self { digits: digits.abs(), scale }
    }

    /// Rounds `numerator / denominator` half-up, away from zero, to `precision` digits after
    /// the decimal point. Returns `None` if the denominator is zero.
    pub fn from_ratio(numerator: &Integer, denominator: &Integer, precision: u32) -> Option<SignedDecimal> {
        if denominator.is_zero() {
            return None;
        }

        let negative = (*numerator < 0) != (*denominator < 0);

        // round(n * 10^p / d) = floor((2 * n * 10^p + d) / (2 * d))
        let numerator = numerator.clone().abs();
        let denominator = denominator.clone().abs();
        let scaled = numerator * pow10(precision) * 2u32 + &denominator;
        let magnitude = Self::new(scaled / (denominator * 2u32), precision);
        Some(SignedDecimal {
            negative: negative && !magnitude.digits.is_zero(),
            magnitude,
        })
    }

    /// Returns true if the value has no fractional part.
    pub fn is_whole(&self) -> bool {
        (self.digits.clone() % pow10(self.scale)).is_zero()
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.digits.to_string();
        let scale = self.scale as usize;
        if scale == 0 {
            return write!(f, "{}", digits);
        }

        let padded = format!("{:0>width$}", digits, width = scale + 1);
        let (whole, fractional) = padded.split_at(padded.len() - scale);
        write!(f, "{}.{}", whole, fractional)
    }
}

/// A rounded value with its sign kept apart from the unsigned [`Decimal`] literal.
///
/// Turned into an expression, a negative value becomes `Minus(Decimal)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedDecimal {
    /// True if the value is below zero. Values that round to zero are never negative.
    pub negative: bool,

    /// The absolute value.
    pub magnitude: Decimal,
}

impl fmt::Display for SignedDecimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negative {
            write!(f, "-")?;
        }
        write!(f, "{}", self.magnitude)
    }
}
