//! Exact decimal money type.
//!
//! Uses `rust_decimal` internally. Unlike a fixed-scale type, `Money` keeps
//! every significant digit through accumulation so that equal splits with
//! repeating fractions never leak or invent cents. Values are rounded to
//! cents only when they leave the engine (see [`Money::round_cents`]).

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use std::str::FromStr;

/// A monetary amount with exact decimal precision.
///
/// # Examples
///
/// ```
/// use std::str::FromStr;
/// use split_engine::Money;
///
/// let amount = Money::from_str("100").unwrap();
/// let share = amount.divide_evenly(3).unwrap();
/// assert_eq!(share.round_cents().to_string(), "33.33");
/// assert_eq!((share + share + share).round_cents(), amount);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Money(Decimal);

impl Money {
    /// Number of decimal places used at the output boundary.
    pub const CENT_PLACES: u32 = 2;

    /// Zero value.
    pub const ZERO: Self = Money(Decimal::ZERO);

    /// Slack permitted when comparing sums, to absorb rounding.
    pub const TOLERANCE: Self = Money(dec!(0.01));

    /// Smallest amount an expense may carry.
    pub const MINIMUM_AMOUNT: Self = Money(dec!(0.01));

    /// Largest amount an expense may carry. Keeps totals over any realistic
    /// number of expenses well inside `Decimal`'s range.
    pub const MAXIMUM_AMOUNT: Self = Money(dec!(1000000000000000));

    /// Wraps a decimal as-is, without rounding.
    pub fn new(value: Decimal) -> Self {
        Money(value)
    }

    /// Returns the underlying decimal.
    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Rounds to whole cents using banker's rounding (half to even).
    ///
    /// Negative zero is folded into zero so it never prints as `-0.00`.
    pub fn round_cents(&self) -> Self {
        let rounded = self
            .0
            .round_dp_with_strategy(Self::CENT_PLACES, RoundingStrategy::MidpointNearestEven);
        if rounded.is_zero() {
            Self::ZERO
        } else {
            Money(rounded)
        }
    }

    pub fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Strictly greater than zero.
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// Strictly less than zero.
    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    /// Divides into `count` identical parts without rounding.
    ///
    /// Returns `None` when `count` is zero.
    pub fn divide_evenly(&self, count: usize) -> Option<Self> {
        self.0.checked_div(Decimal::from(count)).map(Money)
    }

    /// Returns `pct` percent of this amount, unrounded, or `None` if the
    /// product overflows.
    pub fn checked_percent(&self, pct: Decimal) -> Option<Self> {
        self.0
            .checked_mul(pct)
            .and_then(|product| product.checked_div(dec!(100)))
            .map(Money)
    }

    /// `None` if the sum overflows.
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Money)
    }

    /// `None` if the difference overflows.
    pub fn checked_sub(self, rhs: Self) -> Option<Self> {
        self.0.checked_sub(rhs.0).map(Money)
    }

    /// Sums `values`, or `None` if any partial sum overflows.
    pub fn checked_sum<I: IntoIterator<Item = Self>>(values: I) -> Option<Self> {
        values
            .into_iter()
            .try_fold(Money::ZERO, |acc, value| acc.checked_add(value))
    }

    /// `true` if `|self - other| <= 0.01`. Values too far apart to subtract
    /// are never within tolerance.
    pub fn within_tolerance_of(&self, other: Money) -> bool {
        self.checked_sub(other)
            .map_or(false, |diff| diff.abs() <= Self::TOLERANCE)
    }
}

impl From<Decimal> for Money {
    fn from(value: Decimal) -> Self {
        Money(value)
    }
}

impl FromStr for Money {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Decimal::from_str(s.trim()).map(Money)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = self.0.normalize();
        if value.scale() < Self::CENT_PLACES {
            write!(f, "{:.2}", value)
        } else {
            write!(f, "{}", value)
        }
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Money(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Money(self.0 - rhs.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Money(-self.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Money::ZERO, |acc, m| acc + m)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.fold(Money::ZERO, |acc, m| acc + *m)
    }
}

impl Serialize for Money {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Money::from_str(&s).map_err(serde::de::Error::custom)
    }
}
