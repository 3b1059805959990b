//! Fixed point types for currency amounts and percentages.
//!
//! All monetary arithmetic in the app happens on integer cents. Values are only
//! converted to decimal numbers when they are serialized for a client.

use std::{
    fmt,
    iter::Sum,
    ops::{Add, AddAssign, Sub},
    str::FromStr,
};

use rusqlite::types::{FromSql, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

use crate::Error;

/// A signed amount of money stored as integer cents.
///
/// # Examples
///
/// ```
/// use spendwise_rs::Money;
///
/// let amount: Money = "12.30".parse().unwrap();
/// assert_eq!(amount.cents(), 1230);
/// assert_eq!(amount.to_string(), "12.30");
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(i64);

impl Money {
    /// No money at all.
    pub const ZERO: Money = Money(0);

    /// The largest amount accepted for a single transaction or budget limit,
    /// one hundred billion.
    ///
    /// Sums of many amounts at this size still fit comfortably in cents.
    pub const MAX: Money = Money(10_000_000_000_000);

    /// Create an amount from integer cents.
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// The amount in cents.
    pub const fn cents(self) -> i64 {
        self.0
    }

    /// Whether the amount is strictly greater than zero.
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Whether the amount is no more than [Money::MAX].
    pub const fn is_within_max(self) -> bool {
        self.0 <= Self::MAX.0
    }

    /// Convert a decimal number to cents, rounding half away from zero.
    ///
    /// # Errors
    /// Returns [Error::InvalidAmount] if `value` is not finite or does not fit in cents.
    pub fn from_decimal(value: f64) -> Result<Self, Error> {
        if !value.is_finite() {
            return Err(Error::InvalidAmount(format!("{value} is not a number")));
        }

        let cents = (value * 100.0).round();

        if cents > i64::MAX as f64 || cents < i64::MIN as f64 {
            return Err(Error::InvalidAmount(format!("{value} is too large")));
        }

        Ok(Self(cents as i64))
    }

    /// The amount as a decimal number, for serialization only.
    pub fn to_decimal(self) -> f64 {
        self.0 as f64 / 100.0
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();

        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

// Arithmetic saturates at the bounds of `i64` cents instead of overflowing.
impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Self::Output {
        Money(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        *self = *self + rhs;
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Self::Output {
        Money(self.0.saturating_sub(rhs.0))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl FromStr for Money {
    type Err = Error;

    /// Parse a decimal string such as "12", "12.5" or "-0.01" into cents.
    ///
    /// More than two fractional digits are rejected rather than rounded.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::InvalidAmount(format!("\"{s}\" is not a valid amount"));

        let trimmed = s.trim();
        let (negative, rest) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
        };

        let (whole, fraction) = rest.split_once('.').unwrap_or((rest, ""));

        if whole.is_empty() || !whole.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }

        if fraction.len() > 2 || !fraction.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }

        let whole: i64 = whole.parse().map_err(|_| invalid())?;
        let fraction: i64 = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<i64>().map_err(|_| invalid())? * 10,
            _ => fraction.parse().map_err(|_| invalid())?,
        };

        let cents = whole
            .checked_mul(100)
            .and_then(|cents| cents.checked_add(fraction))
            .ok_or_else(invalid)?;

        Ok(Self(if negative { -cents } else { cents }))
    }
}

impl Serialize for Money {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_f64(self.to_decimal())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawAmount {
            Number(f64),
            Text(String),
        }

        match RawAmount::deserialize(deserializer)? {
            RawAmount::Number(value) => Money::from_decimal(value).map_err(de::Error::custom),
            RawAmount::Text(text) => text.parse().map_err(de::Error::custom),
        }
    }
}

impl ToSql for Money {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.0))
    }
}

impl FromSql for Money {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        i64::column_result(value).map(Money)
    }
}

/// A percentage stored in hundredths of a percent, e.g. 150.25% is `15025`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Percentage(i64);

impl Percentage {
    /// Zero percent.
    pub const ZERO: Percentage = Percentage(0);

    /// One hundred percent.
    pub const ONE_HUNDRED: Percentage = Percentage(100_00);

    /// Create a percentage from hundredths of a percent.
    pub const fn from_hundredths(hundredths: i64) -> Self {
        Self(hundredths)
    }

    /// The percentage in hundredths of a percent.
    pub const fn hundredths(self) -> i64 {
        self.0
    }

    /// `part` as a percentage of `whole`, rounded half up to two decimal places.
    ///
    /// Returns `None` if `whole` is not positive.
    pub fn of(part: Money, whole: Money) -> Option<Self> {
        if !whole.is_positive() {
            return None;
        }

        let hundredths = div_round_half_up(part.cents() as i128 * 100_00, whole.cents() as i128);

        Some(Self(hundredths.clamp(i64::MIN as i128, i64::MAX as i128) as i64))
    }

    /// The percentage as a decimal number, for serialization only.
    pub fn to_decimal(self) -> f64 {
        self.0 as f64 / 100.0
    }
}

impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();

        write!(f, "{sign}{}.{:02}%", abs / 100, abs % 100)
    }
}

impl Serialize for Percentage {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_f64(self.to_decimal())
    }
}

/// Integer division rounding halves away from zero. `denominator` must be positive.
fn div_round_half_up(numerator: i128, denominator: i128) -> i128 {
    let quotient = numerator / denominator;
    let remainder = numerator % denominator;

    if remainder.abs() * 2 >= denominator {
        quotient + numerator.signum()
    } else {
        quotient
    }
}
