//! Amount Module
//!
//! Monetary values are held as a signed integer count of minor units.
//! One coin is `10^8` minor units. Sums are accumulated in `i128`, so
//! adding up any number of outputs never rounds and never overflows.
//!
//! The type is signed only so that a negative declared output can be
//! represented and rejected by the validator.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub};
use std::str::FromStr;
use thiserror::Error;

/// Number of decimal places carried by an [`Amount`].
pub const DECIMALS: u32 = 8;

/// Minor units per whole coin.
pub const MINOR_UNITS_PER_COIN: i64 = 10_i64.pow(DECIMALS);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Amount(i64);

impl Amount {
    pub const ZERO: Amount = Amount(0);

    pub const fn from_minor_units(units: i64) -> Self {
        Self(units)
    }

    /// Whole coins, e.g. `Amount::coins(10)` is `10.00000000`.
    pub const fn coins(coins: i64) -> Self {
        Self(coins * MINOR_UNITS_PER_COIN)
    }

    pub const fn minor_units(self) -> i64 {
        self.0
    }

    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    pub fn to_be_bytes(self) -> [u8; 8] {
        self.0.to_be_bytes()
    }
}

/// Exact running total of many amounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AmountSum(i128);

impl AmountSum {
    pub fn push(&mut self, amount: Amount) {
        self.0 += amount.0 as i128;
    }

    /// Narrows back to an [`Amount`], `None` if the total leaves the `i64` range.
    pub fn to_amount(self) -> Option<Amount> {
        i64::try_from(self.0).ok().map(Amount)
    }
}

impl Add for AmountSum {
    type Output = AmountSum;

    fn add(self, rhs: AmountSum) -> AmountSum {
        AmountSum(self.0 + rhs.0)
    }
}

impl AddAssign for AmountSum {
    fn add_assign(&mut self, rhs: AmountSum) {
        self.0 += rhs.0;
    }
}

impl Sub for AmountSum {
    type Output = AmountSum;

    fn sub(self, rhs: AmountSum) -> AmountSum {
        AmountSum(self.0 - rhs.0)
    }
}

impl Sum<Amount> for AmountSum {
    fn sum<I: Iterator<Item = Amount>>(iter: I) -> Self {
        let mut total = AmountSum::default();
        for amount in iter {
            total.push(amount);
        }
        total
    }
}

impl<'a> Sum<&'a Amount> for AmountSum {
    fn sum<I: Iterator<Item = &'a Amount>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl From<Amount> for AmountSum {
    fn from(amount: Amount) -> Self {
        AmountSum(amount.0 as i128)
    }
}

impl fmt::Display for AmountSum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let scale = MINOR_UNITS_PER_COIN as i128;
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(
            f,
            "{}{}.{:0width$}",
            sign,
            abs / scale as u128,
            abs % scale as u128,
            width = DECIMALS as usize
        )
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&AmountSum::from(*self), f)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountParseError {
    #[error("empty amount")]
    Empty,
    #[error("invalid digit in amount: {0:?}")]
    InvalidDigit(String),
    #[error("amount {0:?} has more than 8 decimal places")]
    TooPrecise(String),
    #[error("amount {0:?} is out of range")]
    OutOfRange(String),
}

impl FromStr for Amount {
    type Err = AmountParseError;

    /// Parses a decimal string such as `"10"`, `"0.5"` or `"-1.25"`.
    /// Never rounds: excess precision is an error.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (negative, digits) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s.strip_prefix('+').unwrap_or(s)),
        };
        if digits.is_empty() {
            return Err(AmountParseError::Empty);
        }

        let (whole, fraction) = digits.split_once('.').unwrap_or((digits, ""));
        if whole.is_empty() && fraction.is_empty() {
            return Err(AmountParseError::InvalidDigit(s.to_string()));
        }
        if !whole.chars().chain(fraction.chars()).all(|c| c.is_ascii_digit()) {
            return Err(AmountParseError::InvalidDigit(s.to_string()));
        }
        if fraction.len() > DECIMALS as usize {
            return Err(AmountParseError::TooPrecise(s.to_string()));
        }

        let out_of_range = || AmountParseError::OutOfRange(s.to_string());
        let whole: i128 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| out_of_range())?
        };
        let fraction_units: i128 = if fraction.is_empty() {
            0
        } else {
            let padded = format!("{:0<width$}", fraction, width = DECIMALS as usize);
            padded.parse().map_err(|_| out_of_range())?
        };

        let magnitude = whole
            .checked_mul(MINOR_UNITS_PER_COIN as i128)
            .and_then(|w| w.checked_add(fraction_units))
            .ok_or_else(out_of_range)?;
        let units = if negative { -magnitude } else { magnitude };
        i64::try_from(units).map(Amount).map_err(|_| out_of_range())
    }
}
