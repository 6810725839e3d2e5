//! 18-decimal fixed-point arithmetic.
//!
//! Redemption rates are ratios of token amounts and must never be computed
//! with floats. `Dec` stores the rate as a `u128` scaled by 10^18 and widens
//! into 256 bits for multiplication and division, truncating the result the
//! way the protocol's accounting expects.

use std::{fmt, str::FromStr};

use ethnum::U256;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::types::Amount;

/// Number of fractional digits carried by [`Dec`].
pub const DECIMAL_PLACES: u32 = 18;

const SCALE: u128 = 10u128.pow(DECIMAL_PLACES);

/// An unsigned fixed-point decimal with 18 fractional digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
pub struct Dec(u128);

/// Errors from parsing a [`Dec`] out of its string form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecError {
    /// The string is not a decimal number.
    #[error("invalid decimal string: {0}")]
    Invalid(String),

    /// More than 18 fractional digits were supplied.
    #[error("too many fractional digits (max {DECIMAL_PLACES}): {0}")]
    TooManyFractionalDigits(String),

    /// The value does not fit in the underlying 128-bit representation.
    #[error("decimal overflow: {0}")]
    Overflow(String),
}

impl Dec {
    /// The value `0.0`.
    pub const fn zero() -> Self {
        Dec(0)
    }

    /// The value `1.0`.
    pub const fn one() -> Self {
        Dec(SCALE)
    }

    /// Builds a decimal directly from its scaled representation.
    pub const fn raw(value: u128) -> Self {
        Dec(value)
    }

    /// Returns the scaled representation.
    pub const fn into_raw(self) -> u128 {
        self.0
    }

    /// Converts an integer amount, failing on overflow.
    pub fn from_int(value: Amount) -> Option<Self> {
        value.checked_mul(SCALE).map(Dec)
    }

    /// Computes `numerator / denominator` with truncation.
    ///
    /// Returns `None` for a zero denominator or if the quotient does not fit.
    pub fn from_ratio(numerator: Amount, denominator: Amount) -> Option<Self> {
        if denominator == 0 {
            return None;
        }
        let wide = U256::from(numerator) * U256::from(SCALE) / U256::from(denominator);
        (wide <= U256::from(u128::MAX)).then(|| Dec(wide.as_u128()))
    }

    /// Whether the value is exactly zero.
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Computes `trunc(amount * self)`.
    ///
    /// Returns `None` if the product does not fit in an [`Amount`].
    pub fn mul_trunc(&self, amount: Amount) -> Option<Amount> {
        let wide = U256::from(amount) * U256::from(self.0) / U256::from(SCALE);
        (wide <= U256::from(u128::MAX)).then(|| wide.as_u128())
    }

    /// Computes `trunc(amount / self)`.
    ///
    /// Returns `None` if `self` is zero or the quotient does not fit.
    pub fn div_trunc(&self, amount: Amount) -> Option<Amount> {
        if self.0 == 0 {
            return None;
        }
        let wide = U256::from(amount) * U256::from(SCALE) / U256::from(self.0);
        (wide <= U256::from(u128::MAX)).then(|| wide.as_u128())
    }
}

impl fmt::Display for Dec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let integer = self.0 / SCALE;
        let fraction = self.0 % SCALE;
        if fraction == 0 {
            return write!(f, "{integer}");
        }
        let frac = format!("{fraction:018}");
        write!(f, "{integer}.{}", frac.trim_end_matches('0'))
    }
}

impl FromStr for Dec {
    type Err = DecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (int_part, frac_part) = match s.split_once('.') {
            Some((i, fr)) => (i, fr),
            None => (s, ""),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(DecError::Invalid(s.to_string()));
        }
        if frac_part.len() > DECIMAL_PLACES as usize {
            return Err(DecError::TooManyFractionalDigits(s.to_string()));
        }

        let integer: u128 = if int_part.is_empty() {
            0
        } else {
            int_part
                .parse()
                .map_err(|_| DecError::Invalid(s.to_string()))?
        };
        let fraction: u128 = if frac_part.is_empty() {
            0
        } else {
            let padded = format!("{frac_part:0<18}");
            padded
                .parse()
                .map_err(|_| DecError::Invalid(s.to_string()))?
        };

        integer
            .checked_mul(SCALE)
            .and_then(|scaled| scaled.checked_add(fraction))
            .map(Dec)
            .ok_or_else(|| DecError::Overflow(s.to_string()))
    }
}

impl Serialize for Dec {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Dec {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}
