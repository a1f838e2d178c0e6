//! # Token Amounts
//!
//! Fixed-point token amounts. The ledger's smallest transferable unit is
//! `0.000001`, so amounts are stored as whole base units in a `u64`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::TypesError;

/// Number of fractional digits carried by a [`TokenAmount`].
pub const TOKEN_DECIMALS: u32 = 6;

const UNITS_PER_TOKEN: u64 = 10u64.pow(TOKEN_DECIMALS);

/// A non-negative token amount in base units (1 token = 1_000_000 units).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TokenAmount(u64);

impl TokenAmount {
    /// Zero tokens.
    pub const ZERO: Self = Self(0);

    /// The smallest transferable amount (`0.000001`).
    pub const MIN_UNIT: Self = Self(1);

    /// Create from raw base units.
    pub const fn from_base_units(units: u64) -> Self {
        Self(units)
    }

    /// Create from a whole number of tokens.
    pub fn from_tokens(tokens: u64) -> Option<Self> {
        tokens.checked_mul(UNITS_PER_TOKEN).map(Self)
    }

    /// Raw base units.
    pub const fn base_units(&self) -> u64 {
        self.0
    }

    /// True for the zero amount.
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checked addition.
    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    /// Checked subtraction.
    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / UNITS_PER_TOKEN;
        let frac = self.0 % UNITS_PER_TOKEN;
        if frac == 0 {
            return write!(f, "{}", whole);
        }
        let digits = format!("{:0width$}", frac, width = TOKEN_DECIMALS as usize);
        write!(f, "{}.{}", whole, digits.trim_end_matches('0'))
    }
}

impl FromStr for TokenAmount {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (whole, frac) = match trimmed.split_once('.') {
            Some((w, f)) => (w, f),
            None => (trimmed, ""),
        };

        let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if whole.is_empty() || !all_digits(whole) || !all_digits(frac) {
            return Err(TypesError::InvalidAmount(s.to_string()));
        }
        if frac.len() > TOKEN_DECIMALS as usize {
            return Err(TypesError::ExcessPrecision {
                value: s.to_string(),
                max: TOKEN_DECIMALS,
            });
        }

        let overflow = || TypesError::AmountOverflow(s.to_string());
        let whole_units = whole
            .parse::<u64>()
            .map_err(|_| overflow())?
            .checked_mul(UNITS_PER_TOKEN)
            .ok_or_else(overflow)?;
        let frac_units = if frac.is_empty() {
            0
        } else {
            let padded = format!("{:0<width$}", frac, width = TOKEN_DECIMALS as usize);
            padded.parse::<u64>().map_err(|_| overflow())?
        };

        whole_units
            .checked_add(frac_units)
            .map(Self)
            .ok_or_else(overflow)
    }
}

impl TryFrom<String> for TokenAmount {
    type Error = TypesError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TokenAmount> for String {
    fn from(value: TokenAmount) -> Self {
        value.to_string()
    }
}
