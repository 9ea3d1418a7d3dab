//! Integer amounts in the asset's smallest unit
//!
//! Amounts never carry a fractional part and never go negative. All arithmetic
//! is checked: an operation that would leave the representable range returns a
//! [`NumericError`] instead of wrapping or saturating.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::NumericError;

/// Non-negative quantity of the external asset, in its smallest denomination.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Amount(u128);

impl Amount {
    pub const ZERO: Amount = Amount(0);
    pub const MAX: Amount = Amount(u128::MAX);

    pub const fn new(units: u128) -> Self {
        Self(units)
    }

    /// Raw unit count
    pub const fn units(&self) -> u128 {
        self.0
    }

    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Add, failing with `Overflow` instead of wrapping.
    pub fn checked_add(self, rhs: Amount) -> Result<Amount, NumericError> {
        self.0
            .checked_add(rhs.0)
            .map(Amount)
            .ok_or(NumericError::Overflow)
    }

    /// Subtract, failing with `Underflow` if `rhs` exceeds `self`.
    pub fn checked_sub(self, rhs: Amount) -> Result<Amount, NumericError> {
        self.0
            .checked_sub(rhs.0)
            .map(Amount)
            .ok_or(NumericError::Underflow)
    }
}

impl From<u128> for Amount {
    fn from(units: u128) -> Self {
        Self(units)
    }
}

impl From<u64> for Amount {
    fn from(units: u64) -> Self {
        Self(units as u128)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
