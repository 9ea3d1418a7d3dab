//! Withdrawal fee rate and fee split
//!
//! A fee rate is an exact decimal fraction in `[0, 1]`. Applying it to an
//! integer amount uses integer arithmetic only:
//!
//! `fee = floor(amount * rate)`, `net = amount - fee`
//!
//! The fee rounds down and the remainder stays with the net amount, so
//! `fee + net == amount` holds for every input.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::NumericError;
use crate::numeric::Amount;

/// Finest fee rate precision accepted (1e-18).
///
/// Keeps the remainder product in [`FeeRate::split`] inside `u128`.
pub const MAX_FEE_RATE_SCALE: u32 = 18;

/// Basis points in 100%
pub const BPS_DENOMINATOR: u32 = 10_000;

/// Fraction of every withdrawal routed to the fee recipient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct FeeRate(Decimal);

impl FeeRate {
    pub const ZERO: FeeRate = FeeRate(Decimal::ZERO);

    /// Validate and wrap a decimal rate.
    ///
    /// Rejects negative rates, rates above 100% and rates finer than 1e-18.
    pub fn new(rate: Decimal) -> Result<Self, NumericError> {
        let rate = rate.normalize();
        if rate < Decimal::ZERO || rate > Decimal::ONE {
            return Err(NumericError::FeeRateOutOfRange {
                rate: rate.to_string(),
            });
        }
        if rate.scale() > MAX_FEE_RATE_SCALE {
            return Err(NumericError::InvalidFeeRate {
                input: rate.to_string(),
            });
        }
        Ok(Self(rate))
    }

    /// Rate expressed in basis points (30 bps = 0.3%).
    pub fn from_bps(bps: u32) -> Result<Self, NumericError> {
        if bps > BPS_DENOMINATOR {
            return Err(NumericError::FeeRateOutOfRange {
                rate: format!("{} bps", bps),
            });
        }
        Self::new(Decimal::new(i64::from(bps), 4))
    }

    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Split a gross withdrawal into fee and net parts.
    ///
    /// With `rate = m / 10^s` and `amount = q * 10^s + r`, the fee is
    /// `q * m + floor(r * m / 10^s)`, which never exceeds `amount`.
    pub fn split(&self, amount: Amount) -> Result<FeeSplit, NumericError> {
        let mantissa = u128::try_from(self.0.mantissa()).map_err(|_| NumericError::Underflow)?;
        let denominator = 10u128
            .checked_pow(self.0.scale())
            .ok_or(NumericError::Overflow)?;

        let gross = amount.units();
        let whole = (gross / denominator)
            .checked_mul(mantissa)
            .ok_or(NumericError::Overflow)?;
        let partial = (gross % denominator)
            .checked_mul(mantissa)
            .ok_or(NumericError::Overflow)?
            / denominator;

        let fee = Amount::new(whole.checked_add(partial).ok_or(NumericError::Overflow)?);
        let net = amount.checked_sub(fee)?;

        Ok(FeeSplit {
            gross: amount,
            fee,
            net,
        })
    }
}

impl Default for FeeRate {
    fn default() -> Self {
        Self::ZERO
    }
}

impl TryFrom<Decimal> for FeeRate {
    type Error = NumericError;

    fn try_from(rate: Decimal) -> Result<Self, Self::Error> {
        Self::new(rate)
    }
}

impl From<FeeRate> for Decimal {
    fn from(rate: FeeRate) -> Self {
        rate.0
    }
}

impl FromStr for FeeRate {
    type Err = NumericError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rate = Decimal::from_str_exact(s.trim()).map_err(|_| NumericError::InvalidFeeRate {
            input: s.to_string(),
        })?;
        Self::new(rate)
    }
}

impl fmt::Display for FeeRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Result of applying a fee rate to a withdrawal.
///
/// Invariant: `fee + net == gross`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSplit {
    pub gross: Amount,
    pub fee: Amount,
    pub net: Amount,
}
