//! Error types for numeric and fee primitives
//!
//! Higher layers convert these into their own taxonomy with `#[from]`.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum NumericError {
    #[error("Arithmetic overflow")]
    Overflow,

    #[error("Arithmetic underflow")]
    Underflow,

    #[error("Fee rate out of range [0, 1]: {rate}")]
    FeeRateOutOfRange { rate: String },

    #[error("Invalid fee rate literal: {input}")]
    InvalidFeeRate { input: String },
}
