//! Contract-specific error types
//!
//! Error taxonomy for the bank, the external asset ledger boundary and
//! configuration loading.

use thiserror::Error;
use types::errors::NumericError;

/// Errors reported by an external asset ledger.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LedgerError {
    #[error("Insufficient token balance: required {required}, available {available}")]
    InsufficientBalance { required: String, available: String },

    #[error("Insufficient allowance: required {required}, granted {granted}")]
    InsufficientAllowance { required: String, granted: String },

    #[error("Token balance overflow")]
    Overflow,

    #[error("Transfer rejected: {reason}")]
    Rejected { reason: String },
}

/// Bank operation errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BankError {
    #[error("Amount must be positive")]
    InvalidAmount,

    #[error("Insufficient balance for {account}: required {required}, available {available}")]
    InsufficientBalance {
        account: String,
        required: String,
        available: String,
    },

    #[error("Insufficient allowance: required {required}, granted {granted}")]
    InsufficientAllowance { required: String, granted: String },

    #[error("Transfer failed: {0}")]
    TransferFailed(LedgerError),

    #[error("Unauthorized: {caller} is not the administrator")]
    Unauthorized { caller: String },

    #[error("Invalid fee rate: {0}")]
    InvalidFeeRate(String),

    #[error("Arithmetic overflow in balance or fee calculation")]
    ArithmeticOverflow,

    #[error("Reentrancy detected")]
    Reentrancy,
}

impl From<NumericError> for BankError {
    fn from(err: NumericError) -> Self {
        match err {
            NumericError::Overflow | NumericError::Underflow => BankError::ArithmeticOverflow,
            NumericError::FeeRateOutOfRange { .. } | NumericError::InvalidFeeRate { .. } => {
                BankError::InvalidFeeRate(err.to_string())
            }
        }
    }
}

/// Configuration loading errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config: {reason}")]
    Invalid { reason: String },
}
