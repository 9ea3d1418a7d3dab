//! Bank initialization parameters
//!
//! Loaded from JSON, e.g.
//!
//! ```json
//! {
//!   "admin": "0190f5c2-7a1e-7c3d-9b2a-1f0e3d4c5b6a",
//!   "fee_recipient": "0190f5c2-7a1e-7c3d-9b2a-1f0e3d4c5b6b",
//!   "custody": "0190f5c2-7a1e-7c3d-9b2a-1f0e3d4c5b6c",
//!   "fee_rate": "0.003"
//! }
//! ```
//!
//! `fee_rate` is optional and defaults to zero.

use serde::{Deserialize, Serialize};
use std::path::Path;
use types::fee::FeeRate;
use types::ids::AccountId;

use crate::errors::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BankConfig {
    /// Only identity allowed to change the fee rate
    pub admin: AccountId,
    /// Receives the fee leg of every withdrawal
    pub fee_recipient: AccountId,
    /// The bank's own address on the asset ledger
    pub custody: AccountId,
    #[serde(default)]
    pub fee_rate: FeeRate,
}

impl BankConfig {
    pub fn new(admin: AccountId, fee_recipient: AccountId, custody: AccountId) -> Self {
        Self {
            admin,
            fee_recipient,
            custody,
            fee_rate: FeeRate::ZERO,
        }
    }

    pub fn with_fee_rate(mut self, fee_rate: FeeRate) -> Self {
        self.fee_rate = fee_rate;
        self
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// The custody account must not double as the administrator or the fee
    /// recipient: fees paid to custody would never leave it.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fee_recipient == self.custody {
            return Err(ConfigError::Invalid {
                reason: "fee recipient must differ from the custody account".to_string(),
            });
        }
        if self.admin == self.custody {
            return Err(ConfigError::Invalid {
                reason: "administrator must differ from the custody account".to_string(),
            });
        }
        Ok(())
    }
}
