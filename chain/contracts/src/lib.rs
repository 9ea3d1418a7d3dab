//! Custodial balance ledger
//!
//! Accepts deposits of a fungible asset held on an external ERC20-style
//! ledger, tracks each depositor's credited balance, and pays withdrawals back
//! out minus a configurable fee routed to a fee recipient.
//!
//! # Modules
//! - `errors`: Bank, ledger and config error types
//! - `events`: Events appended by committed operations
//! - `security`: Reentrancy guard and administrator access control
//! - `token`: External asset ledger trait and in-memory ERC20 ledger
//! - `ledger`: Internal balance ledger
//! - `vault`: The bank: deposits, withdrawals, fee policy
//! - `config`: Initialization parameters

pub mod errors;
pub mod events;
pub mod security;
pub mod token;
pub mod ledger;
pub mod vault;
pub mod config;

pub use config::BankConfig;
pub use errors::{BankError, ConfigError, LedgerError};
pub use token::{AssetLedger, InMemoryToken, TransferLeg};
pub use vault::Bank;

/// Contract ABI version, frozen after release
pub const CONTRACT_ABI_VERSION: &str = "1.0.0";
