//! Types library for the custodial balance ledger
//!
//! Core value types shared by the contract layer: participant identities,
//! integer asset amounts and the withdrawal fee rate.
//!
//! # Modules
//! - `ids`: Participant identity (`AccountId`)
//! - `numeric`: Checked integer amounts (`Amount`)
//! - `fee`: Fee rate and withdrawal fee split
//! - `errors`: Numeric error taxonomy

pub mod ids;
pub mod numeric;
pub mod fee;
pub mod errors;
