//! Contract events
//!
//! Immutable records appended by every committed bank operation. Rejected
//! operations never emit an event.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use types::fee::FeeRate;
use types::ids::AccountId;
use types::numeric::Amount;
use uuid::Uuid;

/// Asset pulled into custody and credited to the depositor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deposited {
    pub receipt_id: Uuid,
    pub account_id: AccountId,
    pub amount: Amount,
    pub new_balance: Amount,
    pub recorded_at: DateTime<Utc>,
}

/// Balance debited and paid out, net to the user and fee to the fee recipient
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Withdrawn {
    pub receipt_id: Uuid,
    pub account_id: AccountId,
    pub amount: Amount,
    pub net_amount: Amount,
    pub fee_amount: Amount,
    pub fee_recipient: AccountId,
    pub new_balance: Amount,
    pub recorded_at: DateTime<Utc>,
}

/// Administrator changed the withdrawal fee rate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeRateUpdated {
    pub admin: AccountId,
    pub old_rate: FeeRate,
    pub new_rate: FeeRate,
    pub recorded_at: DateTime<Utc>,
}

/// Enum wrapper for all contract events, enabling uniform handling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContractEvent {
    Deposited(Deposited),
    Withdrawn(Withdrawn),
    FeeRateUpdated(FeeRateUpdated),
}

impl ContractEvent {
    /// Account whose balance or policy the event concerns
    pub fn account_id(&self) -> AccountId {
        match self {
            ContractEvent::Deposited(e) => e.account_id,
            ContractEvent::Withdrawn(e) => e.account_id,
            ContractEvent::FeeRateUpdated(e) => e.admin,
        }
    }
}
