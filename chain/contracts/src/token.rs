//! External asset ledger boundary
//!
//! The bank never owns the asset it holds in custody. It reaches an
//! ERC20-style ledger through [`AssetLedger`]: allowance + `transfer_from` to
//! pull deposits in, direct transfers to pay withdrawals out.
//!
//! [`InMemoryToken`] is a reference ledger with the usual ERC20 semantics,
//! used for fixtures and local runs.

use std::collections::HashMap;

use tracing::debug;
use types::ids::AccountId;
use types::numeric::Amount;

use crate::errors::LedgerError;

/// One leg of a payout batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferLeg {
    pub recipient: AccountId,
    pub amount: Amount,
}

impl TransferLeg {
    pub fn new(recipient: AccountId, amount: Amount) -> Self {
        Self { recipient, amount }
    }
}

/// ERC20-style value-transfer ledger.
///
/// There is no ambient transaction sender, so the acting identity
/// (`spender` for pulls, `sender` for pushes) is passed explicitly.
///
/// # Atomic payouts
///
/// Withdrawals settle through [`AssetLedger::transfer_batch`] and rely on it
/// to apply every leg or none. There is no default body built on
/// [`AssetLedger::transfer`]: a ledger that cannot stage or reverse transfers
/// must validate every leg up front and only then apply them, or reject the
/// whole batch. A ledger that applies legs one by one and stops at the first
/// failure breaks the bank's conservation of funds.
pub trait AssetLedger {
    /// External balance held by `account`
    fn balance_of(&self, account: &AccountId) -> Amount;

    /// Amount `spender` may still pull from `owner`
    fn allowance(&self, owner: &AccountId, spender: &AccountId) -> Amount;

    /// Move `amount` from `owner` to `recipient` using `spender`'s allowance.
    fn transfer_from(
        &mut self,
        spender: &AccountId,
        owner: &AccountId,
        recipient: &AccountId,
        amount: Amount,
    ) -> Result<(), LedgerError>;

    /// Move `amount` from `sender` to `recipient`.
    fn transfer(
        &mut self,
        sender: &AccountId,
        recipient: &AccountId,
        amount: Amount,
    ) -> Result<(), LedgerError>;

    /// Settle several direct transfers from `sender` as one unit.
    ///
    /// Either every leg is applied or none is; on `Err` the ledger state is
    /// exactly what it was before the call.
    fn transfer_batch(&mut self, sender: &AccountId, legs: &[TransferLeg]) -> Result<(), LedgerError>;
}

/// In-memory ERC20-style ledger.
#[derive(Debug, Clone, Default)]
pub struct InMemoryToken {
    balances: HashMap<AccountId, Amount>,
    allowances: HashMap<(AccountId, AccountId), Amount>,
    total_supply: Amount,
}

impl InMemoryToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create new units out of thin air (fixture funding).
    pub fn mint(&mut self, to: &AccountId, amount: Amount) -> Result<(), LedgerError> {
        let supply = self
            .total_supply
            .checked_add(amount)
            .map_err(|_| LedgerError::Overflow)?;
        let balance = self
            .balance_of(to)
            .checked_add(amount)
            .map_err(|_| LedgerError::Overflow)?;
        self.total_supply = supply;
        self.balances.insert(*to, balance);
        Ok(())
    }

    /// Set the amount `spender` may pull from `owner`, replacing any previous grant.
    pub fn approve(&mut self, owner: &AccountId, spender: &AccountId, amount: Amount) {
        debug!(owner = %owner, spender = %spender, amount = %amount, "allowance set");
        self.allowances.insert((*owner, *spender), amount);
    }

    pub fn total_supply(&self) -> Amount {
        self.total_supply
    }

    /// Apply `legs` against a staged copy of the touched balances.
    fn stage(
        &self,
        sender: &AccountId,
        legs: &[TransferLeg],
    ) -> Result<HashMap<AccountId, Amount>, LedgerError> {
        let mut staged: HashMap<AccountId, Amount> = HashMap::new();

        for leg in legs {
            let from = staged
                .get(sender)
                .copied()
                .unwrap_or_else(|| self.balance_of(sender));
            let new_from = from
                .checked_sub(leg.amount)
                .map_err(|_| LedgerError::InsufficientBalance {
                    required: leg.amount.to_string(),
                    available: from.to_string(),
                })?;
            staged.insert(*sender, new_from);

            let to = staged
                .get(&leg.recipient)
                .copied()
                .unwrap_or_else(|| self.balance_of(&leg.recipient));
            let new_to = to
                .checked_add(leg.amount)
                .map_err(|_| LedgerError::Overflow)?;
            staged.insert(leg.recipient, new_to);
        }

        Ok(staged)
    }
}

impl AssetLedger for InMemoryToken {
    fn balance_of(&self, account: &AccountId) -> Amount {
        self.balances.get(account).copied().unwrap_or(Amount::ZERO)
    }

    fn allowance(&self, owner: &AccountId, spender: &AccountId) -> Amount {
        self.allowances
            .get(&(*owner, *spender))
            .copied()
            .unwrap_or(Amount::ZERO)
    }

    fn transfer_from(
        &mut self,
        spender: &AccountId,
        owner: &AccountId,
        recipient: &AccountId,
        amount: Amount,
    ) -> Result<(), LedgerError> {
        let granted = self.allowance(owner, spender);
        let remaining = granted
            .checked_sub(amount)
            .map_err(|_| LedgerError::InsufficientAllowance {
                required: amount.to_string(),
                granted: granted.to_string(),
            })?;

        let staged = self.stage(owner, &[TransferLeg::new(*recipient, amount)])?;
        self.balances.extend(staged);
        self.allowances.insert((*owner, *spender), remaining);
        Ok(())
    }

    fn transfer(
        &mut self,
        sender: &AccountId,
        recipient: &AccountId,
        amount: Amount,
    ) -> Result<(), LedgerError> {
        self.transfer_batch(sender, &[TransferLeg::new(*recipient, amount)])
    }

    fn transfer_batch(&mut self, sender: &AccountId, legs: &[TransferLeg]) -> Result<(), LedgerError> {
        let staged = self.stage(sender, legs)?;
        self.balances.extend(staged);
        Ok(())
    }
}
