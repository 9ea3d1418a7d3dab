//! Balance ledger: the system of record for funds available to withdraw
//!
//! Maps each account to its credited internal balance. Entries are created
//! implicitly at zero, grow only through deposits and shrink only through
//! withdrawals. The running total of all entries is kept alongside so the
//! conservation invariant against custody can be checked cheaply.

use std::collections::HashMap;

use tracing::debug;
use types::ids::AccountId;
use types::numeric::Amount;

use crate::errors::BankError;

#[derive(Debug, Clone, Default)]
pub struct BalanceLedger {
    balances: HashMap<AccountId, Amount>,
    total: Amount,
}

impl BalanceLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credited balance of `account`; zero if it never deposited.
    pub fn balance_of(&self, account: &AccountId) -> Amount {
        self.balances.get(account).copied().unwrap_or(Amount::ZERO)
    }

    /// Sum of every entry
    pub fn total_credited(&self) -> Amount {
        self.total
    }

    /// Number of entries ever created
    pub fn accounts(&self) -> usize {
        self.balances.len()
    }

    /// Compute the balances a credit would produce without applying it.
    ///
    /// Returns `(new_entry, new_total)`.
    pub(crate) fn preview_credit(
        &self,
        account: &AccountId,
        amount: Amount,
    ) -> Result<(Amount, Amount), BankError> {
        if amount.is_zero() {
            return Err(BankError::InvalidAmount);
        }
        let entry = self.balance_of(account).checked_add(amount)?;
        let total = self.total.checked_add(amount)?;
        Ok((entry, total))
    }

    /// Increase `account` by `amount`, returning the new balance.
    pub(crate) fn credit(&mut self, account: &AccountId, amount: Amount) -> Result<Amount, BankError> {
        let (entry, total) = self.preview_credit(account, amount)?;
        self.balances.insert(*account, entry);
        self.total = total;
        debug!(account = %account, amount = %amount, balance = %entry, "ledger credit");
        Ok(entry)
    }

    /// Decrease `account` by `amount`, returning the new balance.
    ///
    /// Fails with `InsufficientBalance` when `amount` exceeds the entry; the
    /// entry is left untouched on any failure.
    pub(crate) fn debit(&mut self, account: &AccountId, amount: Amount) -> Result<Amount, BankError> {
        if amount.is_zero() {
            return Err(BankError::InvalidAmount);
        }
        let current = self.balance_of(account);
        let entry = current
            .checked_sub(amount)
            .map_err(|_| BankError::InsufficientBalance {
                account: account.to_string(),
                required: amount.to_string(),
                available: current.to_string(),
            })?;
        let total = self.total.checked_sub(amount)?;

        self.balances.insert(*account, entry);
        self.total = total;
        debug!(account = %account, amount = %amount, balance = %entry, "ledger debit");
        Ok(entry)
    }
}
