//! Shared security primitives for the bank
//!
//! Reentrancy guard and administrator access control.

use types::ids::AccountId;

use crate::errors::BankError;

/// Reentrancy guard preventing nested calls into protected functions.
///
/// A bank operation acquires the guard before touching state and releases it
/// on completion, whether it succeeded or failed. Any nested call attempt fails.
#[derive(Debug, Clone)]
pub struct ReentrancyGuard {
    locked: bool,
}

impl ReentrancyGuard {
    /// Create a new unlocked guard.
    pub fn new() -> Self {
        Self { locked: false }
    }

    /// Acquire the guard. Returns `true` if successfully acquired.
    /// Returns `false` if already locked (reentrancy attempt).
    pub fn acquire(&mut self) -> bool {
        if self.locked {
            return false;
        }
        self.locked = true;
        true
    }

    /// Release the guard.
    pub fn release(&mut self) {
        self.locked = false;
    }

    /// Check if currently locked.
    pub fn is_locked(&self) -> bool {
        self.locked
    }
}

impl Default for ReentrancyGuard {
    fn default() -> Self {
        Self::new()
    }
}

/// Single-administrator access control.
///
/// The administrator is fixed at construction; authorization is identity
/// equality with the caller.
#[derive(Debug, Clone)]
pub struct AccessControl {
    admin: AccountId,
}

impl AccessControl {
    pub fn new(admin: AccountId) -> Self {
        Self { admin }
    }

    /// Check if a caller is admin.
    pub fn is_admin(&self, caller: &AccountId) -> bool {
        *caller == self.admin
    }

    /// Fail with `Unauthorized` unless the caller is the administrator.
    pub fn ensure_admin(&self, caller: &AccountId) -> Result<(), BankError> {
        if !self.is_admin(caller) {
            return Err(BankError::Unauthorized {
                caller: caller.to_string(),
            });
        }
        Ok(())
    }

    /// Get the current admin identifier.
    pub fn admin(&self) -> &AccountId {
        &self.admin
    }
}
