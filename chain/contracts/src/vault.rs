//! Bank: custody, deposits, fee-adjusted withdrawals and fee policy
//!
//! The bank holds a single fungible asset in custody on an external
//! [`AssetLedger`] and credits depositors on its internal [`BalanceLedger`].
//!
//! Ordering rules that keep every operation all-or-nothing:
//! - Deposit: validate, prove the credit cannot overflow, pull from the
//!   depositor, then credit. A rejected pull leaves nothing to undo.
//! - Withdraw: debit first, then settle the net and fee legs as one batch. A
//!   rejected batch pays nobody and the debit is restored.
//!
//! All state-changing operations run under the reentrancy guard.

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::{info, warn};
use types::fee::{FeeRate, FeeSplit};
use types::ids::AccountId;
use types::numeric::Amount;
use uuid::Uuid;

use crate::config::BankConfig;
use crate::errors::{BankError, ConfigError};
use crate::events::{ContractEvent, Deposited, FeeRateUpdated, Withdrawn};
use crate::ledger::BalanceLedger;
use crate::security::{AccessControl, ReentrancyGuard};
use crate::token::{AssetLedger, TransferLeg};

/// Custodial bank over an external asset ledger `L`.
#[derive(Debug)]
pub struct Bank<L> {
    /// External ledger holding the asset
    asset: L,
    /// The bank's own address on `asset`
    custody: AccountId,
    /// Credited internal balances
    balances: BalanceLedger,
    /// Receives the fee leg of every withdrawal
    fee_recipient: AccountId,
    fee_rate: FeeRate,
    access_control: AccessControl,
    reentrancy_guard: ReentrancyGuard,
    /// Emitted events log (append-only)
    events: Vec<ContractEvent>,
}

impl<L: AssetLedger> Bank<L> {
    /// Create a bank. `custody` is the identity the bank uses on `asset`.
    ///
    /// Fails if `custody` doubles as the administrator or the fee recipient.
    pub fn new(
        admin: AccountId,
        fee_recipient: AccountId,
        custody: AccountId,
        fee_rate: FeeRate,
        asset: L,
    ) -> Result<Self, ConfigError> {
        Self::from_config(
            BankConfig::new(admin, fee_recipient, custody).with_fee_rate(fee_rate),
            asset,
        )
    }

    /// Create a bank from validated configuration.
    pub fn from_config(config: BankConfig, asset: L) -> Result<Self, ConfigError> {
        config.validate()?;
        info!(
            admin = %config.admin,
            fee_recipient = %config.fee_recipient,
            custody = %config.custody,
            fee_rate = %config.fee_rate,
            "bank initialized"
        );
        Ok(Self {
            asset,
            custody: config.custody,
            balances: BalanceLedger::new(),
            fee_recipient: config.fee_recipient,
            fee_rate: config.fee_rate,
            access_control: AccessControl::new(config.admin),
            reentrancy_guard: ReentrancyGuard::new(),
            events: Vec::new(),
        })
    }

    // ───────────────────────── Deposit ─────────────────────────

    /// Pull `amount` from `caller` into custody and credit the caller.
    ///
    /// The caller must have granted the custody account an allowance of at
    /// least `amount` on the asset ledger.
    pub fn deposit(&mut self, caller: &AccountId, amount: Amount) -> Result<ContractEvent, BankError> {
        let result = self.guarded(|bank| bank.deposit_inner(caller, amount));
        if let Err(err) = &result {
            warn!(account = %caller, amount = %amount, error = %err, "deposit rejected");
        }
        result
    }

    fn deposit_inner(&mut self, caller: &AccountId, amount: Amount) -> Result<ContractEvent, BankError> {
        if amount.is_zero() {
            return Err(BankError::InvalidAmount);
        }
        if *caller == self.custody {
            return Err(BankError::Unauthorized {
                caller: caller.to_string(),
            });
        }

        // Surface overflow before any funds move.
        self.balances.preview_credit(caller, amount)?;

        let granted = self.asset.allowance(caller, &self.custody);
        if granted < amount {
            return Err(BankError::InsufficientAllowance {
                required: amount.to_string(),
                granted: granted.to_string(),
            });
        }

        self.asset
            .transfer_from(&self.custody, caller, &self.custody, amount)
            .map_err(BankError::TransferFailed)?;

        let new_balance = self.balances.credit(caller, amount)?;

        info!(account = %caller, amount = %amount, balance = %new_balance, "deposit committed");
        Ok(self.emit(ContractEvent::Deposited(Deposited {
            receipt_id: Uuid::now_v7(),
            account_id: *caller,
            amount,
            new_balance,
            recorded_at: Utc::now(),
        })))
    }

    // ───────────────────────── Withdraw ─────────────────────────

    /// Debit `amount` from `caller` and pay it out, net of the current fee.
    ///
    /// The caller receives `amount - fee`, the fee recipient receives `fee`
    /// where `fee = floor(amount * fee_rate)`.
    pub fn withdraw(&mut self, caller: &AccountId, amount: Amount) -> Result<ContractEvent, BankError> {
        let result = self.guarded(|bank| bank.withdraw_inner(caller, amount));
        if let Err(err) = &result {
            warn!(account = %caller, amount = %amount, error = %err, "withdrawal rejected");
        }
        result
    }

    fn withdraw_inner(&mut self, caller: &AccountId, amount: Amount) -> Result<ContractEvent, BankError> {
        if amount.is_zero() {
            return Err(BankError::InvalidAmount);
        }

        let new_balance = self.balances.debit(caller, amount)?;

        let split = match self.fee_rate.split(amount) {
            Ok(split) => split,
            Err(err) => {
                self.restore(caller, amount)?;
                return Err(err.into());
            }
        };

        let legs: Vec<TransferLeg> = [
            TransferLeg::new(*caller, split.net),
            TransferLeg::new(self.fee_recipient, split.fee),
        ]
        .into_iter()
        .filter(|leg| !leg.amount.is_zero())
        .collect();

        if let Err(err) = self.asset.transfer_batch(&self.custody, &legs) {
            self.restore(caller, amount)?;
            return Err(BankError::TransferFailed(err));
        }

        info!(
            account = %caller,
            amount = %amount,
            net = %split.net,
            fee = %split.fee,
            balance = %new_balance,
            "withdrawal committed"
        );
        Ok(self.emit(ContractEvent::Withdrawn(Withdrawn {
            receipt_id: Uuid::now_v7(),
            account_id: *caller,
            amount,
            net_amount: split.net,
            fee_amount: split.fee,
            fee_recipient: self.fee_recipient,
            new_balance,
            recorded_at: Utc::now(),
        })))
    }

    /// Undo a withdrawal debit after the payout was rejected.
    fn restore(&mut self, caller: &AccountId, amount: Amount) -> Result<(), BankError> {
        warn!(account = %caller, amount = %amount, "rolling back withdrawal debit");
        self.balances.credit(caller, amount).map(|_| ())
    }

    /// Preview the fee split for a withdrawal at the current rate.
    pub fn quote_withdrawal(&self, amount: Amount) -> Result<FeeSplit, BankError> {
        if amount.is_zero() {
            return Err(BankError::InvalidAmount);
        }
        Ok(self.fee_rate.split(amount)?)
    }

    // ───────────────────────── Fee Policy ─────────────────────────

    /// Replace the withdrawal fee rate. Admin-only; rate must lie in `[0, 1]`.
    pub fn set_fee_rate(&mut self, caller: &AccountId, rate: Decimal) -> Result<ContractEvent, BankError> {
        let result = self.guarded(|bank| {
            bank.access_control.ensure_admin(caller)?;
            let new_rate = FeeRate::new(rate)?;
            Ok(bank.apply_fee_rate(caller, new_rate))
        });
        if let Err(err) = &result {
            warn!(caller = %caller, rate = %rate, error = %err, "fee rate change rejected");
        }
        result
    }

    /// Replace the withdrawal fee rate, given in basis points. Admin-only.
    pub fn set_fee_rate_bps(&mut self, caller: &AccountId, bps: u32) -> Result<ContractEvent, BankError> {
        let result = self.guarded(|bank| {
            bank.access_control.ensure_admin(caller)?;
            let new_rate = FeeRate::from_bps(bps)?;
            Ok(bank.apply_fee_rate(caller, new_rate))
        });
        if let Err(err) = &result {
            warn!(caller = %caller, bps, error = %err, "fee rate change rejected");
        }
        result
    }

    fn apply_fee_rate(&mut self, caller: &AccountId, new_rate: FeeRate) -> ContractEvent {
        let old_rate = std::mem::replace(&mut self.fee_rate, new_rate);
        info!(admin = %caller, old_rate = %old_rate, new_rate = %new_rate, "fee rate updated");
        self.emit(ContractEvent::FeeRateUpdated(FeeRateUpdated {
            admin: *caller,
            old_rate,
            new_rate,
            recorded_at: Utc::now(),
        }))
    }

    // ───────────────────────── Queries ─────────────────────────

    /// Credited internal balance of `account`.
    pub fn balance_of(&self, account: &AccountId) -> Amount {
        self.balances.balance_of(account)
    }

    /// Sum of all credited balances.
    pub fn total_credited(&self) -> Amount {
        self.balances.total_credited()
    }

    /// Asset held by the custody account on the external ledger.
    pub fn custody_balance(&self) -> Amount {
        self.asset.balance_of(&self.custody)
    }

    /// Conservation: credited balances never exceed what custody holds.
    pub fn is_solvent(&self) -> bool {
        self.total_credited() <= self.custody_balance()
    }

    pub fn fee_rate(&self) -> FeeRate {
        self.fee_rate
    }

    pub fn fee_recipient(&self) -> &AccountId {
        &self.fee_recipient
    }

    pub fn custody(&self) -> &AccountId {
        &self.custody
    }

    pub fn admin(&self) -> &AccountId {
        self.access_control.admin()
    }

    /// Read access to the external asset ledger.
    pub fn asset(&self) -> &L {
        &self.asset
    }

    /// Mutable access to the external asset ledger, for fixture funding and
    /// allowance grants made outside the bank.
    pub fn asset_mut(&mut self) -> &mut L {
        &mut self.asset
    }

    // ───────────────────────── Events ─────────────────────────

    /// Get all emitted events.
    pub fn events(&self) -> &[ContractEvent] {
        &self.events
    }

    /// Drain all events (consume and clear).
    pub fn drain_events(&mut self) -> Vec<ContractEvent> {
        std::mem::take(&mut self.events)
    }

    fn emit(&mut self, event: ContractEvent) -> ContractEvent {
        self.events.push(event.clone());
        event
    }

    // ───────────────────────── Internal Guards ─────────────────────────

    /// Run `op` holding the reentrancy guard, releasing it on every path.
    fn guarded<T>(
        &mut self,
        op: impl FnOnce(&mut Self) -> Result<T, BankError>,
    ) -> Result<T, BankError> {
        if !self.reentrancy_guard.acquire() {
            return Err(BankError::Reentrancy);
        }
        let result = op(self);
        self.reentrancy_guard.release();
        result
    }
}
