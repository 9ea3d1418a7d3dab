//! Security Hardening Tests
//!
//! Adversarial testing of the bank against its external ledger:
//! - Rejected payouts (blocklisting token) and rollback
//! - Rejected pulls
//! - Arithmetic overflow
//! - Permission escalation
//! - Failure idempotence
//! - Fuzz testing (proptest)
//! - ABI freeze

use std::collections::HashSet;

use contracts::errors::{BankError, LedgerError};
use contracts::token::{AssetLedger, InMemoryToken, TransferLeg};
use contracts::vault::Bank;
use contracts::CONTRACT_ABI_VERSION;
use rust_decimal::Decimal;
use types::fee::FeeRate;
use types::ids::AccountId;
use types::numeric::Amount;

/// Token that refuses to pay blocklisted recipients and can be told to refuse
/// every pull.
#[derive(Debug, Default)]
struct BlocklistToken {
    inner: InMemoryToken,
    blocked: HashSet<AccountId>,
    reject_pulls: bool,
}

impl AssetLedger for BlocklistToken {
    fn balance_of(&self, account: &AccountId) -> Amount {
        self.inner.balance_of(account)
    }

    fn allowance(&self, owner: &AccountId, spender: &AccountId) -> Amount {
        self.inner.allowance(owner, spender)
    }

    fn transfer_from(
        &mut self,
        spender: &AccountId,
        owner: &AccountId,
        recipient: &AccountId,
        amount: Amount,
    ) -> Result<(), LedgerError> {
        if self.reject_pulls {
            return Err(LedgerError::Rejected {
                reason: "pulls disabled".to_string(),
            });
        }
        self.inner.transfer_from(spender, owner, recipient, amount)
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
        if let Some(leg) = legs.iter().find(|leg| self.blocked.contains(&leg.recipient)) {
            return Err(LedgerError::Rejected {
                reason: format!("recipient {} is blocklisted", leg.recipient),
            });
        }
        self.inner.transfer_batch(sender, legs)
    }
}

struct Actors {
    admin: AccountId,
    fees: AccountId,
    user: AccountId,
}

fn setup_bank() -> (Bank<BlocklistToken>, Actors) {
    let actors = Actors {
        admin: AccountId::new(),
        fees: AccountId::new(),
        user: AccountId::new(),
    };
    let bank = Bank::new(
        actors.admin,
        actors.fees,
        AccountId::new(),
        FeeRate::from_bps(30).unwrap(),
        BlocklistToken::default(),
    )
    .unwrap();
    (bank, actors)
}

fn fund(bank: &mut Bank<BlocklistToken>, user: &AccountId, amount: u128) {
    let custody = *bank.custody();
    let token = &mut bank.asset_mut().inner;
    token.mint(user, Amount::new(amount)).unwrap();
    token.approve(user, &custody, Amount::new(amount));
}

fn fund_in_memory(bank: &mut Bank<InMemoryToken>, user: &AccountId, amount: u128) {
    let custody = *bank.custody();
    let token = bank.asset_mut();
    token.mint(user, Amount::new(amount)).unwrap();
    token.approve(user, &custody, Amount::new(amount));
}

// ═══════════════════════════════════════════════════════════════════
// Payout Rollback Tests
// ═══════════════════════════════════════════════════════════════════

#[test]
fn test_blocked_fee_recipient_rolls_back_whole_withdrawal() {
    let (mut bank, actors) = setup_bank();
    fund(&mut bank, &actors.user, 1000);
    bank.deposit(&actors.user, Amount::new(1000)).unwrap();

    bank.asset_mut().blocked.insert(actors.fees);
    let result = bank.withdraw(&actors.user, Amount::new(1000));
    assert!(matches!(
        result,
        Err(BankError::TransferFailed(LedgerError::Rejected { .. }))
    ));

    // Neither leg paid, debit restored
    assert_eq!(bank.balance_of(&actors.user), Amount::new(1000));
    assert_eq!(bank.asset().balance_of(&actors.user), Amount::ZERO);
    assert_eq!(bank.asset().balance_of(&actors.fees), Amount::ZERO);
    assert_eq!(bank.custody_balance(), Amount::new(1000));
    assert_eq!(bank.events().len(), 1, "only the deposit was committed");
}

#[test]
fn test_blocked_user_rolls_back_whole_withdrawal() {
    let (mut bank, actors) = setup_bank();
    fund(&mut bank, &actors.user, 1000);
    bank.deposit(&actors.user, Amount::new(1000)).unwrap();

    bank.asset_mut().blocked.insert(actors.user);
    assert!(bank.withdraw(&actors.user, Amount::new(400)).is_err());
    assert_eq!(bank.balance_of(&actors.user), Amount::new(1000));
    assert_eq!(bank.asset().balance_of(&actors.fees), Amount::ZERO);
    assert!(bank.is_solvent());
}

#[test]
fn test_zero_fee_leg_skipped() {
    let (mut bank, actors) = setup_bank();
    fund(&mut bank, &actors.user, 100);
    bank.deposit(&actors.user, Amount::new(100)).unwrap();

    // 0.3% of 100 rounds down to 0, so a blocklisted fee recipient is never touched.
    bank.asset_mut().blocked.insert(actors.fees);
    bank.withdraw(&actors.user, Amount::new(100)).unwrap();
    assert_eq!(bank.asset().balance_of(&actors.user), Amount::new(100));
}

// ═══════════════════════════════════════════════════════════════════
// Pull Rejection Tests
// ═══════════════════════════════════════════════════════════════════

#[test]
fn test_rejected_pull_leaves_ledger_unchanged() {
    let (mut bank, actors) = setup_bank();
    fund(&mut bank, &actors.user, 1000);
    bank.asset_mut().reject_pulls = true;

    let result = bank.deposit(&actors.user, Amount::new(1000));
    assert!(matches!(result, Err(BankError::TransferFailed(_))));
    assert_eq!(bank.balance_of(&actors.user), Amount::ZERO);
    assert_eq!(bank.custody_balance(), Amount::ZERO);
    assert_eq!(bank.asset().balance_of(&actors.user), Amount::new(1000));
}

#[test]
fn test_partial_allowance_rejected() {
    let (mut bank, actors) = setup_bank();
    let custody = *bank.custody();
    bank.asset_mut().inner.mint(&actors.user, Amount::new(1000)).unwrap();
    bank.asset_mut()
        .inner
        .approve(&actors.user, &custody, Amount::new(999));

    let result = bank.deposit(&actors.user, Amount::new(1000));
    assert_eq!(
        result,
        Err(BankError::InsufficientAllowance {
            required: "1000".to_string(),
            granted: "999".to_string(),
        })
    );
    assert_eq!(bank.asset().allowance(&actors.user, &custody), Amount::new(999));
}

// ═══════════════════════════════════════════════════════════════════
// Overflow Tests
// ═══════════════════════════════════════════════════════════════════

#[test]
fn test_deposit_overflow_detected_before_pull() {
    let (mut bank, actors) = setup_bank();
    let custody = *bank.custody();
    let token = &mut bank.asset_mut().inner;
    token.mint(&actors.user, Amount::MAX).unwrap();
    token.approve(&actors.user, &custody, Amount::MAX);

    bank.deposit(&actors.user, Amount::MAX).unwrap();
    assert_eq!(bank.balance_of(&actors.user), Amount::MAX);

    // Custody now holds the entire supply; the user approves another unit
    // which the credit could not represent.
    bank.asset_mut()
        .inner
        .approve(&actors.user, &custody, Amount::new(1));
    let result = bank.deposit(&actors.user, Amount::new(1));
    assert_eq!(result, Err(BankError::ArithmeticOverflow));

    // Allowance untouched: nothing was pulled
    assert_eq!(bank.asset().allowance(&actors.user, &custody), Amount::new(1));
    assert_eq!(bank.balance_of(&actors.user), Amount::MAX);
}

#[test]
fn test_withdraw_max_balance_fee_exact() {
    let (mut bank, actors) = setup_bank();
    let custody = *bank.custody();
    let token = &mut bank.asset_mut().inner;
    token.mint(&actors.user, Amount::MAX).unwrap();
    token.approve(&actors.user, &custody, Amount::MAX);
    bank.deposit(&actors.user, Amount::MAX).unwrap();

    bank.withdraw(&actors.user, Amount::MAX).unwrap();
    let paid = bank.asset().balance_of(&actors.user);
    let fee = bank.asset().balance_of(&actors.fees);
    assert_eq!(paid.checked_add(fee).unwrap(), Amount::MAX);
    assert_eq!(bank.balance_of(&actors.user), Amount::ZERO);
}

// ═══════════════════════════════════════════════════════════════════
// Permission Tests
// ═══════════════════════════════════════════════════════════════════

#[test]
fn test_non_admin_cannot_set_fee() {
    let (mut bank, actors) = setup_bank();
    let before = bank.fee_rate();

    for caller in [actors.user, actors.fees, *bank.custody(), AccountId::new()] {
        let result = bank.set_fee_rate(&caller, Decimal::ZERO);
        assert!(matches!(result, Err(BankError::Unauthorized { .. })));
    }
    assert_eq!(bank.fee_rate(), before);
}

#[test]
fn test_unauthorized_checked_before_bounds() {
    let (mut bank, actors) = setup_bank();
    let result = bank.set_fee_rate(&actors.user, Decimal::from(5));
    assert!(matches!(result, Err(BankError::Unauthorized { .. })));
}

#[test]
fn test_withdraw_cannot_touch_other_balance() {
    let (mut bank, actors) = setup_bank();
    let victim = AccountId::new();
    fund(&mut bank, &victim, 1000);
    bank.deposit(&victim, Amount::new(1000)).unwrap();

    let result = bank.withdraw(&actors.user, Amount::new(1));
    assert!(matches!(result, Err(BankError::InsufficientBalance { .. })));
    assert_eq!(bank.balance_of(&victim), Amount::new(1000));
}

#[test]
fn test_admin_has_no_balance_privilege() {
    let (mut bank, actors) = setup_bank();
    fund(&mut bank, &actors.user, 1000);
    bank.deposit(&actors.user, Amount::new(1000)).unwrap();

    let result = bank.withdraw(&actors.admin, Amount::new(1000));
    assert!(matches!(result, Err(BankError::InsufficientBalance { .. })));
    assert_eq!(bank.balance_of(&actors.user), Amount::new(1000));
}

// ═══════════════════════════════════════════════════════════════════
// Failure Idempotence
// ═══════════════════════════════════════════════════════════════════

#[test]
fn test_deposit_retry_after_granting_allowance() {
    let (mut bank, actors) = setup_bank();
    let custody = *bank.custody();
    bank.asset_mut().inner.mint(&actors.user, Amount::new(1000)).unwrap();

    assert!(bank.deposit(&actors.user, Amount::new(1000)).is_err());

    bank.asset_mut()
        .inner
        .approve(&actors.user, &custody, Amount::new(1000));
    bank.deposit(&actors.user, Amount::new(1000)).unwrap();

    assert_eq!(bank.balance_of(&actors.user), Amount::new(1000));
    assert_eq!(bank.custody_balance(), Amount::new(1000));
    assert_eq!(bank.asset().allowance(&actors.user, &custody), Amount::ZERO);
    assert_eq!(bank.events().len(), 1);
}

#[test]
fn test_withdraw_retry_after_unblocking() {
    let (mut bank, actors) = setup_bank();
    fund(&mut bank, &actors.user, 1000);
    bank.deposit(&actors.user, Amount::new(1000)).unwrap();

    bank.asset_mut().blocked.insert(actors.fees);
    assert!(bank.withdraw(&actors.user, Amount::new(1000)).is_err());

    bank.asset_mut().blocked.clear();
    bank.withdraw(&actors.user, Amount::new(1000)).unwrap();

    assert_eq!(bank.balance_of(&actors.user), Amount::ZERO);
    assert_eq!(bank.asset().balance_of(&actors.user), Amount::new(997));
    assert_eq!(bank.asset().balance_of(&actors.fees), Amount::new(3));
    assert_eq!(bank.custody_balance(), Amount::ZERO);
}

// ═══════════════════════════════════════════════════════════════════
// Fuzz Tests (proptest)
// ═══════════════════════════════════════════════════════════════════

mod fuzz {
    use super::*;
    use proptest::prelude::*;

    #[derive(Debug, Clone)]
    enum Op {
        Deposit(usize, u128),
        Withdraw(usize, u128),
        SetFee(u32),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0usize..3, 0u128..=5_000).prop_map(|(u, a)| Op::Deposit(u, a)),
            (0usize..3, 0u128..=5_000).prop_map(|(u, a)| Op::Withdraw(u, a)),
            (0u32..=10_000).prop_map(Op::SetFee),
        ]
    }

    proptest! {
        /// Invariant: custody always equals the sum of credited balances and
        /// every unit pulled in is accounted for by balances or payouts.
        #[test]
        fn fuzz_conservation(ops in prop::collection::vec(op(), 1..60)) {
            let admin = AccountId::new();
            let fees = AccountId::new();
            let users = [AccountId::new(), AccountId::new(), AccountId::new()];
            let mut bank = Bank::new(admin, fees, AccountId::new(), FeeRate::ZERO, InMemoryToken::new()).unwrap();
            for user in &users {
                fund_in_memory(&mut bank, user, 20_000);
            }

            for op in ops {
                match op {
                    Op::Deposit(u, a) => { let _ = bank.deposit(&users[u], Amount::new(a)); }
                    Op::Withdraw(u, a) => { let _ = bank.withdraw(&users[u], Amount::new(a)); }
                    Op::SetFee(bps) => { bank.set_fee_rate_bps(&admin, bps).unwrap(); }
                }
                prop_assert_eq!(bank.total_credited(), bank.custody_balance());
            }

            let mut outside = bank.asset().balance_of(&fees).units();
            for user in &users {
                outside += bank.asset().balance_of(user).units();
            }
            prop_assert_eq!(outside + bank.custody_balance().units(), 60_000);
        }

        /// Invariant: a successful withdrawal debits exactly `amount` and pays
        /// exactly `fee + net == amount` out of custody.
        #[test]
        fn fuzz_withdraw_split_exact(
            deposit in 1u128..=1_000_000,
            pct in 0u128..=100,
            bps in 0u32..=10_000,
        ) {
            let admin = AccountId::new();
            let fees = AccountId::new();
            let user = AccountId::new();
            let mut bank = Bank::new(admin, fees, AccountId::new(), FeeRate::ZERO, InMemoryToken::new()).unwrap();
            fund_in_memory(&mut bank, &user, deposit);
            bank.deposit(&user, Amount::new(deposit)).unwrap();
            bank.set_fee_rate_bps(&admin, bps).unwrap();

            let amount = (deposit * pct / 100).max(1);
            let external_before = bank.asset().balance_of(&user).units();
            bank.withdraw(&user, Amount::new(amount)).unwrap();

            let net = bank.asset().balance_of(&user).units() - external_before;
            let fee = bank.asset().balance_of(&fees).units();
            prop_assert_eq!(net + fee, amount);
            prop_assert_eq!(fee, amount * bps as u128 / 10_000);
            prop_assert_eq!(bank.balance_of(&user).units(), deposit - amount);
        }

        /// Invariant: over-withdrawal always fails and changes nothing.
        #[test]
        fn fuzz_over_withdraw_rejected(
            deposit in 1u128..=1_000_000,
            excess in 1u128..=1_000_000,
        ) {
            let user = AccountId::new();
            let mut bank = Bank::new(AccountId::new(), AccountId::new(), AccountId::new(), FeeRate::ZERO, InMemoryToken::new()).unwrap();
            fund_in_memory(&mut bank, &user, deposit);
            bank.deposit(&user, Amount::new(deposit)).unwrap();

            let result = bank.withdraw(&user, Amount::new(deposit + excess));
            let is_insufficient = matches!(result, Err(BankError::InsufficientBalance { .. }));
            prop_assert!(is_insufficient);
            prop_assert_eq!(bank.balance_of(&user).units(), deposit);
            prop_assert_eq!(bank.custody_balance().units(), deposit);
        }
    }
}

// ═══════════════════════════════════════════════════════════════════
// Test Upgrade Path (ABI Freeze)
// ═══════════════════════════════════════════════════════════════════

#[test]
fn test_abi_version_frozen() {
    assert_eq!(CONTRACT_ABI_VERSION, "1.0.0");
}
