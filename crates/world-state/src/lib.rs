//! The world-state façade.
//!
//! This crate defines the narrow mutation interface the rest of the
//! workspace consumes - balance math, account existence/creation, commit
//! points, state-root recomputation, and reset to a prior root. The actual
//! persistent trie and its caches are out of scope; [`InMemoryWorldState`]
//! is a reference implementation good enough for tests and for exercising
//! every invariant the checkpoint/restore discipline relies on.

use alloy_primitives::{keccak256, Address, BlockNumber, B256};
use blockproc_chainspec::ChainSpec;
use blockproc_errors::BlockExecutionError;
use std::collections::BTreeMap;

/// A captured state-root value sufficient to restore world state after
/// arbitrary mutations.
pub type Checkpoint = B256;

/// The mutation interface the branch driver and per-block pipeline consume.
///
/// Implementations must uphold:
/// - every successful commit advances `state_root` along the branch;
/// - `reset_to` any previously observed root restores behavior equivalent
///   to before any subsequent mutation;
/// - `commit` is idempotent within a block (calling it twice with no
///   intervening mutation does not change the root).
pub trait WorldState {
    /// Returns the current state-root fingerprint.
    fn state_root(&self) -> B256;

    /// Resets world state to a previously observed root.
    ///
    /// Returns an error if `root` was never observed (the store has no
    /// snapshot to restore from).
    fn reset_to(&mut self, root: B256) -> Result<(), BlockExecutionError>;

    /// Commits pending mutations under the given protocol rules, advancing
    /// `state_root`.
    fn commit(&mut self, spec: &ChainSpec) -> Result<(), BlockExecutionError>;

    /// Commits the underlying trie at a specific block number.
    fn commit_tree(&mut self, block_number: BlockNumber) -> Result<(), BlockExecutionError>;

    /// Recomputes and returns the state root from current account state,
    /// without committing.
    fn recalculate_state_root(&mut self) -> Result<B256, BlockExecutionError>;

    /// Returns `true` if `address` has been created in this world state.
    fn account_exists(&self, address: Address) -> Result<bool, BlockExecutionError>;

    /// Creates a new account with `balance` as its opening balance. Not a
    /// transfer (creation, not addition, for a previously empty account).
    fn create_account(&mut self, address: Address, balance: u128) -> Result<(), BlockExecutionError>;

    /// Adds `value` to an existing account's balance.
    ///
    /// Returns [`BlockExecutionError::StateFailure`] if the account does
    /// not exist; callers must check [`Self::account_exists`] first.
    fn add_to_balance(&mut self, address: Address, value: u128) -> Result<(), BlockExecutionError>;

    /// Subtracts `value` from an existing account's balance.
    fn subtract_from_balance(
        &mut self,
        address: Address,
        value: u128,
    ) -> Result<(), BlockExecutionError>;

    /// Returns an existing account's balance.
    fn balance(&self, address: Address) -> Result<u128, BlockExecutionError>;

    /// Commits pending mutations, then notifies `on_commit` - the
    /// world-state analogue of a commit that also notifies a sub-tracer: a caller
    /// that wants reward/withdrawal-induced state deltas observed by a
    /// sub-tracer passes a closure that forwards to it.
    fn commit_observed(
        &mut self,
        spec: &ChainSpec,
        mut on_commit: impl FnMut(),
    ) -> Result<(), BlockExecutionError>
    where
        Self: Sized,
    {
        self.commit(spec)?;
        on_commit();
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Account {
    balance: u128,
    nonce: u64,
}

/// An in-memory reference [`WorldState`] implementation: a sorted account
/// map plus a history of snapshots keyed by the root they produced, so any
/// previously observed root can be restored exactly.
#[derive(Debug, Clone)]
pub struct InMemoryWorldState {
    accounts: BTreeMap<Address, Account>,
    history: BTreeMap<B256, BTreeMap<Address, Account>>,
    current_root: B256,
}

impl Default for InMemoryWorldState {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryWorldState {
    /// Creates an empty world state whose root is the hash of the empty account set.
    pub fn new() -> Self {
        let accounts = BTreeMap::new();
        let root = Self::hash_accounts(&accounts);
        let mut history = BTreeMap::new();
        history.insert(root, accounts.clone());
        Self { accounts, history, current_root: root }
    }

    fn hash_accounts(accounts: &BTreeMap<Address, Account>) -> B256 {
        let mut buf = Vec::with_capacity(accounts.len() * 64);
        for (address, account) in accounts {
            buf.extend_from_slice(address.as_slice());
            buf.extend_from_slice(&account.balance.to_be_bytes());
            buf.extend_from_slice(&account.nonce.to_be_bytes());
        }
        keccak256(buf)
    }
}

impl WorldState for InMemoryWorldState {
    fn state_root(&self) -> B256 {
        self.current_root
    }

    fn reset_to(&mut self, root: B256) -> Result<(), BlockExecutionError> {
        let snapshot = self.history.get(&root).ok_or_else(|| {
            BlockExecutionError::StateFailure(format!("no snapshot recorded for root {root}"))
        })?;
        self.accounts = snapshot.clone();
        self.current_root = root;
        Ok(())
    }

    fn commit(&mut self, _spec: &ChainSpec) -> Result<(), BlockExecutionError> {
        let root = Self::hash_accounts(&self.accounts);
        self.history.entry(root).or_insert_with(|| self.accounts.clone());
        self.current_root = root;
        Ok(())
    }

    fn commit_tree(&mut self, _block_number: BlockNumber) -> Result<(), BlockExecutionError> {
        Ok(())
    }

    fn recalculate_state_root(&mut self) -> Result<B256, BlockExecutionError> {
        let root = Self::hash_accounts(&self.accounts);
        self.current_root = root;
        self.history.entry(root).or_insert_with(|| self.accounts.clone());
        Ok(root)
    }

    fn account_exists(&self, address: Address) -> Result<bool, BlockExecutionError> {
        Ok(self.accounts.contains_key(&address))
    }

    fn create_account(&mut self, address: Address, balance: u128) -> Result<(), BlockExecutionError> {
        self.accounts.insert(address, Account { balance, nonce: 0 });
        Ok(())
    }

    fn add_to_balance(&mut self, address: Address, value: u128) -> Result<(), BlockExecutionError> {
        let account = self.accounts.get_mut(&address).ok_or_else(|| {
            BlockExecutionError::StateFailure(format!("account {address} does not exist"))
        })?;
        account.balance = account.balance.checked_add(value).ok_or_else(|| {
            BlockExecutionError::StateFailure(format!("balance overflow for account {address}"))
        })?;
        Ok(())
    }

    fn subtract_from_balance(
        &mut self,
        address: Address,
        value: u128,
    ) -> Result<(), BlockExecutionError> {
        let account = self.accounts.get_mut(&address).ok_or_else(|| {
            BlockExecutionError::StateFailure(format!("account {address} does not exist"))
        })?;
        account.balance = account.balance.checked_sub(value).ok_or_else(|| {
            BlockExecutionError::StateFailure(format!("insufficient balance for account {address}"))
        })?;
        Ok(())
    }

    fn balance(&self, address: Address) -> Result<u128, BlockExecutionError> {
        Ok(self.accounts.get(&address).map(|a| a.balance).unwrap_or_default())
    }
}
