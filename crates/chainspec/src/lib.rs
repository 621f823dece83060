//! Protocol rules resolver.
//!
//! Maps a block header to the active rules: EIP activation flags, the gas
//! schedule, and the block reward schedule. [`ChainSpec`] is built once
//! (usually from network genesis metadata) and is a pure function of
//! header content thereafter - no mutable state, no I/O.

pub mod calc;

use alloy_primitives::{Address, U256};
use std::collections::BTreeMap;

/// A named protocol upgrade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Hardfork {
    /// The 2016 DAO bailout hard fork.
    Dao,
    /// Byzantium: EIP-658 receipt status, reduced block reward.
    Byzantium,
    /// Constantinople: further reduced block reward.
    Constantinople,
    /// Shanghai: EIP-4895 withdrawals.
    Shanghai,
    /// Cancun: EIP-4788 beacon root, EIP-4844 blob gas.
    Cancun,
}

/// When a [`Hardfork`] activates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForkCondition {
    /// Activates at or after a given block number.
    Block(u64),
    /// Activates at or after a given block timestamp.
    Timestamp(u64),
    /// Never activates on this chain.
    Never,
}

impl ForkCondition {
    /// Returns `true` if the fork is active for the given header coordinates.
    pub fn active_at(&self, block_number: u64, timestamp: u64) -> bool {
        match *self {
            Self::Block(at) => block_number >= at,
            Self::Timestamp(at) => timestamp >= at,
            Self::Never => false,
        }
    }
}

/// An immutable bundle of protocol rules, keyed by [`Hardfork`].
///
/// Chain specs are pure functions of header content: the same header always
/// resolves to the same activation flags.
#[derive(Debug, Clone)]
pub struct ChainSpec {
    forks: BTreeMap<Hardfork, ForkCondition>,
    /// Block number at which the DAO irregular state transition fires, if any.
    pub dao_activation_height: Option<u64>,
    /// Accounts drained into the DAO withdrawal beneficiary at
    /// `dao_activation_height`.
    pub dao_drained_accounts: Vec<Address>,
    /// Whether genesis state is unavailable locally (so block 0's suggested
    /// state root must be trusted rather than recomputed).
    pub genesis_state_unavailable: bool,
}

impl ChainSpec {
    /// Starts building a chain spec with every fork disabled.
    pub fn builder() -> ChainSpecBuilder {
        ChainSpecBuilder::default()
    }

    /// Returns the activation condition for `fork`, defaulting to `Never`.
    pub fn fork(&self, fork: Hardfork) -> ForkCondition {
        self.forks.get(&fork).copied().unwrap_or(ForkCondition::Never)
    }

    /// Returns `true` if `fork` transitions exactly at `block_number`, i.e.
    /// this is the one block where the irregular state change (if any) fires.
    pub fn fork_transitions_at_block(&self, fork: Hardfork, block_number: u64) -> bool {
        self.fork(fork) == ForkCondition::Block(block_number)
    }

    /// Returns `true` if `fork` is active at the given header coordinates.
    pub fn is_active(&self, fork: Hardfork, block_number: u64, timestamp: u64) -> bool {
        self.fork(fork).active_at(block_number, timestamp)
    }

    /// Returns `true` if Shanghai is active at `timestamp` (withdrawals applier gate).
    pub fn is_shanghai_active_at_timestamp(&self, timestamp: u64) -> bool {
        matches!(self.fork(Hardfork::Shanghai), ForkCondition::Timestamp(at) if timestamp >= at)
    }

    /// Returns `true` if Cancun is active at `timestamp` (beacon-root handler gate).
    pub fn is_cancun_active_at_timestamp(&self, timestamp: u64) -> bool {
        matches!(self.fork(Hardfork::Cancun), ForkCondition::Timestamp(at) if timestamp >= at)
    }

    /// Returns `true` if this is the exact block at which the DAO irregular
    /// state transition fires.
    pub fn is_dao_transition_block(&self, block_number: u64) -> bool {
        self.dao_activation_height == Some(block_number)
    }

    /// Computes the base block reward for `block_number`, or `None` if block
    /// rewards are disabled (post-merge, i.e. `total_difficulty` no longer
    /// increases).
    pub fn base_block_reward(
        &self,
        block_number: u64,
        total_difficulty: U256,
        terminal_total_difficulty: Option<U256>,
    ) -> Option<U256> {
        if let Some(ttd) = terminal_total_difficulty {
            if total_difficulty >= ttd {
                return None
            }
        }
        Some(calc::base_block_reward(
            self.is_active(Hardfork::Byzantium, block_number, 0),
            self.is_active(Hardfork::Constantinople, block_number, 0),
        ))
    }
}

/// Builder for [`ChainSpec`].
#[derive(Debug, Default)]
pub struct ChainSpecBuilder {
    forks: BTreeMap<Hardfork, ForkCondition>,
    dao_activation_height: Option<u64>,
    dao_drained_accounts: Vec<Address>,
    genesis_state_unavailable: bool,
}

impl ChainSpecBuilder {
    /// Activates `fork` under `condition`.
    pub fn with_fork(mut self, fork: Hardfork, condition: ForkCondition) -> Self {
        self.forks.insert(fork, condition);
        self
    }

    /// Sets the DAO transition height.
    pub fn with_dao_activation_height(mut self, height: u64) -> Self {
        self.dao_activation_height = Some(height);
        self
    }

    /// Sets the accounts drained at the DAO transition height.
    pub fn with_dao_drained_accounts(mut self, accounts: Vec<Address>) -> Self {
        self.dao_drained_accounts = accounts;
        self
    }

    /// Marks genesis state as locally unavailable.
    pub fn genesis_state_unavailable(mut self) -> Self {
        self.genesis_state_unavailable = true;
        self
    }

    /// Builds the chain spec.
    pub fn build(self) -> ChainSpec {
        ChainSpec {
            forks: self.forks,
            dao_activation_height: self.dao_activation_height,
            dao_drained_accounts: self.dao_drained_accounts,
            genesis_state_unavailable: self.genesis_state_unavailable,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fork_activation_by_block_and_timestamp() {
        let spec = ChainSpec::builder()
            .with_fork(Hardfork::Byzantium, ForkCondition::Block(100))
            .with_fork(Hardfork::Shanghai, ForkCondition::Timestamp(1000))
            .build();

        assert!(!spec.is_active(Hardfork::Byzantium, 99, 0));
        assert!(spec.is_active(Hardfork::Byzantium, 100, 0));
        assert!(!spec.is_shanghai_active_at_timestamp(999));
        assert!(spec.is_shanghai_active_at_timestamp(1000));
    }

    #[test]
    fn dao_transition_fires_once_at_exact_height() {
        let spec = ChainSpec::builder().with_dao_activation_height(1_920_000).build();
        assert!(spec.is_dao_transition_block(1_920_000));
        assert!(!spec.is_dao_transition_block(1_920_001));
    }

    #[test]
    fn base_reward_disabled_post_merge() {
        let spec = ChainSpec::builder().build();
        let reward = spec.base_block_reward(15_500_000, U256::from(100u64), Some(U256::from(50u64)));
        assert!(reward.is_none());
    }
}
