//! Block reward, uncle reward, and the DAO hard fork's irregular state
//! transition.
//!
//! Grounded on the standard "collect increments, then apply" split: compute
//! every balance delta owed at the end of a block before touching world
//! state, so a failure partway through applying them still leaves world
//! state consistent with whatever checkpoint restore rolls back to.

use alloy_primitives::{Address, U256};
use blockproc_chainspec::ChainSpec;
use blockproc_errors::BlockExecutionError;
use blockproc_primitives::{constants::DAO_HARDFORK_BENEFICIARY, Header};
use blockproc_world_state::WorldState;
use std::collections::HashMap;

/// Computes the ommer and block reward owed to each beneficiary, or an
/// empty map once block rewards are disabled (post-merge).
pub fn balance_increments(
    spec: &ChainSpec,
    block_number: u64,
    beneficiary: Address,
    total_difficulty: U256,
    terminal_total_difficulty: Option<U256>,
    ommers: &[Header],
) -> HashMap<Address, u128> {
    let mut increments = HashMap::new();
    let Some(base_reward) =
        spec.base_block_reward(block_number, total_difficulty, terminal_total_difficulty)
    else {
        return increments
    };

    for ommer in ommers {
        let reward = blockproc_chainspec::calc::ommer_reward(base_reward, block_number, ommer.number);
        *increments.entry(ommer.beneficiary).or_default() += saturating_u128(reward);
    }

    let reward = blockproc_chainspec::calc::block_reward(base_reward, ommers.len());
    *increments.entry(beneficiary).or_default() += saturating_u128(reward);

    increments
}

fn saturating_u128(value: U256) -> u128 {
    value.try_into().unwrap_or(u128::MAX)
}

/// Applies a single balance increment, creating the account if it does not
/// exist yet rather than treating the increment as a transfer out of thin
/// air.
pub fn apply_increment<W: WorldState>(
    world_state: &mut W,
    address: Address,
    amount: u128,
) -> Result<(), BlockExecutionError> {
    if amount == 0 {
        return Ok(())
    }
    if world_state.account_exists(address)? {
        world_state.add_to_balance(address, amount)
    } else {
        world_state.create_account(address, amount)
    }
}

/// Applies the DAO hard fork's irregular state transition at the exact
/// block where it activates: every account in `dao_accounts` is drained and
/// the total credited to [`DAO_HARDFORK_BENEFICIARY`].
///
/// No-op on any other block.
pub fn apply_dao_hardfork<W: WorldState>(
    world_state: &mut W,
    spec: &ChainSpec,
    block_number: u64,
    dao_accounts: &[Address],
) -> Result<(), BlockExecutionError> {
    if !spec.is_dao_transition_block(block_number) {
        return Ok(())
    }

    let mut drained: u128 = 0;
    for &account in dao_accounts {
        if world_state.account_exists(account)? {
            let balance = world_state.balance(account)?;
            world_state.subtract_from_balance(account, balance)?;
            drained = drained.checked_add(balance).ok_or_else(|| {
                BlockExecutionError::StateFailure("DAO drain overflowed account balance sum".into())
            })?;
        }
    }

    apply_increment(world_state, DAO_HARDFORK_BENEFICIARY, drained)
}
