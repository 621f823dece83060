//! EIP-4895 withdrawal application.
//!
//! Withdrawals are plain balance credits - no transaction, no gas, no
//! signature - applied after every other piece of a block's state
//! transition. Zero-valued withdrawals are real protocol messages but
//! produce no balance change, so they are filtered rather than applied as
//! a no-op increment.

use crate::reward::apply_increment;
use blockproc_chainspec::ChainSpec;
use blockproc_errors::BlockExecutionError;
use blockproc_primitives::Withdrawal;
use blockproc_world_state::WorldState;

/// Applies every withdrawal's balance credit if Shanghai is active at
/// `block_timestamp`. No-op (including no-op pre-Shanghai) if `withdrawals`
/// is `None`, matching headers that predate the withdrawals field entirely.
pub fn apply_withdrawals<W: WorldState>(
    world_state: &mut W,
    spec: &ChainSpec,
    block_timestamp: u64,
    withdrawals: Option<&[Withdrawal]>,
) -> Result<(), BlockExecutionError> {
    if !spec.is_shanghai_active_at_timestamp(block_timestamp) {
        return Ok(())
    }
    let Some(withdrawals) = withdrawals else { return Ok(()) };

    for withdrawal in withdrawals {
        if withdrawal.amount > 0 {
            apply_increment(world_state, withdrawal.address, withdrawal.amount_wei())?;
        }
    }
    Ok(())
}
