//! DAO-transition applier: the one-shot irregular state transition at the
//! DAO hard fork's activation height, wired to the chain spec's configured
//! account list.

use blockproc_chainspec::ChainSpec;
use blockproc_errors::BlockExecutionError;
use blockproc_evm::reward::apply_dao_hardfork;
use blockproc_world_state::WorldState;

/// Applies the DAO hard fork's irregular state transition if `block_number`
/// is exactly the configured activation height; a no-op otherwise.
pub fn apply_if_transition_block<W: WorldState>(
    world_state: &mut W,
    spec: &ChainSpec,
    block_number: u64,
) -> Result<(), BlockExecutionError> {
    apply_dao_hardfork(world_state, spec, block_number, &spec.dao_drained_accounts)
}
