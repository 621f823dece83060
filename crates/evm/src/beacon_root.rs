//! EIP-4788 beacon block root validation.
//!
//! The actual system call into the beacon-roots contract belongs to the
//! transaction executor this crate consumes rather than implements; this
//! module only decides *whether* that call should happen and validates the
//! header field it depends on, matching the executor's own genesis-block
//! special case.

use blockproc_chainspec::ChainSpec;
use blockproc_errors::{BlockExecutionError, BlockValidationError};
use alloy_primitives::{B256, U256};
use blockproc_primitives::constants::BEACON_ROOTS_HISTORY_BUFFER_LENGTH;

/// Validates `parent_beacon_block_root` against Cancun activation and the
/// genesis special case, returning the root the system call should be made
/// with, or `None` if no call is needed (Cancun inactive, or genesis).
pub fn resolve_beacon_root_call(
    spec: &ChainSpec,
    block_number: u64,
    block_timestamp: u64,
    parent_beacon_block_root: Option<B256>,
) -> Result<Option<B256>, BlockExecutionError> {
    if !spec.is_cancun_active_at_timestamp(block_timestamp) {
        return Ok(None)
    }

    let root = parent_beacon_block_root.ok_or(BlockValidationError::MissingParentBeaconBlockRoot)?;

    if block_number == 0 {
        if root != B256::ZERO {
            return Err(BlockValidationError::CancunGenesisParentBeaconBlockRootNotZero(root).into())
        }
        return Ok(None)
    }

    Ok(Some(root))
}

/// Computes the two storage slots the beacon-roots system contract writes
/// for a given timestamp: the ring-buffer slot holding the timestamp itself,
/// and the slot `BEACON_ROOTS_HISTORY_BUFFER_LENGTH` past it holding the root.
pub fn beacon_root_storage_slots(timestamp: u64) -> (U256, U256) {
    let buffer_length = U256::from(BEACON_ROOTS_HISTORY_BUFFER_LENGTH);
    let timestamp_slot = U256::from(timestamp) % buffer_length;
    let root_slot = timestamp_slot + buffer_length;
    (timestamp_slot, root_slot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockproc_chainspec::{ChainSpecBuilder, ForkCondition, Hardfork};

    fn cancun_spec() -> ChainSpec {
        ChainSpecBuilder::default().with_fork(Hardfork::Cancun, ForkCondition::Timestamp(1000)).build()
    }

    #[test]
    fn no_call_pre_cancun() {
        let spec = cancun_spec();
        let result = resolve_beacon_root_call(&spec, 10, 999, Some(B256::with_last_byte(1))).unwrap();
        assert_eq!(result, None);
    }

    #[test]
    fn missing_root_at_active_cancun_is_an_error() {
        let spec = cancun_spec();
        let err = resolve_beacon_root_call(&spec, 10, 1000, None).unwrap_err();
        assert!(matches!(err, BlockExecutionError::Validation(BlockValidationError::MissingParentBeaconBlockRoot)));
    }

    #[test]
    fn genesis_requires_zero_root_and_makes_no_call() {
        let spec = cancun_spec();
        let result = resolve_beacon_root_call(&spec, 0, 1000, Some(B256::ZERO)).unwrap();
        assert_eq!(result, None);

        let err = resolve_beacon_root_call(&spec, 0, 1000, Some(B256::with_last_byte(1))).unwrap_err();
        assert!(matches!(
            err,
            BlockExecutionError::Validation(BlockValidationError::CancunGenesisParentBeaconBlockRootNotZero(_))
        ));
    }

    #[test]
    fn non_genesis_active_cancun_returns_the_root() {
        let spec = cancun_spec();
        let root = B256::with_last_byte(9);
        let result = resolve_beacon_root_call(&spec, 10, 1000, Some(root)).unwrap();
        assert_eq!(result, Some(root));
    }

    #[test]
    fn storage_slots_wrap_around_the_ring_buffer() {
        let (timestamp_slot, root_slot) = beacon_root_storage_slots(8191);
        assert_eq!(timestamp_slot, U256::ZERO);
        assert_eq!(root_slot, U256::from(8191u64));

        let (timestamp_slot, root_slot) = beacon_root_storage_slots(1);
        assert_eq!(timestamp_slot, U256::from(1u64));
        assert_eq!(root_slot, U256::from(8192u64));
    }
}
