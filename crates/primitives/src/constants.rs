//! Protocol-level constants.

use alloy_primitives::{address, Address};

/// Address that withdrawals from the DAO fork accounts are swept into.
pub const DAO_HARDFORK_BENEFICIARY: Address = address!("bf4ed7b27f1d666546e30d74d50d173d20bca754");

/// Minimum gas limit allowed for a block.
pub const MINIMUM_GAS_LIMIT: u64 = 5000;

/// Empty ommer root hash (`keccak256(rlp([]))`).
pub const EMPTY_OMMER_ROOT_HASH: alloy_primitives::B256 = alloy_primitives::b256!(
    "1dcc4de8dec75d7aab85b567b6ccd41ad312451b948a7413f0a142fd40d49347"
);

/// Length of the EIP-4788 beacon-root history buffer.
pub const BEACON_ROOTS_HISTORY_BUFFER_LENGTH: u64 = 8191;
