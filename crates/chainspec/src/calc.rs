//! Block reward arithmetic.
//!
//! Grounded on the well-known Ethereum reward schedule: 5 ETH pre-Byzantium,
//! reduced to 3 ETH at Byzantium (EIP-649) and 2 ETH at Constantinople
//! (EIP-1234). Uncle (ommer) and nephew rewards follow the Yellow Paper
//! formulas.

use alloy_primitives::U256;

const WEI_PER_ETH: u64 = 1_000_000_000_000_000_000;

/// Returns the base block reward in wei for the given fork activation state.
pub fn base_block_reward(byzantium_active: bool, constantinople_active: bool) -> U256 {
    let eth = if constantinople_active {
        2
    } else if byzantium_active {
        3
    } else {
        5
    };
    U256::from(eth) * U256::from(WEI_PER_ETH)
}

/// Returns the reward paid to the miner of an included uncle (ommer) block.
///
/// `ommer_reward = base_reward * (8 + ommer_number - block_number) / 8`
pub fn ommer_reward(base_block_reward: U256, block_number: u64, ommer_block_number: u64) -> U256 {
    (base_block_reward * U256::from(8 + ommer_block_number - block_number)) / U256::from(8)
}

/// Returns the full reward paid to the block's own beneficiary, including
/// the nephew reward for each included uncle.
///
/// `block_reward = base_reward + base_reward * num_ommers / 32`
pub fn block_reward(base_block_reward: U256, ommers_count: usize) -> U256 {
    base_block_reward + (base_block_reward * U256::from(ommers_count)) / U256::from(32)
}
