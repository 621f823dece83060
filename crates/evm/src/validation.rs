//! Pre- and post-execution block validation.
//!
//! Pre-execution checks guard the per-transaction loop (gas limit headroom)
//! so the executor never has to reason about an over-committed block;
//! post-execution checks confirm the executor's own declared totals match
//! the header it was handed.

use blockproc_errors::{BlockExecutionError, BlockValidationError};
use blockproc_primitives::constants::MINIMUM_GAS_LIMIT;

/// Validates that a transaction's gas limit fits within the block's
/// remaining gas budget.
pub fn validate_transaction_gas_limit(
    transaction_gas_limit: u64,
    block_available_gas: u64,
) -> Result<(), BlockExecutionError> {
    if transaction_gas_limit > block_available_gas {
        return Err(BlockValidationError::TransactionGasLimitMoreThanAvailableBlockGas {
            transaction_gas_limit,
            block_available_gas,
        }
        .into())
    }
    Ok(())
}

/// Validates that the header's own gas limit is at least the protocol
/// minimum.
pub fn validate_header_gas_limit(gas_limit: u64) -> Result<(), BlockExecutionError> {
    if gas_limit < MINIMUM_GAS_LIMIT {
        return Err(BlockExecutionError::InputDomain(format!(
            "block gas limit {gas_limit} is below the minimum {MINIMUM_GAS_LIMIT}"
        )))
    }
    Ok(())
}

/// Validates that the gas actually used by the executed transactions
/// matches what the suggested header declared.
pub fn validate_gas_used(got: u64, expected: u64) -> Result<(), BlockExecutionError> {
    if got != expected {
        return Err(BlockValidationError::BlockGasUsed { got, expected }.into())
    }
    Ok(())
}
