//! The block processor's error taxonomy.
//!
//! Every fallible operation in this workspace returns one of these types (or
//! a type that converts into one via `?`). Propagation policy: the
//! per-block pipeline surfaces failures unchanged; the branch driver always
//! restores the entry checkpoint before re-surfacing them. Nothing here is
//! ever consulted for control flow by the caller's logger - logging is a
//! side effect, never a branch condition.

use alloy_primitives::B256;
use blockproc_primitives::Block;
use thiserror::Error;

/// Errors raised while validating a single transaction or block against
/// protocol rules, mirroring the granularity of a real execution client so
/// failures are actionable without a debugger.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BlockValidationError {
    /// A transaction's gas limit exceeds the block's remaining gas.
    #[error("transaction gas limit {transaction_gas_limit} is more than the block's available gas {block_available_gas}")]
    TransactionGasLimitMoreThanAvailableBlockGas {
        /// The transaction's declared gas limit.
        transaction_gas_limit: u64,
        /// The gas remaining in the block before this transaction.
        block_available_gas: u64,
    },
    /// The cumulative gas used by all transactions did not match the header.
    #[error("block gas used {got} does not match expected gas used {expected}")]
    BlockGasUsed {
        /// Gas actually used by the executed transactions.
        got: u64,
        /// Gas used declared by the suggested header.
        expected: u64,
    },
    /// The computed receipts root did not match the header's declared value.
    #[error("receipts root {got} does not match expected {expected}")]
    ReceiptRootMismatch {
        /// The receipts root computed from the produced receipts.
        got: Box<B256>,
        /// The receipts root declared by the suggested header.
        expected: Box<B256>,
    },
    /// The computed logs bloom did not match the header's declared value.
    #[error("logs bloom {got} does not match expected {expected}")]
    LogsBloomMismatch {
        /// The logs bloom computed from the produced receipts.
        got: Box<alloy_primitives::Bloom>,
        /// The logs bloom declared by the suggested header.
        expected: Box<alloy_primitives::Bloom>,
    },
    /// EIP-4788 is active but the header carries no parent beacon block root.
    #[error("EIP-4788 parent beacon block root missing for active Cancun block")]
    MissingParentBeaconBlockRoot,
    /// The Cancun genesis block declared a non-zero parent beacon block root.
    #[error("parent beacon block root must be zero at the Cancun genesis block, got {0}")]
    CancunGenesisParentBeaconBlockRootNotZero(B256),
    /// Incrementing an account's balance during reward/withdrawal application failed.
    #[error("incrementing balance in post-execution failed")]
    IncrementBalanceFailed,
    /// Recovering transaction senders failed (wrong count or bad signature).
    #[error("failed to recover transaction senders")]
    SenderRecoveryError,
}

/// Top-level failure surface for a single block's processing, and what the
/// branch driver reacts to.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BlockExecutionError {
    /// A validation rule was violated while preparing or checking a block.
    #[error(transparent)]
    Validation(#[from] BlockValidationError),
    /// The transaction executor failed to execute the block.
    #[error("transaction execution failed: {0}")]
    ExecutionFailure(String),
    /// A world-state operation failed (e.g. a missing trie node).
    #[error("world state operation failed: {0}")]
    StateFailure(String),
    /// A required collaborator was null/absent at construction time.
    #[error("required collaborator missing: {0}")]
    InputDomain(String),
    /// The block validator rejected the processed block against its
    /// suggested counterpart - a fatal consensus failure for the branch.
    #[error("block {} failed post-processing validation", .suggested.number())]
    InvalidBlock {
        /// The block as it was suggested by the caller, unmodified.
        suggested: Box<Block>,
    },
    /// Restoring world state to the entry checkpoint failed after another
    /// failure. This is unrecoverable: the caller can no longer trust the
    /// state of the world-state store.
    #[error("failed to restore checkpoint after an earlier failure: {inner}")]
    CheckpointRestoreFailed {
        /// Description of the restore failure.
        inner: String,
    },
    /// An event observer returned an error while handling a branch or block
    /// notification; the branch that raised it is aborted and rolled back.
    #[error("event observer failed: {0}")]
    ObserverFailed(String),
}

impl BlockExecutionError {
    /// Returns `true` if the error leaves the world-state store in an
    /// indeterminate state (checkpoint restore itself failed), as opposed to
    /// a recoverable validation/execution failure that was already rolled back.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::CheckpointRestoreFailed { .. })
    }
}
