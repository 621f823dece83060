//! The transaction-execution surface the per-block pipeline depends on.
//!
//! Running the EVM itself - gas metering, opcode dispatch, precompiles -
//! is out of scope; this crate only needs a narrow interface it can call
//! into and a result shape it can validate and fold into receipts and
//! state commits. A real implementation backs this trait with an actual
//! interpreter; tests back it with a canned outcome.

use alloy_primitives::Address;
use blockproc_errors::BlockExecutionError;
use blockproc_primitives::{Block, Receipt};

/// The outcome of executing every transaction in a block.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExecutionOutcome {
    /// One receipt per transaction, in transaction order.
    pub receipts: Vec<Receipt>,
    /// Total gas used across every transaction.
    pub gas_used: u64,
}

/// Executes every transaction in a block against world state, in order.
///
/// Implementations are responsible for recovering senders if they were not
/// already recovered, metering gas, and committing the resulting balance,
/// nonce, and storage changes to world state themselves - only the summary
/// in [`ExecutionOutcome`] is returned to the caller.
pub trait TransactionExecutor {
    /// Executes `block`'s transactions, with `senders` recovered in the
    /// same order as `block.body`.
    fn execute_transactions(
        &mut self,
        block: &Block,
        senders: &[Address],
    ) -> Result<ExecutionOutcome, BlockExecutionError>;
}

#[cfg(test)]
pub(crate) mod test_util {
    use super::*;

    /// A [`TransactionExecutor`] double that returns a canned outcome,
    /// recording the blocks it was asked to execute.
    #[derive(Debug, Default)]
    pub struct StubExecutor {
        pub outcome: ExecutionOutcome,
        pub calls: Vec<u64>,
    }

    impl TransactionExecutor for StubExecutor {
        fn execute_transactions(
            &mut self,
            block: &Block,
            _senders: &[Address],
        ) -> Result<ExecutionOutcome, BlockExecutionError> {
            self.calls.push(block.number());
            Ok(self.outcome.clone())
        }
    }
}
