//! Event surface: synchronous observers notified as a branch is processed.

use alloy_primitives::BlockNumber;
use blockproc_errors::BlockExecutionError;
use blockproc_primitives::{Block, Receipt};

/// Observer notified of branch and block-level progress.
///
/// Observers are invoked synchronously, in subscription order, on the
/// driver thread, and must not mutate world state. Returning an error from
/// any hook aborts the branch and triggers rollback the same as any other
/// processing failure.
pub trait EventObserver {
    /// Invoked once, before the first block of a branch is processed.
    fn on_branch_starting(&mut self, blocks: &[Block]) -> Result<(), BlockExecutionError> {
        let _ = blocks;
        Ok(())
    }

    /// Invoked after a block finishes processing successfully.
    fn on_block_processed(&mut self, block: &Block, receipts: &[Receipt]) -> Result<(), BlockExecutionError> {
        let (_, _) = (block, receipts);
        Ok(())
    }

    /// Invoked once per transaction, forwarded in transaction order after
    /// the executor produces that transaction's receipt.
    fn on_transaction_processed(
        &mut self,
        block_number: BlockNumber,
        tx_index: usize,
    ) -> Result<(), BlockExecutionError> {
        let (_, _) = (block_number, tx_index);
        Ok(())
    }
}

/// A no-op observer, useful as a default `tracer` argument when a caller has
/// nothing to subscribe.
#[derive(Debug, Default)]
pub struct NullObserver;

impl EventObserver for NullObserver {}

/// Dispatches to any number of subscribed observers in subscription order.
#[derive(Default)]
pub struct EventBus {
    observers: Vec<Box<dyn EventObserver + Send>>,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus").field("observer_count", &self.observers.len()).finish()
    }
}

impl EventBus {
    /// Creates an empty event bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an observer, to be notified after any already-registered
    /// observers.
    pub fn register(&mut self, observer: Box<dyn EventObserver + Send>) {
        self.observers.push(observer);
    }

    pub(crate) fn branch_starting(&mut self, blocks: &[Block]) -> Result<(), BlockExecutionError> {
        for observer in &mut self.observers {
            observer.on_branch_starting(blocks)?;
        }
        Ok(())
    }

    pub(crate) fn block_processed(
        &mut self,
        block: &Block,
        receipts: &[Receipt],
    ) -> Result<(), BlockExecutionError> {
        for observer in &mut self.observers {
            observer.on_block_processed(block, receipts)?;
        }
        Ok(())
    }

    pub(crate) fn transaction_processed(
        &mut self,
        block_number: BlockNumber,
        tx_index: usize,
    ) -> Result<(), BlockExecutionError> {
        for observer in &mut self.observers {
            observer.on_transaction_processed(block_number, tx_index)?;
        }
        Ok(())
    }
}
