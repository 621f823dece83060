//! Receipt persistence.
//!
//! The per-block pipeline inserts each block's receipts as it executes,
//! tentatively (`is_canonical = false`) until the branch driver knows
//! whether the branch it belongs to becomes the new canonical chain.
//! Checkpoint restore only resets world state; it does not purge receipts
//! already inserted for blocks that preceded the failure. A failed branch's
//! receipts are simply left stored and non-canonical - inert, since nothing
//! ever marks them canonical (see DESIGN.md's open decision on rollback).

use alloy_primitives::{BlockNumber, B256};
use blockproc_errors::BlockExecutionError;
use blockproc_primitives::Receipt;
use std::collections::BTreeMap;

/// A block's receipts plus the bookkeeping the branch driver needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredReceipts {
    /// The block number the receipts belong to.
    pub block_number: BlockNumber,
    /// The receipts produced while executing the block, in transaction order.
    pub receipts: Vec<Receipt>,
    /// Whether this block is (currently believed to be) on the canonical chain.
    pub is_canonical: bool,
}

/// The receipt-persistence interface the per-block pipeline and branch
/// driver consume.
pub trait ReceiptStorage {
    /// Inserts a block's receipts, replacing any previously stored receipts
    /// for the same hash.
    fn insert(
        &mut self,
        block_hash: B256,
        block_number: BlockNumber,
        receipts: Vec<Receipt>,
        is_canonical: bool,
    ) -> Result<(), BlockExecutionError>;

    /// Marks a previously inserted block's receipts canonical (or not).
    fn mark_canonical(&mut self, block_hash: B256, is_canonical: bool) -> Result<(), BlockExecutionError>;

    /// Removes a block's receipts entirely - used when checkpoint restore
    /// unwinds a branch that never became canonical.
    fn remove(&mut self, block_hash: B256) -> Result<(), BlockExecutionError>;

    /// Returns the stored receipts for `block_hash`, if any.
    fn get(&self, block_hash: B256) -> Option<&StoredReceipts>;
}

/// An in-memory reference [`ReceiptStorage`] implementation.
#[derive(Debug, Clone, Default)]
pub struct InMemoryReceiptStorage {
    by_hash: BTreeMap<B256, StoredReceipts>,
}

impl InMemoryReceiptStorage {
    /// Creates an empty receipt store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl ReceiptStorage for InMemoryReceiptStorage {
    fn insert(
        &mut self,
        block_hash: B256,
        block_number: BlockNumber,
        receipts: Vec<Receipt>,
        is_canonical: bool,
    ) -> Result<(), BlockExecutionError> {
        self.by_hash.insert(block_hash, StoredReceipts { block_number, receipts, is_canonical });
        Ok(())
    }

    fn mark_canonical(&mut self, block_hash: B256, is_canonical: bool) -> Result<(), BlockExecutionError> {
        let stored = self.by_hash.get_mut(&block_hash).ok_or_else(|| {
            BlockExecutionError::StateFailure(format!("no receipts stored for block {block_hash}"))
        })?;
        stored.is_canonical = is_canonical;
        Ok(())
    }

    fn remove(&mut self, block_hash: B256) -> Result<(), BlockExecutionError> {
        self.by_hash.remove(&block_hash);
        Ok(())
    }

    fn get(&self, block_hash: B256) -> Option<&StoredReceipts> {
        self.by_hash.get(&block_hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn receipt() -> Receipt {
        Receipt { tx_type: 0, success: true, cumulative_gas_used: 21_000, logs: vec![] }
    }

    #[test]
    fn insert_then_get_round_trips() {
        let mut storage = InMemoryReceiptStorage::new();
        let hash = B256::with_last_byte(1);
        storage.insert(hash, 5, vec![receipt()], false).unwrap();
        let stored = storage.get(hash).unwrap();
        assert_eq!(stored.block_number, 5);
        assert!(!stored.is_canonical);
    }

    #[test]
    fn mark_canonical_flips_flag() {
        let mut storage = InMemoryReceiptStorage::new();
        let hash = B256::with_last_byte(2);
        storage.insert(hash, 5, vec![receipt()], false).unwrap();
        storage.mark_canonical(hash, true).unwrap();
        assert!(storage.get(hash).unwrap().is_canonical);
    }

    #[test]
    fn remove_drops_stale_branch_receipts() {
        let mut storage = InMemoryReceiptStorage::new();
        let hash = B256::with_last_byte(3);
        storage.insert(hash, 5, vec![receipt()], false).unwrap();
        storage.remove(hash).unwrap();
        assert!(storage.get(hash).is_none());
    }

    #[test]
    fn mark_canonical_on_unknown_block_fails() {
        let mut storage = InMemoryReceiptStorage::new();
        let err = storage.mark_canonical(B256::with_last_byte(9), true).unwrap_err();
        assert!(matches!(err, BlockExecutionError::StateFailure(_)));
    }
}
