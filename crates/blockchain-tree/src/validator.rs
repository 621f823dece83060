//! Post-processing block validation.

use blockproc_primitives::{Block, Receipt};

/// Consulted after a block is processed to confirm it matches its suggested
/// counterpart, unless `NoValidation` is set.
///
/// A `false` result is a fatal consensus failure: the branch driver reports
/// it as [`blockproc_errors::BlockExecutionError::InvalidBlock`] and rolls
/// the branch back.
pub trait BlockValidator {
    /// Returns `true` if `processed` (with `receipts`) is an acceptable
    /// match for `suggested`.
    fn validate_processed_block(&self, processed: &Block, receipts: &[Receipt], suggested: &Block) -> bool;
}

/// A [`BlockValidator`] that compares every consensus-relevant header field
/// the block processor itself produces.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderFieldValidator;

impl BlockValidator for HeaderFieldValidator {
    fn validate_processed_block(&self, processed: &Block, receipts: &[Receipt], suggested: &Block) -> bool {
        receipts.len() == processed.body.len()
            && processed.header.state_root == suggested.header.state_root
            && processed.header.receipts_root == suggested.header.receipts_root
            && processed.header.gas_used == suggested.header.gas_used
            && processed.header.logs_bloom == suggested.header.logs_bloom
    }
}
