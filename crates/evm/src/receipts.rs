//! Receipts root and logs bloom computation and verification.
//!
//! The real receipts root is a Merkle-Patricia trie over RLP-encoded
//! receipts, which belongs to the world-state/trie layer this crate does
//! not implement. [`receipts_root`] is a deterministic stand-in - a pure
//! function of receipt content and order, which is all callers need to
//! detect a mismatch against a suggested header.

use alloy_primitives::{keccak256, Bloom, B256};
use blockproc_errors::{BlockExecutionError, BlockValidationError};
use blockproc_primitives::{logs_bloom, Receipt};

/// Computes the receipts root over receipts in transaction order.
pub fn receipts_root(receipts: &[Receipt]) -> B256 {
    let mut buf = Vec::with_capacity(receipts.len() * 64);
    for receipt in receipts {
        buf.push(receipt.tx_type);
        buf.push(receipt.success as u8);
        buf.extend_from_slice(&receipt.cumulative_gas_used.to_be_bytes());
        for log in &receipt.logs {
            buf.extend_from_slice(log.address.as_slice());
        }
    }
    keccak256(buf)
}

/// Computes the aggregate logs bloom over every receipt's own bloom.
pub fn aggregate_logs_bloom(receipts: &[Receipt]) -> Bloom {
    receipts.iter().fold(Bloom::ZERO, |bloom, receipt| bloom | logs_bloom(&receipt.logs))
}

/// Verifies the receipts produced while executing a block against the
/// suggested header's declared receipts root and logs bloom.
pub fn verify_receipts(
    receipts: &[Receipt],
    expected_receipts_root: B256,
    expected_logs_bloom: Bloom,
) -> Result<(), BlockExecutionError> {
    let got_root = receipts_root(receipts);
    if got_root != expected_receipts_root {
        return Err(BlockValidationError::ReceiptRootMismatch {
            got: Box::new(got_root),
            expected: Box::new(expected_receipts_root),
        }
        .into())
    }

    let got_bloom = aggregate_logs_bloom(receipts);
    if got_bloom != expected_logs_bloom {
        return Err(BlockValidationError::LogsBloomMismatch {
            got: Box::new(got_bloom),
            expected: Box::new(expected_logs_bloom),
        }
        .into())
    }

    Ok(())
}
