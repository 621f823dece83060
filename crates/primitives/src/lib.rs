//! Commonly used types for the block processor.
//!
//! Blocks, headers, receipts, withdrawals and signed transactions. This
//! crate deliberately knows nothing about EVM execution, world state, or
//! consensus rules.

mod block;
mod header;
mod receipt;
mod transaction;
mod withdrawal;

pub mod constants;

pub use block::Block;
pub use header::Header;
pub use receipt::{logs_bloom, Receipt};
pub use transaction::TransactionSigned;
pub use withdrawal::Withdrawal;

pub use alloy_primitives::{Address, BlockHash, BlockNumber, Bloom, Bytes, Log, B256, U256};
