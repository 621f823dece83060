//! Background hash precomputer.
//!
//! Walks every block's transactions and forces their cached hash, so the
//! foreground pipeline (and anything downstream, like receipt persistence)
//! finds the hash already published by the time it asks for it. Dispatched
//! once per branch, fire-and-forget: its completion is never awaited and a
//! missing runtime is silently treated as "nothing to dispatch onto",
//! matching the non-fatal failure policy.

use blockproc_primitives::Block;
use blockproc_tasks::TaskExecutor;
use std::sync::Arc;

/// Dispatches best-effort background computation of every transaction hash
/// in `blocks`.
///
/// `blocks` is shared (not borrowed) because the task may still be running
/// after this function returns; the branch driver and the background
/// worker both hold a reference to the same underlying transactions, and
/// `TransactionSigned::hash`'s single-writer-wins semantics make that safe.
pub fn dispatch_hash_precomputation(executor: Option<&TaskExecutor>, blocks: Arc<[Block]>) {
    let Some(executor) = executor else {
        tracing::trace!(target: "blockproc::tree", "no task executor available, skipping hash precomputation");
        return
    };

    executor.spawn_fire_and_forget("hash-precompute", async move {
        for block in blocks.iter() {
            for transaction in &block.body {
                transaction.hash();
            }
        }
        Ok::<(), std::convert::Infallible>(())
    });
}
