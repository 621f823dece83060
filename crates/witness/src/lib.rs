//! Thread-local witness collection.
//!
//! Each worker thread that processes blocks owns its own witness scope:
//! while [`track_on_this_thread`]'s guard is alive, every trie node touched
//! by that thread's world-state operations is recorded via [`record_node`].
//! The per-block pipeline drains the buffer with [`reset`] between blocks
//! and hands the drained nodes to a [`WitnessSink`] for persistence keyed
//! by block hash.

use alloy_primitives::{Bytes, B256};
use std::cell::RefCell;
use std::collections::BTreeMap;

thread_local! {
    static WITNESS: RefCell<Option<Vec<Bytes>>> = const { RefCell::new(None) };
}

/// An RAII handle for this thread's witness-collection scope.
///
/// Dropping it clears the thread-local buffer; it does not persist
/// anything. Callers must call [`reset`] to drain recorded nodes before
/// the scope ends if they want to keep them.
#[derive(Debug)]
pub struct WitnessScope {
    _private: (),
}

impl Drop for WitnessScope {
    fn drop(&mut self) {
        WITNESS.with(|cell| *cell.borrow_mut() = None);
    }
}

/// Installs a fresh witness-collection scope on the current thread.
pub fn track_on_this_thread() -> WitnessScope {
    WITNESS.with(|cell| *cell.borrow_mut() = Some(Vec::new()));
    WitnessScope { _private: () }
}

/// Records a trie node touched by the current thread, if a scope is active.
///
/// A no-op off the back of a [`WitnessScope`] - world-state implementations
/// may call this unconditionally without checking whether collection is on.
pub fn record_node(node: Bytes) {
    WITNESS.with(|cell| {
        if let Some(nodes) = cell.borrow_mut().as_mut() {
            nodes.push(node);
        }
    });
}

/// Drains and returns the nodes recorded so far on this thread, leaving an
/// empty buffer behind if a scope is still active.
pub fn reset() -> Vec<Bytes> {
    WITNESS.with(|cell| match cell.borrow_mut().as_mut() {
        Some(nodes) => std::mem::take(nodes),
        None => Vec::new(),
    })
}

/// Where drained witness nodes go once a block finishes processing.
pub trait WitnessSink {
    /// Persists `nodes` under `block_hash`, replacing anything previously
    /// persisted for the same hash.
    fn persist(&mut self, block_hash: B256, nodes: Vec<Bytes>);

    /// Returns the nodes persisted for `block_hash`, if any.
    fn get(&self, block_hash: B256) -> Option<&[Bytes]>;
}

/// An in-memory reference [`WitnessSink`].
#[derive(Debug, Clone, Default)]
pub struct InMemoryWitnessSink {
    by_hash: BTreeMap<B256, Vec<Bytes>>,
}

impl InMemoryWitnessSink {
    /// Creates an empty witness sink.
    pub fn new() -> Self {
        Self::default()
    }
}

impl WitnessSink for InMemoryWitnessSink {
    fn persist(&mut self, block_hash: B256, nodes: Vec<Bytes>) {
        self.by_hash.insert(block_hash, nodes);
    }

    fn get(&self, block_hash: B256) -> Option<&[Bytes]> {
        self.by_hash.get(&block_hash).map(Vec::as_slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_without_a_scope_is_a_no_op() {
        record_node(Bytes::from_static(b"node"));
        assert!(reset().is_empty());
    }

    #[test]
    fn scope_accumulates_and_reset_drains() {
        let scope = track_on_this_thread();
        record_node(Bytes::from_static(b"a"));
        record_node(Bytes::from_static(b"b"));
        let drained = reset();
        assert_eq!(drained.len(), 2);
        assert!(reset().is_empty());
        drop(scope);
    }

    #[test]
    fn dropping_scope_clears_buffer() {
        {
            let _scope = track_on_this_thread();
            record_node(Bytes::from_static(b"a"));
        }
        assert!(reset().is_empty());
    }

    #[test]
    fn sink_persists_per_block_hash() {
        let mut sink = InMemoryWitnessSink::new();
        let hash = B256::with_last_byte(1);
        sink.persist(hash, vec![Bytes::from_static(b"node")]);
        assert_eq!(sink.get(hash).unwrap().len(), 1);
        assert!(sink.get(B256::with_last_byte(2)).is_none());
    }
}
