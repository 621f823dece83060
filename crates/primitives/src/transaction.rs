use alloy_primitives::{Address, Bytes, B256, U256};
use once_cell::sync::OnceCell;

/// A signed transaction with a lazily-computed, cached hash.
///
/// Either the background hash precomputer or the foreground pipeline may
/// compute the hash first, and both must agree. [`OnceCell`] gives
/// single-writer-wins semantics for free - whichever caller wins the race
/// publishes the value, and every other caller observes that same value.
#[derive(Debug, Clone)]
pub struct TransactionSigned {
    /// EIP-2718 transaction type.
    pub tx_type: u8,
    /// Recovered or declared sender.
    pub sender: Address,
    /// Transaction nonce.
    pub nonce: u64,
    /// Gas limit.
    pub gas_limit: u64,
    /// Recipient. `None` for contract creation.
    pub to: Option<Address>,
    /// Value transferred.
    pub value: U256,
    /// Calldata / init code.
    pub input: Bytes,
    hash: OnceCell<B256>,
}

impl PartialEq for TransactionSigned {
    fn eq(&self, other: &Self) -> bool {
        self.tx_type == other.tx_type
            && self.sender == other.sender
            && self.nonce == other.nonce
            && self.gas_limit == other.gas_limit
            && self.to == other.to
            && self.value == other.value
            && self.input == other.input
    }
}
impl Eq for TransactionSigned {}

impl TransactionSigned {
    /// Builds a new signed transaction with no hash cached yet.
    pub fn new(
        tx_type: u8,
        sender: Address,
        nonce: u64,
        gas_limit: u64,
        to: Option<Address>,
        value: U256,
        input: Bytes,
    ) -> Self {
        Self { tx_type, sender, nonce, gas_limit, to, value, input, hash: OnceCell::new() }
    }

    /// Returns the cached hash, computing and publishing it if necessary.
    ///
    /// Safe to call concurrently from the background hash precomputer and
    /// the foreground pipeline: both compute the same deterministic value,
    /// and only the first writer's value is kept.
    pub fn hash(&self) -> B256 {
        *self.hash.get_or_init(|| self.compute_hash())
    }

    /// Returns `true` if the hash has already been computed and published.
    pub fn hash_is_cached(&self) -> bool {
        self.hash.get().is_some()
    }

    fn compute_hash(&self) -> B256 {
        let mut buf = Vec::with_capacity(128);
        buf.push(self.tx_type);
        buf.extend_from_slice(self.sender.as_slice());
        buf.extend_from_slice(&self.nonce.to_be_bytes());
        buf.extend_from_slice(&self.gas_limit.to_be_bytes());
        buf.extend_from_slice(self.to.unwrap_or_default().as_slice());
        buf.extend_from_slice(&self.value.to_be_bytes::<32>());
        buf.extend_from_slice(&self.input);
        alloy_primitives::keccak256(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_deterministic_and_idempotent() {
        let tx = TransactionSigned::new(
            0,
            Address::with_last_byte(1),
            0,
            21_000,
            Some(Address::with_last_byte(2)),
            U256::from(100u64),
            Bytes::new(),
        );
        let first = tx.hash();
        let second = tx.hash();
        assert_eq!(first, second);
        assert!(tx.hash_is_cached());
    }

    #[test]
    fn concurrent_hash_computation_agrees() {
        use std::sync::Arc;
        let tx = Arc::new(TransactionSigned::new(
            2,
            Address::with_last_byte(7),
            3,
            50_000,
            None,
            U256::ZERO,
            Bytes::from_static(b"init code"),
        ));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let tx = tx.clone();
                std::thread::spawn(move || tx.hash())
            })
            .collect();

        let hashes: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(hashes.windows(2).all(|w| w[0] == w[1]));
    }
}
