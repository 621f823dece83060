use alloy_primitives::{keccak256, Address, Bloom, Bytes, B256, U256};

/// A block header.
///
/// Fields are grouped by who produces them: the pre-execution fields are
/// set by whoever proposes the block, the post-execution fields are
/// authoritative outputs of this crate's consumers (the per-block pipeline).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Header {
    // -- pre-execution fields, set by the block proposer --
    /// Hash of the parent block's header.
    pub parent_hash: B256,
    /// Address that receives block/ommer rewards.
    pub beneficiary: Address,
    /// Block number.
    pub number: u64,
    /// Block gas limit.
    pub gas_limit: u64,
    /// Block timestamp, in seconds since the Unix epoch.
    pub timestamp: u64,
    /// Opaque extra data.
    pub extra_data: Bytes,
    /// Proof-of-work difficulty. Zero post-merge.
    pub difficulty: U256,
    /// Mix hash / prev randao, preserved as an identity field so the
    /// suggested header's hash can be compared after reprocessing.
    pub mix_hash: B256,
    /// Proof-of-work nonce, preserved as an identity field.
    pub nonce: u64,
    /// EIP-1559 base fee, if active.
    pub base_fee_per_gas: Option<u64>,
    /// EIP-4895 withdrawals root, if Shanghai is active.
    pub withdrawals_root: Option<B256>,
    /// EIP-4844 blob gas used by this block, if Cancun is active.
    pub blob_gas_used: Option<u64>,
    /// EIP-4844 running total of excess blob gas, if Cancun is active.
    pub excess_blob_gas: Option<u64>,
    /// EIP-4788 parent beacon block root, if Cancun is active.
    pub parent_beacon_block_root: Option<B256>,

    // -- post-execution fields, produced by the per-block pipeline --
    /// Root hash of the world state after this block's transactions.
    pub state_root: B256,
    /// Root hash of this block's transaction receipts.
    pub receipts_root: B256,
    /// Bloom filter aggregating every receipt's logs bloom.
    pub logs_bloom: Bloom,
    /// Total gas used by this block's transactions.
    pub gas_used: u64,
}

impl Header {
    /// Builds the header used internally while processing a block: pre-execution
    /// fields are copied from the suggested header, post-execution fields are
    /// reset to their neutral value. The suggested header itself is never mutated.
    ///
    /// `state_root` is only kept from the suggested header when
    /// `keep_state_root` is set (genesis blocks whose state is not locally
    /// available yet).
    pub fn for_processing(suggested: &Self, keep_state_root: bool) -> Self {
        Self {
            parent_hash: suggested.parent_hash,
            beneficiary: suggested.beneficiary,
            number: suggested.number,
            gas_limit: suggested.gas_limit,
            timestamp: suggested.timestamp,
            extra_data: suggested.extra_data.clone(),
            difficulty: suggested.difficulty,
            mix_hash: suggested.mix_hash,
            nonce: suggested.nonce,
            base_fee_per_gas: suggested.base_fee_per_gas,
            withdrawals_root: suggested.withdrawals_root,
            blob_gas_used: suggested.blob_gas_used,
            excess_blob_gas: suggested.excess_blob_gas,
            parent_beacon_block_root: suggested.parent_beacon_block_root,
            state_root: if keep_state_root { suggested.state_root } else { B256::ZERO },
            receipts_root: B256::ZERO,
            logs_bloom: Bloom::ZERO,
            gas_used: 0,
        }
    }

    /// Recomputes this header's hash from its current field values.
    ///
    /// This is not a real RLP+keccak header hash (that belongs to the
    /// world-state/trie layer this crate does not implement) but it is a
    /// pure, deterministic function of every field, which is all the branch
    /// driver needs: two headers with identical fields hash identically,
    /// and any field change changes the hash.
    pub fn hash_slow(&self) -> B256 {
        let mut buf = Vec::with_capacity(256);
        buf.extend_from_slice(self.parent_hash.as_slice());
        buf.extend_from_slice(self.beneficiary.as_slice());
        buf.extend_from_slice(&self.number.to_be_bytes());
        buf.extend_from_slice(&self.gas_limit.to_be_bytes());
        buf.extend_from_slice(&self.gas_used.to_be_bytes());
        buf.extend_from_slice(&self.timestamp.to_be_bytes());
        buf.extend_from_slice(&self.extra_data);
        buf.extend_from_slice(&self.difficulty.to_be_bytes::<32>());
        buf.extend_from_slice(self.mix_hash.as_slice());
        buf.extend_from_slice(&self.nonce.to_be_bytes());
        buf.extend_from_slice(&self.base_fee_per_gas.unwrap_or_default().to_be_bytes());
        buf.extend_from_slice(self.withdrawals_root.unwrap_or_default().as_slice());
        buf.extend_from_slice(&self.blob_gas_used.unwrap_or_default().to_be_bytes());
        buf.extend_from_slice(&self.excess_blob_gas.unwrap_or_default().to_be_bytes());
        buf.extend_from_slice(self.parent_beacon_block_root.unwrap_or_default().as_slice());
        buf.extend_from_slice(self.state_root.as_slice());
        buf.extend_from_slice(self.receipts_root.as_slice());
        buf.extend_from_slice(self.logs_bloom.as_slice());
        keccak256(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn for_processing_clears_post_execution_fields_without_mutating_input() {
        let suggested = Header {
            number: 5,
            state_root: B256::with_last_byte(1),
            receipts_root: B256::with_last_byte(2),
            logs_bloom: Bloom::with_last_byte(3),
            gas_used: 21_000,
            ..Default::default()
        };
        let original = suggested.clone();

        let processing = Header::for_processing(&suggested, false);

        assert_eq!(suggested, original, "suggested header must not be mutated");
        assert_eq!(processing.number, 5);
        assert_eq!(processing.state_root, B256::ZERO);
        assert_eq!(processing.receipts_root, B256::ZERO);
        assert_eq!(processing.logs_bloom, Bloom::ZERO);
        assert_eq!(processing.gas_used, 0);
    }

    #[test]
    fn for_processing_keeps_state_root_when_requested() {
        let suggested = Header { state_root: B256::with_last_byte(9), ..Default::default() };
        let processing = Header::for_processing(&suggested, true);
        assert_eq!(processing.state_root, suggested.state_root);
    }

    #[test]
    fn hash_changes_with_any_field() {
        let a = Header { number: 1, ..Default::default() };
        let b = Header { number: 2, ..Default::default() };
        assert_ne!(a.hash_slow(), b.hash_slow());
        assert_eq!(a.hash_slow(), a.clone().hash_slow());
    }
}
