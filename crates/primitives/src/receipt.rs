use alloy_primitives::{Bloom, Log};

/// The record of a single transaction's execution.
///
/// Receipts are produced in transaction order and must be ordered
/// identically to their block's transaction vector.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Receipt {
    /// EIP-2718 transaction type.
    pub tx_type: u8,
    /// Whether the transaction succeeded (EIP-658).
    pub success: bool,
    /// Gas used by this transaction plus every transaction before it in the block.
    pub cumulative_gas_used: u64,
    /// Logs emitted by this transaction.
    pub logs: Vec<Log>,
}

/// Computes the bloom filter of a set of logs the way a receipt's bloom does:
/// each log address and each log topic contributes three bits.
pub fn logs_bloom<'a>(logs: impl IntoIterator<Item = &'a Log>) -> Bloom {
    let mut bloom = Bloom::ZERO;
    for log in logs {
        bloom.accrue(alloy_primitives::bloom::BloomInput::Raw(log.address.as_slice()));
        for topic in log.topics() {
            bloom.accrue(alloy_primitives::bloom::BloomInput::Raw(topic.as_slice()));
        }
    }
    bloom
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_receipt_has_zero_bloom() {
        let receipt = Receipt { tx_type: 0, success: true, cumulative_gas_used: 0, logs: vec![] };
        assert_eq!(logs_bloom(&receipt.logs), Bloom::ZERO);
    }
}
