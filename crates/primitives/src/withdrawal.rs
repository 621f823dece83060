use alloy_primitives::Address;

/// An EIP-4895 validator withdrawal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Withdrawal {
    /// Monotonically increasing index of this withdrawal.
    pub index: u64,
    /// Index of the validator this withdrawal is credited from.
    pub validator_index: u64,
    /// Recipient of the withdrawal.
    pub address: Address,
    /// Withdrawal amount, in Gwei.
    pub amount: u64,
}

impl Withdrawal {
    /// Returns the withdrawal amount converted from Gwei to Wei.
    pub fn amount_wei(&self) -> u128 {
        self.amount as u128 * 1_000_000_000
    }
}
