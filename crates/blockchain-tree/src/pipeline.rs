//! Per-block pipeline: turns one suggested block into a processed block
//! plus receipts, in the fixed order the algorithm specifies.

use crate::dao;
use crate::events::EventBus;
use crate::validator::BlockValidator;
use alloy_primitives::{Address, U256};
use blockproc_chainspec::{ChainSpec, Hardfork};
use blockproc_errors::BlockExecutionError;
use blockproc_evm::{
    beacon_root, receipts, reward, validation, ExecutionOutcome, TransactionExecutor,
};
use blockproc_primitives::{Block, Header, Receipt};
use blockproc_receipt_storage::ReceiptStorage;
use blockproc_world_state::WorldState;

/// Every collaborator the per-block pipeline needs, bundled so
/// [`process_one`]'s signature does not grow every time a new one is added.
pub struct PipelineContext<'a, W, X, V, R> {
    /// Narrow mutation interface over world state.
    pub world_state: &'a mut W,
    /// Executes the block's transactions.
    pub executor: &'a mut X,
    /// Consulted after processing unless `NoValidation` is set.
    pub validator: &'a V,
    /// Receipt sink, written to when `StoreReceipts` is set.
    pub receipt_storage: &'a mut R,
    /// Per-transaction and per-block notification sink.
    pub events: &'a mut EventBus,
}

/// Processes a single suggested block against world state, producing the
/// block as actually processed (with state root, receipts root, logs
/// bloom, and gas used filled in) and its receipts.
#[allow(clippy::too_many_arguments)]
pub fn process_one<W, X, V, R>(
    suggested: &Block,
    options: blockproc_config::ProcessingOptions,
    spec: &ChainSpec,
    total_difficulty: U256,
    terminal_total_difficulty: Option<U256>,
    ctx: &mut PipelineContext<'_, W, X, V, R>,
) -> Result<(Block, Vec<Receipt>), BlockExecutionError>
where
    W: WorldState,
    X: TransactionExecutor,
    V: BlockValidator,
    R: ReceiptStorage,
{
    let block_number = suggested.header.number;

    // 1. DAO transition, one-shot by exact height.
    dao::apply_if_transition_block(ctx.world_state, spec, block_number)?;

    // 2. Prepare header: pre-execution fields only, post-execution cleared.
    validation::validate_header_gas_limit(suggested.header.gas_limit)?;
    let keep_state_root = spec.genesis_state_unavailable && block_number == 0;
    let mut header = Header::for_processing(&suggested.header, keep_state_root);

    // 3. Spec is already resolved: `spec` is a pure function of header
    // coordinates, so there is nothing further to compute here.

    // Pre-execution gas-limit headroom check, ahead of the executor.
    let mut available_gas = header.gas_limit;
    for transaction in &suggested.body {
        validation::validate_transaction_gas_limit(transaction.gas_limit, available_gas)?;
        available_gas = available_gas.saturating_sub(transaction.gas_limit);
    }

    tracing::trace!(target: "blockproc::tree", number = block_number, "beginning block trace");

    // 5. Pre-execution contract touch: beacon-root handler, then commit.
    if let Some(root) = beacon_root::resolve_beacon_root_call(
        spec,
        block_number,
        header.timestamp,
        header.parent_beacon_block_root,
    )? {
        let (timestamp_slot, root_slot) = beacon_root::beacon_root_storage_slots(header.timestamp);
        tracing::trace!(
            target: "blockproc::tree",
            number = block_number,
            %root,
            %timestamp_slot,
            %root_slot,
            "beacon root system call",
        );
    }
    ctx.world_state.commit(spec)?;

    // 6. Execute transactions.
    let senders: Vec<Address> = suggested.body.iter().map(|transaction| transaction.sender).collect();
    let ExecutionOutcome { receipts: tx_receipts, gas_used } =
        ctx.executor.execute_transactions(suggested, &senders)?;

    for index in 0..tx_receipts.len() {
        ctx.events.transaction_processed(block_number, index)?;
    }

    validation::validate_gas_used(gas_used, suggested.header.gas_used)?;
    header.gas_used = gas_used;

    // 7. Blob gas, carried through from the suggested header once Cancun is
    // active (the blob-carrying transaction type itself is out of scope).
    if spec.is_active(Hardfork::Cancun, block_number, header.timestamp) {
        header.blob_gas_used = Some(suggested.header.blob_gas_used.unwrap_or_default());
        header.excess_blob_gas = Some(suggested.header.excess_blob_gas.unwrap_or_default());
    }

    // 8. Receipts root and logs bloom, checked against what was suggested
    // before anything downstream (rewards, state root) depends on them.
    // Skipped along with every other consensus check when `NO_VALIDATION`
    // is set, same as the header-field validator consulted in step 14.
    header.receipts_root = receipts::receipts_root(&tx_receipts);
    header.logs_bloom = receipts::aggregate_logs_bloom(&tx_receipts);
    if !options.contains(blockproc_config::ProcessingOptions::NO_VALIDATION) {
        receipts::verify_receipts(&tx_receipts, suggested.header.receipts_root, suggested.header.logs_bloom)?;
    }

    // 9. Apply miner rewards.
    let increments = reward::balance_increments(
        spec,
        block_number,
        header.beneficiary,
        total_difficulty,
        terminal_total_difficulty,
        &suggested.ommers,
    );
    for (address, amount) in increments {
        reward::apply_increment(ctx.world_state, address, amount)?;
    }

    // 10. Apply withdrawals.
    blockproc_evm::withdrawals::apply_withdrawals(
        ctx.world_state,
        spec,
        header.timestamp,
        suggested.withdrawals.as_deref(),
    )?;

    // 11. End trace, commit - observed so reward/withdrawal-induced state
    // deltas are traced at the point they become visible, same as the
    // beacon-root commit above.
    ctx.world_state.commit_observed(spec, || {
        tracing::trace!(
            target: "blockproc::tree",
            number = block_number,
            "reward and withdrawal deltas committed",
        );
    })?;

    // 12. Recompute the state root unless it was kept from the suggestion.
    if !keep_state_root {
        header.state_root = ctx.world_state.recalculate_state_root()?;
    }

    // 13. The hash is recomputed on demand from `header` by callers; there
    // is no stored hash field to fill in here.

    let processed = Block {
        header,
        body: suggested.body.clone(),
        ommers: suggested.ommers.clone(),
        withdrawals: suggested.withdrawals.clone(),
    };

    // 14. Validate, unless skipped.
    if !options.contains(blockproc_config::ProcessingOptions::NO_VALIDATION)
        && !ctx.validator.validate_processed_block(&processed, &tx_receipts, suggested)
    {
        return Err(BlockExecutionError::InvalidBlock { suggested: Box::new(suggested.clone()) })
    }

    // 15. Persist receipts tentatively, if requested.
    if options.contains(blockproc_config::ProcessingOptions::STORE_RECEIPTS) {
        let block_hash = processed.header.hash_slow();
        ctx.receipt_storage.insert(block_hash, block_number, tx_receipts.clone(), false)?;
    }

    Ok((processed, tx_receipts))
}
