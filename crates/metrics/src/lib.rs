//! Metrics emitted while processing blocks.
//!
//! One [`BlockProcessorMetrics`] per branch driver instance, registered
//! under the `blockproc` scope. Counters and histograms, not gauges: every
//! value here only ever goes up or is sampled once per observation, which
//! is what the `metrics` crate's recorders expect for cheap aggregation.

use metrics::{Counter, Histogram};
use metrics_derive::Metrics;

/// Metrics for a single branch driver.
#[derive(Metrics, Clone)]
#[metrics(scope = "blockproc")]
pub struct BlockProcessorMetrics {
    /// Number of branch reorganizations observed (branch head changed
    /// mid-processing, excluding periodic mid-branch re-init).
    #[metric(describe = "Number of branch reorganizations observed by the block processor")]
    pub reorganizations: Counter,
    /// Number of blocks successfully processed.
    #[metric(describe = "Number of blocks successfully processed")]
    pub blocks_processed: Counter,
    /// Number of blocks that failed processing and were rolled back.
    #[metric(describe = "Number of blocks that failed processing and were rolled back")]
    pub blocks_failed: Counter,
    /// Wall-clock time spent processing a single block, in seconds.
    #[metric(describe = "Wall-clock time spent processing a single block, in seconds")]
    pub block_processing_duration_seconds: Histogram,
    /// Wall-clock time spent executing a full branch, in seconds.
    #[metric(describe = "Wall-clock time spent executing a full branch, in seconds")]
    pub branch_processing_duration_seconds: Histogram,
}

#[cfg(test)]
mod tests {
    use super::*;
    use metrics::with_local_recorder;
    use metrics_util::debugging::{DebugValue, DebuggingRecorder};

    #[test]
    fn reorganizations_counter_increments() {
        let recorder = DebuggingRecorder::new();
        let snapshotter = recorder.snapshotter();

        with_local_recorder(&recorder, || {
            let metrics = BlockProcessorMetrics::default();
            metrics.reorganizations.increment(1);
            metrics.reorganizations.increment(1);
        });

        let snapshot = snapshotter.snapshot().into_vec();
        let reorg = snapshot
            .into_iter()
            .find(|(key, ..)| key.key().name() == "blockproc_reorganizations")
            .expect("reorganizations counter registered");
        assert_eq!(reorg.3, DebugValue::Counter(2));
    }
}
