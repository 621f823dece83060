//! Configuration for the block processor.
//!
//! Two layers: [`ProcessingOptions`] is the per-call bit-set a caller
//! passes to a single `process` invocation (it can legitimately differ
//! between calls on the same branch driver - one caller wants validation,
//! another is replaying a known-good branch without it); [`ProcessorConfig`]
//! is the process-wide, file-loaded configuration that rarely changes
//! across calls.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::path::Path;

bitflags! {
    /// Per-call processing options.
    ///
    /// Serializes and deserializes via the `bitflags` crate's `serde`
    /// feature rather than a derived impl.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ProcessingOptions: u8 {
        /// Process blocks without updating the canonical head pointer.
        const READ_ONLY_CHAIN = 0b0001;
        /// Execute blocks but leave the canonical head where it was.
        const DO_NOT_UPDATE_HEAD = 0b0010;
        /// Persist receipts for processed blocks.
        const STORE_RECEIPTS = 0b0100;
        /// Skip post-processing validation against the suggested header.
        const NO_VALIDATION = 0b1000;
    }
}

impl Default for ProcessingOptions {
    /// The default a normal, validating, head-updating, receipt-persisting
    /// caller wants.
    fn default() -> Self {
        Self::STORE_RECEIPTS
    }
}

/// Process-wide configuration for the block processor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessorConfig {
    /// Default processing options applied when a caller does not override
    /// them for a specific `process` call.
    pub default_options: ProcessingOptions,
    /// How many blocks may be processed within a single branch before the
    /// branch driver re-initializes its world-state handle, independent of
    /// any reorg. Keeps long branches from holding one world-state handle
    /// open indefinitely.
    pub commit_interval_blocks: u64,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self { default_options: ProcessingOptions::default(), commit_interval_blocks: 64 }
    }
}

impl ProcessorConfig {
    /// Loads configuration from a TOML file, falling back to defaults for
    /// any field the file omits.
    pub fn load(path: impl AsRef<Path>) -> eyre::Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())
            .map_err(|error| eyre::eyre!("failed to read config file {:?}: {error}", path.as_ref()))?;
        Self::from_toml_str(&contents)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml_str(contents: &str) -> eyre::Result<Self> {
        toml::from_str(contents).map_err(|error| eyre::eyre!("failed to parse config: {error}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_sane_commit_interval() {
        let config = ProcessorConfig::default();
        assert_eq!(config.commit_interval_blocks, 64);
        assert!(config.default_options.contains(ProcessingOptions::STORE_RECEIPTS));
    }

    #[test]
    fn partial_toml_falls_back_to_defaults() {
        let config = ProcessorConfig::from_toml_str("commit_interval_blocks = 32").unwrap();
        assert_eq!(config.commit_interval_blocks, 32);
        assert_eq!(config.default_options, ProcessingOptions::default());
    }

    #[test]
    fn load_reads_a_file_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("processor.toml");
        std::fs::write(&path, "commit_interval_blocks = 16\n").unwrap();

        let config = ProcessorConfig::load(&path).unwrap();
        assert_eq!(config.commit_interval_blocks, 16);
    }

    #[test]
    fn load_reports_missing_file() {
        let result = ProcessorConfig::load("/nonexistent/path/processor.toml");
        assert!(result.is_err());
    }

    #[test]
    fn options_bitflags_compose() {
        let options = ProcessingOptions::READ_ONLY_CHAIN | ProcessingOptions::NO_VALIDATION;
        assert!(options.contains(ProcessingOptions::READ_ONLY_CHAIN));
        assert!(options.contains(ProcessingOptions::NO_VALIDATION));
        assert!(!options.contains(ProcessingOptions::STORE_RECEIPTS));
    }
}
