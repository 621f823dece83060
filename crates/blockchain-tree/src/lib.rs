//! Branch driver and per-block pipeline for re-executing suggested blocks
//! against a mutable world state, with checkpoint/rollback around failures.

pub mod dao;
pub mod events;
pub mod hashing;
pub mod pipeline;
pub mod tree;
pub mod validator;

pub use events::{EventBus, EventObserver, NullObserver};
pub use pipeline::{process_one, PipelineContext};
pub use tree::BlockchainTree;
pub use validator::{BlockValidator, HeaderFieldValidator};
