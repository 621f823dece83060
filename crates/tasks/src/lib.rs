//! Background task dispatch.
//!
//! The per-block pipeline's background hash precomputer (and anything else
//! that should run off the critical path of `process`) goes through
//! [`TaskExecutor`] rather than calling `tokio::spawn` directly, so the
//! dispatch point is one place to add instrumentation or swap runtimes.

use std::future::Future;
use thiserror::Error;
use tokio::{runtime::Handle, task::JoinHandle};
use tracing::error;

/// Failure to obtain a Tokio runtime to spawn onto.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TaskSpawnError {
    /// [`TaskExecutor::current`] was called off a Tokio runtime thread.
    #[error("no Tokio runtime is available on the current thread")]
    NoRuntime,
}

/// Dispatches fire-and-forget background work onto a Tokio runtime.
#[derive(Debug, Clone)]
pub struct TaskExecutor {
    handle: Handle,
}

impl TaskExecutor {
    /// Captures the ambient Tokio runtime handle for the calling thread.
    pub fn current() -> Result<Self, TaskSpawnError> {
        Handle::try_current().map(|handle| Self { handle }).map_err(|_| TaskSpawnError::NoRuntime)
    }

    /// Wraps an explicit runtime handle.
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Spawns `future` without awaiting it, logging (never panicking on) any
    /// error it returns.
    ///
    /// This is the dispatch the per-block pipeline uses for the background
    /// hash precomputer: the caller moves on immediately, and a failure only
    /// ever surfaces as a log line under `name`.
    pub fn spawn_fire_and_forget<F, E>(&self, name: &'static str, future: F) -> JoinHandle<()>
    where
        F: Future<Output = Result<(), E>> + Send + 'static,
        E: std::fmt::Display + Send + 'static,
    {
        self.handle.spawn(async move {
            if let Err(error) = future.await {
                error!(task = name, %error, "background task failed");
            }
        })
    }
}
