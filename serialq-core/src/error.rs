//! Error handling for executor operations
//!
//! All fallible operations on a [`SerialExecutor`](crate::SerialExecutor)
//! return [`ExecResult`], built on the [`ExecutorError`] enum below.
//!
//! # Error Categories
//!
//! - **Submission**: [`ExecutorError::SubmissionRejected`] — work handed to an
//!   executor that has already begun shutdown
//! - **Timeout**: [`ExecutorError::SendTimeout`] and
//!   [`ExecutorError::ShutdownTimeout`] — a bounded wait expired
//! - **Infrastructure**: [`ExecutorError::SpawnFailed`] and
//!   [`ExecutorError::WorkerStopped`] — the worker thread could not be
//!   started, or went away without signalling a blocking submission
//!
//! Panics raised by submitted callbacks are deliberately *not* part of this
//! taxonomy: a blocking submission re-raises the callback's panic payload
//! verbatim in the calling thread, and a fired submission routes it to the
//! executor's [`Reporter`](crate::Reporter) instead.
//!
//! # Anyhow Integration
//!
//! ```rust
//! use serialq_core::ExecutorError;
//! use anyhow::Context;
//!
//! fn application_boundary() -> anyhow::Result<()> {
//!     let err = ExecutorError::SubmissionRejected {
//!         name: "audit-log".to_string(),
//!     };
//!     Err(err.into_anyhow()).context("Failed to enqueue audit record")
//! }
//! ```

use std::io;
use std::time::Duration;
use thiserror::Error;

/// Unified error type for all executor operations
///
/// Variants carry the executor's friendly name so that failures from several
/// executors sharing one process remain attributable in logs.
#[derive(Debug, Error)]
pub enum ExecutorError {
    /// Work was submitted after shutdown had already begun
    ///
    /// Raised by both `post` and `send`. Also covers infrastructure failures
    /// of the underlying queue (channel closed), which are indistinguishable
    /// from shutdown from the caller's point of view.
    #[error("Submission rejected: executor '{name}' is shutting down")]
    SubmissionRejected {
        /// Name of the rejecting executor
        name: String,
    },

    /// A blocking submission gave up waiting for its completion signal
    ///
    /// The work item may still execute later; its completion signal is
    /// discarded once this error is returned.
    #[error("Timed out after {timeout:?} waiting for executor '{name}' to complete a blocking submission")]
    SendTimeout {
        /// Name of the executor that was too slow
        name: String,
        /// The expired wait bound
        timeout: Duration,
    },

    /// The worker thread did not exit within the bounded shutdown wait
    ///
    /// Non-fatal: the queue is already closed and all resources on the
    /// caller's side are released. The worker keeps running detached until
    /// its current callback returns.
    #[error("Executor '{name}' worker did not stop within {timeout:?}")]
    ShutdownTimeout {
        /// Name of the executor being shut down
        name: String,
        /// The expired join bound
        timeout: Duration,
    },

    /// The dedicated worker thread could not be spawned
    #[error("Failed to spawn worker thread for executor '{name}': {source}")]
    SpawnFailed {
        /// Name of the executor under construction
        name: String,
        /// The underlying OS error
        #[source]
        source: io::Error,
    },

    /// The worker went away before signalling a blocking submission
    ///
    /// Not reachable in normal operation: accepted items always run to
    /// completion, even while draining.
    #[error("Executor '{name}' worker stopped before signalling completion")]
    WorkerStopped {
        /// Name of the executor whose worker disappeared
        name: String,
    },
}

impl ExecutorError {
    /// Returns true if this error rejects a submission
    pub fn is_rejected(&self) -> bool {
        matches!(self, ExecutorError::SubmissionRejected { .. })
    }

    /// Returns true if this error is an expired bounded wait
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            ExecutorError::SendTimeout { .. } | ExecutorError::ShutdownTimeout { .. }
        )
    }

    /// Converts this error into an `anyhow::Error`
    ///
    /// Provides seamless integration with anyhow at application boundaries,
    /// allowing executor errors to participate in anyhow error chains.
    pub fn into_anyhow(self) -> anyhow::Error {
        self.into()
    }
}

/// Type alias for Results using ExecutorError
///
/// This is the standard Result type used throughout the crate for operations
/// that may fail.
pub type ExecResult<T> = Result<T, ExecutorError>;
