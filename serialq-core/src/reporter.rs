//! Diagnostic sink for failures that have no caller to propagate to.
//!
//! Two conditions produce diagnostics with nobody waiting on them: a panic in
//! a fired (fire-and-forget) callback, and a worker that outlives its bounded
//! shutdown wait. Both are routed through the [`Reporter`] capability injected
//! at construction time, so embedders can forward them to whatever sink their
//! application uses.

use tracing::warn;

/// Injected diagnostic sink.
///
/// Implemented for any `Fn(&str)` closure, so tests and embedders can capture
/// reports without defining a type:
///
/// ```rust
/// use serialq_core::{Reporter, SerialExecutor};
/// use std::sync::{Arc, Mutex};
///
/// let seen: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
/// let sink = seen.clone();
/// let exec = SerialExecutor::builder()
///     .reporter(Arc::new(move |msg: &str| {
///         sink.lock().unwrap().push(msg.to_string());
///     }))
///     .build()?;
/// # exec.shutdown()?;
/// # Ok::<_, serialq_core::ExecutorError>(())
/// ```
pub trait Reporter: Send + Sync {
    /// Delivers one diagnostic message.
    ///
    /// Called on the worker thread (fired-callback panics) or on the thread
    /// driving shutdown (join timeouts); implementations should not block.
    fn report(&self, message: &str);
}

impl<F> Reporter for F
where
    F: Fn(&str) + Send + Sync,
{
    fn report(&self, message: &str) {
        self(message)
    }
}

/// Default reporter, routing diagnostics to [`tracing::warn!`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn report(&self, message: &str) {
        warn!("{message}");
    }
}
