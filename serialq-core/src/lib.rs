//! # SerialQ Core
//!
//! A serialized single-thread work-queue executor: one dedicated worker
//! thread, an unbounded FIFO queue, and two submission modes — blocking
//! ("send") and fire-and-forget ("post").
//!
//! ## Overview
//!
//! [`SerialExecutor`] provides a single, consistent serialization order for
//! all work submitted to it, the way a single-threaded apartment or an actor
//! mailbox does. Producers on any number of threads hand closures to the
//! executor; the dedicated worker drains them one at a time, in arrival
//! order.
//!
//! ## Features
//!
//! ### Submission
//! - **`post()`**: Fire-and-forget, returns after enqueueing
//! - **`send()`**: Blocking, returns the callback's value; re-raises the
//!   callback's panic in the caller
//! - **`send_timeout()`**: Blocking with a bounded wait
//!
//! ### General
//! - **Thread-Safe**: `SerialExecutor` is `Send + Sync + Clone`; clones are
//!   equivalent submission handles sharing the worker
//! - **Reentrant**: `send` from the worker thread itself runs inline instead
//!   of deadlocking against the queue's only consumer
//! - **Graceful Shutdown**: queued items drain, new submissions are
//!   rejected, and the worker join is bounded by a timeout
//!
//! ## Architecture
//!
//! ```text
//! Producer Threads  →  post()/send()  →  FIFO queue  →  Worker Thread
//!                                                          ↓
//!                          completion handles  ←  one callback at a time
//! ```
//!
//! The worker thread starts when the executor is constructed and stays alive
//! until [`SerialExecutor::shutdown`] is called or the last handle is
//! dropped.
//!
//! ## Quick Start
//!
//! ```rust
//! use serialq_core::SerialExecutor;
//!
//! let exec = SerialExecutor::named("example")?;
//!
//! // Fire-and-forget: no result channel, errors go to the reporter.
//! exec.post(|| println!("running on the worker thread"))?;
//!
//! // Blocking: the callback's value comes back to the caller.
//! let answer = exec.send(|| 42)?;
//! assert_eq!(answer, 42);
//!
//! // Deterministic cleanup: drains the queue, joins the worker.
//! exec.shutdown()?;
//! # Ok::<_, serialq_core::ExecutorError>(())
//! ```
//!
//! ## Ordering Guarantees
//!
//! All work items — fired and blocking alike — execute strictly in enqueue
//! order. Across racing producer threads the order is whichever enqueue
//! completes first, with the standard happens-before semantics of the
//! underlying channel.
//!
//! ## Error Handling
//!
//! All operations return [`ExecResult<T>`] wrapping [`ExecutorError`]:
//!
//! - `SubmissionRejected`: work submitted after shutdown began
//! - `SendTimeout`: a bounded blocking wait expired
//! - `ShutdownTimeout`: the worker outlived the bounded join
//! - `SpawnFailed`: the worker thread could not be started
//! - `WorkerStopped`: the worker vanished mid-submission (not reachable in
//!   normal operation)
//!
//! Callback panics are not errors of the executor itself: a blocking
//! submission re-raises the panic in the caller, a fired submission routes
//! it to the injected [`Reporter`] and the worker keeps processing.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;
mod executor;
mod reporter;
mod work;
mod worker;

pub use error::{ExecResult, ExecutorError};
pub use executor::{
    SerialExecutor, SerialExecutorBuilder, DEFAULT_EXECUTOR_NAME, DEFAULT_SHUTDOWN_TIMEOUT,
};
pub use reporter::{Reporter, TracingReporter};
