//! The serialized executor: construction, submission, shutdown.

use std::panic;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle, ThreadId};
use std::time::{Duration, Instant};

use tracing::debug;

use crate::error::{ExecResult, ExecutorError};
use crate::reporter::{Reporter, TracingReporter};
use crate::work::WorkItem;
use crate::worker;

/// Default bounded wait for the worker to exit during shutdown.
///
/// Applied by [`SerialExecutor::shutdown`] unless overridden through
/// [`SerialExecutorBuilder::shutdown_timeout`]. When the wait expires the
/// worker is left running detached; it is never forcibly killed.
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Default executor name, also used as the worker thread name.
pub const DEFAULT_EXECUTOR_NAME: &str = "serialq-worker";

/// Polling step while waiting for the worker thread to finish.
const JOIN_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// A FIFO, single-consumer execution context.
///
/// Owns one dedicated worker thread and an unbounded queue of work items.
/// All work submitted through [`post`](SerialExecutor::post) and
/// [`send`](SerialExecutor::send) executes on that thread, one item at a
/// time, in submission order — the concurrency analogue of a single-threaded
/// apartment or an actor mailbox.
///
/// # Thread Safety
///
/// `SerialExecutor` is `Send + Sync` and [`Clone`]; clones are logically
/// equivalent submission handles sharing the same worker, so items submitted
/// through any clone observe one common FIFO order.
///
/// # Resource Management
///
/// Call [`shutdown`](SerialExecutor::shutdown) explicitly for deterministic
/// cleanup. If the last handle is dropped without it, a warning is reported
/// and the same graceful shutdown runs as a backstop.
///
/// # Example
///
/// ```rust
/// use serialq_core::SerialExecutor;
///
/// let exec = SerialExecutor::named("greeter")?;
///
/// // Fire-and-forget submission
/// exec.post(|| println!("hello from the worker"))?;
///
/// // Blocking submission with a result
/// let answer = exec.send(|| 41 + 1)?;
/// assert_eq!(answer, 42);
///
/// exec.shutdown()?;
/// # Ok::<_, serialq_core::ExecutorError>(())
/// ```
#[derive(Clone)]
pub struct SerialExecutor {
    inner: Arc<Inner>,
}

struct Inner {
    /// Friendly identifier, also the worker thread name.
    name: String,

    /// Bounded wait for the worker to exit during shutdown.
    shutdown_timeout: Duration,

    /// Sink for fired-callback panics and shutdown anomalies.
    reporter: Arc<dyn Reporter>,

    /// Identity of the dedicated worker thread, for reentrancy detection.
    worker_id: ThreadId,

    /// Sending half of the work queue; taking it closes the queue.
    queue: Mutex<Option<Sender<WorkItem>>>,

    /// Join handle of the worker thread, taken exactly once.
    worker: Mutex<Option<JoinHandle<()>>>,

    /// Latch making shutdown idempotent.
    shutdown: AtomicBool,
}

impl SerialExecutor {
    /// Creates an executor with the default name and configuration.
    ///
    /// The worker thread starts immediately.
    ///
    /// # Errors
    ///
    /// - [`ExecutorError::SpawnFailed`] if the worker thread cannot be started
    pub fn new() -> ExecResult<Self> {
        Self::builder().build()
    }

    /// Creates an executor with a friendly name.
    ///
    /// The name is attached to the worker thread and appears in every error
    /// and diagnostic this executor produces.
    ///
    /// # Errors
    ///
    /// - [`ExecutorError::SpawnFailed`] if the worker thread cannot be started
    ///
    /// # Example
    ///
    /// ```rust
    /// use serialq_core::SerialExecutor;
    ///
    /// let exec = SerialExecutor::named("db-facade")?;
    /// let on_worker = exec.send(|| std::thread::current().name().map(String::from))?;
    /// assert_eq!(on_worker.as_deref(), Some("db-facade"));
    /// # exec.shutdown()?;
    /// # Ok::<_, serialq_core::ExecutorError>(())
    /// ```
    pub fn named(name: impl Into<String>) -> ExecResult<Self> {
        Self::builder().name(name).build()
    }

    /// Returns a builder for configuring name, shutdown timeout and reporter.
    pub fn builder() -> SerialExecutorBuilder {
        SerialExecutorBuilder::new()
    }

    fn with_config(
        name: String,
        shutdown_timeout: Duration,
        reporter: Arc<dyn Reporter>,
    ) -> ExecResult<Self> {
        let (queue_tx, queue_rx) = mpsc::channel::<WorkItem>();

        let worker_name = name.clone();
        let worker_reporter = reporter.clone();
        let handle = thread::Builder::new()
            .name(name.clone())
            .spawn(move || worker::run(worker_name, queue_rx, worker_reporter))
            .map_err(|source| ExecutorError::SpawnFailed {
                name: name.clone(),
                source,
            })?;

        let worker_id = handle.thread().id();
        debug!(executor = %name, ?worker_id, "executor started");

        Ok(Self {
            inner: Arc::new(Inner {
                name,
                shutdown_timeout,
                reporter,
                worker_id,
                queue: Mutex::new(Some(queue_tx)),
                worker: Mutex::new(Some(handle)),
                shutdown: AtomicBool::new(false),
            }),
        })
    }

    /// Enqueues a fire-and-forget work item and returns immediately.
    ///
    /// The callback runs on the worker thread after every previously queued
    /// item. No result or error is observable by the caller: a panic inside
    /// the callback is routed to the executor's [`Reporter`] and the worker
    /// continues with the next item.
    ///
    /// # Errors
    ///
    /// - [`ExecutorError::SubmissionRejected`] once shutdown has begun
    pub fn post<F>(&self, callback: F) -> ExecResult<()>
    where
        F: FnOnce() + Send + 'static,
    {
        self.enqueue(WorkItem::fired(Box::new(callback)))
    }

    /// Runs a callback on the worker thread and blocks until it completes.
    ///
    /// The callback's return value is handed back to the caller. If the
    /// callback panics, the panic payload is captured on the worker and
    /// re-raised verbatim in the calling thread.
    ///
    /// When called *from* the worker thread itself, the callback executes
    /// inline instead of going through the queue: a blocking call from the
    /// queue's only consumer, waiting on an item it would itself have to
    /// dequeue, is a guaranteed deadlock otherwise. Inline execution also
    /// applies while the executor is draining, since the enclosing item was
    /// accepted before shutdown.
    ///
    /// # Errors
    ///
    /// - [`ExecutorError::SubmissionRejected`] once shutdown has begun
    /// - [`ExecutorError::WorkerStopped`] if the worker goes away without
    ///   signalling (not reachable in normal operation)
    ///
    /// # Example
    ///
    /// ```rust
    /// use serialq_core::SerialExecutor;
    ///
    /// let exec = SerialExecutor::new()?;
    /// let nested = exec.clone();
    ///
    /// // A nested send from inside a callback completes inline.
    /// let value = exec.send(move || nested.send(|| 7).expect("nested send"))?;
    /// assert_eq!(value, 7);
    /// # exec.shutdown()?;
    /// # Ok::<_, serialq_core::ExecutorError>(())
    /// ```
    pub fn send<R, F>(&self, callback: F) -> ExecResult<R>
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        if self.is_worker_thread() {
            return Ok(callback());
        }

        let (done_rx, value_rx) = self.enqueue_blocking(callback)?;
        match done_rx.recv() {
            Ok(Ok(())) => value_rx.recv().map_err(|_| self.worker_stopped()),
            Ok(Err(payload)) => panic::resume_unwind(payload),
            Err(_) => Err(self.worker_stopped()),
        }
    }

    /// Like [`send`](SerialExecutor::send), but gives up waiting after
    /// `timeout`.
    ///
    /// On timeout the work item is *not* cancelled — it may still execute
    /// later in its queued position; its completion signal is discarded.
    /// From the worker thread the callback runs inline and the timeout is
    /// irrelevant.
    ///
    /// # Errors
    ///
    /// - [`ExecutorError::SendTimeout`] if the wait expires
    /// - [`ExecutorError::SubmissionRejected`] once shutdown has begun
    /// - [`ExecutorError::WorkerStopped`] if the worker goes away without
    ///   signalling
    pub fn send_timeout<R, F>(&self, callback: F, timeout: Duration) -> ExecResult<R>
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        if self.is_worker_thread() {
            return Ok(callback());
        }

        let (done_rx, value_rx) = self.enqueue_blocking(callback)?;
        match done_rx.recv_timeout(timeout) {
            Ok(Ok(())) => value_rx.recv().map_err(|_| self.worker_stopped()),
            Ok(Err(payload)) => panic::resume_unwind(payload),
            Err(RecvTimeoutError::Timeout) => Err(ExecutorError::SendTimeout {
                name: self.inner.name.clone(),
                timeout,
            }),
            Err(RecvTimeoutError::Disconnected) => Err(self.worker_stopped()),
        }
    }

    /// Shuts the executor down, draining already-queued work.
    ///
    /// Idempotent: only the first call has effect; later calls return `Ok`
    /// without waiting. The first call closes the queue — items already
    /// queued continue to run to completion, new `post`/`send` calls fail
    /// with [`ExecutorError::SubmissionRejected`] — then waits for the worker
    /// thread to exit, bounded by the configured shutdown timeout.
    ///
    /// # Errors
    ///
    /// - [`ExecutorError::ShutdownTimeout`] if the worker does not exit in
    ///   time. The condition is also reported through the [`Reporter`]; the
    ///   worker is left running detached and all caller-side resources are
    ///   released regardless.
    pub fn shutdown(&self) -> ExecResult<()> {
        if self.inner.shutdown.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        debug!(executor = %self.inner.name, "shutdown requested, closing queue");
        self.inner.close_queue();
        self.inner.join_worker()
    }

    /// Returns the executor's friendly name.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Returns the identity of the dedicated worker thread.
    pub fn thread_id(&self) -> ThreadId {
        self.inner.worker_id
    }

    /// Returns true when called from the executor's own worker thread.
    pub fn is_worker_thread(&self) -> bool {
        thread::current().id() == self.inner.worker_id
    }

    /// Returns true once shutdown has begun.
    pub fn is_shutdown(&self) -> bool {
        self.inner.shutdown.load(Ordering::SeqCst)
    }

    /// Queues a blocking item; returns the completion and value receivers.
    #[allow(clippy::type_complexity)]
    fn enqueue_blocking<R, F>(
        &self,
        callback: F,
    ) -> ExecResult<(
        mpsc::Receiver<thread::Result<()>>,
        mpsc::Receiver<R>,
    )>
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        let (value_tx, value_rx) = mpsc::sync_channel(1);
        let (done_tx, done_rx) = mpsc::sync_channel(1);

        // If the callback panics the value is never sent; the worker captures
        // the payload and forwards it through the completion channel instead.
        let callback = Box::new(move || {
            let _ = value_tx.send(callback());
        });

        self.enqueue(WorkItem::blocking(callback, done_tx))?;
        Ok((done_rx, value_rx))
    }

    fn enqueue(&self, item: WorkItem) -> ExecResult<()> {
        let queue = self.inner.queue.lock().unwrap();
        match queue.as_ref() {
            Some(sender) if !self.is_shutdown() => {
                sender.send(item).map_err(|_| self.rejected())
            }
            _ => Err(self.rejected()),
        }
    }

    fn rejected(&self) -> ExecutorError {
        ExecutorError::SubmissionRejected {
            name: self.inner.name.clone(),
        }
    }

    fn worker_stopped(&self) -> ExecutorError {
        ExecutorError::WorkerStopped {
            name: self.inner.name.clone(),
        }
    }
}

impl std::fmt::Debug for SerialExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialExecutor")
            .field("name", &self.inner.name)
            .field("worker_id", &self.inner.worker_id)
            .field("shutdown", &self.is_shutdown())
            .finish()
    }
}

impl Inner {
    fn close_queue(&self) {
        self.queue.lock().unwrap().take();
    }

    fn join_worker(&self) -> ExecResult<()> {
        let Some(handle) = self.worker.lock().unwrap().take() else {
            return Ok(());
        };

        // A callback driving shutdown runs on the worker itself; joining from
        // there can never complete. The queue is already closed, so the
        // remaining items still drain once that callback returns.
        if thread::current().id() == self.worker_id {
            return Ok(());
        }

        let start = Instant::now();
        while !handle.is_finished() {
            if start.elapsed() >= self.shutdown_timeout {
                self.reporter.report(&format!(
                    "executor '{}': worker did not stop within {:?}, leaving it detached",
                    self.name, self.shutdown_timeout
                ));
                return Err(ExecutorError::ShutdownTimeout {
                    name: self.name.clone(),
                    timeout: self.shutdown_timeout,
                });
            }
            thread::sleep(JOIN_POLL_INTERVAL);
        }

        // The worker catches panics per item, so the join itself cannot fail
        // in normal operation.
        let _ = handle.join();
        Ok(())
    }
}

impl Drop for Inner {
    /// Backstop for handles dropped without [`SerialExecutor::shutdown`].
    ///
    /// Reports a warning and performs the same graceful shutdown: the queue
    /// is closed, queued items drain, and the worker is joined with the
    /// bounded wait.
    fn drop(&mut self) {
        if self.shutdown.swap(true, Ordering::SeqCst) {
            return;
        }

        self.reporter.report(&format!(
            "executor '{}' dropped without shutdown(), draining queue",
            self.name
        ));
        self.close_queue();
        let _ = self.join_worker();
    }
}

/// Builder for [`SerialExecutor`] with defaulted knobs.
///
/// # Example
///
/// ```rust
/// use serialq_core::SerialExecutor;
/// use std::time::Duration;
///
/// let exec = SerialExecutor::builder()
///     .name("audit-log")
///     .shutdown_timeout(Duration::from_secs(1))
///     .build()?;
/// # exec.shutdown()?;
/// # Ok::<_, serialq_core::ExecutorError>(())
/// ```
pub struct SerialExecutorBuilder {
    name: String,
    shutdown_timeout: Duration,
    reporter: Arc<dyn Reporter>,
}

impl SerialExecutorBuilder {
    fn new() -> Self {
        Self {
            name: DEFAULT_EXECUTOR_NAME.to_string(),
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
            reporter: Arc::new(TracingReporter),
        }
    }

    /// Sets the executor's friendly name, also used as the worker thread name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the bounded wait for the worker to exit during shutdown.
    pub fn shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }

    /// Injects the diagnostic sink for fired-callback panics and shutdown
    /// anomalies. Defaults to [`TracingReporter`].
    pub fn reporter(mut self, reporter: Arc<dyn Reporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Spawns the worker thread and returns the executor.
    ///
    /// # Errors
    ///
    /// - [`ExecutorError::SpawnFailed`] if the worker thread cannot be started
    pub fn build(self) -> ExecResult<SerialExecutor> {
        SerialExecutor::with_config(self.name, self.shutdown_timeout, self.reporter)
    }
}

impl Default for SerialExecutorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
