//! Work items flowing from producers to the worker thread.

use std::sync::mpsc::SyncSender;
use std::thread;

/// Type-erased unit of submitted work.
///
/// The `(callback, state)` pair of the submission API collapses into a
/// capturing closure; state is whatever the closure owns.
pub(crate) type Callback = Box<dyn FnOnce() + Send + 'static>;

/// Single-use completion handle for a blocking submission.
///
/// Carries `Ok(())` when the callback returned normally, or the captured
/// panic payload for the submitter to re-raise.
pub(crate) type Completion = SyncSender<thread::Result<()>>;

/// One unit of callback-plus-state work, owned by the queue from submission
/// until the worker dequeues and executes it.
pub(crate) struct WorkItem {
    pub(crate) callback: Callback,
    /// `None` for fired submissions, `Some` for blocking ones.
    pub(crate) completion: Option<Completion>,
}

impl WorkItem {
    /// A fire-and-forget item: no result or error observable by the submitter.
    pub(crate) fn fired(callback: Callback) -> Self {
        Self {
            callback,
            completion: None,
        }
    }

    /// A blocking item: the submitter waits on the paired receiver until the
    /// worker signals `completion`.
    pub(crate) fn blocking(callback: Callback, completion: Completion) -> Self {
        Self {
            callback,
            completion: Some(completion),
        }
    }
}
