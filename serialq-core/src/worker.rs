//! The dedicated worker loop draining the executor's queue.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::Receiver;
use std::sync::Arc;

use tracing::debug;

use crate::reporter::Reporter;
use crate::work::WorkItem;

/// Worker thread body: `Running -> Draining -> Stopped`.
///
/// `recv()` yields queued items until the queue is both closed (all senders
/// dropped) and empty, so draining falls out of the channel semantics: once
/// shutdown takes the sender, the loop finishes whatever is already queued
/// and then exits.
pub(crate) fn run(name: String, queue: Receiver<WorkItem>, reporter: Arc<dyn Reporter>) {
    debug!(executor = %name, "worker started");

    while let Ok(item) = queue.recv() {
        let outcome = panic::catch_unwind(AssertUnwindSafe(item.callback));
        match item.completion {
            // Blocking: forward the outcome, panic payload included, to the
            // waiting submitter. Send fails only if the submitter gave up
            // waiting (send_timeout), in which case the signal is discarded.
            Some(completion) => {
                let _ = completion.send(outcome);
            }
            // Fired: the submitter opted out of a result channel. A panic is
            // terminal for this one item only; the worker must keep going.
            None => {
                if let Err(payload) = outcome {
                    reporter.report(&format!(
                        "executor '{}': fired work item panicked: {}",
                        name,
                        panic_message(payload.as_ref())
                    ));
                }
            }
        }
    }

    debug!(executor = %name, "queue drained, worker stopped");
}

/// Best-effort extraction of a human-readable message from a panic payload.
fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "non-string panic payload"
    }
}
