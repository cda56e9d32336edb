//! Integration tests for serialq-core
//!
//! These tests verify the end-to-end contract of the serialized executor:
//! FIFO ordering, mutual exclusion, panic propagation, reentrancy and
//! graceful shutdown.

use serialq_core::{ExecutorError, Reporter, SerialExecutor};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

/// A reporter that records every message for later inspection.
fn capturing_reporter() -> (Arc<dyn Reporter>, Arc<Mutex<Vec<String>>>) {
    let seen: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let reporter: Arc<dyn Reporter> = Arc::new(move |msg: &str| {
        sink.lock().unwrap().push(msg.to_string());
    });
    (reporter, seen)
}

/// Mixed post/send submissions from one thread execute in submission order.
#[test]
fn test_fifo_ordering_mixed_submissions() {
    let exec = SerialExecutor::named("fifo").expect("Failed to build executor");
    let log: Arc<Mutex<Vec<usize>>> = Arc::new(Mutex::new(Vec::new()));

    for i in 0..10 {
        let entry = log.clone();
        if i % 3 == 0 {
            exec.send(move || entry.lock().unwrap().push(i))
                .expect("Failed to send");
        } else {
            exec.post(move || entry.lock().unwrap().push(i))
                .expect("Failed to post");
        }
    }

    // A final blocking item doubles as a drain barrier.
    exec.send(|| ()).expect("Failed to send barrier");

    assert_eq!(*log.lock().unwrap(), (0..10).collect::<Vec<_>>());
    exec.shutdown().expect("Failed to shut down");
}

/// No two callbacks ever execute concurrently, even with racing producers.
#[test]
fn test_mutual_exclusion() {
    let exec = SerialExecutor::named("exclusive").expect("Failed to build executor");
    let in_flight = Arc::new(AtomicUsize::new(0));
    let observed_max = Arc::new(AtomicUsize::new(0));
    let executed = Arc::new(AtomicUsize::new(0));

    let producers: Vec<_> = (0..4)
        .map(|_| {
            let exec = exec.clone();
            let in_flight = in_flight.clone();
            let observed_max = observed_max.clone();
            let executed = executed.clone();
            thread::spawn(move || {
                for _ in 0..25 {
                    let in_flight = in_flight.clone();
                    let observed_max = observed_max.clone();
                    let executed = executed.clone();
                    exec.post(move || {
                        let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                        observed_max.fetch_max(now, Ordering::SeqCst);
                        executed.fetch_add(1, Ordering::SeqCst);
                        in_flight.fetch_sub(1, Ordering::SeqCst);
                    })
                    .expect("Failed to post");
                }
            })
        })
        .collect();

    for producer in producers {
        producer.join().expect("Producer thread panicked");
    }
    exec.send(|| ()).expect("Failed to send barrier");

    assert_eq!(executed.load(Ordering::SeqCst), 100);
    assert_eq!(observed_max.load(Ordering::SeqCst), 1);
    exec.shutdown().expect("Failed to shut down");
}

/// A panic in a blocking callback is re-raised verbatim in the caller.
#[test]
fn test_blocking_panic_propagation() {
    let exec = SerialExecutor::named("propagate").expect("Failed to build executor");

    let payload = catch_unwind(AssertUnwindSafe(|| {
        let _ = exec.send(|| -> () { panic!("boom") });
    }))
    .expect_err("send should re-raise the callback panic");

    let message = payload
        .downcast_ref::<&str>()
        .copied()
        .expect("Panic payload should be the original &str");
    assert_eq!(message, "boom");

    // The worker survives and keeps processing.
    assert_eq!(exec.send(|| 1).expect("Failed to send"), 1);
    exec.shutdown().expect("Failed to shut down");
}

/// A panic in a fired callback reaches the reporter, not the caller, and
/// does not stop subsequent submissions.
#[test]
fn test_fired_panic_isolation() {
    let (reporter, seen) = capturing_reporter();
    let exec = SerialExecutor::builder()
        .name("isolated")
        .reporter(reporter)
        .build()
        .expect("Failed to build executor");

    exec.post(|| panic!("kaboom")).expect("Failed to post");

    // Both submission modes still work afterwards.
    exec.post(|| ()).expect("Failed to post after panic");
    assert_eq!(exec.send(|| 99).expect("Failed to send after panic"), 99);

    let reports = seen.lock().unwrap();
    assert!(
        reports.iter().any(|msg| msg.contains("kaboom")),
        "reporter should have observed the fired panic, got: {:?}",
        *reports
    );
    drop(reports);
    exec.shutdown().expect("Failed to shut down");
}

/// A nested send from the worker thread completes inline, without
/// deadlocking and without reordering relative to already-queued items.
#[test]
fn test_reentrant_send() {
    let exec = SerialExecutor::named("reentrant").expect("Failed to build executor");
    let log: Arc<Mutex<Vec<usize>>> = Arc::new(Mutex::new(Vec::new()));

    for i in [1, 2] {
        let entry = log.clone();
        exec.post(move || entry.lock().unwrap().push(i))
            .expect("Failed to post");
    }

    let entry = log.clone();
    let nested_exec = exec.clone();
    exec.send(move || {
        entry.lock().unwrap().push(3);
        let inner_entry = entry.clone();
        nested_exec
            .send(move || inner_entry.lock().unwrap().push(4))
            .expect("Nested send failed");
        entry.lock().unwrap().push(5);
    })
    .expect("Outer send failed");

    assert_eq!(*log.lock().unwrap(), vec![1, 2, 3, 4, 5]);
    exec.shutdown().expect("Failed to shut down");
}

/// send returns the callback's value; a nested send returns its own.
#[test]
fn test_send_returns_value() {
    let exec = SerialExecutor::named("values").expect("Failed to build executor");

    assert_eq!(exec.send(|| 42).expect("Failed to send"), 42);

    let nested_exec = exec.clone();
    let nested = exec
        .send(move || nested_exec.send(|| 7).expect("Nested send failed"))
        .expect("Outer send failed");
    assert_eq!(nested, 7);

    exec.shutdown().expect("Failed to shut down");
}

/// Items queued before shutdown complete; submissions after it are rejected.
#[test]
fn test_graceful_shutdown() {
    let exec = SerialExecutor::named("graceful").expect("Failed to build executor");
    let log: Arc<Mutex<Vec<u32>>> = Arc::new(Mutex::new(Vec::new()));

    for i in 0..5 {
        let entry = log.clone();
        exec.post(move || {
            thread::sleep(Duration::from_millis(10));
            entry.lock().unwrap().push(i);
        })
        .expect("Failed to post");
    }

    assert!(!exec.is_shutdown());
    exec.shutdown().expect("Failed to shut down");
    assert!(exec.is_shutdown());

    // Everything queued before the call has drained.
    assert_eq!(*log.lock().unwrap(), vec![0, 1, 2, 3, 4]);

    // New work is rejected in both modes.
    let err = exec.post(|| ()).expect_err("post should be rejected");
    assert!(err.is_rejected());
    let err = exec.send(|| ()).expect_err("send should be rejected");
    assert!(matches!(err, ExecutorError::SubmissionRejected { ref name } if name == "graceful"));
}

/// Calling shutdown twice has no additional effect and does not raise.
#[test]
fn test_idempotent_shutdown() {
    let exec = SerialExecutor::named("idempotent").expect("Failed to build executor");
    exec.shutdown().expect("First shutdown failed");
    exec.shutdown().expect("Second shutdown should be a no-op");

    // A clone observes the same latch.
    exec.clone()
        .shutdown()
        .expect("Shutdown through a clone should be a no-op");
}

/// Scenario from the contract: five posted payloads observed in order.
#[test]
fn test_posted_sequence_scenario() {
    let exec = SerialExecutor::named("scenario").expect("Failed to build executor");
    let log: Arc<Mutex<Vec<u32>>> = Arc::new(Mutex::new(Vec::new()));

    for payload in [1, 2, 3, 4, 5] {
        let entry = log.clone();
        exec.post(move || entry.lock().unwrap().push(payload))
            .expect("Failed to post");
    }

    // Bounded wait: a blocking barrier behind the posted items.
    exec.send(|| ()).expect("Failed to send barrier");
    assert_eq!(*log.lock().unwrap(), vec![1, 2, 3, 4, 5]);

    exec.shutdown().expect("Failed to shut down");
}

/// Clones are logically equivalent handles onto the same worker and share
/// one FIFO order.
#[test]
fn test_clone_shares_worker() {
    let exec = SerialExecutor::named("shared").expect("Failed to build executor");
    let copy = exec.clone();

    assert_eq!(exec.thread_id(), copy.thread_id());
    assert_eq!(exec.name(), copy.name());

    let log: Arc<Mutex<Vec<u32>>> = Arc::new(Mutex::new(Vec::new()));
    for i in 0..6 {
        let entry = log.clone();
        let handle = if i % 2 == 0 { &exec } else { &copy };
        handle
            .post(move || entry.lock().unwrap().push(i))
            .expect("Failed to post");
    }
    exec.send(|| ()).expect("Failed to send barrier");

    assert_eq!(*log.lock().unwrap(), (0..6).collect::<Vec<_>>());
    exec.shutdown().expect("Failed to shut down");
}

/// send_timeout gives up while a slow item holds the worker; the timed-out
/// item still executes later in its queued position.
#[test]
fn test_send_timeout_expires() {
    let exec = SerialExecutor::named("slow").expect("Failed to build executor");
    let late_item_ran = Arc::new(AtomicBool::new(false));

    exec.post(|| thread::sleep(Duration::from_millis(200)))
        .expect("Failed to post");

    let flag = late_item_ran.clone();
    let err = exec
        .send_timeout(
            move || flag.store(true, Ordering::SeqCst),
            Duration::from_millis(20),
        )
        .expect_err("send_timeout should expire behind the slow item");
    assert!(err.is_timeout());
    assert!(matches!(err, ExecutorError::SendTimeout { .. }));

    // The abandoned item is not cancelled; it runs before this barrier.
    exec.send(|| ()).expect("Failed to send barrier");
    assert!(late_item_ran.load(Ordering::SeqCst));

    exec.shutdown().expect("Failed to shut down");
}

/// Shutdown gives up after the bounded join wait and reports the condition.
#[test]
fn test_shutdown_timeout() {
    let (reporter, seen) = capturing_reporter();
    let exec = SerialExecutor::builder()
        .name("stuck")
        .shutdown_timeout(Duration::from_millis(50))
        .reporter(reporter)
        .build()
        .expect("Failed to build executor");

    exec.post(|| thread::sleep(Duration::from_millis(600)))
        .expect("Failed to post");

    let err = exec
        .shutdown()
        .expect_err("shutdown should time out behind the stuck item");
    assert!(matches!(err, ExecutorError::ShutdownTimeout { .. }));

    let reports = seen.lock().unwrap();
    assert!(
        reports.iter().any(|msg| msg.contains("did not stop")),
        "reporter should have observed the join timeout, got: {:?}",
        *reports
    );
}

/// Dropping the last handle without shutdown drains the queue and warns.
#[test]
fn test_drop_backstop() {
    let (reporter, seen) = capturing_reporter();
    let log: Arc<Mutex<Vec<u32>>> = Arc::new(Mutex::new(Vec::new()));

    {
        let exec = SerialExecutor::builder()
            .name("forgotten")
            .reporter(reporter)
            .build()
            .expect("Failed to build executor");
        for i in 0..3 {
            let entry = log.clone();
            exec.post(move || entry.lock().unwrap().push(i))
                .expect("Failed to post");
        }
    }

    // Drop has joined the worker; all queued work completed.
    assert_eq!(*log.lock().unwrap(), vec![0, 1, 2]);
    let reports = seen.lock().unwrap();
    assert!(
        reports
            .iter()
            .any(|msg| msg.contains("dropped without shutdown")),
        "reporter should have observed the drop backstop, got: {:?}",
        *reports
    );
}

/// The worker thread carries the configured executor name.
#[test]
fn test_worker_thread_name() {
    let exec = SerialExecutor::named("custom-exec").expect("Failed to build executor");

    let observed = exec
        .send(|| thread::current().name().map(String::from))
        .expect("Failed to send");
    assert_eq!(observed.as_deref(), Some("custom-exec"));

    assert!(!exec.is_worker_thread());
    let on_worker = exec.clone();
    assert!(exec
        .send(move || on_worker.is_worker_thread())
        .expect("Failed to send"));

    exec.shutdown().expect("Failed to shut down");
}
