//! # Serialized Facade Demo
//!
//! This example demonstrates the classic serialized-queue pattern on top of
//! `serialq-core`: a database facade that funnels every command through one
//! dedicated thread, and an audit logger that serializes its own messages
//! and forwards each one to the facade.
//!
//! ## What This Demo Shows
//!
//! 1. Wrapping an executor in a facade with ordinary synchronous methods
//! 2. Blocking submissions (`send`) that hand results back to the caller
//! 3. Fire-and-forget submissions (`post`) for log messages
//! 4. Two executors cooperating without deadlocking each other
//! 5. Clean shutdown with `shutdown()`

use serialq_core::{ExecResult, SerialExecutor};
use std::thread;
use std::time::Duration;

/// Serializes database commands onto one dedicated worker thread.
///
/// Every `save` observes the same serialization order, no matter which
/// thread calls it.
#[derive(Clone)]
struct DatabaseFacade {
    exec: SerialExecutor,
}

impl DatabaseFacade {
    fn new() -> ExecResult<Self> {
        Ok(Self {
            exec: SerialExecutor::named("db-facade")?,
        })
    }

    /// Executes a command on the facade thread and blocks for its result.
    fn save(&self, command: &str) -> ExecResult<String> {
        let command = command.to_string();
        self.exec.send(move || {
            println!("   [db-facade] executing '{command}'...");
            // Emulate some IO-bound operation
            thread::sleep(Duration::from_millis(100));
            format!("OK: {command}")
        })
    }

    fn close(&self) -> ExecResult<()> {
        self.exec.shutdown()
    }
}

/// Serializes log messages and forwards each one to the database facade.
struct AuditLogger {
    exec: SerialExecutor,
    facade: DatabaseFacade,
}

impl AuditLogger {
    fn new(facade: DatabaseFacade) -> ExecResult<Self> {
        Ok(Self {
            exec: SerialExecutor::named("audit-logger")?,
            facade,
        })
    }

    /// Queues a message; the logger thread saves it through the facade.
    fn write_line(&self, message: &str) -> ExecResult<()> {
        let facade = self.facade.clone();
        let message = message.to_string();
        self.exec.post(move || {
            println!("   [logger] {message}");
            match facade.save(&message) {
                Ok(ack) => println!("   [logger] database ack: {ack}"),
                Err(e) => eprintln!("   [logger] save failed: {e}"),
            }
        })
    }

    fn close(&self) -> ExecResult<()> {
        self.exec.shutdown()
    }
}

fn main() -> ExecResult<()> {
    tracing_subscriber::fmt::init();

    println!("=== Serialized Facade Demo ===\n");

    // Step 1: Start the facade and the logger, one worker thread each
    println!("1. Starting database facade and audit logger...");
    let facade = DatabaseFacade::new()?;
    let logger = AuditLogger::new(facade.clone())?;
    println!("   ✓ Two executors running\n");

    // Step 2: Fire-and-forget logging; each message travels
    // logger thread -> facade thread without blocking the caller
    println!("2. Writing audit messages (fire-and-forget)...");
    logger.write_line("My message")?;
    logger.write_line("Another message")?;
    println!("   ✓ Messages queued\n");

    // Step 3: Save directly through the facade from several threads;
    // the facade serializes the commands into one order
    println!("3. Saving from multiple threads through the facade...");
    let workers: Vec<_> = (0..3)
        .map(|i| {
            let facade = facade.clone();
            thread::spawn(move || {
                let ack = facade
                    .save(&format!("command-{i}"))
                    .expect("Failed to save");
                println!("   Thread {i}: {ack}");
            })
        })
        .collect();
    for worker in workers {
        worker.join().expect("Worker thread panicked");
    }
    println!("   ✓ All commands acknowledged\n");

    // Step 4: A blocking save from the main thread
    println!("4. Saving one more command synchronously...");
    let ack = facade.save("Another string")?;
    println!("   ✓ The string is saved: {ack}\n");

    // Step 5: Clean shutdown; the logger drains first so its queued
    // messages can still reach the facade
    println!("5. Shutting down...");
    logger.close()?;
    facade.close()?;
    println!("   ✓ Both executors drained and stopped\n");

    println!("=== Demo Complete ===");
    Ok(())
}
