//! Cancellation on SIGINT/SIGTERM
//!
//! The first signal flips the token; the running child is killed by
//! [`SystemRunner`](crate::core::exec::SystemRunner) and the pipeline stops at
//! the next stage boundary. A second signal exits immediately.

use crate::core::error::ShipResult;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

/// Shared cancellation flag
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
  cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
  pub fn new() -> Self {
    Self::default()
  }

  /// Request cancellation
  pub fn cancel(&self) {
    self.cancelled.store(true, Ordering::SeqCst);
  }

  /// Check if cancellation has been requested
  pub fn is_cancelled(&self) -> bool {
    self.cancelled.load(Ordering::SeqCst)
  }

  /// Install the process-wide signal handler feeding this token.
  ///
  /// Must be called at most once per process.
  pub fn install_signal_handler(&self) -> ShipResult<()> {
    let token = self.clone();
    let signals = Arc::new(AtomicU8::new(0));
    ctrlc::set_handler(move || {
      let count = signals.fetch_add(1, Ordering::SeqCst);
      if count == 0 {
        eprintln!("\n⚠️  Interrupt received, stopping after the current command...");
        token.cancel();
      } else {
        eprintln!("\nSecond interrupt, exiting immediately.");
        std::process::exit(crate::core::error::ExitCode::Cancelled.as_i32());
      }
    })?;
    Ok(())
  }
}
