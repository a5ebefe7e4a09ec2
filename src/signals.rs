//! Interrupt/signal handling for graceful shutdown
//!
//! Ctrl+C flips a process-wide flag and cancels the token of the running script, so the
//! orchestrator can release retained responses before reporting the interruption.

use std::sync::atomic::{AtomicBool, Ordering};

use tokio_util::sync::CancellationToken;

/// Global flag for Ctrl+C interrupt handling
static INTERRUPTED: AtomicBool = AtomicBool::new(false);

/// Check if the application was interrupted (Ctrl+C pressed)
#[inline]
pub fn was_interrupted() -> bool {
    INTERRUPTED.load(Ordering::SeqCst)
}

/// Set the interrupted flag (called from signal handler)
#[inline]
pub fn set_interrupted() {
    INTERRUPTED.store(true, Ordering::SeqCst);
}

/// Reset the interrupted flag
#[inline]
pub fn reset_interrupted() {
    INTERRUPTED.store(false, Ordering::SeqCst);
}

/// Install the Ctrl+C handler.
///
/// The first interrupt cancels `token`; the second one exits immediately with status 130.
pub fn install_handler(token: CancellationToken) {
    let result = ctrlc::set_handler(move || {
        if INTERRUPTED.swap(true, Ordering::SeqCst) {
            std::process::exit(crate::status::ExitStatus::Interrupted as i32);
        }
        eprintln!("\nInterrupted");
        token.cancel();
    });

    if let Err(e) = result {
        tracing::warn!(error = %e, "Failed to install Ctrl+C handler");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interrupt_flag() {
        reset_interrupted();
        assert!(!was_interrupted());

        set_interrupted();
        assert!(was_interrupted());

        reset_interrupted();
        assert!(!was_interrupted());
    }
}
