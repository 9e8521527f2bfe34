use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::foundation::error::{BeatError, BeatResult, Stage};

/// Shared cancellation flag checked between frames, stages and encoder polls.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// A token that has not been cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation; every clone observes it.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// `true` once [`CancelToken::cancel`] has been called on any clone.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Fail with [`BeatError::Cancelled`] if cancellation was requested.
    pub fn check(&self, stage: Stage) -> BeatResult<()> {
        if self.is_cancelled() {
            return Err(BeatError::Cancelled(stage));
        }
        Ok(())
    }

    /// Cancel this token on Ctrl-C / SIGTERM.
    ///
    /// Only one process-wide handler can be installed.
    pub fn install_ctrlc_handler(&self) -> BeatResult<()> {
        let token = self.clone();
        ctrlc::set_handler(move || {
            tracing::warn!("interrupt received, cancelling generation");
            token.cancel();
        })
        .map_err(|e| BeatError::validation(format!("failed to install interrupt handler: {e}")))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/cancel.rs"]
mod tests;
