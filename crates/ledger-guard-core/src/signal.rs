use crate::error::{GuardError, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cooperative stop flag shared between the lifecycle run and whoever
/// handles operator shutdown. Long scans poll it; nothing is preempted.
#[derive(Debug, Clone, Default)]
pub struct StopSignal {
    stopped: Arc<AtomicBool>,
}

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    /// `Err(VerificationStopped)` once `stop` has been called.
    pub fn check(&self) -> Result<()> {
        if self.is_stopped() {
            return Err(GuardError::VerificationStopped);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_flag() {
        let signal = StopSignal::new();
        let remote = signal.clone();
        assert!(signal.check().is_ok());

        remote.stop();
        assert!(signal.is_stopped());
        assert!(matches!(signal.check(), Err(GuardError::VerificationStopped)));
    }

    #[test]
    fn stop_from_another_thread_is_visible() {
        let signal = StopSignal::new();
        let remote = signal.clone();
        std::thread::spawn(move || remote.stop()).join().unwrap();
        assert!(signal.is_stopped());
    }
}
