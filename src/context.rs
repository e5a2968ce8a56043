// ABOUTME: Caller-supplied operation context checked before every store call
// ABOUTME: Carries an optional deadline and a cooperative cancel flag

use crate::error::{Result, SyncError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Deadline and cancellation for one `save` or `restore` run
///
/// The engine never layers its own timeouts; it only refuses to start a
/// store call once this context has expired. Clones share the cancel flag.
#[derive(Debug, Clone, Default)]
pub struct OperationContext {
    deadline: Option<Instant>,
    cancelled: Arc<AtomicBool>,
}

impl OperationContext {
    /// A context that never expires unless cancelled
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }

    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            deadline: Some(deadline),
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_expired(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
            || self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// Fail with `ContextExpired` if the context has expired
    pub fn check(&self, during: impl FnOnce() -> String) -> Result<()> {
        if self.is_expired() {
            return Err(SyncError::ContextExpired { during: during() });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_context_not_expired() {
        let ctx = OperationContext::new();
        assert!(!ctx.is_expired());
        assert!(ctx.check(|| "listing tables".to_string()).is_ok());
    }

    #[test]
    fn test_cancel_is_shared_by_clones() {
        let ctx = OperationContext::new();
        let clone = ctx.clone();
        clone.cancel();

        let err = ctx.check(|| "listing tables".to_string()).unwrap_err();
        assert!(matches!(err, SyncError::ContextExpired { .. }));
        assert!(err.to_string().contains("listing tables"));
    }

    #[test]
    fn test_past_deadline_expired() {
        let ctx = OperationContext::with_timeout(Duration::ZERO);
        assert!(ctx.is_expired());
        assert!(ctx.deadline().is_some());
    }

    #[test]
    fn test_future_deadline_not_expired() {
        let ctx = OperationContext::with_timeout(Duration::from_secs(3600));
        assert!(!ctx.is_expired());
    }
}
