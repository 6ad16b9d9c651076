//! The background resource capability.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::error::ResourceError;

/// A long-lived handle that must eventually be shut down and whose termination can be polled
/// or awaited.
///
/// Shutdown is asynchronous with respect to the caller: `is_shutdown` may report true long
/// before `is_terminated` does. Implementations must make `shutdown` and `shutdown_now`
/// idempotent; a second call is a no-op.
pub trait BackgroundResource: Send + Sync {
    /// Initiate a graceful shutdown: no new work is accepted, in-flight work may finish.
    /// Never blocks.
    fn shutdown(&self) -> Result<(), ResourceError>;

    /// Initiate a forceful shutdown: in-flight work is cancelled. Never blocks.
    fn shutdown_now(&self) -> Result<(), ResourceError>;

    /// True once shutdown has been initiated, not necessarily completed.
    fn is_shutdown(&self) -> bool;

    /// True once all work has ceased and the resource is fully released.
    fn is_terminated(&self) -> bool;

    /// Block the calling thread until the resource terminates, `timeout` elapses, or `cancel`
    /// fires. Returns `Ok(true)` on termination, `Ok(false)` on timeout and
    /// [`ResourceError::Interrupted`] on cancellation.
    fn await_termination_with(
        &self,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> Result<bool, ResourceError>;

    /// [`await_termination_with`](BackgroundResource::await_termination_with) without an
    /// external cancellation source.
    fn await_termination(&self, timeout: Duration) -> Result<bool, ResourceError> {
        self.await_termination_with(timeout, &CancellationToken::new())
    }
}

/// Scoped-close helpers. Blanket-implemented for every [`BackgroundResource`], so `close`
/// always means `shutdown` and cannot be redefined by an implementor.
pub trait BackgroundResourceExt: BackgroundResource {
    /// Graceful shutdown; safe to call on every exit path.
    fn close(&self) -> Result<(), ResourceError> {
        self.shutdown()
    }

    /// Returns a guard that calls [`shutdown`](BackgroundResource::shutdown) when dropped.
    fn close_on_drop(&self) -> CloseGuard<'_, Self> {
        CloseGuard { resource: self }
    }
}

impl<R: BackgroundResource + ?Sized> BackgroundResourceExt for R {}

/// Drop guard returned by [`BackgroundResourceExt::close_on_drop`]. The shutdown result is
/// discarded: drop runs on unwinding paths too and must not panic.
pub struct CloseGuard<'a, R: BackgroundResource + ?Sized> {
    resource: &'a R,
}

impl<R: BackgroundResource + ?Sized> Drop for CloseGuard<'_, R> {
    fn drop(&mut self) {
        drop(self.resource.shutdown());
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[derive(Default)]
    struct Counting {
        shutdowns: AtomicUsize,
    }

    impl BackgroundResource for Counting {
        fn shutdown(&self) -> Result<(), ResourceError> {
            self.shutdowns.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn shutdown_now(&self) -> Result<(), ResourceError> {
            Ok(())
        }

        fn is_shutdown(&self) -> bool {
            self.shutdowns.load(Ordering::SeqCst) > 0
        }

        fn is_terminated(&self) -> bool {
            self.is_shutdown()
        }

        fn await_termination_with(
            &self,
            _timeout: Duration,
            cancel: &CancellationToken,
        ) -> Result<bool, ResourceError> {
            if cancel.is_cancelled() {
                return Err(ResourceError::Interrupted);
            }
            Ok(self.is_terminated())
        }
    }

    #[test]
    fn close_delegates_to_shutdown() {
        let resource = Counting::default();
        resource.close().unwrap();
        assert_eq!(resource.shutdowns.load(Ordering::SeqCst), 1);
        assert!(resource.is_shutdown());
    }

    #[test]
    fn close_guard_shuts_down_on_scope_exit() {
        let resource = Counting::default();
        {
            let _guard = resource.close_on_drop();
            assert!(!resource.is_shutdown());
        }
        assert_eq!(resource.shutdowns.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn await_termination_uses_a_fresh_token() {
        let resource = Counting::default();
        resource.shutdown().unwrap();
        assert!(resource.await_termination(Duration::from_millis(1)).unwrap());
    }
}
