//! Errors surfaced by background resources.

use thiserror::Error;

/// Errors returned by [`BackgroundResource`](crate::BackgroundResource) operations.
///
/// A timed-out wait is not an error: `await_termination` reports it as `Ok(false)`.
#[derive(Debug, Error)]
pub enum ResourceError {
    /// The thread waiting for termination was cancelled before the wait resolved.
    #[error("wait for termination was interrupted")]
    Interrupted,

    /// Work was submitted to an executor that has already been shut down.
    #[error("executor '{0}' is shut down and rejected the task")]
    Rejected(String),

    /// A blocking wait was attempted from inside an async runtime.
    #[error("cannot block on termination from within an async runtime")]
    BlockingInRuntime,

    /// A resource failed while being told to shut down.
    #[error("resource '{resource}' failed to shut down: {reason}")]
    ShutdownFailed { resource: String, reason: String },

    /// The resource could not be started.
    #[error("failed to start resource: {0}")]
    Io(#[from] std::io::Error),
}
