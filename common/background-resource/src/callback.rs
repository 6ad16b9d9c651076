//! One-shot resource backed by a closure.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::ResourceError;
use crate::resource::BackgroundResource;

type Callback = Box<dyn FnOnce() -> Result<(), ResourceError> + Send>;

/// A [`BackgroundResource`] whose shutdown is a single action, e.g. closing a connection.
///
/// The closure runs on the first `shutdown` or `shutdown_now`; later calls do nothing. The
/// resource counts as terminated once the closure has returned successfully. If it fails,
/// the error is returned to that first caller and the resource stays shut down but not
/// terminated.
pub struct CallbackResource {
    name: String,
    on_shutdown: Mutex<Option<Callback>>,
    shutdown: AtomicBool,
    terminated: AtomicBool,
}

impl CallbackResource {
    pub fn new<F>(name: impl Into<String>, on_shutdown: F) -> Self
    where
        F: FnOnce() -> Result<(), ResourceError> + Send + 'static,
    {
        Self {
            name: name.into(),
            on_shutdown: Mutex::new(Some(Box::new(on_shutdown))),
            shutdown: AtomicBool::new(false),
            terminated: AtomicBool::new(false),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn run_once(&self) -> Result<(), ResourceError> {
        if self.shutdown.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        let callback = self
            .on_shutdown
            .lock()
            .map_err(|_| ResourceError::ShutdownFailed {
                resource: self.name.clone(),
                reason: "shutdown callback lock poisoned".to_string(),
            })?
            .take();
        if let Some(callback) = callback {
            callback()?;
        }
        self.terminated.store(true, Ordering::SeqCst);
        debug!(resource = %self.name, "CallbackResource: terminated");
        Ok(())
    }
}

impl BackgroundResource for CallbackResource {
    fn shutdown(&self) -> Result<(), ResourceError> {
        self.run_once()
    }

    fn shutdown_now(&self) -> Result<(), ResourceError> {
        self.run_once()
    }

    fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }

    fn is_terminated(&self) -> bool {
        self.terminated.load(Ordering::SeqCst)
    }

    /// The callback runs synchronously, so there is never anything to wait for.
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
