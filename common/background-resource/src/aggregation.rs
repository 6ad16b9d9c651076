//! Treats an ordered collection of background resources as a single background resource.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::ResourceError;
use crate::resource::BackgroundResource;

/// Composite [`BackgroundResource`] that forwards every operation to its members in the order
/// they were given at construction.
///
/// - `shutdown` / `shutdown_now` are forwarded to each member in turn. A member error is
///   returned as-is; members before it have already been told to shut down and members after
///   it are not called.
/// - `is_shutdown` / `is_terminated` are a left-to-right logical AND that stops at the first
///   member reporting false.
/// - `await_termination_with` gives every member the full timeout, so the total wait can be
///   up to N times the requested bound. Use
///   [`await_termination_within`](BackgroundResourceAggregation::await_termination_within)
///   for a shared deadline.
///
/// The aggregation never creates or frees its members, and the member list cannot change
/// after construction. There is no internal locking: concurrent shutdown calls are forwarded
/// concurrently and rely on each member's own idempotence.
#[derive(Clone, Default)]
pub struct BackgroundResourceAggregation {
    resources: Vec<Arc<dyn BackgroundResource>>,
}

impl BackgroundResourceAggregation {
    /// Wrap `resources` as given: no deduplication, no reordering.
    pub fn new(resources: Vec<Arc<dyn BackgroundResource>>) -> Self {
        Self { resources }
    }

    /// Members in forwarding order.
    pub fn resources(&self) -> &[Arc<dyn BackgroundResource>] {
        &self.resources
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Wait for every member to terminate within one shared deadline of `timeout` from now.
    /// Each member only receives what is left of the budget; once it is spent, the remaining
    /// members are polled with `is_terminated` instead of being awaited.
    ///
    /// A timeout too large to form a deadline (e.g. `Duration::MAX`) is unbounded, and every
    /// member is awaited with the full `timeout` as in `await_termination_with`.
    pub fn await_termination_within(
        &self,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> Result<bool, ResourceError> {
        let Some(deadline) = Instant::now().checked_add(timeout) else {
            return self.await_termination_with(timeout, cancel);
        };
        for (index, resource) in self.resources.iter().enumerate() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            let terminated = if remaining.is_zero() {
                resource.is_terminated()
            } else {
                resource.await_termination_with(remaining, cancel)?
            };
            if !terminated {
                debug!(
                    member = index,
                    timeout_secs = timeout.as_secs_f64(),
                    "Aggregation: member not terminated before shared deadline"
                );
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn forward(
        &self,
        operation: &'static str,
        call: impl Fn(&dyn BackgroundResource) -> Result<(), ResourceError>,
    ) -> Result<(), ResourceError> {
        for (index, resource) in self.resources.iter().enumerate() {
            if let Err(e) = call(resource.as_ref()) {
                warn!(
                    member = index,
                    members = self.resources.len(),
                    operation,
                    error = %e,
                    "Aggregation: member failed, later members were not called"
                );
                return Err(e);
            }
        }
        debug!(
            members = self.resources.len(),
            operation, "Aggregation: forwarded to all members"
        );
        Ok(())
    }
}

impl BackgroundResource for BackgroundResourceAggregation {
    fn shutdown(&self) -> Result<(), ResourceError> {
        self.forward("shutdown", |r| r.shutdown())
    }

    fn shutdown_now(&self) -> Result<(), ResourceError> {
        self.forward("shutdown_now", |r| r.shutdown_now())
    }

    fn is_shutdown(&self) -> bool {
        self.resources.iter().all(|r| r.is_shutdown())
    }

    fn is_terminated(&self) -> bool {
        self.resources.iter().all(|r| r.is_terminated())
    }

    fn await_termination_with(
        &self,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> Result<bool, ResourceError> {
        for resource in &self.resources {
            // Every member gets the full budget; time spent on earlier members is not deducted.
            if !resource.await_termination_with(timeout, cancel)? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}
