//! Client context assembly: resolve every resource from its provider, decide once which of
//! them this context owns, and expose the owned ones as a single background resource.

use std::sync::Arc;
use std::time::Duration;

use background_resource::{
    BackgroundResource, BackgroundResourceAggregation, ExecutorHandle, ExecutorResource,
    ResourceError,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::clock::ApiClock;
use crate::credentials::Credentials;
use crate::error::ContextError;
use crate::settings::ClientSettings;
use crate::transport::{TransportHandle, TransportProvider};

/// Who is responsible for shutting a resolved resource down.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Ownership {
    /// Created for this context; the context must shut it down.
    Owned,
    /// Supplied by the caller, who keeps responsibility for it.
    Borrowed,
}

impl Ownership {
    pub fn from_auto_close(should_auto_close: bool) -> Self {
        if should_auto_close {
            Ownership::Owned
        } else {
            Ownership::Borrowed
        }
    }

    pub fn is_owned(self) -> bool {
        self == Ownership::Owned
    }
}

/// A resolved handle together with the ownership decided for it at assembly time.
#[derive(Clone)]
pub struct Resolved<T> {
    handle: T,
    ownership: Ownership,
}

impl<T> Resolved<T> {
    pub fn new(handle: T, ownership: Ownership) -> Self {
        Self { handle, ownership }
    }

    pub fn handle(&self) -> &T {
        &self.handle
    }

    pub fn ownership(&self) -> Ownership {
        self.ownership
    }
}

/// Everything a client needs at runtime, plus the one shutdown handle covering what it owns.
///
/// The closable set is the executor (if owned) followed by the transport's background
/// resources (if owned). Shutting the context down never touches borrowed resources, so those
/// may be shared between contexts; owned ones must not be.
pub struct ClientContext {
    executor: Resolved<ExecutorHandle>,
    transport: Resolved<TransportHandle>,
    credentials: Option<Arc<dyn Credentials>>,
    clock: Arc<dyn ApiClock>,
    background: BackgroundResourceAggregation,
}

impl ClientContext {
    /// Resolve every provider in `settings` and assemble the context.
    ///
    /// On failure nothing is returned. Resources this call already resolved and owns are
    /// shut down on a best-effort basis before the original error is returned; cleanup
    /// failures are only logged.
    pub fn create(settings: &ClientSettings) -> Result<Self, ContextError> {
        let executor_provider = settings.executor_provider();
        let executor = Resolved::new(
            executor_provider.get_executor()?,
            Ownership::from_auto_close(executor_provider.should_auto_close()),
        );

        let mut closable: Vec<Arc<dyn BackgroundResource>> = Vec::new();
        if executor.ownership().is_owned() {
            closable.push(Arc::new(ExecutorResource::new(executor.handle().clone())));
        }

        let transport_provider = settings.transport_provider();
        let transport = match resolve_transport(transport_provider, executor.handle()) {
            Ok(handle) => Resolved::new(
                handle,
                Ownership::from_auto_close(transport_provider.should_auto_close()),
            ),
            Err(e) => {
                abandon(&closable, &e);
                return Err(e);
            }
        };

        if transport.ownership().is_owned() {
            closable.extend(transport.handle().background_resources());
        }

        let credentials = match settings.credentials_provider().get_credentials() {
            Ok(credentials) => credentials,
            Err(e) => {
                abandon(&closable, &e);
                return Err(e);
            }
        };

        info!(
            transport = %transport.handle().transport_name(),
            executor_ownership = ?executor.ownership(),
            transport_ownership = ?transport.ownership(),
            closable = closable.len(),
            authenticated = credentials.is_some(),
            "ClientContext: created"
        );

        Ok(Self {
            executor,
            transport,
            credentials,
            clock: settings.clock().clone(),
            background: BackgroundResourceAggregation::new(closable),
        })
    }

    pub fn executor(&self) -> &ExecutorHandle {
        self.executor.handle()
    }

    pub fn executor_ownership(&self) -> Ownership {
        self.executor.ownership()
    }

    pub fn transport(&self) -> &TransportHandle {
        self.transport.handle()
    }

    pub fn transport_ownership(&self) -> Ownership {
        self.transport.ownership()
    }

    pub fn credentials(&self) -> Option<&Arc<dyn Credentials>> {
        self.credentials.as_ref()
    }

    pub fn clock(&self) -> &Arc<dyn ApiClock> {
        &self.clock
    }

    /// The resources this context shuts down, in shutdown order.
    pub fn background_resources(&self) -> &[Arc<dyn BackgroundResource>] {
        self.background.resources()
    }

    /// The context's single shutdown handle.
    pub fn background_resource(&self) -> &BackgroundResourceAggregation {
        &self.background
    }
}

impl BackgroundResource for ClientContext {
    fn shutdown(&self) -> Result<(), ResourceError> {
        self.background.shutdown()
    }

    fn shutdown_now(&self) -> Result<(), ResourceError> {
        self.background.shutdown_now()
    }

    fn is_shutdown(&self) -> bool {
        self.background.is_shutdown()
    }

    fn is_terminated(&self) -> bool {
        self.background.is_terminated()
    }

    fn await_termination_with(
        &self,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> Result<bool, ResourceError> {
        self.background.await_termination_with(timeout, cancel)
    }
}

fn resolve_transport(
    provider: &dyn TransportProvider,
    executor: &ExecutorHandle,
) -> Result<TransportHandle, ContextError> {
    if provider.needs_executor() {
        debug!(
            transport = %provider.transport_name(),
            "ClientContext: resolving transport with executor"
        );
        provider.get_transport_with_executor(executor.clone())
    } else {
        debug!(
            transport = %provider.transport_name(),
            "ClientContext: resolving transport"
        );
        provider.get_transport()
    }
}

/// Best-effort shutdown of owned resources after assembly failed.
fn abandon(resources: &[Arc<dyn BackgroundResource>], cause: &ContextError) {
    if resources.is_empty() {
        return;
    }
    warn!(
        resources = resources.len(),
        error = %cause,
        "ClientContext: assembly failed, shutting down owned resources"
    );
    for (index, resource) in resources.iter().enumerate() {
        if let Err(e) = resource.shutdown() {
            warn!(
                member = index,
                error = %e,
                "ClientContext: cleanup shutdown failed"
            );
        }
    }
}
