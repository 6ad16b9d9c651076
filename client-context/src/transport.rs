//! Transport capabilities consumed by context assembly. Real transports live elsewhere; this
//! module only knows what a transport owns and how it is obtained.

use std::sync::Arc;

use background_resource::{BackgroundResource, ExecutorHandle};

use crate::error::ContextError;

pub trait Transport: Send + Sync {
    fn transport_name(&self) -> &str;

    /// Resources this transport owns, in shutdown order. A composite transport (say, a
    /// connection plus a channel pool) lists each part; a transport owning nothing returns an
    /// empty list.
    fn background_resources(&self) -> Vec<Arc<dyn BackgroundResource>>;
}

pub type TransportHandle = Arc<dyn Transport>;

/// Produces the transport for a client.
///
/// Exactly one of the two `get_transport*` forms is valid, as declared by
/// [`needs_executor`](TransportProvider::needs_executor). Calling the other one is a
/// configuration error.
pub trait TransportProvider: Send + Sync {
    fn needs_executor(&self) -> bool;

    /// True when the context must shut down the transport's background resources.
    fn should_auto_close(&self) -> bool;

    /// Valid only when `needs_executor()` is false.
    fn get_transport(&self) -> Result<TransportHandle, ContextError>;

    /// Valid only when `needs_executor()` is true.
    fn get_transport_with_executor(
        &self,
        executor: ExecutorHandle,
    ) -> Result<TransportHandle, ContextError>;

    fn transport_name(&self) -> &str;
}

/// Hands out a caller-supplied transport. The caller keeps ownership of its resources.
#[derive(Clone)]
pub struct FixedTransportProvider {
    transport: TransportHandle,
}

impl FixedTransportProvider {
    pub fn new(transport: TransportHandle) -> Self {
        Self { transport }
    }
}

impl TransportProvider for FixedTransportProvider {
    fn needs_executor(&self) -> bool {
        false
    }

    fn should_auto_close(&self) -> bool {
        false
    }

    fn get_transport(&self) -> Result<TransportHandle, ContextError> {
        Ok(self.transport.clone())
    }

    fn get_transport_with_executor(
        &self,
        _executor: ExecutorHandle,
    ) -> Result<TransportHandle, ContextError> {
        Err(ContextError::Configuration(format!(
            "transport '{}' is fixed and does not take an executor",
            self.transport.transport_name()
        )))
    }

    fn transport_name(&self) -> &str {
        self.transport.transport_name()
    }
}
