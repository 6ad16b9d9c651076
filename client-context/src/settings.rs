use std::sync::Arc;

use crate::clock::{ApiClock, NanoClock};
use crate::credentials::{CredentialsProvider, NoCredentialsProvider};
use crate::error::ContextError;
use crate::executor_provider::{ExecutorProvider, InstantiatingExecutorProvider};
use crate::transport::TransportProvider;

/// Providers a [`ClientContext`](crate::ClientContext) is assembled from.
pub struct ClientSettings {
    executor_provider: Arc<dyn ExecutorProvider>,
    transport_provider: Arc<dyn TransportProvider>,
    credentials_provider: Arc<dyn CredentialsProvider>,
    clock: Arc<dyn ApiClock>,
}

impl ClientSettings {
    pub fn builder() -> ClientSettingsBuilder {
        ClientSettingsBuilder::default()
    }

    pub fn executor_provider(&self) -> &dyn ExecutorProvider {
        self.executor_provider.as_ref()
    }

    pub fn transport_provider(&self) -> &dyn TransportProvider {
        self.transport_provider.as_ref()
    }

    pub fn credentials_provider(&self) -> &dyn CredentialsProvider {
        self.credentials_provider.as_ref()
    }

    pub fn clock(&self) -> &Arc<dyn ApiClock> {
        &self.clock
    }
}

/// Builder for [`ClientSettings`]. Only the transport provider is mandatory; everything else
/// defaults to an owned [`InstantiatingExecutorProvider`], no credentials and a [`NanoClock`].
#[derive(Default)]
pub struct ClientSettingsBuilder {
    executor_provider: Option<Arc<dyn ExecutorProvider>>,
    transport_provider: Option<Arc<dyn TransportProvider>>,
    credentials_provider: Option<Arc<dyn CredentialsProvider>>,
    clock: Option<Arc<dyn ApiClock>>,
}

impl ClientSettingsBuilder {
    pub fn with_executor_provider(mut self, provider: Arc<dyn ExecutorProvider>) -> Self {
        self.executor_provider = Some(provider);
        self
    }

    pub fn with_transport_provider(mut self, provider: Arc<dyn TransportProvider>) -> Self {
        self.transport_provider = Some(provider);
        self
    }

    pub fn with_credentials_provider(mut self, provider: Arc<dyn CredentialsProvider>) -> Self {
        self.credentials_provider = Some(provider);
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn ApiClock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn build(self) -> Result<ClientSettings, ContextError> {
        let transport_provider = self.transport_provider.ok_or_else(|| {
            ContextError::Configuration("no transport provider configured".to_string())
        })?;

        Ok(ClientSettings {
            executor_provider: self
                .executor_provider
                .unwrap_or_else(|| Arc::new(InstantiatingExecutorProvider::default())),
            transport_provider,
            credentials_provider: self
                .credentials_provider
                .unwrap_or_else(|| Arc::new(NoCredentialsProvider)),
            clock: self.clock.unwrap_or_else(|| Arc::new(NanoClock)),
        })
    }
}
