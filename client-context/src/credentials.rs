//! Credentials resolution. Credentials carry no lifecycle: the context never shuts them down.

use std::fmt;
use std::sync::Arc;

use crate::error::ContextError;

/// Opaque credentials handed to the transport layer.
pub trait Credentials: Send + Sync + fmt::Debug {
    fn authentication_type(&self) -> &str;
}

pub trait CredentialsProvider: Send + Sync {
    /// `Ok(None)` means the client runs unauthenticated.
    fn get_credentials(&self) -> Result<Option<Arc<dyn Credentials>>, ContextError>;
}

#[derive(Clone, Debug)]
pub struct FixedCredentialsProvider {
    credentials: Arc<dyn Credentials>,
}

impl FixedCredentialsProvider {
    pub fn new(credentials: Arc<dyn Credentials>) -> Self {
        Self { credentials }
    }
}

impl CredentialsProvider for FixedCredentialsProvider {
    fn get_credentials(&self) -> Result<Option<Arc<dyn Credentials>>, ContextError> {
        Ok(Some(self.credentials.clone()))
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct NoCredentialsProvider;

impl CredentialsProvider for NoCredentialsProvider {
    fn get_credentials(&self) -> Result<Option<Arc<dyn Credentials>>, ContextError> {
        Ok(None)
    }
}
