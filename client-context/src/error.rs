use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that abort [`ClientContext::create`](crate::ClientContext::create) or settings
/// construction. No partially built context is ever returned alongside one of these.
#[derive(Debug, Error)]
pub enum ContextError {
    /// A provider was used in a way its own declarations forbid, e.g. asking for a transport
    /// without an executor from a provider that needs one. Fatal; never retried.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A provider failed to produce its resource. Resource errors raised while building one
    /// (e.g. an executor runtime that cannot start) are carried here as the source.
    #[error("failed to resolve {component}: {source}")]
    Resolution {
        component: &'static str,
        #[source]
        source: BoxError,
    },
}

impl ContextError {
    pub fn resolution(component: &'static str, source: impl Into<BoxError>) -> Self {
        ContextError::Resolution {
            component,
            source: source.into(),
        }
    }
}
