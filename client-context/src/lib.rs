//! Client context assembly. A client is built from providers that either hand over a
//! resource the caller keeps (borrowed) or create one the client must close (owned). The
//! context resolves each provider once, records that ownership decision next to the handle,
//! and exposes everything it owns as a single [`BackgroundResource`].

mod clock;
mod context;
mod credentials;
mod error;
mod executor_provider;
mod settings;
mod transport;

pub use background_resource::{
    BackgroundResource, BackgroundResourceAggregation, BackgroundResourceExt, ExecutorHandle,
    ResourceError,
};
pub use clock::{ApiClock, CurrentMillisClock, NanoClock};
pub use context::{ClientContext, Ownership, Resolved};
pub use credentials::{
    Credentials, CredentialsProvider, FixedCredentialsProvider, NoCredentialsProvider,
};
pub use error::{BoxError, ContextError};
pub use executor_provider::{ExecutorProvider, FixedExecutorProvider, InstantiatingExecutorProvider};
pub use settings::{ClientSettings, ClientSettingsBuilder};
pub use transport::{FixedTransportProvider, Transport, TransportHandle, TransportProvider};
