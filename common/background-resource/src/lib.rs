//! Shutdownable background resources: a uniform capability for executors, transports and any
//! other long-lived handle that must eventually be shut down, plus an aggregation that presents
//! an ordered set of them as a single resource. A tokio-backed executor is included so clients
//! have something to own by default.

mod aggregation;
mod callback;
mod config;
mod error;
mod executor;
mod resource;

pub use aggregation::BackgroundResourceAggregation;
pub use callback::CallbackResource;
pub use config::ExecutorConfig;
pub use error::ResourceError;
pub use executor::{Executor, ExecutorHandle, ExecutorResource, ScheduledExecutor};
pub use resource::{BackgroundResource, BackgroundResourceExt, CloseGuard};
