//! Where a client's executor comes from, and whether the client owns it.

use std::sync::Arc;

use background_resource::{ExecutorConfig, ExecutorHandle, ScheduledExecutor};
use tracing::debug;

use crate::error::ContextError;

pub trait ExecutorProvider: Send + Sync {
    /// True when the context built from this provider must shut the executor down.
    fn should_auto_close(&self) -> bool;

    fn get_executor(&self) -> Result<ExecutorHandle, ContextError>;
}

/// Creates a fresh [`ScheduledExecutor`] on every call. The context owns what it gets.
#[derive(Clone, Debug, Default)]
pub struct InstantiatingExecutorProvider {
    config: ExecutorConfig,
}

impl InstantiatingExecutorProvider {
    pub fn new(config: ExecutorConfig) -> Self {
        Self { config }
    }

    /// Reads `EXECUTOR_WORKER_THREADS` and `EXECUTOR_THREAD_NAME`.
    pub fn from_env() -> Result<Self, envconfig::Error> {
        Ok(Self::new(ExecutorConfig::init_with_defaults()?))
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }
}

impl ExecutorProvider for InstantiatingExecutorProvider {
    fn should_auto_close(&self) -> bool {
        true
    }

    fn get_executor(&self) -> Result<ExecutorHandle, ContextError> {
        let executor = ScheduledExecutor::new(&self.config)
            .map_err(|e| ContextError::resolution("executor", e))?;
        debug!(
            executor = %self.config.thread_name,
            "ExecutorProvider: instantiated executor"
        );
        Ok(Arc::new(executor))
    }
}

/// Hands out a caller-supplied executor. The caller keeps ownership.
#[derive(Clone)]
pub struct FixedExecutorProvider {
    executor: ExecutorHandle,
}

impl FixedExecutorProvider {
    pub fn new(executor: ExecutorHandle) -> Self {
        Self { executor }
    }
}

impl ExecutorProvider for FixedExecutorProvider {
    fn should_auto_close(&self) -> bool {
        false
    }

    fn get_executor(&self) -> Result<ExecutorHandle, ContextError> {
        Ok(self.executor.clone())
    }
}

#[cfg(test)]
mod tests {
    use background_resource::BackgroundResource;

    use super::*;

    #[test]
    fn instantiating_provider_creates_a_new_owned_executor_each_call() {
        let provider = InstantiatingExecutorProvider::new(
            ExecutorConfig::default()
                .with_worker_threads(1)
                .with_thread_name("provider-test"),
        );
        assert!(provider.should_auto_close());

        let first = provider.get_executor().unwrap();
        let second = provider.get_executor().unwrap();
        assert!(!Arc::ptr_eq(&first, &second));

        first.shutdown().unwrap();
        assert!(first.is_shutdown());
        assert!(!second.is_shutdown());
    }

    #[test]
    fn from_env_uses_envconfig_defaults() {
        let provider = InstantiatingExecutorProvider::from_env().unwrap();
        assert_eq!(provider.config().worker_threads, 4);
        assert_eq!(provider.config().thread_name, "background-executor");
        assert!(provider.should_auto_close());
    }

    #[test]
    fn fixed_provider_returns_the_same_borrowed_executor() {
        let executor: ExecutorHandle = Arc::new(
            ScheduledExecutor::new(&ExecutorConfig::default().with_worker_threads(1)).unwrap(),
        );
        let provider = FixedExecutorProvider::new(executor.clone());

        assert!(!provider.should_auto_close());
        assert!(Arc::ptr_eq(&provider.get_executor().unwrap(), &executor));
    }
}
