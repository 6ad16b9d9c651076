//! Executor capability and the tokio-backed implementation clients own by default.

use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use futures::future::BoxFuture;
use tokio::runtime::{Builder, Handle, Runtime};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, info};

use crate::config::ExecutorConfig;
use crate::error::ResourceError;
use crate::resource::BackgroundResource;

/// Something that runs tasks now or after a delay and can be shut down.
pub trait Executor: BackgroundResource {
    /// Run `task` as soon as possible. Fails with [`ResourceError::Rejected`] after shutdown.
    fn execute(&self, task: BoxFuture<'static, ()>) -> Result<(), ResourceError>;

    /// Run `task` once `delay` has elapsed. Fails with [`ResourceError::Rejected`] after
    /// shutdown; tasks scheduled before a graceful shutdown still run.
    fn schedule(&self, delay: Duration, task: BoxFuture<'static, ()>) -> Result<(), ResourceError>;
}

pub type ExecutorHandle = Arc<dyn Executor>;

/// Presents an [`ExecutorHandle`] as a plain [`BackgroundResource`] so it can sit in an
/// aggregation next to transport resources.
#[derive(Clone)]
pub struct ExecutorResource {
    executor: ExecutorHandle,
}

impl ExecutorResource {
    pub fn new(executor: ExecutorHandle) -> Self {
        Self { executor }
    }

    pub fn executor(&self) -> &ExecutorHandle {
        &self.executor
    }
}

impl BackgroundResource for ExecutorResource {
    fn shutdown(&self) -> Result<(), ResourceError> {
        self.executor.shutdown()
    }

    fn shutdown_now(&self) -> Result<(), ResourceError> {
        self.executor.shutdown_now()
    }

    fn is_shutdown(&self) -> bool {
        self.executor.is_shutdown()
    }

    fn is_terminated(&self) -> bool {
        self.executor.is_terminated()
    }

    fn await_termination_with(
        &self,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> Result<bool, ResourceError> {
        self.executor.await_termination_with(timeout, cancel)
    }
}

/// Multi-threaded tokio runtime exposed as an [`Executor`].
///
/// Every task is tracked, so termination means "shut down and no task left running".
/// Graceful shutdown stops accepting tasks and lets tracked ones (including delayed ones)
/// finish; forceful shutdown additionally cancels them at their next await point.
///
/// Admission and shutdown are serialized: once `is_shutdown` reports true, no further task is
/// accepted, so a terminated executor stays terminated.
///
/// Waiting for termination blocks the calling thread and is refused from inside an async
/// runtime. The runtime itself is released in the background when the executor is dropped.
pub struct ScheduledExecutor {
    name: String,
    runtime: Option<Runtime>,
    handle: Handle,
    tracker: TaskTracker,
    cancel: CancellationToken,
    admission: RwLock<()>,
}

impl ScheduledExecutor {
    pub fn new(config: &ExecutorConfig) -> Result<Self, ResourceError> {
        let runtime = Builder::new_multi_thread()
            .worker_threads(config.worker_threads.max(1))
            .thread_name(config.thread_name.clone())
            .enable_all()
            .build()?;
        let handle = runtime.handle().clone();

        debug!(
            executor = %config.thread_name,
            worker_threads = config.worker_threads.max(1),
            "Executor: started"
        );

        Ok(Self {
            name: config.thread_name.clone(),
            runtime: Some(runtime),
            handle,
            tracker: TaskTracker::new(),
            cancel: CancellationToken::new(),
            admission: RwLock::new(()),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Runtime handle, for collaborators that need to spawn their own I/O on this executor.
    pub fn runtime_handle(&self) -> &Handle {
        &self.handle
    }

    /// Number of tasks that have been submitted and have not finished yet.
    pub fn pending(&self) -> usize {
        self.tracker.len()
    }

    /// Stop accepting tasks. Returns true for the call that actually closed the tracker.
    fn close_admission(&self) -> bool {
        let _exclusive = self.admission.write().unwrap_or_else(PoisonError::into_inner);
        self.tracker.close()
    }

    fn submit(
        &self,
        delay: Option<Duration>,
        task: BoxFuture<'static, ()>,
    ) -> Result<(), ResourceError> {
        let _admitted = self.admission.read().unwrap_or_else(PoisonError::into_inner);
        if self.tracker.is_closed() {
            return Err(ResourceError::Rejected(self.name.clone()));
        }
        let cancel = self.cancel.clone();
        let work = async move {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            task.await;
        };
        drop(self.tracker.spawn_on(
            async move {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => {}
                    _ = work => {}
                }
            },
            &self.handle,
        ));
        Ok(())
    }
}

impl Executor for ScheduledExecutor {
    fn execute(&self, task: BoxFuture<'static, ()>) -> Result<(), ResourceError> {
        self.submit(None, task)
    }

    fn schedule(&self, delay: Duration, task: BoxFuture<'static, ()>) -> Result<(), ResourceError> {
        self.submit(Some(delay), task)
    }
}

impl BackgroundResource for ScheduledExecutor {
    fn shutdown(&self) -> Result<(), ResourceError> {
        if self.close_admission() {
            info!(
                executor = %self.name,
                pending = self.tracker.len(),
                "Executor: shutdown initiated"
            );
        }
        Ok(())
    }

    fn shutdown_now(&self) -> Result<(), ResourceError> {
        self.close_admission();
        if !self.cancel.is_cancelled() {
            self.cancel.cancel();
            info!(
                executor = %self.name,
                cancelled = self.tracker.len(),
                "Executor: forceful shutdown initiated"
            );
        }
        Ok(())
    }

    fn is_shutdown(&self) -> bool {
        self.tracker.is_closed()
    }

    fn is_terminated(&self) -> bool {
        self.tracker.is_closed() && self.tracker.is_empty()
    }

    fn await_termination_with(
        &self,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> Result<bool, ResourceError> {
        if self.is_terminated() {
            return Ok(true);
        }
        if cancel.is_cancelled() {
            return Err(ResourceError::Interrupted);
        }
        if Handle::try_current().is_ok() {
            return Err(ResourceError::BlockingInRuntime);
        }

        let tracker = self.tracker.clone();
        let cancel = cancel.clone();
        self.handle.block_on(async move {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => Err(ResourceError::Interrupted),
                waited = tokio::time::timeout(timeout, tracker.wait()) => Ok(waited.is_ok()),
            }
        })
    }
}

impl Drop for ScheduledExecutor {
    fn drop(&mut self) {
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;

    use futures::FutureExt;

    use super::*;

    fn executor() -> ScheduledExecutor {
        ScheduledExecutor::new(
            &ExecutorConfig::default()
                .with_worker_threads(1)
                .with_thread_name("executor-test"),
        )
        .unwrap()
    }

    #[test]
    fn graceful_shutdown_lets_running_work_finish() {
        let executor = executor();
        let (release_tx, release_rx) = tokio::sync::oneshot::channel::<()>();
        let (done_tx, done_rx) = mpsc::channel();

        executor
            .execute(
                async move {
                    release_rx.await.ok();
                    done_tx.send(()).ok();
                }
                .boxed(),
            )
            .unwrap();

        executor.shutdown().unwrap();
        assert!(executor.is_shutdown());
        assert!(!executor.is_terminated());
        assert!(!executor.await_termination(Duration::from_millis(50)).unwrap());

        release_tx.send(()).unwrap();
        assert!(executor.await_termination(Duration::from_secs(5)).unwrap());
        assert!(executor.is_terminated());
        done_rx.recv_timeout(Duration::from_secs(1)).unwrap();
    }

    #[test]
    fn shutdown_now_cancels_running_work() {
        let executor = executor();
        executor
            .execute(futures::future::pending::<()>().boxed())
            .unwrap();
        assert_eq!(executor.pending(), 1);

        executor.shutdown_now().unwrap();
        assert!(executor.await_termination(Duration::from_secs(5)).unwrap());
        assert_eq!(executor.pending(), 0);
    }

    #[test]
    fn rejects_work_after_shutdown() {
        let executor = executor();
        executor.shutdown().unwrap();
        executor.shutdown().unwrap();

        let result = executor.execute(async {}.boxed());
        assert!(matches!(result, Err(ResourceError::Rejected(name)) if name == "executor-test"));
        assert!(executor.is_terminated());
    }

    #[test]
    fn scheduled_work_runs_after_delay() {
        let executor = executor();
        let (done_tx, done_rx) = mpsc::channel();
        executor
            .schedule(
                Duration::from_millis(20),
                async move {
                    done_tx.send(()).ok();
                }
                .boxed(),
            )
            .unwrap();

        done_rx.recv_timeout(Duration::from_secs(5)).unwrap();
        executor.shutdown().unwrap();
        assert!(executor.await_termination(Duration::from_secs(5)).unwrap());
    }

    #[test]
    fn cancelled_wait_is_interrupted_not_timed_out() {
        let executor = executor();
        executor
            .execute(futures::future::pending::<()>().boxed())
            .unwrap();
        executor.shutdown().unwrap();

        let cancel = CancellationToken::new();
        cancel.cancel();
        let result = executor.await_termination_with(Duration::from_secs(5), &cancel);
        assert!(matches!(result, Err(ResourceError::Interrupted)));

        executor.shutdown_now().unwrap();
    }

    #[tokio::test]
    async fn refuses_to_block_inside_a_runtime() {
        let executor = executor();
        executor
            .execute(futures::future::pending::<()>().boxed())
            .unwrap();
        executor.shutdown().unwrap();

        let result = executor.await_termination(Duration::from_millis(10));
        assert!(matches!(result, Err(ResourceError::BlockingInRuntime)));
    }

    #[test]
    fn zero_worker_threads_still_runs_work() {
        let executor =
            ScheduledExecutor::new(&ExecutorConfig::default().with_worker_threads(0)).unwrap();
        let (done_tx, done_rx) = mpsc::channel();
        executor
            .execute(
                async move {
                    done_tx.send(()).ok();
                }
                .boxed(),
            )
            .unwrap();

        done_rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(executor.runtime_handle().metrics().num_workers(), 1);
        executor.shutdown().unwrap();
        assert!(executor.await_termination(Duration::from_secs(5)).unwrap());
    }

    #[test]
    fn nothing_is_admitted_once_shutdown_is_visible() {
        let executor = Arc::new(executor());
        let submitters: Vec<_> = (0..4)
            .map(|_| {
                let executor = executor.clone();
                std::thread::spawn(move || {
                    let mut late = 0;
                    loop {
                        let already_shut_down = executor.is_shutdown();
                        match executor.execute(async {}.boxed()) {
                            Ok(()) if already_shut_down => late += 1,
                            Ok(()) => {}
                            Err(_) => return late,
                        }
                    }
                })
            })
            .collect();

        std::thread::sleep(Duration::from_millis(20));
        executor.shutdown().unwrap();
        for submitter in submitters {
            assert_eq!(submitter.join().unwrap(), 0);
        }

        assert!(executor.await_termination(Duration::from_secs(5)).unwrap());
        assert!(executor.execute(async {}.boxed()).is_err());
        assert!(executor.is_terminated());
    }

    #[test]
    fn executor_resource_forwards_to_executor() {
        let handle: ExecutorHandle = Arc::new(executor());
        let resource = ExecutorResource::new(handle.clone());

        resource.shutdown().unwrap();
        assert!(handle.is_shutdown());
        assert!(resource.is_terminated());
        assert!(resource.await_termination(Duration::from_secs(1)).unwrap());
    }
}
