use envconfig::Envconfig;

#[derive(Envconfig, Clone, Debug)]
pub struct ExecutorConfig {
    /// Worker threads backing each executor created from this config; zero is treated as one.
    #[envconfig(from = "EXECUTOR_WORKER_THREADS", default = "4")]
    pub worker_threads: usize,

    #[envconfig(from = "EXECUTOR_THREAD_NAME", default = "background-executor")]
    pub thread_name: String,
}

impl ExecutorConfig {
    pub fn init_with_defaults() -> Result<Self, envconfig::Error> {
        ExecutorConfig::init_from_env()
    }

    pub fn with_worker_threads(mut self, worker_threads: usize) -> Self {
        self.worker_threads = worker_threads;
        self
    }

    pub fn with_thread_name(mut self, thread_name: impl Into<String>) -> Self {
        self.thread_name = thread_name.into();
        self
    }
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            worker_threads: 4,
            thread_name: "background-executor".to_string(),
        }
    }
}
