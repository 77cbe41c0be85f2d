//! # Worker Pool
//!
//! A fixed set of named threads pulling boxed jobs from one channel.
//!
//! ```text
//! owner ── spawn(job) ──> [ channel ] ──> worker-0
//!                                    ├──> worker-1
//!                                    └──> worker-N
//! ```
//!
//! Jobs never touch storage directly; they hand results back through
//! [`crate::StagingSender`] or [`crate::HandoffStack`].

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender};
use parking_lot::{Condvar, Mutex};
use serde::Deserialize;

use crate::error::{TaskError, TaskResult};

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Worker pool configuration.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorkerPoolConfig {
    /// Number of worker threads.
    pub threads: usize,
    /// Thread names are `{name_prefix}-{n}`.
    pub name_prefix: String,
}

impl Default for WorkerPoolConfig {
    fn default() -> Self {
        Self {
            threads: 2,
            name_prefix: "strata-worker".to_string(),
        }
    }
}

impl WorkerPoolConfig {
    /// One worker per available core.
    #[must_use]
    pub fn production() -> Self {
        Self {
            threads: thread::available_parallelism().map_or(4, std::num::NonZeroUsize::get),
            ..Self::default()
        }
    }

    /// Parses and validates a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(source: &str) -> TaskResult<Self> {
        let config: Self =
            toml::from_str(source).map_err(|err| TaskError::ConfigParse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects a pool that could never run a job.
    pub fn validate(&self) -> TaskResult<()> {
        if self.threads == 0 {
            return Err(TaskError::InvalidConfig(
                "threads must be greater than zero".to_string(),
            ));
        }
        if self.name_prefix.is_empty() {
            return Err(TaskError::InvalidConfig(
                "name_prefix must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Count of jobs queued or running.
struct Pending {
    count: Mutex<usize>,
    idle: Condvar,
}

impl Pending {
    fn finish_one(&self) {
        let mut count = self.count.lock();
        *count -= 1;
        if *count == 0 {
            self.idle.notify_all();
        }
    }
}

/// Decrements the pending count even if the job unwinds.
struct JobGuard<'a>(&'a Pending);

impl Drop for JobGuard<'_> {
    fn drop(&mut self) {
        self.0.finish_one();
    }
}

/// Fixed-size pool of named worker threads.
///
/// Dropping the pool closes the job channel, lets queued jobs finish and
/// joins every thread.
pub struct WorkerPool {
    sender: Option<Sender<Job>>,
    workers: Vec<JoinHandle<()>>,
    pending: Arc<Pending>,
}

impl WorkerPool {
    /// Starts `config.threads` workers.
    pub fn new(config: WorkerPoolConfig) -> TaskResult<Self> {
        config.validate()?;

        let (sender, receiver) = crossbeam_channel::unbounded::<Job>();
        let pending = Arc::new(Pending {
            count: Mutex::new(0),
            idle: Condvar::new(),
        });

        let mut workers = Vec::with_capacity(config.threads);
        for n in 0..config.threads {
            let name = format!("{}-{n}", config.name_prefix);
            let receiver = receiver.clone();
            let pending = Arc::clone(&pending);
            let handle = thread::Builder::new()
                .name(name.clone())
                .spawn(move || Self::worker_loop(&receiver, &pending))
                .map_err(|err| TaskError::Spawn {
                    name,
                    reason: err.to_string(),
                })?;
            workers.push(handle);
        }

        tracing::info!(
            "Worker pool started: {} threads ({})",
            config.threads,
            config.name_prefix
        );

        Ok(Self {
            sender: Some(sender),
            workers,
            pending,
        })
    }

    fn worker_loop(receiver: &Receiver<Job>, pending: &Pending) {
        for job in receiver {
            let _guard = JobGuard(pending);
            job();
        }
    }

    /// Number of worker threads.
    #[must_use]
    pub fn threads(&self) -> usize {
        self.workers.len()
    }

    /// Queues a job.
    pub fn spawn<F>(&self, job: F) -> TaskResult<()>
    where
        F: FnOnce() + Send + 'static,
    {
        let sender = self.sender.as_ref().ok_or(TaskError::ShutDown)?;

        *self.pending.count.lock() += 1;
        if sender.send(Box::new(job)).is_err() {
            self.pending.finish_one();
            return Err(TaskError::ShutDown);
        }
        Ok(())
    }

    /// Number of jobs queued or running.
    #[must_use]
    pub fn pending(&self) -> usize {
        *self.pending.count.lock()
    }

    /// Blocks until every queued job has finished.
    pub fn wait_idle(&self) {
        let mut count = self.pending.count.lock();
        while *count > 0 {
            self.pending.idle.wait(&mut count);
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        drop(self.sender.take());

        let threads = self.workers.len();
        for worker in self.workers.drain(..) {
            if worker.join().is_err() {
                tracing::warn!("Worker thread panicked before shutdown");
            }
        }
        tracing::info!("Worker pool stopped: joined {} threads", threads);
    }
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("threads", &self.workers.len())
            .field("pending", &self.pending())
            .finish()
    }
}
