//! Worker-pool runtime executing network tasks off the caller's thread

use std::future::Future;

use tokio::task::JoinHandle;
use tracing::debug;

use crate::error::{RuntimeError, RuntimeResult};

/// A fixed-size pool of worker threads cooperatively executing async tasks.
///
/// The runtime owns nothing about requests or connections; it only schedules
/// the tasks that drive them. It is created once and torn down exactly once
/// when the value drops. Dropping blocks until the workers have shut down:
/// tasks parked at an await point are cancelled and their resources
/// reclaimed, so teardown is never observable by a task still mid-flight.
///
/// Precondition (documented, not runtime-checked): a `NetRuntime` must
/// outlive every client or stream context constructed against it. Dropping
/// it earlier is a programming error on the embedder's side.
pub struct NetRuntime {
    runtime: tokio::runtime::Runtime,
}

impl NetRuntime {
    /// Build a runtime with `thread_count` worker threads, all starting idle.
    ///
    /// Fails with [`RuntimeError::InvalidConfig`] when `thread_count` is 0.
    pub fn new(thread_count: u32) -> RuntimeResult<Self> {
        if thread_count == 0 {
            return Err(RuntimeError::InvalidConfig(
                "thread_count must be greater than 0".to_string(),
            ));
        }

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(thread_count as usize)
            .enable_all()
            .build()
            .map_err(|e| RuntimeError::Build(e.to_string()))?;

        debug!(thread_count, "worker runtime started");
        Ok(Self { runtime })
    }

    /// Schedule a task on the pool. Returns immediately; never blocks the
    /// calling thread.
    pub fn spawn<F>(&self, future: F) -> JoinHandle<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        self.runtime.spawn(future)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::time::Duration;

    #[test]
    fn test_zero_threads_is_invalid_config() {
        let err = NetRuntime::new(0).expect_err("zero threads must be rejected");
        assert!(matches!(err, RuntimeError::InvalidConfig(_)));
    }

    #[test]
    fn test_spawned_task_runs_off_caller_thread() {
        let runtime = NetRuntime::new(2).expect("runtime");
        let (tx, rx) = mpsc::channel();
        let caller = std::thread::current().id();

        runtime.spawn(async move {
            let _ = tx.send(std::thread::current().id());
        });

        let worker = rx
            .recv_timeout(Duration::from_secs(5))
            .expect("task completed");
        assert_ne!(caller, worker);
    }

    #[test]
    fn test_teardown_cancels_parked_tasks() {
        let runtime = NetRuntime::new(1).expect("runtime");
        let (tx, rx) = mpsc::channel::<()>();

        runtime.spawn(async move {
            std::future::pending::<()>().await;
            let _ = tx.send(());
        });

        // Drop must not hang on the forever-parked task; cancellation drops
        // the sender instead of completing the send.
        drop(runtime);
        assert!(matches!(
            rx.recv_timeout(Duration::from_secs(5)),
            Err(mpsc::RecvTimeoutError::Disconnected)
        ));
    }
}
