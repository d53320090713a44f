//! Background task registry for fire-and-forget cache writes.
//!
//! [`TaskRegistry::schedule`] spawns a tracked task and returns at once. The
//! task removes its own handle from the registry when it finishes, whatever
//! the result. [`TaskRegistry::drain_all`] awaits whatever is still pending
//! and reports one [`TaskOutcome`] per task, so shutdown never drops a write
//! on the floor.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::Error;

/// Identifier handed out by [`TaskRegistry::schedule`].
pub type TaskId = u64;

/// How a drained task finished.
#[derive(Debug)]
pub enum TaskOutcome {
    /// The operation returned `Ok`.
    Completed { id: TaskId },
    /// The operation returned an error, or panicked.
    Failed { id: TaskId, error: Error },
}

impl TaskOutcome {
    /// Task id this outcome belongs to.
    pub fn id(&self) -> TaskId {
        match self {
            TaskOutcome::Completed { id } | TaskOutcome::Failed { id, .. } => *id,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, TaskOutcome::Failed { .. })
    }
}

#[derive(Debug, Default)]
struct Inner {
    next_id: AtomicU64,
    pending: Mutex<HashMap<TaskId, JoinHandle<Result<(), Error>>>>,
}

impl Inner {
    fn pending(&self) -> MutexGuard<'_, HashMap<TaskId, JoinHandle<Result<(), Error>>>> {
        self.pending.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Owned set of in-flight background tasks.
///
/// Cloning is cheap and every clone shares the same set.
#[derive(Debug, Clone, Default)]
pub struct TaskRegistry {
    inner: Arc<Inner>,
}

/// Removes a finished task from the registry on drop, so cleanup runs on
/// success, error and panic alike.
struct Deregister {
    id: TaskId,
    inner: Arc<Inner>,
}

impl Drop for Deregister {
    fn drop(&mut self) {
        self.inner.pending().remove(&self.id);
    }
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn `op` as a tracked task and return without waiting for it.
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule<F>(&self, op: F) -> TaskId
    where
        F: Future<Output = Result<(), Error>> + Send + 'static,
    {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let guard = Deregister { id, inner: Arc::clone(&self.inner) };

        let (registered_tx, registered_rx) = oneshot::channel::<()>();

        // The task holds off until its handle is in the set, so the guard
        // never runs before the insert it undoes.
        let handle = tokio::spawn(async move {
            let _guard = guard;
            let _ = registered_rx.await;
            op.await
        });

        let pending = {
            let mut pending = self.inner.pending();
            // Only a task dropped by a shutting-down runtime is finished here.
            if !handle.is_finished() {
                pending.insert(id, handle);
            }
            pending.len()
        };
        let _ = registered_tx.send(());

        tracing::debug!(task_id = id, pending, "scheduled background task");
        id
    }

    /// Number of tasks that have not finished yet.
    pub fn pending(&self) -> usize {
        self.inner.pending().len()
    }

    /// Await every task registered at the time of the call.
    ///
    /// A failing or panicking task is reported as [`TaskOutcome::Failed`] and
    /// does not stop the others from being collected. Tasks scheduled while
    /// the drain is running may or may not be included.
    pub async fn drain_all(&self) -> Vec<TaskOutcome> {
        let handles: Vec<(TaskId, JoinHandle<Result<(), Error>>)> = {
            let mut pending = self.inner.pending();
            let mut handles: Vec<_> = pending.drain().collect();
            handles.sort_by_key(|(id, _)| *id);
            handles
        };

        let mut outcomes = Vec::with_capacity(handles.len());
        for (id, handle) in handles {
            let outcome = match handle.await {
                Ok(Ok(())) => TaskOutcome::Completed { id },
                Ok(Err(error)) => TaskOutcome::Failed { id, error },
                Err(join_err) => TaskOutcome::Failed { id, error: Error::TaskFailed(join_err.to_string()) },
            };
            outcomes.push(outcome);
        }
        outcomes
    }
}

/// Run `body`, then drain `registry` and log what the drained tasks did.
///
/// This is the shutdown hook: wrap the part of a program that issues
/// lookups so pending cache writes land before the process exits.
pub async fn drained<F, T>(registry: &TaskRegistry, body: F) -> T
where
    F: Future<Output = T>,
{
    let output = body.await;

    let outcomes = registry.drain_all().await;
    let failed = outcomes.iter().filter(|o| o.is_failure()).count();
    for outcome in &outcomes {
        if let TaskOutcome::Failed { id, error } = outcome {
            tracing::warn!(task_id = id, error = %error, "background task failed");
        }
    }
    tracing::info!(
        drained = outcomes.len(),
        completed = outcomes.len() - failed,
        failed,
        "pending background tasks finished"
    );

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_ready_tasks_leave_no_stale_handles() {
        let registry = TaskRegistry::new();
        for _ in 0..10_000 {
            registry.schedule(async { Ok(()) });
        }

        let settled = tokio::time::timeout(Duration::from_secs(10), async {
            while registry.pending() > 0 {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await;
        assert!(settled.is_ok(), "{} handles left in the set", registry.pending());
        assert!(registry.drain_all().await.is_empty());
    }

    #[tokio::test]
    async fn test_schedule_does_not_block() {
        let registry = TaskRegistry::new();
        let (tx, rx) = oneshot::channel::<()>();

        registry.schedule(async move {
            let _ = rx.await;
            Ok(())
        });
        assert_eq!(registry.pending(), 1);

        tx.send(()).unwrap();
        let outcomes = registry.drain_all().await;
        assert_eq!(outcomes.len(), 1);
        assert!(!outcomes[0].is_failure());
        assert_eq!(registry.pending(), 0);
    }

    #[tokio::test]
    async fn test_finished_tasks_remove_themselves() {
        let registry = TaskRegistry::new();
        registry.schedule(async { Ok(()) });
        registry.schedule(async { Err(Error::InvalidInput("boom".into())) });

        for _ in 0..100 {
            if registry.pending() == 0 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert_eq!(registry.pending(), 0);
        assert!(registry.drain_all().await.is_empty());
    }

    #[tokio::test]
    async fn test_drain_isolates_failures() {
        let registry = TaskRegistry::new();
        let finished = Arc::new(AtomicUsize::new(0));

        for i in 0..4u64 {
            let finished = Arc::clone(&finished);
            registry.schedule(async move {
                tokio::time::sleep(Duration::from_millis(20)).await;
                finished.fetch_add(1, Ordering::SeqCst);
                if i == 1 {
                    return Err(Error::DuplicateKey("words.response_word".into()));
                }
                if i == 2 {
                    panic!("write task panicked");
                }
                Ok(())
            });
        }

        let outcomes = registry.drain_all().await;
        assert_eq!(outcomes.len(), 4);
        assert_eq!(outcomes.iter().filter(|o| o.is_failure()).count(), 2);
        assert!(matches!(outcomes[1], TaskOutcome::Failed { error: Error::DuplicateKey(_), .. }));
        assert!(matches!(outcomes[2], TaskOutcome::Failed { error: Error::TaskFailed(_), .. }));
        assert_eq!(finished.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_drained_waits_for_pending_work() {
        let registry = TaskRegistry::new();
        let done = Arc::new(AtomicUsize::new(0));

        let value = drained(&registry, {
            let registry = registry.clone();
            let done = Arc::clone(&done);
            async move {
                registry.schedule(async move {
                    tokio::time::sleep(Duration::from_millis(30)).await;
                    done.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                });
                42
            }
        })
        .await;

        assert_eq!(value, 42);
        assert_eq!(done.load(Ordering::SeqCst), 1);
        assert_eq!(registry.pending(), 0);
    }

    #[tokio::test]
    async fn test_task_ids_are_unique() {
        let registry = TaskRegistry::new();
        let a = registry.schedule(async { Ok(()) });
        let b = registry.schedule(async { Ok(()) });
        assert_ne!(a, b);
        let outcomes = registry.drain_all().await;
        assert!(outcomes.iter().all(|o| o.id() == a || o.id() == b));
    }
}
