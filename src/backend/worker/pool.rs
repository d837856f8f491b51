/**
 * Worker Pool
 *
 * Every unit of work is spawned immediately as a tokio task; the task then
 * waits for a semaphore permit before running its body. Callers therefore
 * never block, while at most `size` bodies run concurrently.
 *
 * A failing unit logs its error inside its own task. A panicking unit only
 * poisons its own task; siblings and the caller are unaffected.
 */
use std::fmt::Display;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::{Notify, Semaphore};
use tokio::task::JoinHandle;

/// Semaphore-bounded pool of isolated tasks
#[derive(Clone)]
pub struct WorkerPool {
    permits: Arc<Semaphore>,
    size: usize,
    pending: Arc<AtomicUsize>,
    idle: Arc<Notify>,
}

/// Decrements the pending count even if the unit panics
struct PendingGuard {
    pending: Arc<AtomicUsize>,
    idle: Arc<Notify>,
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        if self.pending.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.idle.notify_waiters();
        }
    }
}

impl WorkerPool {
    /// Create a pool running at most `size` units at once (minimum 1)
    pub fn new(size: usize) -> Self {
        let size = size.max(1);
        Self {
            permits: Arc::new(Semaphore::new(size)),
            size,
            pending: Arc::new(AtomicUsize::new(0)),
            idle: Arc::new(Notify::new()),
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Units spawned and not yet finished (queued or running)
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::Acquire)
    }

    /// Spawn one isolated unit of work
    ///
    /// Must be called from within a tokio runtime. The returned handle may be
    /// dropped; the unit keeps running.
    pub fn spawn<F, E>(&self, label: impl Into<String>, unit: F) -> JoinHandle<()>
    where
        F: Future<Output = Result<(), E>> + Send + 'static,
        E: Display + Send + 'static,
    {
        let label = label.into();
        let permits = Arc::clone(&self.permits);
        self.pending.fetch_add(1, Ordering::AcqRel);
        let guard = PendingGuard {
            pending: Arc::clone(&self.pending),
            idle: Arc::clone(&self.idle),
        };

        tokio::spawn(async move {
            let _guard = guard;
            let _permit = match permits.acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => {
                    tracing::warn!("[Worker] Pool closed, dropping task {}", label);
                    return;
                }
            };

            if let Err(e) = unit.await {
                tracing::warn!("[Worker] Task {} failed: {}", label, e);
            } else {
                tracing::trace!("[Worker] Task {} completed", label);
            }
        })
    }

    /// Wait until no spawned unit is queued or running
    pub async fn wait_idle(&self) {
        loop {
            let notified = self.idle.notified();
            if self.pending() == 0 {
                return;
            }
            notified.await;
        }
    }
}
