//! Background task that periodically evicts expired cache entries.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::result_cache::ResultCache;

/// Handle to a running sweep task.
///
/// The task owns an `Arc` to the cache and calls
/// [`ResultCache::cleanup`] every `interval`. Call [`shutdown`](Self::shutdown)
/// for a clean stop; dropping the handle aborts the task.
#[derive(Debug)]
pub struct CacheSweeper {
    shutdown: Option<oneshot::Sender<()>>,
    handle: JoinHandle<()>,
}

impl CacheSweeper {
    /// Spawns the sweep loop on the current tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    #[must_use]
    pub fn spawn<V>(cache: Arc<ResultCache<V>>, interval: Duration) -> Self
    where
        V: Clone + Send + Sync + 'static,
    {
        let interval = interval.max(Duration::from_millis(1));
        let (tx, mut rx) = oneshot::channel::<()>();

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately; sweeping starts one interval in.
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = &mut rx => break,
                    _ = ticker.tick() => {
                        let removed = cache.cleanup();
                        tracing::trace!(removed, remaining = cache.len(), "cache sweep");
                    }
                }
            }
            tracing::debug!("cache sweeper stopped");
        });

        tracing::debug!(interval_ms = interval.as_millis() as u64, "cache sweeper started");
        Self {
            shutdown: Some(tx),
            handle,
        }
    }

    /// Returns true once the task has exited.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Signals the loop to stop and waits for it to exit.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        let _ = (&mut self.handle).await;
    }
}

impl Drop for CacheSweeper {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
