//! Schedulable delayed cache invalidation

use crate::ports::RecordCache;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

enum DelayControl {
    Fire,
    Cancel,
}

/// A scheduled one-shot cache invalidation with an explicit control
/// handle, instead of a blind sleep-then-delete.
///
/// Dropping the handle detaches the task and leaves the timer in charge
/// (the fire-and-forget production path). Tests call [`fire_now`] or
/// [`cancel`] to advance logical time deterministically.
///
/// The deletion fires exactly once and is never retried; its failure is
/// logged only, leaving any stale entry to natural TTL expiry.
///
/// [`fire_now`]: DelayedDeletion::fire_now
/// [`cancel`]: DelayedDeletion::cancel
pub struct DelayedDeletion {
    control: oneshot::Sender<DelayControl>,
    task: JoinHandle<()>,
}

impl DelayedDeletion {
    /// Schedule `expire_now(key)` to run after `delay`.
    pub fn schedule(cache: Arc<dyn RecordCache>, key: String, delay: Duration) -> Self {
        let (control, rx) = oneshot::channel();
        let task = tokio::spawn(async move {
            let timer = tokio::time::sleep(delay);
            tokio::pin!(timer);

            let fire = tokio::select! {
                _ = &mut timer => true,
                ctl = rx => match ctl {
                    Ok(DelayControl::Fire) => true,
                    Ok(DelayControl::Cancel) => false,
                    // Handle dropped: stay armed until the timer elapses.
                    Err(_) => {
                        timer.await;
                        true
                    }
                },
            };

            if !fire {
                debug!(key = %key, "delayed invalidation cancelled");
                return;
            }
            match cache.expire_now(&key).await {
                Ok(()) => debug!(key = %key, "delayed invalidation fired"),
                Err(e) => warn!(key = %key, "delayed invalidation failed: {}", e),
            }
        });
        Self { control, task }
    }

    /// Fire the deletion immediately, returning the task handle so the
    /// caller can await completion.
    pub fn fire_now(self) -> JoinHandle<()> {
        let _ = self.control.send(DelayControl::Fire);
        self.task
    }

    /// Stand the task down without deleting anything.
    pub fn cancel(self) {
        let _ = self.control.send(DelayControl::Cancel);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::FakeCache;

    const LONG: Duration = Duration::from_secs(3600);

    #[tokio::test]
    async fn fire_now_deletes_without_waiting() {
        let cache = Arc::new(FakeCache::default());
        cache.put("info:1", b"stale".to_vec());

        let deletion = DelayedDeletion::schedule(cache.clone(), "info:1".into(), LONG);
        deletion.fire_now().await.unwrap();
        assert!(!cache.contains("info:1"));
    }

    #[tokio::test]
    async fn cancel_leaves_entry_in_place() {
        let cache = Arc::new(FakeCache::default());
        cache.put("info:1", b"kept".to_vec());

        let deletion = DelayedDeletion::schedule(cache.clone(), "info:1".into(), LONG);
        deletion.cancel();
        tokio::task::yield_now().await;
        assert!(cache.contains("info:1"));
    }

    #[tokio::test]
    async fn dropped_handle_falls_back_to_the_timer() {
        let cache = Arc::new(FakeCache::default());
        cache.put("info:1", b"stale".to_vec());

        let deletion =
            DelayedDeletion::schedule(cache.clone(), "info:1".into(), Duration::from_millis(20));
        drop(deletion);

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(!cache.contains("info:1"));
    }
}
