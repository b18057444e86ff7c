//! Trailing debounce timer
//!
//! Each `schedule` call arms a fresh quiet window and cancels the previous
//! one, so at most one commit is ever pending. A commit only runs if its
//! window is still the newest when the timer fires.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

/// Default quiet period before a search value is applied
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Cancellable trailing-debounce timer
#[derive(Debug)]
pub struct Debouncer {
    window: Duration,
    generation: Arc<AtomicU64>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl Debouncer {
    /// Create a debouncer with the given quiet window
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            generation: Arc::new(AtomicU64::new(0)),
            task: Mutex::new(None),
        }
    }

    /// The quiet window
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Arm a new window, cancelling any pending one.
    ///
    /// `commit` runs once the window elapses with no newer `schedule` or
    /// `cancel` in between, and receives the generation this call returned.
    /// Returns `None` without scheduling anything when called outside a
    /// tokio runtime.
    pub fn schedule<F>(&self, commit: F) -> Option<u64>
    where
        F: FnOnce(u64) + Send + 'static,
    {
        let handle = Handle::try_current().ok()?;
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let current = Arc::clone(&self.generation);
        let window = self.window;

        let task = handle.spawn(async move {
            tokio::time::sleep(window).await;
            if current.load(Ordering::SeqCst) == generation {
                commit(generation);
            }
        });

        if let Some(previous) = self.lock_task().replace(task) {
            previous.abort();
        }
        Some(generation)
    }

    /// Drop the pending commit, if any
    pub fn cancel(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(task) = self.lock_task().take() {
            task.abort();
        }
    }

    /// Whether a window is armed and has not fired yet
    pub fn is_armed(&self) -> bool {
        self.lock_task()
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }

    fn lock_task(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.task.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex as StdMutex;

    fn recorder() -> (Arc<StdMutex<Vec<&'static str>>>, impl Fn(&'static str) -> Box<dyn FnOnce(u64) + Send>) {
        let fired = Arc::new(StdMutex::new(Vec::new()));
        let sink = Arc::clone(&fired);
        let make = move |label: &'static str| {
            let sink = Arc::clone(&sink);
            Box::new(move |_generation: u64| sink.lock().unwrap().push(label)) as Box<dyn FnOnce(u64) + Send>
        };
        (fired, make)
    }

    #[tokio::test(start_paused = true)]
    async fn test_fires_after_window() {
        let debouncer = Debouncer::new(Duration::from_millis(300));
        let (fired, make) = recorder();

        debouncer.schedule(make("a")).unwrap();
        assert!(debouncer.is_armed());

        tokio::time::sleep(Duration::from_millis(299)).await;
        assert!(fired.lock().unwrap().is_empty());

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(*fired.lock().unwrap(), vec!["a"]);
        assert!(!debouncer.is_armed());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reschedule_discards_previous() {
        let debouncer = Debouncer::new(Duration::from_millis(300));
        let (fired, make) = recorder();

        let first = debouncer.schedule(make("a")).unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        let second = debouncer.schedule(make("ab")).unwrap();
        assert!(second > first);

        // Past the first window but inside the second
        tokio::time::sleep(Duration::from_millis(250)).await;
        assert!(fired.lock().unwrap().is_empty());

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(*fired.lock().unwrap(), vec!["ab"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_prevents_commit() {
        let debouncer = Debouncer::new(Duration::from_millis(300));
        let (fired, make) = recorder();

        debouncer.schedule(make("a")).unwrap();
        debouncer.cancel();
        assert!(!debouncer.is_armed());

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(fired.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_pending_commit() {
        let (fired, make) = recorder();
        {
            let debouncer = Debouncer::new(Duration::from_millis(300));
            debouncer.schedule(make("a")).unwrap();
        }

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(fired.lock().unwrap().is_empty());
    }

    #[test]
    fn test_schedule_without_runtime_returns_none() {
        let debouncer = Debouncer::default();
        assert_eq!(debouncer.window(), DEFAULT_DEBOUNCE);
        assert!(debouncer.schedule(|_| {}).is_none());
        assert!(!debouncer.is_armed());
    }
}
