//! One-time initialization of the transformation backend.
//!
//! [`BackendCell`] is an explicit, injectable state object rather than a
//! process-wide flag. Concurrent callers share a single initialization; a
//! failure reaches every waiter and leaves the cell retryable.

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::watch;

/// Errors raised while bringing up the backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    #[error("Markup grammar unavailable: {0}")]
    Grammar(String),

    #[error("Backend initialization failed: {0}")]
    Init(String),
}

/// Published result of an initialization; `None` while it is running.
type Slot<T> = Option<Result<Arc<T>, BackendError>>;

enum State<T> {
    Uninitialized,
    Initializing(watch::Receiver<Slot<T>>),
    Ready(Arc<T>),
    Failed(BackendError),
}

/// Observable lifecycle of a [`BackendCell`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendStatus {
    Uninitialized,
    Initializing,
    Ready,
    Failed(BackendError),
}

enum Role<T> {
    Lead(watch::Sender<Slot<T>>),
    Wait(watch::Receiver<Slot<T>>),
}

/// Lazily initialized, shareable backend value.
pub struct BackendCell<T> {
    state: Mutex<State<T>>,
}

impl<T> Default for BackendCell<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> BackendCell<T> {
    /// Create a new, uninitialized cell.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State::Uninitialized),
        }
    }

    fn lock(&self) -> MutexGuard<'_, State<T>> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn status(&self) -> BackendStatus {
        match &*self.lock() {
            State::Uninitialized => BackendStatus::Uninitialized,
            State::Initializing(_) => BackendStatus::Initializing,
            State::Ready(_) => BackendStatus::Ready,
            State::Failed(e) => BackendStatus::Failed(e.clone()),
        }
    }

    /// The value, if initialization already succeeded.
    pub fn get(&self) -> Option<Arc<T>> {
        match &*self.lock() {
            State::Ready(value) => Some(Arc::clone(value)),
            _ => None,
        }
    }

    /// Return the value, running `init` if no initialization has succeeded yet.
    ///
    /// While an initialization is in flight, other callers wait for its result
    /// instead of starting their own. A failed initialization is returned to all
    /// of them; the next call starts a fresh attempt. If the initializing future
    /// is dropped before finishing, the cell returns to uninitialized and one of
    /// the waiters takes over.
    pub async fn get_or_init<F, Fut>(&self, init: F) -> Result<Arc<T>, BackendError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, BackendError>>,
    {
        loop {
            let role = {
                let mut state = self.lock();
                let waiting = match &*state {
                    State::Ready(value) => return Ok(Arc::clone(value)),
                    State::Initializing(rx) => Some(rx.clone()),
                    State::Uninitialized | State::Failed(_) => None,
                };
                match waiting {
                    Some(rx) => Role::Wait(rx),
                    None => {
                        let (tx, rx) = watch::channel(None);
                        *state = State::Initializing(rx);
                        Role::Lead(tx)
                    }
                }
            };

            match role {
                Role::Lead(tx) => return self.lead(tx, init).await,
                Role::Wait(mut rx) => {
                    let published = rx.wait_for(Option::is_some).await.map(|slot| slot.clone());
                    match published {
                        Ok(Some(result)) => return result,
                        // Leader was dropped; the cell has been reset
                        Ok(None) | Err(_) => continue,
                    }
                }
            }
        }
    }

    async fn lead<F, Fut>(&self, tx: watch::Sender<Slot<T>>, init: F) -> Result<Arc<T>, BackendError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, BackendError>>,
    {
        let mut reset = ResetOnDrop { cell: self, armed: true };
        let result = init().await.map(Arc::new);
        reset.armed = false;

        {
            let mut state = self.lock();
            *state = match &result {
                Ok(value) => State::Ready(Arc::clone(value)),
                Err(e) => {
                    tracing::warn!("Backend initialization failed: {}", e);
                    State::Failed(e.clone())
                }
            };
        }
        tx.send_replace(Some(result.clone()));
        result
    }
}

/// Resets an abandoned initialization.
struct ResetOnDrop<'a, T> {
    cell: &'a BackendCell<T>,
    armed: bool,
}

impl<T> Drop for ResetOnDrop<'_, T> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut state = self.cell.lock();
        if matches!(*state, State::Initializing(_)) {
            tracing::debug!("Backend initialization abandoned, resetting");
            *state = State::Uninitialized;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn initializes_once_for_concurrent_callers() {
        let cell = Arc::new(BackendCell::<usize>::new());
        let calls = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let cell = Arc::clone(&cell);
            let calls = Arc::clone(&calls);
            handles.push(tokio::spawn(async move {
                cell.get_or_init(|| async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(20)).await;
                    Ok(42)
                })
                .await
            }));
        }

        for handle in handles {
            assert_eq!(*handle.await.unwrap().unwrap(), 42);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cell.status(), BackendStatus::Ready);
    }

    #[tokio::test]
    async fn failure_reaches_every_waiter_and_is_retryable() {
        let cell = Arc::new(BackendCell::<usize>::new());

        let mut handles = Vec::new();
        for _ in 0..4 {
            let cell = Arc::clone(&cell);
            handles.push(tokio::spawn(async move {
                cell.get_or_init(|| async {
                    tokio::time::sleep(Duration::from_millis(20)).await;
                    Err(BackendError::Init("grammar missing".to_string()))
                })
                .await
            }));
        }
        for handle in handles {
            let err = handle.await.unwrap().unwrap_err();
            assert_eq!(err, BackendError::Init("grammar missing".to_string()));
        }
        assert!(matches!(cell.status(), BackendStatus::Failed(_)));

        let value = cell.get_or_init(|| async { Ok(7) }).await.unwrap();
        assert_eq!(*value, 7);
        assert_eq!(cell.status(), BackendStatus::Ready);
    }

    #[tokio::test]
    async fn abandoned_initialization_resets() {
        let cell = Arc::new(BackendCell::<usize>::new());

        let leader = {
            let cell = Arc::clone(&cell);
            tokio::spawn(async move {
                cell.get_or_init(|| std::future::pending::<Result<usize, BackendError>>())
                    .await
            })
        };
        tokio::task::yield_now().await;
        assert_eq!(cell.status(), BackendStatus::Initializing);

        leader.abort();
        let _ = leader.await;
        assert_eq!(cell.status(), BackendStatus::Uninitialized);

        assert_eq!(*cell.get_or_init(|| async { Ok(1) }).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn ready_value_is_reused() {
        let cell = BackendCell::<String>::new();
        assert!(cell.get().is_none());

        cell.get_or_init(|| async { Ok("first".to_string()) }).await.unwrap();
        let again = cell.get_or_init(|| async { Ok("second".to_string()) }).await.unwrap();

        assert_eq!(again.as_str(), "first");
        assert_eq!(cell.get().as_deref().map(String::as_str), Some("first"));
    }
}
