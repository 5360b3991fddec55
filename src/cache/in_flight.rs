use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Registry of keys with a fetch in progress.
///
/// Holding the guard for a key excludes every other holder of the same key.
/// Entries are dropped once nobody holds or waits on them.
#[derive(Default)]
pub struct InFlight {
    keys: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl InFlight {
    pub async fn acquire(&self, key: String) -> InFlightGuard<'_> {
        let lock = {
            let mut keys = self.keys.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(keys.entry(key.clone()).or_default())
        };

        // Clears the entry if this wait is cancelled after the holder has
        // already released it.
        let waiter = Waiter {
            registry: self,
            key: &key,
        };
        let guard = lock.lock_owned().await;
        std::mem::forget(waiter);

        InFlightGuard {
            registry: self,
            key,
            guard: Some(guard),
        }
    }

    fn remove_if_idle(&self, key: &str) {
        let mut keys = self.keys.lock().unwrap_or_else(PoisonError::into_inner);

        if keys
            .get(key)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            keys.remove(key);
        }
    }

    /// Number of keys currently held or waited on.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub struct InFlightGuard<'a> {
    registry: &'a InFlight,
    key: String,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        // Release the lock first so the count only sees the map's reference
        // plus other holders and waiters.
        self.guard.take();
        self.registry.remove_if_idle(&self.key);
    }
}

struct Waiter<'a> {
    registry: &'a InFlight,
    key: &'a str,
}

impl Drop for Waiter<'_> {
    fn drop(&mut self) {
        self.registry.remove_if_idle(self.key);
    }
}
