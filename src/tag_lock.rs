//! Per-tag mutual exclusion
//!
//! The storage service's tag namespace is shared mutable state with no
//! locking of its own; two concurrent replaces for the same tag would race
//! on the list/delete/upload sequence and could orphan an upload. This map
//! serializes replaces per tag within the process. Tags never seen before
//! get a lock on demand; entries are retained for the process lifetime
//! (tags are small and bounded by real client usage).

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Map from tag to its replace lock
#[derive(Default)]
pub struct TagLocks {
    inner: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl TagLocks {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the lock for a tag, waiting if another replace holds it
    ///
    /// The guard is owned so it can be held across await points for the
    /// whole upload/list/delete sequence.
    pub async fn acquire(&self, tag: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut map = self
                .inner
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            Arc::clone(
                map.entry(tag.to_string())
                    .or_insert_with(|| Arc::new(AsyncMutex::new(()))),
            )
        };
        lock.lock_owned().await
    }

    /// Number of tags with a lock entry
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
