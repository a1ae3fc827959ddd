//! Per-enrollment write locks.
//!
//! Writers to the same `(student_id, course_id)` queue behind one async
//! mutex, so their load-apply-save cycles never interleave inside this
//! process. The store's version check still catches writers from other
//! processes sharing the database.

use std::{
  collections::HashMap,
  sync::{Arc, Mutex, PoisonError, Weak},
};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use uuid::Uuid;

type Key = (Uuid, Uuid);

/// A table of async mutexes keyed by enrollment pair.
///
/// Entries are weak; a lock lives only while someone holds or awaits it.
#[derive(Default)]
pub struct EnrollmentLocks {
  slots: Mutex<HashMap<Key, Weak<AsyncMutex<()>>>>,
}

impl EnrollmentLocks {
  /// Wait for exclusive write access to one enrollment.
  pub async fn acquire(&self, student_id: Uuid, course_id: Uuid) -> OwnedMutexGuard<()> {
    let lock = self.slot((student_id, course_id));
    lock.lock_owned().await
  }

  fn slot(&self, key: Key) -> Arc<AsyncMutex<()>> {
    let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(live) = slots.get(&key).and_then(Weak::upgrade) {
      return live;
    }
    slots.retain(|_, weak| weak.strong_count() > 0);
    let fresh = Arc::new(AsyncMutex::new(()));
    slots.insert(key, Arc::downgrade(&fresh));
    fresh
  }

  /// Number of locks currently in use.
  pub fn active(&self) -> usize {
    self
      .slots
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .values()
      .filter(|weak| weak.strong_count() > 0)
      .count()
  }
}
