use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use rollcall_types::ids::MessageRef;

/// Per-message edit locks.
///
/// Serialises the fetch/decode/update sequence for one Event Message within
/// this process. It can't see edits made by another process or client; the
/// platform has no conditional update to guard against those.
#[derive(Default)]
pub struct EditLocks {
    /// message -> lock. Entries are removed once nobody holds or waits on them.
    locks: Mutex<HashMap<MessageRef, Arc<AsyncMutex<()>>>>,
}

impl EditLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits until no other task is editing `target`.
    pub async fn acquire(&self, target: &MessageRef) -> EditGuard<'_> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
            locks.entry(target.clone()).or_default().clone()
        };

        let guard = lock.clone().lock_owned().await;
        EditGuard {
            locks: self,
            target: target.clone(),
            lock,
            guard: Some(guard),
        }
    }

    /// Number of messages with a held or awaited lock.
    pub fn active(&self) -> usize {
        self.locks.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

pub struct EditGuard<'a> {
    locks: &'a EditLocks,
    target: MessageRef,
    lock: Arc<AsyncMutex<()>>,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for EditGuard<'_> {
    fn drop(&mut self) {
        // Release before counting so the guard's own reference is gone.
        self.guard.take();

        let mut locks = self.locks.locks.lock().unwrap_or_else(|e| e.into_inner());
        // Map entry plus ours: nobody else is waiting.
        if Arc::strong_count(&self.lock) == 2 {
            locks.remove(&self.target);
        }
    }
}
