//! Per-account mutual exclusion.
//!
//! Register, login, and disconnect for the same username run one at a
//! time; different usernames never wait on each other.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};

/// Idle entries are swept once the table holds this many usernames.
const PRUNE_THRESHOLD: usize = 1024;

/// A table of lazily created per-username locks.
#[derive(Default)]
pub(crate) struct AccountLocks {
    table: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl AccountLocks {
    /// Waits for exclusive access to `username`. Released on drop.
    pub(crate) async fn acquire(&self, username: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut table = self.table.lock().await;
            if table.len() >= PRUNE_THRESHOLD {
                // Only the table holds an idle entry: no owner, no waiter.
                table.retain(|_, lock| Arc::strong_count(lock) > 1);
            }
            Arc::clone(table.entry(username.to_owned()).or_default())
        };
        lock.lock_owned().await
    }

    #[cfg(test)]
    async fn len(&self) -> usize {
        self.table.lock().await.len()
    }
}
