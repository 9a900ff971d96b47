//! Per-pool booking locks
//!
//! Serializes the authoritative availability re-check and the insert for one
//! space pool. Different pools never contend.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

#[derive(Default, Clone)]
pub struct PoolLocks {
    inner: Arc<DashMap<i32, Arc<Mutex<()>>>>,
}

impl PoolLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `pool_id`. Released when the guard drops.
    pub async fn acquire(&self, pool_id: i32) -> OwnedMutexGuard<()> {
        let lock = self
            .inner
            .entry(pool_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        lock.lock_owned().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn same_pool_is_exclusive() {
        let locks = PoolLocks::new();
        let guard = locks.acquire(1).await;

        let contender = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let _g = locks.acquire(1).await;
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!contender.is_finished());

        drop(guard);
        tokio::time::timeout(Duration::from_secs(1), contender)
            .await
            .expect("lock released")
            .unwrap();
    }

    #[tokio::test]
    async fn different_pools_do_not_contend() {
        let locks = PoolLocks::new();
        let _car = locks.acquire(1).await;
        tokio::time::timeout(Duration::from_millis(100), locks.acquire(2))
            .await
            .expect("independent pool");
    }
}
