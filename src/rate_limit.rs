//! Upstream rate-limit gate
//!
//! LeetCode penalizes bursts, so every remote call goes through one gate that
//! admits a single request at a time and keeps it closed for a fixed delay after
//! the response arrives. Waiting callers suspend on the gate instead of blocking
//! the runtime.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Mutual-exclusion gate shared by every request to one upstream
///
/// Cloning is cheap; clones share the same gate.
#[derive(Clone, Debug)]
pub struct RateGate {
    lock: Arc<Mutex<()>>,
    delay: Duration,
}

impl RateGate {
    /// Create a gate that holds for `delay` after each call
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self {
            lock: Arc::new(Mutex::new(())),
            delay,
        }
    }

    /// Run `call` while holding the gate
    ///
    /// The gate is held across the call and the post-call delay, and released
    /// before returning. The delay applies whether or not the call succeeded.
    pub async fn run<F, T>(&self, call: F) -> T
    where
        F: Future<Output = T>,
    {
        let _guard = self.lock.lock().await;
        let output = call.await;
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        output
    }
}
