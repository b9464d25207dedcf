//! Rerun of operations rejected while an edge is busy

use std::future::Future;
use std::time::Duration;

use log::warn;

use crate::error::NsxResult;

/// How often and how patiently busy errors are retried
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 5,
            delay: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    pub fn new(attempts: u32, delay: Duration) -> Self {
        Self { attempts, delay }
    }

    /// Single attempt, no waiting
    pub fn once() -> Self {
        Self::new(1, Duration::ZERO)
    }
}

/// Run `operation`, rerunning it while it fails with a busy error
pub async fn attempt_with_rerun<T, F, Fut>(policy: &RetryPolicy, mut operation: F) -> NsxResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = NsxResult<T>>,
{
    let attempts = policy.attempts.max(1);
    let mut attempt = 1;
    loop {
        match operation().await {
            Err(e) if e.is_busy() && attempt < attempts => {
                warn!(
                    "Attempt {}/{} rejected: {}; retrying in {:?}",
                    attempt, attempts, e, policy.delay
                );
                tokio::time::sleep(policy.delay).await;
                attempt += 1;
            }
            result => return result,
        }
    }
}
