use std::thread::sleep;
use std::time::Duration;

use tracing::warn;

use guidedb_core::{Embedder, Result};

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    retries: usize,
    base_delay_ms: u64,
}

impl RetryPolicy {
    pub fn new(retries: usize, base_delay: Duration) -> Self {
        let base = base_delay.as_millis().max(1) as u64;
        Self { retries, base_delay_ms: base }
    }

    pub fn retries(&self) -> usize {
        self.retries
    }

    /// Exponential backoff: `base`, `2 * base`, `4 * base`, ...
    pub fn delay_for_attempt(&self, attempt: usize) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        let backoff = self.base_delay_ms.saturating_mul(1u64 << exponent);
        Duration::from_millis(backoff.max(self.base_delay_ms))
    }
}

/// Retries provider failures of the wrapped embedder; any other error is
/// returned immediately.
pub struct Retrying<E> {
    inner: E,
    policy: RetryPolicy,
}

impl<E: Embedder> Retrying<E> {
    pub fn new(inner: E, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn into_inner(self) -> E {
        self.inner
    }
}

impl<E: Embedder> Embedder for Retrying<E> {
    fn embedder_id(&self) -> &str { self.inner.embedder_id() }

    fn dim(&self) -> Option<usize> { self.inner.dim() }

    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut attempt = 0usize;
        loop {
            match self.inner.embed(text) {
                Ok(vec) => return Ok(vec),
                Err(err) if err.is_retryable() && attempt < self.policy.retries => {
                    attempt += 1;
                    let backoff = self.policy.delay_for_attempt(attempt);
                    warn!(attempt, ?backoff, error = %err, "embedding call failed, retrying");
                    sleep(backoff);
                }
                Err(err) => return Err(err),
            }
        }
    }
}
