//! Bounded condition polling
//!
//! The storefront gives no completion signal for fragment refreshes, so every
//! wait is a probe repeated at a fixed interval up to an attempt bound.

use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::trace;

use shopcheck_common::TimingConfig;

use crate::error::{E2eError, E2eResult};

/// Attempt bound and interval for one kind of wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Poll {
    pub interval: Duration,
    pub attempts: u32,
}

impl Poll {
    pub fn new(interval: Duration, attempts: u32) -> Self {
        Self {
            interval,
            attempts: attempts.max(1),
        }
    }

    /// A single attempt, no waiting
    pub fn once() -> Self {
        Self::new(Duration::ZERO, 1)
    }

    /// Run `probe` until it yields a value or the attempts run out.
    ///
    /// Probe errors end the wait immediately.
    pub async fn until<T, F, Fut>(&self, mut probe: F) -> E2eResult<Option<T>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = E2eResult<Option<T>>>,
    {
        for attempt in 1..=self.attempts {
            if let Some(value) = probe().await? {
                return Ok(Some(value));
            }
            if attempt < self.attempts {
                trace!("poll attempt {}/{} unmet", attempt, self.attempts);
                sleep(self.interval).await;
            }
        }
        Ok(None)
    }

    /// Like [`Poll::until`] with a boolean condition
    pub async fn until_true<F, Fut>(&self, mut probe: F) -> E2eResult<bool>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = E2eResult<bool>>,
    {
        let hit = self
            .until(|| {
                let fut = probe();
                async move { Ok(fut.await?.then_some(())) }
            })
            .await?;
        Ok(hit.is_some())
    }

    /// Like [`Poll::until`], turning exhaustion into a timeout error
    pub async fn require<T, F, Fut>(&self, what: &str, probe: F) -> E2eResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = E2eResult<Option<T>>>,
    {
        self.until(probe).await?.ok_or_else(|| {
            E2eError::Timeout(format!(
                "{} (after {} attempts at {:?})",
                what, self.attempts, self.interval
            ))
        })
    }
}

/// The polls a reader and sequencer use, derived from timing configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Polls {
    pub cart: Poll,
    pub attach: Poll,
    pub settle: Poll,
    pub removal: Poll,
    pub total_retries: u32,
}

impl From<&TimingConfig> for Polls {
    fn from(timing: &TimingConfig) -> Self {
        let interval = timing.poll_interval();
        Self {
            cart: Poll::new(interval, timing.cart_poll_attempts),
            attach: Poll::new(interval, timing.attach_attempts),
            settle: Poll::new(interval, timing.settle_attempts),
            removal: Poll::new(interval, timing.removal_attempts),
            total_retries: timing.retries.max(1),
        }
    }
}

impl Default for Polls {
    fn default() -> Self {
        Self::from(&TimingConfig::default())
    }
}
