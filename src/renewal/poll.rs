//! # Bounded Polling
//!
//! Fixed-interval polling with a hard ceiling and an injectable sleep, so
//! timeout boundaries can be tested without waiting on a real clock.

use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

/// Source of delays
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Sleeps on the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Interval and ceiling for [`poll_until`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    pub interval: Duration,
    pub timeout: Duration,
}

impl PollSettings {
    /// Number of checks that fit in the ceiling (at least one)
    #[must_use]
    pub fn attempts(&self) -> u32 {
        if self.interval.is_zero() {
            return 1;
        }
        let attempts = self.timeout.as_nanos() / self.interval.as_nanos();
        u32::try_from(attempts).unwrap_or(u32::MAX).max(1)
    }
}

#[derive(Debug, Error)]
pub enum PollError<E> {
    #[error("timed out after {0:?}")]
    Timeout(Duration),
    #[error(transparent)]
    Check(E),
}

/// Sleep one interval, then run `check`; repeat until it yields a value
///
/// Returns [`PollError::Timeout`] once [`PollSettings::attempts`] checks have come
/// back empty, and [`PollError::Check`] as soon as a check fails.
pub async fn poll_until<T, E, F, Fut>(
    sleeper: &dyn Sleeper,
    settings: PollSettings,
    mut check: F,
) -> Result<T, PollError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>, E>>,
{
    let attempts = settings.attempts();
    for _ in 0..attempts {
        sleeper.sleep(settings.interval).await;
        if let Some(value) = check().await.map_err(PollError::Check)? {
            return Ok(value);
        }
    }
    Err(PollError::Timeout(settings.interval * attempts))
}
