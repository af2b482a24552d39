// ── Bounded confirmation polling ──
//
// The element applies circuit changes asynchronously. After a creation
// request the circuit table is re-read on a fixed schedule until the new
// row shows up or the budget runs out.

use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::CoreError;

/// Fixed-count, fixed-interval retry budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    #[serde(with = "duration_secs")]
    pub interval: Duration,
}

impl RetryPolicy {
    pub const fn new(max_attempts: u32, interval: Duration) -> Self {
        Self {
            max_attempts,
            interval,
        }
    }

    /// 60 attempts one second apart: the approval workflow budget.
    pub const fn workflow() -> Self {
        Self::new(60, Duration::from_secs(1))
    }

    /// 3 attempts thirty seconds apart: the validation run budget.
    pub const fn validation() -> Self {
        Self::new(3, Duration::from_secs(30))
    }

    /// Upper bound on time spent sleeping between attempts.
    pub fn max_wait(&self) -> Duration {
        self.interval
            .saturating_mul(self.max_attempts.saturating_sub(1))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::workflow()
    }
}

/// Run `check` until it yields `Some`, sleeping `interval` between misses.
///
/// A failed check counts as a miss: it is logged and the loop carries on
/// within the same budget. Once `max_attempts` checks have missed, the
/// result is `Ok(None)`, or the error of the final attempt if that one
/// failed. `check` receives the 1-based attempt number.
pub async fn poll_until<T, F, Fut>(policy: RetryPolicy, mut check: F) -> Result<Option<T>, CoreError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<Option<T>, CoreError>>,
{
    let mut last_error = None;
    for attempt in 1..=policy.max_attempts {
        match check(attempt).await {
            Ok(Some(found)) => {
                debug!(attempt, "poll matched");
                return Ok(Some(found));
            }
            Ok(None) => last_error = None,
            Err(e) => {
                warn!(
                    attempt,
                    max_attempts = policy.max_attempts,
                    error = %e,
                    "poll attempt failed"
                );
                last_error = Some(e);
            }
        }
        if attempt < policy.max_attempts {
            tokio::time::sleep(policy.interval).await;
        }
    }
    debug!(attempts = policy.max_attempts, "poll budget exhausted");
    last_error.map_or(Ok(None), Err)
}

mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_secs)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn stops_at_first_hit() {
        let calls = AtomicU32::new(0);
        let start = tokio::time::Instant::now();

        let found = poll_until(RetryPolicy::workflow(), |attempt| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move { Ok((attempt == 3).then_some(attempt)) }
        })
        .await
        .unwrap();

        assert_eq!(found, Some(3));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(start.elapsed(), Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn exhausts_budget() {
        let calls = AtomicU32::new(0);
        let start = tokio::time::Instant::now();

        let found: Option<()> = poll_until(RetryPolicy::validation(), |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok(None) }
        })
        .await
        .unwrap();

        assert!(found.is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(start.elapsed(), Duration::from_secs(60));
    }

    #[tokio::test(start_paused = true)]
    async fn failed_checks_count_as_misses() {
        let start = tokio::time::Instant::now();

        let found = poll_until(RetryPolicy::workflow(), |attempt| async move {
            if attempt < 3 {
                Err(CoreError::Internal("table read failed".into()))
            } else {
                Ok(Some(attempt))
            }
        })
        .await
        .unwrap();

        assert_eq!(found, Some(3));
        assert_eq!(start.elapsed(), Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn error_on_final_attempt_is_returned() {
        let calls = AtomicU32::new(0);
        let start = tokio::time::Instant::now();

        let result: Result<Option<()>, _> = poll_until(RetryPolicy::validation(), |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(CoreError::Internal("boom".into())) }
        })
        .await;

        assert!(matches!(result, Err(CoreError::Internal(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(start.elapsed(), Duration::from_secs(60));
    }

    #[tokio::test(start_paused = true)]
    async fn earlier_errors_do_not_outlive_a_clean_miss() {
        let policy = RetryPolicy::new(2, Duration::from_secs(1));
        let found: Option<()> = poll_until(policy, |attempt| async move {
            if attempt == 1 {
                Err(CoreError::Internal("boom".into()))
            } else {
                Ok(None)
            }
        })
        .await
        .unwrap();
        assert!(found.is_none());
    }

    #[test]
    fn max_wait_counts_gaps_between_attempts() {
        assert_eq!(RetryPolicy::workflow().max_wait(), Duration::from_secs(59));
        assert_eq!(RetryPolicy::new(0, Duration::from_secs(5)).max_wait(), Duration::ZERO);
    }
}
