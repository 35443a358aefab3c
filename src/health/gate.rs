// ABOUTME: Polls a health endpoint until it answers 2xx/3xx or the timeout passes.
// ABOUTME: Success requires an explicit healthy observation; everything else counts as unhealthy.

use std::fmt;
use std::time::Duration;

use hyper::Uri;
use tokio::time::Instant;

use super::probe::HttpProbe;
use crate::config::HealthConfig;

/// Upper bound for a single request, independent of the gate's overall timeout.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(3);

/// Result of one poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    Healthy(u16),
    Unhealthy(u16),
    Failed(String),
    TimedOut(Duration),
}

impl PollOutcome {
    pub fn is_healthy(&self) -> bool {
        matches!(self, PollOutcome::Healthy(_))
    }

    fn from_status(status: u16) -> Self {
        if (200..400).contains(&status) {
            PollOutcome::Healthy(status)
        } else {
            PollOutcome::Unhealthy(status)
        }
    }
}

impl fmt::Display for PollOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PollOutcome::Healthy(status) | PollOutcome::Unhealthy(status) => {
                write!(f, "HTTP {status}")
            }
            PollOutcome::Failed(reason) => write!(f, "{reason}"),
            PollOutcome::TimedOut(after) => write!(f, "no response within {after:?}"),
        }
    }
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("{url} did not become healthy within {:.1}s (last poll: {last})", elapsed.as_secs_f64())]
pub struct HealthTimeout {
    pub url: Uri,
    pub elapsed: Duration,
    pub last: PollOutcome,
}

/// Blocks until the configured URL reports healthy.
#[derive(Debug, Clone)]
pub struct HealthGate<P> {
    probe: P,
    url: Uri,
    interval: Duration,
    timeout: Duration,
    probe_timeout: Duration,
}

impl<P: HttpProbe> HealthGate<P> {
    pub fn new(probe: P, config: &HealthConfig) -> Self {
        Self {
            probe,
            url: config.url.clone(),
            interval: config.interval,
            timeout: config.timeout,
            probe_timeout: PROBE_TIMEOUT,
        }
    }

    pub fn with_probe_timeout(mut self, probe_timeout: Duration) -> Self {
        self.probe_timeout = probe_timeout;
        self
    }

    pub fn url(&self) -> &Uri {
        &self.url
    }

    /// One bounded request, classified.
    pub async fn poll_once(&self) -> PollOutcome {
        match tokio::time::timeout(self.probe_timeout, self.probe.get(&self.url)).await {
            Ok(Ok(status)) => PollOutcome::from_status(status),
            Ok(Err(e)) => PollOutcome::Failed(e.to_string()),
            Err(_) => PollOutcome::TimedOut(self.probe_timeout),
        }
    }

    /// Poll every `interval` until healthy, returning the time it took.
    ///
    /// No poll is started once the next one would land at or past the
    /// deadline; the gate sleeps out the remainder and fails. When `timeout` is
    /// shorter than `interval` this means exactly one poll.
    pub async fn wait(&self) -> Result<Duration, HealthTimeout> {
        let started = Instant::now();
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;
            let outcome = self.poll_once().await;
            let elapsed = started.elapsed();

            tracing::debug!(
                attempt,
                url = %self.url,
                outcome = %outcome,
                elapsed_ms = elapsed.as_millis() as u64,
                "health poll"
            );

            if outcome.is_healthy() {
                return Ok(elapsed);
            }

            let Some(remaining) = self.timeout.checked_sub(elapsed).filter(|r| !r.is_zero())
            else {
                return Err(self.timed_out(elapsed, outcome));
            };

            if self.interval >= remaining {
                tokio::time::sleep(remaining).await;
                return Err(self.timed_out(started.elapsed(), outcome));
            }

            tokio::time::sleep(self.interval).await;
        }
    }

    fn timed_out(&self, elapsed: Duration, last: PollOutcome) -> HealthTimeout {
        HealthTimeout {
            url: self.url.clone(),
            elapsed,
            last,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::ProbeError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct Sequence(Mutex<Vec<u16>>);

    impl Sequence {
        fn new(mut statuses: Vec<u16>) -> Self {
            statuses.reverse();
            Self(Mutex::new(statuses))
        }
    }

    #[async_trait]
    impl HttpProbe for Sequence {
        async fn get(&self, _url: &Uri) -> Result<u16, ProbeError> {
            let mut statuses = self.0.lock().unwrap();
            let status = if statuses.len() > 1 {
                statuses.pop().unwrap()
            } else {
                statuses[0]
            };
            Ok(status)
        }
    }

    struct Hangs;

    #[async_trait]
    impl HttpProbe for Hangs {
        async fn get(&self, _url: &Uri) -> Result<u16, ProbeError> {
            std::future::pending().await
        }
    }

    fn config(interval_ms: u64, timeout_ms: u64) -> HealthConfig {
        HealthConfig {
            url: "http://app:3000/up".parse().unwrap(),
            interval: Duration::from_millis(interval_ms),
            timeout: Duration::from_millis(timeout_ms),
        }
    }

    #[test]
    fn classifies_statuses() {
        assert!(PollOutcome::from_status(200).is_healthy());
        assert!(PollOutcome::from_status(302).is_healthy());
        assert!(PollOutcome::from_status(399).is_healthy());
        assert!(!PollOutcome::from_status(199).is_healthy());
        assert!(!PollOutcome::from_status(400).is_healthy());
        assert!(!PollOutcome::from_status(500).is_healthy());
    }

    #[tokio::test(start_paused = true)]
    async fn healthy_on_first_poll_returns_immediately() {
        let gate = HealthGate::new(Sequence::new(vec![200]), &config(2000, 45_000));
        let elapsed = gate.wait().await.unwrap();
        assert!(elapsed < Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn becomes_healthy_after_retries() {
        let gate = HealthGate::new(Sequence::new(vec![502, 502, 301]), &config(1000, 10_000));
        let elapsed = gate.wait().await.unwrap();
        assert_eq!(elapsed, Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn never_healthy_fails_at_timeout() {
        let gate = HealthGate::new(Sequence::new(vec![500]), &config(500, 2000));
        let err = gate.wait().await.unwrap_err();

        assert!(err.elapsed >= Duration::from_millis(2000));
        assert!(err.elapsed < Duration::from_millis(2500));
        assert_eq!(err.last, PollOutcome::Unhealthy(500));
        assert!(err.to_string().contains("http://app:3000/up"));
    }

    #[tokio::test(start_paused = true)]
    async fn hanging_probe_is_bounded_per_request() {
        let gate = HealthGate::new(Hangs, &config(1000, 5000)).with_probe_timeout(Duration::from_secs(3));
        let err = gate.wait().await.unwrap_err();

        assert_eq!(err.last, PollOutcome::TimedOut(Duration::from_secs(3)));
        assert!(err.elapsed >= Duration::from_secs(5));
        assert!(err.elapsed < Duration::from_secs(8));
    }
}
