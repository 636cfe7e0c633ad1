use std::time::Duration;

use crate::core::FwError;

/// Specifies the backoff strategy for retrying failed requests.
#[derive(Clone, Debug)]
pub enum Backoff {
    /// Uses a fixed delay between retries.
    Fixed(Duration),
    /// Uses an exponential delay between retries.
    /// The delay is calculated as `base * (factor ^ attempt)`.
    Exponential {
        /// The initial backoff duration.
        base: Duration,
        /// The multiplicative factor for each subsequent retry.
        factor: f64,
        /// The maximum duration to wait between retries.
        max: Duration,
    },
}

impl Backoff {
    /// Delay before retry number `attempt` (0-based).
    #[must_use]
    pub fn delay(&self, attempt: u32) -> Duration {
        match self {
            Backoff::Fixed(d) => *d,
            Backoff::Exponential { base, factor, max } => {
                let exp = i32::try_from(attempt).unwrap_or(i32::MAX);
                let secs = base.as_secs_f64() * factor.powi(exp);
                if !secs.is_finite() || secs >= max.as_secs_f64() {
                    *max
                } else {
                    Duration::from_secs_f64(secs)
                }
            }
        }
    }
}

/// Configuration for the remote store's retry mechanism.
///
/// The engine itself never retries; this policy belongs to the adapter and is chosen by
/// the host. It is disabled by default.
#[derive(Clone, Debug)]
pub struct RetryConfig {
    /// Enables or disables the retry mechanism.
    pub enabled: bool,
    /// The maximum number of retries to attempt. The total number of attempts will be `max_retries + 1`.
    pub max_retries: u32,
    /// The backoff strategy to use between retries.
    pub backoff: Backoff,
    /// A list of HTTP status codes that should trigger a retry.
    pub retry_on_status: Vec<u16>,
    /// Whether to retry on request timeouts.
    pub retry_on_timeout: bool,
    /// Whether to retry on connection errors.
    pub retry_on_connect: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            ..Self::standard()
        }
    }
}

impl RetryConfig {
    /// An enabled policy: four retries, exponential backoff from 200ms capped at 3s.
    #[must_use]
    pub fn standard() -> Self {
        Self {
            enabled: true,
            max_retries: 4,
            backoff: Backoff::Exponential {
                base: Duration::from_millis(200),
                factor: 2.0,
                max: Duration::from_secs(3),
            },
            retry_on_status: vec![408, 429, 500, 502, 503, 504],
            retry_on_timeout: true,
            retry_on_connect: true,
        }
    }

    fn should_retry_error(&self, e: &reqwest::Error) -> bool {
        (self.retry_on_timeout && e.is_timeout()) || (self.retry_on_connect && e.is_connect())
    }
}

/// Sends a request, retrying per `cfg`. Non-2xx responses that are not retried are
/// returned as they are; the caller maps them to errors.
pub(crate) async fn send_with_retry(
    req: reqwest::RequestBuilder,
    cfg: &RetryConfig,
) -> Result<reqwest::Response, FwError> {
    let max = if cfg.enabled { cfg.max_retries } else { 0 };
    let mut attempt: u32 = 0;
    loop {
        let this_try = req
            .try_clone()
            .ok_or_else(|| FwError::InvalidParams("request body is not replayable".into()))?;
        match this_try.send().await {
            Ok(resp) => {
                let status = resp.status().as_u16();
                if attempt < max && cfg.retry_on_status.contains(&status) {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(status, attempt, "retrying store request");
                } else {
                    return Ok(resp);
                }
            }
            Err(e) => {
                if attempt >= max || !cfg.should_retry_error(&e) {
                    return Err(FwError::Http(e));
                }
                #[cfg(feature = "tracing")]
                tracing::debug!(error = %e, attempt, "retrying store request");
            }
        }
        tokio::time::sleep(cfg.backoff.delay(attempt)).await;
        attempt += 1;
    }
}
