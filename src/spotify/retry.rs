use std::time::Duration;

use reqwest::header::RETRY_AFTER;
use reqwest::{RequestBuilder, Response, StatusCode};
use tracing::warn;

use crate::error::{Error, Result};

const MIN_BACKOFF: Duration = Duration::from_millis(500);
const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// Which failures a request may be sent again after
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Retry {
    /// Reads, `PUT`s and token grants. Repeating them has no further effect.
    Idempotent,
    /// Creates and appends. Only resent when the server cannot have applied them:
    /// a rate limit or a failed connect.
    Unapplied,
}

impl Retry {
    fn status(self, status: StatusCode) -> bool {
        status == StatusCode::TOO_MANY_REQUESTS
            || (self == Retry::Idempotent && status.is_server_error())
    }

    fn error(self, err: &reqwest::Error) -> bool {
        err.is_connect() || (self == Retry::Idempotent && err.is_timeout())
    }
}

/// Sends the request built by `build`, at most `max_retries` extra times. The whole
/// exchange is one logical call for the caller. A non-success status that is not
/// retried, or still failing once retries run out, becomes [`Error::Api`].
pub async fn send(
    max_retries: u32,
    policy: Retry,
    build: impl Fn() -> RequestBuilder,
) -> Result<Response> {
    let mut attempt = 0;
    loop {
        let delay = match build().send().await {
            Ok(response) if response.status().is_success() => return Ok(response),
            Ok(response) => {
                let status = response.status();
                if !policy.status(status) || attempt >= max_retries {
                    let message = response.text().await.unwrap_or_default();
                    return Err(Error::Api {
                        status: status.as_u16(),
                        message,
                    });
                }
                response
                    .headers()
                    .get(RETRY_AFTER)
                    .and_then(|value| value.to_str().ok())
                    .and_then(parse_retry_after)
                    .unwrap_or_else(|| backoff(attempt))
            }
            Err(err) if policy.error(&err) && attempt < max_retries => backoff(attempt),
            Err(err) => return Err(err.into()),
        };
        attempt += 1;
        warn!(attempt, max = max_retries, ?delay, ?policy, "retrying request");
        tokio::time::sleep(delay).await;
    }
}

fn backoff(attempt: u32) -> Duration {
    MIN_BACKOFF
        .checked_mul(2u32.saturating_pow(attempt))
        .map_or(MAX_BACKOFF, |delay| delay.min(MAX_BACKOFF))
}

/// `Retry-After` in seconds, capped like the backoff. The HTTP-date form is not
/// used by this API.
fn parse_retry_after(value: &str) -> Option<Duration> {
    value
        .trim()
        .parse()
        .ok()
        .map(|secs| Duration::from_secs(secs).min(MAX_BACKOFF))
}
