use chrono::Utc;
use reqwest::header::{HeaderMap, ACCEPT};
use reqwest::{Client, Response, StatusCode};
use tokio::time::{sleep, Duration};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::tokens::{Token, TokenList};

/// Pause after each rate-limited attempt.
pub const DEFAULT_BACKOFF: Duration = Duration::from_secs(1);

/// 403 and 429 both mean the current token is spent.
pub fn is_rate_limited(status: StatusCode) -> bool {
    status == StatusCode::FORBIDDEN || status == StatusCode::TOO_MANY_REQUESTS
}

/// How a dispatch ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Some token got a response that was not a rate-limit rejection.
    Accepted,
    /// Every token was rejected; the response is the last rejection.
    Exhausted,
}

/// Final response of a dispatch together with how it was reached.
#[derive(Debug)]
pub struct Dispatched {
    pub response: Response,
    /// Number of requests issued, one per token tried.
    pub attempts: usize,
    pub outcome: Outcome,
}

/// Rate-limit counters reported by the API on every response.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RateLimit {
    pub remaining: u32,
    pub limit: u32,
    /// Unix timestamp at which the window resets.
    pub reset: Option<u64>,
}

impl RateLimit {
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let number = |name: &str| headers.get(name)?.to_str().ok()?.parse::<u64>().ok();

        Some(RateLimit {
            remaining: u32::try_from(number("X-RateLimit-Remaining")?).ok()?,
            limit: u32::try_from(number("X-RateLimit-Limit")?).ok()?,
            reset: number("X-RateLimit-Reset"),
        })
    }

    /// Seconds until the window resets, if the reset lies in the future.
    pub fn seconds_until_reset(&self) -> Option<u64> {
        let now = Utc::now().timestamp() as u64;
        self.reset.filter(|reset| *reset > now).map(|reset| reset - now)
    }
}

/// Issues authenticated GETs, falling through the token list on rate limits.
///
/// Holds no rotation state: every call starts again from the first token.
#[derive(Clone, Debug)]
pub struct Dispatcher {
    client: Client,
    backoff: Duration,
}

impl Dispatcher {
    pub fn new(client: Client) -> Self {
        Dispatcher {
            client,
            backoff: DEFAULT_BACKOFF,
        }
    }

    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    /// GET `url`, trying each token in order until one is not rate limited.
    ///
    /// Non-rate-limit error statuses are returned as-is without trying another
    /// token. When all tokens are rejected the last rejection is returned with
    /// [`Outcome::Exhausted`]; only transport failures produce an `Err`.
    pub async fn get(&self, url: &str, tokens: &TokenList) -> Result<Dispatched> {
        let mut rejected = None;

        for (index, token) in tokens.iter().enumerate() {
            let response = self.send(url, token).await?;
            let status = response.status();

            if let Some(rate_limit) = RateLimit::from_headers(response.headers()) {
                debug!(
                    "Rate limit for token {}: {}/{}",
                    index + 1,
                    rate_limit.remaining,
                    rate_limit.limit
                );
            }

            if !is_rate_limited(status) {
                return Ok(Dispatched {
                    response,
                    attempts: index + 1,
                    outcome: Outcome::Accepted,
                });
            }

            warn!(
                "Rate limit hit ({}) on token {}/{}, switching tokens...",
                status,
                index + 1,
                tokens.len()
            );
            sleep(self.backoff).await;

            // Replacing the previous rejection drops it and releases its body.
            rejected = Some(response);
        }

        let response = match rejected {
            Some(response) => response,
            None => return Err(Error::NoTokens),
        };

        match RateLimit::from_headers(response.headers()).and_then(|r| r.seconds_until_reset()) {
            Some(wait_secs) => warn!(
                "All {} tokens are rate limited; the last one resets in {} seconds",
                tokens.len(),
                wait_secs
            ),
            None => warn!("All {} tokens are rate limited", tokens.len()),
        }

        Ok(Dispatched {
            response,
            attempts: tokens.len(),
            outcome: Outcome::Exhausted,
        })
    }

    async fn send(&self, url: &str, token: &Token) -> Result<Response> {
        debug!("Requesting URL: {}", url);
        let response = self
            .client
            .get(url)
            .header(ACCEPT, "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28")
            .bearer_auth(token.as_str())
            .send()
            .await?;
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn only_forbidden_and_too_many_requests_rotate() {
        assert!(is_rate_limited(StatusCode::FORBIDDEN));
        assert!(is_rate_limited(StatusCode::TOO_MANY_REQUESTS));

        for status in [
            StatusCode::OK,
            StatusCode::UNAUTHORIZED,
            StatusCode::NOT_FOUND,
            StatusCode::UNPROCESSABLE_ENTITY,
            StatusCode::INTERNAL_SERVER_ERROR,
            StatusCode::SERVICE_UNAVAILABLE,
        ] {
            assert!(!is_rate_limited(status), "{} must not rotate", status);
        }
    }

    #[test]
    fn parses_rate_limit_headers() {
        let mut headers = HeaderMap::new();
        headers.insert("x-ratelimit-remaining", HeaderValue::from_static("0"));
        headers.insert("x-ratelimit-limit", HeaderValue::from_static("30"));
        headers.insert("x-ratelimit-reset", HeaderValue::from_static("1700000000"));

        assert_eq!(
            RateLimit::from_headers(&headers),
            Some(RateLimit {
                remaining: 0,
                limit: 30,
                reset: Some(1_700_000_000),
            })
        );
    }

    #[test]
    fn incomplete_rate_limit_headers_are_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert("x-ratelimit-remaining", HeaderValue::from_static("10"));
        assert_eq!(RateLimit::from_headers(&headers), None);

        headers.insert("x-ratelimit-limit", HeaderValue::from_static("many"));
        assert_eq!(RateLimit::from_headers(&headers), None);
    }

    #[test]
    fn reset_in_the_past_has_no_wait() {
        let rate_limit = RateLimit {
            remaining: 0,
            limit: 30,
            reset: Some(1),
        };
        assert_eq!(rate_limit.seconds_until_reset(), None);

        let future = Utc::now().timestamp() as u64 + 120;
        let rate_limit = RateLimit {
            reset: Some(future),
            ..rate_limit
        };
        assert!(rate_limit.seconds_until_reset().is_some_and(|secs| secs <= 120));
    }
}
