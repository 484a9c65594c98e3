use std::time::Duration;

use anyhow::Result;
use tracing::{info, warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    /// Wait after the first failure; doubles after each further failure.
    pub base_delay: Duration,
    pub timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            base_delay: Duration::from_secs(1),
            timeout: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    /// Delay before attempt `attempt + 1`, given that `attempt` (1-based) failed.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1).min(16);
        self.base_delay.saturating_mul(1 << exp)
    }
}

#[derive(Debug)]
pub enum FetchOutcome {
    Fetched(String),
    Exhausted { attempts: u32, last_error: String },
}

/// Run `fetch` up to `policy.max_attempts` times, sleeping with exponential
/// backoff between failures. Empty bodies count as failures.
pub fn retry_with_backoff<F, S>(url: &str, policy: &RetryPolicy, mut fetch: F, mut sleep: S) -> FetchOutcome
where
    F: FnMut(&str) -> Result<String>,
    S: FnMut(Duration),
{
    let attempts = policy.max_attempts.max(1);
    let mut last_error = String::from("no attempt made");

    for attempt in 1..=attempts {
        match fetch(url) {
            Ok(body) if !body.trim().is_empty() => {
                info!(url, attempt, "fetched word list");
                return FetchOutcome::Fetched(body);
            }
            Ok(_) => last_error = "downloaded file is empty".to_string(),
            Err(err) => last_error = format!("{err:#}"),
        }
        warn!(url, attempt, attempts, error = %last_error, "word list fetch failed");
        if attempt < attempts {
            sleep(policy.backoff(attempt));
        }
    }

    FetchOutcome::Exhausted {
        attempts,
        last_error,
    }
}

#[cfg(feature = "network")]
pub fn fetch_url(url: &str, timeout: Duration) -> Result<String> {
    let client = reqwest::blocking::Client::builder()
        .timeout(timeout)
        .build()?;
    let response = client.get(url).send()?.error_for_status()?;
    Ok(response.text()?)
}

#[cfg(not(feature = "network"))]
pub fn fetch_url(_url: &str, _timeout: Duration) -> Result<String> {
    anyhow::bail!("built without network support")
}

pub fn fetch_with_retry(url: &str, policy: &RetryPolicy) -> FetchOutcome {
    if !cfg!(feature = "network") {
        return FetchOutcome::Exhausted {
            attempts: 0,
            last_error: "built without network support".to_string(),
        };
    }
    retry_with_backoff(url, policy, |u| fetch_url(u, policy.timeout), std::thread::sleep)
}
