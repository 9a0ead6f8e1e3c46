//! Endpoint constants and small helpers shared by every quote consumer.
use std::time::Duration;

/// Production API host. Overridable through `ClientConfig`.
pub const DEFAULT_API_BASE_URL: &str = "https://remitbuddy-production.up.railway.app";
/// Path of the remote quote endpoint.
pub const QUOTE_PATH: &str = "/api/getRemittanceQuote";

/// Timeout applied to the first attempt.
pub const FIRST_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(15);
/// Timeout applied to the single retry. Longer to ride out a cold start.
pub const RETRY_TIMEOUT: Duration = Duration::from_secs(30);
/// Pause between a transient failure and the retry.
pub const RETRY_BACKOFF: Duration = Duration::from_secs(2);
/// Window granted to the slow provider batch of a staged fetch.
pub const SLOW_BATCH_TIMEOUT: Duration = Duration::from_secs(4);

/// Headers sent with every quote request so no intermediary serves a stale answer.
pub const NO_CACHE_HEADERS: [(&str, &str); 4] = [
    ("Accept", "application/json"),
    ("Cache-Control", "no-cache, no-store, must-revalidate"),
    ("Pragma", "no-cache"),
    ("Expires", "0"),
];

/// Helper to join a base URL and a path like "base/path" without doubling slashes.
pub fn endpoint(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_without_double_slash() {
        assert_eq!(
            endpoint("https://remitbuddy-production.up.railway.app/", QUOTE_PATH),
            "https://remitbuddy-production.up.railway.app/api/getRemittanceQuote"
        );
        assert_eq!(
            endpoint("http://localhost:8000", "api/getRemittanceQuote"),
            "http://localhost:8000/api/getRemittanceQuote"
        );
    }
}
