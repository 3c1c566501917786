//! Session configuration parsed from environment variables.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::time::Duration;

pub const DEFAULT_API_BASE_URL: &str = "";
pub const DEFAULT_API_PREFIX: &str = "/api/v1";
pub const DEFAULT_TOKEN_KEY: &str = "token";
pub const DEFAULT_THEME_KEY: &str = "theme";
pub const DEFAULT_LOGIN_ROUTE: &str = "login";
pub const DEFAULT_NOTICE_WINDOW_MS: u64 = 1500;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Query marker attached to the login redirect when a session expired.
pub const EXPIRED_QUERY: (&str, &str) = ("r", "expired");

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Origin the API lives on. Empty means same-origin relative URLs.
    pub api_base_url: String,
    /// Prefix every request path is routed under.
    pub api_prefix: String,
    /// Storage key holding the credential.
    pub token_key: String,
    /// Storage key holding the light/dark preference.
    pub theme_key: String,
    /// Route name of the entry/login page.
    pub login_route: String,
    /// Window inside which repeated expiry notices are suppressed.
    pub notice_window: Duration,
    pub request_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_owned(),
            api_prefix: DEFAULT_API_PREFIX.to_owned(),
            token_key: DEFAULT_TOKEN_KEY.to_owned(),
            theme_key: DEFAULT_THEME_KEY.to_owned(),
            login_route: DEFAULT_LOGIN_ROUTE.to_owned(),
            notice_window: Duration::from_millis(DEFAULT_NOTICE_WINDOW_MS),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

impl SessionConfig {
    /// Build config from environment variables.
    ///
    /// Optional:
    /// - `AUTHGATE_API_BASE_URL`: default empty (same origin)
    /// - `AUTHGATE_API_PREFIX`: default `/api/v1`
    /// - `AUTHGATE_NOTICE_WINDOW_MS`: default 1500
    /// - `AUTHGATE_REQUEST_TIMEOUT_SECS`: default 10
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let api_base_url = lookup("AUTHGATE_API_BASE_URL")
            .map_or(defaults.api_base_url, |raw| normalize_base_url(&raw));
        let api_prefix = lookup("AUTHGATE_API_PREFIX").map_or(defaults.api_prefix, |raw| normalize_prefix(&raw));
        let notice_ms = parse_or(lookup("AUTHGATE_NOTICE_WINDOW_MS"), DEFAULT_NOTICE_WINDOW_MS);
        let timeout_secs = parse_or(lookup("AUTHGATE_REQUEST_TIMEOUT_SECS"), DEFAULT_REQUEST_TIMEOUT_SECS);

        Self {
            api_base_url,
            api_prefix,
            notice_window: Duration::from_millis(notice_ms),
            request_timeout: Duration::from_secs(timeout_secs),
            ..defaults
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.api_base_url = normalize_base_url(base_url);
        self
    }
}

fn parse_or(raw: Option<String>, default: u64) -> u64 {
    raw.and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(default)
}

fn normalize_base_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_owned()
}

fn normalize_prefix(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        return DEFAULT_API_PREFIX.to_owned();
    }
    format!("/{trimmed}")
}
