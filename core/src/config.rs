//! Construction options for a `Client`.
//!
//! # Design
//! Options are plain data with a fluent constructor. `from_env` mirrors the
//! mock server's `PORT` convention so tests and small tools can point a
//! client at a host without code changes.

use std::time::Duration;

use crate::error::ClientError;

pub const BASE_URL_VAR: &str = "VORTEX_BASE_URL";
pub const TIMEOUT_MS_VAR: &str = "VORTEX_TIMEOUT_MS";
pub const RETRIES_VAR: &str = "VORTEX_RETRIES";

/// Options fixed at client construction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Options {
    /// Prefix every request path is appended to, verbatim.
    pub base_url: String,
    /// Per-call timeout handed to the transport; `None` waits forever.
    pub timeout: Option<Duration>,
    /// Recorded for callers; the dispatcher never retries.
    pub retries: u32,
}

impl Options {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    /// Read `VORTEX_BASE_URL`, `VORTEX_TIMEOUT_MS` and `VORTEX_RETRIES`.
    /// Unset variables keep their defaults.
    pub fn from_env() -> Result<Self, ClientError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ClientError> {
        let mut options = Options::new(lookup(BASE_URL_VAR).unwrap_or_default());
        if let Some(raw) = lookup(TIMEOUT_MS_VAR) {
            let millis: u64 = raw.trim().parse().map_err(|e: std::num::ParseIntError| ClientError::ConfigError {
                key: TIMEOUT_MS_VAR,
                reason: e.to_string(),
            })?;
            options.timeout = Some(Duration::from_millis(millis));
        }
        if let Some(raw) = lookup(RETRIES_VAR) {
            options.retries = raw.trim().parse().map_err(|e: std::num::ParseIntError| ClientError::ConfigError {
                key: RETRIES_VAR,
                reason: e.to_string(),
            })?;
        }
        Ok(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn builder_sets_fields() {
        let options = Options::new("http://localhost:3000")
            .timeout(Duration::from_secs(5))
            .retries(3);
        assert_eq!(options.base_url, "http://localhost:3000");
        assert_eq!(options.timeout, Some(Duration::from_secs(5)));
        assert_eq!(options.retries, 3);
    }

    #[test]
    fn reads_all_variables() {
        let options = Options::from_lookup(lookup(&[
            (BASE_URL_VAR, "http://api.local"),
            (TIMEOUT_MS_VAR, "1500"),
            (RETRIES_VAR, "2"),
        ]))
        .unwrap();
        assert_eq!(options.base_url, "http://api.local");
        assert_eq!(options.timeout, Some(Duration::from_millis(1500)));
        assert_eq!(options.retries, 2);
    }

    #[test]
    fn missing_variables_use_defaults() {
        let options = Options::from_lookup(lookup(&[])).unwrap();
        assert_eq!(options, Options::default());
    }

    #[test]
    fn bad_timeout_is_config_error() {
        let err = Options::from_lookup(lookup(&[(TIMEOUT_MS_VAR, "soon")])).unwrap_err();
        assert!(matches!(err, ClientError::ConfigError { key: TIMEOUT_MS_VAR, .. }));
    }

    #[test]
    fn bad_retries_is_config_error() {
        let err = Options::from_lookup(lookup(&[(RETRIES_VAR, "-1")])).unwrap_err();
        assert!(matches!(err, ClientError::ConfigError { key: RETRIES_VAR, .. }));
    }
}
