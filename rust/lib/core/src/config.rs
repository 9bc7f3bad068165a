use std::time::Duration;

/// Environment variable holding the base API endpoint.
pub const ENV_API_ENDPOINT: &str = "NETADMIN_API_ENDPOINT";
/// Environment variable overriding the query freshness window (seconds).
pub const ENV_STALE_SECS: &str = "NETADMIN_STALE_SECS";
/// Environment variable overriding the HTTP timeout (seconds).
pub const ENV_TIMEOUT_SECS: &str = "NETADMIN_TIMEOUT_SECS";

/// Runtime configuration of the admin client.
///
/// The base API endpoint is the only externally configured value the
/// data layer needs; the freshness window and timeout have defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminConfig {
    /// Base URL of the REST backend, without trailing slash.
    pub api_endpoint: String,

    /// How long a fetched query stays fresh before the next read refetches.
    pub stale_secs: u64,

    /// Per-request HTTP timeout.
    pub timeout_secs: u64,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            api_endpoint: "http://localhost:8080/api".to_string(),
            stale_secs: 30,
            timeout_secs: 30,
        }
    }
}

impl AdminConfig {
    /// Build from an environment lookup function.
    pub fn from_env_with<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = AdminConfig::default();
        if let Some(v) = lookup(ENV_API_ENDPOINT) {
            config.api_endpoint = normalize_endpoint(&v);
        }
        if let Some(v) = lookup(ENV_STALE_SECS).and_then(|s| s.parse().ok()) {
            config.stale_secs = v;
        }
        if let Some(v) = lookup(ENV_TIMEOUT_SECS).and_then(|s| s.parse().ok()) {
            config.timeout_secs = v;
        }
        config
    }

    /// Build from the process environment.
    pub fn from_env() -> Self {
        Self::from_env_with(|k| std::env::var(k).ok())
    }

    /// Apply command-line overrides on top of `self`.
    ///
    /// Supported flags:
    /// - `--api=URL`
    /// - `--stale=SECS`
    /// - `--timeout=SECS`
    ///
    /// Unparseable numbers are ignored.
    pub fn with_args(mut self, args: &[String]) -> Self {
        for arg in args {
            if let Some(val) = arg.strip_prefix("--api=") {
                self.api_endpoint = normalize_endpoint(val);
            } else if let Some(val) = arg.strip_prefix("--stale=") {
                if let Ok(secs) = val.parse() {
                    self.stale_secs = secs;
                }
            } else if let Some(val) = arg.strip_prefix("--timeout=") {
                if let Ok(secs) = val.parse() {
                    self.timeout_secs = secs;
                }
            }
        }
        self
    }

    /// Parse configuration from command-line arguments only.
    pub fn from_args(args: &[String]) -> Self {
        AdminConfig::default().with_args(args)
    }

    pub fn stale_time(&self) -> Duration {
        Duration::from_secs(self.stale_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn normalize_endpoint(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_args() {
        let args = vec![
            "--api=http://10.0.0.5:3000/api/".to_string(),
            "--stale=5".to_string(),
        ];
        let config = AdminConfig::from_args(&args);
        assert_eq!(config.api_endpoint, "http://10.0.0.5:3000/api");
        assert_eq!(config.stale_secs, 5);
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn test_bad_number_keeps_default() {
        let config = AdminConfig::from_args(&["--timeout=soon".to_string()]);
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn test_env_then_args() {
        let config = AdminConfig::from_env_with(|k| match k {
            ENV_API_ENDPOINT => Some("http://env-host/api".to_string()),
            ENV_STALE_SECS => Some("60".to_string()),
            _ => None,
        })
        .with_args(&["--stale=1".to_string()]);
        assert_eq!(config.api_endpoint, "http://env-host/api");
        assert_eq!(config.stale_secs, 1);
        assert_eq!(config.stale_time(), Duration::from_secs(1));
    }
}
