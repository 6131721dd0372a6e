use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_BANNER_TTL_SECS: u64 = 3;
pub const DEFAULT_LOG_LEVEL: &str = "warn";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    pub ui: UiConfig,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// How long a success banner stays up before it clears itself.
    pub banner_ttl_secs: u64,
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl UiConfig {
    pub fn banner_ttl(&self) -> Duration {
        Duration::from_secs(self.banner_ttl_secs)
    }
}

impl Config {
    pub fn load() -> crate::Result<Self> {
        // Load environment variables from .env file if it exists
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> crate::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = Config {
            api: ApiConfig {
                base_url: lookup("JOB_PORTAL_API_URL")
                    .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
                timeout_secs: lookup("JOB_PORTAL_API_TIMEOUT_SECS")
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_TIMEOUT_SECS),
            },
            ui: UiConfig {
                banner_ttl_secs: lookup("JOB_PORTAL_BANNER_TTL_SECS")
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_BANNER_TTL_SECS),
            },
            log_level: lookup("JOB_PORTAL_LOG").unwrap_or_else(default_log_level),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn with_api_url(mut self, base_url: impl Into<String>) -> crate::Result<Self> {
        self.api.base_url = base_url.into();
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> crate::Result<()> {
        let parsed = url::Url::parse(&self.api.base_url).map_err(|e| {
            crate::Error::Config(format!(
                "JOB_PORTAL_API_URL '{}' is not a valid URL: {}",
                self.api.base_url, e
            ))
        })?;

        match parsed.scheme() {
            "http" | "https" => {}
            other => {
                return Err(crate::Error::Config(format!(
                    "JOB_PORTAL_API_URL must use http or https, got '{}'",
                    other
                )))
            }
        }

        if self.api.timeout_secs == 0 {
            tracing::warn!("JOB_PORTAL_API_TIMEOUT_SECS is 0, requests will not time out");
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig {
                base_url: DEFAULT_API_URL.to_string(),
                timeout_secs: DEFAULT_TIMEOUT_SECS,
            },
            ui: UiConfig {
                banner_ttl_secs: DEFAULT_BANNER_TTL_SECS,
            },
            log_level: default_log_level(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = Config::from_lookup(|_| None).unwrap();
        assert_eq!(config.api.base_url, "http://localhost:5000/api");
        assert_eq!(config.api.timeout(), Duration::from_secs(10));
        assert_eq!(config.ui.banner_ttl(), Duration::from_secs(3));
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn reads_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("JOB_PORTAL_API_URL", "https://jobs.example.com/api"),
            ("JOB_PORTAL_API_TIMEOUT_SECS", "30"),
            ("JOB_PORTAL_BANNER_TTL_SECS", "5"),
            ("JOB_PORTAL_LOG", "debug"),
        ]))
        .unwrap();
        assert_eq!(config.api.base_url, "https://jobs.example.com/api");
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.ui.banner_ttl_secs, 5);
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn unparsable_numbers_fall_back() {
        let config = Config::from_lookup(lookup_from(&[("JOB_PORTAL_API_TIMEOUT_SECS", "soon")]))
            .unwrap();
        assert_eq!(config.api.timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn rejects_bad_api_url() {
        let err = Config::from_lookup(lookup_from(&[("JOB_PORTAL_API_URL", "not a url")]))
            .unwrap_err();
        assert!(matches!(err, crate::Error::Config(_)));

        let err = Config::from_lookup(lookup_from(&[("JOB_PORTAL_API_URL", "ftp://host/api")]))
            .unwrap_err();
        assert!(err.to_string().contains("http or https"));
    }

    #[test]
    fn api_url_override_is_validated() {
        let config = Config::default();
        assert!(config.clone().with_api_url("http://127.0.0.1:9000/api").is_ok());
        assert!(config.with_api_url("nope").is_err());
    }
}
