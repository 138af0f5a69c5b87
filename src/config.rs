use crate::error::AppResult;
use config::{Config, Environment, File};
use serde::Deserialize;
use std::time::Duration;

/// Web server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct WebConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Base used for retrieval links. Falls back to the request's Host header.
    #[serde(default)]
    pub public_url: Option<String>,
    /// Directory served for every non-API path
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_static_dir() -> String {
    "static".to_string()
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            public_url: None,
            static_dir: default_static_dir(),
        }
    }
}

/// Secret lifetime and size policy
#[derive(Debug, Deserialize, Clone)]
pub struct SecretsConfig {
    /// TTL applied when the caller does not ask for one
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
    /// Upper bound for caller-requested TTLs
    #[serde(default = "default_max_ttl_secs")]
    pub max_ttl_secs: u64,
    /// Background sweep period. 0 disables the sweeper.
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
    #[serde(default = "default_max_payload_bytes")]
    pub max_payload_bytes: usize,
}

fn default_ttl_secs() -> u64 {
    3600
}

fn default_max_ttl_secs() -> u64 {
    86_400
}

fn default_sweep_interval_secs() -> u64 {
    60
}

fn default_max_payload_bytes() -> usize {
    64 * 1024
}

impl Default for SecretsConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
            max_ttl_secs: default_max_ttl_secs(),
            sweep_interval_secs: default_sweep_interval_secs(),
            max_payload_bytes: default_max_payload_bytes(),
        }
    }
}

impl SecretsConfig {
    /// Default TTL, never shorter than one second.
    pub fn default_ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs.max(1))
    }

    /// Clamp a requested TTL into `1..=max_ttl_secs`, or use the default.
    pub fn resolve_ttl(&self, requested_secs: Option<u64>) -> Duration {
        match requested_secs {
            Some(secs) => Duration::from_secs(secs.clamp(1, self.max_ttl_secs.max(1))),
            None => self.default_ttl(),
        }
    }

    pub fn sweep_interval(&self) -> Option<Duration> {
        (self.sweep_interval_secs > 0).then(|| Duration::from_secs(self.sweep_interval_secs))
    }
}

/// Root application configuration
#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub web: WebConfig,
    #[serde(default)]
    pub secrets: SecretsConfig,
}

impl AppConfig {
    /// Load configuration from files and environment variables
    pub fn load() -> AppResult<Self> {
        let config = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., BURNLINK_WEB__PORT, BURNLINK_SECRETS__TTL_SECS
            .add_source(
                Environment::with_prefix("BURNLINK")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }
}

impl WebConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Retrieval link for `key`, rooted at `public_url` or the given host.
    pub fn secret_url(&self, host: Option<&str>, key: &str) -> String {
        let base = match (&self.public_url, host) {
            (Some(url), _) => url.trim_end_matches('/').to_string(),
            (None, Some(host)) => format!("http://{}", host),
            (None, None) => format!("http://{}", self.bind_addr()),
        };
        format!("{}/secret/{}", base, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_url_prefers_public_url() {
        let config = WebConfig {
            public_url: Some("https://burn.example.com/".to_string()),
            ..Default::default()
        };
        assert_eq!(
            config.secret_url(Some("internal:8080"), "abc"),
            "https://burn.example.com/secret/abc"
        );
    }

    #[test]
    fn test_secret_url_from_host_header() {
        let config = WebConfig::default();
        assert_eq!(
            config.secret_url(Some("localhost:8080"), "abc"),
            "http://localhost:8080/secret/abc"
        );
        assert_eq!(
            config.secret_url(None, "abc"),
            "http://0.0.0.0:8080/secret/abc"
        );
    }

    #[test]
    fn test_resolve_ttl() {
        let config = SecretsConfig::default();
        assert_eq!(config.resolve_ttl(None), Duration::from_secs(3600));
        assert_eq!(config.resolve_ttl(Some(0)), Duration::from_secs(1));
        assert_eq!(config.resolve_ttl(Some(120)), Duration::from_secs(120));
        assert_eq!(
            config.resolve_ttl(Some(u64::MAX)),
            Duration::from_secs(86_400)
        );
    }

    #[test]
    fn test_zero_default_ttl_is_clamped() {
        let config = SecretsConfig {
            ttl_secs: 0,
            ..Default::default()
        };
        assert_eq!(config.default_ttl(), Duration::from_secs(1));
        assert_eq!(config.resolve_ttl(None), Duration::from_secs(1));
    }

    #[test]
    fn test_env_overrides_use_single_underscore_prefix() {
        // Only test in this crate that touches BURNLINK_* variables
        std::env::set_var("BURNLINK_SECRETS__TTL_SECS", "120");
        std::env::set_var("BURNLINK_WEB__PORT", "9999");
        let loaded = AppConfig::load();
        std::env::remove_var("BURNLINK_SECRETS__TTL_SECS");
        std::env::remove_var("BURNLINK_WEB__PORT");

        let config = loaded.unwrap();
        assert_eq!(config.secrets.ttl_secs, 120);
        assert_eq!(config.web.port, 9999);
    }

    #[test]
    fn test_sweep_interval_disabled_at_zero() {
        let config = SecretsConfig {
            sweep_interval_secs: 0,
            ..Default::default()
        };
        assert_eq!(config.sweep_interval(), None);
        assert_eq!(
            SecretsConfig::default().sweep_interval(),
            Some(Duration::from_secs(60))
        );
    }
}
