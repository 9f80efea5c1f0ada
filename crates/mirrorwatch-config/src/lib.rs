//! Shared configuration for the mirrorwatch CLI and TUI.
//!
//! Layered with figment: built-in defaults, then `config.toml` in the
//! platform config directory, then `MIRRORWATCH_*` environment variables.
//! [`Config::to_dashboard_config`] validates the result and translates it
//! to `mirrorwatch_core::DashboardConfig`.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use mirrorwatch_core::{DashboardConfig, TlsVerification};

pub const ENV_PREFIX: &str = "MIRRORWATCH_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

fn invalid(field: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Validation {
        field: field.into(),
        reason: reason.into(),
    }
}

// ── Durations ───────────────────────────────────────────────────────

/// A duration as written by a human: `"5s"`, `"1m 30s"`, or bare seconds.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum DurationSetting {
    Seconds(u64),
    Text(String),
}

impl DurationSetting {
    fn resolve(&self, field: &str) -> Result<Duration, ConfigError> {
        let duration = match self {
            Self::Seconds(secs) => Duration::from_secs(*secs),
            Self::Text(text) => humantime::parse_duration(text.trim())
                .map_err(|e| invalid(field, format!("{text:?}: {e}")))?,
        };
        if duration.is_zero() {
            return Err(invalid(field, "must be greater than zero"));
        }
        Ok(duration)
    }
}

impl fmt::Display for DurationSetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Seconds(secs) => write!(f, "{secs}s"),
            Self::Text(text) => f.write_str(text),
        }
    }
}

// ── Config ──────────────────────────────────────────────────────────

/// Top-level configuration shared by CLI and TUI.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// Backend base URL. The live channel URL is derived from it.
    pub server: String,

    /// Fallback polling period once the live channel has failed.
    pub poll_interval: DurationSetting,

    /// HTTP request timeout.
    pub timeout: DurationSetting,

    /// Accept invalid TLS certificates.
    #[serde(default)]
    pub insecure: bool,

    /// Path to a custom CA certificate (PEM).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca_cert: Option<PathBuf>,

    /// Start polling when the live channel closes cleanly, too.
    #[serde(default)]
    pub fallback_on_close: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: mirrorwatch_core::config::DEFAULT_SERVER.into(),
            poll_interval: DurationSetting::Text("5s".into()),
            timeout: DurationSetting::Text("30s".into()),
            insecure: false,
            ca_cert: None,
            fallback_on_close: false,
        }
    }
}

impl Config {
    /// Validate and translate to the runtime configuration.
    pub fn to_dashboard_config(&self) -> Result<DashboardConfig, ConfigError> {
        let url = Url::parse(self.server.trim()).map_err(|e| invalid("server", e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid(
                "server",
                format!("expected an http(s) URL, got scheme '{}'", url.scheme()),
            ));
        }

        let tls = if self.insecure {
            TlsVerification::DangerAcceptInvalid
        } else if let Some(ref ca_path) = self.ca_cert {
            TlsVerification::CustomCa(ca_path.clone())
        } else {
            TlsVerification::SystemDefaults
        };

        Ok(DashboardConfig {
            url,
            tls,
            timeout: self.timeout.resolve("timeout")?,
            poll_interval: self.poll_interval.resolve("poll_interval")?,
            fallback_on_close: self.fallback_on_close,
        })
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("org", "mirrorwatch", "mirrorwatch").map_or_else(
        || {
            let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
            p.push(".config");
            p.push("mirrorwatch");
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

// ── Config loading ──────────────────────────────────────────────────

/// The layered provider stack for `path`. A missing file is not an error.
pub fn figment(path: &Path) -> Figment {
    Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX))
}

/// Load the config from the canonical path + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load the config from `path` + environment.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    Ok(figment(path).extract()?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use figment::Jail;
    use pretty_assertions::assert_eq;

    fn load(jail: &Jail) -> Result<Config, figment::Error> {
        load_config_from(&jail.directory().join("config.toml")).map_err(|e| match e {
            ConfigError::Figment(inner) => *inner,
            other => figment::Error::from(other.to_string()),
        })
    }

    #[test]
    fn defaults_without_file_or_env() {
        Jail::expect_with(|jail| {
            let config = load(jail)?;
            assert_eq!(config, Config::default());

            let dashboard = config.to_dashboard_config().unwrap();
            assert_eq!(dashboard.url.as_str(), "http://localhost:8000/");
            assert_eq!(dashboard.poll_interval, Duration::from_secs(5));
            assert_eq!(dashboard.timeout, Duration::from_secs(30));
            assert_eq!(dashboard.tls, TlsVerification::SystemDefaults);
            Ok(())
        });
    }

    #[test]
    fn file_overrides_defaults() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
                    server = "https://mirrors.example.org"
                    poll_interval = "1m 30s"
                    ca_cert = "/etc/mirrorwatch/ca.pem"
                    fallback_on_close = true
                "#,
            )?;

            let dashboard = load(jail)?.to_dashboard_config().unwrap();
            assert_eq!(dashboard.url.scheme(), "https");
            assert_eq!(dashboard.poll_interval, Duration::from_secs(90));
            assert_eq!(
                dashboard.tls,
                TlsVerification::CustomCa(PathBuf::from("/etc/mirrorwatch/ca.pem"))
            );
            assert!(dashboard.fallback_on_close);
            Ok(())
        });
    }

    #[test]
    fn env_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file("config.toml", r#"server = "http://file-host:8000""#)?;
            jail.set_env("MIRRORWATCH_SERVER", "http://env-host:9000");
            jail.set_env("MIRRORWATCH_POLL_INTERVAL", "10");
            jail.set_env("MIRRORWATCH_INSECURE", "true");

            let config = load(jail)?;
            assert_eq!(config.server, "http://env-host:9000");
            assert_eq!(config.poll_interval, DurationSetting::Seconds(10));

            let dashboard = config.to_dashboard_config().unwrap();
            assert_eq!(dashboard.poll_interval, Duration::from_secs(10));
            assert_eq!(dashboard.tls, TlsVerification::DangerAcceptInvalid);
            Ok(())
        });
    }

    #[test]
    fn rejects_non_http_server() {
        let config = Config {
            server: "ftp://mirror.example.org".into(),
            ..Config::default()
        };
        let err = config.to_dashboard_config().unwrap_err();
        assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "server"));
    }

    #[test]
    fn rejects_zero_and_garbage_durations() {
        let zero = Config {
            poll_interval: DurationSetting::Seconds(0),
            ..Config::default()
        };
        assert!(zero.to_dashboard_config().is_err());

        let garbage = Config {
            timeout: DurationSetting::Text("soon".into()),
            ..Config::default()
        };
        let err = garbage.to_dashboard_config().unwrap_err();
        assert!(err.to_string().contains("timeout"), "{err}");
    }

    #[test]
    fn duration_display() {
        assert_eq!(DurationSetting::Seconds(7).to_string(), "7s");
        assert_eq!(DurationSetting::Text("1m".into()).to_string(), "1m");
    }
}
