// ── Runtime dashboard configuration ──
//
// Describes *where* the backend lives and how the synchronization loop
// behaves. Never touches disk: the CLI/TUI build a `DashboardConfig`
// (usually via `mirrorwatch-config`) and hand it in.

use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use mirrorwatch_api::transport::{TlsMode, TransportConfig};

pub const DEFAULT_SERVER: &str = "http://localhost:8000";
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(PathBuf),
    /// Skip verification (self-signed lab backends).
    DangerAcceptInvalid,
}

/// Configuration for one dashboard instance.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// Backend base URL (e.g., `http://localhost:8000`). The live channel
    /// URL is derived from it.
    pub url: Url,
    /// TLS verification strategy.
    pub tls: TlsVerification,
    /// Per-request timeout for pull requests.
    pub timeout: Duration,
    /// Fallback polling period once the live channel has failed.
    pub poll_interval: Duration,
    /// Also fall back to polling when the live channel closes cleanly.
    pub fallback_on_close: bool,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            url: Url::parse(DEFAULT_SERVER).expect("default server URL is valid"),
            tls: TlsVerification::default(),
            timeout: DEFAULT_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            fallback_on_close: false,
        }
    }
}

impl DashboardConfig {
    /// Transport settings for the HTTP client.
    pub fn transport(&self) -> TransportConfig {
        TransportConfig {
            tls: match &self.tls {
                TlsVerification::SystemDefaults => TlsMode::System,
                TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
                TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
            },
            timeout: self.timeout,
        }
    }
}
