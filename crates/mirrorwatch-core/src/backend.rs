// ── Backend seam ──
//
// The synchronization loop talks to the backend only through
// `StatusBackend`, so it can be driven by an in-memory fake in tests and by
// `HttpBackend` (reqwest + tokio-tungstenite) everywhere else.

use std::future::Future;

use tokio_util::sync::CancellationToken;
use tracing::warn;
use url::Url;

use mirrorwatch_api::{LiveChannel, LiveTls, Snapshot, StatusClient, StatusRecord};

use crate::config::DashboardConfig;
use crate::error::CoreError;

/// Everything the dashboard needs from the backend.
pub trait StatusBackend: Send + Sync + 'static {
    /// Pull the full current status list.
    fn load_snapshot(&self) -> impl Future<Output = Result<Snapshot, mirrorwatch_api::Error>> + Send;

    /// Start a new test run and return the record describing it.
    fn trigger_test(
        &self,
    ) -> impl Future<Output = Result<StatusRecord, mirrorwatch_api::Error>> + Send;

    /// Open the push channel. Connection happens in the background; the
    /// first event reports whether it succeeded.
    fn open_live_channel(&self, cancel: CancellationToken) -> LiveChannel;
}

// ── HTTP + WebSocket backend ─────────────────────────────────────────

/// The real backend: REST endpoints plus the `/test/ws` live channel.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: StatusClient,
    live_url: Url,
    /// Same trust settings as the HTTP client; `None` for system roots.
    live_tls: Option<LiveTls>,
}

impl HttpBackend {
    pub fn new(config: &DashboardConfig) -> Result<Self, CoreError> {
        let transport = config.transport();
        let client = StatusClient::new(config.url.clone(), &transport)?;
        let live_url = client.live_url()?;
        let live_tls = transport.ws_tls_config()?;
        Ok(Self {
            client,
            live_url,
            live_tls,
        })
    }

    pub fn base_url(&self) -> &Url {
        self.client.base_url()
    }

    pub fn live_url(&self) -> &Url {
        &self.live_url
    }
}

impl StatusBackend for HttpBackend {
    async fn load_snapshot(&self) -> Result<Snapshot, mirrorwatch_api::Error> {
        self.client.load_snapshot().await
    }

    async fn trigger_test(&self) -> Result<StatusRecord, mirrorwatch_api::Error> {
        self.client.trigger_test().await
    }

    fn open_live_channel(&self, cancel: CancellationToken) -> LiveChannel {
        LiveChannel::open_with_tls(self.live_url.clone(), self.live_tls.clone(), cancel)
    }
}

// ── One-shot helpers ─────────────────────────────────────────────────

/// Fetch one snapshot without starting the synchronization loop.
pub async fn fetch_snapshot(config: &DashboardConfig) -> Result<Snapshot, CoreError> {
    let backend = HttpBackend::new(config)?;
    backend.load_snapshot().await.map_err(|e| {
        warn!(error = %e, url = %backend.base_url(), "snapshot request failed");
        CoreError::from(e)
    })
}

/// Trigger one test run without starting the synchronization loop.
pub async fn trigger_once(config: &DashboardConfig) -> Result<StatusRecord, CoreError> {
    let backend = HttpBackend::new(config)?;
    backend.trigger_test().await.map_err(CoreError::from)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::TlsVerification;

    #[test]
    fn live_url_derived_from_base() {
        let config = DashboardConfig {
            url: Url::parse("https://mirrors.example.org:8443/ui").unwrap(),
            ..DashboardConfig::default()
        };
        let backend = HttpBackend::new(&config).unwrap();
        assert_eq!(backend.live_url().as_str(), "wss://mirrors.example.org:8443/test/ws");
        assert_eq!(backend.base_url().as_str(), "https://mirrors.example.org:8443/ui/");
    }

    #[test]
    fn live_channel_shares_tls_settings() {
        let system = HttpBackend::new(&DashboardConfig::default()).unwrap();
        assert!(system.live_tls.is_none());

        let insecure = HttpBackend::new(&DashboardConfig {
            tls: TlsVerification::DangerAcceptInvalid,
            ..DashboardConfig::default()
        })
        .unwrap();
        assert!(insecure.live_tls.is_some());
    }

    #[test]
    fn unreadable_ca_fails_before_connecting() {
        let err = HttpBackend::new(&DashboardConfig {
            tls: TlsVerification::CustomCa("/nonexistent/mirrorwatch-ca.pem".into()),
            ..DashboardConfig::default()
        })
        .unwrap_err();
        assert!(matches!(err, CoreError::Tls { .. }), "{err:?}");
    }
}
