// Status API HTTP client
//
// Wraps `reqwest::Client` with the backend's URL layout: the snapshot and
// trigger endpoints under `/api/v1/test/test`, and the live channel at
// `/test/ws` on the same host.

use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::models::{Snapshot, StatusRecord};
use crate::transport::TransportConfig;

const STATUS_PATH: &str = "api/v1/test/test";
const LIVE_PATH: &str = "test/ws";

/// HTTP client for the mirror testing backend.
#[derive(Debug, Clone)]
pub struct StatusClient {
    http: reqwest::Client,
    base_url: Url,
}

impl StatusClient {
    /// Create a client for the backend at `base_url` (e.g. `http://localhost:8000`).
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self::with_client(http, base_url))
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self {
            http,
            base_url: normalize_base(base_url),
        }
    }

    /// Convenience constructor from a URL string.
    pub fn from_reqwest(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        Ok(Self::with_client(http, Url::parse(base_url)?))
    }

    /// The backend base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builders ─────────────────────────────────────────────────

    fn status_url(&self) -> Result<Url, Error> {
        Ok(self.base_url.join(STATUS_PATH)?)
    }

    /// The live channel URL: same host, `ws` for `http` and `wss` for `https`.
    pub fn live_url(&self) -> Result<Url, Error> {
        live_channel_url(&self.base_url)
    }

    // ── Endpoints ────────────────────────────────────────────────────

    /// Fetch the full current status list.
    pub async fn load_snapshot(&self) -> Result<Snapshot, Error> {
        let url = self.status_url()?;
        debug!("GET {}", url);

        let resp = self.http.get(url).send().await?;
        parse_json(resp).await
    }

    /// Ask the backend to start a new test run.
    ///
    /// Sends no body; the response describes the triggered run, which may
    /// still be `running`.
    pub async fn trigger_test(&self) -> Result<StatusRecord, Error> {
        let url = self.status_url()?;
        debug!("POST {}", url);

        let resp = self.http.post(url).send().await?;
        parse_json(resp).await
    }
}

/// Derive the WebSocket endpoint from an HTTP base URL.
fn live_channel_url(base: &Url) -> Result<Url, Error> {
    let scheme = if base.scheme() == "https" { "wss" } else { "ws" };
    let host = base
        .host_str()
        .ok_or_else(|| Error::InvalidUrl(url::ParseError::EmptyHost))?;
    let authority = match base.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_owned(),
    };
    Ok(Url::parse(&format!("{scheme}://{authority}/{LIVE_PATH}"))?)
}

/// Make sure the base path ends with `/` so `Url::join` appends instead of
/// replacing the last segment.
fn normalize_base(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

/// Check the status code, then deserialize the body as JSON.
async fn parse_json<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
    let status = resp.status();
    let body = resp.text().await?;

    if !status.is_success() {
        return Err(Error::Status {
            status: status.as_u16(),
            body,
        });
    }

    serde_json::from_str(&body).map_err(|e| Error::Deserialization {
        message: e.to_string(),
        body,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn live_url_follows_scheme() {
        assert_eq!(
            live_channel_url(&url("http://localhost:8000")).unwrap().as_str(),
            "ws://localhost:8000/test/ws"
        );
        assert_eq!(
            live_channel_url(&url("https://mirrors.example.org/dashboard/")).unwrap().as_str(),
            "wss://mirrors.example.org/test/ws"
        );
    }

    #[test]
    fn status_url_keeps_base_path() {
        let client = StatusClient::with_client(reqwest::Client::new(), url("http://host/proxy"));
        assert_eq!(client.base_url().as_str(), "http://host/proxy/");
        assert_eq!(
            client.status_url().unwrap().as_str(),
            "http://host/proxy/api/v1/test/test"
        );
    }
}
