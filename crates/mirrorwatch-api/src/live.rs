//! Live status channel over WebSocket.
//!
//! Connects to the backend's `/test/ws` endpoint and forwards every pushed
//! status snapshot as a [`ChannelEvent`] through an mpsc queue. The channel
//! is receive-only: nothing is ever sent to the backend.
//!
//! There is no reconnect loop. A transport error ends the channel with
//! [`ChannelEvent::Failed`]; a clean close ends it with
//! [`ChannelEvent::Closed`]. What happens next is the consumer's call.
//!
//! # Example
//!
//! ```rust,ignore
//! use mirrorwatch_api::live::{ChannelEvent, LiveChannel};
//! use tokio_util::sync::CancellationToken;
//!
//! let url = url::Url::parse("ws://localhost:8000/test/ws")?;
//! let mut channel = LiveChannel::open(url, CancellationToken::new());
//!
//! while let Some(event) = channel.next_event().await {
//!     if let ChannelEvent::Snapshot(records) = event {
//!         println!("{} targets", records.len());
//!     }
//! }
//! ```

use std::time::Duration;

use futures_util::StreamExt;
use tokio::sync::mpsc;
use tokio_tungstenite::{Connector, tungstenite};
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::error::Error;
use crate::models::Snapshot;
use crate::transport::LiveTls;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

// ── ChannelEvent ─────────────────────────────────────────────────────

/// Lifecycle and data events produced by a [`LiveChannel`].
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelEvent {
    /// Handshake succeeded. No data has been received yet.
    Opened,
    /// A pushed payload that decoded as a full status snapshot.
    Snapshot(Snapshot),
    /// Transport-level error while connecting or reading. Terminal.
    Failed(String),
    /// Server close frame or end of stream. Terminal.
    Closed,
}

impl ChannelEvent {
    /// `true` if no further events follow this one.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Failed(_) | Self::Closed)
    }
}

// ── LiveChannel ──────────────────────────────────────────────────────

/// Handle to a running live channel.
///
/// The event queue exists before the reader task starts, so a failure
/// during the handshake is never lost.
pub struct LiveChannel {
    events: mpsc::UnboundedReceiver<ChannelEvent>,
    cancel: CancellationToken,
}

impl LiveChannel {
    /// Spawn the reader task for `url` and return immediately.
    ///
    /// The connection attempt happens asynchronously; the first event is
    /// either [`ChannelEvent::Opened`] or [`ChannelEvent::Failed`].
    pub fn open(url: Url, cancel: CancellationToken) -> Self {
        Self::open_with_tls(url, None, cancel)
    }

    /// Like [`open`](Self::open), with explicit TLS settings for `wss` URLs
    /// (see [`TransportConfig::ws_tls_config`](crate::TransportConfig::ws_tls_config)).
    pub fn open_with_tls(
        url: Url,
        tls: Option<LiveTls>,
        cancel: CancellationToken,
    ) -> Self {
        let (event_tx, events) = mpsc::unbounded_channel();

        let task_cancel = cancel.clone();
        tokio::spawn(async move {
            let connector = tls.map(Connector::Rustls);
            tokio::select! {
                biased;
                () = task_cancel.cancelled() => {}
                () = run_channel(&url, connector, &event_tx) => {}
            }
            tracing::debug!("live channel task exiting");
        });

        Self { events, cancel }
    }

    /// Wrap an existing event queue. Used by alternative transports and tests.
    pub fn from_receiver(
        events: mpsc::UnboundedReceiver<ChannelEvent>,
        cancel: CancellationToken,
    ) -> Self {
        Self { events, cancel }
    }

    /// Wait for the next event. Returns `None` once the reader has stopped
    /// and every queued event was consumed.
    pub async fn next_event(&mut self) -> Option<ChannelEvent> {
        self.events.recv().await
    }

    /// Signal the reader task to stop.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}

impl Drop for LiveChannel {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

// ── Connection lifecycle ─────────────────────────────────────────────

/// Connect once and read until the connection ends, reporting the outcome.
async fn run_channel(
    url: &Url,
    connector: Option<Connector>,
    event_tx: &mpsc::UnboundedSender<ChannelEvent>,
) {
    let terminal = match connect_and_read(url, connector, event_tx).await {
        Ok(()) => ChannelEvent::Closed,
        Err(e) => {
            tracing::warn!(error = %e, url = %url, "live channel failed");
            ChannelEvent::Failed(e.to_string())
        }
    };
    // Ignore send errors -- the consumer is gone
    let _ = event_tx.send(terminal);
}

/// Establish the WebSocket connection and read frames until it drops.
///
/// `Ok(())` means a clean close; `Err` means a transport failure.
async fn connect_and_read(
    url: &Url,
    connector: Option<Connector>,
    event_tx: &mpsc::UnboundedSender<ChannelEvent>,
) -> Result<(), Error> {
    tracing::info!(url = %url, custom_tls = connector.is_some(), "connecting live channel");

    let handshake =
        tokio_tungstenite::connect_async_tls_with_config(url.as_str(), None, false, connector);
    let (ws_stream, _response) = tokio::time::timeout(CONNECT_TIMEOUT, handshake)
        .await
        .map_err(|_| Error::ChannelFailure("handshake timed out".into()))?
        .map_err(|e| Error::ChannelFailure(e.to_string()))?;

    tracing::info!("live channel open");
    let _ = event_tx.send(ChannelEvent::Opened);

    let (_write, mut read) = ws_stream.split();

    while let Some(frame) = read.next().await {
        match frame {
            Ok(tungstenite::Message::Text(text)) => {
                if let Some(snapshot) = handle_text(&text) {
                    let _ = event_tx.send(ChannelEvent::Snapshot(snapshot));
                }
            }
            Ok(tungstenite::Message::Close(frame)) => {
                if let Some(ref cf) = frame {
                    tracing::info!(code = %cf.code, reason = %cf.reason, "live channel close frame");
                } else {
                    tracing::info!("live channel close frame (no payload)");
                }
                return Ok(());
            }
            Ok(tungstenite::Message::Ping(_)) => {
                // tungstenite answers pings itself
                tracing::trace!("live channel ping");
            }
            Ok(_) => {
                // Binary, Pong, raw Frame
            }
            Err(e) => return Err(Error::ChannelFailure(e.to_string())),
        }
    }

    tracing::info!("live channel stream ended");
    Ok(())
}

// ── Message decoding ─────────────────────────────────────────────────

/// Decode a text frame, logging anything that is not a snapshot.
fn handle_text(text: &str) -> Option<Snapshot> {
    match decode_message(text) {
        Ok(Some(snapshot)) => {
            tracing::debug!(records = snapshot.len(), "live snapshot received");
            Some(snapshot)
        }
        Ok(None) => {
            tracing::debug!(payload = %truncate(text), "ignoring non-snapshot payload");
            None
        }
        Err(e) => {
            tracing::debug!(error = %e, payload = %truncate(text), "dropping undecodable message");
            None
        }
    }
}

/// Classify a pushed text message.
///
/// - `Ok(Some(_))`: a JSON array of status records.
/// - `Ok(None)`: valid JSON that is not an array (ignored).
/// - `Err(Error::Decode)`: not JSON, or an array of something else.
pub fn decode_message(text: &str) -> Result<Option<Snapshot>, Error> {
    let value: serde_json::Value =
        serde_json::from_str(text).map_err(|e| Error::Decode { message: e.to_string() })?;

    if !value.is_array() {
        return Ok(None);
    }

    serde_json::from_value(value)
        .map(Some)
        .map_err(|e| Error::Decode { message: e.to_string() })
}

fn truncate(text: &str) -> &str {
    const MAX: usize = 120;
    match text.char_indices().nth(MAX) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

// ── Tests ────────────────────────────────────────────────────────────
