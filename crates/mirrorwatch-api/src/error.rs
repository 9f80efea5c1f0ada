use thiserror::Error;

/// Top-level error type for the `mirrorwatch-api` crate.
///
/// Covers the pull requests (snapshot, trigger), the live WebSocket
/// channel, and payload decoding. `mirrorwatch-core` maps these into
/// its own error type for the CLI path.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend answered with a non-success status code.
    #[error("Backend returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS setup or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Live channel ────────────────────────────────────────────────
    /// WebSocket connect or read failed.
    #[error("Live channel failure: {0}")]
    ChannelFailure(String),

    // ── Data ────────────────────────────────────────────────────────
    /// A pull response body could not be deserialized.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    /// A pushed message was not a usable status payload.
    #[error("Could not decode pushed message: {message}")]
    Decode { message: String },
}

impl Error {
    /// Returns `true` for failures of a pull request (network, HTTP status,
    /// or an unusable response body).
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Transport(_) | Self::Status { .. } | Self::Deserialization { .. }
        )
    }

    /// Returns `true` if the backend could not be reached at all.
    pub fn is_connect(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_connect() || e.is_timeout(),
            Self::ChannelFailure(_) => true,
            _ => false,
        }
    }

    /// HTTP status code, if the backend answered.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
