// ── Core error types ──
//
// User-facing errors from mirrorwatch-core. The synchronization loop never
// surfaces these (every failure there degrades to a stale, demo or polling
// view); they exist for one-shot callers such as the CLI.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach backend at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("TLS error: {message}")]
    Tls { message: String },

    // ── Backend errors ───────────────────────────────────────────────
    #[error("Backend error: {message}")]
    Backend {
        message: String,
        /// HTTP status code (if the backend answered).
        status: Option<u16>,
    },

    #[error("Unexpected response from backend: {message}")]
    InvalidResponse { message: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl CoreError {
    /// Returns `true` if the backend could not be reached.
    pub fn is_connection(&self) -> bool {
        matches!(self, Self::ConnectionFailed { .. } | Self::Tls { .. })
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<mirrorwatch_api::Error> for CoreError {
    fn from(err: mirrorwatch_api::Error) -> Self {
        use mirrorwatch_api::Error as Api;

        match err {
            Api::Transport(ref e) if e.is_connect() || e.is_timeout() => Self::ConnectionFailed {
                url: e.url().map_or_else(|| "(unknown)".into(), ToString::to_string),
                reason: e.to_string(),
            },
            Api::Transport(e) => Self::Backend {
                status: e.status().map(|s| s.as_u16()),
                message: e.to_string(),
            },
            Api::Status { status, body } => Self::Backend {
                message: format!("HTTP {status}: {body}"),
                status: Some(status),
            },
            Api::InvalidUrl(e) => Self::Config {
                message: format!("invalid URL: {e}"),
            },
            Api::Tls(message) => Self::Tls { message },
            Api::ChannelFailure(reason) => Self::ConnectionFailed {
                url: "(live channel)".into(),
                reason,
            },
            Api::Deserialization { message, .. } | Api::Decode { message } => {
                Self::InvalidResponse { message }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_keeps_code() {
        let err = CoreError::from(mirrorwatch_api::Error::Status {
            status: 503,
            body: "maintenance".into(),
        });
        match err {
            CoreError::Backend { status, message } => {
                assert_eq!(status, Some(503));
                assert!(message.contains("maintenance"));
            }
            other => panic!("expected Backend, got {other:?}"),
        }
    }

    #[test]
    fn tls_and_channel_errors_are_connection_errors() {
        assert!(CoreError::from(mirrorwatch_api::Error::Tls("bad cert".into())).is_connection());
        assert!(
            CoreError::from(mirrorwatch_api::Error::ChannelFailure("reset".into())).is_connection()
        );
        assert!(
            !CoreError::from(mirrorwatch_api::Error::Decode {
                message: "not json".into()
            })
            .is_connection()
        );
    }
}
