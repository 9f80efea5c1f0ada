//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use mirrorwatch_config::ConfigError;
use mirrorwatch_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the backend at {url}")]
    #[diagnostic(
        code(mirrorwatch::connection_failed),
        help(
            "Check that the backend is running and reachable.\n\
             Reason: {reason}\n\
             Point at another server with --server or MIRRORWATCH_SERVER."
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("TLS error: {message}")]
    #[diagnostic(
        code(mirrorwatch::tls_error),
        help("Use --insecure (-k) to accept self-signed certificates, or set ca_cert in the config file.")
    )]
    Tls { message: String },

    // ── Backend ──────────────────────────────────────────────────────
    #[error("Backend error: {message}")]
    #[diagnostic(code(mirrorwatch::backend_error))]
    Backend { message: String },

    #[error("Unexpected response from backend: {message}")]
    #[diagnostic(
        code(mirrorwatch::invalid_response),
        help("Is --server pointing at the mirror testing backend?")
    )]
    InvalidResponse { message: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Configuration error: {message}")]
    #[diagnostic(code(mirrorwatch::config), help("Config file: {path}"))]
    Config { message: String, path: String },

    #[error("Could not write output: {0}")]
    #[diagnostic(code(mirrorwatch::io))]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::Tls { .. } => exit_code::CONNECTION,
            Self::Config { .. } => exit_code::USAGE,
            Self::Backend { .. } | Self::InvalidResponse { .. } | Self::Io(_) => {
                exit_code::GENERAL
            }
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => Self::ConnectionFailed { url, reason },
            CoreError::Tls { message } => Self::Tls { message },
            CoreError::Backend { message, .. } => Self::Backend { message },
            CoreError::InvalidResponse { message } => Self::InvalidResponse { message },
            CoreError::Config { message } => Self::Config {
                message,
                path: mirrorwatch_config::config_path().display().to_string(),
            },
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        Self::Config {
            message: err.to_string(),
            path: mirrorwatch_config::config_path().display().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_errors_exit_7() {
        let err = CliError::from(CoreError::ConnectionFailed {
            url: "http://localhost:8000/".into(),
            reason: "connection refused".into(),
        });
        assert_eq!(err.exit_code(), exit_code::CONNECTION);
    }

    #[test]
    fn backend_errors_exit_1() {
        let err = CliError::from(CoreError::Backend {
            message: "HTTP 500: boom".into(),
            status: Some(500),
        });
        assert_eq!(err.exit_code(), exit_code::GENERAL);
    }
}
