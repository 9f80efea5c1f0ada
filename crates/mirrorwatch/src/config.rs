//! Merge the config file and environment with command-line overrides.

use mirrorwatch_config::{Config, DurationSetting};
use mirrorwatch_core::DashboardConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Load file + env settings and apply flags on top, without validating.
pub fn effective(global: &GlobalOpts) -> Result<Config, CliError> {
    let mut config = match &global.config {
        Some(path) => mirrorwatch_config::load_config_from(path)?,
        None => mirrorwatch_config::load_config()?,
    };

    if let Some(ref server) = global.server {
        config.server.clone_from(server);
    }
    if let Some(ref timeout) = global.timeout {
        config.timeout = DurationSetting::Text(timeout.clone());
    }
    if global.insecure {
        config.insecure = true;
    }

    Ok(config)
}

/// Effective settings, validated into what the core client needs.
pub fn resolve(global: &GlobalOpts) -> Result<DashboardConfig, CliError> {
    let config = effective(global)?;
    tracing::debug!(server = %config.server, "resolved configuration");
    Ok(config.to_dashboard_config()?)
}
