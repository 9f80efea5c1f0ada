//! `mirrorwatch-tui`: live terminal dashboard for Linux mirror tests.
//!
//! Shows one card per monitored repository and keeps the board in sync
//! with the backend: a full pull at startup, pushed snapshots over the
//! live channel, periodic polling if that channel fails, and `t` to
//! trigger a new test run.
//!
//! Logs are written to a file (default `/tmp/mirrorwatch-tui.log`) to
//! avoid corrupting the terminal UI.

mod action;
mod app;
mod component;
mod data_bridge;
mod event;
mod screens;
mod theme;
mod tui;
mod widgets;

use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::Result;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use mirrorwatch_config::{Config, DurationSetting};
use mirrorwatch_core::DashboardConfig;

use crate::app::App;

/// Terminal dashboard for Linux mirror test results.
#[derive(Parser, Debug)]
#[command(name = "mirrorwatch-tui", version, about)]
struct Cli {
    /// Backend base URL (e.g., http://localhost:8000)
    #[arg(short = 's', long, env = "MIRRORWATCH_SERVER")]
    server: Option<String>,

    /// Fallback polling period (e.g., 5s, 1m)
    #[arg(long, env = "MIRRORWATCH_POLL_INTERVAL")]
    poll_interval: Option<String>,

    /// Accept invalid TLS certificates
    #[arg(short = 'k', long)]
    insecure: bool,

    /// Config file path (defaults to the platform config directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log file path
    #[arg(long, default_value = "/tmp/mirrorwatch-tui.log")]
    log_file: PathBuf,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Set up file-based tracing. We MUST NOT log to stdout/stderr: that would
/// corrupt the TUI output. The returned guard flushes logs on drop.
fn setup_tracing(cli: &Cli) -> WorkerGuard {
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "mirrorwatch_tui={log_level},mirrorwatch_core={log_level},mirrorwatch_api={log_level}"
        ))
    });

    let log_dir = cli
        .log_file
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(std::path::Path::new("."));
    let log_filename = cli
        .log_file
        .file_name()
        .unwrap_or(std::ffi::OsStr::new("mirrorwatch-tui.log"));

    let file_appender = tracing_appender::rolling::never(log_dir, log_filename);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true),
        )
        .init();

    guard
}

/// Config file + environment, then CLI flags on top.
fn resolve_config(cli: &Cli) -> Result<DashboardConfig> {
    let mut config: Config = match &cli.config {
        Some(path) => mirrorwatch_config::load_config_from(path)?,
        None => mirrorwatch_config::load_config()?,
    };

    if let Some(ref server) = cli.server {
        config.server.clone_from(server);
    }
    if let Some(ref interval) = cli.poll_interval {
        config.poll_interval = DurationSetting::Text(interval.clone());
    }
    if cli.insecure {
        config.insecure = true;
    }

    Ok(config.to_dashboard_config()?)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Install panic/error hooks BEFORE entering the terminal
    tui::install_hooks()?;

    let _log_guard = setup_tracing(&cli);

    let config = resolve_config(&cli)?;
    info!(
        server = %config.url,
        poll_interval = ?config.poll_interval,
        "starting mirrorwatch-tui"
    );

    let mut app = App::new(config);
    app.run().await?;

    Ok(())
}
