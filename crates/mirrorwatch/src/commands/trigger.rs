//! `mirrorwatch trigger`: start a test run and print the record the backend returns.

use mirrorwatch_core::DashboardConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

pub async fn handle(config: &DashboardConfig, global: &GlobalOpts) -> Result<(), CliError> {
    let record = mirrorwatch_core::trigger_once(config).await?;
    tracing::info!(repo = %record.title(), status = %record.status, "test triggered");

    let color = output::should_color(global.color);
    let rendered = output::render_snapshot(global.output, std::slice::from_ref(&record), color)?;
    output::print_output(&rendered)?;
    Ok(())
}
