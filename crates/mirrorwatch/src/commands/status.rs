//! `mirrorwatch status`: fetch the current snapshot once and print it.

use mirrorwatch_core::DashboardConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

pub async fn handle(config: &DashboardConfig, global: &GlobalOpts) -> Result<(), CliError> {
    let records = mirrorwatch_core::fetch_snapshot(config).await?;
    tracing::info!(count = records.len(), "snapshot loaded");

    let color = output::should_color(global.color);
    let rendered = output::render_snapshot(global.output, &records, color)?;
    output::print_output(&rendered)?;
    Ok(())
}
