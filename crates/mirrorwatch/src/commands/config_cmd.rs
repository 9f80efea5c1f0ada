//! `mirrorwatch config`: show where settings come from and their merged values.

use tabled::Tabled;

use crate::cli::{GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::{config, output};

#[derive(Tabled)]
struct SettingRow {
    #[tabled(rename = "Setting")]
    key: &'static str,
    #[tabled(rename = "Value")]
    value: String,
}

pub fn handle(global: &GlobalOpts) -> Result<(), CliError> {
    let path = global
        .config
        .clone()
        .unwrap_or_else(mirrorwatch_config::config_path);
    let settings = config::effective(global)?;

    let rendered = match global.output {
        OutputFormat::Json => {
            let value = serde_json::json!({
                "path": path,
                "exists": path.exists(),
                "settings": settings,
            });
            serde_json::to_string_pretty(&value).map_err(std::io::Error::from)?
        }
        OutputFormat::Table | OutputFormat::Plain => {
            let ca_cert = settings
                .ca_cert
                .as_ref()
                .map_or_else(|| "-".to_owned(), |p| p.display().to_string());
            let rows = vec![
                SettingRow {
                    key: "config file",
                    value: if path.exists() {
                        path.display().to_string()
                    } else {
                        format!("{} (not found)", path.display())
                    },
                },
                SettingRow { key: "server", value: settings.server.clone() },
                SettingRow { key: "poll_interval", value: settings.poll_interval.to_string() },
                SettingRow { key: "timeout", value: settings.timeout.to_string() },
                SettingRow { key: "insecure", value: settings.insecure.to_string() },
                SettingRow { key: "ca_cert", value: ca_cert },
                SettingRow {
                    key: "fallback_on_close",
                    value: settings.fallback_on_close.to_string(),
                },
            ];
            if global.output == OutputFormat::Table {
                output::render_table(&rows)
            } else {
                rows.iter()
                    .map(|r| format!("{} = {}", r.key, r.value))
                    .collect::<Vec<_>>()
                    .join("\n")
            }
        }
    };

    output::print_output(&rendered)?;
    Ok(())
}
