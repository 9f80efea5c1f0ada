//! Output formatting: table, JSON and plain renderers for test records.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use mirrorwatch_core::{StatusRecord, TestDetails, TestStatus, fmt_secs, fmt_total};

use crate::cli::{ColorMode, OutputFormat};

// ── Color detection ──────────────────────────────────────────────────

pub fn should_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

// ── Status glyphs ────────────────────────────────────────────────────

fn paint(text: &str, status: TestStatus, color: bool) -> String {
    if !color {
        return text.to_owned();
    }
    match status {
        TestStatus::Success => text.green().to_string(),
        TestStatus::Failure => text.red().to_string(),
        TestStatus::Partial => text.yellow().to_string(),
        TestStatus::Running => text.cyan().to_string(),
        TestStatus::Unknown => text.dimmed().to_string(),
    }
}

// ── Grouping ─────────────────────────────────────────────────────────

/// Records grouped by distribution, groups in first-seen order and
/// records in backend order within each group.
pub fn group_by_distribution(records: &[StatusRecord]) -> Vec<(&str, Vec<&StatusRecord>)> {
    let mut groups: Vec<(&str, Vec<&StatusRecord>)> = Vec::new();
    for record in records {
        match groups
            .iter_mut()
            .find(|(name, _)| *name == record.distribution)
        {
            Some((_, members)) => members.push(record),
            None => groups.push((record.distribution.as_str(), vec![record])),
        }
    }
    groups
}

// ── Table rows ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct RecordRow {
    #[tabled(rename = "Distribution")]
    distribution: String,
    #[tabled(rename = "Version")]
    version: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Duration")]
    duration: String,
    #[tabled(rename = "Stages")]
    stages: String,
    #[tabled(rename = "Repository")]
    repository: String,
    #[tabled(rename = "Error")]
    error: String,
}

/// Compact stage summary, e.g. `✓ conn  ✓ upd  ✗ inst`.
fn stage_summary(details: Option<&TestDetails>, color: bool) -> String {
    let Some(details) = details else {
        return "-".into();
    };
    let short = ["conn", "upd", "inst"];
    details
        .stages()
        .iter()
        .zip(short)
        .map(|((_, stage), label)| {
            let status = stage.test_status();
            format!("{} {label}", paint(status.icon(), status, color))
        })
        .collect::<Vec<_>>()
        .join("  ")
}

fn record_row(record: &StatusRecord, show_distribution: bool, color: bool) -> RecordRow {
    RecordRow {
        distribution: if show_distribution {
            record.distribution.clone()
        } else {
            String::new()
        },
        version: record.version.clone(),
        status: paint(
            &format!("{} {}", record.status.icon(), record.status),
            record.status,
            color,
        ),
        duration: fmt_total(record.duration()),
        stages: stage_summary(record.test_details.as_ref(), color),
        repository: record.repository.clone(),
        error: record.error().unwrap_or("").to_owned(),
    }
}

pub fn render_table<T: Tabled>(rows: &[T]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

// ── Plain rendering ──────────────────────────────────────────────────

fn render_plain(records: &[StatusRecord], color: bool) -> String {
    let mut out = Vec::new();
    for (distribution, members) in group_by_distribution(records) {
        out.push(distribution.to_owned());
        for record in members {
            let duration = record
                .duration()
                .map(|d| format!("  {}", fmt_secs(d)))
                .unwrap_or_default();
            out.push(format!(
                "  {} {}  {}{duration}  {}",
                paint(record.status.icon(), record.status, color),
                record.version,
                record.status,
                record.repository,
            ));
            if let Some(details) = &record.test_details {
                for (label, stage) in details.stages() {
                    let status = stage.test_status();
                    let mut line = format!(
                        "      {} {label}: {} ({})",
                        paint(status.icon(), status, color),
                        stage.status,
                        fmt_secs(stage.duration),
                    );
                    if let Some(err) = stage.error.as_deref().filter(|e| !e.is_empty()) {
                        line.push_str(&format!(" - {err}"));
                    }
                    out.push(line);
                }
            }
            if let Some(err) = record.error() {
                out.push(format!("      error: {err}"));
            }
        }
    }
    out.join("\n")
}

// ── Dispatch ─────────────────────────────────────────────────────────

/// Render records in the chosen format. An empty snapshot renders as a
/// short notice (or `[]` for JSON).
pub fn render_snapshot(
    format: OutputFormat,
    records: &[StatusRecord],
    color: bool,
) -> Result<String, io::Error> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(records)?),
        _ if records.is_empty() => Ok("No test results yet.".into()),
        OutputFormat::Table => {
            let rows: Vec<RecordRow> = group_by_distribution(records)
                .into_iter()
                .flat_map(|(_, members)| {
                    members
                        .into_iter()
                        .enumerate()
                        .map(move |(i, record)| record_row(record, i == 0, color))
                })
                .collect();
            Ok(render_table(&rows))
        }
        OutputFormat::Plain => Ok(render_plain(records, color)),
    }
}

pub fn print_output(rendered: &str) -> Result<(), io::Error> {
    if rendered.is_empty() {
        return Ok(());
    }
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{rendered}")
}
