//! Status board screen: one card per monitored repository.
//!
//! Layout:
//! ┌─ Mirror Status ───────────────────────────────────────────────────┐
//! │ 3 targets  ✓ 1  ✗ 1  ⚠ 0  ↻ 1  ? 0                                │
//! │ Last updated 12:00:05 · live push                                 │
//! │ ╭ ✓ Debian 8 ─────────╮ ╭ ✗ Ubuntu 20.04 ─────╮ ╭ ↻ Debian 7 ─────╮ │
//! │ │ Repository: …       │ │ Repository: …       │ │ Repository: …   │ │
//! │ │ Overall Status: …   │ │ Overall Status: …   │ │ …               │ │
//! │ ╰─────────────────────╯ ╰─────────────────────╯ ╰─────────────────╯ │
//! └───────────────────────────────────────────────────────────────────┘
//!
//! Every snapshot throws away all cards and builds new ones. Nothing is
//! merged or diffed, and the board owns no network state.

use std::cell::Cell;

use chrono::{DateTime, Local};
use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Block, BorderType, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState, Wrap,
};

use mirrorwatch_core::{SnapshotSource, StatusRecord, TestStatus, fmt_secs, fmt_total};

use crate::action::Action;
use crate::component::Component;
use crate::theme;
use crate::widgets::status_indicator::{StatusClass, status_span, status_style};

/// Terminal width at which the grid grows to two and three columns.
const TWO_COLUMNS_AT: u16 = 100;
const THREE_COLUMNS_AT: u16 = 150;

// ── Cards ───────────────────────────────────────────────────────────

/// Pre-rendered view of one [`StatusRecord`].
#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    pub title: String,
    pub status: TestStatus,
    pub lines: Vec<Line<'static>>,
}

impl Card {
    pub fn from_record(record: &StatusRecord) -> Self {
        let mut lines = vec![
            field("Repository", Span::styled(record.repository.clone(), theme::value())),
            field(
                "Overall Status",
                Span::styled(record.status.to_string(), status_style(record.status)),
            ),
            field(
                "Total Duration",
                Span::styled(fmt_total(record.duration()), theme::value()),
            ),
        ];

        if let Some(details) = &record.test_details {
            for (stage, result) in details.stages() {
                lines.push(Line::from(vec![
                    Span::styled(format!("{stage}: "), theme::label()),
                    Span::styled(result.status.clone(), status_style(result.test_status())),
                    Span::styled(format!(" ({})", fmt_secs(result.duration)), theme::value()),
                ]));
                if let Some(err) = result.error.as_deref().filter(|e| !e.is_empty()) {
                    lines.push(Line::from(Span::styled(format!("  ↳ {err}"), error_style())));
                }
            }
        }

        if let Some(err) = record.error() {
            lines.push(Line::from(vec![
                Span::styled("Error: ", error_style().add_modifier(Modifier::BOLD)),
                Span::styled(err.to_owned(), error_style()),
            ]));
        }

        Self {
            title: record.title(),
            status: record.status,
            lines,
        }
    }

    /// Rows needed at `width` columns, border included, once long lines
    /// have wrapped.
    pub fn height(&self, width: u16) -> u16 {
        let inner = width.saturating_sub(2).max(1);
        let wrapped = self.body().line_count(inner);
        u16::try_from(wrapped)
            .unwrap_or(u16::MAX)
            .saturating_add(2)
    }

    fn body(&self) -> Paragraph<'static> {
        Paragraph::new(self.lines.clone()).wrap(Wrap { trim: false })
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(StatusClass::of(self.status).color()))
            .title(Line::from(vec![
                Span::raw(" "),
                status_span(self.status),
                Span::raw(" "),
                Span::styled(self.title.clone(), theme::title_style()),
                Span::raw(" "),
            ]));

        frame.render_widget(self.body().block(block), area);
    }
}

fn field(label: &str, value: Span<'static>) -> Line<'static> {
    Line::from(vec![Span::styled(format!("{label}: "), theme::label()), value])
}

fn error_style() -> Style {
    Style::default().fg(theme::ERROR_RED)
}

fn columns_for(width: u16) -> usize {
    if width >= THREE_COLUMNS_AT {
        3
    } else if width >= TWO_COLUMNS_AT {
        2
    } else {
        1
    }
}

fn source_label(source: SnapshotSource) -> &'static str {
    match source {
        SnapshotSource::Initial => "initial load",
        SnapshotSource::Demo => "demo data (backend unreachable)",
        SnapshotSource::Live => "live push",
        SnapshotSource::Poll => "poll",
        SnapshotSource::Trigger => "manual trigger",
    }
}

// ── StatusBoard ─────────────────────────────────────────────────────

/// The Renderer: turns the latest snapshot into a grid of cards.
pub struct StatusBoard {
    cards: Vec<Card>,
    last_updated: Option<DateTime<Local>>,
    source: Option<SnapshotSource>,
    /// First visible grid row.
    scroll_row: usize,
    /// Grid columns and visible rows from the last draw (for scrolling).
    columns: Cell<usize>,
    visible_rows: Cell<usize>,
}

impl Default for StatusBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusBoard {
    pub fn new() -> Self {
        Self {
            cards: Vec::new(),
            last_updated: None,
            source: None,
            scroll_row: 0,
            columns: Cell::new(1),
            visible_rows: Cell::new(1),
        }
    }

    /// Replace every card with the given snapshot and stamp the wall clock.
    pub fn render_snapshot(&mut self, records: &[StatusRecord]) {
        self.render_snapshot_at(records, Local::now());
    }

    /// [`render_snapshot`](Self::render_snapshot) with an explicit clock.
    pub fn render_snapshot_at(&mut self, records: &[StatusRecord], now: DateTime<Local>) {
        self.cards = records.iter().map(Card::from_record).collect();
        self.last_updated = Some(now);
        self.clamp_scroll();
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn last_updated(&self) -> Option<DateTime<Local>> {
        self.last_updated
    }

    fn row_count(&self) -> usize {
        self.cards.len().div_ceil(self.columns.get().max(1))
    }

    fn clamp_scroll(&mut self) {
        self.scroll_row = self.scroll_row.min(self.row_count().saturating_sub(1));
    }

    fn scroll_down(&mut self, rows: usize) {
        self.scroll_row = self.scroll_row.saturating_add(rows);
        self.clamp_scroll();
    }

    fn scroll_up(&mut self, rows: usize) {
        self.scroll_row = self.scroll_row.saturating_sub(rows);
    }

    // ── Rendering helpers ────────────────────────────────────────────

    fn summary_line(&self) -> Line<'static> {
        let mut spans = vec![Span::styled(
            match self.cards.len() {
                1 => "1 target ".to_owned(),
                n => format!("{n} targets "),
            },
            theme::value().add_modifier(Modifier::BOLD),
        )];
        for status in TestStatus::ALL {
            let count = self.cards.iter().filter(|c| c.status == status).count();
            spans.push(Span::raw(" "));
            spans.push(status_span(status));
            spans.push(Span::styled(format!(" {count}"), theme::value()));
        }
        Line::from(spans)
    }

    fn updated_line(&self) -> Line<'static> {
        let stamp = self.last_updated.map_or_else(
            || "never".to_owned(),
            |t| t.format("%H:%M:%S").to_string(),
        );
        let mut spans = vec![
            Span::styled("Last updated ", theme::label()),
            Span::styled(stamp, theme::value()),
        ];
        if let Some(source) = self.source {
            spans.push(Span::styled(format!(" · {}", source_label(source)), theme::label()));
        }
        Line::from(spans)
    }

    fn render_grid(&self, frame: &mut Frame, area: Rect) {
        let columns = columns_for(area.width);
        self.columns.set(columns);

        if self.cards.is_empty() {
            let empty = Paragraph::new("No test results yet.")
                .style(theme::label())
                .alignment(Alignment::Center);
            frame.render_widget(empty, area);
            self.visible_rows.set(1);
            return;
        }

        let ratio = u32::try_from(columns).unwrap_or(1);
        let rows: Vec<&[Card]> = self.cards.chunks(columns).collect();
        let first = self.scroll_row.min(rows.len().saturating_sub(1));

        // Column widths do not depend on row height.
        let cells = Layout::horizontal(vec![Constraint::Ratio(1, ratio); columns])
            .split(Rect::new(area.x, area.y, area.width, 1));

        let mut y = area.y;
        let mut shown = 0;
        for row in rows.iter().skip(first) {
            if y >= area.bottom() {
                break;
            }
            let height = row
                .iter()
                .zip(cells.iter())
                .map(|(card, cell)| card.height(cell.width))
                .max()
                .unwrap_or(2)
                .min(area.bottom() - y);
            for (card, cell) in row.iter().zip(cells.iter()) {
                card.render(frame, Rect { y, height, ..*cell });
            }
            y = y.saturating_add(height);
            shown += 1;
        }
        self.visible_rows.set(shown.max(1));

        if rows.len() > shown {
            let mut state = ScrollbarState::new(rows.len()).position(first);
            frame.render_stateful_widget(
                Scrollbar::new(ScrollbarOrientation::VerticalRight),
                area,
                &mut state,
            );
        }
    }
}

impl Component for StatusBoard {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let action = match (key.modifiers, key.code) {
            (_, KeyCode::Char('j') | KeyCode::Down) => Action::ScrollDown,
            (_, KeyCode::Char('k') | KeyCode::Up) => Action::ScrollUp,
            (_, KeyCode::Char('g') | KeyCode::Home) => Action::ScrollToTop,
            (_, KeyCode::Char('G') | KeyCode::End) => Action::ScrollToBottom,
            (KeyModifiers::CONTROL, KeyCode::Char('d')) | (_, KeyCode::PageDown) => {
                Action::PageDown
            }
            (KeyModifiers::CONTROL, KeyCode::Char('u')) | (_, KeyCode::PageUp) => Action::PageUp,
            _ => return Ok(None),
        };
        Ok(Some(action))
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::SnapshotReceived { records, source } => {
                self.source = Some(*source);
                self.render_snapshot(records);
            }
            Action::ScrollDown => self.scroll_down(1),
            Action::ScrollUp => self.scroll_up(1),
            Action::ScrollToTop => self.scroll_row = 0,
            Action::ScrollToBottom => self.scroll_down(usize::MAX),
            Action::PageDown => self.scroll_down(self.visible_rows.get()),
            Action::PageUp => self.scroll_up(self.visible_rows.get()),
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(theme::border_focused())
            .title(" Mirror Status ")
            .title_style(theme::title_style());
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let [header, grid] =
            Layout::vertical([Constraint::Length(2), Constraint::Min(0)]).areas(inner);

        frame.render_widget(
            Paragraph::new(vec![self.summary_line(), self.updated_line()]),
            header,
        );
        self.render_grid(frame, grid);
    }
}

// ── Tests ───────────────────────────────────────────────────────────
