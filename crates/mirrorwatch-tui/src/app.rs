//! Application core: event loop, action dispatch, status bar.

use std::time::Duration;

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use mirrorwatch_core::{
    ChannelState, DashboardCommand, DashboardConfig, DashboardController, HttpBackend,
};

use crate::action::Action;
use crate::component::Component;
use crate::data_bridge::spawn_data_bridge;
use crate::event::{Event, FrameRates, TerminalEvents};
use crate::screens::status_board::StatusBoard;
use crate::theme;
use crate::tui::DashboardTerminal;

/// How updates currently reach the board.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DeliveryMode {
    #[default]
    Connecting,
    Live,
    /// Live channel closed cleanly and no polling was configured.
    Closed,
    /// Live channel failed; waiting for the fallback to start.
    Failed(String),
    Polling(Duration),
}

/// Top-level application state and event loop.
pub struct App {
    config: DashboardConfig,
    board: StatusBoard,
    running: bool,
    mode: DeliveryMode,
    help_visible: bool,
    /// Command sender into the controller, once it is running.
    commands: Option<mpsc::UnboundedSender<DashboardCommand>>,
    /// Action sender: the data bridge dispatches through this.
    action_tx: mpsc::UnboundedSender<Action>,
    /// Action receiver: main loop drains this.
    action_rx: mpsc::UnboundedReceiver<Action>,
}

impl App {
    pub fn new(config: DashboardConfig) -> Self {
        let (action_tx, action_rx) = mpsc::unbounded_channel();
        Self {
            config,
            board: StatusBoard::new(),
            running: true,
            mode: DeliveryMode::default(),
            help_visible: false,
            commands: None,
            action_tx,
            action_rx,
        }
    }

    /// Run until the user quits. The controller is stopped on the way out.
    pub async fn run(&mut self) -> Result<()> {
        let backend = HttpBackend::new(&self.config)?;
        info!(server = %backend.base_url(), live = %backend.live_url(), "backend configured");

        let mut terminal = DashboardTerminal::start()?;

        let cancel = CancellationToken::new();
        let (controller, updates) = DashboardController::new(backend, &self.config);
        let handle = controller.spawn(cancel.child_token());
        self.commands = Some(handle.commands());
        tokio::spawn(spawn_data_bridge(
            updates,
            self.action_tx.clone(),
            cancel.child_token(),
        ));

        let mut events = TerminalEvents::spawn(FrameRates::default());

        info!("TUI event loop started");

        while self.running {
            let Some(event) = events.next().await else {
                break;
            };

            match event {
                Event::Key(key) => {
                    if let Some(action) = self.handle_key_event(key)? {
                        self.action_tx.send(action)?;
                    }
                }
                Event::Resize(w, h) => self.action_tx.send(Action::Resize(w, h))?,
                Event::Tick => self.action_tx.send(Action::Tick)?,
                Event::Render => self.action_tx.send(Action::Render)?,
            }

            while let Ok(action) = self.action_rx.try_recv() {
                self.process_action(&action)?;

                if let Action::Render = action {
                    terminal.draw(|frame| self.render(frame))?;
                }
            }
        }

        drop(events);
        cancel.cancel();
        handle.stop().await;
        drop(terminal);
        info!("TUI event loop ended");
        Ok(())
    }

    /// Map a key event to an action. Global keys are handled here; the
    /// rest go to the status board.
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if self.help_visible {
            return match key.code {
                KeyCode::Esc | KeyCode::Char('?') => Ok(Some(Action::ToggleHelp)),
                _ => Ok(None),
            };
        }

        match (key.modifiers, key.code) {
            (KeyModifiers::CONTROL, KeyCode::Char('c'))
            | (KeyModifiers::NONE, KeyCode::Char('q')) => return Ok(Some(Action::Quit)),
            (KeyModifiers::NONE, KeyCode::Char('?')) => return Ok(Some(Action::ToggleHelp)),
            (KeyModifiers::NONE, KeyCode::Char('t')) => return Ok(Some(Action::TriggerTest)),
            _ => {}
        }

        self.board.handle_key_event(key)
    }

    /// Process a single action: update app state and propagate to the board.
    fn process_action(&mut self, action: &Action) -> Result<()> {
        match action {
            Action::Quit => self.running = false,

            Action::ToggleHelp => self.help_visible = !self.help_visible,

            Action::TriggerTest => self.request_trigger(),

            Action::ChannelChanged(state) => {
                // Polling never stops, so it outranks later channel news.
                if !matches!(self.mode, DeliveryMode::Polling(_)) {
                    self.mode = match state {
                        ChannelState::Connecting => DeliveryMode::Connecting,
                        ChannelState::Open => DeliveryMode::Live,
                        ChannelState::Closed => DeliveryMode::Closed,
                        ChannelState::Failed(reason) => DeliveryMode::Failed(reason.clone()),
                    };
                }
            }

            Action::PollingStarted(interval) => self.mode = DeliveryMode::Polling(*interval),

            // Render is handled in the main loop, not here
            Action::Render | Action::Tick | Action::Resize(..) => {}

            other => {
                if let Some(follow_up) = self.board.update(other)? {
                    self.action_tx.send(follow_up)?;
                }
            }
        }

        Ok(())
    }

    fn request_trigger(&self) {
        let sent = self
            .commands
            .as_ref()
            .is_some_and(|tx| tx.send(DashboardCommand::TriggerTest).is_ok());
        if sent {
            debug!("manual trigger requested");
        } else {
            warn!("manual trigger ignored: controller not running");
        }
    }

    /// Render the full application frame.
    fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        let [content_area, status_area] =
            Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(area);

        self.board.render(frame, content_area);
        self.render_status_bar(frame, status_area);

        if self.help_visible {
            Self::render_help_overlay(frame, area);
        }
    }

    /// Render the bottom status bar with delivery mode and key hints.
    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let indicator = match &self.mode {
            DeliveryMode::Live => Span::styled("● live", Style::default().fg(theme::SUCCESS_GREEN)),
            DeliveryMode::Connecting => {
                Span::styled("◐ connecting", Style::default().fg(theme::ELECTRIC_YELLOW))
            }
            DeliveryMode::Polling(interval) => Span::styled(
                format!("◐ polling every {}", humantime::format_duration(*interval)),
                Style::default().fg(theme::ELECTRIC_YELLOW),
            ),
            DeliveryMode::Closed => Span::styled("○ closed", Style::default().fg(theme::DIM_WHITE)),
            DeliveryMode::Failed(reason) => Span::styled(
                format!("○ live channel failed: {reason}"),
                Style::default().fg(theme::ERROR_RED),
            ),
        };

        let line = Line::from(vec![
            Span::raw(" "),
            indicator,
            Span::styled(" │ ", theme::key_hint()),
            Span::styled("t", theme::key_hint_key()),
            Span::styled(" trigger test  ", theme::key_hint()),
            Span::styled("?", theme::key_hint_key()),
            Span::styled(" help  ", theme::key_hint()),
            Span::styled("q", theme::key_hint_key()),
            Span::styled(" quit", theme::key_hint()),
        ]);

        frame.render_widget(Paragraph::new(line), area);
    }

    /// Render the help overlay centered on screen.
    fn render_help_overlay(frame: &mut Frame, area: Rect) {
        let help_width = 44u16.min(area.width.saturating_sub(4));
        let help_height = 13u16.min(area.height.saturating_sub(4));

        let x = area.width.saturating_sub(help_width) / 2;
        let y = area.height.saturating_sub(help_height) / 2;
        let help_area = Rect::new(area.x + x, area.y + y, help_width, help_height);

        frame.render_widget(Clear, help_area);

        let block = Block::default()
            .title(" Keyboard Shortcuts ")
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_focused())
            .style(Style::default().bg(theme::BG_DARK));

        let inner = block.inner(help_area);
        frame.render_widget(block, help_area);

        let entry = |key: &'static str, desc: &'static str| {
            Line::from(vec![
                Span::styled(format!("  {key:<10}"), theme::key_hint_key()),
                Span::styled(desc, theme::key_hint()),
            ])
        };

        let help_text = vec![
            Line::from(""),
            entry("t", "Trigger a test run"),
            entry("j/k ↑/↓", "Scroll by row"),
            entry("g/G", "Top / bottom"),
            entry("Ctrl+d/u", "Page down / up"),
            entry("?", "This help"),
            entry("q", "Quit"),
            Line::from(""),
            Line::from(Span::styled("        Esc or ? to close", theme::key_hint())),
        ];

        frame.render_widget(Paragraph::new(help_text), inner);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn app() -> App {
        App::new(DashboardConfig::default())
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn global_keys() {
        let mut app = app();
        assert_eq!(
            app.handle_key_event(key(KeyCode::Char('t'))).unwrap(),
            Some(Action::TriggerTest)
        );
        assert_eq!(
            app.handle_key_event(key(KeyCode::Char('q'))).unwrap(),
            Some(Action::Quit)
        );
        assert_eq!(
            app.handle_key_event(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL))
                .unwrap(),
            Some(Action::Quit)
        );
        // Board keys fall through.
        assert_eq!(
            app.handle_key_event(key(KeyCode::Char('G'))).unwrap(),
            Some(Action::ScrollToBottom)
        );
    }

    #[test]
    fn help_swallows_other_keys() {
        let mut app = app();
        app.process_action(&Action::ToggleHelp).unwrap();
        assert_eq!(app.handle_key_event(key(KeyCode::Char('t'))).unwrap(), None);
        assert_eq!(
            app.handle_key_event(key(KeyCode::Esc)).unwrap(),
            Some(Action::ToggleHelp)
        );
    }

    #[test]
    fn trigger_reaches_controller() {
        let mut app = app();
        let (tx, mut rx) = mpsc::unbounded_channel();
        app.commands = Some(tx);

        app.process_action(&Action::TriggerTest).unwrap();
        assert_eq!(rx.try_recv().unwrap(), DashboardCommand::TriggerTest);
    }

    #[test]
    fn polling_mode_is_sticky() {
        let mut app = app();
        app.process_action(&Action::ChannelChanged(ChannelState::Open))
            .unwrap();
        assert_eq!(app.mode, DeliveryMode::Live);

        app.process_action(&Action::ChannelChanged(ChannelState::Failed(
            "reset".into(),
        )))
        .unwrap();
        app.process_action(&Action::PollingStarted(Duration::from_secs(5)))
            .unwrap();
        app.process_action(&Action::ChannelChanged(ChannelState::Closed))
            .unwrap();
        assert_eq!(app.mode, DeliveryMode::Polling(Duration::from_secs(5)));
    }

    #[test]
    fn quit_stops_the_loop() {
        let mut app = app();
        app.process_action(&Action::Quit).unwrap();
        assert!(!app.running);
    }
}
