//! Test status indicator: ✓/✗/⚠/↻/? with color mapping.
//!
//! The mapping is total. Anything the backend invents reads as
//! [`TestStatus::Unknown`] and gets the `?` treatment.

use ratatui::style::{Color, Style};
use ratatui::text::Span;

use mirrorwatch_core::TestStatus;

use crate::theme;

/// Visual class of a status, shared by icons, borders and text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    Success,
    Failure,
    Warning,
    Running,
    Unknown,
}

impl StatusClass {
    pub fn of(status: TestStatus) -> Self {
        match status {
            TestStatus::Success => Self::Success,
            TestStatus::Failure => Self::Failure,
            TestStatus::Partial => Self::Warning,
            TestStatus::Running => Self::Running,
            TestStatus::Unknown => Self::Unknown,
        }
    }

    pub fn color(self) -> Color {
        match self {
            Self::Success => theme::SUCCESS_GREEN,
            Self::Failure => theme::ERROR_RED,
            Self::Warning => theme::ELECTRIC_YELLOW,
            Self::Running => theme::LIGHT_BLUE,
            Self::Unknown => theme::DIM_WHITE,
        }
    }
}

/// Returns the status icon without styling.
pub fn status_char(status: TestStatus) -> &'static str {
    status.icon()
}

pub fn status_style(status: TestStatus) -> Style {
    Style::default().fg(StatusClass::of(status).color())
}

/// Returns a styled `Span` with the status icon.
pub fn status_span(status: TestStatus) -> Span<'static> {
    Span::styled(status_char(status), status_style(status))
}
