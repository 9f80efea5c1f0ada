//! All possible UI actions. Actions are the sole mechanism for state mutation.

use std::sync::Arc;
use std::time::Duration;

use mirrorwatch_core::{ChannelState, Snapshot, SnapshotSource};

/// Every state transition in the TUI is expressed as an Action.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    // ── Lifecycle ──────────────────────────────────────────────────
    Quit,
    Tick,
    Render,
    Resize(u16, u16),

    // ── Data Events (from the dashboard controller) ───────────────
    SnapshotReceived {
        records: Arc<Snapshot>,
        source: SnapshotSource,
    },
    ChannelChanged(ChannelState),
    PollingStarted(Duration),

    // ── Commands ──────────────────────────────────────────────────
    TriggerTest,

    // ── Help ──────────────────────────────────────────────────────
    ToggleHelp,

    // ── Scrolling ─────────────────────────────────────────────────
    ScrollUp,
    ScrollDown,
    ScrollToTop,
    ScrollToBottom,
    PageUp,
    PageDown,
}
