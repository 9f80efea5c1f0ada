//! Terminal input for the dashboard.
//!
//! A background task merges crossterm key/resize events with two clocks:
//! a slow tick that ages the "last update" stamp and a render tick that
//! redraws the board.

use std::time::Duration;

use crossterm::event::{Event as CrosstermEvent, EventStream, KeyEvent, KeyEventKind};
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio::time::{Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Key(KeyEvent),
    /// Terminal was resized to (cols, rows).
    Resize(u16, u16),
    Tick,
    Render,
}

/// Clock rates for [`TerminalEvents`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameRates {
    pub tick: Duration,
    pub render: Duration,
}

impl Default for FrameRates {
    fn default() -> Self {
        Self {
            tick: Duration::from_millis(250),
            render: Duration::from_millis(33),
        }
    }
}

/// Keep key presses and resizes; everything else (releases, repeats,
/// mouse, focus, paste) is dropped.
fn translate(event: CrosstermEvent) -> Option<Event> {
    match event {
        CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => Some(Event::Key(key)),
        CrosstermEvent::Resize(cols, rows) => Some(Event::Resize(cols, rows)),
        _ => None,
    }
}

fn clock(period: Duration) -> Interval {
    let mut interval = tokio::time::interval(period);
    // A stalled frame should not be followed by a burst of redraws.
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    interval
}

/// Input stream for the app loop. Stops its task when dropped.
pub struct TerminalEvents {
    rx: mpsc::UnboundedReceiver<Event>,
    cancel: CancellationToken,
}

impl TerminalEvents {
    pub fn spawn(rates: FrameRates) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        tokio::spawn(read_terminal(tx, rates, cancel.clone()));
        Self { rx, cancel }
    }

    /// `None` once the reader task has stopped.
    pub async fn next(&mut self) -> Option<Event> {
        self.rx.recv().await
    }
}

impl Drop for TerminalEvents {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn read_terminal(
    tx: mpsc::UnboundedSender<Event>,
    rates: FrameRates,
    cancel: CancellationToken,
) {
    let mut input = EventStream::new();
    let mut tick = clock(rates.tick);
    let mut render = clock(rates.render);

    loop {
        let event = tokio::select! {
            () = cancel.cancelled() => break,
            _ = tick.tick() => Event::Tick,
            _ = render.tick() => Event::Render,
            Some(Ok(raw)) = input.next() => match translate(raw) {
                Some(event) => event,
                None => continue,
            },
        };
        if tx.send(event).is_err() {
            break;
        }
    }
}
