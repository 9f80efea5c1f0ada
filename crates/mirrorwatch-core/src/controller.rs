// ── Dashboard controller ──
//
// Owns the synchronization loop: initial pull, live channel, fallback
// polling and manual triggers. Every result is published as a
// `DashboardUpdate`; the UI consumes them in order and never reaches back
// into this task except through `DashboardCommand`.
//
// Lifecycle:
//   1. Initial load (demo snapshot if it fails) -> first paint
//   2. Open the live channel
//   3. Accept commands, channel events and fallback ticks until cancelled

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use mirrorwatch_api::{ChannelEvent, Snapshot};

use crate::backend::StatusBackend;
use crate::config::DashboardConfig;
use crate::demo::demo_snapshot;
use crate::fallback::FallbackScheduler;
use crate::trigger::run_manual_trigger;

// ── Public message types ─────────────────────────────────────────────

/// Where a displayed snapshot came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotSource {
    /// The startup pull.
    Initial,
    /// Built-in sample data (startup pull failed).
    Demo,
    /// Pushed over the live channel.
    Live,
    /// A fallback poll.
    Poll,
    /// Response to a manual trigger.
    Trigger,
}

/// Live channel lifecycle as seen by the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelState {
    Connecting,
    Open,
    Closed,
    Failed(String),
}

/// Everything the controller tells the UI.
#[derive(Debug, Clone, PartialEq)]
pub enum DashboardUpdate {
    /// Replace the displayed list with `records`.
    Snapshot {
        records: Snapshot,
        source: SnapshotSource,
    },
    ChannelState(ChannelState),
    /// Periodic polling has started (it never stops).
    FallbackActivated { interval: Duration },
}

/// Requests from the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardCommand {
    TriggerTest,
}

// ── Controller ───────────────────────────────────────────────────────

/// The synchronization loop for one dashboard.
pub struct DashboardController<B: StatusBackend> {
    backend: B,
    updates: mpsc::UnboundedSender<DashboardUpdate>,
    fallback: FallbackScheduler,
    fallback_on_close: bool,
}

impl<B: StatusBackend> DashboardController<B> {
    /// Build a controller and the queue its updates arrive on.
    pub fn new(
        backend: B,
        config: &DashboardConfig,
    ) -> (Self, mpsc::UnboundedReceiver<DashboardUpdate>) {
        let (updates, rx) = mpsc::unbounded_channel();
        let controller = Self {
            backend,
            updates,
            fallback: FallbackScheduler::new(config.poll_interval),
            fallback_on_close: config.fallback_on_close,
        };
        (controller, rx)
    }

    /// Run the loop on a background task.
    pub fn spawn(self, cancel: CancellationToken) -> DashboardHandle {
        let (commands, command_rx) = mpsc::unbounded_channel();
        let task_cancel = cancel.clone();
        let task = tokio::spawn(self.run(command_rx, task_cancel));
        DashboardHandle {
            commands,
            cancel,
            task,
        }
    }

    /// Run until `cancel` fires or the update consumer goes away.
    pub async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<DashboardCommand>,
        cancel: CancellationToken,
    ) {
        self.initial_load().await;

        let mut channel = self.backend.open_live_channel(cancel.child_token());
        self.publish(DashboardUpdate::ChannelState(ChannelState::Connecting));

        let mut channel_live = true;
        let mut commands_open = true;

        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                () = self.updates.closed() => {
                    debug!("update consumer gone, stopping controller");
                    break;
                }
                event = channel.next_event(), if channel_live => match event {
                    Some(event) => {
                        channel_live = !event.is_terminal();
                        self.handle_channel_event(event);
                    }
                    None => channel_live = false,
                },
                command = commands.recv(), if commands_open => match command {
                    Some(DashboardCommand::TriggerTest) => self.manual_trigger().await,
                    None => commands_open = false,
                },
                () = self.fallback.tick() => self.poll_once().await,
            }
        }

        channel.shutdown();
        debug!("dashboard controller stopped");
    }

    // ── Steps ────────────────────────────────────────────────────────

    async fn initial_load(&mut self) {
        let (records, source) = match self.backend.load_snapshot().await {
            Ok(records) => {
                info!(records = records.len(), "initial snapshot loaded");
                (records, SnapshotSource::Initial)
            }
            Err(e) => {
                warn!(error = %e, "initial snapshot failed, showing demo data");
                (demo_snapshot(), SnapshotSource::Demo)
            }
        };
        self.publish(DashboardUpdate::Snapshot { records, source });
    }

    fn handle_channel_event(&mut self, event: ChannelEvent) {
        match event {
            ChannelEvent::Opened => {
                self.publish(DashboardUpdate::ChannelState(ChannelState::Open));
            }
            ChannelEvent::Snapshot(records) => {
                self.publish(DashboardUpdate::Snapshot {
                    records,
                    source: SnapshotSource::Live,
                });
            }
            ChannelEvent::Failed(reason) => {
                self.publish(DashboardUpdate::ChannelState(ChannelState::Failed(reason)));
                self.start_fallback();
            }
            ChannelEvent::Closed => {
                self.publish(DashboardUpdate::ChannelState(ChannelState::Closed));
                if self.fallback_on_close {
                    self.start_fallback();
                }
            }
        }
    }

    fn start_fallback(&mut self) {
        if self.fallback.activate() {
            let interval = self.fallback.period();
            info!(?interval, "live channel lost, polling for updates");
            self.publish(DashboardUpdate::FallbackActivated { interval });
        }
    }

    async fn poll_once(&mut self) {
        match self.backend.load_snapshot().await {
            Ok(records) => {
                debug!(records = records.len(), "fallback poll");
                self.publish(DashboardUpdate::Snapshot {
                    records,
                    source: SnapshotSource::Poll,
                });
            }
            // Keep the stale view; the next tick retries.
            Err(e) => warn!(error = %e, "fallback poll failed"),
        }
    }

    async fn manual_trigger(&mut self) {
        if let Some(records) = run_manual_trigger(&self.backend).await {
            self.publish(DashboardUpdate::Snapshot {
                records,
                source: SnapshotSource::Trigger,
            });
        }
    }

    fn publish(&self, update: DashboardUpdate) {
        // Ignore send errors -- the loop notices the closed queue next turn
        let _ = self.updates.send(update);
    }
}

// ── Handle ───────────────────────────────────────────────────────────

/// Handle to a spawned [`DashboardController`].
pub struct DashboardHandle {
    commands: mpsc::UnboundedSender<DashboardCommand>,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl DashboardHandle {
    /// Request a manual test run. Returns `false` if the controller is gone.
    pub fn trigger_test(&self) -> bool {
        self.commands.send(DashboardCommand::TriggerTest).is_ok()
    }

    /// A sender the UI can keep for issuing commands.
    pub fn commands(&self) -> mpsc::UnboundedSender<DashboardCommand> {
        self.commands.clone()
    }

    /// Cancel the loop and wait for it to finish.
    pub async fn stop(self) {
        self.cancel.cancel();
        if let Err(e) = self.task.await {
            warn!(error = %e, "dashboard controller task panicked");
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────
