//! Data bridge: connects [`DashboardController`] updates to TUI actions.
//!
//! Runs as a background task, forwarding every [`DashboardUpdate`] as an
//! [`Action`] through the TUI's action channel, in arrival order.
//!
//! [`DashboardController`]: mirrorwatch_core::DashboardController

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use mirrorwatch_core::DashboardUpdate;

use crate::action::Action;

/// Translate one controller update into the action the app applies.
pub fn update_to_action(update: DashboardUpdate) -> Action {
    match update {
        DashboardUpdate::Snapshot { records, source } => Action::SnapshotReceived {
            records: Arc::new(records),
            source,
        },
        DashboardUpdate::ChannelState(state) => Action::ChannelChanged(state),
        DashboardUpdate::FallbackActivated { interval } => Action::PollingStarted(interval),
    }
}

/// Forward controller updates until cancelled or either side goes away.
pub async fn spawn_data_bridge(
    mut updates: mpsc::UnboundedReceiver<DashboardUpdate>,
    action_tx: mpsc::UnboundedSender<Action>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            biased;

            () = cancel.cancelled() => break,

            update = updates.recv() => {
                let Some(update) = update else { break };
                if action_tx.send(update_to_action(update)).is_err() {
                    break;
                }
            }
        }
    }

    debug!("data bridge shut down");
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use mirrorwatch_core::{ChannelState, SnapshotSource, demo_snapshot};

    use super::*;

    #[tokio::test]
    async fn forwards_updates_in_order() {
        let (update_tx, update_rx) = mpsc::unbounded_channel();
        let (action_tx, mut action_rx) = mpsc::unbounded_channel();
        let bridge = tokio::spawn(spawn_data_bridge(
            update_rx,
            action_tx,
            CancellationToken::new(),
        ));

        update_tx
            .send(DashboardUpdate::Snapshot {
                records: demo_snapshot(),
                source: SnapshotSource::Demo,
            })
            .unwrap();
        update_tx
            .send(DashboardUpdate::ChannelState(ChannelState::Open))
            .unwrap();
        update_tx
            .send(DashboardUpdate::FallbackActivated {
                interval: Duration::from_secs(5),
            })
            .unwrap();
        drop(update_tx);

        match action_rx.recv().await.unwrap() {
            Action::SnapshotReceived { records, source } => {
                assert_eq!(records.len(), 3);
                assert_eq!(source, SnapshotSource::Demo);
            }
            other => panic!("expected SnapshotReceived, got {other:?}"),
        }
        assert_eq!(
            action_rx.recv().await.unwrap(),
            Action::ChannelChanged(ChannelState::Open)
        );
        assert_eq!(
            action_rx.recv().await.unwrap(),
            Action::PollingStarted(Duration::from_secs(5))
        );

        // Update queue closed: the bridge stops on its own.
        bridge.await.unwrap();
    }

    #[tokio::test]
    async fn stops_on_cancel() {
        let (_update_tx, update_rx) = mpsc::unbounded_channel::<DashboardUpdate>();
        let (action_tx, _action_rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        let bridge = tokio::spawn(spawn_data_bridge(update_rx, action_tx, cancel.clone()));

        cancel.cancel();
        bridge.await.unwrap();
    }
}
