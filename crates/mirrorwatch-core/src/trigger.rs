// Manual test trigger: one POST, and on success the triggered run becomes
// the whole displayed list.

use tracing::{info, warn};

use mirrorwatch_api::Snapshot;

use crate::backend::StatusBackend;

/// Ask the backend to run a test. Returns the replacement snapshot (exactly
/// one record), or `None` if the request failed and the view must stay as
/// it is.
pub async fn run_manual_trigger<B: StatusBackend>(backend: &B) -> Option<Snapshot> {
    match backend.trigger_test().await {
        Ok(record) => {
            info!(target_name = %record.title(), status = %record.status, "test triggered");
            Some(vec![record])
        }
        Err(e) => {
            warn!(error = %e, "manual trigger failed");
            None
        }
    }
}
