// Built-in sample data, painted when the initial load fails so the board
// is never blank.

use mirrorwatch_api::{Snapshot, StatusRecord, TestStatus};

const DEBIAN_MIRROR: &str = "http://deb.debian.org/debian";
const UBUNTU_MIRROR: &str = "http://archive.ubuntu.com/ubuntu";

/// Three sample targets: one running, one passing, one failing.
pub fn demo_snapshot() -> Snapshot {
    vec![
        record("Debian", "7", DEBIAN_MIRROR, TestStatus::Running, None, None),
        record("Debian", "8", DEBIAN_MIRROR, TestStatus::Success, Some(15.0), None),
        record(
            "Ubuntu",
            "20.04",
            UBUNTU_MIRROR,
            TestStatus::Failure,
            Some(5.0),
            Some("Failed to connect to repository"),
        ),
    ]
}

fn record(
    distribution: &str,
    version: &str,
    repository: &str,
    status: TestStatus,
    duration_seconds: Option<f64>,
    error_message: Option<&str>,
) -> StatusRecord {
    StatusRecord {
        distribution: distribution.into(),
        version: version.into(),
        repository: repository.into(),
        status,
        duration_seconds,
        error_message: error_message.map(Into::into),
        test_details: None,
    }
}
