// Wire models for the mirror testing backend.
//
// A `StatusRecord` is one monitored target (distribution + version + repo).
// Records are immutable values: the dashboard never edits one, it only
// replaces the whole displayed snapshot.

use std::fmt;

use serde::de::{DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};

/// A complete list of targets as of "now". Always replaces the prior view.
pub type Snapshot = Vec<StatusRecord>;

// ── TestStatus ───────────────────────────────────────────────────────

/// Overall outcome of a repository test run.
///
/// Deserialization is total: any value outside the known set (and a
/// missing field) becomes [`TestStatus::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    Success,
    Failure,
    Partial,
    Running,
    #[default]
    #[serde(other)]
    Unknown,
}

impl TestStatus {
    /// All variants, in display order.
    pub const ALL: [TestStatus; 5] = [
        Self::Success,
        Self::Failure,
        Self::Partial,
        Self::Running,
        Self::Unknown,
    ];

    /// Parse a free-form status string. Never fails.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "success" => Self::Success,
            "failure" => Self::Failure,
            "partial" => Self::Partial,
            "running" => Self::Running,
            _ => Self::Unknown,
        }
    }

    /// Single-glyph indicator shared by every front end.
    pub fn icon(self) -> &'static str {
        match self {
            Self::Success => "✓",
            Self::Failure => "✗",
            Self::Partial => "⚠",
            Self::Running => "↻",
            Self::Unknown => "?",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failure => "failure",
            Self::Partial => "partial",
            Self::Running => "running",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for TestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Sub-test results ─────────────────────────────────────────────────

/// Outcome of one stage of a repository test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubTestResult {
    /// Raw stage status (`"success"`, `"failure"`, `"pending"`, ...).
    pub status: String,
    /// Stage duration in seconds.
    #[serde(default)]
    pub duration: f64,
    /// Stage-level error, if the backend reported one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SubTestResult {
    pub fn test_status(&self) -> TestStatus {
        TestStatus::parse(&self.status)
    }
}

/// The three stages every detailed test reports. All three or nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestDetails {
    pub connectivity: SubTestResult,
    pub update: SubTestResult,
    pub install: SubTestResult,
}

impl TestDetails {
    /// Stages with their display labels, in display order.
    pub fn stages(&self) -> [(&'static str, &SubTestResult); 3] {
        [
            ("Connectivity", &self.connectivity),
            ("Update", &self.update),
            ("Install", &self.install),
        ]
    }
}

// ── StatusRecord ─────────────────────────────────────────────────────

/// State of one monitored target.
///
/// Optional fields are lenient: a value of the wrong shape is treated as
/// absent rather than failing the whole record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusRecord {
    pub distribution: String,
    pub version: String,
    pub repository: String,

    #[serde(default, deserialize_with = "lenient_status")]
    pub status: TestStatus,

    #[serde(
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub duration_seconds: Option<f64>,

    #[serde(
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub error_message: Option<String>,

    #[serde(
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub test_details: Option<TestDetails>,
}

impl StatusRecord {
    /// Display title, e.g. `"Debian 8"`.
    pub fn title(&self) -> String {
        format!("{} {}", self.distribution, self.version)
    }

    /// Total duration, with zero treated as "not yet known".
    pub fn duration(&self) -> Option<f64> {
        self.duration_seconds.filter(|d| *d > 0.0)
    }

    /// Error message, with empty strings treated as absent.
    pub fn error(&self) -> Option<&str> {
        self.error_message.as_deref().filter(|m| !m.is_empty())
    }
}

/// Deserialize an optional field, mapping any shape mismatch to `None`.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| serde_json::from_value(v).ok()))
}

/// Any non-string or unrecognized status value reads as `Unknown`.
fn lenient_status<'de, D>(deserializer: D) -> Result<TestStatus, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(serde_json::Value::as_str)
        .map_or(TestStatus::Unknown, TestStatus::parse))
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn every_status_has_an_icon() {
        let icons: Vec<&str> = TestStatus::ALL.iter().map(|s| s.icon()).collect();
        assert_eq!(icons, ["✓", "✗", "⚠", "↻", "?"]);
        assert_eq!(TestStatus::parse("pending").icon(), "?");
    }

    #[test]
    fn deserialize_minimal_record() {
        let record: StatusRecord = serde_json::from_value(json!({
            "distribution": "Debian",
            "version": "8",
            "status": "success",
            "repository": "http://deb.debian.org/debian"
        }))
        .unwrap();

        assert_eq!(record.title(), "Debian 8");
        assert_eq!(record.status, TestStatus::Success);
        assert!(record.duration_seconds.is_none());
        assert!(record.error_message.is_none());
        assert!(record.test_details.is_none());
    }

    #[test]
    fn unknown_and_missing_status_map_to_unknown() {
        for raw in [json!("pending"), json!("SUCCESS"), json!(""), json!(3), json!(null)] {
            let record: StatusRecord = serde_json::from_value(json!({
                "distribution": "Kali",
                "version": "kali-rolling",
                "repository": "http://kali.download/kali",
                "status": raw
            }))
            .unwrap();
            assert_eq!(record.status, TestStatus::Unknown);
        }

        let record: StatusRecord = serde_json::from_value(json!({
            "distribution": "Kali",
            "version": "kali-rolling",
            "repository": "http://kali.download/kali"
        }))
        .unwrap();
        assert_eq!(record.status, TestStatus::Unknown);
    }

    #[test]
    fn parse_is_total() {
        assert_eq!(TestStatus::parse("partial"), TestStatus::Partial);
        assert_eq!(TestStatus::parse("running"), TestStatus::Running);
        assert_eq!(TestStatus::parse("¯\\_(ツ)_/¯"), TestStatus::Unknown);
    }

    #[test]
    fn full_record_with_details() {
        let record: StatusRecord = serde_json::from_value(json!({
            "id": "ubuntu-22.04",
            "distribution": "Ubuntu",
            "version": "22.04",
            "repository": "http://archive.ubuntu.com/ubuntu",
            "status": "partial",
            "duration_seconds": 42,
            "error_message": "install failed",
            "package_count": 12,
            "test_details": {
                "connectivity": { "status": "success", "duration": 1.5, "error": null },
                "update": { "status": "success", "duration": 20 },
                "install": { "status": "failure", "duration": 3, "error": "E: Unable to locate package tree" }
            }
        }))
        .unwrap();

        assert_eq!(record.duration(), Some(42.0));
        assert_eq!(record.error(), Some("install failed"));
        let details = record.test_details.unwrap();
        assert_eq!(details.connectivity.duration, 1.5);
        assert_eq!(details.install.test_status(), TestStatus::Failure);
        assert_eq!(
            details.install.error.as_deref(),
            Some("E: Unable to locate package tree")
        );
        let labels: Vec<&str> = details.stages().iter().map(|(l, _)| *l).collect();
        assert_eq!(labels, ["Connectivity", "Update", "Install"]);
    }

    #[test]
    fn malformed_optional_fields_degrade_to_none() {
        let record: StatusRecord = serde_json::from_value(json!({
            "distribution": "Debian",
            "version": "7",
            "repository": "http://deb.debian.org/debian",
            "status": "running",
            "duration_seconds": "soon",
            "error_message": { "nested": true },
            "test_details": {
                "connectivity": { "status": "success", "duration": 1 },
                "update": { "status": "pending", "duration": 0 }
            }
        }))
        .unwrap();

        assert!(record.duration_seconds.is_none());
        assert!(record.error_message.is_none());
        assert!(
            record.test_details.is_none(),
            "a partial set of stages must not produce details"
        );
    }

    #[test]
    fn zero_duration_and_empty_error_read_as_absent() {
        let record: StatusRecord = serde_json::from_value(json!({
            "distribution": "Debian",
            "version": "12",
            "repository": "http://deb.debian.org/debian",
            "status": "running",
            "duration_seconds": 0,
            "error_message": ""
        }))
        .unwrap();

        assert_eq!(record.duration_seconds, Some(0.0));
        assert!(record.duration().is_none());
        assert!(record.error().is_none());
    }

    #[test]
    fn null_optionals_are_none() {
        let record: StatusRecord = serde_json::from_value(json!({
            "distribution": "Ubuntu",
            "version": "20.04",
            "repository": "http://archive.ubuntu.com/ubuntu",
            "status": "failure",
            "duration_seconds": null,
            "error_message": null,
            "test_details": null
        }))
        .unwrap();

        assert!(record.duration_seconds.is_none());
        assert!(record.error_message.is_none());
        assert!(record.test_details.is_none());
    }
}
