// mirrorwatch-core: keeps a dashboard in sync with the mirror testing backend.
//
// Startup pull (with demo fallback), the live push channel, periodic
// polling once that channel fails, and manual test triggers. The UI only
// ever sees `DashboardUpdate` messages.

pub mod backend;
pub mod config;
pub mod controller;
pub mod demo;
pub mod display;
pub mod error;
pub mod fallback;
pub mod trigger;

// ── Primary re-exports ──────────────────────────────────────────────
pub use backend::{HttpBackend, StatusBackend, fetch_snapshot, trigger_once};
pub use config::{DashboardConfig, TlsVerification};
pub use controller::{
    ChannelState, DashboardCommand, DashboardController, DashboardHandle, DashboardUpdate,
    SnapshotSource,
};
pub use demo::demo_snapshot;
pub use display::{fmt_secs, fmt_total};
pub use error::CoreError;
pub use fallback::FallbackScheduler;

// Wire types, re-exported so consumers need not depend on mirrorwatch-api.
pub use mirrorwatch_api::{Snapshot, StatusRecord, SubTestResult, TestDetails, TestStatus};
