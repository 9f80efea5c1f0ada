// mirrorwatch-api: Async Rust client for the mirror testing backend (pull + push)

pub mod client;
pub mod error;
pub mod live;
pub mod models;
pub mod transport;

pub use client::StatusClient;
pub use error::Error;
pub use live::{ChannelEvent, LiveChannel};
pub use models::{Snapshot, StatusRecord, SubTestResult, TestDetails, TestStatus};
pub use transport::{LiveTls, TlsMode, TransportConfig};
