//! netops-core: domain layer between `netops-api` and the CLI.
//!
//! Typed rows for the operations database, the breakdown lifecycle,
//! aggregate metrics, exports, entry drafts, and the alert poller. The
//! [`Controller`] ties them to a live backend.

pub mod command;
pub mod config;
pub mod controller;
pub mod convert;
pub mod error;
pub mod export;
pub mod form;
pub mod lifecycle;
pub mod metrics;
pub mod model;
pub mod poll;
pub mod snapshot;
pub mod stream;

// ── Primary re-exports ──────────────────────────────────────────────
pub use command::requests::*;
pub use command::{Command, CommandResult};
pub use config::{AuthCredentials, BackendConfig, TlsVerification};
pub use controller::{BreakdownFilter, Controller};
pub use error::CoreError;
pub use form::{BreakdownDraft, EnergyDraft, SiteScope};
pub use poll::{AlertNotifier, AlertPoller};
pub use snapshot::Snapshot;
pub use stream::EntityStream;

// Model types at the crate root for ergonomics.
pub use model::{
    // Owned records
    Breakdown, BreakdownStatus, BreakdownType, EnergyRecord, FixDuration, Priority, Severity,
    // Supporting entities
    Alert, AlertSeverity, AlertStatus, Equipment, EquipmentStatus, Intervention,
    InterventionStatus, Profile, Role, Site, SiteStatus,
    // Identity
    EntityId,
};
