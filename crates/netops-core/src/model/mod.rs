// ── Domain model ──
//
// Canonical row types for every table netops reads or writes.

pub mod alert;
pub mod breakdown;
pub mod common;
pub mod duration;
pub mod energy;
pub mod entity_id;
pub mod equipment;
pub mod intervention;
pub mod profile;
pub mod site;

pub use alert::{Alert, AlertSeverity, AlertStatus};
pub use breakdown::{
    Breakdown, BreakdownStatus, BreakdownType, Priority, Severity, format_downtime,
};
pub use common::{EquipmentRef, ProfileRef, SiteRef};
pub use duration::{DurationParseError, FixDuration};
pub use energy::{DEFAULT_TARIFF_PER_KWH, EnergyRecord, default_cost};
pub use entity_id::EntityId;
pub use equipment::{Equipment, EquipmentStatus};
pub use intervention::{Intervention, InterventionStatus};
pub use profile::{Profile, Role};
pub use site::{Site, SiteStatus};
