// ── Equipment domain type ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, IntoStaticStr};

use super::common::SiteRef;
use super::entity_id::EntityId;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter, IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EquipmentStatus {
    Operational,
    Maintenance,
    Faulty,
    Offline,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Equipment {
    pub id: EntityId,
    pub name: String,
    #[serde(default, rename = "type")]
    pub equipment_type: Option<String>,
    #[serde(default = "unknown_equipment_status")]
    pub status: EquipmentStatus,
    pub site_id: EntityId,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub serial_number: Option<String>,
    #[serde(default, deserialize_with = "crate::convert::opt_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(
        default,
        rename(deserialize = "sites"),
        deserialize_with = "crate::convert::one_or_first",
        skip_serializing_if = "Option::is_none"
    )]
    pub site: Option<SiteRef>,
}

fn unknown_equipment_status() -> EquipmentStatus {
    EquipmentStatus::Unknown
}
