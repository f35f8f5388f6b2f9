// ── Alert domain type ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, IntoStaticStr};

use super::common::{EquipmentRef, SiteRef};
use super::entity_id::EntityId;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter, IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AlertSeverity {
    Info,
    Warning,
    Critical,
    #[serde(other)]
    Unknown,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter, IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AlertStatus {
    Active,
    Acknowledged,
    Resolved,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub id: EntityId,
    pub title: String,
    #[serde(default)]
    pub message: Option<String>,
    pub severity: AlertSeverity,
    pub status: AlertStatus,
    #[serde(default, rename = "type")]
    pub alert_type: Option<String>,
    #[serde(default)]
    pub site_id: Option<EntityId>,
    #[serde(default)]
    pub equipment_id: Option<EntityId>,
    #[serde(deserialize_with = "crate::convert::timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(
        default,
        rename(deserialize = "sites"),
        deserialize_with = "crate::convert::one_or_first",
        skip_serializing_if = "Option::is_none"
    )]
    pub site: Option<SiteRef>,
    #[serde(
        default,
        deserialize_with = "crate::convert::one_or_first",
        skip_serializing_if = "Option::is_none"
    )]
    pub equipment: Option<EquipmentRef>,
}

impl Alert {
    pub fn is_critical(&self) -> bool {
        self.severity == AlertSeverity::Critical
    }
}
