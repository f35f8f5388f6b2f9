// ── Intervention (maintenance work order) ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, IntoStaticStr};

use super::common::{EquipmentRef, SiteRef};
use super::entity_id::EntityId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, IntoStaticStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum InterventionStatus {
    Scheduled,
    InProgress,
    Completed,
    Cancelled,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Intervention {
    pub id: EntityId,
    #[serde(default)]
    pub title: Option<String>,
    pub status: InterventionStatus,
    #[serde(default, rename = "type")]
    pub intervention_type: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub site_id: Option<EntityId>,
    #[serde(default, deserialize_with = "crate::convert::opt_timestamp")]
    pub scheduled_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "crate::convert::opt_timestamp")]
    pub completed_date: Option<DateTime<Utc>>,
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
