// ── Breakdown (incident) domain types ──

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use super::common::{EquipmentRef, ProfileRef, SiteRef};
use super::duration::FixDuration;
use super::entity_id::EntityId;

// ── Classification enums ────────────────────────────────────────────

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    EnumString,
    IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum BreakdownType {
    PowerOutage,
    EquipmentFailure,
    NetworkIssue,
    ConnectivityLoss,
    SoftwareMalfunction,
    HardwareDefect,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    EnumString,
    IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Severity {
    Minor,
    Major,
    Critical,
}

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    EnumString,
    IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

/// Lifecycle position of a breakdown. Exactly one at any time.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    EnumString,
    IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum BreakdownStatus {
    #[default]
    Open,
    Investigating,
    InProgress,
    Resolved,
    Closed,
}

impl BreakdownStatus {
    /// Still needs work: open, investigating, or in progress.
    pub fn is_active(self) -> bool {
        matches!(self, Self::Open | Self::Investigating | Self::InProgress)
    }

    /// Past the fix: resolved or closed.
    pub fn is_resolved(self) -> bool {
        matches!(self, Self::Resolved | Self::Closed)
    }

    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

// ── Breakdown ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Breakdown {
    pub id: EntityId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub breakdown_type: BreakdownType,
    pub severity: Severity,
    #[serde(default)]
    pub priority: Priority,
    pub status: BreakdownStatus,
    #[serde(default)]
    pub impact_users: Option<u32>,
    #[serde(default, deserialize_with = "crate::convert::opt_fix_duration")]
    pub estimated_fix_time: Option<FixDuration>,
    #[serde(default, deserialize_with = "crate::convert::opt_fix_duration")]
    pub actual_fix_time: Option<FixDuration>,
    pub site_id: EntityId,
    #[serde(default)]
    pub equipment_id: Option<EntityId>,
    #[serde(default)]
    pub assigned_to: Option<EntityId>,
    #[serde(default)]
    pub reported_by: Option<EntityId>,
    #[serde(default)]
    pub root_cause: Option<String>,
    #[serde(default)]
    pub resolution_notes: Option<String>,

    // Timestamps
    #[serde(default, deserialize_with = "crate::convert::opt_timestamp")]
    pub reported_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "crate::convert::opt_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "crate::convert::opt_timestamp")]
    pub acknowledged_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "crate::convert::opt_timestamp")]
    pub downtime_start: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "crate::convert::opt_timestamp")]
    pub downtime_end: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "crate::convert::opt_timestamp")]
    pub resolved_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "crate::convert::opt_timestamp")]
    pub closed_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "crate::convert::opt_timestamp")]
    pub updated_at: Option<DateTime<Utc>>,

    // Embedded relations
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
    #[serde(
        default,
        deserialize_with = "crate::convert::one_or_first",
        skip_serializing_if = "Option::is_none"
    )]
    pub reporter: Option<ProfileRef>,
    #[serde(
        default,
        deserialize_with = "crate::convert::one_or_first",
        skip_serializing_if = "Option::is_none"
    )]
    pub assignee: Option<ProfileRef>,
}

impl Breakdown {
    /// When the incident was reported (falls back to row creation).
    pub fn reported(&self) -> Option<DateTime<Utc>> {
        self.reported_at.or(self.created_at)
    }

    pub fn impact(&self) -> u32 {
        self.impact_users.unwrap_or(0)
    }

    /// Elapsed downtime: `downtime_start` (or report time) to `downtime_end` (or `now`).
    pub fn downtime(&self, now: DateTime<Utc>) -> Option<Duration> {
        let start = self.downtime_start.or_else(|| self.reported())?;
        let end = self.downtime_end.unwrap_or(now);
        Some(end - start)
    }

    /// Time from downtime start to resolution, if resolved.
    pub fn resolution_time(&self) -> Option<Duration> {
        let resolved = self.resolved_at?;
        let start = self.downtime_start.or_else(|| self.reported())?;
        Some(resolved - start)
    }
}

/// Render a downtime as `"3h 12m"`, or `"12m"` under an hour.
pub fn format_downtime(elapsed: Duration) -> String {
    let total = elapsed.num_minutes().max(0);
    let (hours, minutes) = (total / 60, total % 60);
    if hours > 0 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m")
    }
}
