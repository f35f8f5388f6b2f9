// ── Typed request bodies for write commands ──
//
// Each struct serializes to exactly the column set sent to the backend.
// `Option<Option<T>>` marks a nullable column an edit may clear:
// `None` leaves it alone, `Some(None)` writes NULL.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{BreakdownStatus, BreakdownType, EntityId, FixDuration, Priority, Role, Severity};

// ── Breakdowns ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBreakdownRequest {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub breakdown_type: BreakdownType,
    pub severity: Severity,
    pub priority: Priority,
    pub status: BreakdownStatus,
    pub site_id: EntityId,
    pub equipment_id: Option<EntityId>,
    pub assigned_to: Option<EntityId>,
    pub reported_by: Option<EntityId>,
    pub impact_users: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_fix_time: Option<FixDuration>,
    pub reported_at: DateTime<Utc>,
    pub downtime_start: DateTime<Utc>,
}

/// Full edit of a breakdown. `status` is not a plain column write: it is
/// routed through the lifecycle table, which adds its own stamps.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateBreakdownRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub breakdown_type: Option<BreakdownType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(skip)]
    pub status: Option<BreakdownStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site_id: Option<EntityId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub equipment_id: Option<Option<EntityId>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<Option<EntityId>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub impact_users: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_fix_time: Option<Option<FixDuration>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub downtime_start: Option<Option<DateTime<Utc>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub downtime_end: Option<Option<DateTime<Utc>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root_cause: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution_notes: Option<Option<String>>,
}

// ── Energy ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEnergyRequest {
    pub site_id: EntityId,
    pub equipment_id: Option<EntityId>,
    pub consumption_kwh: f64,
    pub cost_amount: f64,
    pub period_start: DateTime<Utc>,
    pub period_end: DateTime<Utc>,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateEnergyRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site_id: Option<EntityId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub equipment_id: Option<Option<EntityId>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consumption_kwh: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost_amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period_start: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period_end: Option<DateTime<Utc>>,
}

// ── Users ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProfileRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<Option<String>>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn edit_distinguishes_untouched_from_cleared() {
        let req = UpdateBreakdownRequest {
            title: Some("Updated".into()),
            equipment_id: Some(None),
            status: Some(BreakdownStatus::Resolved),
            estimated_fix_time: Some(Some(FixDuration::from_minutes(150))),
            ..UpdateBreakdownRequest::default()
        };
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({
                "title": "Updated",
                "equipment_id": null,
                "estimated_fix_time": "PT2.5H"
            })
        );
    }
}
