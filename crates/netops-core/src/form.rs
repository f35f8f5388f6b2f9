// ── Entry drafts ──
//
// Client-side state for the report-breakdown and record-energy flows.
// A draft accumulates user input and `validate` turns it into the typed
// create request. Invalid drafts never reach the network.

use chrono::{DateTime, Utc};

use crate::command::{CreateBreakdownRequest, CreateEnergyRequest};
use crate::error::CoreError;
use crate::model::energy::round2;
use crate::model::{
    BreakdownStatus, BreakdownType, EntityId, Equipment, FixDuration, Priority, Severity,
    default_cost,
};

// ── Site-scoped selection ──────────────────────────────────────────

/// A site choice plus an equipment choice that must belong to it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SiteScope {
    site_id: Option<EntityId>,
    equipment_id: Option<EntityId>,
}

impl SiteScope {
    pub fn site_id(&self) -> Option<&EntityId> {
        self.site_id.as_ref()
    }

    pub fn equipment_id(&self) -> Option<&EntityId> {
        self.equipment_id.as_ref()
    }

    /// Choose a site. Switching to a different site clears the equipment.
    pub fn select_site(&mut self, site_id: Option<EntityId>) {
        if self.site_id != site_id {
            self.equipment_id = None;
        }
        self.site_id = site_id;
    }

    /// Equipment installed at the selected site. Empty until a site is chosen.
    pub fn equipment_options<'a>(&self, all: &'a [Equipment]) -> Vec<&'a Equipment> {
        let Some(site_id) = &self.site_id else {
            return Vec::new();
        };
        all.iter()
            .filter(|eq| &eq.site_id == site_id)
            .collect()
    }

    /// Choose equipment from the options of the current site.
    pub fn select_equipment(
        &mut self,
        equipment_id: Option<EntityId>,
        all: &[Equipment],
    ) -> Result<(), CoreError> {
        if let Some(id) = &equipment_id {
            let offered = self.equipment_options(all).iter().any(|eq| &eq.id == id);
            if !offered {
                return Err(CoreError::validation(format!(
                    "equipment {id} is not installed at the selected site"
                )));
            }
        }
        self.equipment_id = equipment_id;
        Ok(())
    }
}

// ── Breakdown draft ────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct BreakdownDraft {
    pub title: String,
    pub description: Option<String>,
    pub breakdown_type: Option<BreakdownType>,
    pub severity: Option<Severity>,
    pub priority: Option<Priority>,
    pub impact_users: Option<u32>,
    pub estimated_fix_time: Option<FixDuration>,
    pub assigned_to: Option<EntityId>,
    pub scope: SiteScope,
}

impl BreakdownDraft {
    /// Check required fields and build the insert body. New reports start
    /// `open` with downtime beginning at `now`.
    pub fn validate(
        &self,
        reported_by: Option<EntityId>,
        now: DateTime<Utc>,
    ) -> Result<CreateBreakdownRequest, CoreError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(CoreError::validation("title is required"));
        }
        let breakdown_type = self
            .breakdown_type
            .ok_or_else(|| CoreError::validation("type is required"))?;
        let severity = self
            .severity
            .ok_or_else(|| CoreError::validation("severity is required"))?;
        let site_id = self
            .scope
            .site_id()
            .cloned()
            .ok_or_else(|| CoreError::validation("site is required"))?;

        Ok(CreateBreakdownRequest {
            title: title.to_owned(),
            description: self
                .description
                .as_deref()
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(str::to_owned),
            breakdown_type,
            severity,
            priority: self.priority.unwrap_or_default(),
            status: BreakdownStatus::Open,
            site_id,
            equipment_id: self.scope.equipment_id().cloned(),
            assigned_to: self.assigned_to.clone(),
            reported_by,
            impact_users: self.impact_users.unwrap_or(0),
            estimated_fix_time: self.estimated_fix_time,
            reported_at: now,
            downtime_start: now,
        })
    }
}

// ── Energy draft ───────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct EnergyDraft {
    pub consumption_kwh: Option<f64>,
    pub cost_amount: Option<f64>,
    pub period_start: Option<DateTime<Utc>>,
    pub period_end: Option<DateTime<Utc>>,
    pub scope: SiteScope,
}

impl EnergyDraft {
    /// Check the reading and build the insert body. A missing cost is
    /// derived from `tariff_per_kwh`.
    pub fn validate(
        &self,
        tariff_per_kwh: f64,
        now: DateTime<Utc>,
    ) -> Result<CreateEnergyRequest, CoreError> {
        let site_id = self
            .scope
            .site_id()
            .cloned()
            .ok_or_else(|| CoreError::validation("site is required"))?;
        let consumption_kwh = self
            .consumption_kwh
            .ok_or_else(|| CoreError::validation("consumption is required"))?;
        let period_start = self
            .period_start
            .ok_or_else(|| CoreError::validation("period start is required"))?;
        let period_end = self
            .period_end
            .ok_or_else(|| CoreError::validation("period end is required"))?;
        check_reading(consumption_kwh, self.cost_amount, period_start, period_end)?;

        Ok(CreateEnergyRequest {
            site_id,
            equipment_id: self.scope.equipment_id().cloned(),
            consumption_kwh,
            cost_amount: self
                .cost_amount
                .map_or_else(|| default_cost(consumption_kwh, tariff_per_kwh), round2),
            period_start,
            period_end,
            recorded_at: now,
        })
    }
}

/// Shared checks for a new or edited energy reading.
pub fn check_reading(
    consumption_kwh: f64,
    cost_amount: Option<f64>,
    period_start: DateTime<Utc>,
    period_end: DateTime<Utc>,
) -> Result<(), CoreError> {
    if !consumption_kwh.is_finite() || consumption_kwh <= 0.0 {
        return Err(CoreError::validation("consumption must be greater than 0 kWh"));
    }
    if cost_amount.is_some_and(|cost| !cost.is_finite() || cost < 0.0) {
        return Err(CoreError::validation("cost must not be negative"));
    }
    if period_end <= period_start {
        return Err(CoreError::validation("period end must be after period start"));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn equipment(id: &str, site: &str) -> Equipment {
        serde_json::from_value(json!({
            "id": id,
            "name": format!("eq-{id}"),
            "site_id": site,
        }))
        .unwrap()
    }

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, day, hour, 0, 0).unwrap()
    }

    fn inventory() -> Vec<Equipment> {
        vec![
            equipment("e1", "s1"),
            equipment("e2", "s1"),
            equipment("e3", "s2"),
        ]
    }

    #[test]
    fn equipment_options_follow_the_site() {
        let all = inventory();
        let mut scope = SiteScope::default();
        assert!(scope.equipment_options(&all).is_empty());

        scope.select_site(Some(EntityId::from("s1")));
        let ids: Vec<String> = scope
            .equipment_options(&all)
            .iter()
            .map(|eq| eq.id.to_string())
            .collect();
        assert_eq!(ids, vec!["e1", "e2"]);
    }

    #[test]
    fn switching_site_clears_equipment() {
        let all = inventory();
        let mut scope = SiteScope::default();
        scope.select_site(Some(EntityId::from("s1")));
        scope
            .select_equipment(Some(EntityId::from("e2")), &all)
            .unwrap();

        scope.select_site(Some(EntityId::from("s1")));
        assert_eq!(scope.equipment_id(), Some(&EntityId::from("e2")));

        scope.select_site(Some(EntityId::from("s2")));
        assert_eq!(scope.equipment_id(), None);
    }

    #[test]
    fn equipment_from_another_site_is_rejected() {
        let all = inventory();
        let mut scope = SiteScope::default();
        scope.select_site(Some(EntityId::from("s1")));
        let err = scope
            .select_equipment(Some(EntityId::from("e3")), &all)
            .unwrap_err();
        assert!(matches!(err, CoreError::ValidationFailed { .. }));
        assert_eq!(scope.equipment_id(), None);
    }

    #[test]
    fn breakdown_draft_fills_defaults() {
        let mut draft = BreakdownDraft {
            title: "  Fibre cut  ".into(),
            breakdown_type: Some(BreakdownType::NetworkIssue),
            severity: Some(Severity::Major),
            ..BreakdownDraft::default()
        };
        draft.scope.select_site(Some(EntityId::from("s1")));

        let req = draft.validate(Some(EntityId::from("u1")), at(1, 9)).unwrap();
        assert_eq!(req.title, "Fibre cut");
        assert_eq!(req.priority, Priority::Medium);
        assert_eq!(req.status, BreakdownStatus::Open);
        assert_eq!(req.impact_users, 0);
        assert_eq!(req.downtime_start, at(1, 9));
        assert_eq!(req.equipment_id, None);
    }

    #[test]
    fn breakdown_draft_requires_title_and_site() {
        let draft = BreakdownDraft {
            title: "   ".into(),
            breakdown_type: Some(BreakdownType::PowerOutage),
            severity: Some(Severity::Minor),
            ..BreakdownDraft::default()
        };
        assert!(draft.validate(None, at(1, 9)).is_err());

        let draft = BreakdownDraft {
            title: "No site".into(),
            ..draft
        };
        let err = draft.validate(None, at(1, 9)).unwrap_err();
        assert!(err.to_string().contains("site is required"));
    }

    #[test]
    fn energy_draft_derives_cost_from_tariff() {
        let mut draft = EnergyDraft {
            consumption_kwh: Some(1234.0),
            period_start: Some(at(1, 0)),
            period_end: Some(at(2, 0)),
            ..EnergyDraft::default()
        };
        draft.scope.select_site(Some(EntityId::from("s1")));

        let req = draft.validate(0.15, at(2, 1)).unwrap();
        assert!((req.cost_amount - 185.1).abs() < f64::EPSILON);
        assert_eq!(req.recorded_at, at(2, 1));
    }

    #[test]
    fn energy_draft_rejects_bad_readings() {
        let mut draft = EnergyDraft {
            consumption_kwh: Some(0.0),
            period_start: Some(at(1, 0)),
            period_end: Some(at(2, 0)),
            ..EnergyDraft::default()
        };
        draft.scope.select_site(Some(EntityId::from("s1")));
        assert!(draft.validate(0.15, at(2, 1)).is_err());

        draft.consumption_kwh = Some(10.0);
        draft.period_end = Some(at(1, 0));
        let err = draft.validate(0.15, at(2, 1)).unwrap_err();
        assert!(err.to_string().contains("period end"));
    }
}
