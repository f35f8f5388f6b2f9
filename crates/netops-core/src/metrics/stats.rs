// ── Scalar stat cards ──

use chrono::{DateTime, Duration, TimeZone};
use serde::Serialize;

use super::{count, count_where, percentage};
use crate::model::energy::round2;
use crate::model::{
    AlertStatus, Breakdown, BreakdownStatus, EnergyRecord, EntityId, EquipmentStatus,
    InterventionStatus, Profile, Role, Severity, Site, SiteStatus,
};
use crate::snapshot::Snapshot;

// ── Dashboard ───────────────────────────────────────────────────────

/// Row counts fetched with exact-count requests for the overview.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DashboardCounts {
    pub total_sites: u64,
    pub active_sites: u64,
    pub total_equipment: u64,
    pub active_alerts: u64,
    pub total_breakdowns: u64,
    pub active_breakdowns: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardStats {
    #[serde(flatten)]
    pub counts: DashboardCounts,
    /// Sum over the most recent energy rows fetched for the card.
    pub recent_energy_kwh: f64,
    pub recent_energy_cost: f64,
    pub recent_energy_records: u64,
    /// Share of sites currently active.
    pub uptime_pct: f64,
}

impl DashboardStats {
    pub fn compute(counts: DashboardCounts, recent_energy: &[EnergyRecord]) -> Self {
        let totals = EnergyStats::compute(recent_energy);
        Self {
            counts,
            recent_energy_kwh: totals.total_kwh,
            recent_energy_cost: totals.total_cost,
            recent_energy_records: totals.records,
            uptime_pct: percentage(counts.active_sites, counts.total_sites),
        }
    }
}

// ── Breakdowns ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BreakdownStats {
    pub total: u64,
    pub open: u64,
    pub investigating: u64,
    pub in_progress: u64,
    /// Open, investigating, or in progress.
    pub active: u64,
    /// Resolved or closed.
    pub resolved: u64,
    pub critical: u64,
    pub impacted_users: u64,
    /// Mean of `resolved_at - downtime_start` over resolved rows.
    #[serde(skip)]
    pub average_resolution: Option<Duration>,
}

impl BreakdownStats {
    pub fn compute(breakdowns: &[Breakdown]) -> Self {
        let status = |s: BreakdownStatus| count_where(breakdowns, |b| b.status == s);

        let resolution_times: Vec<Duration> = breakdowns
            .iter()
            .filter_map(Breakdown::resolution_time)
            .collect();
        let average_resolution = i32::try_from(resolution_times.len())
            .ok()
            .filter(|&n| n > 0)
            .map(|n| resolution_times.iter().fold(Duration::zero(), |acc, d| acc + *d) / n);

        Self {
            total: count(breakdowns),
            open: status(BreakdownStatus::Open),
            investigating: status(BreakdownStatus::Investigating),
            in_progress: status(BreakdownStatus::InProgress),
            active: count_where(breakdowns, |b| b.status.is_active()),
            resolved: count_where(breakdowns, |b| b.status.is_resolved()),
            critical: count_where(breakdowns, |b| b.severity == Severity::Critical),
            impacted_users: breakdowns.iter().map(|b| u64::from(b.impact())).sum(),
            average_resolution,
        }
    }

    pub fn average_resolution_label(&self) -> String {
        self.average_resolution
            .map_or_else(|| "N/A".to_owned(), format_resolution_time)
    }
}

/// `"< 1h"`, `"7h"`, or `"2d 3h"`.
pub fn format_resolution_time(elapsed: Duration) -> String {
    let hours = elapsed.num_hours();
    if hours < 1 {
        "< 1h".to_owned()
    } else if hours < 24 {
        format!("{hours}h")
    } else {
        format!("{}d {}h", hours / 24, hours % 24)
    }
}

// ── Energy ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnergyStats {
    pub total_kwh: f64,
    pub total_cost: f64,
    pub records: u64,
    pub average_kwh: f64,
}

impl EnergyStats {
    pub fn compute(records: &[EnergyRecord]) -> Self {
        let total_kwh: f64 = records.iter().map(|r| r.consumption_kwh).sum();
        let total_cost: f64 = records.iter().map(EnergyRecord::cost).sum();
        let n = count(records);
        #[allow(clippy::cast_precision_loss, clippy::as_conversions)]
        let average_kwh = if n == 0 { 0.0 } else { total_kwh / n as f64 };
        Self {
            total_kwh: round2(total_kwh),
            total_cost: round2(total_cost),
            records: n,
            average_kwh: round2(average_kwh),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SiteEnergy {
    pub site_id: EntityId,
    pub site_name: String,
    pub consumption_kwh: f64,
    pub cost: f64,
}

impl SiteEnergy {
    /// Per-site totals, highest consumption first, at most `limit` rows.
    pub fn top(records: &[EnergyRecord], limit: usize) -> Vec<Self> {
        let mut by_site: indexmap::IndexMap<&EntityId, Self> = indexmap::IndexMap::new();
        for record in records {
            let entry = by_site.entry(&record.site_id).or_insert_with(|| Self {
                site_id: record.site_id.clone(),
                site_name: record
                    .site
                    .as_ref()
                    .map_or_else(|| record.site_id.to_string(), |s| s.name.clone()),
                consumption_kwh: 0.0,
                cost: 0.0,
            });
            entry.consumption_kwh += record.consumption_kwh;
            entry.cost += record.cost();
        }

        let mut rows: Vec<Self> = by_site
            .into_values()
            .map(|mut s| {
                s.consumption_kwh = round2(s.consumption_kwh);
                s.cost = round2(s.cost);
                s
            })
            .collect();
        rows.sort_by(|a, b| b.consumption_kwh.total_cmp(&a.consumption_kwh));
        rows.truncate(limit);
        rows
    }
}

// ── Sites ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SiteStats {
    pub total: u64,
    pub active: u64,
    pub maintenance: u64,
    /// Inactive or in fault.
    pub offline: u64,
}

impl SiteStats {
    pub fn compute(sites: &[Site]) -> Self {
        Self {
            total: count(sites),
            active: count_where(sites, |s| s.status == SiteStatus::Active),
            maintenance: count_where(sites, |s| s.status == SiteStatus::Maintenance),
            offline: count_where(sites, |s| {
                matches!(s.status, SiteStatus::Inactive | SiteStatus::Fault)
            }),
        }
    }
}

// ── Users ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UserStats {
    pub total: u64,
    pub admins: u64,
    pub managers: u64,
    pub engineers: u64,
    pub technicians: u64,
    /// Profiles touched (updated, else created) on the current local day.
    pub active_today: u64,
}

impl UserStats {
    pub fn compute<Tz: TimeZone>(profiles: &[Profile], now: &DateTime<Tz>) -> Self {
        let tz = now.timezone();
        let today = now.date_naive();
        let role = |r: Role| count_where(profiles, |p| p.role == Some(r));
        Self {
            total: count(profiles),
            admins: role(Role::Admin),
            managers: role(Role::Manager),
            engineers: role(Role::Engineer),
            technicians: role(Role::Technician),
            active_today: count_where(profiles, |p| {
                p.updated_at
                    .or(p.created_at)
                    .is_some_and(|at| at.with_timezone(&tz).date_naive() == today)
            }),
        }
    }
}

// ── Report summary ──────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub total_sites: u64,
    pub active_sites: u64,
    pub total_equipment: u64,
    pub operational_equipment: u64,
    pub equipment_health_pct: f64,
    pub total_interventions: u64,
    pub completed_interventions: u64,
    pub total_alerts: u64,
    pub active_alerts: u64,
    pub total_breakdowns: u64,
    pub active_breakdowns: u64,
    pub total_energy_consumption: f64,
    pub total_energy_cost: f64,
    pub total_energy_records: u64,
}

impl ReportSummary {
    pub fn compute(snapshot: &Snapshot) -> Self {
        let energy = EnergyStats::compute(&snapshot.energy);
        let total_equipment = count(&snapshot.equipment);
        let operational_equipment = count_where(&snapshot.equipment, |e| {
            e.status == EquipmentStatus::Operational
        });
        Self {
            total_sites: count(&snapshot.sites),
            active_sites: count_where(&snapshot.sites, |s| s.status == SiteStatus::Active),
            total_equipment,
            operational_equipment,
            equipment_health_pct: percentage(operational_equipment, total_equipment),
            total_interventions: count(&snapshot.interventions),
            completed_interventions: count_where(&snapshot.interventions, |i| {
                i.status == InterventionStatus::Completed
            }),
            total_alerts: count(&snapshot.alerts),
            active_alerts: count_where(&snapshot.alerts, |a| a.status == AlertStatus::Active),
            total_breakdowns: count(&snapshot.breakdowns),
            active_breakdowns: count_where(&snapshot.breakdowns, |b| b.status.is_active()),
            total_energy_consumption: energy.total_kwh,
            total_energy_cost: energy.total_cost,
            total_energy_records: energy.records,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{FixedOffset, Utc};
    use serde_json::json;

    use super::*;

    fn breakdowns() -> Vec<Breakdown> {
        serde_json::from_value(json!([
            { "id": "1", "title": "a", "type": "power_outage", "severity": "critical",
              "status": "open", "site_id": "s1", "impact_users": 100 },
            { "id": "2", "title": "b", "type": "network_issue", "severity": "minor",
              "status": "investigating", "site_id": "s1", "impact_users": null },
            { "id": "3", "title": "c", "type": "network_issue", "severity": "major",
              "status": "resolved", "site_id": "s2", "impact_users": 20,
              "downtime_start": "2026-10-01T00:00:00Z", "resolved_at": "2026-10-01T05:00:00Z" },
            { "id": "4", "title": "d", "type": "hardware_defect", "severity": "critical",
              "status": "closed", "site_id": "s2",
              "downtime_start": "2026-10-01T00:00:00Z", "resolved_at": "2026-10-03T03:00:00Z" }
        ]))
        .unwrap()
    }

    #[test]
    fn breakdown_stats() {
        let stats = BreakdownStats::compute(&breakdowns());
        assert_eq!(stats.total, 4);
        assert_eq!(stats.open, 1);
        assert_eq!(stats.investigating, 1);
        assert_eq!(stats.active, 2);
        assert_eq!(stats.resolved, 2);
        assert_eq!(stats.critical, 2);
        assert_eq!(stats.impacted_users, 120);
        // (5h + 51h) / 2
        assert_eq!(stats.average_resolution, Some(Duration::hours(28)));
        assert_eq!(stats.average_resolution_label(), "1d 4h");
    }

    #[test]
    fn empty_breakdowns_have_no_average() {
        let stats = BreakdownStats::compute(&[]);
        assert_eq!(stats.total, 0);
        assert_eq!(stats.average_resolution_label(), "N/A");
    }

    #[test]
    fn resolution_time_labels() {
        assert_eq!(format_resolution_time(Duration::minutes(59)), "< 1h");
        assert_eq!(format_resolution_time(Duration::hours(7)), "7h");
        assert_eq!(format_resolution_time(Duration::hours(51)), "2d 3h");
    }

    #[test]
    fn dashboard_uptime_with_no_sites_is_zero() {
        let stats = DashboardStats::compute(DashboardCounts::default(), &[]);
        assert!(stats.uptime_pct.abs() < f64::EPSILON);
        assert_eq!(stats.recent_energy_records, 0);
    }

    #[test]
    fn dashboard_uptime() {
        let counts = DashboardCounts {
            total_sites: 8,
            active_sites: 6,
            ..DashboardCounts::default()
        };
        let stats = DashboardStats::compute(counts, &[]);
        assert!((stats.uptime_pct - 75.0).abs() < f64::EPSILON);
    }

    #[test]
    fn energy_totals_and_top_sites() {
        let records: Vec<EnergyRecord> = serde_json::from_value(json!([
            { "id": "e1", "site_id": "s1", "consumption_kwh": 10.0, "cost_amount": 1.5,
              "period_start": "2026-10-01", "period_end": "2026-10-02",
              "sites": { "name": "Sfax", "code": "SFX" } },
            { "id": "e2", "site_id": "s2", "consumption_kwh": "40", "cost_amount": null,
              "period_start": "2026-10-01", "period_end": "2026-10-02" },
            { "id": "e3", "site_id": "s1", "consumption_kwh": 5.0, "cost_amount": 0.75,
              "period_start": "2026-10-01", "period_end": "2026-10-02",
              "sites": { "name": "Sfax", "code": "SFX" } }
        ]))
        .unwrap();

        let stats = EnergyStats::compute(&records);
        assert!((stats.total_kwh - 55.0).abs() < 1e-9);
        assert!((stats.total_cost - 2.25).abs() < 1e-9);
        assert_eq!(stats.records, 3);

        let top = SiteEnergy::top(&records, 10);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].site_name, "s2");
        assert_eq!(top[1].site_name, "Sfax");
        assert!((top[1].consumption_kwh - 15.0).abs() < 1e-9);

        assert_eq!(SiteEnergy::top(&records, 1).len(), 1);
    }

    #[test]
    fn users_active_today_uses_local_day() {
        let profiles: Vec<Profile> = serde_json::from_value(json!([
            { "id": "u1", "role": "admin", "updated_at": "2026-10-17T22:30:00Z" },
            { "id": "u2", "role": "technician", "created_at": "2026-10-16T09:00:00Z" },
            { "id": "u3", "role": "technician", "created_at": "2026-10-17T08:00:00Z" },
            { "id": "u4", "role": "auditor" }
        ]))
        .unwrap();
        // 23:30 local on the 17th; u1's 22:30Z is 23:30 local, same day.
        let tz = FixedOffset::east_opt(3600).unwrap();
        let now = Utc
            .with_ymd_and_hms(2026, 10, 17, 22, 30, 0)
            .unwrap()
            .with_timezone(&tz);
        let stats = UserStats::compute(&profiles, &now);
        assert_eq!(stats.total, 4);
        assert_eq!(stats.admins, 1);
        assert_eq!(stats.technicians, 2);
        assert_eq!(stats.active_today, 2);
    }

    #[test]
    fn site_stats_group_inactive_and_fault() {
        let sites: Vec<Site> = serde_json::from_value(json!([
            { "id": "1", "name": "a", "status": "active" },
            { "id": "2", "name": "b", "status": "fault" },
            { "id": "3", "name": "c", "status": "inactive" },
            { "id": "4", "name": "d", "status": "maintenance" }
        ]))
        .unwrap();
        assert_eq!(
            SiteStats::compute(&sites),
            SiteStats {
                total: 4,
                active: 1,
                maintenance: 1,
                offline: 2
            }
        );
    }

    #[test]
    fn report_summary_from_empty_snapshot() {
        let summary = ReportSummary::compute(&Snapshot::default());
        assert_eq!(summary.total_sites, 0);
        assert!(summary.equipment_health_pct.abs() < f64::EPSILON);
    }
}
