// ── Categorical breakdowns ──
//
// Each chart counts over a fixed label set. Rows whose category falls
// outside that set are left out of the output entirely.

use serde::Serialize;

use crate::model::{
    Alert, AlertSeverity, Breakdown, BreakdownType, Equipment, EquipmentStatus, Severity, Site,
    SiteStatus,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    /// Stored value, e.g. `in_progress`.
    pub key: &'static str,
    /// Display label, e.g. `In Progress`.
    pub label: String,
    pub count: u64,
}

pub const SITE_STATUS_LABELS: [SiteStatus; 4] = [
    SiteStatus::Active,
    SiteStatus::Maintenance,
    SiteStatus::Inactive,
    SiteStatus::Fault,
];

pub const EQUIPMENT_STATUS_LABELS: [EquipmentStatus; 4] = [
    EquipmentStatus::Operational,
    EquipmentStatus::Maintenance,
    EquipmentStatus::Faulty,
    EquipmentStatus::Offline,
];

pub const ALERT_SEVERITY_LABELS: [AlertSeverity; 3] = [
    AlertSeverity::Info,
    AlertSeverity::Warning,
    AlertSeverity::Critical,
];

pub const BREAKDOWN_SEVERITY_LABELS: [Severity; 3] =
    [Severity::Minor, Severity::Major, Severity::Critical];

pub const BREAKDOWN_TYPE_LABELS: [BreakdownType; 6] = [
    BreakdownType::PowerOutage,
    BreakdownType::EquipmentFailure,
    BreakdownType::NetworkIssue,
    BreakdownType::ConnectivityLoss,
    BreakdownType::SoftwareMalfunction,
    BreakdownType::HardwareDefect,
];

/// Count `items` per label in `labels`, in label order.
fn count_by<T, K>(items: &[T], labels: &[K], key: impl Fn(&T) -> K) -> Vec<CategoryCount>
where
    K: Copy + PartialEq + Into<&'static str>,
{
    labels
        .iter()
        .map(|&label| {
            let name: &'static str = label.into();
            CategoryCount {
                key: name,
                label: title_case(name),
                count: super::count_where(items, |item| key(item) == label),
            }
        })
        .collect()
}

/// `in_progress` → `In Progress`
pub fn title_case(snake: &str) -> String {
    snake
        .split('_')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars).collect()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn site_status_breakdown(sites: &[Site]) -> Vec<CategoryCount> {
    count_by(sites, &SITE_STATUS_LABELS, |s| s.status)
}

pub fn equipment_status_breakdown(equipment: &[Equipment]) -> Vec<CategoryCount> {
    count_by(equipment, &EQUIPMENT_STATUS_LABELS, |e| e.status)
}

pub fn alert_severity_breakdown(alerts: &[Alert]) -> Vec<CategoryCount> {
    count_by(alerts, &ALERT_SEVERITY_LABELS, |a| a.severity)
}

pub fn breakdown_severity_breakdown(breakdowns: &[Breakdown]) -> Vec<CategoryCount> {
    count_by(breakdowns, &BREAKDOWN_SEVERITY_LABELS, |b| b.severity)
}

pub fn breakdown_type_breakdown(breakdowns: &[Breakdown]) -> Vec<CategoryCount> {
    count_by(breakdowns, &BREAKDOWN_TYPE_LABELS, |b| b.breakdown_type)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn equipment(status: &str) -> Equipment {
        serde_json::from_value(json!({
            "id": "e", "name": "BTS", "status": status, "site_id": "s"
        }))
        .unwrap()
    }

    #[test]
    fn unknown_statuses_are_not_drawn() {
        let rows = vec![
            equipment("operational"),
            equipment("operational"),
            equipment("faulty"),
            equipment("decommissioned"),
        ];
        let counts = equipment_status_breakdown(&rows);
        let keys: Vec<_> = counts.iter().map(|c| c.key).collect();
        assert_eq!(keys, ["operational", "maintenance", "faulty", "offline"]);
        assert_eq!(counts.iter().map(|c| c.count).sum::<u64>(), 3);
        assert_eq!(counts[0].count, 2);
        assert_eq!(counts[0].label, "Operational");
    }

    #[test]
    fn empty_input_still_lists_every_label() {
        let counts = site_status_breakdown(&[]);
        assert_eq!(counts.len(), 4);
        assert!(counts.iter().all(|c| c.count == 0));
    }

    #[test]
    fn title_case_splits_snake() {
        assert_eq!(title_case("software_malfunction"), "Software Malfunction");
        assert_eq!(title_case("info"), "Info");
    }
}
