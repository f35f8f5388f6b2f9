// ── Aggregate metrics ──
//
// Pure reductions from freshly fetched rows to the numbers the views
// render. Each metric is computed independently over its input slice;
// nothing is cached between calls.

pub mod categories;
pub mod series;
pub mod stats;

pub use categories::{
    CategoryCount, alert_severity_breakdown, breakdown_severity_breakdown,
    breakdown_type_breakdown, equipment_status_breakdown, site_status_breakdown,
};
pub use series::{
    EnergyPoint, MaintenancePoint, MonthBucket, TREND_MONTHS, month_buckets, monthly_energy,
    monthly_maintenance,
};
pub use stats::{
    BreakdownStats, DashboardCounts, DashboardStats, EnergyStats, ReportSummary, SiteEnergy,
    SiteStats, UserStats, format_resolution_time,
};

/// `part / total × 100`, with a zero total treated as 1 so the result is 0%.
pub fn percentage(part: u64, total: u64) -> f64 {
    #[allow(clippy::cast_precision_loss, clippy::as_conversions)]
    let (part, total) = (part as f64, total.max(1) as f64);
    part / total * 100.0
}

pub(crate) fn count<T>(items: &[T]) -> u64 {
    u64::try_from(items.len()).unwrap_or(u64::MAX)
}

/// Count of items matching `pred`, as `u64`.
pub(crate) fn count_where<T>(items: &[T], pred: impl Fn(&T) -> bool) -> u64 {
    items.iter().filter(|item| pred(item)).fold(0, |n, _| n + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_total_is_zero_percent() {
        assert!(percentage(0, 0).abs() < f64::EPSILON);
        assert!(percentage(5, 0).is_finite());
    }

    #[test]
    fn ordinary_percentage() {
        assert!((percentage(3, 4) - 75.0).abs() < f64::EPSILON);
        assert!((percentage(10, 10) - 100.0).abs() < f64::EPSILON);
    }
}
