// ── Monthly trend series ──
//
// Six calendar-month buckets ending with the current month, built in the
// caller's time zone. Buckets are half-open `[first of month, first of
// next month)`, so an instant belongs to at most one bucket and late
// evening on the last day of a month is never dropped.

use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};
use serde::Serialize;

use crate::model::energy::round2;
use crate::model::{EnergyRecord, Intervention, InterventionStatus};

/// Number of buckets in every trend series.
pub const TREND_MONTHS: u32 = 6;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthBucket {
    /// Short month and two-digit year, e.g. `Oct 26`.
    pub label: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl MonthBucket {
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnergyPoint {
    pub label: String,
    pub consumption_kwh: f64,
    pub cost: f64,
    pub records: u64,
    pub average_kwh: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MaintenancePoint {
    pub label: String,
    pub scheduled: u64,
    pub completed: u64,
    pub total: u64,
}

/// First day of the month `offset` months away from (`year`, `month`).
fn month_start(year: i32, month: u32, offset: i64) -> Option<NaiveDate> {
    let index = i64::from(year) * 12 + i64::from(month) - 1 + offset;
    let year = i32::try_from(index.div_euclid(12)).ok()?;
    let month = u32::try_from(index.rem_euclid(12)).ok()? + 1;
    NaiveDate::from_ymd_opt(year, month, 1)
}

/// Local midnight on `date`, resolved to an instant.
fn local_midnight<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> Option<DateTime<Utc>> {
    let naive = date.and_hms_opt(0, 0, 0)?;
    let local = tz
        .from_local_datetime(&naive)
        .earliest()
        .unwrap_or_else(|| tz.from_utc_datetime(&naive));
    Some(local.with_timezone(&Utc))
}

/// The current month and the five before it, oldest first.
pub fn month_buckets<Tz: TimeZone>(now: &DateTime<Tz>) -> Vec<MonthBucket> {
    let tz = now.timezone();
    let (year, month) = (now.year(), now.month());

    (0..TREND_MONTHS)
        .rev()
        .filter_map(|back| {
            let back = i64::from(back);
            let first = month_start(year, month, -back)?;
            let next = month_start(year, month, 1 - back)?;
            Some(MonthBucket {
                label: first.format("%b %y").to_string(),
                start: local_midnight(&tz, first)?,
                end: local_midnight(&tz, next)?,
            })
        })
        .collect()
}

fn bucket_of(buckets: &[MonthBucket], instant: DateTime<Utc>) -> Option<usize> {
    buckets.iter().position(|b| b.contains(instant))
}

/// Consumption and cost per month, bucketed by `recorded_at`.
pub fn monthly_energy<Tz: TimeZone>(
    records: &[EnergyRecord],
    now: &DateTime<Tz>,
) -> Vec<EnergyPoint> {
    let buckets = month_buckets(now);
    let mut sums = vec![(0.0_f64, 0.0_f64, 0_u64); buckets.len()];

    for record in records {
        let Some(at) = record.recorded() else { continue };
        if let Some(i) = bucket_of(&buckets, at) {
            let slot = &mut sums[i];
            slot.0 += record.consumption_kwh;
            slot.1 += record.cost();
            slot.2 += 1;
        }
    }

    buckets
        .into_iter()
        .zip(sums)
        .map(|(bucket, (kwh, cost, records))| {
            #[allow(clippy::cast_precision_loss, clippy::as_conversions)]
            let average_kwh = if records == 0 {
                0.0
            } else {
                round2(kwh / records as f64)
            };
            EnergyPoint {
                label: bucket.label,
                consumption_kwh: round2(kwh),
                cost: round2(cost),
                records,
                average_kwh,
            }
        })
        .collect()
}

/// Scheduled, completed, and total interventions per month, by `created_at`.
pub fn monthly_maintenance<Tz: TimeZone>(
    interventions: &[Intervention],
    now: &DateTime<Tz>,
) -> Vec<MaintenancePoint> {
    let buckets = month_buckets(now);
    let mut points: Vec<MaintenancePoint> = buckets
        .iter()
        .map(|b| MaintenancePoint {
            label: b.label.clone(),
            scheduled: 0,
            completed: 0,
            total: 0,
        })
        .collect();

    for item in interventions {
        if let Some(i) = bucket_of(&buckets, item.created_at) {
            let point = &mut points[i];
            point.total += 1;
            match item.status {
                InterventionStatus::Scheduled => point.scheduled += 1,
                InterventionStatus::Completed => point.completed += 1,
                _ => {}
            }
        }
    }
    points
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{FixedOffset, TimeZone};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 14, 12, 0, 0).unwrap()
    }

    fn energy(recorded_at: &str, kwh: f64, cost: Option<f64>) -> EnergyRecord {
        serde_json::from_value(json!({
            "id": "e",
            "site_id": "s",
            "consumption_kwh": kwh,
            "cost_amount": cost,
            "period_start": "2025-01-01T00:00:00Z",
            "period_end": "2025-01-02T00:00:00Z",
            "recorded_at": recorded_at
        }))
        .unwrap()
    }

    #[test]
    fn six_buckets_oldest_first_across_year_boundary() {
        let buckets = month_buckets(&now());
        let labels: Vec<_> = buckets.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, ["Sep 25", "Oct 25", "Nov 25", "Dec 25", "Jan 26", "Feb 26"]);
        for pair in buckets.windows(2) {
            assert_eq!(pair[0].end, pair[1].start, "gap between buckets");
        }
        assert_eq!(
            buckets[5].end,
            Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn december_rolls_into_next_year() {
        let dec = Utc.with_ymd_and_hms(2026, 12, 3, 0, 0, 0).unwrap();
        let buckets = month_buckets(&dec);
        assert_eq!(buckets[0].label, "Jul 26");
        assert_eq!(
            buckets[5].end,
            Utc.with_ymd_and_hms(2027, 1, 1, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn local_time_zone_moves_boundaries() {
        let tz = FixedOffset::east_opt(3600).unwrap();
        let local_now = tz.with_ymd_and_hms(2026, 2, 14, 12, 0, 0).unwrap();
        let buckets = month_buckets(&local_now);
        assert_eq!(
            buckets[5].start,
            Utc.with_ymd_and_hms(2026, 1, 31, 23, 0, 0).unwrap()
        );
    }

    #[test]
    fn energy_sums_per_month_with_empty_buckets() {
        let records = vec![
            energy("2026-02-01T00:00:00Z", 100.0, Some(15.0)),
            energy("2026-02-10T08:00:00Z", 50.5, None),
            energy("2025-11-30T23:59:59Z", 20.0, Some(3.0)),
            energy("2025-08-31T23:59:59Z", 999.0, Some(1.0)),
        ];
        let series = monthly_energy(&records, &now());
        assert_eq!(series.len(), 6);
        assert!((series[5].consumption_kwh - 150.5).abs() < 1e-9);
        assert!((series[5].cost - 15.0).abs() < 1e-9);
        assert_eq!(series[5].records, 2);
        assert!((series[5].average_kwh - 75.25).abs() < 1e-9);
        assert!((series[2].consumption_kwh - 20.0).abs() < 1e-9);
        assert_eq!(series[0].records, 0);
        assert_eq!(series.iter().map(|p| p.records).sum::<u64>(), 3);
    }

    #[test]
    fn maintenance_counts_by_status() {
        let rows: Vec<Intervention> = serde_json::from_value(json!([
            { "id": "i1", "status": "scheduled", "created_at": "2026-02-02T10:00:00Z" },
            { "id": "i2", "status": "completed", "created_at": "2026-02-03T10:00:00Z" },
            { "id": "i3", "status": "in_progress", "created_at": "2026-02-04T10:00:00Z" },
            { "id": "i4", "status": "completed", "created_at": "2025-10-04T10:00:00Z" }
        ]))
        .unwrap();
        let series = monthly_maintenance(&rows, &now());
        assert_eq!(
            series[5],
            MaintenancePoint {
                label: "Feb 26".into(),
                scheduled: 1,
                completed: 1,
                total: 3
            }
        );
        assert_eq!(series[1].completed, 1);
        assert_eq!(series[3].total, 0);
    }
}
