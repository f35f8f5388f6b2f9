// ── CSV and JSON report export ──

use chrono::{DateTime, NaiveDate, Utc};
use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::CoreError;
use crate::metrics::ReportSummary;
use crate::model::{Alert, Breakdown, EnergyRecord, Equipment, Intervention, Site};
use crate::snapshot::Snapshot;

/// Base name used for the bundled JSON report file.
pub const REPORT_BASENAME: &str = "telecom-report";

fn export_error(message: impl Into<String>) -> CoreError {
    CoreError::Export {
        message: message.into(),
    }
}

// ── CSV ─────────────────────────────────────────────────────────────

/// One level of nesting is lifted into `parent_child` columns.
fn flatten(row: Map<String, Value>) -> IndexMap<String, Value> {
    let mut out = IndexMap::with_capacity(row.len());
    for (key, value) in row {
        match value {
            Value::Object(inner) => {
                for (child, v) in inner {
                    out.insert(format!("{key}_{child}"), v);
                }
            }
            other => {
                out.insert(key, other);
            }
        }
    }
    out
}

fn cell(value: Option<&Value>) -> String {
    let raw = match value {
        None | Some(Value::Null) => return String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    };
    if raw.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", raw.replace('"', "\"\""))
    } else {
        raw
    }
}

/// Render rows as CSV. The header is the union of all flattened keys,
/// in first-seen order; absent and null values become empty cells.
pub fn to_csv<T: Serialize>(rows: &[T]) -> Result<String, CoreError> {
    if rows.is_empty() {
        return Err(export_error("no data to export"));
    }

    let mut flat = Vec::with_capacity(rows.len());
    for row in rows {
        match serde_json::to_value(row).map_err(|e| export_error(e.to_string()))? {
            Value::Object(map) => flat.push(flatten(map)),
            other => return Err(export_error(format!("row is not an object: {other}"))),
        }
    }

    let header: IndexSet<&str> = flat
        .iter()
        .flat_map(|row| row.keys().map(String::as_str))
        .collect();

    let mut out = String::new();
    let names: Vec<String> = header.iter().map(|h| cell(Some(&Value::from(*h)))).collect();
    out.push_str(&names.join(","));
    out.push('\n');

    for row in &flat {
        let cells: Vec<String> = header.iter().map(|h| cell(row.get(*h))).collect();
        out.push_str(&cells.join(","));
        out.push('\n');
    }
    Ok(out)
}

// ── JSON report ─────────────────────────────────────────────────────

#[derive(Serialize)]
struct BreakdownRow<'a> {
    #[serde(flatten)]
    breakdown: &'a Breakdown,
    site_name: Option<&'a str>,
    site_code: Option<&'a str>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ReportBundle<'a> {
    generated_at: DateTime<Utc>,
    summary: ReportSummary,
    sites: &'a [Site],
    equipment: &'a [Equipment],
    interventions: &'a [Intervention],
    alerts: &'a [Alert],
    breakdowns: Vec<BreakdownRow<'a>>,
    energy: &'a [EnergyRecord],
}

/// Pretty-printed bundle of every collection plus a computed summary.
pub fn report_json(snapshot: &Snapshot, generated_at: DateTime<Utc>) -> Result<String, CoreError> {
    let bundle = ReportBundle {
        generated_at,
        summary: ReportSummary::compute(snapshot),
        sites: &snapshot.sites,
        equipment: &snapshot.equipment,
        interventions: &snapshot.interventions,
        alerts: &snapshot.alerts,
        breakdowns: snapshot
            .breakdowns
            .iter()
            .map(|b| BreakdownRow {
                breakdown: b,
                site_name: b.site.as_ref().map(|s| s.name.as_str()),
                site_code: b.site.as_ref().and_then(|s| s.code.as_deref()),
            })
            .collect(),
        energy: &snapshot.energy,
    };
    serde_json::to_string_pretty(&bundle).map_err(|e| export_error(e.to_string()))
}

// ── File names ──────────────────────────────────────────────────────

/// `<name>-YYYY-MM-DD.csv`
pub fn csv_filename(name: &str, date: NaiveDate) -> String {
    format!("{name}-{}.csv", date.format("%Y-%m-%d"))
}

/// `telecom-report-YYYY-MM-DD.json`
pub fn report_filename(date: NaiveDate) -> String {
    format!("{REPORT_BASENAME}-{}.json", date.format("%Y-%m-%d"))
}
