//! Network-wide report, chart data, and exports.

use std::io::IsTerminal;
use std::path::Path;
use std::time::Duration;

use chrono::{Local, Utc};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tabled::Tabled;

use netops_core::metrics::{
    self, CategoryCount, EnergyPoint, MaintenancePoint, ReportSummary,
};
use netops_core::{Controller, Snapshot, export};

use crate::cli::{ExportCollection, GlobalOpts, ReportsArgs, ReportsCommand};
use crate::error::CliError;
use crate::output;

// ── Chart data ──────────────────────────────────────────────────────

#[derive(Serialize)]
struct Charts {
    site_status: Vec<CategoryCount>,
    equipment_status: Vec<CategoryCount>,
    alert_severity: Vec<CategoryCount>,
    breakdown_severity: Vec<CategoryCount>,
    breakdown_type: Vec<CategoryCount>,
    energy_trend: Vec<EnergyPoint>,
    maintenance_trend: Vec<MaintenancePoint>,
}

impl Charts {
    fn compute(snapshot: &Snapshot) -> Self {
        let now = Local::now();
        Self {
            site_status: metrics::site_status_breakdown(&snapshot.sites),
            equipment_status: metrics::equipment_status_breakdown(&snapshot.equipment),
            alert_severity: metrics::alert_severity_breakdown(&snapshot.alerts),
            breakdown_severity: metrics::breakdown_severity_breakdown(&snapshot.breakdowns),
            breakdown_type: metrics::breakdown_type_breakdown(&snapshot.breakdowns),
            energy_trend: metrics::monthly_energy(&snapshot.energy, &now),
            maintenance_trend: metrics::monthly_maintenance(&snapshot.interventions, &now),
        }
    }
}

#[derive(Tabled)]
struct CategoryRow {
    #[tabled(rename = "Category")]
    label: String,
    #[tabled(rename = "Count")]
    count: u64,
}

#[derive(Tabled)]
struct MaintenanceRow {
    #[tabled(rename = "Month")]
    month: String,
    #[tabled(rename = "Scheduled")]
    scheduled: u64,
    #[tabled(rename = "Completed")]
    completed: u64,
    #[tabled(rename = "Total")]
    total: u64,
}

#[derive(Tabled)]
struct EnergyTrendRow {
    #[tabled(rename = "Month")]
    month: String,
    #[tabled(rename = "kWh")]
    kwh: String,
    #[tabled(rename = "Cost")]
    cost: String,
}

fn render_charts(charts: &Charts, format: &crate::cli::OutputFormat) -> String {
    let category = |title: &str, rows: &[CategoryCount]| {
        let table = output::render_list(
            format,
            rows,
            |c| CategoryRow {
                label: c.label.clone(),
                count: c.count,
            },
            |c| c.key.to_owned(),
        );
        format!("{title}\n{table}")
    };
    let energy = output::render_list(
        format,
        &charts.energy_trend,
        |p| EnergyTrendRow {
            month: p.label.clone(),
            kwh: format!("{:.2}", p.consumption_kwh),
            cost: format!("{:.2}", p.cost),
        },
        |p| p.label.clone(),
    );
    let maintenance = output::render_list(
        format,
        &charts.maintenance_trend,
        |p| MaintenanceRow {
            month: p.label.clone(),
            scheduled: p.scheduled,
            completed: p.completed,
            total: p.total,
        },
        |p| p.label.clone(),
    );
    [
        category("Site status", &charts.site_status),
        category("Equipment status", &charts.equipment_status),
        category("Alert severity", &charts.alert_severity),
        category("Breakdown severity", &charts.breakdown_severity),
        category("Breakdown type", &charts.breakdown_type),
        format!("Energy trend\n{energy}"),
        format!("Maintenance\n{maintenance}"),
    ]
    .join("\n\n")
}

fn render_summary(s: &ReportSummary) -> String {
    output::key_values(&[
        ("Sites", format!("{} ({} active)", s.total_sites, s.active_sites)),
        (
            "Equipment",
            format!(
                "{} ({} operational, {:.1}% healthy)",
                s.total_equipment, s.operational_equipment, s.equipment_health_pct
            ),
        ),
        (
            "Interventions",
            format!(
                "{} ({} completed)",
                s.total_interventions, s.completed_interventions
            ),
        ),
        ("Alerts", format!("{} ({} active)", s.total_alerts, s.active_alerts)),
        (
            "Breakdowns",
            format!("{} ({} active)", s.total_breakdowns, s.active_breakdowns),
        ),
        (
            "Energy",
            format!(
                "{:.2} kWh / {:.2} over {} readings",
                s.total_energy_consumption, s.total_energy_cost, s.total_energy_records
            ),
        ),
    ])
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    controller: &Controller,
    args: ReportsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let snapshot = fetch_snapshot(controller, global.quiet).await;

    match args.command {
        ReportsCommand::Overview => {
            let summary = ReportSummary::compute(&snapshot);
            let out = output::render_single(&global.output, &summary, render_summary, |s| {
                s.total_sites.to_string()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ReportsCommand::Charts => {
            let charts = Charts::compute(&snapshot);
            let out = output::render_single(
                &global.output,
                &charts,
                |c| render_charts(c, &global.output),
                |c| render_charts(c, &global.output),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ReportsCommand::ExportCsv {
            collection,
            out_dir,
        } => {
            let (name, csv) = collection_csv(&snapshot, collection)?;
            let path = out_dir.join(export::csv_filename(name, Local::now().date_naive()));
            write_file(&path, &csv)?;
            report_written(&path, global);
            Ok(())
        }

        ReportsCommand::ExportJson { out_dir } => {
            let json = export::report_json(&snapshot, Utc::now())?;
            let path = out_dir.join(export::report_filename(Local::now().date_naive()));
            write_file(&path, &json)?;
            report_written(&path, global);
            Ok(())
        }
    }
}

async fn fetch_snapshot(controller: &Controller, quiet: bool) -> Snapshot {
    let spinner = (!quiet && std::io::stderr().is_terminal()).then(|| {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
            pb.set_style(style);
        }
        pb.set_message("Fetching network data...");
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    });
    let snapshot = controller.snapshot().await;
    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }
    snapshot
}

fn collection_csv(
    snapshot: &Snapshot,
    collection: ExportCollection,
) -> Result<(&'static str, String), CliError> {
    let (name, csv) = match collection {
        ExportCollection::Sites => ("sites", export::to_csv(&snapshot.sites)),
        ExportCollection::Equipment => ("equipment", export::to_csv(&snapshot.equipment)),
        ExportCollection::Interventions => {
            ("interventions", export::to_csv(&snapshot.interventions))
        }
        ExportCollection::Alerts => ("alerts", export::to_csv(&snapshot.alerts)),
        ExportCollection::Breakdowns => ("breakdowns", export::to_csv(&snapshot.breakdowns)),
        ExportCollection::Energy => ("energy", export::to_csv(&snapshot.energy)),
    };
    Ok((name, csv?))
}

fn write_file(path: &Path, contents: &str) -> Result<(), CliError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, contents).map_err(|e| CliError::Export {
        message: format!("cannot write {}: {e}", path.display()),
    })
}

fn report_written(path: &Path, global: &GlobalOpts) {
    if !global.quiet {
        eprintln!("Wrote {}", path.display());
    }
    output::print_output(&path.display().to_string(), global.quiet);
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn empty_collection_is_an_export_error() {
        let err = collection_csv(&Snapshot::default(), ExportCollection::Alerts).unwrap_err();
        assert!(matches!(err, CliError::Export { ref message } if message == "no data to export"));
    }

    #[test]
    fn files_land_in_the_output_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("sites-2025-03-01.csv");
        write_file(&path, "id\ns-1").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "id\ns-1");
    }
}
