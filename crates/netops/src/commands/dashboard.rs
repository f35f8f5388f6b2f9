//! Dashboard overview cards.

use netops_core::Controller;
use netops_core::metrics::DashboardStats;

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

fn render_cards(stats: &DashboardStats) -> String {
    let c = &stats.counts;
    output::key_values(&[
        ("Sites", format!("{} ({} active)", c.total_sites, c.active_sites)),
        ("Uptime", format!("{:.1}%", stats.uptime_pct)),
        ("Equipment", c.total_equipment.to_string()),
        ("Active alerts", c.active_alerts.to_string()),
        (
            "Breakdowns",
            format!("{} ({} active)", c.total_breakdowns, c.active_breakdowns),
        ),
        (
            "Recent energy",
            format!(
                "{:.1} kWh / {:.2} over {} readings",
                stats.recent_energy_kwh, stats.recent_energy_cost, stats.recent_energy_records
            ),
        ),
    ])
}

pub async fn handle(controller: &Controller, global: &GlobalOpts) -> Result<(), CliError> {
    let stats = controller.dashboard().await;
    let out = output::render_single(&global.output, &stats, render_cards, |s| {
        s.counts.active_breakdowns.to_string()
    });
    output::print_output(&out, global.quiet);
    Ok(())
}
