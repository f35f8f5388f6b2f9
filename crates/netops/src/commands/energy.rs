//! Energy command handlers.

use chrono::{Local, Utc};
use tabled::Tabled;

use netops_core::metrics::{EnergyPoint, SiteEnergy};
use netops_core::{
    Command as CoreCommand, CommandResult, Controller, EnergyDraft, EnergyRecord, EntityId,
    UpdateEnergyRequest,
};

use crate::cli::{EnergyArgs, EnergyCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct EnergyRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Site")]
    site: String,
    #[tabled(rename = "Equipment")]
    equipment: String,
    #[tabled(rename = "kWh")]
    kwh: String,
    #[tabled(rename = "Cost")]
    cost: String,
    #[tabled(rename = "Period")]
    period: String,
    #[tabled(rename = "Recorded")]
    recorded: String,
}

impl From<&EnergyRecord> for EnergyRow {
    fn from(r: &EnergyRecord) -> Self {
        Self {
            id: r.id.to_string(),
            site: r
                .site
                .as_ref()
                .map_or_else(|| r.site_id.to_string(), |s| s.name.clone()),
            equipment: util::or_dash(r.equipment.as_ref().map(|e| e.name.clone())),
            kwh: format!("{:.2}", r.consumption_kwh),
            cost: util::or_dash(r.cost_amount.map(|c| format!("{c:.2}"))),
            period: format!(
                "{} -> {}",
                util::format_time(Some(r.period_start)),
                util::format_time(Some(r.period_end))
            ),
            recorded: util::format_time(r.recorded()),
        }
    }
}

#[derive(Tabled)]
struct TrendRow {
    #[tabled(rename = "Month")]
    month: String,
    #[tabled(rename = "kWh")]
    kwh: String,
    #[tabled(rename = "Cost")]
    cost: String,
    #[tabled(rename = "Readings")]
    records: u64,
    #[tabled(rename = "Avg kWh")]
    average: String,
}

impl From<&EnergyPoint> for TrendRow {
    fn from(p: &EnergyPoint) -> Self {
        Self {
            month: p.label.clone(),
            kwh: format!("{:.2}", p.consumption_kwh),
            cost: format!("{:.2}", p.cost),
            records: p.records,
            average: format!("{:.2}", p.average_kwh),
        }
    }
}

#[derive(Tabled)]
struct SiteEnergyRow {
    #[tabled(rename = "Site")]
    site: String,
    #[tabled(rename = "kWh")]
    kwh: String,
    #[tabled(rename = "Cost")]
    cost: String,
}

impl From<&SiteEnergy> for SiteEnergyRow {
    fn from(s: &SiteEnergy) -> Self {
        Self {
            site: s.site_name.clone(),
            kwh: format!("{:.2}", s.consumption_kwh),
            cost: format!("{:.2}", s.cost),
        }
    }
}

fn into_record(result: CommandResult) -> Result<EnergyRecord, CliError> {
    match result {
        CommandResult::Energy(r) => Ok(r),
        other => Err(CliError::ApiError {
            code: "internal".into(),
            message: format!("unexpected command result: {other:?}"),
        }),
    }
}

fn print_record(record: &EnergyRecord, global: &GlobalOpts) {
    let out = output::render_list(
        &global.output,
        std::slice::from_ref(record),
        |x| EnergyRow::from(x),
        |r| r.id.to_string(),
    );
    output::print_output(&out, global.quiet);
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    controller: &Controller,
    args: EnergyArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        EnergyCommand::List { site, limit } => {
            let site = util::opt_id(site.as_deref());
            let records = controller
                .energy_records(site.as_ref(), limit.and_then(|l| usize::try_from(l).ok()))
                .await?;
            let out = output::render_list(&global.output, &records, |x| EnergyRow::from(x), |r| {
                r.id.to_string()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        EnergyCommand::Record {
            site,
            equipment,
            kwh,
            cost,
            start,
            end,
        } => {
            let site_id = EntityId::from(site);
            let mut draft = EnergyDraft {
                consumption_kwh: Some(kwh),
                cost_amount: cost,
                period_start: Some(util::parse_time("start", &start)?),
                period_end: Some(util::parse_time("end", &end)?),
                ..EnergyDraft::default()
            };
            draft.scope.select_site(Some(site_id.clone()));
            if let Some(eq) = equipment {
                let inventory = controller.equipment(Some(&site_id)).await?;
                draft
                    .scope
                    .select_equipment(Some(EntityId::from(eq)), &inventory)?;
            }
            let req = draft.validate(controller.config().energy_tariff, Utc::now())?;
            let created = into_record(controller.execute(CoreCommand::RecordEnergy(req)).await?)?;
            if !global.quiet {
                eprintln!("Energy reading recorded");
            }
            print_record(&created, global);
            Ok(())
        }

        EnergyCommand::Edit {
            id,
            site,
            equipment,
            clear_equipment,
            kwh,
            cost,
            start,
            end,
        } => {
            let update = UpdateEnergyRequest {
                site_id: util::opt_id(site.as_deref()),
                equipment_id: util::nullable(util::opt_id(equipment.as_deref()), clear_equipment),
                consumption_kwh: kwh,
                cost_amount: cost,
                period_start: util::parse_opt_time("start", start.as_deref())?,
                period_end: util::parse_opt_time("end", end.as_deref())?,
            };
            let updated = into_record(
                controller
                    .execute(CoreCommand::EditEnergy {
                        id: EntityId::from(id),
                        update,
                    })
                    .await?,
            )?;
            if !global.quiet {
                eprintln!("Energy reading updated");
            }
            print_record(&updated, global);
            Ok(())
        }

        EnergyCommand::Delete { id } => {
            if !util::confirm(&format!("Delete energy reading {id}?"), "energy delete", global.yes)? {
                return Ok(());
            }
            controller
                .execute(CoreCommand::DeleteEnergy {
                    id: EntityId::from(id),
                })
                .await?;
            if !global.quiet {
                eprintln!("Energy reading deleted");
            }
            Ok(())
        }

        EnergyCommand::Stats => {
            let stats = controller.energy_stats().await;
            let out = output::render_single(
                &global.output,
                &stats,
                |s| {
                    output::key_values(&[
                        ("Total consumption", format!("{:.2} kWh", s.total_kwh)),
                        ("Total cost", format!("{:.2}", s.total_cost)),
                        ("Readings", s.records.to_string()),
                        ("Average", format!("{:.2} kWh", s.average_kwh)),
                    ])
                },
                |s| format!("{:.2}", s.total_kwh),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        EnergyCommand::Trend => {
            let points = controller.energy_trend(&Local::now()).await;
            let out = output::render_list(&global.output, &points, |x| TrendRow::from(x), |p| {
                format!("{}\t{:.2}", p.label, p.consumption_kwh)
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        EnergyCommand::BySite { limit } => {
            let rows = controller.energy_by_site(limit).await;
            let out = output::render_list(&global.output, &rows, |x| SiteEnergyRow::from(x), |s| {
                s.site_id.to_string()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
