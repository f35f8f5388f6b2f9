//! Breakdown command handlers.

use chrono::Utc;
use tabled::Tabled;

use netops_core::lifecycle;
use netops_core::model::format_downtime;
use netops_core::{
    Breakdown, BreakdownDraft, BreakdownFilter, BreakdownStatus, Command as CoreCommand,
    CommandResult, Controller, EntityId, UpdateBreakdownRequest,
};

use crate::cli::{
    BreakdownEditArgs, BreakdownReportArgs, BreakdownsArgs, BreakdownsCommand, GlobalOpts,
};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct BreakdownRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Type")]
    breakdown_type: String,
    #[tabled(rename = "Severity")]
    severity: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Site")]
    site: String,
    #[tabled(rename = "Reported")]
    reported: String,
    #[tabled(rename = "Downtime")]
    downtime: String,
}

fn breakdown_row(b: &Breakdown, color: bool) -> BreakdownRow {
    BreakdownRow {
        id: b.id.to_string(),
        title: b.title.clone(),
        breakdown_type: b.breakdown_type.to_string(),
        severity: output::paint_severity(b.severity, color),
        status: output::paint_status(b.status, color),
        site: site_label(b),
        reported: util::format_time(b.reported()),
        downtime: util::or_dash(b.downtime(Utc::now()).map(format_downtime)),
    }
}

fn site_label(b: &Breakdown) -> String {
    b.site
        .as_ref()
        .map_or_else(|| b.site_id.to_string(), |s| s.name.clone())
}

fn detail(b: &Breakdown, color: bool) -> String {
    let next: Vec<&str> = lifecycle::allowed_next(b.status)
        .iter()
        .copied()
        .map(BreakdownStatus::as_str)
        .collect();
    output::key_values(&[
        ("ID", b.id.to_string()),
        ("Title", b.title.clone()),
        ("Description", util::or_dash(b.description.as_deref())),
        ("Type", b.breakdown_type.to_string()),
        ("Severity", output::paint_severity(b.severity, color)),
        ("Priority", b.priority.to_string()),
        ("Status", output::paint_status(b.status, color)),
        (
            "Next",
            if next.is_empty() {
                "-".into()
            } else {
                next.join(", ")
            },
        ),
        ("Site", site_label(b)),
        (
            "Equipment",
            util::or_dash(
                b.equipment
                    .as_ref()
                    .map(|e| e.name.clone())
                    .or_else(|| b.equipment_id.as_ref().map(ToString::to_string)),
            ),
        ),
        (
            "Reporter",
            util::or_dash(b.reporter.as_ref().and_then(|p| p.full_name.clone())),
        ),
        (
            "Assignee",
            util::or_dash(b.assignee.as_ref().and_then(|p| p.full_name.clone())),
        ),
        ("Impacted users", b.impact().to_string()),
        ("Estimated fix", util::or_dash(b.estimated_fix_time)),
        ("Reported", util::format_time(b.reported())),
        ("Acknowledged", util::format_time(b.acknowledged_at)),
        ("Downtime start", util::format_time(b.downtime_start)),
        ("Downtime end", util::format_time(b.downtime_end)),
        ("Resolved", util::format_time(b.resolved_at)),
        ("Closed", util::format_time(b.closed_at)),
        (
            "Downtime",
            util::or_dash(b.downtime(Utc::now()).map(format_downtime)),
        ),
        ("Root cause", util::or_dash(b.root_cause.as_deref())),
        ("Resolution", util::or_dash(b.resolution_notes.as_deref())),
    ])
}

fn into_breakdown(result: CommandResult) -> Result<Breakdown, CliError> {
    match result {
        CommandResult::Breakdown(b) => Ok(*b),
        other => Err(CliError::ApiError {
            code: "internal".into(),
            message: format!("unexpected command result: {other:?}"),
        }),
    }
}

fn print_breakdown(b: &Breakdown, global: &GlobalOpts) {
    let color = output::should_color(&global.color);
    let out = output::render_single(&global.output, b, |b| detail(b, color), |b| b.id.to_string());
    output::print_output(&out, global.quiet);
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    controller: &Controller,
    args: BreakdownsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        BreakdownsCommand::List {
            status,
            severity,
            site,
            active,
            limit,
        } => {
            let filter = BreakdownFilter {
                status: util::parse_opt_choice("status", status.as_deref())?,
                severity: util::parse_opt_choice("severity", severity.as_deref())?,
                site_id: util::opt_id(site.as_deref()),
                active_only: active,
                limit: limit.and_then(|l| usize::try_from(l).ok()),
            };
            let breakdowns = controller.breakdowns(&filter).await?;
            let color = output::should_color(&global.color);
            let out = output::render_list(
                &global.output,
                &breakdowns,
                |b| breakdown_row(b, color),
                |b| b.id.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        BreakdownsCommand::Get { id } => {
            let breakdown = controller.breakdown(&EntityId::from(id)).await?;
            print_breakdown(&breakdown, global);
            Ok(())
        }

        BreakdownsCommand::Report(report) => {
            let req = report_request(controller, report).await?;
            let created = into_breakdown(
                controller
                    .execute(CoreCommand::ReportBreakdown(req))
                    .await?,
            )?;
            if !global.quiet {
                eprintln!("Breakdown reported");
            }
            print_breakdown(&created, global);
            Ok(())
        }

        BreakdownsCommand::Ack { id } => {
            transition(controller, id, BreakdownStatus::Investigating, global).await
        }
        BreakdownsCommand::Start { id } => {
            transition(controller, id, BreakdownStatus::InProgress, global).await
        }
        BreakdownsCommand::Resolve { id } => {
            transition(controller, id, BreakdownStatus::Resolved, global).await
        }
        BreakdownsCommand::Close { id } => {
            transition(controller, id, BreakdownStatus::Closed, global).await
        }
        BreakdownsCommand::Transition { id, to } => {
            let to = util::parse_choice("to", &to)?;
            transition(controller, id, to, global).await
        }

        BreakdownsCommand::Edit(edit) => {
            let id = EntityId::from(edit.id.as_str());
            let update = edit_request(edit)?;
            let updated = into_breakdown(
                controller
                    .execute(CoreCommand::EditBreakdown {
                        id,
                        update: Box::new(update),
                    })
                    .await?,
            )?;
            if !global.quiet {
                eprintln!("Breakdown updated");
            }
            print_breakdown(&updated, global);
            Ok(())
        }

        BreakdownsCommand::Delete { id } => {
            if !util::confirm(&format!("Delete breakdown {id}?"), "breakdowns delete", global.yes)? {
                return Ok(());
            }
            controller
                .execute(CoreCommand::DeleteBreakdown {
                    id: EntityId::from(id),
                })
                .await?;
            if !global.quiet {
                eprintln!("Breakdown deleted");
            }
            Ok(())
        }

        BreakdownsCommand::Stats => {
            let stats = controller.breakdown_stats().await;
            let out = output::render_single(
                &global.output,
                &stats,
                |s| {
                    output::key_values(&[
                        ("Total", s.total.to_string()),
                        ("Open", s.open.to_string()),
                        ("Investigating", s.investigating.to_string()),
                        ("In progress", s.in_progress.to_string()),
                        ("Active", s.active.to_string()),
                        ("Resolved", s.resolved.to_string()),
                        ("Critical", s.critical.to_string()),
                        ("Impacted users", s.impacted_users.to_string()),
                        ("Avg. resolution", s.average_resolution_label()),
                    ])
                },
                |s| s.active.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}

async fn transition(
    controller: &Controller,
    id: String,
    to: BreakdownStatus,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let updated = into_breakdown(
        controller
            .execute(CoreCommand::TransitionBreakdown {
                id: EntityId::from(id),
                to,
            })
            .await?,
    )?;
    if !global.quiet {
        eprintln!("Breakdown {} is now {}", updated.id, updated.status);
    }
    print_breakdown(&updated, global);
    Ok(())
}

// ── Request builders ────────────────────────────────────────────────

/// Fill a draft the way the report form does: pick the site, then pick
/// equipment out of that site's inventory.
async fn report_request(
    controller: &Controller,
    args: BreakdownReportArgs,
) -> Result<netops_core::CreateBreakdownRequest, CliError> {
    let site_id = EntityId::from(args.site);
    let mut draft = BreakdownDraft {
        title: args.title,
        description: args.description,
        breakdown_type: Some(util::parse_choice("type", &args.breakdown_type)?),
        severity: Some(util::parse_choice("severity", &args.severity)?),
        priority: util::parse_opt_choice("priority", args.priority.as_deref())?,
        impact_users: args.impact_users,
        estimated_fix_time: util::parse_fix_hours(args.estimated_fix)?,
        assigned_to: util::opt_id(args.assign.as_deref()),
        ..BreakdownDraft::default()
    };
    draft.scope.select_site(Some(site_id.clone()));
    if let Some(eq) = args.equipment {
        let inventory = controller.equipment(Some(&site_id)).await?;
        draft
            .scope
            .select_equipment(Some(EntityId::from(eq)), &inventory)?;
    }
    Ok(draft.validate(controller.config().acting_user.clone(), Utc::now())?)
}

fn edit_request(args: BreakdownEditArgs) -> Result<UpdateBreakdownRequest, CliError> {
    Ok(UpdateBreakdownRequest {
        title: args.title,
        description: args.description.map(Some),
        breakdown_type: util::parse_opt_choice("type", args.breakdown_type.as_deref())?,
        severity: util::parse_opt_choice("severity", args.severity.as_deref())?,
        priority: util::parse_opt_choice("priority", args.priority.as_deref())?,
        status: util::parse_opt_choice("status", args.status.as_deref())?,
        site_id: util::opt_id(args.site.as_deref()),
        equipment_id: util::nullable(util::opt_id(args.equipment.as_deref()), args.clear_equipment),
        assigned_to: util::nullable(util::opt_id(args.assign.as_deref()), args.unassign),
        impact_users: args.impact_users,
        estimated_fix_time: util::parse_fix_hours(args.estimated_fix)?.map(Some),
        downtime_start: None,
        downtime_end: util::parse_opt_time("downtime-end", args.downtime_end.as_deref())?.map(Some),
        root_cause: args.root_cause.map(Some),
        resolution_notes: args.resolution_notes.map(Some),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use clap::Parser;

    use crate::cli::{Cli, Command};

    use super::*;

    fn parse_edit(args: &[&str]) -> BreakdownEditArgs {
        let mut argv = vec!["netops", "breakdowns", "edit"];
        argv.extend_from_slice(args);
        match Cli::try_parse_from(argv).unwrap().command {
            Command::Breakdowns(BreakdownsArgs {
                command: BreakdownsCommand::Edit(edit),
            }) => edit,
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn edit_flags_map_to_partial_update() {
        let update = edit_request(parse_edit(&[
            "b-1",
            "--status",
            "resolved",
            "--clear-equipment",
            "--estimated-fix",
            "1.5",
        ]))
        .unwrap();
        assert_eq!(update.status, Some(BreakdownStatus::Resolved));
        assert_eq!(update.equipment_id, Some(None));
        assert_eq!(update.assigned_to, None);
        assert_eq!(update.estimated_fix_time.unwrap().unwrap().minutes(), 90);
        assert!(update.title.is_none());
    }

    #[test]
    fn equipment_and_clear_conflict() {
        let argv = [
            "netops",
            "breakdowns",
            "edit",
            "b-1",
            "--equipment",
            "eq-1",
            "--clear-equipment",
        ];
        assert!(Cli::try_parse_from(argv).is_err());
    }
}
