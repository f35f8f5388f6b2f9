//! Site command handlers.

use tabled::Tabled;

use netops_core::{Controller, Site};

use crate::cli::{GlobalOpts, SitesArgs, SitesCommand};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct SiteRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Code")]
    code: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Type")]
    site_type: String,
    #[tabled(rename = "Region")]
    region: String,
}

impl From<&Site> for SiteRow {
    fn from(s: &Site) -> Self {
        Self {
            id: s.id.to_string(),
            code: util::or_dash(s.code.as_deref()),
            name: s.name.clone(),
            status: s.status.to_string(),
            site_type: util::or_dash(s.site_type.as_deref()),
            region: util::or_dash(s.region.as_deref()),
        }
    }
}

pub async fn handle(
    controller: &Controller,
    args: SitesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        SitesCommand::List => {
            let sites = controller.sites().await?;
            let out = output::render_list(&global.output, &sites, |x| SiteRow::from(x), |s| {
                s.id.to_string()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        SitesCommand::Stats => {
            let stats = controller.site_stats().await;
            let out = output::render_single(
                &global.output,
                &stats,
                |s| {
                    output::key_values(&[
                        ("Total", s.total.to_string()),
                        ("Active", s.active.to_string()),
                        ("Maintenance", s.maintenance.to_string()),
                        ("Offline", s.offline.to_string()),
                    ])
                },
                |s| s.total.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
