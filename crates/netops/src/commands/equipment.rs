//! Equipment command handlers.

use tabled::Tabled;

use netops_core::{Controller, Equipment};

use crate::cli::{EquipmentArgs, EquipmentCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct EquipmentRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    equipment_type: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Site")]
    site: String,
    #[tabled(rename = "Model")]
    model: String,
}

impl From<&Equipment> for EquipmentRow {
    fn from(e: &Equipment) -> Self {
        Self {
            id: e.id.to_string(),
            name: e.name.clone(),
            equipment_type: util::or_dash(e.equipment_type.as_deref()),
            status: e.status.to_string(),
            site: e
                .site
                .as_ref()
                .map_or_else(|| e.site_id.to_string(), |s| s.name.clone()),
            model: util::or_dash(e.model.as_deref()),
        }
    }
}

pub async fn handle(
    controller: &Controller,
    args: EquipmentArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        EquipmentCommand::List { site } => {
            let site = util::opt_id(site.as_deref());
            let equipment = controller.equipment(site.as_ref()).await?;
            let out = output::render_list(&global.output, &equipment, |x| EquipmentRow::from(x), |e| {
                e.id.to_string()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
