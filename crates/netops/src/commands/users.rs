//! User profile command handlers. Listing needs an admin or manager
//! acting user; edits and deletes need an admin.

use chrono::Local;
use tabled::Tabled;

use netops_core::{
    Command as CoreCommand, CommandResult, Controller, EntityId, Profile, UpdateProfileRequest,
};

use crate::cli::{GlobalOpts, UsersArgs, UsersCommand};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct UserRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Email")]
    email: String,
    #[tabled(rename = "Role")]
    role: String,
    #[tabled(rename = "Region")]
    region: String,
    #[tabled(rename = "Department")]
    department: String,
}

impl From<&Profile> for UserRow {
    fn from(p: &Profile) -> Self {
        Self {
            id: p.id.to_string(),
            name: p.display_name(),
            email: util::or_dash(p.email.as_deref()),
            role: util::or_dash(p.role),
            region: util::or_dash(p.region.as_deref()),
            department: util::or_dash(p.department.as_deref()),
        }
    }
}

pub async fn handle(
    controller: &Controller,
    args: UsersArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        UsersCommand::List => {
            let profiles = controller.profiles().await?;
            let out = output::render_list(&global.output, &profiles, |x| UserRow::from(x), |p| {
                p.id.to_string()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        UsersCommand::Edit {
            id,
            name,
            role,
            region,
            phone,
            department,
        } => {
            let update = UpdateProfileRequest {
                full_name: name,
                role: util::parse_opt_choice("role", role.as_deref())?,
                region: region.map(Some),
                phone: phone.map(Some),
                department: department.map(Some),
            };
            let result = controller
                .execute(CoreCommand::UpdateUser {
                    id: EntityId::from(id),
                    update,
                })
                .await?;
            if let CommandResult::Profile(profile) = result {
                let out = output::render_list(
                    &global.output,
                    std::slice::from_ref(&profile),
                    |x| UserRow::from(x),
                    |p| p.id.to_string(),
                );
                output::print_output(&out, global.quiet);
            }
            Ok(())
        }

        UsersCommand::Delete { id } => {
            if !util::confirm(&format!("Delete user {id}?"), "users delete", global.yes)? {
                return Ok(());
            }
            controller
                .execute(CoreCommand::DeleteUser {
                    id: EntityId::from(id),
                })
                .await?;
            if !global.quiet {
                eprintln!("User deleted");
            }
            Ok(())
        }

        UsersCommand::Stats => {
            let stats = controller.user_stats(&Local::now()).await?;
            let out = output::render_single(
                &global.output,
                &stats,
                |s| {
                    output::key_values(&[
                        ("Total", s.total.to_string()),
                        ("Admins", s.admins.to_string()),
                        ("Managers", s.managers.to_string()),
                        ("Engineers", s.engineers.to_string()),
                        ("Technicians", s.technicians.to_string()),
                        ("Active today", s.active_today.to_string()),
                    ])
                },
                |s| s.total.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
