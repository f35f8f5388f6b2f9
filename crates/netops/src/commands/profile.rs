//! The acting user's own profile. Any role may edit its own name and
//! contact fields.

use netops_core::{Command as CoreCommand, CommandResult, Controller, Profile, UpdateProfileRequest};

use crate::cli::{GlobalOpts, ProfileArgs, ProfileCommand};
use crate::error::CliError;
use crate::output;

use super::util;

fn detail(p: &Profile) -> String {
    output::key_values(&[
        ("ID", p.id.to_string()),
        ("Name", p.display_name()),
        ("Email", util::or_dash(p.email.as_deref())),
        ("Role", util::or_dash(p.role)),
        ("Region", util::or_dash(p.region.as_deref())),
        ("Phone", util::or_dash(p.phone.as_deref())),
        ("Department", util::or_dash(p.department.as_deref())),
        ("Updated", util::format_time(p.updated_at)),
    ])
}

/// `Some("")` clears the column.
fn clearable(value: Option<String>) -> Option<Option<String>> {
    value.map(|v| {
        let v = v.trim().to_owned();
        if v.is_empty() { None } else { Some(v) }
    })
}

fn own_update(
    name: Option<String>,
    region: Option<String>,
    phone: Option<String>,
    department: Option<String>,
) -> UpdateProfileRequest {
    UpdateProfileRequest {
        full_name: name.map(|n| n.trim().to_owned()),
        role: None,
        region: clearable(region),
        phone: clearable(phone),
        department: clearable(department),
    }
}

pub async fn handle(
    controller: &Controller,
    args: ProfileArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let profile = match args.command {
        ProfileCommand::Show => controller.acting_profile().await?,

        ProfileCommand::Edit {
            name,
            region,
            phone,
            department,
        } => {
            let update = own_update(name, region, phone, department);
            match controller
                .execute(CoreCommand::UpdateOwnProfile(update))
                .await?
            {
                CommandResult::Profile(p) => {
                    if !global.quiet {
                        eprintln!("Profile updated");
                    }
                    p
                }
                other => {
                    return Err(CliError::ApiError {
                        code: "internal".into(),
                        message: format!("unexpected command result: {other:?}"),
                    });
                }
            }
        }
    };

    let out = output::render_single(&global.output, &profile, detail, |p| p.id.to_string());
    output::print_output(&out, global.quiet);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_flags_clear_and_absent_flags_keep() {
        let update = own_update(
            Some(" Ade Bello ".into()),
            Some(String::new()),
            None,
            Some("Field Ops".into()),
        );
        assert_eq!(update.full_name.as_deref(), Some("Ade Bello"));
        assert_eq!(update.region, Some(None));
        assert_eq!(update.phone, None);
        assert_eq!(update.department, Some(Some("Field Ops".into())));
        assert!(update.role.is_none());
    }
}
