//! Config subcommand handlers.

use dialoguer::{Input, Select};

use netops_config::{Config, Profile};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config;
use crate::error::CliError;
use crate::output;

const MASK: &str = "********";

// ── Helpers ─────────────────────────────────────────────────────────

fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "prompt".into(),
        reason: e.to_string(),
    }
}

fn profile_not_found(cfg: &Config, name: String) -> CliError {
    let names: Vec<&str> = cfg.profiles.keys().map(String::as_str).collect();
    let available = match names.as_slice() {
        [] => "(none)".to_owned(),
        _ => names.join(", "),
    };
    CliError::ProfileNotFound { name, available }
}

/// Copy of the config with plaintext secrets blanked out.
fn redacted(cfg: &Config) -> Config {
    let mut shown = cfg.clone();
    for profile in shown.profiles.values_mut() {
        if profile.api_key.is_some() {
            profile.api_key = Some(MASK.into());
        }
        if profile.access_token.is_some() {
            profile.access_token = Some(MASK.into());
        }
    }
    shown
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str, expected: &str) -> Result<T, CliError> {
    value.parse().map_err(|_| CliError::Validation {
        field: key.into(),
        reason: format!("must be {expected}"),
    })
}

/// Apply `key = value` to a profile.
fn set_profile_value(profile: &mut Profile, key: &str, value: String) -> Result<(), CliError> {
    match key {
        "url" => {
            url::Url::parse(&value).map_err(|e| CliError::Validation {
                field: "url".into(),
                reason: e.to_string(),
            })?;
            profile.url = value;
        }
        "api_key" | "api-key" => profile.api_key = Some(value),
        "api_key_env" | "api-key-env" => profile.api_key_env = Some(value),
        "access_token" | "access-token" => profile.access_token = Some(value),
        "access_token_env" | "access-token-env" => profile.access_token_env = Some(value),
        "acting_user" | "acting-user" => profile.acting_user = Some(value),
        "ca_cert" | "ca-cert" => profile.ca_cert = Some(value.into()),
        "insecure" => profile.insecure = Some(parse_value(key, &value, "'true' or 'false'")?),
        "timeout" => profile.timeout = Some(parse_value(key, &value, "a number (seconds)")?),
        "alert_poll_secs" | "alert-poll-secs" => {
            profile.alert_poll_secs = Some(parse_value(key, &value, "a number (seconds)")?);
        }
        "live_poll_secs" | "live-poll-secs" => {
            profile.live_poll_secs = Some(parse_value(key, &value, "a number (seconds)")?);
        }
        "energy_tariff" | "energy-tariff" => {
            let tariff: f64 = parse_value(key, &value, "a number (cost per kWh)")?;
            if !tariff.is_finite() || tariff < 0.0 {
                return Err(CliError::Validation {
                    field: key.into(),
                    reason: "must be a non-negative number".into(),
                });
            }
            profile.energy_tariff = Some(tariff);
        }
        other => {
            return Err(CliError::Validation {
                field: other.into(),
                reason: format!(
                    "unknown config key '{other}'. Valid keys: url, api_key, api_key_env, \
                     access_token, access_token_env, acting_user, ca_cert, insecure, timeout, \
                     alert_poll_secs, live_poll_secs, energy_tariff"
                ),
            });
        }
    }
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Init: interactive wizard ────────────────────────────────
        ConfigCommand::Init => init(),

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = netops_config::load_config_or_default();
            let out = output::render_single(
                &global.output,
                &redacted(&cfg),
                |c| toml::to_string_pretty(c).unwrap_or_else(|e| format!("{c:#?}\n({e})")),
                |_| netops_config::config_path().display().to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── Profiles ────────────────────────────────────────────────
        ConfigCommand::Profiles => {
            let cfg = netops_config::load_config_or_default();
            let active = config::active_profile_name(global, &cfg);
            if cfg.profiles.is_empty() {
                eprintln!("No profiles configured. Run: netops config init");
            } else {
                for name in cfg.profiles.keys() {
                    if *name == active {
                        println!("{name} *");
                    } else {
                        println!("{name}");
                    }
                }
            }
            Ok(())
        }

        // ── Use <name> ──────────────────────────────────────────────
        ConfigCommand::Use { name } => {
            let mut cfg = netops_config::load_config_or_default();
            if !cfg.profiles.contains_key(&name) {
                return Err(profile_not_found(&cfg, name));
            }
            cfg.default_profile = Some(name.clone());
            netops_config::save_config(&cfg)?;
            eprintln!("Now using profile '{name}'");
            Ok(())
        }

        // ── Set <key> <value> ───────────────────────────────────────
        ConfigCommand::Set { key, value } => {
            let mut cfg = netops_config::load_config_or_default();
            let profile_name = config::active_profile_name(global, &cfg);
            let profile = cfg.profiles.entry(profile_name.clone()).or_default();
            set_profile_value(profile, &key, value)?;
            netops_config::save_config(&cfg)?;
            eprintln!("{profile_name}.{key} updated");
            Ok(())
        }

        // ── SetKey ──────────────────────────────────────────────────
        ConfigCommand::SetKey {
            profile,
            access_token,
        } => {
            let cfg = netops_config::load_config_or_default();
            let profile_name = profile.unwrap_or_else(|| config::active_profile_name(global, &cfg));
            if !cfg.profiles.contains_key(&profile_name) {
                return Err(profile_not_found(&cfg, profile_name));
            }

            let (key, prompt) = if access_token {
                ("access-token", "Access token: ")
            } else {
                ("api-key", "API key: ")
            };
            let secret = rpassword::prompt_password(prompt).map_err(prompt_err)?;
            if secret.is_empty() {
                return Err(CliError::Validation {
                    field: key.into(),
                    reason: "nothing was entered".into(),
                });
            }
            netops_config::store_secret(&profile_name, key, &secret)?;
            eprintln!("Saved {key} for '{profile_name}' to the OS keyring");
            Ok(())
        }
    }
}

fn init() -> Result<(), CliError> {
    let config_path = netops_config::config_path();
    eprintln!("netops configuration wizard");
    eprintln!("Writing to {}\n", config_path.display());

    let profile_name: String = Input::new()
        .with_prompt("Name this backend profile")
        .default("default".to_owned())
        .interact_text()
        .map_err(prompt_err)?;

    let url: String = Input::new()
        .with_prompt("Backend URL")
        .validate_with(|input: &String| -> Result<(), String> {
            url::Url::parse(input).map(|_| ()).map_err(|e| e.to_string())
        })
        .interact_text()
        .map_err(prompt_err)?;

    let key = rpassword::prompt_password("API key: ").map_err(prompt_err)?;
    if key.is_empty() {
        return Err(CliError::Validation {
            field: "api_key".into(),
            reason: "an API key is required".into(),
        });
    }

    let store_choices = &[
        "OS keyring",
        "config.toml (plaintext)",
    ];
    let store_selection = Select::new()
        .with_prompt("Keep the API key in")
        .items(store_choices)
        .default(0)
        .interact()
        .map_err(prompt_err)?;

    let api_key = if store_selection == 0 {
        netops_config::store_secret(&profile_name, "api-key", &key)?;
        eprintln!("API key saved to the OS keyring");
        None
    } else {
        Some(key)
    };

    let acting_user: String = Input::new()
        .with_prompt("Your profile id (for role-gated commands, blank to skip)")
        .allow_empty(true)
        .interact_text()
        .map_err(prompt_err)?;

    let profile = Profile {
        url,
        api_key,
        acting_user: Some(acting_user.trim().to_owned()).filter(|s| !s.is_empty()),
        ..Profile::default()
    };

    let mut cfg = netops_config::load_config_or_default();
    cfg.profiles.insert(profile_name.clone(), profile);
    cfg.default_profile = Some(profile_name.clone());

    let written = netops_config::save_config(&cfg)?;

    eprintln!("\nSaved {}", written.display());
    eprintln!("Profile '{profile_name}' is now the default");
    eprintln!("Try it with: netops dashboard");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn set_validates_typed_keys() {
        let mut profile = Profile::default();
        set_profile_value(&mut profile, "timeout", "45".into()).unwrap();
        set_profile_value(&mut profile, "energy-tariff", "0.2".into()).unwrap();
        assert_eq!(profile.timeout, Some(45));
        assert_eq!(profile.energy_tariff, Some(0.2));

        assert!(set_profile_value(&mut profile, "energy_tariff", "-1".into()).is_err());
        assert!(set_profile_value(&mut profile, "url", "not a url".into()).is_err());
        assert!(set_profile_value(&mut profile, "colour", "red".into()).is_err());
    }

    #[test]
    fn show_masks_plaintext_secrets() {
        let mut cfg = Config::default();
        cfg.profiles.insert(
            "lab".into(),
            Profile {
                url: "https://lab.example.co".into(),
                api_key: Some("sk-live".into()),
                ..Profile::default()
            },
        );
        let shown = redacted(&cfg);
        assert_eq!(shown.profiles["lab"].api_key.as_deref(), Some(MASK));
        assert_eq!(shown.profiles["lab"].access_token, None);
    }
}
