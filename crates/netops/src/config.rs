//! Profile selection and CLI flag overrides on top of `netops-config`.
//!
//! This is the single boundary where CLI flags and TOML profiles become a
//! `netops_core::BackendConfig`.

use std::time::Duration;

use secrecy::SecretString;

use netops_config::{Config, Profile};
use netops_core::{AuthCredentials, BackendConfig, EntityId, TlsVerification};

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Build the backend config from the config file, the active profile, and
/// CLI overrides. Without a matching profile, `--url` and `--api-key`
/// alone are enough.
pub fn build_backend_config(global: &GlobalOpts) -> Result<BackendConfig, CliError> {
    let cfg = netops_config::load_config_or_default();
    let profile_name = active_profile_name(global, &cfg);

    if let Some(profile) = cfg.profiles.get(&profile_name) {
        return resolve_profile(profile, &profile_name, &cfg, global);
    }

    let url_str = global.url.as_deref().ok_or_else(|| CliError::NoConfig {
        path: netops_config::config_path().display().to_string(),
    })?;
    let profile = Profile {
        url: url_str.to_owned(),
        ..Profile::default()
    };
    if global.api_key.is_none() {
        return Err(CliError::NoCredentials {
            profile: profile_name,
        });
    }
    resolve_profile(&profile, &profile_name, &cfg, global)
}

/// Translate a profile plus global flags into a `BackendConfig`.
/// Flags win over everything the profile resolves to.
pub fn resolve_profile(
    profile: &Profile,
    profile_name: &str,
    cfg: &Config,
    global: &GlobalOpts,
) -> Result<BackendConfig, CliError> {
    let mut effective = profile.clone();
    if let Some(url) = &global.url {
        effective.url.clone_from(url);
    }
    if let Some(key) = &global.api_key {
        // Satisfies the profile's credential chain; replaced below.
        effective.api_key = Some(key.clone());
        effective.api_key_env = None;
    }

    let mut backend =
        netops_config::profile_to_backend_config(&effective, profile_name, &cfg.defaults)?;

    if let Some(key) = &global.api_key {
        let access_token = match &backend.auth {
            AuthCredentials::ApiKey { access_token, .. } => access_token.clone(),
        };
        backend.auth = AuthCredentials::ApiKey {
            api_key: SecretString::from(key.clone()),
            access_token,
        };
    }
    if let Some(token) = &global.access_token {
        let AuthCredentials::ApiKey { access_token, .. } = &mut backend.auth;
        *access_token = Some(SecretString::from(token.clone()));
    }
    if let Some(user) = &global.acting_user {
        backend.acting_user = Some(EntityId::from(user.as_str()));
    }
    if global.insecure {
        backend.tls = TlsVerification::DangerAcceptInvalid;
    }
    if let Some(secs) = global.timeout {
        backend.timeout = Duration::from_secs(secs);
    }

    tracing::debug!(
        profile = profile_name,
        url = %backend.url,
        acting_user = ?backend.acting_user,
        "resolved backend config"
    );
    Ok(backend)
}
