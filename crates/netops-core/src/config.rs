// ── Runtime backend configuration ──
//
// Describes how to reach the backend and who is acting. Carries credential
// data and tuning but never touches disk: the CLI resolves a profile into a
// `BackendConfig` and hands it in.

use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use crate::model::{DEFAULT_TARIFF_PER_KWH, EntityId};

/// How to authenticate with the backend.
#[derive(Debug, Clone)]
pub enum AuthCredentials {
    /// Project API key, optionally paired with a user access token. Without
    /// the token the API key doubles as the bearer.
    ApiKey {
        api_key: SecretString,
        access_token: Option<SecretString>,
    },
}

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(std::path::PathBuf),
    /// Skip verification. Only for self-hosted test stacks.
    DangerAcceptInvalid,
}

#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Project URL (e.g. `https://abc.example.co`); `/rest/v1/` is appended.
    pub url: Url,
    pub auth: AuthCredentials,
    pub tls: TlsVerification,
    /// Request timeout.
    pub timeout: Duration,
    /// Profile id of the operator, used for role checks and `reported_by`.
    pub acting_user: Option<EntityId>,
    pub alert_poll_interval: Duration,
    pub live_poll_interval: Duration,
    /// Tariff applied when an energy reading carries no cost.
    pub energy_tariff: f64,
}

impl BackendConfig {
    pub fn new(url: Url, auth: AuthCredentials) -> Self {
        Self {
            url,
            auth,
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
            acting_user: None,
            alert_poll_interval: Duration::from_secs(30),
            live_poll_interval: Duration::from_secs(10),
            energy_tariff: DEFAULT_TARIFF_PER_KWH,
        }
    }
}
