//! CLI configuration -- thin wrapper around `opnshaper_config`.
//!
//! Re-exports the shared types and adds resolution that respects
//! `GlobalOpts` flag overrides (--url, --api-key, --api-secret, ...).

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

use opnshaper_config::{CredentialKind, Defaults};
use opnshaper_core::{Credentials, ShaperConfig};

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub use opnshaper_config::{
    Config, Profile, config_path, load_config_or_default, save_config,
    store_credential,
};

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Translate a `Profile` + global flags into a `ShaperConfig`.
///
/// Flags take priority over profile values, profile values over defaults.
pub fn resolve_profile(
    profile: &Profile,
    profile_name: &str,
    global: &GlobalOpts,
    defaults: &Defaults,
) -> Result<ShaperConfig, CliError> {
    let url = opnshaper_config::parse_url(global.url.as_deref().unwrap_or(&profile.url))?;

    let key = match &global.api_key {
        Some(key) => key.clone(),
        None => opnshaper_config::resolve_credential(profile, profile_name, CredentialKind::ApiKey)?
            .expose_secret()
            .to_owned(),
    };
    let secret = match &global.api_secret {
        Some(secret) => SecretString::from(secret.clone()),
        None => {
            opnshaper_config::resolve_credential(profile, profile_name, CredentialKind::ApiSecret)?
        }
    };

    let mut config = ShaperConfig::new(url, Credentials { key, secret });
    config.tls = opnshaper_config::tls_verification(
        global.insecure || profile.insecure.unwrap_or(defaults.insecure),
        profile.ca_cert.as_deref(),
    );
    config.timeout = Duration::from_secs(
        global
            .timeout
            .or(profile.timeout)
            .unwrap_or(defaults.timeout),
    );
    Ok(config)
}

/// Build a `ShaperConfig` from flags and environment alone.
pub fn from_flags(
    global: &GlobalOpts,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<ShaperConfig, CliError> {
    let url_str = global.url.as_deref().ok_or_else(|| CliError::NoConfig {
        path: config_path().display().to_string(),
    })?;
    let url = opnshaper_config::parse_url(url_str)?;

    let missing = |what: &str| CliError::NoCredentials {
        profile: profile_name.into(),
        what: what.into(),
    };
    let key = global.api_key.clone().ok_or_else(|| missing("API key"))?;
    let secret = global
        .api_secret
        .clone()
        .map(SecretString::from)
        .ok_or_else(|| missing("API secret"))?;

    let mut config = ShaperConfig::new(url, Credentials { key, secret });
    config.tls = opnshaper_config::tls_verification(global.insecure || defaults.insecure, None);
    config.timeout = Duration::from_secs(global.timeout.unwrap_or(defaults.timeout));
    Ok(config)
}
