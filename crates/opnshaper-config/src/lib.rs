//! Shared configuration for opnshaper.
//!
//! TOML profiles, credential resolution (env + keyring + plaintext),
//! and translation to `opnshaper_core::ShaperConfig`. The CLI layers its
//! flag overrides on top.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use opnshaper_core::{Credentials, ShaperConfig, TlsVerification};

/// Service name under which secrets live in the system keyring.
pub const KEYRING_SERVICE: &str = "opnshaper";

/// Prefix of the environment overlay (`OPNSHAPER_DEFAULTS__TIMEOUT=10`).
pub const ENV_PREFIX: &str = "OPNSHAPER_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no {what} configured for profile '{profile}'")]
    NoCredentials { profile: String, what: &'static str },

    #[error("profile '{name}' not found (available: {available})")]
    ProfileNotFound { name: String, available: String },

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when none is named on the command line.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named firewall profiles.
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Look up a profile by name.
    pub fn profile(&self, name: &str) -> Result<&Profile, ConfigError> {
        self.profiles
            .get(name)
            .ok_or_else(|| ConfigError::ProfileNotFound {
                name: name.into(),
                available: self.available_profiles(),
            })
    }

    /// Comma-separated profile names, or `(none)`.
    pub fn available_profiles(&self) -> String {
        if self.profiles.is_empty() {
            "(none)".into()
        } else {
            self.profiles
                .keys()
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(", ")
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default)]
    pub insecure: bool,

    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            insecure: false,
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_timeout() -> u64 {
    30
}

/// A named firewall profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Profile {
    /// Firewall base URL (e.g., "https://10.0.0.1").
    pub url: String,

    /// API key (plaintext -- prefer keyring or env var).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Environment variable name containing the API key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,

    /// API secret (plaintext -- prefer keyring or env var).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_secret: Option<String>,

    /// Environment variable name containing the API secret.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_secret_env: Option<String>,

    /// Path to custom CA certificate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ca_cert: Option<PathBuf>,

    /// Override insecure TLS setting.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insecure: Option<bool>,

    /// Override timeout (seconds).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
}

impl Profile {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("org", "opnshaper", "opnshaper").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("opnshaper");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from `path` + environment. A missing file yields the defaults.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file is missing or broken.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(&path, cfg)?;
    Ok(path)
}

pub fn save_config_to(path: &Path, cfg: &Config) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Credential resolution ───────────────────────────────────────────

/// The two halves of an OPNsense API credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialKind {
    ApiKey,
    ApiSecret,
}

impl CredentialKind {
    fn label(self) -> &'static str {
        match self {
            Self::ApiKey => "API key",
            Self::ApiSecret => "API secret",
        }
    }

    /// Keyring user name, e.g. `home/api-secret`.
    pub fn keyring_user(self, profile_name: &str) -> String {
        match self {
            Self::ApiKey => format!("{profile_name}/api-key"),
            Self::ApiSecret => format!("{profile_name}/api-secret"),
        }
    }

    fn env_name(self, profile: &Profile) -> Option<&str> {
        match self {
            Self::ApiKey => profile.api_key_env.as_deref(),
            Self::ApiSecret => profile.api_secret_env.as_deref(),
        }
    }

    fn plaintext(self, profile: &Profile) -> Option<&str> {
        match self {
            Self::ApiKey => profile.api_key.as_deref(),
            Self::ApiSecret => profile.api_secret.as_deref(),
        }
    }
}

/// Resolve one credential value from the chain: the profile's named env
/// var, then the system keyring, then plaintext in the profile.
pub fn resolve_credential(
    profile: &Profile,
    profile_name: &str,
    kind: CredentialKind,
) -> Result<SecretString, ConfigError> {
    // 1. Profile's *_env -> env var lookup
    if let Some(env_name) = kind.env_name(profile) {
        if let Ok(val) = std::env::var(env_name) {
            return Ok(SecretString::from(val));
        }
    }

    // 2. System keyring
    if let Ok(entry) = keyring::Entry::new(KEYRING_SERVICE, &kind.keyring_user(profile_name)) {
        if let Ok(secret) = entry.get_password() {
            return Ok(SecretString::from(secret));
        }
    }

    // 3. Plaintext in config
    if let Some(value) = kind.plaintext(profile) {
        return Ok(SecretString::from(value.to_owned()));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
        what: kind.label(),
    })
}

/// Store a credential value in the system keyring.
pub fn store_credential(
    profile_name: &str,
    kind: CredentialKind,
    value: &str,
) -> Result<(), ConfigError> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, &kind.keyring_user(profile_name))?;
    entry.set_password(value)?;
    Ok(())
}

/// Resolve both halves of the API credential.
pub fn resolve_credentials(
    profile: &Profile,
    profile_name: &str,
) -> Result<Credentials, ConfigError> {
    use secrecy::ExposeSecret;

    let key = resolve_credential(profile, profile_name, CredentialKind::ApiKey)?;
    let secret = resolve_credential(profile, profile_name, CredentialKind::ApiSecret)?;
    Ok(Credentials {
        key: key.expose_secret().to_owned(),
        secret,
    })
}

// ── Translation ─────────────────────────────────────────────────────

/// Parse a firewall URL, requiring http or https.
pub fn parse_url(raw: &str) -> Result<url::Url, ConfigError> {
    let url: url::Url = raw.parse().map_err(|_| ConfigError::Validation {
        field: "url".into(),
        reason: format!("invalid URL: {raw}"),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::Validation {
            field: "url".into(),
            reason: format!("expected http or https, got '{}'", url.scheme()),
        });
    }
    Ok(url)
}

/// TLS strategy from the insecure flag and an optional CA file.
pub fn tls_verification(insecure: bool, ca_cert: Option<&Path>) -> TlsVerification {
    if insecure {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ca_path) = ca_cert {
        TlsVerification::CustomCa(ca_path.to_path_buf())
    } else {
        TlsVerification::SystemDefaults
    }
}

/// Build a `ShaperConfig` from a profile -- no CLI flag overrides.
pub fn profile_to_shaper_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<ShaperConfig, ConfigError> {
    let url = parse_url(&profile.url)?;
    let credentials = resolve_credentials(profile, profile_name)?;

    let mut config = ShaperConfig::new(url, credentials);
    config.tls = tls_verification(
        profile.insecure.unwrap_or(defaults.insecure),
        profile.ca_cert.as_deref(),
    );
    config.timeout = Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout));
    Ok(config)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use secrecy::ExposeSecret;

    use super::*;

    fn write(dir: &tempfile::TempDir, contents: &str) -> PathBuf {
        let path = dir.path().join("config.toml");
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg.default_profile.as_deref(), Some("default"));
        assert_eq!(cfg.defaults.timeout, 30);
        assert!(cfg.profiles.is_empty());
    }

    #[test]
    fn parses_profiles() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            r#"
default_profile = "lab"

[defaults]
timeout = 10

[profiles.lab]
url = "https://10.0.0.1"
api_key = "k"
api_secret_env = "LAB_SECRET"
insecure = true
"#,
        );
        let cfg = load_config_from(&path).unwrap();
        assert_eq!(cfg.default_profile.as_deref(), Some("lab"));
        assert_eq!(cfg.defaults.timeout, 10);
        assert_eq!(cfg.defaults.output, "table");

        let lab = cfg.profile("lab").unwrap();
        assert_eq!(lab.url, "https://10.0.0.1");
        assert_eq!(lab.api_secret_env.as_deref(), Some("LAB_SECRET"));
        assert_eq!(lab.insecure, Some(true));
    }

    #[test]
    fn unknown_profile_lists_available() {
        let mut cfg = Config::default();
        cfg.profiles.insert("b".into(), Profile::new("https://b"));
        cfg.profiles.insert("a".into(), Profile::new("https://a"));
        let err = cfg.profile("c").unwrap_err();
        assert_eq!(err.to_string(), "profile 'c' not found (available: a, b)");
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.profiles.insert(
            "default".into(),
            Profile {
                api_key_env: Some("OPN_KEY".into()),
                timeout: Some(5),
                ..Profile::new("https://fw.example")
            },
        );
        save_config_to(&path, &cfg).unwrap();

        assert_eq!(load_config_from(&path).unwrap(), cfg);
    }

    #[test]
    fn plaintext_credentials_resolve_last() {
        let profile = Profile {
            api_key: Some("key".into()),
            api_secret: Some("secret".into()),
            ..Profile::new("https://10.0.0.1")
        };
        let creds = resolve_credentials(&profile, "opnshaper-test-plaintext").unwrap();
        assert_eq!(creds.key, "key");
        assert_eq!(creds.secret.expose_secret(), "secret");
    }

    #[test]
    fn missing_secret_is_reported() {
        let profile = Profile {
            api_key: Some("key".into()),
            ..Profile::new("https://10.0.0.1")
        };
        let err = resolve_credentials(&profile, "opnshaper-test-missing").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::NoCredentials {
                what: "API secret",
                ..
            }
        ));
    }

    #[test]
    fn profile_translation() {
        let profile = Profile {
            api_key: Some("key".into()),
            api_secret: Some("secret".into()),
            ca_cert: Some(PathBuf::from("/etc/ssl/fw.pem")),
            ..Profile::new("https://10.0.0.1")
        };
        let defaults = Defaults {
            timeout: 12,
            ..Defaults::default()
        };
        let cfg = profile_to_shaper_config(&profile, "opnshaper-test-translate", &defaults)
            .unwrap();
        assert_eq!(cfg.url.as_str(), "https://10.0.0.1/");
        assert_eq!(cfg.timeout, Duration::from_secs(12));
        assert_eq!(
            cfg.tls,
            TlsVerification::CustomCa(PathBuf::from("/etc/ssl/fw.pem"))
        );
    }

    #[test]
    fn insecure_wins_over_ca() {
        assert_eq!(
            tls_verification(true, Some(Path::new("/ca.pem"))),
            TlsVerification::DangerAcceptInvalid
        );
        assert_eq!(tls_verification(false, None), TlsVerification::SystemDefaults);
    }

    #[test]
    fn url_must_be_http() {
        assert!(parse_url("ftp://10.0.0.1").is_err());
        assert!(parse_url("not a url").is_err());
        assert!(parse_url("http://10.0.0.1:8080").is_ok());
    }
}
