//! Config subcommand handlers.

use dialoguer::{Confirm, Input, Password, Select};

use opnshaper_config::CredentialKind;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, Profile};
use crate::error::CliError;
use crate::output;

// ── Helpers ─────────────────────────────────────────────────────────

const MASK: &str = "****";

/// Copy of the config with plaintext secrets masked.
fn redacted(cfg: &Config) -> Config {
    let mut cfg = cfg.clone();
    for profile in cfg.profiles.values_mut() {
        if profile.api_key.is_some() {
            profile.api_key = Some(MASK.into());
        }
        if profile.api_secret.is_some() {
            profile.api_secret = Some(MASK.into());
        }
    }
    cfg
}

fn format_config(cfg: &Config) -> String {
    toml::to_string_pretty(cfg).unwrap_or_else(|e| format!("# cannot render config: {e}"))
}

fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

fn require_terminal() -> Result<(), CliError> {
    if output::stdin_is_terminal() {
        Ok(())
    } else {
        Err(CliError::Validation {
            field: "interactive".into(),
            reason: "this command needs a terminal".into(),
        })
    }
}

fn prompt_secret(label: &str) -> Result<String, CliError> {
    let value = Password::new()
        .with_prompt(label)
        .interact()
        .map_err(prompt_err)?;
    if value.is_empty() {
        return Err(CliError::Validation {
            field: label.into(),
            reason: "value cannot be empty".into(),
        });
    }
    Ok(value)
}

/// Store `value` in the keyring, or hand it back for plaintext storage.
fn store_or_return(
    profile_name: &str,
    kind: CredentialKind,
    value: String,
    use_keyring: bool,
) -> Result<Option<String>, CliError> {
    if use_keyring {
        config::store_credential(profile_name, kind, &value)?;
        Ok(None)
    } else {
        Ok(Some(value))
    }
}

fn parse_flag(field: &str, value: &str) -> Result<bool, CliError> {
    value.parse().map_err(|_| CliError::Validation {
        field: field.into(),
        reason: "must be 'true' or 'false'".into(),
    })
}

// ── Handler ─────────────────────────────────────────────────────────

#[allow(clippy::too_many_lines)]
pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Init: interactive wizard ────────────────────────────────
        ConfigCommand::Init => {
            require_terminal()?;
            let config_path = config::config_path();
            eprintln!("opnshaper configuration wizard");
            eprintln!("   Config path: {}\n", config_path.display());

            let profile_name: String = Input::new()
                .with_prompt("Profile name")
                .default("default".into())
                .interact_text()
                .map_err(prompt_err)?;

            let url: String = Input::new()
                .with_prompt("Firewall URL")
                .default("https://192.168.1.1".into())
                .validate_with(|input: &String| {
                    opnshaper_config::parse_url(input)
                        .map(|_| ())
                        .map_err(|e| e.to_string())
                })
                .interact_text()
                .map_err(prompt_err)?;

            let key: String = Input::new()
                .with_prompt("API key")
                .interact_text()
                .map_err(prompt_err)?;
            let secret = prompt_secret("API secret")?;

            let choices = &[
                "Store in system keyring (recommended)",
                "Save to config file (plaintext)",
            ];
            let use_keyring = Select::new()
                .with_prompt("Where to store the credentials?")
                .items(choices)
                .default(0)
                .interact()
                .map_err(prompt_err)?
                == 0;

            let insecure = Confirm::new()
                .with_prompt("Accept the firewall's self-signed certificate?")
                .default(false)
                .interact()
                .map_err(prompt_err)?;

            let profile = Profile {
                api_key: store_or_return(&profile_name, CredentialKind::ApiKey, key, use_keyring)?,
                api_secret: store_or_return(
                    &profile_name,
                    CredentialKind::ApiSecret,
                    secret,
                    use_keyring,
                )?,
                insecure: insecure.then_some(true),
                ..Profile::new(url)
            };

            // Extend an existing config rather than replacing it
            let mut cfg = config::load_config_or_default();
            cfg.profiles.insert(profile_name.clone(), profile);
            cfg.default_profile = Some(profile_name.clone());
            let path = config::save_config(&cfg)?;

            output::print_done(
                &format!("configuration written to {}", path.display()),
                global.quiet,
            );
            eprintln!("  Active profile: {profile_name}");
            eprintln!("  Test it: opnshaper pipes list");
            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = redacted(&config::load_config_or_default());
            let out = output::render_single(&global.output, &cfg, format_config, |c| {
                c.default_profile.clone().unwrap_or_default()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── Path ────────────────────────────────────────────────────
        ConfigCommand::Path => {
            output::print_output(&config::config_path().display().to_string(), false);
            Ok(())
        }

        // ── Set <key> <value> ───────────────────────────────────────
        ConfigCommand::Set { key, value } => {
            let mut cfg = config::load_config_or_default();
            let profile_name = config::active_profile_name(global, &cfg);
            let profile = cfg
                .profiles
                .entry(profile_name.clone())
                .or_insert_with(|| Profile::new(""));

            match key.as_str() {
                "url" => {
                    opnshaper_config::parse_url(&value)?;
                    profile.url = value;
                }
                "api_key" | "api-key" => profile.api_key = Some(value),
                "api_key_env" | "api-key-env" => profile.api_key_env = Some(value),
                "api_secret_env" | "api-secret-env" => profile.api_secret_env = Some(value),
                "ca_cert" | "ca-cert" => profile.ca_cert = Some(value.into()),
                "insecure" => profile.insecure = Some(parse_flag("insecure", &value)?),
                "timeout" => {
                    profile.timeout = Some(value.parse().map_err(|_| CliError::Validation {
                        field: "timeout".into(),
                        reason: "must be a number (seconds)".into(),
                    })?);
                }
                other => {
                    return Err(CliError::Validation {
                        field: other.into(),
                        reason: format!(
                            "unknown config key '{other}'. Valid keys: url, api_key, \
                             api_key_env, api_secret_env, ca_cert, insecure, timeout \
                             (store the secret with `opnshaper config set-secret`)"
                        ),
                    });
                }
            }

            config::save_config(&cfg)?;
            output::print_done(&format!("set {key} on profile '{profile_name}'"), global.quiet);
            Ok(())
        }

        // ── Profiles ────────────────────────────────────────────────
        ConfigCommand::Profiles => {
            let cfg = config::load_config_or_default();
            let default = cfg.default_profile.as_deref().unwrap_or("default");
            if cfg.profiles.is_empty() {
                eprintln!("No profiles configured. Run: opnshaper config init");
            } else {
                let lines = cfg
                    .profiles
                    .iter()
                    .map(|(name, p)| {
                        let marker = if name == default { " *" } else { "" };
                        format!("{name}{marker}\t{}", p.url)
                    })
                    .collect::<Vec<_>>()
                    .join("\n");
                output::print_output(&lines, global.quiet);
            }
            Ok(())
        }

        // ── Use <name> ─────────────────────────────────────────────
        ConfigCommand::Use { name } => {
            let mut cfg = config::load_config_or_default();
            cfg.profile(&name)?;
            cfg.default_profile = Some(name.clone());
            config::save_config(&cfg)?;
            output::print_done(&format!("default profile set to '{name}'"), global.quiet);
            Ok(())
        }

        // ── SetSecret ───────────────────────────────────────────────
        ConfigCommand::SetSecret { profile } => {
            require_terminal()?;
            let cfg = config::load_config_or_default();
            let profile_name = profile.unwrap_or_else(|| config::active_profile_name(global, &cfg));
            cfg.profile(&profile_name)?;

            let key: String = Input::new()
                .with_prompt("API key")
                .interact_text()
                .map_err(prompt_err)?;
            config::store_credential(&profile_name, CredentialKind::ApiKey, &key)?;
            let secret = prompt_secret("API secret")?;
            config::store_credential(&profile_name, CredentialKind::ApiSecret, &secret)?;

            output::print_done(
                &format!("credentials stored in system keyring for profile '{profile_name}'"),
                global.quiet,
            );
            Ok(())
        }
    }
}
