//! Shared helpers for command handlers.

use std::io::Read;
use std::path::Path;

use serde::de::DeserializeOwned;

use opnshaper_core::{Applied, ApplyState, DeleteOutcome, EntityId, EntityKind};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

/// Parse a positional identifier.
pub fn entity_id(raw: &str) -> Result<EntityId, CliError> {
    let id = EntityId::from(raw);
    if id.is_empty() {
        return Err(CliError::Validation {
            field: "id".into(),
            reason: "identifier must not be empty".into(),
        });
    }
    Ok(id)
}

/// Prompt for confirmation, auto-approving if `--yes` was passed.
///
/// Without a terminal there is nobody to ask, so the action is refused.
pub fn confirm(action: &str, prompt: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !output::stdin_is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: action.into(),
        });
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}

/// Read a desired-state document for `--from-file`.
///
/// The format follows the extension (`.yaml`/`.yml`, `.toml`, anything
/// else is JSON); `-` reads JSON from stdin.
pub fn read_document<T: DeserializeOwned>(path: &Path) -> Result<T, CliError> {
    if path.as_os_str() == "-" {
        let mut contents = String::new();
        std::io::stdin().read_to_string(&mut contents)?;
        return Ok(serde_json::from_str(&contents)?);
    }

    let contents = std::fs::read_to_string(path)?;
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("yaml" | "yml") => Ok(serde_yaml::from_str(&contents)?),
        Some("toml") => Ok(toml::from_str(&contents)?),
        _ => Ok(serde_json::from_str(&contents)?),
    }
}

/// Tell the user where a mutation ended up.
pub fn report_applied<T>(applied: &Applied<T>, what: &str, global: &GlobalOpts) {
    match &applied.state {
        ApplyState::Committed => {
            output::print_done(&format!("{what}, shaper reconfigured"), global.quiet);
        }
        ApplyState::Staged => output::print_note(
            &format!("{what}; staged only, run `opnshaper reconfigure` to apply"),
            global.quiet,
        ),
        ApplyState::StagedCommitFailed { warning } => output::print_warning(warning),
    }
}

/// Confirm, delete, report. Shared by every entity kind.
pub async fn delete_entity<F, Fut>(
    kind: EntityKind,
    raw_id: &str,
    global: &GlobalOpts,
    delete: F,
) -> Result<(), CliError>
where
    F: FnOnce(EntityId) -> Fut,
    Fut: Future<Output = Result<Applied<DeleteOutcome>, opnshaper_core::CoreError>>,
{
    let id = entity_id(raw_id)?;
    if !confirm(
        &format!("delete {kind}"),
        &format!("Delete {kind} {id}?"),
        global.yes,
    )? {
        return Ok(());
    }

    let applied = delete(id.clone()).await?;
    let what = match applied.output {
        DeleteOutcome::Deleted => format!("{kind} {id} deleted"),
        DeleteOutcome::NotFound => format!("{kind} {id} was already absent"),
    };
    report_applied(&applied, &what, global);
    Ok(())
}
