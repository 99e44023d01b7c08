// ── Desired-state domain model ──
//
// Typed representations of the three shaper entities as a caller describes
// them: enumerations by label, sentinels as -1, multi-valued fields as sets.
// Wire encoding lives in `convert`.

pub mod entity_id;
pub mod pipe;
pub mod queue;
pub mod rule;
pub mod set;
pub mod summary;

pub use entity_id::EntityId;
pub use pipe::{Bandwidth, Pipe, PipeCodel};
pub use queue::{Queue, QueueCodel};
pub use rule::Rule;
pub use set::StringSet;
pub use summary::EntitySummary;

/// Sentinel meaning "leave unset, use the firewall default".
pub const UNSET: i32 = opnshaper_api::shaper::SENTINEL_UNSET;

use crate::error::CoreError;

/// `-1`, or a value in `min..=max`.
pub(crate) fn check_sentinel(
    field: &'static str,
    value: i32,
    min: i32,
    max: i32,
) -> Result<(), CoreError> {
    if value == UNSET || (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(CoreError::invalid(
            field,
            format!("{value} is neither -1 (firewall default) nor within {min}..={max}"),
        ))
    }
}

pub(crate) fn require_non_empty(field: &'static str, value: &str) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        Err(CoreError::invalid(field, "must not be empty"))
    } else {
        Ok(())
    }
}
