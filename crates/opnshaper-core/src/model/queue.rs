// ── Queue ──

use serde::{Deserialize, Serialize};

use super::{EntityId, UNSET, check_sentinel, require_non_empty};
use crate::error::CoreError;

/// CoDel tuning for a queue (no FQ-CoDel parameters at this level).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueCodel {
    pub enabled: bool,
    pub target: i32,
    pub interval: i32,
    pub ecn: bool,
}

impl Default for QueueCodel {
    fn default() -> Self {
        Self {
            enabled: false,
            target: UNSET,
            interval: UNSET,
            ecn: false,
        }
    }
}

/// A weighted sub-channel of a pipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Queue {
    pub enabled: bool,
    /// Parent pipe. Required.
    pub pipe: EntityId,
    /// Share of the parent pipe: 1..=100.
    pub weight: u32,
    pub mask: String,
    pub buckets: i32,
    pub codel: QueueCodel,
    pub pie: bool,
    pub description: String,
}

impl Default for Queue {
    fn default() -> Self {
        Self {
            enabled: true,
            pipe: EntityId::from(""),
            weight: 100,
            mask: "none".into(),
            buckets: UNSET,
            codel: QueueCodel::default(),
            pie: false,
            description: String::new(),
        }
    }
}

impl Queue {
    pub fn validate(&self) -> Result<(), CoreError> {
        require_non_empty("pipe", self.pipe.as_str())?;
        if !(1..=100).contains(&self.weight) {
            return Err(CoreError::invalid(
                "weight",
                format!("{} is not within 1..=100", self.weight),
            ));
        }
        check_sentinel("buckets", self.buckets, 1, 65_535)?;
        check_sentinel("codel.target", self.codel.target, 1, i32::MAX)?;
        check_sentinel("codel.interval", self.codel.interval, 1, i32::MAX)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn queue() -> Queue {
        Queue {
            pipe: EntityId::from("p1"),
            ..Queue::default()
        }
    }

    #[test]
    fn default_weight_is_full_share() {
        assert_eq!(queue().weight, 100);
        assert!(queue().validate().is_ok());
    }

    #[test]
    fn pipe_is_required() {
        assert!(matches!(
            Queue::default().validate(),
            Err(CoreError::InvalidField { field: "pipe", .. })
        ));
    }

    #[test]
    fn weight_out_of_range() {
        for weight in [0, 101] {
            let q = Queue {
                weight,
                ..queue()
            };
            assert!(q.validate().is_err(), "weight = {weight}");
        }
    }
}
