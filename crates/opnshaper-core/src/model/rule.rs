// ── Rule ──

use serde::{Deserialize, Serialize};

use super::{EntityId, StringSet, UNSET, check_sentinel, require_non_empty};
use crate::error::CoreError;

fn any() -> StringSet {
    std::iter::once("any").collect()
}

/// Classifies traffic into a pipe or queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rule {
    pub enabled: bool,
    /// Evaluation order, lower first. At least 1.
    pub sequence: u32,
    pub interface: String,
    /// Optional second interface; empty when unused.
    pub interface2: String,
    pub protocol: String,
    /// `-1` or 1..=65535.
    pub max_packet_length: i32,
    pub sources: StringSet,
    pub source_not: bool,
    pub source_port: String,
    pub destinations: StringSet,
    pub destination_not: bool,
    pub destination_port: String,
    /// DSCP class labels; empty matches any.
    pub dscp: StringSet,
    /// `both`, `in` or `out`.
    pub direction: String,
    /// Pipe or queue receiving matched traffic.
    pub target: EntityId,
    pub description: String,
}

impl Default for Rule {
    fn default() -> Self {
        Self {
            enabled: true,
            sequence: 1,
            interface: String::new(),
            interface2: String::new(),
            protocol: "ip".into(),
            max_packet_length: UNSET,
            sources: any(),
            source_not: false,
            source_port: "any".into(),
            destinations: any(),
            destination_not: false,
            destination_port: "any".into(),
            dscp: StringSet::new(),
            direction: "both".into(),
            target: EntityId::from(""),
            description: String::new(),
        }
    }
}

impl Rule {
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.sequence == 0 {
            return Err(CoreError::invalid("sequence", "must be at least 1"));
        }
        require_non_empty("interface", &self.interface)?;
        require_non_empty("target", self.target.as_str())?;
        check_sentinel("max_packet_length", self.max_packet_length, 1, 65_535)?;
        if self.sources.is_empty() {
            return Err(CoreError::invalid("sources", "needs at least one entry (use \"any\")"));
        }
        if self.destinations.is_empty() {
            return Err(CoreError::invalid(
                "destinations",
                "needs at least one entry (use \"any\")",
            ));
        }
        Ok(())
    }

    /// Interfaces this rule refers to.
    pub fn interfaces(&self) -> Vec<&str> {
        std::iter::once(self.interface.as_str())
            .chain((!self.interface2.is_empty()).then_some(self.interface2.as_str()))
            .collect()
    }
}
