// ── Pipe ──

use serde::{Deserialize, Serialize};

use super::{UNSET, check_sentinel};
use crate::error::CoreError;

/// Bandwidth limit: `value` per second in units of `metric`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bandwidth {
    pub value: u64,
    /// One of `bit`, `Kbit`, `Mbit`, `Gbit`.
    #[serde(default = "default_metric")]
    pub metric: String,
}

fn default_metric() -> String {
    "bit".into()
}

impl Default for Bandwidth {
    fn default() -> Self {
        Self {
            value: 0,
            metric: default_metric(),
        }
    }
}

/// CoDel / FQ-CoDel tuning for a pipe. Integers are `-1` (firewall
/// default) or at least 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipeCodel {
    pub enabled: bool,
    pub target: i32,
    pub interval: i32,
    pub ecn: bool,
    pub quantum: i32,
    pub limit: i32,
    pub flows: i32,
}

impl Default for PipeCodel {
    fn default() -> Self {
        Self {
            enabled: false,
            target: UNSET,
            interval: UNSET,
            ecn: false,
            quantum: UNSET,
            limit: UNSET,
            flows: UNSET,
        }
    }
}

/// A bandwidth-limited channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Pipe {
    pub enabled: bool,
    pub bandwidth: Bandwidth,
    /// Queue size in slots: `-1` or 2..=100.
    pub queue: i32,
    /// `none`, `src-ip` or `dst-ip`.
    pub mask: String,
    /// Hash table size: `-1` or 1..=65535.
    pub buckets: i32,
    /// Scheduler label, e.g. `deficit round robin`.
    pub scheduler: String,
    pub codel: PipeCodel,
    pub pie: bool,
    /// Added delay in milliseconds: `-1` or 1..=3000.
    pub delay: i32,
    pub description: String,
}

impl Default for Pipe {
    fn default() -> Self {
        Self {
            enabled: true,
            bandwidth: Bandwidth::default(),
            queue: UNSET,
            mask: "none".into(),
            buckets: UNSET,
            scheduler: "weighted fair queueing".into(),
            codel: PipeCodel::default(),
            pie: false,
            delay: UNSET,
            description: String::new(),
        }
    }
}

impl Pipe {
    /// Check range invariants. Enumeration labels are checked by the registry
    /// during encoding.
    pub fn validate(&self) -> Result<(), CoreError> {
        check_sentinel("queue", self.queue, 2, 100)?;
        check_sentinel("buckets", self.buckets, 1, 65_535)?;
        check_sentinel("delay", self.delay, 1, 3_000)?;
        check_sentinel("codel.target", self.codel.target, 1, i32::MAX)?;
        check_sentinel("codel.interval", self.codel.interval, 1, i32::MAX)?;
        check_sentinel("codel.quantum", self.codel.quantum, 1, i32::MAX)?;
        check_sentinel("codel.limit", self.codel.limit, 1, i32::MAX)?;
        check_sentinel("codel.flows", self.codel.flows, 1, i32::MAX)?;
        Ok(())
    }
}
