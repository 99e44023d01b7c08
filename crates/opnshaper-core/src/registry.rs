// ── Enumeration registry ──
//
// Label <-> wire-code tables for the shaper's selectable fields. The
// registry is an ordinary value owned by the engine; tests can build their
// own with `EnumRegistry::new`.

use std::collections::HashMap;

use crate::error::CoreError;

/// Which selectable field a table describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
pub enum EnumKind {
    #[strum(serialize = "scheduler")]
    Scheduler,
    #[strum(serialize = "DSCP class")]
    Dscp,
    #[strum(serialize = "direction")]
    Direction,
    #[strum(serialize = "bandwidth metric")]
    BandwidthMetric,
    #[strum(serialize = "mask")]
    Mask,
    #[strum(serialize = "protocol")]
    Protocol,
}

// ── LabelMap ─────────────────────────────────────────────────────────

/// A bijection between human labels and wire codes.
#[derive(Debug, Clone)]
pub struct LabelMap {
    kind: EnumKind,
    /// Labels in registration order.
    labels: Vec<String>,
    by_label: HashMap<String, String>,
    by_code: HashMap<String, String>,
}

impl LabelMap {
    /// Build a table from `(label, code)` pairs. Fails if any label or any
    /// code appears twice.
    pub fn new<'a>(
        kind: EnumKind,
        pairs: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Result<Self, CoreError> {
        let mut map = Self {
            kind,
            labels: Vec::new(),
            by_label: HashMap::new(),
            by_code: HashMap::new(),
        };
        for (label, code) in pairs {
            if map.by_label.contains_key(label) {
                return Err(CoreError::Internal(format!(
                    "{kind} label '{label}' registered twice"
                )));
            }
            if let Some(existing) = map.by_code.get(code) {
                return Err(CoreError::Internal(format!(
                    "{kind} code '{code}' shared by '{existing}' and '{label}'"
                )));
            }
            map.labels.push(label.to_owned());
            map.by_label.insert(label.to_owned(), code.to_owned());
            map.by_code.insert(code.to_owned(), label.to_owned());
        }
        Ok(map)
    }

    pub fn kind(&self) -> EnumKind {
        self.kind
    }

    /// Wire code for `label`.
    pub fn encode(&self, label: &str) -> Result<&str, CoreError> {
        self.by_label
            .get(label)
            .map(String::as_str)
            .ok_or_else(|| CoreError::unknown_enum(self.kind, label))
    }

    /// Label for wire code `code`; the exact inverse of [`encode`](Self::encode).
    pub fn decode(&self, code: &str) -> Result<&str, CoreError> {
        self.by_code
            .get(code)
            .map(String::as_str)
            .ok_or_else(|| CoreError::unknown_enum(self.kind, code))
    }

    /// Registered labels, in registration order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }
}

// ── ValueSet ─────────────────────────────────────────────────────────

/// A closed set of values that travel unchanged.
///
/// `blank` is the value a blank read-back stands for, if the firewall
/// uses blank for one of the members.
#[derive(Debug, Clone)]
pub struct ValueSet {
    kind: EnumKind,
    values: Vec<String>,
    blank: Option<String>,
}

impl ValueSet {
    pub fn new<'a>(
        kind: EnumKind,
        values: impl IntoIterator<Item = &'a str>,
        blank: Option<&str>,
    ) -> Result<Self, CoreError> {
        let mut set = Self {
            kind,
            values: Vec::new(),
            blank: None,
        };
        for value in values {
            if set.values.iter().any(|v| v == value) {
                return Err(CoreError::Internal(format!(
                    "{kind} value '{value}' registered twice"
                )));
            }
            set.values.push(value.to_owned());
        }
        if let Some(blank) = blank {
            if !set.contains(blank) {
                return Err(CoreError::Internal(format!(
                    "{kind} blank default '{blank}' is not a member"
                )));
            }
            set.blank = Some(blank.to_owned());
        }
        Ok(set)
    }

    pub fn kind(&self) -> EnumKind {
        self.kind
    }

    pub fn contains(&self, value: &str) -> bool {
        self.values.iter().any(|v| v == value)
    }

    /// `value` itself, if it is a member.
    pub fn encode<'v>(&self, value: &'v str) -> Result<&'v str, CoreError> {
        if self.contains(value) {
            Ok(value)
        } else {
            Err(CoreError::unknown_enum(self.kind, value))
        }
    }

    /// Member for a read-back code; blank maps to the blank default.
    pub fn decode<'v>(&'v self, code: &'v str) -> Result<&'v str, CoreError> {
        if code.is_empty() {
            if let Some(blank) = &self.blank {
                return Ok(blank);
            }
        }
        self.encode(code)
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(String::as_str)
    }
}

// ── Registry ─────────────────────────────────────────────────────────

const SCHEDULERS: [(&str, &str); 6] = [
    ("weighted fair queueing", ""),
    ("fifo", "fifo"),
    ("deficit round robin", "rr"),
    ("quick fair queueing", "qfq"),
    ("flowqueue-codel", "fq_codel"),
    ("flowqueue-pie", "fq_pie"),
];

const DIRECTIONS: [(&str, &str); 3] = [("both", ""), ("in", "in"), ("out", "out")];

const DSCP_SELF_NAMED: [&str; 19] = [
    "af11", "af12", "af13", "af21", "af22", "af23", "af31", "af32", "af33", "af41", "af42",
    "af43", "cs1", "cs2", "cs3", "cs4", "cs5", "cs6", "cs7",
];

const METRICS: [&str; 4] = ["bit", "Kbit", "Mbit", "Gbit"];

const MASKS: [&str; 3] = ["none", "src-ip", "dst-ip"];

const PROTOCOLS: [&str; 13] = [
    "ip",
    "ip4",
    "ip6",
    "udp",
    "tcp",
    "tcp_ack",
    "tcp_ack_not",
    "icmp",
    "ipv6-icmp",
    "igmp",
    "esp",
    "ah",
    "gre",
];

/// Every enumeration the shaper entities use.
#[derive(Debug, Clone)]
pub struct EnumRegistry {
    scheduler: LabelMap,
    dscp: LabelMap,
    direction: LabelMap,
    metric: ValueSet,
    mask: ValueSet,
    protocol: ValueSet,
}

impl EnumRegistry {
    pub fn new(
        scheduler: LabelMap,
        dscp: LabelMap,
        direction: LabelMap,
        metric: ValueSet,
        mask: ValueSet,
        protocol: ValueSet,
    ) -> Self {
        Self {
            scheduler,
            dscp,
            direction,
            metric,
            mask,
            protocol,
        }
    }

    /// The tables an OPNsense traffic shaper understands.
    pub fn opnsense() -> Result<Self, CoreError> {
        let dscp_pairs = [
            ("best effort", "be"),
            ("expedited forwarding", "ef"),
        ]
        .into_iter()
        .chain(DSCP_SELF_NAMED.iter().map(|c| (*c, *c)));

        Ok(Self::new(
            LabelMap::new(EnumKind::Scheduler, SCHEDULERS)?,
            LabelMap::new(EnumKind::Dscp, dscp_pairs)?,
            LabelMap::new(EnumKind::Direction, DIRECTIONS)?,
            ValueSet::new(EnumKind::BandwidthMetric, METRICS, Some("bit"))?,
            ValueSet::new(EnumKind::Mask, MASKS, Some("none"))?,
            ValueSet::new(EnumKind::Protocol, PROTOCOLS, Some("ip"))?,
        ))
    }

    pub fn scheduler(&self) -> &LabelMap {
        &self.scheduler
    }

    pub fn dscp(&self) -> &LabelMap {
        &self.dscp
    }

    pub fn direction(&self) -> &LabelMap {
        &self.direction
    }

    pub fn metric(&self) -> &ValueSet {
        &self.metric
    }

    pub fn mask(&self) -> &ValueSet {
        &self.mask
    }

    pub fn protocol(&self) -> &ValueSet {
        &self.protocol
    }
}
