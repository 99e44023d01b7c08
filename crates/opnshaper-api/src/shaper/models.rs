// Traffic shaper wire models
//
// Request bodies carry the firewall's field names and text encodings exactly
// as sent. Records mirror the `get_*` read-back, where every selectable field
// is an option map. Fields use `#[serde(default)]` because the firewall omits
// or blanks fields freely across versions.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::options::OptionMap;
use super::wire::{Flag, ListField, Quoted, Sentinel};

// ── Pipe ─────────────────────────────────────────────────────────────

/// Body of `add_pipe` / `set_pipe`, wrapped as `{"pipe": {...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipeRequest {
    pub enabled: Flag,
    pub bandwidth: Quoted<u64>,
    #[serde(rename = "bandwidthMetric")]
    pub bandwidth_metric: String,
    pub queue: Sentinel,
    pub mask: String,
    pub buckets: Sentinel,
    pub scheduler: String,
    pub codel_enable: Flag,
    pub codel_target: Sentinel,
    pub codel_interval: Sentinel,
    pub codel_ecn_enable: Flag,
    pub fqcodel_quantum: Sentinel,
    pub fqcodel_limit: Sentinel,
    pub fqcodel_flows: Sentinel,
    pub pie_enable: Flag,
    pub delay: Sentinel,
    pub description: String,
}

/// `get_pipe/{id}` payload.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PipeRecord {
    pub enabled: Flag,
    pub bandwidth: Quoted<u64>,
    #[serde(rename = "bandwidthMetric")]
    pub bandwidth_metric: OptionMap,
    pub queue: Sentinel,
    pub mask: OptionMap,
    pub buckets: Sentinel,
    pub scheduler: OptionMap,
    pub codel_enable: Flag,
    pub codel_target: Sentinel,
    pub codel_interval: Sentinel,
    pub codel_ecn_enable: Flag,
    pub fqcodel_quantum: Sentinel,
    pub fqcodel_limit: Sentinel,
    pub fqcodel_flows: Sentinel,
    pub pie_enable: Flag,
    pub delay: Sentinel,
    pub description: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ── Queue ────────────────────────────────────────────────────────────

/// Body of `add_queue` / `set_queue`, wrapped as `{"queue": {...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueueRequest {
    pub enabled: Flag,
    pub pipe: String,
    pub weight: Quoted<u32>,
    pub mask: String,
    pub buckets: Sentinel,
    pub codel_enable: Flag,
    pub codel_target: Sentinel,
    pub codel_interval: Sentinel,
    pub codel_ecn_enable: Flag,
    pub pie_enable: Flag,
    pub description: String,
}

/// `get_queue/{id}` payload. The parent pipe comes back as an option map of
/// every pipe on the firewall, keyed by identifier.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct QueueRecord {
    pub enabled: Flag,
    pub pipe: OptionMap,
    pub weight: Quoted<u32>,
    pub mask: OptionMap,
    pub buckets: Sentinel,
    pub codel_enable: Flag,
    pub codel_target: Sentinel,
    pub codel_interval: Sentinel,
    pub codel_ecn_enable: Flag,
    pub pie_enable: Flag,
    pub description: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ── Rule ─────────────────────────────────────────────────────────────

/// Body of `add_rule` / `set_rule`, wrapped as `{"rule": {...}}`.
///
/// Multi-valued fields (`source`, `destination`, `dscp`) are already joined
/// with commas by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleRequest {
    pub enabled: Flag,
    pub sequence: Quoted<u32>,
    pub interface: String,
    pub interface2: String,
    pub proto: String,
    pub iplen: Sentinel,
    pub source: String,
    pub source_not: Flag,
    pub src_port: String,
    pub destination: String,
    pub destination_not: Flag,
    pub dst_port: String,
    pub dscp: String,
    pub direction: String,
    pub target: String,
    pub description: String,
}

/// `get_rule/{id}` payload.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RuleRecord {
    pub enabled: Flag,
    pub sequence: Quoted<u32>,
    pub interface: OptionMap,
    pub interface2: OptionMap,
    pub proto: OptionMap,
    pub iplen: Sentinel,
    pub source: ListField,
    pub source_not: Flag,
    pub src_port: String,
    pub destination: ListField,
    pub destination_not: Flag,
    pub dst_port: String,
    pub dscp: OptionMap,
    pub direction: OptionMap,
    pub target: OptionMap,
    pub description: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ── Responses ────────────────────────────────────────────────────────

/// `add_*` / `set_*` / `del_*` answer: `{"result": "...", ...}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct MutationResponse {
    #[serde(default)]
    pub result: String,
    #[serde(default)]
    pub uuid: Option<String>,
    /// Field path to one message or a list of messages.
    #[serde(default)]
    pub validations: Map<String, Value>,
}

/// Outcome of a delete. Both variants are success: delete is idempotent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    /// The identifier was already absent.
    NotFound,
}

/// Body of the `search_*` endpoints.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub current: u32,
    pub row_count: i32,
    pub search_phrase: String,
}

impl Default for SearchRequest {
    /// First page, unlimited rows, no filter.
    fn default() -> Self {
        Self {
            current: 1,
            row_count: -1,
            search_phrase: String::new(),
        }
    }
}

/// `search_*` answer.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct SearchResponse {
    #[serde(default)]
    pub rows: Vec<SearchRow>,
    #[allow(dead_code)]
    #[serde(default)]
    pub total: u64,
}

/// One row of a search result. Only the columns every entity shares are
/// typed; the rest stay as raw JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchRow {
    #[serde(default)]
    pub uuid: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub enabled: Flag,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `service/reconfigure` answer: `{"status": "ok"}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ServiceStatus {
    #[serde(default)]
    pub status: String,
}

impl ServiceStatus {
    pub fn is_ok(&self) -> bool {
        self.status.trim().eq_ignore_ascii_case("ok")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn pipe_request_uses_firewall_field_names() {
        let req = PipeRequest {
            enabled: Flag(true),
            bandwidth: Quoted(10),
            bandwidth_metric: "Kbit".into(),
            queue: Sentinel::UNSET,
            mask: "none".into(),
            buckets: Sentinel::UNSET,
            scheduler: "rr".into(),
            codel_enable: Flag(false),
            codel_target: Sentinel::UNSET,
            codel_interval: Sentinel::UNSET,
            codel_ecn_enable: Flag(false),
            fqcodel_quantum: Sentinel::UNSET,
            fqcodel_limit: Sentinel::UNSET,
            fqcodel_flows: Sentinel::UNSET,
            pie_enable: Flag(false),
            delay: Sentinel(20),
            description: "uplink".into(),
        };
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({
                "enabled": "1",
                "bandwidth": "10",
                "bandwidthMetric": "Kbit",
                "queue": "",
                "mask": "none",
                "buckets": "",
                "scheduler": "rr",
                "codel_enable": "0",
                "codel_target": "",
                "codel_interval": "",
                "codel_ecn_enable": "0",
                "fqcodel_quantum": "",
                "fqcodel_limit": "",
                "fqcodel_flows": "",
                "pie_enable": "0",
                "delay": "20",
                "description": "uplink"
            })
        );
    }

    #[test]
    fn pipe_record_decodes_each_option_group_separately() {
        let record: PipeRecord = serde_json::from_value(json!({
            "enabled": "1",
            "bandwidth": "10",
            "bandwidthMetric": {
                "bit": { "value": "bit/s", "selected": 0 },
                "Kbit": { "value": "Kbit/s", "selected": 1 }
            },
            "mask": {
                "none": { "value": "(none)", "selected": 0 },
                "dst-ip": { "value": "Destination", "selected": 1 }
            },
            "scheduler": {
                "": { "value": "Weighted fair queueing", "selected": 0 },
                "qfq": { "value": "Quick fair queueing", "selected": 1 }
            },
            "delay": "",
            "origin": "TrafficShaper"
        }))
        .unwrap();

        assert_eq!(record.bandwidth_metric.selected(), "Kbit");
        assert_eq!(record.mask.selected(), "dst-ip");
        assert_eq!(record.scheduler.selected(), "qfq");
        assert!(record.delay.is_unset());
        assert!(record.queue.is_unset());
        assert_eq!(record.extra.get("origin"), Some(&json!("TrafficShaper")));
    }

    #[test]
    fn rule_record_reads_multi_select_dscp() {
        let record: RuleRecord = serde_json::from_value(json!({
            "sequence": "5",
            "source": "any",
            "dscp": {
                "be": { "value": "Best Effort", "selected": 1 },
                "ef": { "value": "Expedited Forwarding", "selected": 0 },
                "af11": { "value": "AF11", "selected": 1 }
            },
            "direction": {
                "": { "value": "both", "selected": 0 },
                "in": { "value": "in", "selected": 1 }
            }
        }))
        .unwrap();
        assert_eq!(record.sequence.0, 5);
        assert_eq!(record.source.0, vec!["any"]);
        assert_eq!(record.dscp.selected_all(), vec!["be", "af11"]);
        assert_eq!(record.direction.selected(), "in");
    }

    #[test]
    fn search_request_defaults_to_every_row() {
        assert_eq!(
            serde_json::to_value(SearchRequest::default()).unwrap(),
            json!({ "current": 1, "rowCount": -1, "searchPhrase": "" })
        );
    }

    #[test]
    fn service_status_is_case_insensitive() {
        assert!(ServiceStatus { status: "OK".into() }.is_ok());
        assert!(!ServiceStatus { status: "failed".into() }.is_ok());
        assert!(!ServiceStatus::default().is_ok());
    }
}
