// ── Domain <-> wire conversions ──
//
// Encoders turn desired-state models into `opnshaper_api` request bodies,
// pushing every enumeration through the registry. Decoders do the reverse
// for `get_*` records: each option map is reduced on its own and then
// mapped back to its label.

use opnshaper_api::shaper::{
    Flag, OptionMap, PipeRecord, PipeRequest, Quoted, QueueRecord, QueueRequest, RuleRecord,
    RuleRequest, SearchRow, Sentinel,
};

use crate::error::CoreError;
use crate::model::{
    Bandwidth, EntityId, EntitySummary, Pipe, PipeCodel, Queue, QueueCodel, Rule, StringSet,
};
use crate::registry::EnumRegistry;

// ── Helpers ────────────────────────────────────────────────────────

/// Blank port fields mean "any".
fn port_or_any(port: &str) -> String {
    let port = port.trim();
    if port.is_empty() { "any" } else { port }.to_owned()
}

/// Blank network lists mean "any".
fn networks_or_any(members: Vec<String>) -> StringSet {
    if members.is_empty() {
        std::iter::once("any").collect()
    } else {
        members.into_iter().collect()
    }
}

fn selected_id(options: &OptionMap) -> EntityId {
    EntityId::from(options.selected())
}

// ── Pipe ───────────────────────────────────────────────────────────

pub fn encode_pipe(pipe: &Pipe, registry: &EnumRegistry) -> Result<PipeRequest, CoreError> {
    Ok(PipeRequest {
        enabled: Flag(pipe.enabled),
        bandwidth: Quoted(pipe.bandwidth.value),
        bandwidth_metric: registry.metric().encode(&pipe.bandwidth.metric)?.to_owned(),
        queue: Sentinel(pipe.queue),
        mask: registry.mask().encode(&pipe.mask)?.to_owned(),
        buckets: Sentinel(pipe.buckets),
        scheduler: registry.scheduler().encode(&pipe.scheduler)?.to_owned(),
        codel_enable: Flag(pipe.codel.enabled),
        codel_target: Sentinel(pipe.codel.target),
        codel_interval: Sentinel(pipe.codel.interval),
        codel_ecn_enable: Flag(pipe.codel.ecn),
        fqcodel_quantum: Sentinel(pipe.codel.quantum),
        fqcodel_limit: Sentinel(pipe.codel.limit),
        fqcodel_flows: Sentinel(pipe.codel.flows),
        pie_enable: Flag(pipe.pie),
        delay: Sentinel(pipe.delay),
        description: pipe.description.clone(),
    })
}

pub fn decode_pipe(record: &PipeRecord, registry: &EnumRegistry) -> Result<Pipe, CoreError> {
    let metric = registry.metric().decode(record.bandwidth_metric.selected())?;
    let mask = registry.mask().decode(record.mask.selected())?;
    let scheduler = registry.scheduler().decode(record.scheduler.selected())?;

    Ok(Pipe {
        enabled: record.enabled.0,
        bandwidth: Bandwidth {
            value: record.bandwidth.0,
            metric: metric.to_owned(),
        },
        queue: record.queue.0,
        mask: mask.to_owned(),
        buckets: record.buckets.0,
        scheduler: scheduler.to_owned(),
        codel: PipeCodel {
            enabled: record.codel_enable.0,
            target: record.codel_target.0,
            interval: record.codel_interval.0,
            ecn: record.codel_ecn_enable.0,
            quantum: record.fqcodel_quantum.0,
            limit: record.fqcodel_limit.0,
            flows: record.fqcodel_flows.0,
        },
        pie: record.pie_enable.0,
        delay: record.delay.0,
        description: record.description.clone(),
    })
}

// ── Queue ──────────────────────────────────────────────────────────

pub fn encode_queue(queue: &Queue, registry: &EnumRegistry) -> Result<QueueRequest, CoreError> {
    Ok(QueueRequest {
        enabled: Flag(queue.enabled),
        pipe: queue.pipe.to_string(),
        weight: Quoted(queue.weight),
        mask: registry.mask().encode(&queue.mask)?.to_owned(),
        buckets: Sentinel(queue.buckets),
        codel_enable: Flag(queue.codel.enabled),
        codel_target: Sentinel(queue.codel.target),
        codel_interval: Sentinel(queue.codel.interval),
        codel_ecn_enable: Flag(queue.codel.ecn),
        pie_enable: Flag(queue.pie),
        description: queue.description.clone(),
    })
}

pub fn decode_queue(record: &QueueRecord, registry: &EnumRegistry) -> Result<Queue, CoreError> {
    let mask = registry.mask().decode(record.mask.selected())?;

    Ok(Queue {
        enabled: record.enabled.0,
        pipe: selected_id(&record.pipe),
        weight: record.weight.0,
        mask: mask.to_owned(),
        buckets: record.buckets.0,
        codel: QueueCodel {
            enabled: record.codel_enable.0,
            target: record.codel_target.0,
            interval: record.codel_interval.0,
            ecn: record.codel_ecn_enable.0,
        },
        pie: record.pie_enable.0,
        description: record.description.clone(),
    })
}

// ── Rule ───────────────────────────────────────────────────────────

pub fn encode_rule(rule: &Rule, registry: &EnumRegistry) -> Result<RuleRequest, CoreError> {
    let dscp = rule
        .dscp
        .iter()
        .map(|label| registry.dscp().encode(label))
        .collect::<Result<StringSet, _>>()?;

    Ok(RuleRequest {
        enabled: Flag(rule.enabled),
        sequence: Quoted(rule.sequence),
        interface: rule.interface.clone(),
        interface2: rule.interface2.clone(),
        proto: registry.protocol().encode(&rule.protocol)?.to_owned(),
        iplen: Sentinel(rule.max_packet_length),
        source: rule.sources.to_wire(),
        source_not: Flag(rule.source_not),
        src_port: port_or_any(&rule.source_port),
        destination: rule.destinations.to_wire(),
        destination_not: Flag(rule.destination_not),
        dst_port: port_or_any(&rule.destination_port),
        dscp: dscp.to_wire(),
        direction: registry.direction().encode(&rule.direction)?.to_owned(),
        target: rule.target.to_string(),
        description: rule.description.clone(),
    })
}

pub fn decode_rule(record: &RuleRecord, registry: &EnumRegistry) -> Result<Rule, CoreError> {
    let protocol = registry.protocol().decode(record.proto.selected())?;
    let direction = registry.direction().decode(record.direction.selected())?;
    let dscp = record
        .dscp
        .selected_all()
        .into_iter()
        .filter(|code| !code.is_empty())
        .map(|code| registry.dscp().decode(code))
        .collect::<Result<StringSet, _>>()?;

    Ok(Rule {
        enabled: record.enabled.0,
        sequence: record.sequence.0,
        interface: record.interface.selected().to_owned(),
        interface2: record.interface2.selected().to_owned(),
        protocol: protocol.to_owned(),
        max_packet_length: record.iplen.0,
        sources: networks_or_any(record.source.0.clone()),
        source_not: record.source_not.0,
        source_port: port_or_any(&record.src_port),
        destinations: networks_or_any(record.destination.0.clone()),
        destination_not: record.destination_not.0,
        destination_port: port_or_any(&record.dst_port),
        dscp,
        direction: direction.to_owned(),
        target: selected_id(&record.target),
        description: record.description.clone(),
    })
}

// ── Search rows ────────────────────────────────────────────────────

impl From<SearchRow> for EntitySummary {
    fn from(row: SearchRow) -> Self {
        Self {
            id: EntityId::from(row.uuid),
            enabled: row.enabled.0,
            description: row.description,
            columns: row.extra,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::model::UNSET;

    fn registry() -> EnumRegistry {
        EnumRegistry::opnsense().unwrap()
    }

    fn options(selected: &str, all: &[&str]) -> serde_json::Value {
        let mut map = serde_json::Map::new();
        for key in all {
            map.insert(
                (*key).to_owned(),
                json!({ "value": key, "selected": u8::from(*key == selected) }),
            );
        }
        serde_json::Value::Object(map)
    }

    #[test]
    fn pipe_encodes_labels_as_codes() {
        let pipe = Pipe {
            bandwidth: Bandwidth {
                value: 10,
                metric: "Kbit".into(),
            },
            scheduler: "deficit round robin".into(),
            ..Pipe::default()
        };
        let req = encode_pipe(&pipe, &registry()).unwrap();
        assert_eq!(req.scheduler, "rr");
        assert_eq!(req.bandwidth_metric, "Kbit");
        assert_eq!(req.mask, "none");
        assert!(req.delay.is_unset());
    }

    #[test]
    fn pipe_rejects_unknown_scheduler() {
        let pipe = Pipe {
            scheduler: "round robin".into(),
            ..Pipe::default()
        };
        assert!(matches!(
            encode_pipe(&pipe, &registry()),
            Err(CoreError::UnknownEnumValue { .. })
        ));
    }

    #[test]
    fn every_pipe_sentinel_round_trips() {
        let pipe = Pipe::default();
        let req = encode_pipe(&pipe, &registry()).unwrap();
        let wire = serde_json::to_value(&req).unwrap();

        // Simulate the read-back: scalars come back as sent, selects as option maps.
        let mut record = wire.as_object().unwrap().clone();
        record.insert("bandwidthMetric".into(), options("bit", &["bit", "Kbit"]));
        record.insert("mask".into(), options("none", &["none", "src-ip"]));
        record.insert("scheduler".into(), options("", &["", "rr"]));
        let record: PipeRecord = serde_json::from_value(record.into()).unwrap();

        let back = decode_pipe(&record, &registry()).unwrap();
        assert_eq!(back, pipe);
        assert_eq!(back.delay, UNSET);
        assert_eq!(back.codel.flows, UNSET);
    }

    #[test]
    fn pipe_option_groups_do_not_overwrite_each_other() {
        let record: PipeRecord = serde_json::from_value(json!({
            "bandwidth": "5",
            "bandwidthMetric": options("Mbit", &["bit", "Kbit", "Mbit"]),
            "mask": options("src-ip", &["none", "src-ip", "dst-ip"]),
            "scheduler": options("fq_codel", &["", "fifo", "fq_codel"])
        }))
        .unwrap();
        let pipe = decode_pipe(&record, &registry()).unwrap();
        assert_eq!(pipe.bandwidth.metric, "Mbit");
        assert_eq!(pipe.mask, "src-ip");
        assert_eq!(pipe.scheduler, "flowqueue-codel");
    }

    #[test]
    fn queue_reads_parent_from_option_map() {
        let record: QueueRecord = serde_json::from_value(json!({
            "enabled": "1",
            "pipe": options("p2", &["p1", "p2"]),
            "weight": "40",
            "mask": options("", &["none", "src-ip"]),
            "buckets": ""
        }))
        .unwrap();
        let queue = decode_queue(&record, &registry()).unwrap();
        assert_eq!(queue.pipe, EntityId::from("p2"));
        assert_eq!(queue.weight, 40);
        assert_eq!(queue.mask, "none");
        assert_eq!(queue.buckets, UNSET);
    }

    #[test]
    fn rule_dscp_and_direction_codes() {
        let rule = Rule {
            interface: "lan".into(),
            target: EntityId::from("p1"),
            dscp: ["af11", "best effort"].into_iter().collect(),
            direction: "in".into(),
            ..Rule::default()
        };
        let req = encode_rule(&rule, &registry()).unwrap();
        assert_eq!(req.dscp, "af11,be");
        assert_eq!(req.direction, "in");
        assert_eq!(req.source, "any");
        assert_eq!(req.proto, "ip");
    }

    #[test]
    fn rule_direction_both_is_blank_on_the_wire() {
        let rule = Rule {
            interface: "lan".into(),
            target: EntityId::from("p1"),
            ..Rule::default()
        };
        assert_eq!(encode_rule(&rule, &registry()).unwrap().direction, "");
    }

    #[test]
    fn rule_decodes_labels() {
        let record: RuleRecord = serde_json::from_value(json!({
            "enabled": "1",
            "sequence": "3",
            "interface": options("wan", &["lan", "wan"]),
            "interface2": options("", &["lan", "wan"]),
            "proto": options("udp", &["ip", "udp", "tcp"]),
            "iplen": "",
            "source": "10.0.0.0/24,10.1.0.0/24",
            "src_port": "",
            "destination": "any",
            "dst_port": "5060",
            "dscp": {
                "be": { "value": "Best Effort", "selected": 1 },
                "af11": { "value": "AF11", "selected": 1 },
                "ef": { "value": "EF", "selected": 0 }
            },
            "direction": options("in", &["", "in", "out"]),
            "target": options("q1", &["p1", "q1"]),
            "description": "voip"
        }))
        .unwrap();

        let rule = decode_rule(&record, &registry()).unwrap();
        assert_eq!(rule.interface, "wan");
        assert_eq!(rule.interface2, "");
        assert_eq!(rule.protocol, "udp");
        assert_eq!(rule.max_packet_length, UNSET);
        assert_eq!(rule.sources.sorted(), vec!["10.0.0.0/24", "10.1.0.0/24"]);
        assert_eq!(rule.source_port, "any");
        assert_eq!(rule.destination_port, "5060");
        assert_eq!(rule.dscp.sorted(), vec!["af11", "best effort"]);
        assert_eq!(rule.direction, "in");
        assert_eq!(rule.target, EntityId::from("q1"));
    }

    #[test]
    fn summary_from_search_row() {
        let row: SearchRow = serde_json::from_value(json!({
            "uuid": "r1",
            "description": "bulk",
            "enabled": "0",
            "sequence": "20"
        }))
        .unwrap();
        let summary = EntitySummary::from(row);
        assert_eq!(summary.id, EntityId::from("r1"));
        assert!(!summary.enabled);
        assert_eq!(summary.column("sequence").as_deref(), Some("20"));
    }
}
