// Integration tests for the traffic shaper endpoints using wiremock.

use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{basic_auth, body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use opnshaper_api::shaper::{
    DeleteOutcome, Flag, PipeRequest, Quoted, RuleRequest, Sentinel,
};
use opnshaper_api::{ApiClient, ApiCredentials, Error};

// ── Helpers ─────────────────────────────────────────────────────────

const PIPE_ID: &str = "5a1f0c8e-3b2d-4e6f-9a7b-1c2d3e4f5a6b";

async fn setup() -> (MockServer, ApiClient) {
    let server = MockServer::start().await;
    let creds = ApiCredentials {
        key: "key".into(),
        secret: SecretString::from("secret".to_owned()),
    };
    let client =
        ApiClient::with_client(reqwest::Client::new(), &server.uri(), Some(creds)).unwrap();
    (server, client)
}

fn pipe_request() -> PipeRequest {
    PipeRequest {
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
        delay: Sentinel::UNSET,
        description: "uplink".into(),
    }
}

// ── Happy-path tests ────────────────────────────────────────────────

#[tokio::test]
async fn test_add_pipe_wraps_body_and_returns_uuid() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/trafficshaper/settings/add_pipe"))
        .and(basic_auth("key", "secret"))
        .and(body_json(json!({
            "pipe": {
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
                "delay": "",
                "description": "uplink"
            }
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "result": "saved", "uuid": PIPE_ID })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let id = client.add_pipe(&pipe_request()).await.unwrap();
    assert_eq!(id, PIPE_ID);
}

#[tokio::test]
async fn test_get_pipe_decodes_options() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path(format!("/api/trafficshaper/settings/get_pipe/{PIPE_ID}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "pipe": {
                "enabled": "1",
                "bandwidth": "10",
                "bandwidthMetric": {
                    "bit": { "value": "bit/s", "selected": 0 },
                    "Kbit": { "value": "Kbit/s", "selected": 1 }
                },
                "queue": "",
                "scheduler": {
                    "": { "value": "Weighted fair queueing", "selected": 0 },
                    "rr": { "value": "Deficit round robin", "selected": 1 }
                },
                "delay": "",
                "description": "uplink"
            }
        })))
        .mount(&server)
        .await;

    let record = client.get_pipe(PIPE_ID).await.unwrap().unwrap();
    assert_eq!(record.bandwidth.0, 10);
    assert_eq!(record.bandwidth_metric.selected(), "Kbit");
    assert_eq!(record.scheduler.selected(), "rr");
    assert!(record.delay.is_unset());
    assert_eq!(record.description, "uplink");
}

#[tokio::test]
async fn test_get_unknown_pipe_is_none() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/trafficshaper/settings/get_pipe/missing"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    assert!(client.get_pipe("missing").await.unwrap().is_none());
}

#[tokio::test]
async fn test_delete_is_idempotent() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/trafficshaper/settings/del_queue/gone"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": "not found" })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/trafficshaper/settings/del_queue/present"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": "deleted" })))
        .mount(&server)
        .await;

    assert_eq!(client.del_queue("gone").await.unwrap(), DeleteOutcome::NotFound);
    assert_eq!(client.del_queue("present").await.unwrap(), DeleteOutcome::Deleted);
}

#[tokio::test]
async fn test_search_rules_rows() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/trafficshaper/settings/search_rules"))
        .and(body_json(json!({ "current": 1, "rowCount": -1, "searchPhrase": "" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "rows": [
                { "uuid": "r1", "description": "voip", "enabled": "1", "sequence": "1" },
                { "uuid": "r2", "description": "bulk", "enabled": "0", "sequence": "20" }
            ],
            "rowCount": 2,
            "total": 2,
            "current": 1
        })))
        .mount(&server)
        .await;

    let rows = client.search_rules().await.unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].uuid, "r1");
    assert!(rows[0].enabled.0);
    assert!(!rows[1].enabled.0);
    assert_eq!(rows[1].extra.get("sequence"), Some(&json!("20")));
}

#[tokio::test]
async fn test_reconfigure_and_interfaces() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/trafficshaper/service/reconfigure"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "ok" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/interfaces/overview/interfaces_info"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "rows": [
                { "identifier": "lan", "description": "LAN", "device": "igb1" },
                { "identifier": "wan", "description": "WAN", "device": "igb0" },
                { "identifier": "", "description": "unassigned", "device": "igb2" }
            ]
        })))
        .mount(&server)
        .await;

    assert!(client.reconfigure_shaper().await.unwrap().is_ok());
    let names: Vec<String> = client
        .list_interfaces()
        .await
        .unwrap()
        .into_iter()
        .map(|row| row.identifier)
        .collect();
    assert_eq!(names, vec!["lan", "wan"]);
}

// ── Error tests ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_add_rule_validation_failure() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/trafficshaper/settings/add_rule"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": "failed",
            "validations": { "rule.target": "Related item not found" }
        })))
        .mount(&server)
        .await;

    let rule = RuleRequest {
        enabled: Flag(true),
        sequence: Quoted(1),
        interface: "lan".into(),
        interface2: String::new(),
        proto: "ip".into(),
        iplen: Sentinel::UNSET,
        source: "any".into(),
        source_not: Flag(false),
        src_port: "any".into(),
        destination: "any".into(),
        destination_not: Flag(false),
        dst_port: "any".into(),
        dscp: String::new(),
        direction: String::new(),
        target: "nope".into(),
        description: String::new(),
    };

    match client.add_rule(&rule).await {
        Err(Error::Validation { messages }) => {
            assert_eq!(messages["rule.target"], vec!["Related item not found"]);
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_delete_in_use_is_conflict() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path(format!("/api/trafficshaper/settings/del_pipe/{PIPE_ID}")))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "errorTitle": "Item in use by",
            "errorMessage": "Queue 'voip' still references this pipe"
        })))
        .mount(&server)
        .await;

    match client.del_pipe(PIPE_ID).await {
        Err(Error::Conflict { title, message }) => {
            assert_eq!(title, "Item in use by");
            assert!(message.contains("voip"));
        }
        other => panic!("expected conflict, got {other:?}"),
    }
}

#[tokio::test]
async fn test_http_error_status() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/trafficshaper/settings/set_pipe/abc"))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
        .mount(&server)
        .await;

    let err = client.set_pipe("abc", &pipe_request()).await.unwrap_err();
    assert_eq!(err.status(), Some(502));
}

#[tokio::test]
async fn test_set_unknown_id_is_not_found() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/trafficshaper/settings/set_pipe/gone"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": "failed" })))
        .mount(&server)
        .await;

    match client.set_pipe("gone", &pipe_request()).await {
        Err(Error::NotFound { command, id }) => {
            assert_eq!(command, "set_pipe");
            assert_eq!(id, "gone");
        }
        other => panic!("expected not found, got {other:?}"),
    }
}

#[tokio::test]
async fn test_set_failed_with_messages_stays_validation() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/trafficshaper/settings/set_pipe/abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": "failed",
            "validations": { "pipe.bandwidth": "Bandwidth must be a number." }
        })))
        .mount(&server)
        .await;

    assert!(matches!(
        client.set_pipe("abc", &pipe_request()).await,
        Err(Error::Validation { ref messages }) if messages.contains_key("pipe.bandwidth")
    ));
}

#[tokio::test]
async fn test_option_map_keeps_document_order() {
    let (server, client) = setup().await;

    // Keys deliberately out of lexical order.
    let body = r#"{"pipe": {
        "scheduler": {
            "rr":   { "value": "Deficit round robin", "selected": 1 },
            "fifo": { "value": "FIFO", "selected": 1 },
            "":     { "value": "Weighted fair queueing", "selected": 0 }
        }
    }}"#;
    Mock::given(method("GET"))
        .and(path(format!("/api/trafficshaper/settings/get_pipe/{PIPE_ID}")))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "application/json"))
        .mount(&server)
        .await;

    let record = client.get_pipe(PIPE_ID).await.unwrap().unwrap();
    let keys: Vec<&str> = record.scheduler.entries().iter().map(|e| e.key.as_str()).collect();
    assert_eq!(keys, vec!["rr", "fifo", ""]);
    assert_eq!(record.scheduler.selected(), "rr");
    assert_eq!(record.scheduler.selected_all(), vec!["rr", "fifo"]);
}

#[tokio::test]
async fn test_unauthorized() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/trafficshaper/settings/get_rule/abc"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    assert!(matches!(
        client.get_rule("abc").await,
        Err(Error::Authentication { .. })
    ));
}

#[tokio::test]
async fn test_garbage_body_is_deserialization_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/trafficshaper/settings/get_queue/abc"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
        .mount(&server)
        .await;

    assert!(matches!(
        client.get_queue("abc").await,
        Err(Error::Deserialization { .. })
    ));
}
