// Integration tests for `VisionClient` using wiremock.

#![allow(clippy::unwrap_used)]

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use nimbra_api::models::{CommonExtra, Extra};
use nimbra_api::{
    CreateCircuitFields, Error, InterAppMessage, TlsMode, TransportConfig, VisionClient, tables,
};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, VisionClient) {
    let server = MockServer::start().await;
    let client = VisionClient::from_reqwest(&server.uri(), "vision", reqwest::Client::new()).unwrap();
    (server, client)
}

// ── Happy-path tests ────────────────────────────────────────────────

#[tokio::test]
async fn test_get_element() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/elements/vision"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "name": "vision", "state": "Active" })),
        )
        .mount(&server)
        .await;

    let info = client.get_element().await.unwrap();
    assert_eq!(info.name, "vision");
    assert!(info.is_active());
}

#[tokio::test]
async fn test_read_circuit_table() {
    let (server, client) = setup().await;

    let body = json!({
        "success": true,
        "data": [
            ["1", "shared-1", "j2k", "", "", "", "", "", "3_nodeA", "7_nodeB", "50", "vaJ2k", "nodeA;nodeB", ""],
            ["2", "shared-2", "E-Line", "", "", "", "", "", "1_nodeA", "2_nodeB", 5, "EVP-Line", "", ""]
        ]
    });

    Mock::given(method("GET"))
        .and(path("/api/elements/vision/tables/1800"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let rows = client.read_table(tables::CIRCUITS).await.unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0][2], json!("j2k"));
    assert_eq!(rows[1][10], json!(5));
}

#[tokio::test]
async fn test_create_circuit_writes_serialized_request() {
    let (server, client) = setup().await;

    let fields = CreateCircuitFields {
        service_id: "VA-SRT".into(),
        source: "1_nodeA".into(),
        destination: "2_nodeA".into(),
        capacity: 20,
        start_time: None,
        end_time: None,
        protection_id: None,
        extra: Some(Extra {
            common: CommonExtra {
                form_name: "vaSdiSrt".into(),
                vlans: None,
                stream_type: Some("push".into()),
                stream_port: Some(5000),
                passphrase: None,
            },
        }),
    };
    let expected_value = serde_json::to_string(&fields).unwrap();

    Mock::given(method("POST"))
        .and(path("/api/elements/vision/parameters/125"))
        .and(body_json(json!({ "value": expected_value })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    client.create_circuit(&fields).await.unwrap();
}

#[tokio::test]
async fn test_send_delete_message() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/elements/vision/interapp"))
        .and(body_json(json!({ "type": "DeleteCircuit", "sharedId": "shared-1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&server)
        .await;

    let resp = client
        .send_interapp(&InterAppMessage::DeleteCircuit {
            shared_id: "shared-1".into(),
        })
        .await
        .unwrap();
    assert!(resp.success);
}

#[tokio::test]
async fn test_bearer_token_is_sent() {
    let server = MockServer::start().await;
    let transport = TransportConfig {
        tls: TlsMode::System,
        ..TransportConfig::default()
    }
    .with_token(secrecy::SecretString::from("s3cret"));
    let client = VisionClient::new(&server.uri(), "vision", &transport).unwrap();

    Mock::given(method("GET"))
        .and(path("/api/elements/vision"))
        .and(header("authorization", "Bearer s3cret"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "name": "vision", "state": "Active" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    client.get_element().await.unwrap();
}

// ── Error-path tests ────────────────────────────────────────────────

#[tokio::test]
async fn test_missing_element_is_not_found() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/elements/vision"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "message": "no such element" })))
        .mount(&server)
        .await;

    let err = client.get_element().await.unwrap_err();
    assert!(matches!(err, Error::ElementNotFound { ref name } if name == "vision"));
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_unsuccessful_table_read_is_rejected() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/elements/vision/tables/2200"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "success": false, "message": "table not polled" })),
        )
        .mount(&server)
        .await;

    let err = client.read_table(tables::VA_RESOURCES).await.unwrap_err();
    match err {
        Error::Rejected { message } => assert_eq!(message, "table not polled"),
        other => panic!("expected Rejected, got {other:?}"),
    }
}

#[tokio::test]
async fn test_unauthorized() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/elements/vision/tables/1600"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = client.read_table(tables::ITS_INTERFACES).await.unwrap_err();
    assert!(matches!(err, Error::Unauthorized));
}

#[tokio::test]
async fn test_interapp_refusal_is_rejected() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/elements/vision/interapp"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "success": false, "message": "unknown circuit" })),
        )
        .mount(&server)
        .await;

    let err = client
        .send_interapp(&InterAppMessage::EditCircuit {
            circuit_id: "9".into(),
            end_time: "2026-01-01T10:00:00Z".into(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Rejected { .. }));
}

#[tokio::test]
async fn test_garbage_body_is_deserialization_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/elements/vision/tables/1900"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let err = client.read_table(tables::ETS_INTERFACES).await.unwrap_err();
    match err {
        Error::Deserialization { body, .. } => assert!(body.contains("maintenance")),
        other => panic!("expected Deserialization, got {other:?}"),
    }
}

#[tokio::test]
async fn test_gateway_error_status() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/elements/vision/parameters/125"))
        .respond_with(ResponseTemplate::new(503).set_body_string("busy"))
        .mount(&server)
        .await;

    let err = client.set_parameter(tables::CREATE_CIRCUIT, "{}").await.unwrap_err();
    assert!(err.is_transient());
    assert!(matches!(err, Error::Gateway { status: 503, ref message } if message == "busy"));
}
