use std::time::Duration;

use docchat_engine::{
    Gateway, GatewayErrorKind, GatewaySettings, ReqwestGateway, SourceSnippet, UploadFile,
};
use pretty_assertions::assert_eq;
use wiremock::matchers::{body_json, body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn gateway_for(server: &MockServer) -> ReqwestGateway {
    ReqwestGateway::new(GatewaySettings {
        endpoint_base: format!("{}/api/v1", server.uri()),
        ..GatewaySettings::default()
    })
    .expect("gateway")
}

#[tokio::test]
async fn ingest_posts_multipart_file() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/documents/ingest"))
        .and(body_string_contains("filename=\"report.pdf\""))
        .and(body_string_contains("%PDF-1.4 body"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "report.pdf",
            "message": "Successfully ingested 12 chunks from report.pdf"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let ack = gateway_for(&server)
        .ingest(UploadFile::new("report.pdf", b"%PDF-1.4 body".to_vec()))
        .await
        .expect("ingest ok");
    assert_eq!(ack.id.as_deref(), Some("report.pdf"));
}

#[tokio::test]
async fn ingest_treats_any_success_body_as_ack() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/documents/ingest"))
        .respond_with(ResponseTemplate::new(201).set_body_string("accepted"))
        .mount(&server)
        .await;

    let ack = gateway_for(&server)
        .ingest(UploadFile::new("notes.txt", b"hello".to_vec()))
        .await
        .expect("ingest ok");
    assert_eq!(ack.message, None);
}

#[tokio::test]
async fn ingest_failure_carries_backend_detail() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/documents/ingest"))
        .respond_with(
            ResponseTemplate::new(500)
                .set_body_json(serde_json::json!({ "detail": "file too large" })),
        )
        .mount(&server)
        .await;

    let err = gateway_for(&server)
        .ingest(UploadFile::new("bad.pdf", b"x".to_vec()))
        .await
        .unwrap_err();
    assert_eq!(err.kind, GatewayErrorKind::HttpStatus(500));
    assert_eq!(err.message, "file too large");
}

#[tokio::test]
async fn ingest_failure_without_body_uses_status_line() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/documents/ingest"))
        .respond_with(ResponseTemplate::new(413))
        .mount(&server)
        .await;

    let err = gateway_for(&server)
        .ingest(UploadFile::new("big.pdf", b"x".to_vec()))
        .await
        .unwrap_err();
    assert_eq!(err.kind, GatewayErrorKind::HttpStatus(413));
    assert_eq!(err.message, "413 Payload Too Large");
}

#[tokio::test]
async fn query_sends_json_and_decodes_sources() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/chat"))
        .and(body_json(serde_json::json!({ "query": "Summarize the key points" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "answer": "Three key points.",
            "sources": [
                { "text": "First excerpt...", "source": "report.pdf", "page": 2 },
                { "text": "Second excerpt...", "source": "report.pdf", "page": "9" }
            ],
            "confidence": "High"
        })))
        .mount(&server)
        .await;

    let response = gateway_for(&server)
        .query("Summarize the key points")
        .await
        .expect("query ok");
    assert_eq!(response.answer, "Three key points.");
    assert_eq!(response.confidence.as_deref(), Some("High"));
    assert_eq!(
        response.sources,
        Some(vec![
            SourceSnippet {
                text: "First excerpt...".to_string(),
                source: "report.pdf".to_string(),
                page: 2,
            },
            SourceSnippet {
                text: "Second excerpt...".to_string(),
                source: "report.pdf".to_string(),
                page: 9,
            },
        ])
    );
}

#[tokio::test]
async fn query_rejects_undecodable_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = gateway_for(&server).query("hello").await.unwrap_err();
    assert_eq!(err.kind, GatewayErrorKind::Decode);
}

#[tokio::test]
async fn query_fails_on_http_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/chat"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = gateway_for(&server).query("hello").await.unwrap_err();
    assert_eq!(err.kind, GatewayErrorKind::HttpStatus(503));
}

#[tokio::test]
async fn request_timeout_applies_when_configured() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/chat"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(250))
                .set_body_json(serde_json::json!({ "answer": "late" })),
        )
        .mount(&server)
        .await;

    let gateway = ReqwestGateway::new(GatewaySettings {
        endpoint_base: format!("{}/api/v1", server.uri()),
        request_timeout: Some(Duration::from_millis(50)),
        ..GatewaySettings::default()
    })
    .expect("gateway");
    let err = gateway.query("hello").await.unwrap_err();
    assert_eq!(err.kind, GatewayErrorKind::Timeout);
}
