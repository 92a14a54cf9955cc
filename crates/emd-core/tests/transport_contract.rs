//! HTTP contract tests for the backend transport.
//!
//! Each test mounts the expected request on a mock server and checks how
//! the response is mapped.

use emd_core::config::Config;
use emd_core::{ChatTransport, HttpTransport, MedicineFilter, TransportError};
use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_chat_posts_message_and_reads_text() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat"))
        .and(body_json(json!({ "message": "Сайн уу" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "text": "Сайн байна уу!" })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let transport = HttpTransport::new(&mock_server.uri());
    let reply = transport.send_message("Сайн уу").await.unwrap();
    assert_eq!(reply.text.as_deref(), Some("Сайн байна уу!"));
}

#[tokio::test]
async fn test_chat_reply_without_text() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "intent": "greet" })))
        .mount(&mock_server)
        .await;

    let transport = HttpTransport::new(&mock_server.uri());
    let reply = transport.send_message("Сайн уу").await.unwrap();
    assert_eq!(reply.text, None);
}

#[tokio::test]
async fn test_server_error_classified() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(
            ResponseTemplate::new(500)
                .set_body_json(json!({ "error": "Серверийн алдаа гарлаа. Дахин оролдоно уу." })),
        )
        .mount(&mock_server)
        .await;

    let transport = HttpTransport::new(&mock_server.uri());
    let err = transport.send_message("Сайн уу").await.unwrap_err();
    assert_eq!(err, TransportError::Server(500));
}

#[tokio::test]
async fn test_not_found_classified() {
    let mock_server = MockServer::start().await;

    let transport = HttpTransport::new(&mock_server.uri());
    let err = transport.send_message("Сайн уу").await.unwrap_err();
    assert_eq!(err, TransportError::NotFound("/chat".to_string()));
}

#[tokio::test]
async fn test_message_payload_surfaces_as_other() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({ "message": "Хоосон мессеж" })))
        .mount(&mock_server)
        .await;

    let transport = HttpTransport::new(&mock_server.uri());
    let err = transport.send_message("Сайн уу").await.unwrap_err();
    assert_eq!(
        err,
        TransportError::Other {
            status: Some(400),
            message: Some("Хоосон мессеж".to_string())
        }
    );
}

#[tokio::test]
async fn test_unreachable_backend_is_network_error() {
    // Nothing listens on a port we just released
    let mock_server = MockServer::start().await;
    let uri = mock_server.uri();
    drop(mock_server);

    let transport = HttpTransport::new(&uri);
    let err = transport.send_message("Сайн уу").await.unwrap_err();
    assert!(matches!(err, TransportError::Network(_)), "{:?}", err);
}

#[tokio::test]
async fn test_report_unanswered_uses_configured_path() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/save-unanswered"))
        .and(body_json(json!({ "question": "Битүүмж гэж юу вэ?" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = Config {
        base_url: Some(mock_server.uri()),
        unanswered_path: Some("/api/save-unanswered".to_string()),
        ..Config::new()
    };
    let transport = HttpTransport::from_config(&config);
    transport.report_unanswered("Битүүмж гэж юу вэ?").await.unwrap();
}

#[tokio::test]
async fn test_report_unanswered_default_path() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/unanswered"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let transport = HttpTransport::new(&mock_server.uri());
    transport.report_unanswered("Асуулт").await.unwrap();
}

#[tokio::test]
async fn test_list_hospitals() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/hospitals"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "name": "Улсын нэгдүгээр төв эмнэлэг", "city": "Улаанбаатар", "insurance_contract": true },
            { "name": "Хувийн эмнэлэг", "city": "Дархан", "insurance_contract": false }
        ])))
        .mount(&mock_server)
        .await;

    let transport = HttpTransport::new(&mock_server.uri());
    let hospitals = transport.list_hospitals().await.unwrap();
    assert_eq!(hospitals.len(), 2);
    assert!(hospitals[0].insurance_contract);
    assert_eq!(hospitals[1].city, "Дархан");
}

#[tokio::test]
async fn test_list_medicines_sends_only_set_filters() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/medicines"))
        .and(query_param("tablet_name", "Парацетамол"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "icd10_code": "J06",
            "icd10_name": "Амьсгалын дээд замын цочмог халдвар",
            "tablet_name_mon": "Парацетамол",
            "tablet_name_sales": "Paracetamol 500mg",
            "unit_price": 120.0,
            "unit_discount": 60.0
        }])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let transport = HttpTransport::new(&mock_server.uri());
    let filter = MedicineFilter {
        tablet_name: Some("Парацетамол".to_string()),
        ..MedicineFilter::default()
    };
    let medicines = transport.list_medicines(&filter).await.unwrap();
    assert_eq!(medicines.len(), 1);
    assert_eq!(medicines[0].icd10_code, "J06");
    assert_eq!(medicines[0].unit_discount, Some(60.0));

    let requests = mock_server.received_requests().await.unwrap();
    assert!(!requests[0].url.query().unwrap_or_default().contains("icd10_code"));
}
