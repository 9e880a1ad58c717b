//! Tests of the Telegram transport against a mock Bot API

use serde_json::json;
use sitewatch::{
    telegram::{TelegramCredentials, TelegramTransport},
    transport::Transport,
};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN: &str = "123456:secret-token";

fn transport_for(server: &MockServer) -> TelegramTransport {
    TelegramTransport::new(
        reqwest::Client::new(),
        Some(TelegramCredentials {
            bot_token: TOKEN.to_string(),
            chat_id: "-1001".to_string(),
        }),
    )
    .with_api_base(server.uri())
}

#[tokio::test]
async fn test_send_message_payload() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!("/bot{TOKEN}/sendMessage")))
        .and(body_json(json!({
            "chat_id": "-1001",
            "text": "🔴 **DOWN ALERT**",
            "parse_mode": "Markdown"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true, "result": {}})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let transport = transport_for(&mock_server);
    assert!(transport.is_enabled());

    transport.send("🔴 **DOWN ALERT**").await.unwrap();
}

#[tokio::test]
async fn test_api_rejection_is_an_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "ok": false,
            "error_code": 400,
            "description": "Bad Request: chat not found"
        })))
        .mount(&mock_server)
        .await;

    let err = transport_for(&mock_server).send("hello").await.unwrap_err();
    let message = format!("{err:#}");

    assert!(message.contains("chat not found"));
    assert!(message.contains("400"));
}

#[tokio::test]
async fn test_ok_false_with_success_status_is_an_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": false,
            "description": "Too Many Requests: retry after 3"
        })))
        .mount(&mock_server)
        .await;

    let err = transport_for(&mock_server).send("hello").await.unwrap_err();
    assert!(format!("{err:#}").contains("Too Many Requests"));
}

#[tokio::test]
async fn test_unreachable_api_does_not_leak_token() {
    let transport = TelegramTransport::new(
        reqwest::Client::new(),
        Some(TelegramCredentials {
            bot_token: TOKEN.to_string(),
            chat_id: "-1001".to_string(),
        }),
    )
    .with_api_base("http://127.0.0.1:9999");

    let err = transport.send("hello").await.unwrap_err();

    assert!(!format!("{err:#}").contains(TOKEN));
}
