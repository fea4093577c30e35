//! End-to-end tests of the default reqwest transport against a local mock server.

use std::time::Duration;

use serde_json::json;
use smsgate::{MessageStatus, RetryPolicy, SmsGateClient, SmsGateError, SmsPayload};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn delivery(id: &str, to: &str) -> serde_json::Value {
    json!({
        "id": id,
        "sid": null,
        "channel": "sms",
        "to": [to],
        "from": "SMSGate",
        "content": "hello",
        "status": "delivered",
        "cost": 0.02,
        "currency": "USD",
        "createdAt": "2024-05-01T10:00:00Z",
        "updatedAt": "2024-05-01T10:00:05Z"
    })
}

fn fast_retries() -> RetryPolicy {
    RetryPolicy {
        initial_delay: Duration::from_millis(10),
        max_delay: Duration::from_millis(50),
        ..Default::default()
    }
}

fn client_for(server: &MockServer) -> SmsGateClient {
    SmsGateClient::builder("live_token")
        .base_url(server.uri())
        .retry_policy(fast_retries())
        .build()
        .unwrap()
}

#[tokio::test]
async fn sends_sms_over_http() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/messages/sms"))
        .and(header("authorization", "live_token"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({"to": "+15550001111", "message": "hello"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(delivery("msg_1", "+15550001111")))
        .expect(1)
        .mount(&server)
        .await;

    let result = client_for(&server)
        .send_sms(SmsPayload::new("+15550001111", "hello"))
        .await
        .unwrap();

    assert_eq!(result.id, "msg_1");
    assert_eq!(result.status, MessageStatus::Delivered);
    assert_eq!(result.updated_at.as_deref(), Some("2024-05-01T10:00:05Z"));
}

#[tokio::test]
async fn retries_service_unavailable_then_succeeds() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/messages/sms"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/messages/sms"))
        .respond_with(ResponseTemplate::new(200).set_body_json(delivery("msg_2", "+15550001111")))
        .expect(1)
        .mount(&server)
        .await;

    let result = client_for(&server)
        .send_sms(SmsPayload::new("+15550001111", "hello"))
        .await
        .unwrap();
    assert_eq!(result.id, "msg_2");
}

#[tokio::test]
async fn api_error_envelope_is_decoded_without_retry() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/messages/sms"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": {
                "code": "INVALID_TOKEN",
                "message": "Invalid API token",
                "details": {"reason": "revoked"}
            },
            "meta": {"requestId": "req_abc"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let err = client_for(&server)
        .send_sms(SmsPayload::new("+15550001111", "hello"))
        .await
        .unwrap_err();

    let api = match err {
        SmsGateError::Api(api) => api,
        other => panic!("expected API error, got {other:?}"),
    };
    assert_eq!(api.status_code, 401);
    assert_eq!(api.code.as_deref(), Some("INVALID_TOKEN"));
    assert_eq!(api.request_id.as_deref(), Some("req_abc"));
    assert_eq!(
        api.details.as_ref().and_then(|d| d.get("reason")),
        Some(&json!("revoked"))
    );
}

#[tokio::test]
async fn plain_text_success_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/messages/sms"))
        .respond_with(ResponseTemplate::new(200).set_body_string("queued"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .send_sms(SmsPayload::new("+15550001111", "hello"))
        .await
        .unwrap_err();

    let api = match err {
        SmsGateError::Api(api) => api,
        other => panic!("expected API error, got {other:?}"),
    };
    assert_eq!(api.status_code, 200);
    assert!(api.is_invalid_response());
}

#[tokio::test]
async fn slow_server_hits_request_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/messages/sms"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(delivery("late", "+15550001111"))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let client = SmsGateClient::builder("live_token")
        .base_url(server.uri())
        .timeout(Duration::from_millis(100))
        .retry_policy(RetryPolicy::disabled())
        .build()
        .unwrap();

    let started = std::time::Instant::now();
    let err = client
        .send_sms(SmsPayload::new("+15550001111", "hello"))
        .await
        .unwrap_err();

    assert!(started.elapsed() >= Duration::from_millis(100));
    assert!(started.elapsed() < Duration::from_secs(5));
    let api = match err {
        SmsGateError::Api(api) => api,
        other => panic!("expected API error, got {other:?}"),
    };
    assert_eq!(api.status_code, 408);
    assert!(api.is_timeout());
}

#[tokio::test]
async fn unreachable_host_is_a_network_error() {
    // Nothing listens on port 1, so the connection is refused.
    let err = SmsGateClient::builder("live_token")
        .base_url("http://127.0.0.1:1")
        .build()
        .unwrap()
        .send_sms(SmsPayload::new("+15550001111", "hello"))
        .await
        .unwrap_err();

    let api = match err {
        SmsGateError::Api(api) => api,
        other => panic!("expected API error, got {other:?}"),
    };
    assert_eq!(api.status_code, 0);
    assert!(api.is_network_error());
    assert!(api.message.starts_with("Network error: "));
}

#[tokio::test]
async fn batch_sends_every_item() {
    let server = MockServer::start().await;
    for (id, to) in [("a", "+15550000001"), ("b", "+15550000002")] {
        Mock::given(method("POST"))
            .and(path("/messages/sms"))
            .and(body_json(json!({"to": to, "message": "hello"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(delivery(id, to)))
            .expect(1)
            .mount(&server)
            .await;
    }

    let results = client_for(&server)
        .send_sms_batch(vec![
            SmsPayload::new("+15550000001", "hello"),
            SmsPayload::new("+15550000002", "hello"),
        ])
        .await
        .unwrap();

    let ids = results.iter().map(|r| r.id.as_str()).collect::<Vec<_>>();
    assert_eq!(ids, vec!["a", "b"]);
}
