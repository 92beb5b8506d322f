use quake_http::{HttpClient, HttpError, RequestOpts};
use serde_json::{Value, json};
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn decodes_success_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/earthquakes.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 7}])))
        .expect(1)
        .mount(&server)
        .await;

    let client = HttpClient::new().unwrap();
    let got: Value = client
        .get_json(
            &format!("{}/earthquakes.json", server.uri()),
            RequestOpts::default(),
        )
        .await
        .unwrap();

    assert_eq!(got, json!([{"id": 7}]));
}

#[tokio::test]
async fn json_opts_send_accept_header() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/feed"))
        .and(header("accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let client = HttpClient::new().unwrap();
    let got: Value = client
        .get_json(&format!("{}/feed", server.uri()), RequestOpts::json())
        .await
        .unwrap();

    assert_eq!(got, json!([]));
}

#[tokio::test]
async fn per_request_timeout_overrides_default() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([]))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let client = HttpClient::new().unwrap();
    let err = client
        .get_json::<Value>(
            &server.uri(),
            RequestOpts {
                timeout: Some(Duration::from_millis(50)),
                ..RequestOpts::json()
            },
        )
        .await
        .unwrap_err();

    assert!(err.is_transport(), "unexpected error: {err:?}");
}

#[tokio::test]
async fn non_success_status_is_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(503)
                .insert_header("x-request-id", "abc123")
                .set_body_json(json!({"message": "maintenance"})),
        )
        .mount(&server)
        .await;

    let client = HttpClient::new().unwrap();
    let err = client
        .get_json::<Value>(&server.uri(), RequestOpts::default())
        .await
        .unwrap_err();

    match err {
        HttpError::Api {
            status,
            message,
            request_id,
        } => {
            assert_eq!(status.as_u16(), 503);
            assert_eq!(message, "maintenance");
            assert_eq!(request_id, "abc123");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn malformed_body_is_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let client = HttpClient::new().unwrap();
    let err = client
        .get_json::<Value>(&server.uri(), RequestOpts::default())
        .await
        .unwrap_err();

    match err {
        HttpError::Decode(_, snippet) => assert_eq!(snippet, "not json"),
        other => panic!("expected Decode error, got {other:?}"),
    }
}

#[tokio::test]
async fn slow_response_times_out_as_network_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([]))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let client = HttpClient::new()
        .unwrap()
        .with_timeout(Duration::from_millis(50));
    let err = client
        .get_json::<Value>(&server.uri(), RequestOpts::default())
        .await
        .unwrap_err();

    assert!(err.is_transport(), "unexpected error: {err:?}");
}

#[tokio::test]
async fn invalid_url_is_rejected_before_sending() {
    let client = HttpClient::new().unwrap();
    let err = client
        .get_json::<Value>("not a url", RequestOpts::default())
        .await
        .unwrap_err();

    assert!(matches!(err, HttpError::Url(_)));
}
