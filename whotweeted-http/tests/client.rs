use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use whotweeted_http::{Auth, HttpClient, HttpError, RequestOpts};
use wiremock::matchers::{body_string, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Debug, Deserialize)]
struct Token {
    token_type: String,
    access_token: String,
}

fn client(server: &MockServer) -> HttpClient {
    HttpClient::new(&server.uri())
        .expect("mock server uri")
        .with_timeout(Duration::from_secs(5))
}

#[tokio::test]
async fn get_json_sends_bearer_and_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/1.1/statuses/user_timeline.json"))
        .and(query_param("screen_name", "jack"))
        .and(header("authorization", "Bearer tok-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 1}])))
        .expect(1)
        .mount(&server)
        .await;

    let got: serde_json::Value = client(&server)
        .get_json(
            "1.1/statuses/user_timeline.json",
            RequestOpts {
                auth: Some(Auth::Bearer(" tok-123 ")),
                query: Some(vec![("screen_name", "jack".into())]),
                ..Default::default()
            },
        )
        .await
        .expect("ok response");

    assert_eq!(got, json!([{"id": 1}]));
}

#[tokio::test]
async fn post_form_uses_basic_auth() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .and(header("authorization", "Basic a2V5OnNlY3JldA=="))
        .and(body_string("grant_type=client_credentials"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token_type": "bearer",
            "access_token": "AAAA"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let token: Token = client(&server)
        .post_form(
            "oauth2/token",
            &[("grant_type", "client_credentials")],
            RequestOpts {
                auth: Some(Auth::Basic {
                    username: "key",
                    password: "secret",
                }),
                ..Default::default()
            },
        )
        .await
        .expect("token issued");

    assert_eq!(token.token_type, "bearer");
    assert_eq!(token.access_token, "AAAA");
}

#[tokio::test]
async fn retries_server_errors_then_succeeds() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    let got: serde_json::Value = client(&server)
        .get_json("flaky", RequestOpts::default())
        .await
        .expect("second attempt succeeds");

    assert_eq!(got["ok"], true);
}

#[tokio::test]
async fn not_found_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "errors": [{"code": 34, "message": "Sorry, that page does not exist."}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let err = client(&server)
        .get_json::<serde_json::Value>("missing", RequestOpts::default())
        .await
        .expect_err("404 surfaces as an error");

    assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
    assert!(!err.is_transient());
    match err {
        HttpError::Api { message, .. } => {
            assert_eq!(message, "Sorry, that page does not exist.")
        }
        other => panic!("expected api error, got {other:?}"),
    }
}

#[tokio::test]
async fn exhausted_retries_report_the_last_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/down"))
        .respond_with(ResponseTemplate::new(502))
        .expect(2)
        .mount(&server)
        .await;

    let err = client(&server)
        .get_json::<serde_json::Value>(
            "down",
            RequestOpts {
                retries: Some(1),
                ..Default::default()
            },
        )
        .await
        .expect_err("still failing");

    assert_eq!(err.status(), Some(StatusCode::BAD_GATEWAY));
    assert!(err.is_transient());
}

#[tokio::test]
async fn undecodable_body_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/html"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
        .mount(&server)
        .await;

    let err = client(&server)
        .get_json::<serde_json::Value>("html", RequestOpts::default())
        .await
        .expect_err("not json");

    assert!(matches!(err, HttpError::Decode(_, ref body) if body == "<html></html>"));
}
