mod common;

use serde_json::{Value, json};
use std::time::Duration;
use whotweeted_http::HttpClient;
use whotweeted_social::twitter::TwitterApi;
use whotweeted_social::twitter::client::{TIMELINE_PATH, TOKEN_PATH};
use whotweeted_social::{LoadError, TimelineLoader};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn http(server: &MockServer) -> HttpClient {
    HttpClient::new(&server.uri())
        .expect("mock base")
        .with_timeout(Duration::from_secs(5))
        .with_retries(0)
}

fn tweets(range: impl Iterator<Item = u64>) -> Value {
    Value::Array(
        range
            .map(|id| json!({ "id": id, "full_text": format!("tweet {id}") }))
            .collect(),
    )
}

#[tokio::test]
async fn walks_max_id_until_empty() {
    common::init_test_tracing();
    let server = MockServer::start().await;
    let timeline_path = format!("/{TIMELINE_PATH}");

    Mock::given(method("GET"))
        .and(path(timeline_path.as_str()))
        .and(query_param("max_id", "97"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .with_priority(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(timeline_path.as_str()))
        .and(query_param("max_id", "99"))
        .respond_with(ResponseTemplate::new(200).set_body_json(tweets([99, 98].into_iter())))
        .with_priority(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(timeline_path.as_str()))
        .and(query_param("screen_name", "jack"))
        .and(query_param("count", "200"))
        .and(query_param("include_rts", "false"))
        .and(query_param("tweet_mode", "extended"))
        .and(header("authorization", "Bearer test-bearer"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 102, "full_text": "salt &amp; pepper" },
            { "id": 101, "full_text": "RT boring", "retweeted_status": { "id": 5 } },
            { "id": 100, "text": "legacy body" }
        ])))
        .with_priority(5)
        .expect(1)
        .mount(&server)
        .await;

    let loader = TimelineLoader::new(TwitterApi::new(http(&server), "test-bearer".into()));
    let timeline = loader.load("jack").await.expect("timeline");

    assert_eq!(
        timeline.items(),
        ["salt & pepper", "legacy body", "tweet 99", "tweet 98"]
    );
}

#[tokio::test]
async fn missing_user_maps_to_unknown_account() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/{TIMELINE_PATH}").as_str()))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "errors": [{ "code": 34, "message": "Sorry, that page does not exist." }]
        })))
        .mount(&server)
        .await;

    let err = TimelineLoader::new(TwitterApi::new(http(&server), "t".into()))
        .load("nobody_here_1234")
        .await
        .expect_err("unknown user");

    assert!(matches!(err, LoadError::UnknownAccount { .. }));
}

#[tokio::test]
async fn rejected_token_maps_to_auth_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/{TIMELINE_PATH}").as_str()))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "errors": [{ "code": 89, "message": "Invalid or expired token." }]
        })))
        .mount(&server)
        .await;

    let err = TimelineLoader::new(TwitterApi::new(http(&server), "stale".into()))
        .load("jack")
        .await
        .expect_err("bad token");

    assert!(matches!(err, LoadError::AuthFailure(ref m) if m.contains("Invalid or expired token")));
}

#[tokio::test]
async fn rate_limited_maps_to_transient() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/{TIMELINE_PATH}").as_str()))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "errors": [{ "code": 88, "message": "Rate limit exceeded" }]
        })))
        .mount(&server)
        .await;

    let err = TimelineLoader::new(TwitterApi::new(http(&server), "t".into()))
        .load("jack")
        .await
        .expect_err("limited");

    assert!(err.is_transient());
}

#[tokio::test]
async fn consumer_keys_are_exchanged_for_a_bearer() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/{TOKEN_PATH}").as_str()))
        .and(header("authorization", "Basic a2V5OnNlY3JldA=="))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token_type": "bearer",
            "access_token": "issued-bearer"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/{TIMELINE_PATH}").as_str()))
        .and(header("authorization", "Bearer issued-bearer"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let api = TwitterApi::authenticate(http(&server), "key", "secret")
        .await
        .expect("token exchange");
    let timeline = TimelineLoader::new(api).load("quiet").await.expect("empty");

    assert!(timeline.is_empty());
}

#[tokio::test]
async fn refused_consumer_keys_are_an_auth_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/{TOKEN_PATH}").as_str()))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "errors": [{ "code": 99, "message": "Unable to verify your credentials" }]
        })))
        .mount(&server)
        .await;

    let err = TwitterApi::authenticate(http(&server), "key", "wrong")
        .await
        .err()
        .expect("refused");

    assert!(matches!(err, LoadError::AuthFailure(_)));
}

#[tokio::test]
async fn page_of_only_retweets_still_advances_the_cursor() {
    let server = MockServer::start().await;
    let timeline_path = format!("/{TIMELINE_PATH}");

    Mock::given(method("GET"))
        .and(path(timeline_path.as_str()))
        .and(query_param("max_id", "46"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .with_priority(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(timeline_path.as_str()))
        .and(query_param("max_id", "48"))
        .respond_with(ResponseTemplate::new(200).set_body_json(tweets([47].into_iter())))
        .with_priority(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(timeline_path.as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 50, "full_text": "RT one", "retweeted_status": { "id": 1 } },
            { "id": 49, "full_text": "RT two", "retweeted_status": { "id": 2 } }
        ])))
        .with_priority(5)
        .expect(1)
        .mount(&server)
        .await;

    let timeline = TimelineLoader::new(TwitterApi::new(http(&server), "t".into()))
        .load("jack")
        .await
        .expect("timeline");

    assert_eq!(timeline.items(), ["tweet 47"]);
}
