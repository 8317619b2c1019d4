//! End-to-end tests for the `nominatim` binary against a wiremock server.

#![cfg(feature = "cli")]

use std::process::Output;

use wiremock::matchers::{path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Run the binary with an empty config file so no user config leaks in.
async fn run(server: &MockServer, args: &[&str]) -> Output {
    let config = tempfile::NamedTempFile::new().unwrap();
    tokio::process::Command::new(env!("CARGO_BIN_EXE_nominatim"))
        .arg("--config")
        .arg(config.path())
        .arg("--base-url")
        .arg(server.uri())
        .arg("--no-rate-limit")
        .arg("--initial-delay-ms")
        .arg("1")
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .await
        .unwrap()
}

#[tokio::test]
async fn reverse_prints_the_response_body() {
    let server = MockServer::start().await;

    Mock::given(path("/reverse"))
        .and(query_param("lat", "-33.8568"))
        .and(query_param("lon", "151.2153"))
        .and(query_param("addressdetails", "1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"place_id": 42, "display_name": "Sydney"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let output = run(&server, &["reverse", "-33.8568", "151.2153", "--addressdetails"]).await;

    assert!(output.status.success(), "{output:?}");
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("Sydney"));
}

#[tokio::test]
async fn pretty_flag_reindents_json() {
    let server = MockServer::start().await;

    Mock::given(path("/search"))
        .and(query_param("q", "Eiffel Tower Paris"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([{"place_id": 1}])))
        .mount(&server)
        .await;

    let output = run(&server, &["--pretty", "search", "Eiffel", "Tower", "Paris"]).await;

    assert!(output.status.success(), "{output:?}");
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("\n    \"place_id\": 1"));
}

#[tokio::test]
async fn service_error_exits_non_zero_with_message() {
    let server = MockServer::start().await;

    Mock::given(path("/lookup"))
        .respond_with(ResponseTemplate::new(400).set_body_string("bad osm_ids"))
        .expect(1)
        .mount(&server)
        .await;

    let output = run(&server, &["lookup", "R146656"]).await;

    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("error:"), "{stderr}");
    assert!(stderr.contains("400"), "{stderr}");
}

#[tokio::test]
async fn invalid_input_fails_before_any_request() {
    let server = MockServer::start().await;

    Mock::given(path("/reverse"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let output = run(&server, &["reverse", "95", "0"]).await;

    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("latitude"), "{stderr}");
}

#[tokio::test]
async fn transient_failures_are_retried_by_the_binary() {
    let server = MockServer::start().await;

    Mock::given(path("/status"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;

    let output = run(&server, &["status"]).await;

    assert!(!output.status.success());
}
