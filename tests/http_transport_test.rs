//! Wiremock integration tests for [`HttpTransport`].
//!
//! Covers request construction (path, query, `User-Agent`), status
//! classification, and the full pipeline over real HTTP.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use nominatim_cli::{
    CacheConfig, CommonOptions, GeocodeError, HttpTransport, PipelineConfig, RateLimitConfig,
    RequestDescriptor, RequestPipeline, Response, Result, RetryConfig, ReverseQuery, Transport,
};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const USER_AGENT: &str = "nominatim-cli-tests/1.0";

fn sample_place() -> serde_json::Value {
    serde_json::json!({
        "place_id": 123,
        "osm_type": "way",
        "osm_id": 5013364,
        "lat": "48.8582599",
        "lon": "2.2945006",
        "display_name": "Tour Eiffel, Avenue Gustave Eiffel, Paris, France"
    })
}

fn transport(server: &MockServer) -> HttpTransport {
    HttpTransport::new(server.uri(), USER_AGENT).expect("client builds")
}

// ============================================================================
// Request construction
// ============================================================================

#[tokio::test]
async fn sends_path_query_and_user_agent() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/reverse"))
        .and(query_param("lat", "48.85"))
        .and(query_param("lon", "2.29"))
        .and(query_param("format", "jsonv2"))
        .and(header("user-agent", USER_AGENT))
        .respond_with(ResponseTemplate::new(200).set_body_json(sample_place()))
        .expect(1)
        .mount(&server)
        .await;

    let request = ReverseQuery::new(48.85, 2.29)
        .to_descriptor(&CommonOptions::default())
        .unwrap();
    let response = transport(&server).send(&request).await.unwrap();

    assert_eq!(response.status, 200);
    assert!(response.is_json());
    let place: serde_json::Value = response.json().unwrap();
    assert_eq!(place["place_id"], 123);
}

#[tokio::test]
async fn trailing_slash_in_base_url_is_ignored() {
    let server = MockServer::start().await;

    Mock::given(path("/status"))
        .respond_with(ResponseTemplate::new(200).set_body_string("OK"))
        .expect(1)
        .mount(&server)
        .await;

    let transport = HttpTransport::new(format!("{}/", server.uri()), USER_AGENT).unwrap();

    let response = transport
        .send(&RequestDescriptor::get("/status"))
        .await
        .unwrap();
    assert_eq!(response.body, "OK");
}

#[tokio::test]
async fn non_json_body_is_passed_through() {
    let server = MockServer::start().await;

    let xml = r#"<reversegeocode><result place_id="123">Paris</result></reversegeocode>"#;
    Mock::given(path("/reverse"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(xml, "text/xml; charset=utf-8"))
        .mount(&server)
        .await;

    let response = transport(&server)
        .send(&RequestDescriptor::get("/reverse").param("format", "xml"))
        .await
        .unwrap();

    assert!(!response.is_json());
    assert_eq!(response.body, xml);
    assert_eq!(response.pretty_body().unwrap(), xml);
}

// ============================================================================
// Status classification
// ============================================================================

#[tokio::test]
async fn too_many_requests_maps_to_rate_limited() {
    let server = MockServer::start().await;

    Mock::given(path("/search"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "7"))
        .mount(&server)
        .await;

    let err = transport(&server)
        .send(&RequestDescriptor::get("/search").param("q", "x"))
        .await
        .unwrap_err();

    assert!(matches!(err, GeocodeError::RateLimited { .. }));
    assert_eq!(err.retry_after(), Some(Duration::from_secs(7)));
    assert!(err.is_transient());
}

#[tokio::test]
async fn server_error_is_transient() {
    let server = MockServer::start().await;

    Mock::given(path("/search"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let err = transport(&server)
        .send(&RequestDescriptor::get("/search"))
        .await
        .unwrap_err();

    assert_eq!(err.status_code(), Some(503));
    assert!(err.is_transient());
    assert!(err.to_string().contains("maintenance"));
}

#[tokio::test]
async fn client_error_is_terminal() {
    let server = MockServer::start().await;

    Mock::given(path("/reverse"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": {"code": 400, "message": "Parameter 'lat' must be a number."}
            })),
        )
        .mount(&server)
        .await;

    let err = transport(&server)
        .send(&RequestDescriptor::get("/reverse").param("lat", "abc"))
        .await
        .unwrap_err();

    assert_eq!(err.status_code(), Some(400));
    assert!(!err.is_transient());
    assert!(err.to_string().contains("must be a number"));
}

#[tokio::test]
async fn long_error_bodies_are_truncated() {
    let server = MockServer::start().await;

    Mock::given(path("/lookup"))
        .respond_with(ResponseTemplate::new(404).set_body_string("x".repeat(5_000)))
        .mount(&server)
        .await;

    let err = transport(&server)
        .send(&RequestDescriptor::get("/lookup"))
        .await
        .unwrap_err();

    assert!(err.to_string().len() < 300);
}

#[tokio::test]
async fn unreachable_server_is_a_transient_http_error() {
    // Bind then release a port so nothing is listening on it.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let transport = HttpTransport::new(format!("http://{addr}"), USER_AGENT).unwrap();
    let err = transport
        .send(&RequestDescriptor::get("/status"))
        .await
        .unwrap_err();

    assert!(matches!(err, GeocodeError::Http(_)), "{err:?}");
    assert!(err.is_transient());
}

#[test]
fn malformed_base_url_is_rejected_at_construction() {
    for base_url in ["not a url", "ftp://nominatim.example.org", ""] {
        let err = HttpTransport::new(base_url, USER_AGENT)
            .err()
            .unwrap_or_else(|| panic!("{base_url:?} should be rejected"));

        assert!(matches!(err, GeocodeError::Configuration(_)), "{err:?}");
        assert!(!err.is_transient());
        assert!(err.to_string().contains("base URL"), "{err}");
    }
}

#[tokio::test]
async fn slow_response_maps_to_timeout() {
    let server = MockServer::start().await;

    Mock::given(path("/status"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
        .mount(&server)
        .await;

    let transport =
        HttpTransport::with_timeout(server.uri(), USER_AGENT, Duration::from_millis(50)).unwrap();
    let err = transport
        .send(&RequestDescriptor::get("/status"))
        .await
        .unwrap_err();

    assert!(matches!(err, GeocodeError::Timeout), "{err:?}");
}

// ============================================================================
// Pipeline over HTTP
// ============================================================================

fn fast_pipeline(server: &MockServer) -> RequestPipeline {
    let config = PipelineConfig::new()
        .cache(CacheConfig::new().ttl(Duration::from_secs(60)))
        .rate_limit(RateLimitConfig::disabled())
        .retry(
            RetryConfig::new()
                .max_attempts(3)
                .initial_delay(Duration::from_millis(5)),
        );
    RequestPipeline::new(config, Arc::new(transport(server))).unwrap()
}

#[tokio::test]
async fn pipeline_retries_server_errors_up_to_max_attempts() {
    let server = MockServer::start().await;

    Mock::given(path("/search"))
        .respond_with(ResponseTemplate::new(502))
        .expect(3)
        .mount(&server)
        .await;

    let err = fast_pipeline(&server)
        .execute(&RequestDescriptor::get("/search").param("q", "Berlin"))
        .await
        .unwrap_err();

    assert_eq!(err.status_code(), Some(502));
}

#[tokio::test]
async fn pipeline_does_not_retry_client_errors() {
    let server = MockServer::start().await;

    Mock::given(path("/lookup"))
        .respond_with(ResponseTemplate::new(400))
        .expect(1)
        .mount(&server)
        .await;

    let result = fast_pipeline(&server)
        .execute(&RequestDescriptor::get("/lookup").param("osm_ids", "X1"))
        .await;

    assert!(result.is_err());
}

#[tokio::test]
async fn pipeline_recovers_after_transient_failure_and_caches() {
    let server = MockServer::start().await;

    Mock::given(path("/reverse"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(path("/reverse"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sample_place()))
        .expect(1)
        .mount(&server)
        .await;

    let pipeline = fast_pipeline(&server);
    let request = RequestDescriptor::get("/reverse")
        .param("lat", "48.85")
        .param("lon", "2.29");

    let first = pipeline.execute(&request).await.unwrap();
    let second = pipeline.execute(&request).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(pipeline.cache().len(), 1);
}

/// Sends through a bare reqwest client to a URL it cannot build.
struct UnbuildableTransport {
    http: reqwest::Client,
    calls: AtomicU32,
}

#[async_trait]
impl Transport for UnbuildableTransport {
    fn name(&self) -> &str {
        "unbuildable"
    }

    async fn send(&self, request: &RequestDescriptor) -> Result<Response> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let url = format!("not a url{}", request.path());
        let response = self.http.get(url).send().await?;
        Ok(Response::ok(response.text().await?, None))
    }
}

#[tokio::test(start_paused = true)]
async fn pipeline_does_not_retry_unbuildable_requests() {
    let transport = Arc::new(UnbuildableTransport {
        http: reqwest::Client::new(),
        calls: AtomicU32::new(0),
    });
    let config = PipelineConfig::new()
        .rate_limit(RateLimitConfig::disabled())
        .retry(
            RetryConfig::new()
                .max_attempts(3)
                .initial_delay(Duration::from_millis(200)),
        );
    let pipeline = RequestPipeline::new(config, transport.clone()).unwrap();

    let start = tokio::time::Instant::now();
    let err = pipeline
        .execute(&RequestDescriptor::get("/status"))
        .await
        .unwrap_err();

    assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
    assert_eq!(start.elapsed(), Duration::ZERO);
    assert!(matches!(err, GeocodeError::Configuration(_)), "{err:?}");
    assert!(!err.is_transient());
    // The reqwest source is kept, not just "builder error".
    assert!(err.to_string().contains("builder error: "), "{err}");
}
