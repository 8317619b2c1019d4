//! Tests for TOML configuration loading.

#![cfg(feature = "cli")]

use std::io::Write;
use std::time::Duration;

use nominatim_cli::config::Config;
use nominatim_cli::{GeocodeError, OutputFormat, PipelineConfig, RequestPipeline};

fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn full_config_file_round_trips_into_pipeline_config() {
    let file = write_config(
        r#"
        [service]
        base_url = "http://localhost:8088/"
        user_agent = "my-geocoder/2.0"
        email = "ops@example.org"
        accept_language = "de,en"
        format = "geojson"
        timeout_secs = 5

        [cache]
        enabled = true
        ttl_ms = 60000
        max_entries = 10

        [rate_limit]
        limit = 5
        interval_ms = 2000

        [retry]
        max_attempts = 4
        initial_delay_ms = 250
        "#,
    );

    let config = Config::load(Some(file.path())).unwrap();

    assert_eq!(config.service.base_url, "http://localhost:8088/");
    assert_eq!(config.service.user_agent.as_deref(), Some("my-geocoder/2.0"));
    assert_eq!(config.service.email.as_deref(), Some("ops@example.org"));
    assert_eq!(config.service.accept_language.as_deref(), Some("de,en"));
    assert_eq!(config.service.format, OutputFormat::Geojson);
    assert_eq!(config.service.timeout_secs, 5);

    let pipeline = config.pipeline_config();
    assert_eq!(pipeline.cache.ttl, Duration::from_secs(60));
    assert_eq!(pipeline.cache.max_entries, 10);
    assert_eq!(pipeline.rate_limit.limit, 5);
    assert_eq!(pipeline.rate_limit.interval, Duration::from_secs(2));
    assert!(pipeline.rate_limit.enabled);
    assert_eq!(pipeline.retry.max_attempts, 4);
    assert_eq!(pipeline.retry.initial_delay, Duration::from_millis(250));
}

#[test]
fn empty_file_yields_defaults() {
    let file = write_config("");
    let config = Config::load(Some(file.path())).unwrap();

    assert_eq!(config, Config::default());
    assert_eq!(config.pipeline_config(), PipelineConfig::default());
}

#[test]
fn sections_can_disable_components() {
    let file = write_config(
        r#"
        [cache]
        enabled = false

        [rate_limit]
        enabled = false

        [retry]
        enabled = false
        "#,
    );

    let pipeline = Config::load(Some(file.path())).unwrap().pipeline_config();
    assert!(!pipeline.cache.enabled);
    assert!(!pipeline.rate_limit.enabled);
    assert_eq!(pipeline.retry.effective_attempts(), 1);
}

#[test]
fn malformed_toml_is_a_configuration_error() {
    let file = write_config("[service\nbase_url = 1");
    let err = Config::load(Some(file.path())).unwrap_err();

    assert!(matches!(err, GeocodeError::Configuration(_)));
    assert!(err.to_string().contains("Failed to parse"));
}

#[test]
fn zero_timeout_is_rejected() {
    let file = write_config("[service]\ntimeout_secs = 0\n");
    let err = Config::load(Some(file.path())).unwrap_err();

    assert!(matches!(err, GeocodeError::Configuration(_)));
    assert!(err.to_string().contains("timeout_secs"), "{err}");
}

#[test]
fn unknown_format_is_rejected() {
    let file = write_config("[service]\nformat = \"yaml\"\n");
    assert!(Config::load(Some(file.path())).is_err());
}

#[test]
fn unusable_values_are_caught_when_building_the_pipeline() {
    let file = write_config("[rate_limit]\nlimit = 0\n");
    let pipeline_config = Config::load(Some(file.path())).unwrap().pipeline_config();

    let transport = std::sync::Arc::new(
        nominatim_cli::HttpTransport::new("http://localhost", "test").unwrap(),
    );
    let err = RequestPipeline::new(pipeline_config, transport).err().unwrap();
    assert!(err.to_string().contains("rate_limit"));
}

#[test]
fn missing_explicit_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.toml");

    let err = Config::load(Some(&missing)).unwrap_err();
    assert!(matches!(err, GeocodeError::Configuration(_)));
}
