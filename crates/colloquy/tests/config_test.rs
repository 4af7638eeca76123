use colloquy::{ColloquyConfig, ColloquyErrorKind, TelemetryBackendKind};
use std::io::Write;
use std::time::Duration;

fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .expect("create temp file");
    file.write_all(contents.as_bytes()).expect("write config");
    file
}

#[test]
fn bundled_defaults_match_documented_values() {
    let config = ColloquyConfig::bundled().expect("bundled config");

    assert_eq!(config.conversation.model, "gpt-3.5-turbo");
    assert_eq!(config.conversation.max_tokens, 150);
    assert_eq!(config.completion.api_key_env, "OPENAI_API_KEY");
    assert_eq!(config.telemetry.backend, TelemetryBackendKind::Langfuse);
    assert!(config.scenarios.path.is_none());

    let settings = config.conversation.to_settings().expect("settings");
    assert_eq!(*settings.turn_delay(), Duration::from_millis(1000));
    assert_eq!(*settings.session_delay(), Duration::from_millis(2000));
    assert!((settings.temperature_for_turn(1) - 0.75).abs() < 1e-9);
}

#[test]
fn file_overrides_only_what_it_names() {
    let file = write_config(
        r#"
[conversation]
model = "gpt-4o-mini"
turn_delay_ms = 0

[telemetry]
backend = "memory"

[scenarios]
path = "my_scenarios.toml"
"#,
    );

    let config = ColloquyConfig::from_file(file.path()).expect("load config");

    assert_eq!(config.conversation.model, "gpt-4o-mini");
    assert_eq!(config.conversation.turn_delay_ms, 0);
    assert_eq!(config.conversation.session_delay_ms, 2000);
    assert_eq!(config.telemetry.backend, TelemetryBackendKind::Memory);
    assert_eq!(
        config.scenarios.path.as_deref(),
        Some(std::path::Path::new("my_scenarios.toml"))
    );
}

#[test]
fn unknown_backend_is_a_config_error() {
    let file = write_config("[telemetry]\nbackend = \"carrier-pigeon\"\n");
    let err = ColloquyConfig::from_file(file.path()).unwrap_err();
    assert!(matches!(err.kind(), ColloquyErrorKind::Config(_)));
}

#[test]
fn missing_file_is_a_config_error() {
    let err = ColloquyConfig::from_file("/nonexistent/colloquy.toml").unwrap_err();
    assert!(matches!(err.kind(), ColloquyErrorKind::Config(_)));
}

#[test]
fn invalid_conversation_values_are_rejected() {
    let file = write_config("[conversation]\nmax_tokens = 0\n");
    let config = ColloquyConfig::from_file(file.path()).expect("load config");
    let err = config.conversation.to_settings().unwrap_err();
    assert!(matches!(err.kind(), ColloquyErrorKind::Config(_)));
}
