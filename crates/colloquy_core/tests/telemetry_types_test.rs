use colloquy_core::{
    GenerationStart, ObservationId, ObservationKind, ObservationStatus, ObservationUpdate,
    SpanStart, TokenUsage, TraceCorrelation,
};
use serde_json::json;
use std::str::FromStr;

#[test]
fn span_start_carries_correlation_and_parent() {
    let correlation = TraceCorrelation::builder()
        .session_id("alice_s1_20250101_120000")
        .user_id("alice")
        .build()
        .expect("build correlation");

    let start = SpanStart::builder()
        .name("conversation_session_alice_s1_20250101_120000")
        .input(json!({"user_id": "alice"}))
        .parent(ObservationId::new("root"))
        .correlation(correlation)
        .build()
        .expect("build span start");

    assert_eq!(start.parent().as_ref().map(ObservationId::as_str), Some("root"));
    assert_eq!(start.correlation().user_id().as_deref(), Some("alice"));
}

#[test]
fn generation_start_requires_model() {
    let result = GenerationStart::builder().name("chat_turn_1").build();
    assert!(result.is_err());
}

#[test]
fn update_with_usage_keeps_counts() {
    let update = ObservationUpdate::with_usage(json!("Reply"), TokenUsage::new(3, 4, 7));
    assert_eq!(update.output(), &json!("Reply"));
    assert_eq!(update.usage().map(|u| *u.total_tokens()), Some(7));

    let plain = ObservationUpdate::new(json!({"done": true}));
    assert!(plain.usage().is_none());
}

#[test]
fn kind_and_status_render_lowercase() {
    assert_eq!(ObservationKind::Generation.to_string(), "generation");
    assert_eq!(
        ObservationKind::from_str("span").expect("parse kind"),
        ObservationKind::Span
    );
    assert_eq!(ObservationStatus::Completed.to_string(), "completed");
    assert_eq!(
        ObservationStatus::Failed("timeout".to_string()).to_string(),
        "failed: timeout"
    );
}
