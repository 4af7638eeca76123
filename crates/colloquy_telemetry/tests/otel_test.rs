use colloquy_core::{
    GenerationStart, ObservationStatus, ObservationUpdate, SpanStart, TokenUsage, TraceCorrelation,
};
use colloquy_interface::TelemetryBackend;
use colloquy_telemetry::OtelTelemetry;
use opentelemetry::trace::{SpanId, Status};
use opentelemetry_sdk::trace::{InMemorySpanExporter, SdkTracerProvider};
use serde_json::json;

fn backend() -> (OtelTelemetry, InMemorySpanExporter) {
    let exporter = InMemorySpanExporter::default();
    let provider = SdkTracerProvider::builder()
        .with_simple_exporter(exporter.clone())
        .build();
    (OtelTelemetry::with_provider(provider, "colloquy-test"), exporter)
}

#[tokio::test]
async fn generations_nest_under_session_span() {
    let (telemetry, exporter) = backend();

    let session = telemetry
        .start_span(
            &SpanStart::builder()
                .name("conversation_session_bob_s1")
                .correlation(
                    TraceCorrelation::builder()
                        .session_id("bob_s1")
                        .user_id("bob")
                        .build()
                        .expect("build correlation"),
                )
                .build()
                .expect("build span"),
        )
        .expect("start span");
    let turn = telemetry
        .start_generation(
            &GenerationStart::builder()
                .name("chat_turn_1")
                .model("gpt-3.5-turbo")
                .model_parameters(json!({"temperature": 0.75, "max_tokens": 150}))
                .parent(session.clone())
                .build()
                .expect("build generation"),
        )
        .expect("start generation");

    telemetry
        .update(
            &turn,
            &ObservationUpdate::with_usage(json!("Hi there"), TokenUsage::new(4, 2, 6)),
        )
        .expect("update generation");
    telemetry
        .end(&turn, &ObservationStatus::Failed("boom".to_string()))
        .expect("end generation");
    telemetry
        .end(&session, &ObservationStatus::Completed)
        .expect("end span");
    telemetry.flush().await.expect("flush");

    let spans = exporter.get_finished_spans().expect("finished spans");
    assert_eq!(spans.len(), 2);

    let generation = spans
        .iter()
        .find(|s| s.name == "chat_turn_1")
        .expect("generation span");
    let root = spans
        .iter()
        .find(|s| s.name == "conversation_session_bob_s1")
        .expect("session span");

    assert_eq!(root.parent_span_id, SpanId::INVALID);
    assert_eq!(generation.parent_span_id, root.span_context.span_id());
    assert_eq!(
        generation.span_context.trace_id(),
        root.span_context.trace_id()
    );
    assert!(matches!(generation.status, Status::Error { .. }));
    assert!(
        generation
            .attributes
            .iter()
            .any(|kv| kv.key.as_str() == "gen_ai.usage.total_tokens")
    );
    assert!(
        root.attributes
            .iter()
            .any(|kv| kv.key.as_str() == "session.id")
    );
}

#[test]
fn double_update_is_rejected() {
    let (telemetry, _exporter) = backend();
    let id = telemetry
        .start_span(&SpanStart::builder().name("s").build().expect("build span"))
        .expect("start span");
    telemetry
        .update(&id, &ObservationUpdate::new(json!(1)))
        .expect("first update");
    assert!(
        telemetry
            .update(&id, &ObservationUpdate::new(json!(2)))
            .is_err()
    );
}
