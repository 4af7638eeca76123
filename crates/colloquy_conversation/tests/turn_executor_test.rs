mod test_utils;

use colloquy_conversation::{DEFAULT_SYSTEM_PROMPT, TurnContext, TurnExecutor};
use colloquy_core::{
    ConversationHistory, ObservationId, ObservationStatus, Role, SpanStart,
};
use colloquy_error::{ColloquyErrorKind, ModelsErrorKind};
use colloquy_interface::TelemetryBackend;
use colloquy_telemetry::InMemoryTelemetry;
use serde_json::json;
use test_utils::{MockDriver, MockResponse, fast_settings};

fn context(turn_number: usize, prompt: &str, parent: ObservationId) -> TurnContext {
    TurnContext::builder()
        .session_id("alice_s1_20250101_120000")
        .user_id("alice")
        .turn_number(turn_number)
        .prompt(prompt)
        .model("gpt-3.5-turbo")
        .temperature(0.8)
        .max_tokens(150u32)
        .parent(parent)
        .build()
        .expect("build context")
}

fn session_span(telemetry: &InMemoryTelemetry) -> ObservationId {
    telemetry
        .start_span(&SpanStart::builder().name("session").build().expect("build span"))
        .expect("start span")
}

#[tokio::test]
async fn sends_system_history_then_prompt() {
    let driver = MockDriver::replies(["Sure."]);
    let telemetry = InMemoryTelemetry::new();
    let settings = fast_settings();
    let executor = TurnExecutor::new(&driver, &telemetry, &settings);

    let mut history = ConversationHistory::new();
    history.push_exchange("Hi", "Reply-1");
    let parent = session_span(&telemetry);

    let reply = executor
        .execute_turn(&context(2, "Follow-up", parent), &history)
        .await
        .expect("turn succeeds");
    assert_eq!(reply.text(), "Sure.");

    let request = &driver.requests()[0];
    let sent: Vec<(Role, &str)> = request
        .messages()
        .iter()
        .map(|m| (*m.role(), m.content().as_str()))
        .collect();
    assert_eq!(
        sent,
        vec![
            (Role::System, DEFAULT_SYSTEM_PROMPT),
            (Role::User, "Hi"),
            (Role::Assistant, "Reply-1"),
            (Role::User, "Follow-up"),
        ]
    );
    assert_eq!(*request.max_tokens(), Some(150));
    assert_eq!(request.model().as_deref(), Some("gpt-3.5-turbo"));
    // History is read-only to the executor
    assert_eq!(history.len(), 2);
}

#[tokio::test]
async fn generation_records_prompt_context_and_usage() {
    let driver = MockDriver::replies(["Hello"]);
    let telemetry = InMemoryTelemetry::new();
    let settings = fast_settings();
    let executor = TurnExecutor::new(&driver, &telemetry, &settings);
    let parent = session_span(&telemetry);

    executor
        .execute_turn(&context(1, "Hi", parent.clone()), &ConversationHistory::new())
        .await
        .expect("turn succeeds");

    let generations = telemetry.generations();
    assert_eq!(generations.len(), 1);
    let generation = &generations[0];
    assert_eq!(generation.name(), "chat_turn_1");
    assert_eq!(generation.parent().as_ref(), Some(&parent));
    assert_eq!(generation.input(), &json!({"prompt": "Hi", "conversation_context": 0}));
    assert_eq!(generation.metadata()["turn_number"], 1);
    assert_eq!(generation.metadata()["max_tokens"], 150);
    assert_eq!(generation.model_parameters()["max_tokens"], 150);

    let update = generation.update().as_ref().expect("generation updated");
    assert_eq!(update.output(), &json!("Hello"));
    assert_eq!(update.usage().map(|u| *u.total_tokens()), Some(15));
    assert_eq!(generation.status(), &Some(ObservationStatus::Completed));
}

#[tokio::test]
async fn failed_completion_releases_generation_with_error() {
    let driver = MockDriver::failing(1);
    let telemetry = InMemoryTelemetry::new();
    let settings = fast_settings();
    let executor = TurnExecutor::new(&driver, &telemetry, &settings);
    let parent = session_span(&telemetry);

    let result = executor
        .execute_turn(&context(1, "Hi", parent), &ConversationHistory::new())
        .await;
    assert!(matches!(result.unwrap_err().kind(), ColloquyErrorKind::Models(_)));

    let generation = &telemetry.generations()[0];
    assert!(generation.update().is_none());
    assert!(matches!(generation.status(), Some(ObservationStatus::Failed(_))));
}

#[tokio::test]
async fn empty_reply_is_a_failure() {
    let driver = MockDriver::scripted([MockResponse::Reply("   ".to_string())]);
    let telemetry = InMemoryTelemetry::new();
    let settings = fast_settings();
    let executor = TurnExecutor::new(&driver, &telemetry, &settings);
    let parent = session_span(&telemetry);

    let err = executor
        .execute_turn(&context(1, "Hi", parent), &ConversationHistory::new())
        .await
        .unwrap_err();
    match err.kind() {
        ColloquyErrorKind::Models(e) => assert!(matches!(e.kind, ModelsErrorKind::EmptyReply(_))),
        other => panic!("unexpected error kind: {other}"),
    }
    assert!(telemetry.generations()[0].update().is_none());
}
