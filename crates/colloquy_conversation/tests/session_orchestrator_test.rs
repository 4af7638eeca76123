mod test_utils;

use colloquy_conversation::{
    SessionDescriptor, SessionOrchestrator, SessionState, TurnOutcome,
};
use colloquy_core::{Message, ObservationStatus, Role};
use colloquy_error::OpenAIErrorKind;
use colloquy_telemetry::InMemoryTelemetry;
use serde_json::json;
use test_utils::{MockDriver, MockResponse, fast_settings};

fn descriptor(prompts: &[&str]) -> SessionDescriptor {
    SessionDescriptor::builder()
        .user_id("alice")
        .session_id("alice_s1_20250101_120000")
        .prompts(prompts.iter().map(|p| p.to_string()).collect::<Vec<_>>())
        .model("gpt-3.5-turbo")
        .build()
        .expect("build descriptor")
}

fn pairs(messages: &[Message]) -> Vec<(Role, String)> {
    messages
        .iter()
        .map(|m| (*m.role(), m.content().clone()))
        .collect()
}

#[tokio::test]
async fn two_turns_build_history_in_order() {
    let driver = MockDriver::replies(["Reply-1", "Reply-2"]);
    let telemetry = InMemoryTelemetry::new();
    let settings = fast_settings();
    let orchestrator = SessionOrchestrator::new(&driver, &telemetry, &settings);

    let report = orchestrator
        .run_session(&descriptor(&["Hi", "Follow-up"]))
        .await;

    assert_eq!(report.state(), &SessionState::Completed);
    assert_eq!(
        pairs(report.history().messages()),
        vec![
            (Role::User, "Hi".to_string()),
            (Role::Assistant, "Reply-1".to_string()),
            (Role::User, "Follow-up".to_string()),
            (Role::Assistant, "Reply-2".to_string()),
        ]
    );

    // Turn 2 sees turn 1's exchange as context
    let second = &driver.requests()[1];
    assert_eq!(second.messages().len(), 4);
}

#[tokio::test]
async fn failed_turn_is_skipped_and_excluded_from_context() {
    let driver = MockDriver::scripted([
        MockResponse::Reply("R_A".to_string()),
        MockResponse::Error(OpenAIErrorKind::RateLimit("slow down".to_string())),
        MockResponse::Reply("R_C".to_string()),
    ]);
    let telemetry = InMemoryTelemetry::new();
    let settings = fast_settings();
    let orchestrator = SessionOrchestrator::new(&driver, &telemetry, &settings);

    let report = orchestrator.run_session(&descriptor(&["A", "B", "C"])).await;

    assert_eq!(
        pairs(report.history().messages()),
        vec![
            (Role::User, "A".to_string()),
            (Role::Assistant, "R_A".to_string()),
            (Role::User, "C".to_string()),
            (Role::Assistant, "R_C".to_string()),
        ]
    );

    let numbers: Vec<usize> = report.turns().iter().map(|t| *t.turn_number()).collect();
    assert_eq!(numbers, vec![1, 2, 3]);
    assert!(matches!(report.turns()[1].outcome(), TurnOutcome::Failed { .. }));

    // Turn C's context: system + (A, R_A) + C
    let third = &driver.requests()[2];
    assert_eq!(
        pairs(third.messages())[1..],
        [
            (Role::User, "A".to_string()),
            (Role::Assistant, "R_A".to_string()),
            (Role::User, "C".to_string()),
        ]
    );

    let names: Vec<String> = telemetry
        .generations()
        .iter()
        .map(|g| g.name().clone())
        .collect();
    assert_eq!(names, vec!["chat_turn_1", "chat_turn_2", "chat_turn_3"]);
}

#[tokio::test]
async fn all_turns_failing_still_completes() {
    let driver = MockDriver::failing(3);
    let telemetry = InMemoryTelemetry::new();
    let settings = fast_settings();
    let orchestrator = SessionOrchestrator::new(&driver, &telemetry, &settings);

    let report = orchestrator.run_session(&descriptor(&["A", "B", "C"])).await;

    assert_eq!(report.state(), &SessionState::Completed);
    assert!(report.history().is_empty());
    assert_eq!(report.failed_turns(), 3);

    let span = &telemetry.spans()[0];
    let update = span.update().as_ref().expect("session span updated");
    assert_eq!(
        update.output(),
        &json!({
            "total_turns": 3,
            "conversation_completed": true,
            "final_context_length": 0,
        })
    );
    assert_eq!(span.status(), &Some(ObservationStatus::Completed));
    assert_eq!(telemetry.open_count(), 0);
}

#[tokio::test]
async fn history_length_is_twice_successful_turns() {
    let driver = MockDriver::scripted([
        MockResponse::Error(OpenAIErrorKind::Http("reset".to_string())),
        MockResponse::Reply("ok".to_string()),
        MockResponse::Reply("ok".to_string()),
        MockResponse::Error(OpenAIErrorKind::Unauthorized("bad key".to_string())),
    ]);
    let telemetry = InMemoryTelemetry::new();
    let settings = fast_settings();
    let orchestrator = SessionOrchestrator::new(&driver, &telemetry, &settings);

    let report = orchestrator
        .run_session(&descriptor(&["1", "2", "3", "4"]))
        .await;

    assert_eq!(report.successful_turns(), 2);
    assert_eq!(report.history().len(), 2 * report.successful_turns());
}

#[tokio::test]
async fn session_span_carries_identity_and_nests_generations() {
    let driver = MockDriver::echo();
    let telemetry = InMemoryTelemetry::new();
    let settings = fast_settings();
    let orchestrator = SessionOrchestrator::new(&driver, &telemetry, &settings);

    orchestrator.run_session(&descriptor(&["Hi", "Bye"])).await;

    let spans = telemetry.spans();
    assert_eq!(spans.len(), 1);
    let span = &spans[0];
    assert_eq!(span.name(), "conversation_session_alice_s1_20250101_120000");
    assert_eq!(
        span.input(),
        &json!({"user_id": "alice", "session_id": "alice_s1_20250101_120000"})
    );
    assert_eq!(span.metadata()["turn_number"], 0);
    assert_eq!(span.metadata()["total_turns"], 2);

    let correlation = span.correlation().as_ref().expect("root span correlation");
    assert_eq!(correlation.user_id().as_deref(), Some("alice"));
    assert_eq!(
        correlation.session_id().as_deref(),
        Some("alice_s1_20250101_120000")
    );

    assert_eq!(telemetry.children_of(span.id()).len(), 2);
}

#[tokio::test]
async fn temperature_rises_with_turn_number() {
    let driver = MockDriver::echo();
    let telemetry = InMemoryTelemetry::new();
    let settings = fast_settings();
    let orchestrator = SessionOrchestrator::new(&driver, &telemetry, &settings);

    let report = orchestrator
        .run_session(&descriptor(&["1", "2", "3", "4", "5"]))
        .await;

    let temperatures: Vec<f64> = report.turns().iter().map(|t| *t.temperature()).collect();
    assert!(temperatures.windows(2).all(|w| w[0] <= w[1]));
    assert!((temperatures[0] - 0.75).abs() < 1e-9);

    let sent: Vec<f32> = driver
        .requests()
        .iter()
        .filter_map(|r| *r.temperature())
        .collect();
    assert_eq!(sent.len(), 5);
    assert!(sent.windows(2).all(|w| w[0] <= w[1]));
}

#[tokio::test(start_paused = true)]
async fn pacing_delay_follows_every_turn() {
    let driver = MockDriver::failing(2);
    let telemetry = InMemoryTelemetry::new();
    let settings = colloquy_conversation::ConversationSettings::builder()
        .turn_delay(std::time::Duration::from_secs(1))
        .build()
        .expect("build settings");
    let orchestrator = SessionOrchestrator::new(&driver, &telemetry, &settings);

    let started = tokio::time::Instant::now();
    orchestrator.run_session(&descriptor(&["A", "B"])).await;

    assert!(started.elapsed() >= std::time::Duration::from_secs(2));
}
