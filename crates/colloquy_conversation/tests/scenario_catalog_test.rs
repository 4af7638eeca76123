use colloquy_conversation::ScenarioCatalog;
use colloquy_error::ScenarioErrorKind;
use std::io::Write;

fn parse_err(toml: &str) -> ScenarioErrorKind {
    toml.parse::<ScenarioCatalog>().unwrap_err().kind
}

#[test]
fn builtin_catalog_matches_bundled_scripts() {
    let catalog = ScenarioCatalog::builtin().expect("builtin catalog");
    assert_eq!(catalog.users().len(), 3);
    assert_eq!(catalog.session_count(), 4);

    let (user, first) = catalog.entries().next().expect("first session");
    assert_eq!(user, "nishant_tomar");
    assert_eq!(
        first.prompts()[0],
        "Hi! Can you explain what machine learning is?"
    );
}

#[test]
fn empty_catalog_has_no_users() {
    assert_eq!(parse_err(""), ScenarioErrorKind::NoUsers);
}

#[test]
fn user_without_sessions_is_rejected() {
    assert_eq!(
        parse_err("[[users]]\nid = \"alice\"\n"),
        ScenarioErrorKind::NoSessions("alice".to_string())
    );
}

#[test]
fn blank_ids_and_labels_are_rejected() {
    assert_eq!(
        parse_err("[[users]]\nid = \" \"\n[[users.sessions]]\nlabel = \"s\"\nprompts = [\"x\"]\n"),
        ScenarioErrorKind::EmptyUserId(1)
    );
    assert_eq!(
        parse_err("[[users]]\nid = \"a\"\n[[users.sessions]]\nlabel = \"\"\nprompts = [\"x\"]\n"),
        ScenarioErrorKind::EmptySessionLabel("a".to_string())
    );
}

#[test]
fn blank_prompt_reports_position() {
    assert_eq!(
        parse_err(
            "[[users]]\nid = \"a\"\n[[users.sessions]]\nlabel = \"s\"\nprompts = [\"x\", \"  \"]\n"
        ),
        ScenarioErrorKind::BlankPrompt {
            user: "a".to_string(),
            session: "s".to_string(),
            index: 2,
        }
    );
}

#[test]
fn loads_catalog_from_file() {
    let mut file = tempfile::NamedTempFile::new().expect("create temp file");
    write!(
        file,
        "[[users]]\nid = \"dana\"\n[[users.sessions]]\nlabel = \"intro\"\nprompts = [\"Hello\"]\n"
    )
    .expect("write catalog");

    let catalog = ScenarioCatalog::from_file(file.path()).expect("load catalog");
    assert_eq!(catalog.total_turns(), 1);
}

#[test]
fn missing_file_is_read_error() {
    let err = ScenarioCatalog::from_file("/nonexistent/scenarios.toml").unwrap_err();
    assert!(matches!(err.kind, ScenarioErrorKind::FileRead(_)));
}
