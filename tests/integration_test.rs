// Integration tests for Kramer
//
// A local `bash` stands in for the remote-exec program: `bash -s <name> bash -s`
// reads the exported preamble and script from stdin exactly as the sprite would.

use std::time::Duration;

use kramer::artifact;
use kramer::cli::{PipedInput, Session, SessionOptions};
use kramer::clipboard::{ClipboardError, ClipboardSink};
use kramer::render;
use kramer::turn::{
    NoProgress, ParsedResponse, RemoteTarget, ThinkingLevel, TurnExecutor, TurnMode, TurnOutput,
    TurnRequest,
};

const FAKE_AGENT: &str = r#"MSG="$(printf '%s' "$MSG_B64" | base64 -d)"
printf '{"payloads":[{"text":"Sure!\\n\\n## PRD: %s\\n**Goal**: ship it\\n\\nWould you like more?"}],"meta":{"durationMs":1000}}' "$MSG""#;

fn local_executor() -> TurnExecutor {
    TurnExecutor::new(RemoteTarget::new("bash", "test-sprite"))
        .with_script(FAKE_AGENT)
        .with_poll_interval(Duration::from_millis(20))
}

#[derive(Default)]
struct RecordingClipboard {
    copied: Vec<String>,
}

impl ClipboardSink for RecordingClipboard {
    fn copy(&mut self, text: &str) -> Result<String, ClipboardError> {
        self.copied.push(text.to_string());
        Ok("recording".to_string())
    }
}

#[tokio::test]
async fn test_turn_pipeline_end_to_end() {
    let executor = local_executor();
    let request = TurnRequest::new("Billing", "tui", ThinkingLevel::Low, 60);

    let output = executor
        .execute(&request, TurnMode::Capture, &mut NoProgress)
        .await
        .expect("local bash should start");

    let result = match output {
        TurnOutput::Captured(result) => result,
        other => panic!("expected captured output, got {:?}", other),
    };
    assert_eq!(result.exit_code, 0);

    let parsed = ParsedResponse::classify(&result);
    assert!(parsed.is_structured);
    assert!(parsed.display_text.contains("## PRD: Billing"));
    assert_eq!(parsed.meta().and_then(|m| m.duration_ms()), Some(1000.0));

    let lines = render::render(&parsed.display_text);
    assert!(lines.iter().all(|l| l.starts_with(render::BORDER)));
    assert!(lines.iter().any(|l| l.contains("PRD: Billing")));
    assert!(lines.iter().all(|l| !l.contains("**")));

    assert_eq!(
        artifact::extract(&parsed.raw_text),
        "## PRD: Billing\n**Goal**: ship it"
    );
}

#[tokio::test]
async fn test_session_with_real_child_process() {
    let options = SessionOptions {
        session_id: "tui".to_string(),
        thinking: ThinkingLevel::Medium,
        timeout_secs: 60,
        debug: false,
        passthru: false,
    };
    let mut session = Session::new(
        local_executor(),
        RecordingClipboard::default(),
        Vec::new(),
        Box::new(NoProgress),
        options,
    );

    let mut input = PipedInput::new("Onboarding\n/copy-md\n/copy\n/quit\n".as_bytes());
    let code = session.run(&mut input).await.unwrap();

    assert_eq!(code, 0);
    assert_eq!(
        session.state().last_raw_text(),
        session.state().last_display_text()
    );

    let transcript = String::from_utf8_lossy(session.output()).into_owned();
    assert!(transcript.contains("PRD: Onboarding"));
    assert!(transcript.contains("Copied markdown artifact to clipboard"));
    assert!(transcript.contains("Copied artifact to clipboard"));
}

#[tokio::test]
async fn test_missing_remote_exec_is_reported_not_fatal() {
    let executor = TurnExecutor::new(RemoteTarget::new(
        "kramer-test-no-such-remote-exec",
        "test-sprite",
    ));
    let request = TurnRequest::new("hi", "tui", ThinkingLevel::Off, 5);

    let err = executor
        .execute(&request, TurnMode::Capture, &mut NoProgress)
        .await
        .unwrap_err();

    assert!(err.is_spawn_failure());
    assert!(err.to_string().contains("kramer-test-no-such-remote-exec"));
}
