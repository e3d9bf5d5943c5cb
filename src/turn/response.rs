// Response classification
// Decides whether the agent replied with the JSON envelope or plain text

use serde_json::{Map, Value};
use tracing::debug;

use super::types::TurnResult;

/// Display-ready view of one turn's stdout
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedResponse {
    /// What gets rendered in the transcript
    pub display_text: String,
    /// Markdown-preserving copy, used by `/copy-md`
    pub raw_text: String,
    /// `meta` object of the JSON envelope, when there was one
    pub metadata: Option<Map<String, Value>>,
    pub is_structured: bool,
}

impl ParsedResponse {
    pub fn classify(result: &TurnResult) -> Self {
        Self::from_stdout(&result.stdout)
    }

    pub fn from_stdout(stdout: &str) -> Self {
        let trimmed = stdout.trim();
        if trimmed.is_empty() {
            return Self::plain(String::new());
        }

        match serde_json::from_str::<Value>(trimmed) {
            Ok(document) => match payload_text(&document) {
                Some(text) => {
                    let metadata = document.get("meta").and_then(Value::as_object).cloned();
                    Self {
                        display_text: text.to_string(),
                        raw_text: text.to_string(),
                        metadata,
                        is_structured: true,
                    }
                }
                None => {
                    debug!("JSON reply has no payloads[0].text, showing it as plain text");
                    Self::plain(trimmed.to_string())
                }
            },
            Err(_) => Self::plain(trimmed.to_string()),
        }
    }

    fn plain(text: String) -> Self {
        Self {
            display_text: text.clone(),
            raw_text: text,
            metadata: None,
            is_structured: false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.display_text.is_empty()
    }

    pub fn meta(&self) -> Option<ResponseMeta<'_>> {
        self.metadata.as_ref().map(ResponseMeta)
    }
}

fn payload_text(document: &Value) -> Option<&str> {
    document
        .get("payloads")?
        .as_array()?
        .first()?
        .get("text")?
        .as_str()
}

/// Loosely shaped debug metadata; every accessor is best effort
#[derive(Debug, Clone, Copy)]
pub struct ResponseMeta<'a>(&'a Map<String, Value>);

impl<'a> ResponseMeta<'a> {
    pub fn new(meta: &'a Map<String, Value>) -> Self {
        Self(meta)
    }

    pub fn model(&self) -> Option<&'a str> {
        self.0.get("agentMeta")?.get("model")?.as_str()
    }

    pub fn duration_ms(&self) -> Option<f64> {
        self.0.get("durationMs")?.as_f64()
    }

    /// Duration in seconds, one decimal place
    pub fn duration_label(&self) -> Option<String> {
        self.duration_ms().map(|ms| format!("{:.1}s", ms / 1000.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(stdout: &str) -> TurnResult {
        TurnResult {
            stdout: stdout.to_string(),
            stderr: String::new(),
            exit_code: 0,
            wall_clock_secs: 0.0,
        }
    }

    #[test]
    fn test_structured_payload() {
        let parsed = ParsedResponse::classify(&result(r#"{"payloads":[{"text":"hi"}]}"#));
        assert_eq!(parsed.display_text, "hi");
        assert_eq!(parsed.raw_text, "hi");
        assert!(parsed.is_structured);
        assert!(parsed.metadata.is_none());
    }

    #[test]
    fn test_plain_text() {
        let parsed = ParsedResponse::classify(&result("hi"));
        assert_eq!(parsed.display_text, "hi");
        assert!(!parsed.is_structured);
    }

    #[test]
    fn test_empty_stdout() {
        let parsed = ParsedResponse::classify(&result(""));
        assert_eq!(parsed.display_text, "");
        assert!(parsed.is_empty());

        assert!(ParsedResponse::classify(&result("  \n\t")).is_empty());
    }

    #[test]
    fn test_plain_text_is_trimmed() {
        let parsed = ParsedResponse::classify(&result("\n  hello there \n"));
        assert_eq!(parsed.display_text, "hello there");
        assert_eq!(parsed.raw_text, "hello there");
    }

    #[test]
    fn test_json_without_payload_falls_back_to_plain() {
        let stdout = r#"{"payloads":[]}"#;
        let parsed = ParsedResponse::classify(&result(stdout));
        assert!(!parsed.is_structured);
        assert_eq!(parsed.display_text, stdout);

        let parsed = ParsedResponse::classify(&result(r#"{"payloads":[{"text":42}]}"#));
        assert!(!parsed.is_structured);
    }

    #[test]
    fn test_only_first_payload_is_used() {
        let parsed = ParsedResponse::classify(&result(
            r#"{"payloads":[{"text":"first"},{"text":"second"}]}"#,
        ));
        assert_eq!(parsed.display_text, "first");
    }

    #[test]
    fn test_meta_is_kept_and_readable() {
        let parsed = ParsedResponse::classify(&result(
            r#"{"payloads":[{"text":"hi"}],"meta":{"agentMeta":{"model":"sonnet"},"durationMs":2345}}"#,
        ));
        let meta = parsed.meta().unwrap();
        assert_eq!(meta.model(), Some("sonnet"));
        assert_eq!(meta.duration_ms(), Some(2345.0));
        assert_eq!(meta.duration_label().as_deref(), Some("2.3s"));
    }

    #[test]
    fn test_oddly_shaped_meta_is_tolerated() {
        let parsed = ParsedResponse::classify(&result(
            r#"{"payloads":[{"text":"hi"}],"meta":{"agentMeta":"nope","durationMs":"slow"}}"#,
        ));
        let meta = parsed.meta().unwrap();
        assert_eq!(meta.model(), None);
        assert_eq!(meta.duration_label(), None);

        let parsed = ParsedResponse::classify(&result(r#"{"payloads":[{"text":"hi"}],"meta":7}"#));
        assert!(parsed.meta().is_none());
    }
}
