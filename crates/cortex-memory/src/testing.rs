//! Test utilities for cortex-memory - sample transcripts and mocks
//!
//! Shared by unit tests, the integration tests under `tests/` and the CLI
//! crate's tests.

use chrono::{TimeZone, Utc};

use crate::import::{ClipboardError, ClipboardProvider};
use crate::semantic::{Entity, EntityType, Intent, IntentType, SemanticRecord};
use crate::storage::ConversationMetadata;
use crate::transcript::{ParsedConversation, Role, TranscriptFormat, Turn};

/// Six-turn Markdown session implementing a login function, with one Python
/// block. Scores at least 7 with the default extraction config.
pub const LOGIN_SESSION_MARKDOWN: &str = r#"# Login feature session

👤 **User:** I need to implement a login function for our Flask API. It should validate the username and password against the database and return a session token.

🤖 **Copilot:** Here's an implementation of the login function using a parameterized query and password hashing:

```python
def login(username, password):
    user = db.query("SELECT id, password_hash FROM users WHERE username = ?", username)
    if user is None or not check_password(password, user.password_hash):
        raise AuthenticationError("invalid credentials")
    return create_session_token(user.id)
```

👤 **User:** Great. How should the API endpoint handle a failed login request?

🤖 **Copilot:** The endpoint should catch the AuthenticationError exception and return an HTTP 401 response with a JSON error body. Successful requests return the session token.

👤 **User:** Can you add tests for the login endpoint?

🤖 **Copilot:** I've added pytest tests that call the endpoint with valid and invalid credentials and assert the response status code and token.
"#;

/// Single-message JSON transcript about a bug in `parser.py`
pub const PARSER_BUG_JSON: &str =
    r#"{"messages":[{"role":"user","content":"fix the bug in parser.py"}]}"#;

/// Four-turn plain-text transcript
pub const CACHE_TEST_TEXT: &str = "User: Can you explain why the cache test is failing?
Assistant: The test fails because the cache is never cleared between runs.
User: How do I fix it?
Assistant: Call cache.clear() in the setup function before each test.
";

/// Two short turns with nothing technical in them
pub const SMALL_TALK_TEXT: &str = "User: hi\nAssistant: hello, how are you?\n";

/// Build a conversation from (role, content) pairs with a fixed timestamp.
pub fn sample_conversation(turns: &[(Role, &str)]) -> ParsedConversation {
    ParsedConversation::new(
        turns.iter().map(|(role, content)| Turn::new(*role, *content)).collect(),
        TranscriptFormat::Text,
        Utc.with_ymd_and_hms(2025, 1, 15, 9, 30, 0)
            .single()
            .unwrap_or_else(Utc::now),
    )
}

/// A semantic record with the given score, one file entity and one intent.
pub fn sample_record(quality_score: u8) -> SemanticRecord {
    SemanticRecord {
        entities: vec![Entity {
            entity_type: EntityType::File,
            value: "main.rs".to_string(),
            confidence: 0.85,
        }],
        intents: vec![Intent {
            intent_type: IntentType::Execute,
            confidence: 1.0,
        }],
        quality_score,
        ..Default::default()
    }
}

/// Store metadata wrapping [`sample_record`]
pub fn sample_metadata(source: &str, quality_score: u8) -> ConversationMetadata {
    ConversationMetadata::new(source, sample_record(quality_score))
}

/// Clipboard mock returning fixed text, or failing when empty-handed.
#[derive(Debug, Clone, Default)]
pub struct StaticClipboard {
    text: Option<String>,
}

impl StaticClipboard {
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
        }
    }

    /// A clipboard whose paste tool is missing
    pub fn unavailable() -> Self {
        Self { text: None }
    }
}

impl ClipboardProvider for StaticClipboard {
    fn read_text(&self) -> Result<String, ClipboardError> {
        self.text
            .clone()
            .ok_or_else(|| ClipboardError::NoTool("static".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript::TranscriptParser;

    #[test]
    fn fixtures_parse_in_their_formats() {
        let parser = TranscriptParser::new();
        assert_eq!(
            parser.parse(LOGIN_SESSION_MARKDOWN).unwrap().detected_format,
            TranscriptFormat::Markdown
        );
        assert_eq!(
            parser.parse(PARSER_BUG_JSON).unwrap().detected_format,
            TranscriptFormat::Json
        );
        assert_eq!(
            parser.parse(CACHE_TEST_TEXT).unwrap().detected_format,
            TranscriptFormat::Text
        );
    }

    #[test]
    fn static_clipboard_behaviour() {
        assert_eq!(StaticClipboard::with_text("x").read_text().unwrap(), "x");
        assert!(StaticClipboard::unavailable().read_text().is_err());
    }
}
