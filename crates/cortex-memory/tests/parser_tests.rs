//! Integration tests for transcript parsing
//!
//! Covers format detection for every supported encoding, turn extraction and
//! the structural failures the parser reports.

use cortex_memory::testing::{CACHE_TEST_TEXT, LOGIN_SESSION_MARKDOWN, PARSER_BUG_JSON};
use cortex_memory::transcript::{ParseError, Role, TranscriptFormat, TranscriptParser};

// =============================================================================
// Format Detection
// =============================================================================

mod detection_tests {
    use super::*;

    #[test]
    fn minimal_example_of_each_format_parses() {
        let parser = TranscriptParser::new();
        let cases = [
            ("**User:** hi", TranscriptFormat::Markdown),
            (r#"{"messages":[{"role":"user","content":"hi"}]}"#, TranscriptFormat::Json),
            ("User: hi", TranscriptFormat::Text),
        ];

        for (raw, format) in cases {
            let parsed = parser.parse(raw).unwrap();
            assert_eq!(parsed.detected_format, format, "input: {raw}");
            assert!(parsed.turn_count >= 1);
        }
    }

    #[test]
    fn detect_format_matches_parse() {
        let parser = TranscriptParser::new();
        for raw in [LOGIN_SESSION_MARKDOWN, PARSER_BUG_JSON, CACHE_TEST_TEXT] {
            let detected = parser.detect_format(raw).unwrap();
            assert_eq!(parser.parse(raw).unwrap().detected_format, detected);
        }
    }

    #[test]
    fn plain_prose_is_unrecognized() {
        let parser = TranscriptParser::new();
        assert_eq!(parser.detect_format("just some notes"), None);
        assert_eq!(
            parser.parse("just some notes").unwrap_err(),
            ParseError::UnrecognizedFormat
        );
    }

    #[test]
    fn format_serializes_lowercase() {
        let json = serde_json::to_string(&TranscriptFormat::Json).unwrap();
        assert_eq!(json, "\"json\"");
    }
}

// =============================================================================
// Turn Extraction
// =============================================================================

mod turn_tests {
    use super::*;

    #[test]
    fn login_session_has_six_turns_and_code() {
        let parsed = TranscriptParser::new().parse(LOGIN_SESSION_MARKDOWN).unwrap();

        assert_eq!(parsed.detected_format, TranscriptFormat::Markdown);
        assert_eq!(parsed.turn_count, 6);
        assert!(parsed.has_code);

        let roles: Vec<Role> = parsed.turns.iter().map(|t| t.role).collect();
        assert_eq!(
            roles,
            vec![
                Role::User,
                Role::Assistant,
                Role::User,
                Role::Assistant,
                Role::User,
                Role::Assistant
            ]
        );

        let blocks = &parsed.turns[1].code_blocks;
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].language, "python");
        assert!(blocks[0].code.contains("def login("));
        assert!(!parsed.turns[1].plain_text().contains("def login("));
    }

    #[test]
    fn text_turns_keep_order() {
        let parsed = TranscriptParser::new().parse(CACHE_TEST_TEXT).unwrap();
        assert_eq!(parsed.turn_count, 4);
        assert!(parsed.turns[0].content.starts_with("Can you explain"));
        assert!(parsed.turns[3].content.starts_with("Call cache.clear()"));
        assert!(!parsed.has_code);
    }

    #[test]
    fn json_single_message() {
        let parsed = TranscriptParser::new().parse(PARSER_BUG_JSON).unwrap();
        assert_eq!(parsed.turn_count, 1);
        assert_eq!(parsed.turns[0].role, Role::User);
        assert_eq!(parsed.turns[0].content, "fix the bug in parser.py");
    }
}

// =============================================================================
// Structural Failures
// =============================================================================

mod failure_tests {
    use super::*;

    #[test]
    fn json_without_messages_array() {
        let err = TranscriptParser::new()
            .parse(r#"{"title": "no messages here"}"#)
            .unwrap_err();
        assert_eq!(err, ParseError::MissingMessages);
    }

    #[test]
    fn json_with_unknown_role() {
        let err = TranscriptParser::new()
            .parse(r#"{"messages":[{"role":"narrator","content":"once upon a time"}]}"#)
            .unwrap_err();
        assert!(matches!(err, ParseError::UnknownRole { index: 0, .. }));
    }
}
