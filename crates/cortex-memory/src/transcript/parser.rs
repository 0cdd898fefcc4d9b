//! Transcript parser
//!
//! Detects which of the supported encodings a raw transcript uses and
//! normalizes it into a [`ParsedConversation`]. Detection is ordered and the
//! first match wins: JSON, then Markdown role labels, then plain `Role:` lines.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde_json::Value;

use crate::transcript::code_blocks::fence_info;
use crate::transcript::types::{ParsedConversation, Role, TranscriptFormat, Turn};

/// Keys probed (in order) for the message array of a JSON transcript
const MESSAGE_KEYS: [&str; 3] = ["messages", "conversation", "turns"];

/// Keys probed for a transcript-level timestamp
const TIMESTAMP_KEYS: [&str; 2] = ["timestamp", "created_at"];

// Optional leading glyph (emoji, bullet), then a bold label: `**User:**` or `**User**:`
#[allow(clippy::expect_used)]
static MARKDOWN_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^[ \t]*(?:[^\s*]{1,8}[ \t]+)?\*\*[ \t]*(user|you|me|human|github copilot|copilot|assistant|cortex|ai|system)[ \t]*(?::[ \t]*\*\*|\*\*[ \t]*:)[ \t]*(.*)$",
    )
    .expect("valid regex")
});

#[allow(clippy::expect_used)]
static TEXT_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[ \t]*(user|human|assistant|copilot|ai|system)[ \t]*:[ \t]*(.*)$")
        .expect("valid regex")
});

/// Errors raised while parsing a transcript
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    #[error("Unrecognized transcript format: no JSON messages, Markdown role labels or Role: prefixes found")]
    UnrecognizedFormat,
    #[error("JSON transcript has no messages array")]
    MissingMessages,
    #[error("Message {index} is invalid: {reason}")]
    InvalidMessage { index: usize, reason: String },
    #[error("Message {index} has unknown role '{role}'")]
    UnknownRole { index: usize, role: String },
    #[error("No conversation turns found in {format} transcript")]
    NoTurns { format: TranscriptFormat },
}

/// Detection outcome; JSON keeps the already-parsed value.
enum Detected {
    Json(Value),
    Markdown,
    Text,
}

impl Detected {
    fn format(&self) -> TranscriptFormat {
        match self {
            Detected::Json(_) => TranscriptFormat::Json,
            Detected::Markdown => TranscriptFormat::Markdown,
            Detected::Text => TranscriptFormat::Text,
        }
    }
}

/// Stateless transcript parser.
#[derive(Debug, Clone, Copy, Default)]
pub struct TranscriptParser;

impl TranscriptParser {
    pub fn new() -> Self {
        Self
    }

    /// Report which format `raw` would be parsed as, without building turns.
    pub fn detect_format(&self, raw: &str) -> Option<TranscriptFormat> {
        detect(raw).map(|d| d.format())
    }

    /// Parse a raw transcript into a normalized conversation.
    pub fn parse(&self, raw: &str) -> Result<ParsedConversation, ParseError> {
        let detected = detect(raw).ok_or(ParseError::UnrecognizedFormat)?;
        tracing::debug!(format = %detected.format(), "Detected transcript format");

        match detected {
            Detected::Json(value) => parse_json(&value),
            Detected::Markdown => parse_marked(raw, &MARKDOWN_MARKER, TranscriptFormat::Markdown),
            Detected::Text => parse_marked(raw, &TEXT_MARKER, TranscriptFormat::Text),
        }
    }
}

/// True if `raw` contains a line-anchored role marker of any line-based format.
pub(crate) fn has_turn_boundary(raw: &str) -> bool {
    has_marker_line(raw, &MARKDOWN_MARKER) || has_marker_line(raw, &TEXT_MARKER)
}

fn detect(raw: &str) -> Option<Detected> {
    let trimmed = raw.trim();
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
            return Some(Detected::Json(value));
        }
    }
    if has_marker_line(raw, &MARKDOWN_MARKER) {
        return Some(Detected::Markdown);
    }
    if has_marker_line(raw, &TEXT_MARKER) {
        return Some(Detected::Text);
    }
    None
}

fn role_from_label(label: &str) -> Role {
    match label.to_ascii_lowercase().as_str() {
        "user" | "you" | "me" | "human" => Role::User,
        _ => Role::Assistant,
    }
}

fn has_marker_line(raw: &str, marker: &Regex) -> bool {
    let mut in_fence = false;
    for line in raw.lines() {
        if fence_info(line).is_some() {
            in_fence = !in_fence;
        } else if !in_fence && marker.is_match(line) {
            return true;
        }
    }
    false
}

/// Split a line-based transcript on role markers that sit outside code fences.
fn parse_marked(
    raw: &str,
    marker: &Regex,
    format: TranscriptFormat,
) -> Result<ParsedConversation, ParseError> {
    let mut turns = Vec::new();
    let mut current: Option<(Role, Vec<&str>)> = None;
    let mut in_fence = false;

    for line in raw.lines() {
        if fence_info(line).is_some() {
            in_fence = !in_fence;
        } else if !in_fence {
            if let Some(caps) = marker.captures(line) {
                if let Some((role, lines)) = current.take() {
                    turns.push(marked_turn(role, &lines));
                }
                let role = role_from_label(&caps[1]);
                let first = caps.get(2).map_or("", |m| m.as_str());
                current = Some((role, vec![first]));
                continue;
            }
        }

        // Anything before the first marker is preamble
        if let Some((_, lines)) = current.as_mut() {
            lines.push(line);
        }
    }

    if let Some((role, lines)) = current {
        turns.push(marked_turn(role, &lines));
    }

    if turns.is_empty() {
        return Err(ParseError::NoTurns { format });
    }

    Ok(ParsedConversation::new(turns, format, Utc::now()))
}

/// Line-based turns drop the blank lines and indentation around the label
fn marked_turn(role: Role, lines: &[&str]) -> Turn {
    Turn::new(role, lines.join("\n").trim())
}

fn parse_json(value: &Value) -> Result<ParsedConversation, ParseError> {
    let messages = match value {
        Value::Array(items) => items,
        Value::Object(map) => MESSAGE_KEYS
            .iter()
            .find_map(|key| map.get(*key).and_then(Value::as_array))
            .ok_or(ParseError::MissingMessages)?,
        _ => return Err(ParseError::MissingMessages),
    };

    let mut turns = Vec::with_capacity(messages.len());
    for (index, item) in messages.iter().enumerate() {
        let object = item.as_object().ok_or_else(|| ParseError::InvalidMessage {
            index,
            reason: "expected an object".to_string(),
        })?;

        let role = object
            .get("role")
            .and_then(Value::as_str)
            .ok_or_else(|| ParseError::InvalidMessage {
                index,
                reason: "missing string field 'role'".to_string(),
            })?;

        let content = object
            .get("content")
            .and_then(Value::as_str)
            .ok_or_else(|| ParseError::InvalidMessage {
                index,
                reason: "missing string field 'content'".to_string(),
            })?;

        let role = match role.to_ascii_lowercase().as_str() {
            "user" => Role::User,
            "assistant" | "system" => Role::Assistant,
            _ => {
                return Err(ParseError::UnknownRole {
                    index,
                    role: role.to_string(),
                });
            }
        };

        turns.push(Turn::new(role, content));
    }

    if turns.is_empty() {
        return Err(ParseError::NoTurns {
            format: TranscriptFormat::Json,
        });
    }

    let timestamp = value
        .as_object()
        .and_then(|map| {
            TIMESTAMP_KEYS
                .iter()
                .find_map(|key| map.get(*key).and_then(Value::as_str))
        })
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(Utc::now);

    Ok(ParsedConversation::new(
        turns,
        TranscriptFormat::Json,
        timestamp,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser() -> TranscriptParser {
        TranscriptParser::new()
    }

    #[test]
    fn test_markdown_with_glyphs() {
        let raw = "# Session\n\n👤 **User:** Add a cache\n\n🤖 **Copilot:** Sure, done.";
        let parsed = parser().parse(raw).unwrap();

        assert_eq!(parsed.detected_format, TranscriptFormat::Markdown);
        assert_eq!(parsed.turn_count, 2);
        assert_eq!(parsed.turns[0].role, Role::User);
        assert_eq!(parsed.turns[0].content, "Add a cache");
        assert_eq!(parsed.turns[1].role, Role::Assistant);
    }

    #[test]
    fn test_markdown_label_colon_outside_bold() {
        let raw = "**User**: hello there\n**Assistant**: hi";
        let parsed = parser().parse(raw).unwrap();
        assert_eq!(parsed.detected_format, TranscriptFormat::Markdown);
        assert_eq!(parsed.turn_count, 2);
    }

    #[test]
    fn test_markdown_multiline_content() {
        let raw = "**User:** first line\nsecond line\n**Copilot:**\nanswer";
        let parsed = parser().parse(raw).unwrap();
        assert_eq!(parsed.turns[0].content, "first line\nsecond line");
        assert_eq!(parsed.turns[1].content, "answer");
    }

    #[test]
    fn test_markers_inside_code_fences_are_ignored() {
        let raw = "User: show me yaml\nAssistant: here\n```yaml\nuser: admin\n```";
        let parsed = parser().parse(raw).unwrap();

        assert_eq!(parsed.turn_count, 2);
        assert!(parsed.has_code);
        assert_eq!(parsed.turns[1].code_blocks[0].code, "user: admin");
    }

    #[test]
    fn test_text_format_case_insensitive() {
        let raw = "USER: hi\nassistant: hello\nUser: bye";
        let parsed = parser().parse(raw).unwrap();

        assert_eq!(parsed.detected_format, TranscriptFormat::Text);
        assert_eq!(parsed.turn_count, 3);
        assert_eq!(parsed.turns[2].role, Role::User);
    }

    #[test]
    fn test_system_collapses_into_assistant() {
        let parsed = parser().parse("System: be terse\nUser: hi").unwrap();
        assert_eq!(parsed.turns[0].role, Role::Assistant);
    }

    #[test]
    fn test_json_system_collapses_into_assistant() {
        let raw = r#"{"messages":[{"role":"System","content":"be terse"},{"role":"user","content":"hi"}]}"#;
        let parsed = parser().parse(raw).unwrap();

        assert_eq!(parsed.detected_format, TranscriptFormat::Json);
        assert_eq!(parsed.turns[0].role, Role::Assistant);
        assert_eq!(parsed.turns[1].role, Role::User);
    }

    #[test]
    fn test_json_content_is_kept_verbatim() {
        let raw = r#"{"messages":[{"role":"user","content":"  indented\n"}]}"#;
        let parsed = parser().parse(raw).unwrap();
        assert_eq!(parsed.turns[0].content, "  indented\n");
    }

    #[test]
    fn test_json_messages() {
        let raw = r#"{"messages":[{"role":"user","content":"hi"},{"role":"assistant","content":"hello"}]}"#;
        let parsed = parser().parse(raw).unwrap();

        assert_eq!(parsed.detected_format, TranscriptFormat::Json);
        assert_eq!(parsed.turn_count, 2);
        assert!(!parsed.has_code);
    }

    #[test]
    fn test_json_top_level_array() {
        let raw = r#"[{"role":"user","content":"hi"}]"#;
        let parsed = parser().parse(raw).unwrap();
        assert_eq!(parsed.turn_count, 1);
    }

    #[test]
    fn test_json_timestamp_is_used() {
        let raw = r#"{"created_at":"2024-03-01T10:00:00Z","messages":[{"role":"user","content":"hi"}]}"#;
        let parsed = parser().parse(raw).unwrap();
        assert_eq!(
            parsed.approximate_timestamp.to_rfc3339(),
            "2024-03-01T10:00:00+00:00"
        );
    }

    #[test]
    fn test_json_missing_messages() {
        let err = parser().parse(r#"{"title":"nothing here"}"#).unwrap_err();
        assert_eq!(err, ParseError::MissingMessages);
    }

    #[test]
    fn test_json_missing_content() {
        let err = parser().parse(r#"{"messages":[{"role":"user"}]}"#).unwrap_err();
        assert!(matches!(err, ParseError::InvalidMessage { index: 0, .. }));
    }

    #[test]
    fn test_json_unknown_role() {
        let raw = r#"{"messages":[{"role":"user","content":"a"},{"role":"tool","content":"b"}]}"#;
        let err = parser().parse(raw).unwrap_err();
        assert_eq!(
            err,
            ParseError::UnknownRole {
                index: 1,
                role: "tool".to_string()
            }
        );
    }

    #[test]
    fn test_json_empty_messages() {
        let err = parser().parse(r#"{"messages":[]}"#).unwrap_err();
        assert_eq!(
            err,
            ParseError::NoTurns {
                format: TranscriptFormat::Json
            }
        );
    }

    #[test]
    fn test_unrecognized_format() {
        assert_eq!(
            parser().parse("just some notes").unwrap_err(),
            ParseError::UnrecognizedFormat
        );
        assert!(parser().detect_format("just some notes").is_none());
    }

    #[test]
    fn test_markdown_wins_over_text() {
        let raw = "**User:** hi\nAssistant: plain";
        assert_eq!(
            parser().detect_format(raw),
            Some(TranscriptFormat::Markdown)
        );
    }

    #[test]
    fn test_has_turn_boundary() {
        assert!(has_turn_boundary("intro\nUser: hi"));
        assert!(!has_turn_boundary("the user said hi"));
    }
}
