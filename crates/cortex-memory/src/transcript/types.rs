//! Transcript types for the CORTEX parser
//!
//! Defines the normalized conversation structures produced by the parser:
//! roles, turns, fenced code blocks and the parsed conversation itself.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::transcript::code_blocks::{extract_code_blocks, strip_code_blocks};

/// Role of a conversation participant.
///
/// System messages are recognized by the parser but folded into
/// `Assistant`, since they carry assistant-side context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// User message
    User,
    /// Assistant (or system) message
    Assistant,
}

impl Role {
    /// Convert role to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// A fenced code block found inside a turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeBlock {
    /// Language tag from the opening fence (may be empty)
    pub language: String,
    /// Source text between the fences
    pub code: String,
}

/// A single turn in a conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    /// Role of the speaker
    pub role: Role,
    /// Full content of the message, code fences included
    pub content: String,
    /// Fenced code blocks in order of appearance
    pub code_blocks: Vec<CodeBlock>,
}

impl Turn {
    /// Create a turn, extracting its code blocks from `content`. The content
    /// is kept as given.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        let content = content.into();
        let code_blocks = extract_code_blocks(&content);
        Self {
            role,
            content,
            code_blocks,
        }
    }

    /// Content with fenced code blocks removed.
    pub fn plain_text(&self) -> String {
        strip_code_blocks(&self.content)
    }

    pub fn has_code(&self) -> bool {
        !self.code_blocks.is_empty()
    }
}

/// Transcript encodings understood by the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranscriptFormat {
    /// Bold role labels such as `**User:**` / `**Copilot:**`
    Markdown,
    /// `{"messages": [{"role": ..., "content": ...}]}`
    Json,
    /// Plain `User:` / `Assistant:` line prefixes
    Text,
}

impl TranscriptFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            TranscriptFormat::Markdown => "markdown",
            TranscriptFormat::Json => "json",
            TranscriptFormat::Text => "text",
        }
    }
}

impl std::fmt::Display for TranscriptFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A normalized conversation produced by the parser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedConversation {
    /// Turns in original order
    pub turns: Vec<Turn>,
    /// Which format branch matched
    pub detected_format: TranscriptFormat,
    /// Number of turns
    pub turn_count: usize,
    /// True if any turn contains at least one code block
    pub has_code: bool,
    /// Taken from the transcript when available, otherwise parse time
    pub approximate_timestamp: DateTime<Utc>,
}

impl ParsedConversation {
    /// Build a conversation, deriving `turn_count` and `has_code` from the turns.
    pub fn new(
        turns: Vec<Turn>,
        detected_format: TranscriptFormat,
        approximate_timestamp: DateTime<Utc>,
    ) -> Self {
        let turn_count = turns.len();
        let has_code = turns.iter().any(Turn::has_code);
        Self {
            turns,
            detected_format,
            turn_count,
            has_code,
            approximate_timestamp,
        }
    }

    /// Total characters across all turn contents
    pub fn content_length(&self) -> usize {
        self.turns.iter().map(|t| t.content.chars().count()).sum()
    }

    /// All turn contents joined with blank lines
    pub fn full_text(&self) -> String {
        self.turns
            .iter()
            .map(|t| t.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}
