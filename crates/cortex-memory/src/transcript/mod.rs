//! Transcript parsing
//!
//! Converts raw conversation text (Markdown role labels, JSON message arrays
//! or plain `Role:` lines) into a normalized sequence of turns.

pub mod code_blocks;
pub mod parser;
pub mod types;

pub use code_blocks::{extract_code_blocks, strip_code_blocks};
pub use parser::{ParseError, TranscriptParser};
pub use types::{CodeBlock, ParsedConversation, Role, TranscriptFormat, Turn};
