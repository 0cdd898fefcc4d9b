//! Pre-parse sanity checks
//!
//! Cheap checks that reject obviously unusable input before the parser runs.
//! They run in order and the first failure wins.

use std::sync::LazyLock;

use regex::Regex;

use crate::import::ImportError;
use crate::transcript::TranscriptParser;
use crate::transcript::parser::has_turn_boundary;

#[allow(clippy::expect_used)]
static ROLE_KEYWORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(user|you|me|human|copilot|assistant|cortex|ai|system)\b")
        .expect("valid regex")
});

pub(crate) fn validate(text: &str, parser: &TranscriptParser) -> Result<(), ImportError> {
    if text.trim().is_empty() {
        return Err(ImportError::Validation("Input is empty".to_string()));
    }

    if !ROLE_KEYWORD.is_match(text) {
        return Err(ImportError::Validation(
            "No conversation markers found (expected a role such as User or Assistant)"
                .to_string(),
        ));
    }

    if !has_turn_boundary(text) && !text.contains("\"role\"") {
        return Err(ImportError::Validation(
            "No message structure found (expected role-prefixed lines or JSON messages)"
                .to_string(),
        ));
    }

    if parser.detect_format(text).is_none() {
        return Err(ImportError::Validation(
            "Input does not match any supported transcript format".to_string(),
        ));
    }

    Ok(())
}
