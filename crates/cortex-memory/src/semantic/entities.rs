//! Regex-based code entity extraction
//!
//! Keyword-anchored matches (`class Foo`, `def bar(`) get higher confidence
//! than bare heuristics (suffixes, call syntax, verb prefixes).

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::config::ExtractionConfig;
use crate::error::{CortexError, Result};
use crate::semantic::types::{Entity, EntityType};
use crate::transcript::ParsedConversation;

const FILE_ANCHORED_CONFIDENCE: f32 = 0.95;
const FILE_BARE_CONFIDENCE: f32 = 0.85;
const KEYWORD_CONFIDENCE: f32 = 0.9;
const CLASS_SUFFIX_CONFIDENCE: f32 = 0.7;
const CALL_CONFIDENCE: f32 = 0.75;
const VERB_CONFIDENCE: f32 = 0.6;

#[allow(clippy::expect_used)]
static CLASS_KEYWORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:class|interface|struct|enum|trait)\s+([A-Z][A-Za-z0-9_]*)")
        .expect("valid regex")
});

#[allow(clippy::expect_used)]
static FUNCTION_KEYWORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:def|fn|func|function)\s+([A-Za-z_][A-Za-z0-9_]*)\s*[(<]")
        .expect("valid regex")
});

#[allow(clippy::expect_used)]
static CALL_SYNTAX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b([a-z_][A-Za-z0-9_]*)\(").expect("valid regex"));

/// Identifiers followed by `(` that are syntax or builtins, not entities
const NON_FUNCTION_CALLS: &[&str] = &[
    "if", "for", "while", "switch", "return", "catch", "with", "elif", "and", "or", "not", "in",
    "def", "fn", "func", "function", "lambda", "assert", "typeof", "sizeof", "match", "print",
    "len", "range", "str", "int", "float", "list", "dict", "set", "tuple", "type", "super",
    "isinstance", "self", "new",
];

/// Extracts file, class and function entities from conversation text.
pub struct EntityExtractor {
    file_pattern: Option<Regex>,
    class_suffix_pattern: Option<Regex>,
    verb_pattern: Option<Regex>,
}

impl EntityExtractor {
    pub fn new(config: &ExtractionConfig) -> Result<Self> {
        let file_pattern = alternation(&config.file_extensions, |s| s.trim_start_matches('.'))
            .map(|exts| {
                compile(&format!(
                    r"`?((?:[A-Za-z0-9_.\-]+/)*[A-Za-z0-9_\-]+(?:\.[A-Za-z0-9_\-]+)*\.(?:{exts}))\b`?"
                ))
            })
            .transpose()?;

        let class_suffix_pattern = alternation(&config.class_suffixes, |s| s)
            .map(|suffixes| compile(&format!(r"\b([A-Z][A-Za-z0-9]*(?:{suffixes}))\b")))
            .transpose()?;

        let verb_pattern = alternation(&config.action_verbs, |s| s)
            .map(|verbs| {
                compile(&format!(
                    r"\b((?:{verbs})(?:_[a-z0-9]+)+|(?:{verbs})[A-Z][A-Za-z0-9]*)\b"
                ))
            })
            .transpose()?;

        Ok(Self {
            file_pattern,
            class_suffix_pattern,
            verb_pattern,
        })
    }

    /// Extract entities from every turn. Each (type, value) pair appears once
    /// with its highest confidence; output is sorted by type then value.
    pub fn extract(&self, conversation: &ParsedConversation) -> Vec<Entity> {
        let mut found: BTreeMap<(EntityType, String), f32> = BTreeMap::new();

        for turn in &conversation.turns {
            self.scan(&turn.content, &mut found);
        }

        found
            .into_iter()
            .map(|((entity_type, value), confidence)| Entity {
                entity_type,
                value,
                confidence,
            })
            .collect()
    }

    fn scan(&self, text: &str, found: &mut BTreeMap<(EntityType, String), f32>) {
        if let Some(pattern) = &self.file_pattern {
            for caps in pattern.captures_iter(text) {
                let whole = &caps[0];
                let path = &caps[1];
                let anchored =
                    path.contains('/') || (whole.starts_with('`') && whole.ends_with('`'));
                let confidence = if anchored {
                    FILE_ANCHORED_CONFIDENCE
                } else {
                    FILE_BARE_CONFIDENCE
                };
                record(found, EntityType::File, path, confidence);
            }
        }

        for caps in CLASS_KEYWORD.captures_iter(text) {
            record(found, EntityType::Class, &caps[1], KEYWORD_CONFIDENCE);
        }
        if let Some(pattern) = &self.class_suffix_pattern {
            for caps in pattern.captures_iter(text) {
                record(found, EntityType::Class, &caps[1], CLASS_SUFFIX_CONFIDENCE);
            }
        }

        for caps in FUNCTION_KEYWORD.captures_iter(text) {
            record(found, EntityType::Function, &caps[1], KEYWORD_CONFIDENCE);
        }
        for caps in CALL_SYNTAX.captures_iter(text) {
            let name = &caps[1];
            if name.len() >= 2 && !NON_FUNCTION_CALLS.contains(&name) {
                record(found, EntityType::Function, name, CALL_CONFIDENCE);
            }
        }
        if let Some(pattern) = &self.verb_pattern {
            for caps in pattern.captures_iter(text) {
                record(found, EntityType::Function, &caps[1], VERB_CONFIDENCE);
            }
        }
    }
}

fn record(
    found: &mut BTreeMap<(EntityType, String), f32>,
    entity_type: EntityType,
    value: &str,
    confidence: f32,
) {
    let slot = found
        .entry((entity_type, value.to_string()))
        .or_insert(confidence);
    if confidence > *slot {
        *slot = confidence;
    }
}

/// `a|b|c` of escaped, non-empty entries, or `None` if there are none.
fn alternation<'a>(items: &'a [String], normalize: impl Fn(&'a str) -> &'a str) -> Option<String> {
    let escaped: Vec<String> = items
        .iter()
        .map(|s| normalize(s.trim()))
        .filter(|s| !s.is_empty())
        .map(regex::escape)
        .collect();

    if escaped.is_empty() {
        None
    } else {
        Some(escaped.join("|"))
    }
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern)
        .map_err(|e| CortexError::Config(format!("Invalid extraction pattern: {e}")))
}
