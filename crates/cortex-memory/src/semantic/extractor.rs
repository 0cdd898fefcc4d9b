use std::collections::HashSet;

use crate::config::ExtractionConfig;
use crate::error::Result;
use crate::semantic::entities::EntityExtractor;
use crate::semantic::intents::detect_intents;
use crate::semantic::keywords::TextIndex;
use crate::semantic::patterns::detect_patterns;
use crate::semantic::quality::{self, QualityInputs};
use crate::semantic::types::SemanticRecord;
use crate::transcript::ParsedConversation;

/// Derives a [`SemanticRecord`] from a parsed conversation.
///
/// Extraction is pure and deterministic: the same conversation and config
/// always yield the same record.
pub struct SemanticExtractor {
    config: ExtractionConfig,
    entities: EntityExtractor,
    technical_terms: HashSet<String>,
}

impl SemanticExtractor {
    /// Build an extractor, compiling the configured word lists into patterns.
    pub fn new(config: ExtractionConfig) -> Result<Self> {
        let entities = EntityExtractor::new(&config)?;
        let technical_terms = config
            .technical_terms
            .iter()
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();

        Ok(Self {
            config,
            entities,
            technical_terms,
        })
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    pub fn extract(&self, conversation: &ParsedConversation) -> SemanticRecord {
        if conversation.is_empty() {
            return SemanticRecord::default();
        }

        let turn_indexes: Vec<TextIndex> = conversation
            .turns
            .iter()
            .map(|turn| TextIndex::new(&turn.content))
            .collect();
        let full_text = TextIndex::new(&conversation.full_text());

        let entities = self.entities.extract(conversation);
        let intents = detect_intents(
            &full_text,
            &self.config.intent_keywords,
            self.config.intent_saturation,
        );
        let patterns = detect_patterns(conversation, &turn_indexes, &self.config);
        let quality_breakdown = quality::score(
            &QualityInputs {
                conversation,
                full_text: &full_text,
                turn_indexes: &turn_indexes,
                patterns: &patterns,
                technical_terms: &self.technical_terms,
            },
            &self.config,
        );
        let quality_score = quality_breakdown.total();

        tracing::debug!(
            turns = conversation.turn_count,
            entities = entities.len(),
            intents = intents.len(),
            patterns = patterns.len(),
            quality_score,
            "Extracted semantic record"
        );

        SemanticRecord {
            entities,
            intents,
            patterns,
            quality_score,
            quality_breakdown,
        }
    }
}
