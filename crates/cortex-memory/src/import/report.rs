use serde::{Deserialize, Serialize};

use crate::import::{ImportError, ImportStage};
use crate::semantic::{IntentType, QualityBreakdown, SemanticRecord};
use crate::storage::StoreOutcome;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportStatus {
    Success,
    Error,
}

/// Condensed view of a [`SemanticRecord`] for reports
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SemanticSummary {
    pub quality_score: u8,
    pub quality_breakdown: QualityBreakdown,
    pub entity_count: usize,
    pub intents: Vec<IntentType>,
    /// Pattern names, in detection order
    pub patterns: Vec<String>,
}

impl From<&SemanticRecord> for SemanticSummary {
    fn from(record: &SemanticRecord) -> Self {
        Self {
            quality_score: record.quality_score,
            quality_breakdown: record.quality_breakdown,
            entity_count: record.entities.len(),
            intents: record.intents.iter().map(|i| i.intent_type).collect(),
            patterns: record.patterns.iter().map(|p| p.name.clone()).collect(),
        }
    }
}

/// Outcome of one import attempt.
///
/// A conversation rejected by the quality gate is still a success, with
/// `stored: false` and no id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportReport {
    pub status: ImportStatus,
    pub stored: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
    /// Number of parsed turns
    #[serde(rename = "messages", default, skip_serializing_if = "Option::is_none")]
    pub message_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semantic_data: Option<SemanticSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<ImportStage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ImportReport {
    pub fn success(outcome: StoreOutcome, message_count: usize, semantic: &SemanticRecord) -> Self {
        Self {
            status: ImportStatus::Success,
            stored: outcome.stored,
            conversation_id: outcome.conversation_id,
            message_count: Some(message_count),
            semantic_data: Some(SemanticSummary::from(semantic)),
            stage: None,
            error: None,
        }
    }

    pub fn failure(error: &ImportError) -> Self {
        Self {
            status: ImportStatus::Error,
            stored: false,
            conversation_id: None,
            message_count: None,
            semantic_data: None,
            stage: Some(error.stage()),
            error: Some(error.to_string()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == ImportStatus::Success
    }
}
