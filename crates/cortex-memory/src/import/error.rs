use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::CortexError;
use crate::transcript::ParseError;

/// Pipeline stage at which an import failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportStage {
    Validation,
    Parsing,
    Storage,
}

impl ImportStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImportStage::Validation => "validation",
            ImportStage::Parsing => "parsing",
            ImportStage::Storage => "storage",
        }
    }
}

impl std::fmt::Display for ImportStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised by the import pipeline.
///
/// These never escape [`ConversationImporter`](super::ConversationImporter);
/// they are folded into an error [`ImportReport`](super::ImportReport).
#[derive(Debug, Error)]
pub enum ImportError {
    /// Input failed the pre-parse checks, or could not be read at all
    #[error("Validation failed: {0}")]
    Validation(String),

    /// No clipboard provider, or the platform tool is missing or failed
    #[error("Clipboard unavailable: {0}")]
    ClipboardUnavailable(String),

    #[error("Parsing failed: {0}")]
    Parsing(#[from] ParseError),

    #[error("Storage failed: {0}")]
    Storage(#[from] CortexError),
}

impl ImportError {
    pub fn stage(&self) -> ImportStage {
        match self {
            ImportError::Validation(_) | ImportError::ClipboardUnavailable(_) => {
                ImportStage::Validation
            }
            ImportError::Parsing(_) => ImportStage::Parsing,
            ImportError::Storage(_) => ImportStage::Storage,
        }
    }
}
