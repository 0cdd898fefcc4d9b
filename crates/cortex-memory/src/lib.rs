//! CORTEX Memory - Tiered conversation memory for coding assistants
//!
//! Ingests chat transcripts, extracts structured facts (entities, intents,
//! workflow patterns and a quality score) and persists the enriched
//! conversations behind a swappable storage backend.

pub mod config;
pub mod error;
pub mod import;
pub mod semantic;
pub mod storage;
pub mod testing;
pub mod transcript;

pub use error::CortexError;
pub use import::{ConversationImporter, ImportError, ImportReport, ImportStatus};
pub use semantic::{SemanticExtractor, SemanticRecord};
pub use storage::{ConversationStore, InMemoryStore, SqliteStore};
pub use transcript::{ParsedConversation, TranscriptParser};
