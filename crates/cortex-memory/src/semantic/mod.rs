//! Semantic extraction
//!
//! Turns a [`ParsedConversation`](crate::transcript::ParsedConversation) into
//! a [`SemanticRecord`]: code entities, intents, multi-turn patterns and a
//! 0-10 quality score. All heuristics are driven by
//! [`ExtractionConfig`](crate::config::ExtractionConfig).

pub mod entities;
mod extractor;
mod intents;
mod keywords;
mod patterns;
mod quality;
pub mod types;

pub use entities::EntityExtractor;
pub use extractor::SemanticExtractor;
pub use types::{
    Entity, EntityType, Intent, IntentType, Pattern, PatternKind, QualityBreakdown,
    SemanticRecord,
};
