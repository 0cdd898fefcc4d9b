//! Conversation persistence
//!
//! [`ConversationStore`] is the boundary between the import pipeline and
//! whatever holds the records. Stores are append-only: a conversation is
//! written once, under a freshly generated id, and never modified.

pub mod filter;
pub mod memory;
pub mod sqlite;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::config::{StorageBackend, StorageConfig};
use crate::error::{CortexError, Result};
use crate::semantic::{EntityType, SemanticRecord};
use crate::transcript::ParsedConversation;

pub use filter::ConversationFilter;
pub use memory::InMemoryStore;
pub use sqlite::SqliteStore;

/// Attempts at finding an unused id before giving up
const MAX_ID_ATTEMPTS: usize = 8;

/// Caller-supplied metadata for a store request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationMetadata {
    /// Where the conversation came from (file name, "clipboard", ...)
    pub source: String,
    pub semantic: SemanticRecord,
}

impl ConversationMetadata {
    pub fn new(source: impl Into<String>, semantic: SemanticRecord) -> Self {
        Self {
            source: source.into(),
            semantic,
        }
    }
}

/// Metadata persisted alongside a conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredMetadata {
    pub source: String,
    pub stored_at: DateTime<Utc>,
    pub semantic: SemanticRecord,
}

/// A persisted conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredConversation {
    /// `conv_{YYYYMMDD_HHMMSS}_{6 hex}`
    pub id: String,
    pub conversation: ParsedConversation,
    pub metadata: StoredMetadata,
}

impl StoredConversation {
    pub fn quality_score(&self) -> u8 {
        self.metadata.semantic.quality_score
    }

    /// True if any entity has a type in `types` and a value in `values`
    pub fn has_entity_in(&self, types: &[EntityType], values: &[String]) -> bool {
        self.metadata
            .semantic
            .entities
            .iter()
            .any(|e| types.contains(&e.entity_type) && values.contains(&e.value))
    }
}

/// Result of a store request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreOutcome {
    pub stored: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
}

impl StoreOutcome {
    pub fn stored(conversation_id: String) -> Self {
        Self {
            stored: true,
            conversation_id: Some(conversation_id),
        }
    }

    /// Quality gate said no
    pub fn rejected() -> Self {
        Self {
            stored: false,
            conversation_id: None,
        }
    }
}

/// Conversation counts per quality band
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityDistribution {
    /// 8-10
    pub excellent: usize,
    /// 6-7
    pub good: usize,
    /// 4-5
    pub fair: usize,
    /// 0-3
    pub poor: usize,
}

impl QualityDistribution {
    pub fn record(&mut self, score: u8) {
        match score {
            8.. => self.excellent += 1,
            6..=7 => self.good += 1,
            4..=5 => self.fair += 1,
            _ => self.poor += 1,
        }
    }
}

/// Aggregate figures over every stored conversation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreStatistics {
    pub total_conversations: usize,
    /// 0.0 when the store is empty
    pub avg_quality_score: f64,
    pub quality_distribution: QualityDistribution,
    pub total_entities: usize,
    pub total_intents: usize,
}

impl StoreStatistics {
    /// Compute statistics by walking a set of records
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a StoredConversation>) -> Self {
        let mut stats = StoreStatistics::default();
        let mut score_sum: u64 = 0;

        for record in records {
            let semantic = &record.metadata.semantic;
            stats.total_conversations += 1;
            score_sum += u64::from(semantic.quality_score);
            stats.quality_distribution.record(semantic.quality_score);
            stats.total_entities += semantic.entities.len();
            stats.total_intents += semantic.intents.len();
        }

        if stats.total_conversations > 0 {
            stats.avg_quality_score = score_sum as f64 / stats.total_conversations as f64;
        }
        stats
    }
}

/// Storage backend for enriched conversations.
///
/// Implementations must keep insertion order for every query, apply the
/// quality gate before writing anything, and never reuse an id.
pub trait ConversationStore {
    /// Persist `conversation` if its quality score reaches `quality_threshold`.
    fn store_conversation(
        &mut self,
        conversation: &ParsedConversation,
        metadata: ConversationMetadata,
        quality_threshold: u8,
    ) -> Result<StoreOutcome>;

    fn get_conversation(&self, id: &str) -> Result<Option<StoredConversation>>;

    /// Records with `min <= quality_score <= max`
    fn get_by_quality(&self, min_quality: u8, max_quality: u8) -> Result<Vec<StoredConversation>> {
        self.find(&ConversationFilter::new().with_quality_range(min_quality, max_quality))
    }

    /// Records holding at least one entity whose type is in `entity_types`
    /// and whose value is in `entity_values`. Empty lists match nothing.
    fn search_by_entities(
        &self,
        entity_types: &[EntityType],
        entity_values: &[String],
    ) -> Result<Vec<StoredConversation>> {
        self.find(
            &ConversationFilter::new().with_entities(entity_types.to_vec(), entity_values.to_vec()),
        )
    }

    fn get_statistics(&self) -> Result<StoreStatistics>;

    /// Records matching every condition set on `filter`
    fn find(&self, filter: &ConversationFilter) -> Result<Vec<StoredConversation>>;

    fn list_conversations(&self, limit: Option<usize>) -> Result<Vec<StoredConversation>> {
        let mut filter = ConversationFilter::new();
        if let Some(limit) = limit {
            filter = filter.with_limit(limit);
        }
        self.find(&filter)
    }

    fn count(&self) -> Result<usize>;
}

impl<S: ConversationStore + ?Sized> ConversationStore for Box<S> {
    fn store_conversation(
        &mut self,
        conversation: &ParsedConversation,
        metadata: ConversationMetadata,
        quality_threshold: u8,
    ) -> Result<StoreOutcome> {
        (**self).store_conversation(conversation, metadata, quality_threshold)
    }

    fn get_conversation(&self, id: &str) -> Result<Option<StoredConversation>> {
        (**self).get_conversation(id)
    }

    fn get_statistics(&self) -> Result<StoreStatistics> {
        (**self).get_statistics()
    }

    fn find(&self, filter: &ConversationFilter) -> Result<Vec<StoredConversation>> {
        (**self).find(filter)
    }

    fn count(&self) -> Result<usize> {
        (**self).count()
    }
}

/// Open the backend selected in `config`
pub fn open_store(config: &StorageConfig) -> Result<Box<dyn ConversationStore>> {
    match config.backend {
        StorageBackend::Sqlite => Ok(Box::new(SqliteStore::open(&config.database_path())?)),
        StorageBackend::Memory => Ok(Box::new(InMemoryStore::new())),
    }
}

/// Build an id of the form `conv_{YYYYMMDD_HHMMSS}_{6 hex}`.
///
/// The hex suffix hashes the conversation text with a random nonce, so two
/// calls for the same conversation in the same second still differ.
pub fn generate_conversation_id(conversation: &ParsedConversation, at: DateTime<Utc>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(conversation.full_text().as_bytes());
    hasher.update(uuid::Uuid::new_v4().as_bytes());
    let digest = hasher.finalize();

    let suffix: String = digest[..3].iter().map(|b| format!("{b:02x}")).collect();
    format!("conv_{}_{}", at.format("%Y%m%d_%H%M%S"), suffix)
}

/// Generate ids until `taken` reports one as free.
pub(crate) fn unused_conversation_id(
    conversation: &ParsedConversation,
    at: DateTime<Utc>,
    mut taken: impl FnMut(&str) -> Result<bool>,
) -> Result<String> {
    for _ in 0..MAX_ID_ATTEMPTS {
        let id = generate_conversation_id(conversation, at);
        if !taken(&id)? {
            return Ok(id);
        }
        tracing::debug!(id = %id, "Conversation id collision, retrying");
    }
    Err(CortexError::Storage(format!(
        "Could not generate an unused conversation id after {MAX_ID_ATTEMPTS} attempts"
    )))
}
