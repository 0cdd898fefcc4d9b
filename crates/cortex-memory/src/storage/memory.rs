//! Process-local conversation store

use std::collections::HashMap;

use chrono::Utc;

use crate::error::Result;
use crate::storage::{
    ConversationFilter, ConversationMetadata, ConversationStore, StoreOutcome, StoreStatistics,
    StoredConversation, StoredMetadata, unused_conversation_id,
};
use crate::transcript::ParsedConversation;

/// Keeps records in a `Vec` in insertion order, with an id index.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    records: Vec<StoredConversation>,
    by_id: HashMap<String, usize>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ConversationStore for InMemoryStore {
    fn store_conversation(
        &mut self,
        conversation: &ParsedConversation,
        metadata: ConversationMetadata,
        quality_threshold: u8,
    ) -> Result<StoreOutcome> {
        let score = metadata.semantic.quality_score;
        if score < quality_threshold {
            tracing::debug!(score, quality_threshold, "Conversation below quality threshold");
            return Ok(StoreOutcome::rejected());
        }

        let stored_at = Utc::now();
        let id = unused_conversation_id(conversation, stored_at, |id| {
            Ok(self.by_id.contains_key(id))
        })?;

        self.by_id.insert(id.clone(), self.records.len());
        self.records.push(StoredConversation {
            id: id.clone(),
            conversation: conversation.clone(),
            metadata: StoredMetadata {
                source: metadata.source,
                stored_at,
                semantic: metadata.semantic,
            },
        });

        tracing::info!(id = %id, score, "Stored conversation");
        Ok(StoreOutcome::stored(id))
    }

    fn get_conversation(&self, id: &str) -> Result<Option<StoredConversation>> {
        Ok(self.by_id.get(id).map(|&i| self.records[i].clone()))
    }

    fn get_statistics(&self) -> Result<StoreStatistics> {
        Ok(StoreStatistics::from_records(&self.records))
    }

    fn find(&self, filter: &ConversationFilter) -> Result<Vec<StoredConversation>> {
        Ok(self
            .records
            .iter()
            .filter(|record| filter.matches(record))
            .take(filter.limit.unwrap_or(usize::MAX))
            .cloned()
            .collect())
    }

    fn count(&self) -> Result<usize> {
        Ok(self.records.len())
    }
}
