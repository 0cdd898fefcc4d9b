//! SQLite conversation store
//!
//! Conversations and their semantic records are kept as JSON payloads; the
//! columns used for filtering (quality, source, counts) are denormalized next
//! to them, and entities get their own table for entity search.

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{Connection, ToSql, params};

use crate::error::{CortexError, Result};
use crate::storage::{
    ConversationFilter, ConversationMetadata, ConversationStore, QualityDistribution,
    StoreOutcome, StoreStatistics, StoredConversation, StoredMetadata, unused_conversation_id,
};
use crate::transcript::ParsedConversation;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS conversations (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    id TEXT NOT NULL UNIQUE,
    source TEXT NOT NULL,
    stored_at TEXT NOT NULL,
    quality_score INTEGER NOT NULL,
    entity_count INTEGER NOT NULL,
    intent_count INTEGER NOT NULL,
    conversation_json TEXT NOT NULL,
    semantic_json TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_conversations_quality ON conversations(quality_score);

CREATE TABLE IF NOT EXISTS conversation_entities (
    conversation_id TEXT NOT NULL REFERENCES conversations(id),
    entity_type TEXT NOT NULL,
    value TEXT NOT NULL,
    confidence REAL NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_conversation_entities_lookup
    ON conversation_entities(entity_type, value);
";

/// Durable [`ConversationStore`] backed by a single SQLite database.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (or create) the database at `path`, creating parent directories.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path).map_err(|e| {
            CortexError::Storage(format!(
                "Failed to open database at {}: {e}",
                path.display()
            ))
        })?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")
            .map_err(storage_error)?;

        tracing::debug!("Opened conversation database at {}", path.display());
        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(storage_error)?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")
            .map_err(storage_error)?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA).map_err(|e| {
            CortexError::Storage(format!("Failed to initialize schema: {e}"))
        })?;
        Ok(Self { conn })
    }

    fn load(&self, filter: &ConversationFilter) -> Result<Vec<StoredConversation>> {
        let mut sql = "SELECT id, source, stored_at, conversation_json, semantic_json \
                       FROM conversations"
            .to_string();
        let mut params: Vec<Box<dyn ToSql>> = Vec::new();

        if let Some((clause, clause_params)) = filter.to_sql_clause() {
            sql.push_str(" WHERE ");
            sql.push_str(&clause);
            params.extend(clause_params);
        }
        sql.push_str(" ORDER BY seq");
        if let Some(limit) = filter.limit {
            sql.push_str(" LIMIT ?");
            params.push(Box::new(i64::try_from(limit).unwrap_or(i64::MAX)));
        }

        let mut stmt = self.conn.prepare(&sql).map_err(storage_error)?;
        let rows = stmt
            .query_map(rusqlite::params_from_iter(params), RawRow::from_row)
            .map_err(storage_error)?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row.map_err(storage_error)?.decode()?);
        }
        Ok(records)
    }
}

impl ConversationStore for SqliteStore {
    fn store_conversation(
        &mut self,
        conversation: &ParsedConversation,
        metadata: ConversationMetadata,
        quality_threshold: u8,
    ) -> Result<StoreOutcome> {
        let semantic = &metadata.semantic;
        let score = semantic.quality_score;
        if score < quality_threshold {
            tracing::debug!(score, quality_threshold, "Conversation below quality threshold");
            return Ok(StoreOutcome::rejected());
        }

        let conversation_json = serde_json::to_string(conversation)?;
        let semantic_json = serde_json::to_string(semantic)?;
        let stored_at = Utc::now();

        let tx = self.conn.transaction().map_err(storage_error)?;

        let id = unused_conversation_id(conversation, stored_at, |id| {
            tx.query_row(
                "SELECT EXISTS(SELECT 1 FROM conversations WHERE id = ?1)",
                [id],
                |row| row.get::<_, bool>(0),
            )
            .map_err(storage_error)
        })?;

        tx.execute(
            "INSERT INTO conversations
                (id, source, stored_at, quality_score, entity_count, intent_count,
                 conversation_json, semantic_json)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                id,
                metadata.source,
                stored_at.to_rfc3339(),
                score,
                semantic.entities.len() as i64,
                semantic.intents.len() as i64,
                conversation_json,
                semantic_json,
            ],
        )
        .map_err(|e| CortexError::Storage(format!("Failed to insert conversation: {e}")))?;

        for entity in &semantic.entities {
            tx.execute(
                "INSERT INTO conversation_entities (conversation_id, entity_type, value, confidence)
                 VALUES (?1, ?2, ?3, ?4)",
                params![id, entity.entity_type.as_str(), entity.value, entity.confidence],
            )
            .map_err(|e| CortexError::Storage(format!("Failed to insert entity: {e}")))?;
        }

        tx.commit().map_err(storage_error)?;

        tracing::info!(id = %id, score, "Stored conversation");
        Ok(StoreOutcome::stored(id))
    }

    fn get_conversation(&self, id: &str) -> Result<Option<StoredConversation>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, source, stored_at, conversation_json, semantic_json
                 FROM conversations WHERE id = ?1",
            )
            .map_err(storage_error)?;
        let mut rows = stmt
            .query_map([id], RawRow::from_row)
            .map_err(storage_error)?;

        match rows.next() {
            Some(row) => Ok(Some(row.map_err(storage_error)?.decode()?)),
            None => Ok(None),
        }
    }

    fn get_statistics(&self) -> Result<StoreStatistics> {
        self.conn
            .query_row(
                "SELECT COUNT(*),
                        COALESCE(AVG(quality_score), 0.0),
                        COALESCE(SUM(CASE WHEN quality_score >= 8 THEN 1 ELSE 0 END), 0),
                        COALESCE(SUM(CASE WHEN quality_score BETWEEN 6 AND 7 THEN 1 ELSE 0 END), 0),
                        COALESCE(SUM(CASE WHEN quality_score BETWEEN 4 AND 5 THEN 1 ELSE 0 END), 0),
                        COALESCE(SUM(CASE WHEN quality_score < 4 THEN 1 ELSE 0 END), 0),
                        COALESCE(SUM(entity_count), 0),
                        COALESCE(SUM(intent_count), 0)
                 FROM conversations",
                [],
                |row| {
                    Ok(StoreStatistics {
                        total_conversations: row.get::<_, i64>(0)? as usize,
                        avg_quality_score: row.get(1)?,
                        quality_distribution: QualityDistribution {
                            excellent: row.get::<_, i64>(2)? as usize,
                            good: row.get::<_, i64>(3)? as usize,
                            fair: row.get::<_, i64>(4)? as usize,
                            poor: row.get::<_, i64>(5)? as usize,
                        },
                        total_entities: row.get::<_, i64>(6)? as usize,
                        total_intents: row.get::<_, i64>(7)? as usize,
                    })
                },
            )
            .map_err(|e| CortexError::Storage(format!("Failed to compute statistics: {e}")))
    }

    fn find(&self, filter: &ConversationFilter) -> Result<Vec<StoredConversation>> {
        self.load(filter)
    }

    fn count(&self) -> Result<usize> {
        self.conn
            .query_row("SELECT COUNT(*) FROM conversations", [], |row| {
                row.get::<_, i64>(0)
            })
            .map(|n| n as usize)
            .map_err(storage_error)
    }
}

/// Columns as read from SQLite, before JSON decoding
struct RawRow {
    id: String,
    source: String,
    stored_at: String,
    conversation_json: String,
    semantic_json: String,
}

impl RawRow {
    /// Expects columns `id, source, stored_at, conversation_json, semantic_json`
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            source: row.get(1)?,
            stored_at: row.get(2)?,
            conversation_json: row.get(3)?,
            semantic_json: row.get(4)?,
        })
    }

    fn decode(self) -> Result<StoredConversation> {
        let stored_at = DateTime::parse_from_rfc3339(&self.stored_at)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| {
                CortexError::Storage(format!(
                    "Invalid stored_at '{}' for {}: {e}",
                    self.stored_at, self.id
                ))
            })?;

        Ok(StoredConversation {
            conversation: serde_json::from_str(&self.conversation_json)?,
            metadata: StoredMetadata {
                source: self.source,
                stored_at,
                semantic: serde_json::from_str(&self.semantic_json)?,
            },
            id: self.id,
        })
    }
}

fn storage_error(e: rusqlite::Error) -> CortexError {
    CortexError::Storage(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semantic::SemanticRecord;
    use crate::transcript::{Role, TranscriptFormat, Turn};

    fn conversation() -> ParsedConversation {
        ParsedConversation::new(
            vec![
                Turn::new(Role::User, "hello"),
                Turn::new(Role::Assistant, "```sh\necho hi\n```"),
            ],
            TranscriptFormat::Text,
            Utc::now(),
        )
    }

    fn metadata(score: u8) -> ConversationMetadata {
        ConversationMetadata::new(
            "unit",
            SemanticRecord {
                quality_score: score,
                ..Default::default()
            },
        )
    }

    #[test]
    fn test_open_in_memory() {
        let store = SqliteStore::open_in_memory().expect("Failed to open in-memory store");
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_records_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("conversations.db");

        let original = conversation();

        let id = {
            let mut store = SqliteStore::open(&path).unwrap();
            store
                .store_conversation(&original, metadata(7), 0)
                .unwrap()
                .conversation_id
                .unwrap()
        };

        let store = SqliteStore::open(&path).unwrap();
        let record = store.get_conversation(&id).unwrap().unwrap();
        assert_eq!(record.conversation, original);
        assert_eq!(record.metadata.source, "unit");
        assert_eq!(record.quality_score(), 7);
    }

    #[test]
    fn test_rejected_conversation_writes_nothing() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let outcome = store
            .store_conversation(&conversation(), metadata(2), 5)
            .unwrap();
        assert_eq!(outcome, StoreOutcome::rejected());
        assert_eq!(store.count().unwrap(), 0);
    }
}
