//! Filter types for conversation queries
//!
//! A single filter drives both backends: [`ConversationFilter::matches`] for
//! in-process records and [`ConversationFilter::to_sql_clause`] for SQLite.

use rusqlite::ToSql;

use crate::semantic::EntityType;
use crate::storage::StoredConversation;

/// Filter criteria for conversation queries.
///
/// All fields are optional - when `None`, that filter is not applied.
/// Multiple filters are combined with AND logic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConversationFilter {
    /// Minimum quality score (inclusive)
    pub min_quality: Option<u8>,
    /// Maximum quality score (inclusive)
    pub max_quality: Option<u8>,
    /// Entity search: (types, values). A record matches if one entity has a
    /// type from the first list and a value from the second.
    pub entities: Option<(Vec<EntityType>, Vec<String>)>,
    /// Exact source label
    pub source: Option<String>,
    /// Maximum number of records, counted in insertion order
    pub limit: Option<usize>,
}

impl ConversationFilter {
    /// Create a new empty filter (matches everything)
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_min_quality(mut self, min_quality: u8) -> Self {
        self.min_quality = Some(min_quality);
        self
    }

    pub fn with_max_quality(mut self, max_quality: u8) -> Self {
        self.max_quality = Some(max_quality);
        self
    }

    pub fn with_quality_range(self, min_quality: u8, max_quality: u8) -> Self {
        self.with_min_quality(min_quality)
            .with_max_quality(max_quality)
    }

    /// Filter by entity. Empty lists match nothing.
    pub fn with_entities(mut self, types: Vec<EntityType>, values: Vec<String>) -> Self {
        self.entities = Some((types, values));
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Check a record against every condition except `limit`
    pub fn matches(&self, record: &StoredConversation) -> bool {
        let score = record.quality_score();

        if self.min_quality.is_some_and(|min| score < min) {
            return false;
        }
        if self.max_quality.is_some_and(|max| score > max) {
            return false;
        }
        if let Some((types, values)) = &self.entities {
            if !record.has_entity_in(types, values) {
                return false;
            }
        }
        if let Some(source) = &self.source {
            if &record.metadata.source != source {
                return false;
            }
        }
        true
    }

    /// Build a parameterized SQL WHERE clause over the `conversations` table.
    ///
    /// Placeholders are positional (`?`); `limit` is not included.
    pub fn to_sql_clause(&self) -> Option<(String, Vec<Box<dyn ToSql>>)> {
        let mut conditions = Vec::new();
        let mut params: Vec<Box<dyn ToSql>> = Vec::new();

        if let Some(min) = self.min_quality {
            conditions.push("quality_score >= ?".to_string());
            params.push(Box::new(min));
        }

        if let Some(max) = self.max_quality {
            conditions.push("quality_score <= ?".to_string());
            params.push(Box::new(max));
        }

        if let Some((types, values)) = &self.entities {
            if types.is_empty() || values.is_empty() {
                conditions.push("0".to_string());
            } else {
                conditions.push(format!(
                    "id IN (SELECT conversation_id FROM conversation_entities \
                     WHERE entity_type IN ({}) AND value IN ({}))",
                    placeholders(types.len()),
                    placeholders(values.len())
                ));
                for t in types {
                    params.push(Box::new(t.as_str()));
                }
                for v in values {
                    params.push(Box::new(v.clone()));
                }
            }
        }

        if let Some(source) = &self.source {
            conditions.push("source = ?".to_string());
            params.push(Box::new(source.clone()));
        }

        if conditions.is_empty() {
            None
        } else {
            Some((conditions.join(" AND "), params))
        }
    }

    /// Check if this filter is empty (no conditions set)
    pub fn is_empty(&self) -> bool {
        self.min_quality.is_none()
            && self.max_quality.is_none()
            && self.entities.is_none()
            && self.source.is_none()
            && self.limit.is_none()
    }
}

fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_filter() {
        let filter = ConversationFilter::new();
        assert!(filter.is_empty());
        assert!(filter.to_sql_clause().is_none());
    }

    #[test]
    fn test_quality_range_filter() {
        let filter = ConversationFilter::new().with_quality_range(5, 10);

        let (sql, params) = filter.to_sql_clause().unwrap();
        assert_eq!(sql, "quality_score >= ? AND quality_score <= ?");
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn test_entity_filter() {
        let filter = ConversationFilter::new().with_entities(
            vec![EntityType::File, EntityType::Class],
            vec!["parser.py".to_string()],
        );

        let (sql, params) = filter.to_sql_clause().unwrap();
        assert!(sql.contains("entity_type IN (?, ?)"));
        assert!(sql.contains("value IN (?)"));
        assert_eq!(params.len(), 3);
    }

    #[test]
    fn test_empty_entity_lists_match_nothing() {
        let filter = ConversationFilter::new().with_entities(vec![], vec!["x".to_string()]);

        let (sql, params) = filter.to_sql_clause().unwrap();
        assert_eq!(sql, "0");
        assert!(params.is_empty());
    }

    #[test]
    fn test_combined_filters() {
        let filter = ConversationFilter::new()
            .with_min_quality(6)
            .with_source("clipboard")
            .with_limit(3);

        let (sql, params) = filter.to_sql_clause().unwrap();
        assert!(sql.contains("quality_score >= ?"));
        assert!(sql.contains("source = ?"));
        assert!(sql.contains(" AND "));
        assert!(!sql.contains("LIMIT"));
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn test_limit_alone_has_no_where_clause() {
        let filter = ConversationFilter::new().with_limit(5);
        assert!(!filter.is_empty());
        assert!(filter.to_sql_clause().is_none());
    }
}
