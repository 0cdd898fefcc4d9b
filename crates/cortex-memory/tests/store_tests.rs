//! Integration tests for conversation stores
//!
//! Every contract check is written once against `ConversationStore` and run
//! on both the in-memory and the SQLite backend.

use std::collections::HashSet;

use cortex_memory::semantic::EntityType;
use cortex_memory::storage::{
    ConversationFilter, ConversationStore, InMemoryStore, QualityDistribution, SqliteStore,
};
use cortex_memory::testing::{sample_conversation, sample_metadata};
use cortex_memory::transcript::{ParsedConversation, Role};
use tempfile::tempdir;

// =============================================================================
// Test Fixtures and Helpers
// =============================================================================

fn conversation(text: &str) -> ParsedConversation {
    sample_conversation(&[
        (Role::User, text),
        (Role::Assistant, "```rust\nfn answer() -> u32 { 42 }\n```"),
    ])
}

/// Run `check` against a fresh store of every backend
fn for_each_backend(check: impl Fn(&mut dyn ConversationStore)) {
    check(&mut InMemoryStore::new());
    check(&mut SqliteStore::open_in_memory().unwrap());

    let dir = tempdir().unwrap();
    check(&mut SqliteStore::open(&dir.path().join("conversations.db")).unwrap());
}

// =============================================================================
// Store Contract
// =============================================================================

mod contract_tests {
    use super::*;

    #[test]
    fn round_trip_with_zero_threshold() {
        for_each_backend(|store| {
            let original = conversation("round trip");
            let outcome = store
                .store_conversation(&original, sample_metadata("test", 0), 0)
                .unwrap();
            assert!(outcome.stored);

            let id = outcome.conversation_id.unwrap();
            let record = store.get_conversation(&id).unwrap().unwrap();
            assert_eq!(record.id, id);
            assert_eq!(record.conversation, original);
            assert_eq!(record.metadata.source, "test");
            assert_eq!(record.metadata.semantic, sample_metadata("test", 0).semantic);
        });
    }

    #[test]
    fn quality_gate() {
        for_each_backend(|store| {
            for (score, threshold) in [(5, 6), (6, 6), (7, 6), (0, 1), (10, 10)] {
                let before = store.count().unwrap();
                let outcome = store
                    .store_conversation(&conversation("gate"), sample_metadata("gate", score), threshold)
                    .unwrap();

                assert_eq!(outcome.stored, score >= threshold);
                assert_eq!(outcome.conversation_id.is_some(), outcome.stored);
                let expected = if outcome.stored { before + 1 } else { before };
                assert_eq!(store.count().unwrap(), expected);
            }
        });
    }

    #[test]
    fn rejection_leaves_statistics_unchanged() {
        for_each_backend(|store| {
            store
                .store_conversation(&conversation("kept"), sample_metadata("a", 8), 6)
                .unwrap();
            let before = store.get_statistics().unwrap();

            let outcome = store
                .store_conversation(&conversation("dropped"), sample_metadata("a", 7), 9)
                .unwrap();

            assert!(!outcome.stored);
            assert_eq!(store.get_statistics().unwrap(), before);
            assert_eq!(before.total_conversations, 1);
        });
    }

    #[test]
    fn ids_are_unique_and_well_formed() {
        for_each_backend(|store| {
            let same = conversation("identical content");
            let mut ids = HashSet::new();
            for _ in 0..50 {
                let id = store
                    .store_conversation(&same, sample_metadata("dup", 5), 0)
                    .unwrap()
                    .conversation_id
                    .unwrap();
                assert!(id.starts_with("conv_"));
                assert_eq!(id.len(), "conv_20250101_000000_abcdef".len());
                ids.insert(id);
            }
            assert_eq!(ids.len(), 50);
        });
    }

    #[test]
    fn unknown_id_is_none() {
        for_each_backend(|store| {
            assert!(store.get_conversation("conv_missing").unwrap().is_none());
        });
    }
}

// =============================================================================
// Queries
// =============================================================================

mod query_tests {
    use super::*;

    #[test]
    fn get_by_quality_is_inclusive_and_ordered() {
        for_each_backend(|store| {
            for (text, score) in [("nine", 9), ("six", 6), ("three", 3)] {
                store
                    .store_conversation(&conversation(text), sample_metadata(text, score), 0)
                    .unwrap();
            }

            let found = store.get_by_quality(5, 10).unwrap();
            let scores: Vec<u8> = found.iter().map(|r| r.quality_score()).collect();
            assert_eq!(scores, vec![9, 6]);

            let exact = store.get_by_quality(6, 6).unwrap();
            assert_eq!(exact.len(), 1);
            assert_eq!(exact[0].metadata.source, "six");

            assert!(store.get_by_quality(10, 10).unwrap().is_empty());
        });
    }

    #[test]
    fn search_by_entities() {
        for_each_backend(|store| {
            store
                .store_conversation(&conversation("rs"), sample_metadata("rs", 5), 0)
                .unwrap();

            let files = [EntityType::File];
            let hit = store
                .search_by_entities(&files, &["main.rs".to_string(), "lib.rs".to_string()])
                .unwrap();
            assert_eq!(hit.len(), 1);

            // Right value, wrong type
            let wrong_type = store
                .search_by_entities(&[EntityType::Class], &["main.rs".to_string()])
                .unwrap();
            assert!(wrong_type.is_empty());

            // Empty filter lists match nothing
            assert!(store.search_by_entities(&[], &["main.rs".to_string()]).unwrap().is_empty());
            assert!(store.search_by_entities(&files, &[]).unwrap().is_empty());
        });
    }

    #[test]
    fn find_with_source_and_limit() {
        for_each_backend(|store| {
            for (source, score) in [("a", 7), ("b", 7), ("a", 8), ("a", 2)] {
                store
                    .store_conversation(&conversation(source), sample_metadata(source, score), 0)
                    .unwrap();
            }

            let from_a = store
                .find(&ConversationFilter::new().with_source("a").with_min_quality(5))
                .unwrap();
            let scores: Vec<u8> = from_a.iter().map(|r| r.quality_score()).collect();
            assert_eq!(scores, vec![7, 8]);

            let first_two = store.list_conversations(Some(2)).unwrap();
            assert_eq!(first_two.len(), 2);
            assert_eq!(first_two[0].metadata.source, "a");
            assert_eq!(first_two[1].metadata.source, "b");

            assert_eq!(store.list_conversations(None).unwrap().len(), 4);
        });
    }
}

// =============================================================================
// Statistics
// =============================================================================

mod statistics_tests {
    use super::*;

    #[test]
    fn empty_store_statistics() {
        for_each_backend(|store| {
            let stats = store.get_statistics().unwrap();
            assert_eq!(stats.total_conversations, 0);
            assert_eq!(stats.avg_quality_score, 0.0);
            assert_eq!(stats.quality_distribution, QualityDistribution::default());
            assert_eq!(stats.total_entities, 0);
            assert_eq!(stats.total_intents, 0);
        });
    }

    #[test]
    fn statistics_aggregate_all_records() {
        for_each_backend(|store| {
            for score in [9, 8, 6, 4, 3] {
                store
                    .store_conversation(&conversation("stats"), sample_metadata("s", score), 0)
                    .unwrap();
            }

            let stats = store.get_statistics().unwrap();
            assert_eq!(stats.total_conversations, 5);
            assert!((stats.avg_quality_score - 6.0).abs() < 1e-9);
            assert_eq!(
                stats.quality_distribution,
                QualityDistribution {
                    excellent: 2,
                    good: 1,
                    fair: 1,
                    poor: 1,
                }
            );
            // sample records carry one entity and one intent each
            assert_eq!(stats.total_entities, 5);
            assert_eq!(stats.total_intents, 5);
        });
    }
}

// =============================================================================
// Persistence
// =============================================================================

mod persistence_tests {
    use super::*;

    #[test]
    fn sqlite_store_survives_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data").join("conversations.db");

        let id = {
            let mut store = SqliteStore::open(&path).unwrap();
            store
                .store_conversation(&conversation("persist"), sample_metadata("disk", 7), 6)
                .unwrap()
                .conversation_id
                .unwrap()
        };

        let store = SqliteStore::open(&path).unwrap();
        assert_eq!(store.count().unwrap(), 1);
        let record = store.get_conversation(&id).unwrap().unwrap();
        assert_eq!(record.metadata.source, "disk");
        assert_eq!(
            store
                .search_by_entities(&[EntityType::File], &["main.rs".to_string()])
                .unwrap()
                .len(),
            1
        );
    }
}
