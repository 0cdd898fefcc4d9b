//! Semantic record types
//!
//! Structured facts derived from a parsed conversation: code entities,
//! conversational intents, workflow patterns and a quality score.

use serde::{Deserialize, Serialize};

/// Kind of code entity mentioned in a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    File,
    Class,
    Function,
}

impl EntityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::File => "file",
            EntityType::Class => "class",
            EntityType::Function => "function",
        }
    }

    /// Parse from a lowercase name (`file`, `class`, `function`)
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "file" => Some(EntityType::File),
            "class" => Some(EntityType::Class),
            "function" => Some(EntityType::Function),
            _ => None,
        }
    }
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A code-related noun mentioned in a conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub entity_type: EntityType,
    pub value: String,
    /// 0.0-1.0, higher when the match was keyword-anchored
    pub confidence: f32,
}

/// Coarse classification of conversational purpose
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum IntentType {
    Plan,
    Execute,
    Test,
    Fix,
    Refactor,
    Analyze,
    Explain,
}

impl IntentType {
    pub const ALL: [IntentType; 7] = [
        IntentType::Plan,
        IntentType::Execute,
        IntentType::Test,
        IntentType::Fix,
        IntentType::Refactor,
        IntentType::Analyze,
        IntentType::Explain,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IntentType::Plan => "PLAN",
            IntentType::Execute => "EXECUTE",
            IntentType::Test => "TEST",
            IntentType::Fix => "FIX",
            IntentType::Refactor => "REFACTOR",
            IntentType::Analyze => "ANALYZE",
            IntentType::Explain => "EXPLAIN",
        }
    }
}

impl std::fmt::Display for IntentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A detected intent with its confidence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Intent {
    pub intent_type: IntentType,
    pub confidence: f32,
}

/// Kind of multi-turn pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternKind {
    /// A user need answered later by an implementation or fix
    ProblemSolution,
    /// A named, configured sequence of intents
    Workflow,
}

/// A detected problem-solution pair or named workflow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pattern {
    pub kind: PatternKind,
    pub name: String,
    /// Indices of the turns that make up the pattern
    pub turns: Vec<usize>,
    pub summary: String,
}

/// Points awarded per quality factor
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityBreakdown {
    /// 0 or 2
    pub code: u8,
    /// 0 or 2
    pub multi_turn: u8,
    /// 0-2
    pub technical_depth: u8,
    /// 0 or 1
    pub problem_solution: u8,
    /// 0-2
    pub clarity: u8,
    /// 0 or 1
    pub length: u8,
}

impl QualityBreakdown {
    /// Sum of all factors, clamped to 0-10
    pub fn total(&self) -> u8 {
        let sum = self.code
            + self.multi_turn
            + self.technical_depth
            + self.problem_solution
            + self.clarity
            + self.length;
        sum.min(10)
    }
}

/// Enrichment attached to a parsed conversation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SemanticRecord {
    /// Sorted by (type, value), unique per pair
    pub entities: Vec<Entity>,
    /// Sorted by intent type, unique per type
    pub intents: Vec<Intent>,
    pub patterns: Vec<Pattern>,
    /// 0-10
    pub quality_score: u8,
    pub quality_breakdown: QualityBreakdown,
}

impl SemanticRecord {
    pub fn has_intent(&self, intent_type: IntentType) -> bool {
        self.intents.iter().any(|i| i.intent_type == intent_type)
    }

    pub fn entities_of(&self, entity_type: EntityType) -> impl Iterator<Item = &Entity> {
        self.entities
            .iter()
            .filter(move |e| e.entity_type == entity_type)
    }

    pub fn has_problem_solution(&self) -> bool {
        self.patterns
            .iter()
            .any(|p| p.kind == PatternKind::ProblemSolution)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quality_breakdown_total_clamped() {
        let breakdown = QualityBreakdown {
            code: 2,
            multi_turn: 2,
            technical_depth: 2,
            problem_solution: 1,
            clarity: 2,
            length: 1,
        };
        assert_eq!(breakdown.total(), 10);

        let over = QualityBreakdown {
            code: 9,
            multi_turn: 9,
            ..Default::default()
        };
        assert_eq!(over.total(), 10);
    }

    #[test]
    fn test_intent_type_serializes_uppercase() {
        let json = serde_json::to_string(&IntentType::Refactor).unwrap();
        assert_eq!(json, "\"REFACTOR\"");
        let parsed: IntentType = serde_json::from_str("\"EXPLAIN\"").unwrap();
        assert_eq!(parsed, IntentType::Explain);
    }

    #[test]
    fn test_entity_type_parse() {
        assert_eq!(EntityType::parse("File"), Some(EntityType::File));
        assert_eq!(EntityType::parse("function"), Some(EntityType::Function));
        assert_eq!(EntityType::parse("module"), None);
    }

    #[test]
    fn test_record_helpers() {
        let record = SemanticRecord {
            entities: vec![Entity {
                entity_type: EntityType::File,
                value: "main.rs".to_string(),
                confidence: 0.85,
            }],
            intents: vec![Intent {
                intent_type: IntentType::Fix,
                confidence: 0.5,
            }],
            ..Default::default()
        };

        assert!(record.has_intent(IntentType::Fix));
        assert!(!record.has_intent(IntentType::Plan));
        assert_eq!(record.entities_of(EntityType::File).count(), 1);
        assert!(!record.has_problem_solution());
    }
}
