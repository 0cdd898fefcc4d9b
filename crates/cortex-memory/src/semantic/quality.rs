//! Quality scoring
//!
//! Six additive factors, 0-10 in total:
//!
//! | factor           | points | awarded when                              |
//! |------------------|--------|-------------------------------------------|
//! | code             | 2      | any turn carries a code block             |
//! | multi_turn       | 2      | turn count reaches `min_turns`            |
//! | technical_depth  | 0-2    | technical-term density crosses thresholds |
//! | problem_solution | 1      | a problem-solution pattern was detected   |
//! | clarity          | 0-2    | few turns contain ambiguity markers       |
//! | length           | 1      | content reaches `min_content_length`      |

use std::collections::HashSet;

use crate::config::ExtractionConfig;
use crate::semantic::keywords::TextIndex;
use crate::semantic::types::{Pattern, PatternKind, QualityBreakdown};
use crate::transcript::ParsedConversation;

pub(crate) struct QualityInputs<'a> {
    pub conversation: &'a ParsedConversation,
    pub full_text: &'a TextIndex,
    pub turn_indexes: &'a [TextIndex],
    pub patterns: &'a [Pattern],
    pub technical_terms: &'a HashSet<String>,
}

pub(crate) fn score(inputs: &QualityInputs<'_>, config: &ExtractionConfig) -> QualityBreakdown {
    let conversation = inputs.conversation;
    if conversation.is_empty() {
        return QualityBreakdown::default();
    }

    let quality = &config.quality;
    let word_count = inputs.full_text.token_count();

    let technical_depth = if word_count == 0 {
        0
    } else {
        let density = inputs.full_text.occurrences(inputs.technical_terms) as f32 / word_count as f32;
        if density >= quality.technical_density_high {
            2
        } else if density >= quality.technical_density_low {
            1
        } else {
            0
        }
    };

    let clarity = if word_count == 0 {
        0
    } else {
        let ambiguous_turns = inputs
            .turn_indexes
            .iter()
            .filter(|index| index.matches_any(&config.ambiguity_markers))
            .count();
        if ambiguous_turns == 0 {
            2
        } else if ambiguous_turns * 2 <= conversation.turn_count {
            1
        } else {
            0
        }
    };

    QualityBreakdown {
        code: if conversation.has_code { 2 } else { 0 },
        multi_turn: if conversation.turn_count >= quality.min_turns { 2 } else { 0 },
        technical_depth,
        problem_solution: if inputs
            .patterns
            .iter()
            .any(|p| p.kind == PatternKind::ProblemSolution)
        {
            1
        } else {
            0
        },
        clarity,
        length: if conversation.content_length() >= quality.min_content_length {
            1
        } else {
            0
        },
    }
}
