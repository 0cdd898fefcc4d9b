//! Keyword-based intent classification

use crate::config::IntentKeywords;
use crate::semantic::keywords::TextIndex;
use crate::semantic::types::{Intent, IntentType};

/// Detect intents in `index`. Confidence is the number of distinct keywords
/// matched divided by `saturation`, capped at 1.0. Output follows
/// [`IntentType::ALL`] order.
pub(crate) fn detect_intents(
    index: &TextIndex,
    keywords: &IntentKeywords,
    saturation: usize,
) -> Vec<Intent> {
    let saturation = saturation.max(1) as f32;

    IntentType::ALL
        .iter()
        .filter_map(|&intent_type| {
            let matched = index.count_matching(keywords.for_intent(intent_type));
            (matched > 0).then(|| Intent {
                intent_type,
                confidence: (matched as f32 / saturation).min(1.0),
            })
        })
        .collect()
}

/// Intent types present in `index`, without confidences
pub(crate) fn intent_types(index: &TextIndex, keywords: &IntentKeywords) -> Vec<IntentType> {
    IntentType::ALL
        .iter()
        .copied()
        .filter(|&t| index.matches_any(keywords.for_intent(t)))
        .collect()
}
