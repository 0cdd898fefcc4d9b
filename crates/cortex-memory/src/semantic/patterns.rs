//! Multi-turn pattern detection

use crate::config::{ExtractionConfig, WorkflowDefinition};
use crate::semantic::intents::intent_types;
use crate::semantic::keywords::TextIndex;
use crate::semantic::types::{IntentType, Pattern, PatternKind};
use crate::transcript::{ParsedConversation, Role};

const PROBLEM_SOLUTION: &str = "problem_solution";
const SUMMARY_CHARS: usize = 80;

/// Problem-solution pairs first, then every configured workflow that occurs.
/// `turn_indexes` holds one [`TextIndex`] per turn.
pub(crate) fn detect_patterns(
    conversation: &ParsedConversation,
    turn_indexes: &[TextIndex],
    config: &ExtractionConfig,
) -> Vec<Pattern> {
    let mut patterns = problem_solution_pairs(conversation, turn_indexes, config);

    let per_turn: Vec<Vec<IntentType>> = turn_indexes
        .iter()
        .map(|index| intent_types(index, &config.intent_keywords))
        .collect();

    for workflow in &config.workflows {
        if let Some(turns) = match_workflow(workflow, &per_turn) {
            patterns.push(Pattern {
                kind: PatternKind::Workflow,
                name: workflow.name.clone(),
                turns,
                summary: workflow
                    .steps
                    .iter()
                    .map(IntentType::as_str)
                    .collect::<Vec<_>>()
                    .join(" -> "),
            });
        }
    }

    patterns
}

/// A user turn expressing a need, answered by a later assistant turn that
/// carries code or a solution marker.
fn problem_solution_pairs(
    conversation: &ParsedConversation,
    turn_indexes: &[TextIndex],
    config: &ExtractionConfig,
) -> Vec<Pattern> {
    let mut patterns = Vec::new();
    let mut open_need: Option<usize> = None;

    for (i, (turn, index)) in conversation.turns.iter().zip(turn_indexes).enumerate() {
        match turn.role {
            Role::User => {
                if open_need.is_none() && index.matches_any(&config.need_markers) {
                    open_need = Some(i);
                }
            }
            Role::Assistant => {
                let Some(need) = open_need else { continue };
                if turn.has_code() || index.matches_any(&config.solution_markers) {
                    patterns.push(Pattern {
                        kind: PatternKind::ProblemSolution,
                        name: PROBLEM_SOLUTION.to_string(),
                        turns: vec![need, i],
                        summary: summarize(&conversation.turns[need].plain_text()),
                    });
                    open_need = None;
                }
            }
        }
    }

    patterns
}

/// Earliest turn indices at which the workflow steps occur in order, each in
/// a strictly later turn than the one before.
fn match_workflow(workflow: &WorkflowDefinition, per_turn: &[Vec<IntentType>]) -> Option<Vec<usize>> {
    if workflow.steps.is_empty() {
        return None;
    }

    let mut turns = Vec::with_capacity(workflow.steps.len());
    let mut start = 0;

    for step in &workflow.steps {
        let offset = per_turn[start..]
            .iter()
            .position(|intents| intents.contains(step))?;
        let turn = start + offset;
        turns.push(turn);
        start = turn + 1;
    }

    Some(turns)
}

fn summarize(text: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= SUMMARY_CHARS {
        collapsed
    } else {
        let mut cut: String = collapsed.chars().take(SUMMARY_CHARS).collect();
        cut.push_str("...");
        cut
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript::{TranscriptFormat, Turn};
    use chrono::Utc;

    fn conversation(turns: &[(Role, &str)]) -> ParsedConversation {
        ParsedConversation::new(
            turns.iter().map(|(r, c)| Turn::new(*r, *c)).collect(),
            TranscriptFormat::Text,
            Utc::now(),
        )
    }

    fn detect(conv: &ParsedConversation) -> Vec<Pattern> {
        let indexes: Vec<_> = conv.turns.iter().map(|t| TextIndex::new(&t.content)).collect();
        detect_patterns(conv, &indexes, &ExtractionConfig::default())
    }

    #[test]
    fn test_problem_solution_with_code() {
        let conv = conversation(&[
            (Role::User, "I need a login endpoint"),
            (Role::Assistant, "Sure:\n```python\ndef login(): pass\n```"),
        ]);

        let patterns = detect(&conv);
        let ps: Vec<_> = patterns
            .iter()
            .filter(|p| p.kind == PatternKind::ProblemSolution)
            .collect();
        assert_eq!(ps.len(), 1);
        assert_eq!(ps[0].turns, vec![0, 1]);
        assert_eq!(ps[0].summary, "I need a login endpoint");
    }

    #[test]
    fn test_problem_without_answer_is_not_a_pattern() {
        let conv = conversation(&[
            (Role::User, "There is a bug in the parser"),
            (Role::Assistant, "Interesting, tell me more"),
        ]);
        assert!(detect(&conv)
            .iter()
            .all(|p| p.kind != PatternKind::ProblemSolution));
    }

    #[test]
    fn test_solution_marker_without_code() {
        let conv = conversation(&[
            (Role::User, "The build is broken"),
            (Role::Assistant, "Okay"),
            (Role::Assistant, "I've fixed the import order"),
        ]);
        let patterns = detect(&conv);
        let ps = patterns
            .iter()
            .find(|p| p.kind == PatternKind::ProblemSolution)
            .unwrap();
        assert_eq!(ps.turns, vec![0, 2]);
    }

    #[test]
    fn test_workflow_requires_order_across_turns() {
        let conv = conversation(&[
            (Role::User, "Let's design the approach first"),
            (Role::Assistant, "Agreed"),
            (Role::User, "Now implement it"),
        ]);
        let patterns = detect(&conv);
        let wf = patterns
            .iter()
            .find(|p| p.name == "plan_then_execute")
            .unwrap();
        assert_eq!(wf.kind, PatternKind::Workflow);
        assert_eq!(wf.turns, vec![0, 2]);
        assert_eq!(wf.summary, "PLAN -> EXECUTE");

        let reversed = conversation(&[
            (Role::User, "Now implement it"),
            (Role::User, "Let's design the approach first"),
        ]);
        assert!(detect(&reversed)
            .iter()
            .all(|p| p.name != "plan_then_execute"));
    }

    #[test]
    fn test_summary_truncated() {
        let long = format!("please help {}", "x".repeat(200));
        assert_eq!(summarize(&long).chars().count(), SUMMARY_CHARS + 3);
    }
}
