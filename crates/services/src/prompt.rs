//! Queue planning: mapping raw queue items to fixed prompt/answer pairs.
//!
//! Everything random about an item (its direction in "both" mode, the
//! translation shown as a prompt) is rolled exactly once here, when the
//! queue is planned. Re-reading a planned item always yields the same prompt
//! and expected set.

use rand::Rng;
use rand::seq::IndexedRandom;
use tracing::warn;

use vocab_core::model::{Conjugation, Direction, DirectionChoice, Word};

use crate::grading::normalize_answer;

/// One queue position with its prompt and match targets, fixed for the whole
/// session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedItem {
    id: u64,
    label: String,
    prompt: String,
    tag: Option<String>,
    expected: Vec<String>,
    answer_display: String,
}

impl PlannedItem {
    /// Raw id of the underlying word or conjugation row.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// What summary tables call this item.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Secondary display badge, e.g. the tense of a conjugation item.
    #[must_use]
    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    /// Normalized match targets.
    #[must_use]
    pub fn expected(&self) -> &[String] {
        &self.expected
    }

    /// Human-readable correct answer for feedback and summaries.
    #[must_use]
    pub fn answer_display(&self) -> &str {
        &self.answer_display
    }
}

/// Remove bracketed hint spans (`[...]`) from a translation.
///
/// An unclosed bracket is kept as written.
#[must_use]
pub fn strip_hints(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(open) = rest.find('[') {
        out.push_str(&rest[..open]);
        match rest[open + 1..].find(']') {
            Some(close) => rest = &rest[open + 1 + close + 1..],
            None => {
                out.push_str(&rest[open..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out.trim().to_string()
}

/// Roll the direction for one item. "Both" is decided here, once.
pub fn assign_direction(choice: DirectionChoice, rng: &mut impl Rng) -> Direction {
    match choice {
        DirectionChoice::SourceToTarget => Direction::SourceToTarget,
        DirectionChoice::TargetToSource => Direction::TargetToSource,
        DirectionChoice::Both => {
            if rng.random_bool(0.5) {
                Direction::SourceToTarget
            } else {
                Direction::TargetToSource
            }
        }
    }
}

/// Plan a single word item for the given direction.
///
/// Returns `None` when no usable match target survives hint stripping; such
/// items are data-integrity problems and are skipped, never presented.
pub fn plan_word_item(word: &Word, direction: Direction, rng: &mut impl Rng) -> Option<PlannedItem> {
    match direction {
        Direction::SourceToTarget => {
            // The source word is shown verbatim, hints included; only the
            // translations are cleaned before matching.
            let expected: Vec<String> = word
                .translations()
                .iter()
                .map(|t| normalize_answer(&strip_hints(t)))
                .filter(|t| !t.is_empty())
                .collect();
            if expected.is_empty() {
                return None;
            }
            let answer_display = expected.join(", ");
            Some(PlannedItem {
                id: word.id().value(),
                label: word.word().to_string(),
                prompt: word.word().to_string(),
                tag: None,
                expected,
                answer_display,
            })
        }
        Direction::TargetToSource => {
            let choices: Vec<String> = word
                .translations()
                .iter()
                .map(|t| strip_hints(t))
                .filter(|t| !t.is_empty())
                .collect();
            let prompt = choices.choose(rng)?.clone();

            let full_answer = match word.article() {
                Some(article) => format!("{article} {}", word.word()),
                None => word.word().to_string(),
            };
            let expected = vec![normalize_answer(&full_answer)];
            let answer_display = expected.join(", ");
            Some(PlannedItem {
                id: word.id().value(),
                label: prompt.clone(),
                prompt,
                tag: None,
                expected,
                answer_display,
            })
        }
    }
}

/// Plan a conjugation item: `(person, verb)` prompt, tense as the badge.
#[must_use]
pub fn plan_conjugation_item(conjugation: &Conjugation) -> PlannedItem {
    PlannedItem {
        id: conjugation.id().value(),
        label: format!(
            "{} · {} · {}",
            conjugation.verb(),
            conjugation.tense(),
            conjugation.person()
        ),
        prompt: format!("{} → {}", conjugation.person(), conjugation.verb()),
        tag: Some(conjugation.tense().to_string()),
        expected: vec![normalize_answer(conjugation.conjugation())],
        answer_display: conjugation.conjugation().to_string(),
    }
}

/// Plan a whole word queue, skipping unusable items with a warning.
pub fn plan_word_queue(
    words: &[Word],
    choice: DirectionChoice,
    rng: &mut impl Rng,
) -> Vec<PlannedItem> {
    words
        .iter()
        .filter_map(|word| {
            let direction = assign_direction(choice, rng);
            let planned = plan_word_item(word, direction, rng);
            if planned.is_none() {
                warn!(word_id = word.id().value(), "skipping word with no usable match targets");
            }
            planned
        })
        .collect()
}

/// Plan a whole conjugation queue.
#[must_use]
pub fn plan_conjugation_queue(conjugations: &[Conjugation]) -> Vec<PlannedItem> {
    conjugations.iter().map(plan_conjugation_item).collect()
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
