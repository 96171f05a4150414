use thiserror::Error;

use crate::model::{ConjugationDrillConfig, WordDrillConfig};

/// How many results the slowest-items table keeps.
const SLOWEST_TABLE_SIZE: usize = 10;

//
// ─── ATTEMPT RESULTS ───────────────────────────────────────────────────────────
//

/// Outcome of one answered queue item.
///
/// Appended exactly once per item (or, in ungraded mode, once on the first
/// exact match) and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptResult {
    /// Raw id of the underlying word or conjugation row.
    pub item_id: u64,
    /// What the learner saw as the prompt, for summary tables.
    pub display_label: String,
    pub user_answer: String,
    pub correct_answer: String,
    pub correct: bool,
    pub time_spent_secs: u32,
}

//
// ─── SESSION SUMMARY ───────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SummaryError {
    #[error("too many results for a single session: {len}")]
    TooManyResults { len: usize },
}

/// Aggregate summary for a finished session.
#[derive(Debug, Clone, PartialEq)]
pub struct DrillSummary {
    attempts: u32,
    correct: u32,
    accuracy_pct: f64,
    mistakes: Vec<AttemptResult>,
    slowest: Vec<AttemptResult>,
}

impl DrillSummary {
    /// Build a summary from a frozen result log.
    ///
    /// The input order is the answer order; mistakes keep it, and the
    /// slowest table breaks ties by it (stable sort).
    ///
    /// # Errors
    ///
    /// Returns `SummaryError::TooManyResults` if the result count cannot fit
    /// in `u32`.
    pub fn from_results(results: &[AttemptResult]) -> Result<Self, SummaryError> {
        let attempts = u32::try_from(results.len()).map_err(|_| SummaryError::TooManyResults {
            len: results.len(),
        })?;
        let correct = u32::try_from(results.iter().filter(|r| r.correct).count())
            .unwrap_or(attempts);

        let accuracy_pct = if attempts == 0 {
            0.0
        } else {
            let raw = f64::from(correct) / f64::from(attempts) * 100.0;
            (raw * 100.0).round() / 100.0
        };

        let mistakes: Vec<AttemptResult> =
            results.iter().filter(|r| !r.correct).cloned().collect();

        let mut slowest: Vec<AttemptResult> = results.to_vec();
        slowest.sort_by_key(|r| std::cmp::Reverse(r.time_spent_secs));
        slowest.truncate(SLOWEST_TABLE_SIZE);

        Ok(Self {
            attempts,
            correct,
            accuracy_pct,
            mistakes,
            slowest,
        })
    }

    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    #[must_use]
    pub fn correct(&self) -> u32 {
        self.correct
    }

    /// Accuracy in percent, rounded to two decimals; zero for an empty log.
    #[must_use]
    pub fn accuracy_pct(&self) -> f64 {
        self.accuracy_pct
    }

    #[must_use]
    pub fn is_perfect(&self) -> bool {
        self.attempts > 0 && self.correct == self.attempts
    }

    /// Wrong answers in the order they happened.
    #[must_use]
    pub fn mistakes(&self) -> &[AttemptResult] {
        &self.mistakes
    }

    /// Up to ten results, slowest first.
    #[must_use]
    pub fn slowest(&self) -> &[AttemptResult] {
        &self.slowest
    }
}

//
// ─── END-OF-SESSION REPORTS ────────────────────────────────────────────────────
//

/// Frozen snapshot sent to the backend when a word session ends.
#[derive(Debug, Clone, PartialEq)]
pub struct WordDrillReport {
    pub config: WordDrillConfig,
    pub results: Vec<AttemptResult>,
    pub total_attempts: u32,
    pub correct: u32,
}

/// Frozen snapshot sent to the backend when a conjugation session ends.
#[derive(Debug, Clone, PartialEq)]
pub struct ConjugationDrillReport {
    pub config: ConjugationDrillConfig,
    pub results: Vec<AttemptResult>,
    pub total_attempts: u32,
    pub correct: u32,
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
