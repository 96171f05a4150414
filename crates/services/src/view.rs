//! Presentation-agnostic render state for a drill screen.
//!
//! This is intentionally **not** a UI view-model:
//! - no pre-formatted strings beyond the prompt itself
//! - no layout or styling assumptions
//!
//! The presentation layer renders it however it likes and drives the session
//! through `start` / `on_tick` / `submit` / `update_input`.

use vocab_core::model::DrillSummary;

use crate::drill::{DrillPhase, DrillSession};

/// Queue progress, useful for a position indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrillProgress {
    pub total: usize,
    pub answered: usize,
    pub remaining: usize,
}

/// Everything a drill screen needs to render one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct DrillView {
    pub phase: DrillPhase,
    /// The current prompt, absent outside `Active`.
    pub prompt: Option<String>,
    /// Secondary badge for the current item (e.g. tense).
    pub tag: Option<String>,
    pub progress: Option<DrillProgress>,
    /// Seconds left; `None` when zen mode hides the timer.
    pub time_remaining_secs: Option<u32>,
    /// Running accuracy; `None` when zen mode hides the score.
    pub live_accuracy_pct: Option<f64>,
    /// Populated only once the session has ended.
    pub summary: Option<DrillSummary>,
}

impl DrillView {
    /// Render state while the user is still configuring.
    #[must_use]
    pub fn idle() -> Self {
        Self::empty(DrillPhase::Idle)
    }

    /// Render state while the queue fetch is in flight.
    #[must_use]
    pub fn loading() -> Self {
        Self::empty(DrillPhase::Loading)
    }

    /// Render state for a live or finished session.
    ///
    /// Zen mode blanks the timer and score here and nowhere else; grading
    /// and timing semantics are untouched.
    #[must_use]
    pub fn from_session(session: &DrillSession, zen: bool) -> Self {
        let current = session.current_item();
        Self {
            phase: session.phase(),
            prompt: current.map(|item| item.prompt().to_string()),
            tag: current.and_then(|item| item.tag().map(str::to_string)),
            progress: Some(DrillProgress {
                total: session.total_items(),
                answered: session.answered_count(),
                remaining: session.total_items().saturating_sub(session.answered_count()),
            }),
            time_remaining_secs: (!zen).then(|| session.remaining_secs()),
            live_accuracy_pct: (!zen).then(|| session.live_accuracy_pct()),
            summary: session.summary().ok(),
        }
    }

    fn empty(phase: DrillPhase) -> Self {
        Self {
            phase,
            prompt: None,
            tag: None,
            progress: None,
            time_remaining_secs: None,
            live_accuracy_pct: None,
            summary: None,
        }
    }
}
