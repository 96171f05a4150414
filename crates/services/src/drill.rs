//! The session state machine.
//!
//! A `DrillSession` owns the planned queue, the result log, and the timer
//! bookkeeping. All transitions are explicit methods reacting to discrete
//! events (a timer tick, a submitted answer, a keystroke) and each has a
//! single postcondition. Nothing here talks to the network; orchestration
//! lives in `word_drill` / `conjugation_drill`.

use chrono::{DateTime, Utc};

use vocab_core::model::{AttemptResult, DrillSummary, GradingMode};
use vocab_core::time::{elapsed_secs, remaining_secs};

use crate::error::DrillError;
use crate::grading::{is_match, normalize_answer};
use crate::prompt::PlannedItem;

//
// ─── PHASES & EVENT OUTCOMES ───────────────────────────────────────────────────
//

/// Lifecycle phase as exposed to the presentation layer.
///
/// `Idle` and `Loading` describe the time before a session object exists
/// (configuring, queue fetch in flight); a constructed session is `Active`
/// until its one-shot end transition, then `Ended` forever.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrillPhase {
    Idle,
    Loading,
    Active,
    Ended,
}

/// Result of a timer tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Still running; the recomputed remaining time.
    Running { remaining_secs: u32 },
    /// The deadline passed (or the session had already ended).
    Expired,
}

/// Result of a graded submit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Blank input, or submit in ungraded mode: a no-op, nothing logged.
    Ignored,
    /// The attempt was logged and the queue advanced.
    Answered { correct: bool, session_ended: bool },
}

/// Result of an ungraded input change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputOutcome {
    /// Input change in graded mode: real-time checking is off.
    Ignored,
    /// No match yet; transient feedback only, nothing logged.
    Pending,
    /// First exact match: one correct result logged, queue advanced.
    Matched { session_ended: bool },
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// A running (or finished) drill session.
///
/// Owns its state exclusively; collaborators only ever see the frozen result
/// log and the read accessors.
#[derive(Debug, Clone)]
pub struct DrillSession {
    items: Vec<PlannedItem>,
    grading: GradingMode,
    time_limit_secs: u32,
    current: usize,
    results: Vec<AttemptResult>,
    correct: u32,
    attempts: u32,
    started_at: DateTime<Utc>,
    item_started_at: DateTime<Utc>,
    remaining_secs: u32,
    ended_at: Option<DateTime<Utc>>,
    reported: bool,
}

impl DrillSession {
    /// Start a session over a planned queue.
    ///
    /// The wall-clock deadline and the first item's timer both start at
    /// `started_at`.
    ///
    /// # Errors
    ///
    /// Returns `DrillError::EmptyQueue` for an empty queue; the session
    /// never becomes `Active` with nothing to present.
    pub fn start(
        items: Vec<PlannedItem>,
        grading: GradingMode,
        time_limit_secs: u32,
        started_at: DateTime<Utc>,
    ) -> Result<Self, DrillError> {
        if items.is_empty() {
            return Err(DrillError::EmptyQueue);
        }
        Ok(Self {
            items,
            grading,
            time_limit_secs,
            current: 0,
            results: Vec::new(),
            correct: 0,
            attempts: 0,
            started_at,
            item_started_at: started_at,
            remaining_secs: time_limit_secs,
            ended_at: None,
            reported: false,
        })
    }

    //
    // ─── ACCESSORS ─────────────────────────────────────────────────────────────
    //

    #[must_use]
    pub fn phase(&self) -> DrillPhase {
        if self.is_ended() {
            DrillPhase::Ended
        } else {
            DrillPhase::Active
        }
    }

    #[must_use]
    pub fn is_ended(&self) -> bool {
        self.ended_at.is_some()
    }

    #[must_use]
    pub fn grading(&self) -> GradingMode {
        self.grading
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn ended_at(&self) -> Option<DateTime<Utc>> {
        self.ended_at
    }

    /// The item currently presented, or `None` once the session has ended.
    #[must_use]
    pub fn current_item(&self) -> Option<&PlannedItem> {
        if self.is_ended() {
            return None;
        }
        self.items.get(self.current)
    }

    #[must_use]
    pub fn total_items(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.results.len()
    }

    #[must_use]
    pub fn results(&self) -> &[AttemptResult] {
        &self.results
    }

    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    #[must_use]
    pub fn correct_count(&self) -> u32 {
        self.correct
    }

    /// Remaining time as of the last tick (or transition).
    #[must_use]
    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    /// Running accuracy in percent, zero before the first attempt.
    #[must_use]
    pub fn live_accuracy_pct(&self) -> f64 {
        if self.attempts == 0 {
            return 0.0;
        }
        let raw = f64::from(self.correct) / f64::from(self.attempts) * 100.0;
        (raw * 100.0).round() / 100.0
    }

    /// Whether the end-of-session report has been handed to the backend.
    #[must_use]
    pub fn reported(&self) -> bool {
        self.reported
    }

    /// Latch the one-shot report as delivered.
    pub fn mark_reported(&mut self) {
        self.reported = true;
    }

    //
    // ─── TRANSITIONS ───────────────────────────────────────────────────────────
    //

    /// Timer tick: recompute remaining time from the wall clock.
    ///
    /// Postcondition: `remaining_secs` reflects `now`; the session ends when
    /// it hits zero. Never logs a result: an in-progress answer is simply
    /// discarded at expiry. Ticking an ended session reports `Expired`
    /// without further effect.
    pub fn on_tick(&mut self, now: DateTime<Utc>) -> TickOutcome {
        if self.is_ended() {
            return TickOutcome::Expired;
        }
        self.remaining_secs = remaining_secs(self.started_at, now, self.time_limit_secs);
        if self.remaining_secs == 0 {
            self.end(now);
            return TickOutcome::Expired;
        }
        TickOutcome::Running {
            remaining_secs: self.remaining_secs,
        }
    }

    /// Graded submit: log the attempt (right or wrong) and advance.
    ///
    /// Postcondition: exactly one result is appended unless the input was
    /// blank or the session is in ungraded mode, which are no-ops.
    ///
    /// # Errors
    ///
    /// Returns `DrillError::Completed` after the session has ended.
    pub fn submit(&mut self, input: &str, now: DateTime<Utc>) -> Result<SubmitOutcome, DrillError> {
        if self.is_ended() {
            return Err(DrillError::Completed);
        }
        if self.grading.is_ungraded() {
            return Ok(SubmitOutcome::Ignored);
        }

        let answer = normalize_answer(input);
        if answer.is_empty() {
            return Ok(SubmitOutcome::Ignored);
        }

        let Some(item) = self.items.get(self.current).cloned() else {
            // Defensive: an active session with no current item ends rather
            // than presenting nothing.
            self.end(now);
            return Err(DrillError::Completed);
        };

        let correct = is_match(&answer, item.expected());
        self.record_attempt(item, answer, correct, now);
        let session_ended = self.advance(now);
        Ok(SubmitOutcome::Answered {
            correct,
            session_ended,
        })
    }

    /// Ungraded keystroke: re-evaluate the current input.
    ///
    /// Postcondition: on the first exact match, exactly one correct result
    /// is appended and the queue advances; otherwise nothing is logged, and a
    /// near-miss is transient feedback, not an attempt.
    ///
    /// # Errors
    ///
    /// Returns `DrillError::Completed` after the session has ended.
    pub fn update_input(
        &mut self,
        input: &str,
        now: DateTime<Utc>,
    ) -> Result<InputOutcome, DrillError> {
        if self.is_ended() {
            return Err(DrillError::Completed);
        }
        if !self.grading.is_ungraded() {
            return Ok(InputOutcome::Ignored);
        }

        let Some(item) = self.items.get(self.current).cloned() else {
            self.end(now);
            return Err(DrillError::Completed);
        };

        if !is_match(input, item.expected()) {
            return Ok(InputOutcome::Pending);
        }

        let answer = normalize_answer(input);
        self.record_attempt(item, answer, true, now);
        let session_ended = self.advance(now);
        Ok(InputOutcome::Matched { session_ended })
    }

    /// Manual end (e.g. a quit-to-summary action).
    ///
    /// Idempotent; racing the timer cannot end a session twice.
    pub fn finish(&mut self, now: DateTime<Utc>) {
        self.end(now);
    }

    /// Summary over the frozen result log.
    ///
    /// # Errors
    ///
    /// Returns `DrillError::StillActive` before the session has ended.
    pub fn summary(&self) -> Result<DrillSummary, DrillError> {
        if !self.is_ended() {
            return Err(DrillError::StillActive);
        }
        Ok(DrillSummary::from_results(&self.results)?)
    }

    //
    // ─── INTERNAL ──────────────────────────────────────────────────────────────
    //

    fn record_attempt(
        &mut self,
        item: PlannedItem,
        user_answer: String,
        correct: bool,
        now: DateTime<Utc>,
    ) {
        self.results.push(AttemptResult {
            item_id: item.id(),
            display_label: item.label().to_string(),
            user_answer,
            correct_answer: item.answer_display().to_string(),
            correct,
            time_spent_secs: elapsed_secs(self.item_started_at, now),
        });
        self.attempts += 1;
        if correct {
            self.correct += 1;
        }
    }

    /// Move to the next item; ends the session when the queue is exhausted.
    /// The per-item timer restarts the moment the next item is shown.
    fn advance(&mut self, now: DateTime<Utc>) -> bool {
        self.current += 1;
        if self.current >= self.items.len() {
            self.end(now);
            return true;
        }
        self.item_started_at = now;
        false
    }

    /// One-shot end transition; every later call is a no-op.
    fn end(&mut self, now: DateTime<Utc>) {
        if self.ended_at.is_none() {
            self.ended_at = Some(now);
            self.remaining_secs = remaining_secs(self.started_at, now, self.time_limit_secs);
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use vocab_core::model::{Direction, WordDraft, WordId};
    use vocab_core::time::fixed_now;

    use crate::prompt::plan_word_item;

    fn item(id: u64, word: &str, translation: &str) -> PlannedItem {
        let w = WordDraft {
            word: word.into(),
            translations: vec![translation.into()],
            part_of_speech: None,
            article: None,
        }
        .validate(WordId::new(id))
        .unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        plan_word_item(&w, Direction::SourceToTarget, &mut rng).unwrap()
    }

    fn queue(n: u64) -> Vec<PlannedItem> {
        (1..=n).map(|i| item(i, &format!("mot{i}"), &format!("word{i}"))).collect()
    }

    fn graded(n: u64, limit: u32) -> DrillSession {
        DrillSession::start(queue(n), GradingMode::Graded, limit, fixed_now()).unwrap()
    }

    fn ungraded(n: u64, limit: u32) -> DrillSession {
        DrillSession::start(queue(n), GradingMode::Ungraded, limit, fixed_now()).unwrap()
    }

    #[test]
    fn empty_queue_never_starts() {
        let err =
            DrillSession::start(Vec::new(), GradingMode::Graded, 120, fixed_now()).unwrap_err();
        assert!(matches!(err, DrillError::EmptyQueue));
    }

    #[test]
    fn graded_session_logs_right_and_wrong_and_ends_on_exhaustion() {
        let mut session = graded(2, 120);
        let t1 = fixed_now() + Duration::seconds(5);
        let out = session.submit("word1", t1).unwrap();
        assert_eq!(
            out,
            SubmitOutcome::Answered {
                correct: true,
                session_ended: false
            }
        );

        let t2 = t1 + Duration::seconds(7);
        let out = session.submit("nope", t2).unwrap();
        assert_eq!(
            out,
            SubmitOutcome::Answered {
                correct: false,
                session_ended: true
            }
        );

        assert_eq!(session.phase(), DrillPhase::Ended);
        assert_eq!(session.attempts(), 2);
        assert_eq!(session.correct_count(), 1);
        // attempts == correct + incorrect in graded mode.
        let wrong = session.results().iter().filter(|r| !r.correct).count();
        assert_eq!(session.attempts() as usize, session.results().len());
        assert_eq!(wrong, 1);
        // Ended by exhaustion, not timeout: time was still on the clock.
        assert!(session.remaining_secs() > 0);
    }

    #[test]
    fn per_item_timer_resets_on_advance() {
        let mut session = graded(2, 300);
        let t1 = fixed_now() + Duration::seconds(10);
        session.submit("word1", t1).unwrap();
        let t2 = t1 + Duration::seconds(4);
        session.submit("word2", t2).unwrap();

        let times: Vec<u32> = session.results().iter().map(|r| r.time_spent_secs).collect();
        assert_eq!(times, [10, 4]);
    }

    #[test]
    fn blank_submit_is_a_no_op() {
        let mut session = graded(1, 120);
        let out = session.submit("   ", fixed_now()).unwrap();
        assert_eq!(out, SubmitOutcome::Ignored);
        assert_eq!(session.attempts(), 0);
        assert!(session.results().is_empty());
        assert_eq!(session.phase(), DrillPhase::Active);
    }

    #[test]
    fn submit_is_ignored_in_ungraded_mode() {
        let mut session = ungraded(1, 120);
        let out = session.submit("word1", fixed_now()).unwrap();
        assert_eq!(out, SubmitOutcome::Ignored);
        assert!(session.results().is_empty());
    }

    #[test]
    fn ungraded_logs_only_the_first_exact_match() {
        let mut session = ungraded(1, 120);
        let t = fixed_now() + Duration::seconds(3);

        assert_eq!(session.update_input("w", t).unwrap(), InputOutcome::Pending);
        assert_eq!(session.update_input("wor", t).unwrap(), InputOutcome::Pending);
        assert_eq!(
            session.update_input("word1", t).unwrap(),
            InputOutcome::Matched { session_ended: true }
        );

        // Two partial inputs produced zero logged results.
        assert_eq!(session.results().len(), 1);
        assert!(session.results()[0].correct);
        assert_eq!(session.attempts(), 1);
        assert_eq!(session.correct_count(), 1);
    }

    #[test]
    fn ungraded_never_logs_a_wrong_result() {
        let mut session = ungraded(2, 120);
        let t = fixed_now() + Duration::seconds(1);
        for input in ["x", "yy", "zzz"] {
            session.update_input(input, t).unwrap();
        }
        assert!(session.results().is_empty());
        // attempts == correct in ungraded mode, trivially here.
        assert_eq!(session.attempts(), session.correct_count());
    }

    #[test]
    fn input_change_is_ignored_in_graded_mode() {
        let mut session = graded(1, 120);
        let out = session.update_input("word1", fixed_now()).unwrap();
        assert_eq!(out, InputOutcome::Ignored);
        assert!(session.results().is_empty());
    }

    #[test]
    fn tick_counts_down_and_expires() {
        let mut session = graded(5, 120);
        let out = session.on_tick(fixed_now() + Duration::seconds(50));
        assert_eq!(out, TickOutcome::Running { remaining_secs: 70 });

        let out = session.on_tick(fixed_now() + Duration::seconds(120));
        assert_eq!(out, TickOutcome::Expired);
        assert_eq!(session.phase(), DrillPhase::Ended);
        assert_eq!(session.remaining_secs(), 0);
    }

    #[test]
    fn expiry_discards_the_in_progress_item() {
        let mut session = graded(5, 60);
        let t1 = fixed_now() + Duration::seconds(10);
        session.submit("word1", t1).unwrap();
        let t2 = t1 + Duration::seconds(10);
        session.submit("word2", t2).unwrap();

        // Timer fires while item 3 is on screen: no forced submission.
        session.on_tick(fixed_now() + Duration::seconds(60));
        assert_eq!(session.phase(), DrillPhase::Ended);
        assert_eq!(session.results().len(), 2);
        assert!(session.current_item().is_none());

        let err = session.submit("word3", fixed_now() + Duration::seconds(61)).unwrap_err();
        assert!(matches!(err, DrillError::Completed));
    }

    #[test]
    fn end_transition_is_one_shot() {
        let mut session = graded(1, 120);
        let t_done = fixed_now() + Duration::seconds(30);
        session.submit("word1", t_done).unwrap();
        assert_eq!(session.ended_at(), Some(t_done));

        // A racing timer tick and a manual finish change nothing.
        session.on_tick(fixed_now() + Duration::seconds(120));
        session.finish(fixed_now() + Duration::seconds(200));
        assert_eq!(session.ended_at(), Some(t_done));
    }

    #[test]
    fn summary_only_after_end() {
        let mut session = graded(1, 120);
        assert!(matches!(session.summary(), Err(DrillError::StillActive)));

        session.submit("word1", fixed_now() + Duration::seconds(2)).unwrap();
        let summary = session.summary().unwrap();
        assert_eq!(summary.attempts(), 1);
        assert_eq!(summary.correct(), 1);
        assert_eq!(summary.accuracy_pct(), 100.0);
    }

    #[test]
    fn live_accuracy_tracks_the_log() {
        let mut session = graded(3, 300);
        assert_eq!(session.live_accuracy_pct(), 0.0);
        let t = fixed_now() + Duration::seconds(1);
        session.submit("word1", t).unwrap();
        session.submit("wrong", t).unwrap();
        assert_eq!(session.live_accuracy_pct(), 50.0);
    }

    #[test]
    fn current_item_is_stable_between_reads() {
        let session = graded(3, 120);
        let a = session.current_item().unwrap().clone();
        let b = session.current_item().unwrap().clone();
        assert_eq!(a, b);
    }

    #[test]
    fn report_latch_is_sticky() {
        let mut session = graded(1, 120);
        session.submit("word1", fixed_now() + Duration::seconds(1)).unwrap();
        assert!(!session.reported());
        session.mark_reported();
        assert!(session.reported());
    }
}
