use std::sync::Arc;

use tracing::debug;

use backend::WordDrillGateway;
use vocab_core::Clock;
use vocab_core::model::{GradingMode, WordDrillConfig, WordDrillReport};

use crate::drill::DrillSession;
use crate::error::DrillError;
use crate::prompt::plan_word_queue;

/// Orchestrates word sessions: queue fetch, planning, and the one-shot
/// end-of-session report.
#[derive(Clone)]
pub struct WordDrillService {
    clock: Clock,
    gateway: Arc<dyn WordDrillGateway>,
}

impl WordDrillService {
    #[must_use]
    pub fn new(clock: Clock, gateway: Arc<dyn WordDrillGateway>) -> Self {
        Self { clock, gateway }
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    /// Fetch, plan, and start a session for the given configuration.
    ///
    /// Replaying with the same configuration goes through here again and
    /// replans the queue. Callers must let an in-flight start finish before
    /// issuing another.
    ///
    /// # Errors
    ///
    /// Returns `DrillError::EmptyQueue` when the backend returns no usable
    /// items; the session does not start and the caller should suggest
    /// loosening filters. Fetch failures surface as `DrillError::Backend`.
    pub async fn start(&self, config: &WordDrillConfig) -> Result<DrillSession, DrillError> {
        let words = self.gateway.fetch_queue(config.time_limit_secs()).await?;
        debug!(count = words.len(), direction = %config.direction(), "planning word queue");

        let mut rng = rand::rng();
        let items = plan_word_queue(&words, config.direction(), &mut rng);
        if items.is_empty() {
            return Err(DrillError::EmptyQueue);
        }

        DrillSession::start(
            items,
            GradingMode::from_ungraded_flag(config.ungraded()),
            config.time_limit_secs(),
            self.clock.now(),
        )
    }

    /// Deliver the end-of-session report, at most once per session.
    ///
    /// Returns `Ok(true)` when a report was sent by this call, `Ok(false)`
    /// when the session is still active or the report already went out. A
    /// failed delivery leaves the latch open, so calling again retries; the
    /// summary is derived from local state and is never blocked by this.
    ///
    /// # Errors
    ///
    /// Returns `DrillError::Backend` when delivery fails.
    pub async fn report_if_ended(
        &self,
        session: &mut DrillSession,
        config: &WordDrillConfig,
    ) -> Result<bool, DrillError> {
        if !session.is_ended() || session.reported() {
            return Ok(false);
        }

        let report = WordDrillReport {
            config: config.clone(),
            results: session.results().to_vec(),
            total_attempts: session.attempts(),
            correct: session.correct_count(),
        };
        self.gateway.submit_report(&report).await?;
        session.mark_reported();
        Ok(true)
    }
}
