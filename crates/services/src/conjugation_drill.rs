use std::sync::Arc;

use tracing::debug;

use backend::ConjugationDrillGateway;
use vocab_core::Clock;
use vocab_core::model::{ConjugationDrillConfig, ConjugationDrillReport, GradingMode};

use crate::drill::DrillSession;
use crate::error::DrillError;
use crate::prompt::plan_conjugation_queue;

/// Orchestrates conjugation sessions: filtered queue fetch, planning, and
/// the one-shot end-of-session report.
#[derive(Clone)]
pub struct ConjugationDrillService {
    clock: Clock,
    gateway: Arc<dyn ConjugationDrillGateway>,
}

impl ConjugationDrillService {
    #[must_use]
    pub fn new(clock: Clock, gateway: Arc<dyn ConjugationDrillGateway>) -> Self {
        Self { clock, gateway }
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    /// Fetch, plan, and start a session for the given configuration.
    ///
    /// Unconstrained filter dimensions are omitted from the request by the
    /// gateway; the server applies the rest.
    ///
    /// # Errors
    ///
    /// Returns `DrillError::EmptyQueue` when nothing matches the filters;
    /// the session does not start and the caller should suggest loosening
    /// them. Fetch failures surface as `DrillError::Backend`.
    pub async fn start(&self, config: &ConjugationDrillConfig) -> Result<DrillSession, DrillError> {
        let conjugations = self.gateway.fetch_queue(config).await?;
        debug!(count = conjugations.len(), "planning conjugation queue");

        let items = plan_conjugation_queue(&conjugations);
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
    /// Same contract as the word variant: a failed delivery leaves the latch
    /// open for a retry and never invalidates the locally derived summary.
    ///
    /// # Errors
    ///
    /// Returns `DrillError::Backend` when delivery fails.
    pub async fn report_if_ended(
        &self,
        session: &mut DrillSession,
        config: &ConjugationDrillConfig,
    ) -> Result<bool, DrillError> {
        if !session.is_ended() || session.reported() {
            return Ok(false);
        }

        let report = ConjugationDrillReport {
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
