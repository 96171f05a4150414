use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use thiserror::Error;

use vocab_core::model::{
    Conjugation, ConjugationDraft, ConjugationDrillConfig, ConjugationDrillReport, ConjugationId,
    GameOptions, PronominalFilter, VerbFilter, Word, WordDraft, WordDrillReport, WordId,
};

/// Errors surfaced by backend gateways.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GatewayError {
    #[error("backend replied with status {0}")]
    Status(u16),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("malformed response: {0}")]
    Malformed(String),
}

//
// ─── COLLABORATOR CONTRACTS ────────────────────────────────────────────────────
//

/// Queue fetch and result persistence for word sessions.
#[async_trait]
pub trait WordDrillGateway: Send + Sync {
    /// Fetch a shuffled word queue for a session.
    ///
    /// An empty queue is a valid response, not an error.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError` on transport or decoding failures.
    async fn fetch_queue(&self, time_limit_secs: u32) -> Result<Vec<Word>, GatewayError>;

    /// Persist the frozen end-of-session snapshot.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError` if the report cannot be delivered.
    async fn submit_report(&self, report: &WordDrillReport) -> Result<(), GatewayError>;
}

/// Queue fetch and result persistence for conjugation sessions.
#[async_trait]
pub trait ConjugationDrillGateway: Send + Sync {
    /// Fetch a filtered, shuffled conjugation queue.
    ///
    /// Unconstrained filter dimensions are omitted from the request.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError` on transport or decoding failures.
    async fn fetch_queue(
        &self,
        config: &ConjugationDrillConfig,
    ) -> Result<Vec<Conjugation>, GatewayError>;

    /// Persist the frozen end-of-session snapshot.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError` if the report cannot be delivered.
    async fn submit_report(&self, report: &ConjugationDrillReport) -> Result<(), GatewayError>;
}

/// Read/write access to the option sets that shape configuration screens.
#[async_trait]
pub trait OptionsGateway: Send + Sync {
    /// Load the configured option sets.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError` on transport or decoding failures.
    async fn game_options(&self) -> Result<GameOptions, GatewayError>;

    /// Replace the configured option sets.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError` if the update is rejected.
    async fn save_game_options(&self, options: &GameOptions) -> Result<(), GatewayError>;
}

/// Vocabulary CRUD.
#[async_trait]
pub trait WordCatalog: Send + Sync {
    /// # Errors
    ///
    /// Returns `GatewayError` on transport or decoding failures.
    async fn list_words(&self) -> Result<Vec<Word>, GatewayError>;

    /// # Errors
    ///
    /// Returns `GatewayError` if the entry is rejected.
    async fn add_word(&self, draft: &WordDraft) -> Result<(), GatewayError>;

    /// # Errors
    ///
    /// Returns `GatewayError` if the entry is missing or rejected.
    async fn update_word(&self, id: WordId, draft: &WordDraft) -> Result<(), GatewayError>;

    /// # Errors
    ///
    /// Returns `GatewayError` if the entry is missing.
    async fn delete_word(&self, id: WordId) -> Result<(), GatewayError>;
}

/// Conjugation CRUD.
#[async_trait]
pub trait ConjugationCatalog: Send + Sync {
    /// # Errors
    ///
    /// Returns `GatewayError` on transport or decoding failures.
    async fn list_conjugations(&self) -> Result<Vec<Conjugation>, GatewayError>;

    /// # Errors
    ///
    /// Returns `GatewayError` if the entry is rejected.
    async fn add_conjugation(&self, draft: &ConjugationDraft) -> Result<(), GatewayError>;

    /// # Errors
    ///
    /// Returns `GatewayError` if the entry is missing or rejected.
    async fn update_conjugation(
        &self,
        id: ConjugationId,
        draft: &ConjugationDraft,
    ) -> Result<(), GatewayError>;

    /// # Errors
    ///
    /// Returns `GatewayError` if the entry is missing.
    async fn delete_conjugation(&self, id: ConjugationId) -> Result<(), GatewayError>;
}

//
// ─── IN-MEMORY GATEWAY ─────────────────────────────────────────────────────────
//

#[derive(Default)]
struct InMemoryState {
    words: Vec<Word>,
    conjugations: Vec<Conjugation>,
    options: GameOptions,
    word_reports: Vec<WordDrillReport>,
    conjugation_reports: Vec<ConjugationDrillReport>,
    next_word_id: u64,
    next_conjugation_id: u64,
    fail_fetch: bool,
    fail_reports: bool,
}

/// In-memory stand-in for the REST backend, for tests and offline runs.
///
/// Conjugation fetches apply the same filters the server applies; reports are
/// recorded so tests can assert delivery counts.
#[derive(Clone, Default)]
pub struct InMemoryGateway {
    inner: Arc<Mutex<InMemoryState>>,
}

impl InMemoryGateway {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, InMemoryState>, GatewayError> {
        self.inner
            .lock()
            .map_err(|e| GatewayError::Connection(e.to_string()))
    }

    /// Seed the word pool in queue order.
    ///
    /// # Panics
    ///
    /// Panics if the state lock is poisoned; acceptable in a test double.
    pub fn seed_words(&self, words: Vec<Word>) {
        let mut state = self.inner.lock().expect("gateway state lock");
        state.next_word_id = words.iter().map(|w| w.id().value()).max().unwrap_or(0) + 1;
        state.words = words;
    }

    /// Seed the conjugation pool in queue order.
    ///
    /// # Panics
    ///
    /// Panics if the state lock is poisoned; acceptable in a test double.
    pub fn seed_conjugations(&self, conjugations: Vec<Conjugation>) {
        let mut state = self.inner.lock().expect("gateway state lock");
        state.next_conjugation_id = conjugations
            .iter()
            .map(|c| c.id().value())
            .max()
            .unwrap_or(0)
            + 1;
        state.conjugations = conjugations;
    }

    /// Replace the served option sets.
    ///
    /// # Panics
    ///
    /// Panics if the state lock is poisoned; acceptable in a test double.
    pub fn set_options(&self, options: GameOptions) {
        self.inner.lock().expect("gateway state lock").options = options;
    }

    /// Make queue fetches fail with a connection error.
    ///
    /// # Panics
    ///
    /// Panics if the state lock is poisoned; acceptable in a test double.
    pub fn set_fail_fetch(&self, fail: bool) {
        self.inner.lock().expect("gateway state lock").fail_fetch = fail;
    }

    /// Make report submissions fail with a connection error.
    ///
    /// # Panics
    ///
    /// Panics if the state lock is poisoned; acceptable in a test double.
    pub fn set_fail_reports(&self, fail: bool) {
        self.inner.lock().expect("gateway state lock").fail_reports = fail;
    }

    /// Word reports received so far.
    ///
    /// # Panics
    ///
    /// Panics if the state lock is poisoned; acceptable in a test double.
    #[must_use]
    pub fn word_reports(&self) -> Vec<WordDrillReport> {
        self.inner
            .lock()
            .expect("gateway state lock")
            .word_reports
            .clone()
    }

    /// Conjugation reports received so far.
    ///
    /// # Panics
    ///
    /// Panics if the state lock is poisoned; acceptable in a test double.
    #[must_use]
    pub fn conjugation_reports(&self) -> Vec<ConjugationDrillReport> {
        self.inner
            .lock()
            .expect("gateway state lock")
            .conjugation_reports
            .clone()
    }
}

#[async_trait]
impl WordDrillGateway for InMemoryGateway {
    async fn fetch_queue(&self, _time_limit_secs: u32) -> Result<Vec<Word>, GatewayError> {
        let state = self.lock()?;
        if state.fail_fetch {
            return Err(GatewayError::Connection("fetch disabled".into()));
        }
        Ok(state.words.clone())
    }

    async fn submit_report(&self, report: &WordDrillReport) -> Result<(), GatewayError> {
        let mut state = self.lock()?;
        if state.fail_reports {
            return Err(GatewayError::Connection("reports disabled".into()));
        }
        state.word_reports.push(report.clone());
        Ok(())
    }
}

#[async_trait]
impl ConjugationDrillGateway for InMemoryGateway {
    async fn fetch_queue(
        &self,
        config: &ConjugationDrillConfig,
    ) -> Result<Vec<Conjugation>, GatewayError> {
        let state = self.lock()?;
        if state.fail_fetch {
            return Err(GatewayError::Connection("fetch disabled".into()));
        }
        Ok(state
            .conjugations
            .iter()
            .filter(|c| matches_filters(c, config))
            .cloned()
            .collect())
    }

    async fn submit_report(&self, report: &ConjugationDrillReport) -> Result<(), GatewayError> {
        let mut state = self.lock()?;
        if state.fail_reports {
            return Err(GatewayError::Connection("reports disabled".into()));
        }
        state.conjugation_reports.push(report.clone());
        Ok(())
    }
}

#[async_trait]
impl OptionsGateway for InMemoryGateway {
    async fn game_options(&self) -> Result<GameOptions, GatewayError> {
        Ok(self.lock()?.options.clone())
    }

    async fn save_game_options(&self, options: &GameOptions) -> Result<(), GatewayError> {
        self.lock()?.options = options.clone();
        Ok(())
    }
}

#[async_trait]
impl WordCatalog for InMemoryGateway {
    async fn list_words(&self) -> Result<Vec<Word>, GatewayError> {
        Ok(self.lock()?.words.clone())
    }

    async fn add_word(&self, draft: &WordDraft) -> Result<(), GatewayError> {
        let mut state = self.lock()?;
        let id = WordId::new(state.next_word_id);
        state.next_word_id += 1;
        let word = draft
            .clone()
            .validate(id)
            .map_err(|e| GatewayError::Malformed(e.to_string()))?;
        state.words.push(word);
        Ok(())
    }

    async fn update_word(&self, id: WordId, draft: &WordDraft) -> Result<(), GatewayError> {
        let mut state = self.lock()?;
        let word = draft
            .clone()
            .validate(id)
            .map_err(|e| GatewayError::Malformed(e.to_string()))?;
        let slot = state
            .words
            .iter_mut()
            .find(|w| w.id() == id)
            .ok_or(GatewayError::Status(404))?;
        *slot = word;
        Ok(())
    }

    async fn delete_word(&self, id: WordId) -> Result<(), GatewayError> {
        let mut state = self.lock()?;
        let before = state.words.len();
        state.words.retain(|w| w.id() != id);
        if state.words.len() == before {
            return Err(GatewayError::Status(404));
        }
        Ok(())
    }
}

#[async_trait]
impl ConjugationCatalog for InMemoryGateway {
    async fn list_conjugations(&self) -> Result<Vec<Conjugation>, GatewayError> {
        Ok(self.lock()?.conjugations.clone())
    }

    async fn add_conjugation(&self, draft: &ConjugationDraft) -> Result<(), GatewayError> {
        let mut state = self.lock()?;
        let id = ConjugationId::new(state.next_conjugation_id);
        state.next_conjugation_id += 1;
        let conjugation = draft
            .clone()
            .validate(id)
            .map_err(|e| GatewayError::Malformed(e.to_string()))?;
        state.conjugations.push(conjugation);
        Ok(())
    }

    async fn update_conjugation(
        &self,
        id: ConjugationId,
        draft: &ConjugationDraft,
    ) -> Result<(), GatewayError> {
        let mut state = self.lock()?;
        let conjugation = draft
            .clone()
            .validate(id)
            .map_err(|e| GatewayError::Malformed(e.to_string()))?;
        let slot = state
            .conjugations
            .iter_mut()
            .find(|c| c.id() == id)
            .ok_or(GatewayError::Status(404))?;
        *slot = conjugation;
        Ok(())
    }

    async fn delete_conjugation(&self, id: ConjugationId) -> Result<(), GatewayError> {
        let mut state = self.lock()?;
        let before = state.conjugations.len();
        state.conjugations.retain(|c| c.id() != id);
        if state.conjugations.len() == before {
            return Err(GatewayError::Status(404));
        }
        Ok(())
    }
}

/// Filter application equivalent to the server's queue query.
fn matches_filters(conjugation: &Conjugation, config: &ConjugationDrillConfig) -> bool {
    match config.verbs() {
        VerbFilter::Regular if conjugation.irregular() => return false,
        VerbFilter::Irregular if !conjugation.irregular() => return false,
        _ => {}
    }
    match config.pronominal() {
        PronominalFilter::Only if !conjugation.pronominal() => return false,
        PronominalFilter::Exclude if conjugation.pronominal() => return false,
        _ => {}
    }
    if let Some(tenses) = config.tenses() {
        if !tenses.iter().any(|t| t == conjugation.tense()) {
            return false;
        }
    }
    if let Some(groups) = config.groups() {
        if !groups.contains(&conjugation.group()) {
            return false;
        }
    }
    true
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use vocab_core::model::{PronominalFilter, VerbGroup};

    fn conjugation(id: u64, tense: &str, group: u8, irregular: bool, pronominal: bool) -> Conjugation {
        ConjugationDraft {
            verb: "parler".into(),
            person: "je".into(),
            tense: tense.into(),
            conjugation: "parle".into(),
            irregular,
            pronominal,
            group,
        }
        .validate(ConjugationId::new(id))
        .unwrap()
    }

    fn config(
        verbs: VerbFilter,
        tenses: Option<Vec<String>>,
        groups: Option<Vec<VerbGroup>>,
        pronominal: PronominalFilter,
    ) -> ConjugationDrillConfig {
        ConjugationDrillConfig::new(300, verbs, tenses, groups, pronominal, false, false).unwrap()
    }

    #[tokio::test]
    async fn fetch_applies_all_filter_dimensions() {
        let gateway = InMemoryGateway::new();
        gateway.seed_conjugations(vec![
            conjugation(1, "présent", 1, false, false),
            conjugation(2, "présent", 3, true, false),
            conjugation(3, "imparfait", 1, false, false),
            conjugation(4, "présent", 1, false, true),
        ]);

        let cfg = config(
            VerbFilter::Regular,
            Some(vec!["présent".into()]),
            Some(vec![VerbGroup::new(1).unwrap()]),
            PronominalFilter::Exclude,
        );
        let queue = ConjugationDrillGateway::fetch_queue(&gateway, &cfg)
            .await
            .unwrap();
        let ids: Vec<u64> = queue.iter().map(|c| c.id().value()).collect();
        assert_eq!(ids, [1]);
    }

    #[tokio::test]
    async fn unconstrained_dimensions_match_everything() {
        let gateway = InMemoryGateway::new();
        gateway.seed_conjugations(vec![
            conjugation(1, "présent", 1, false, false),
            conjugation(2, "imparfait", 3, true, true),
        ]);

        let cfg = config(VerbFilter::Both, None, None, PronominalFilter::Both);
        let queue = ConjugationDrillGateway::fetch_queue(&gateway, &cfg)
            .await
            .unwrap();
        assert_eq!(queue.len(), 2);
    }

    #[tokio::test]
    async fn catalog_update_missing_entry_is_not_found() {
        let gateway = InMemoryGateway::new();
        let draft = WordDraft {
            word: "chat".into(),
            translations: vec!["cat".into()],
            part_of_speech: None,
            article: None,
        };
        let err = gateway
            .update_word(WordId::new(9), &draft)
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Status(404)));
    }
}
