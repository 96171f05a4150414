use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use vocab_core::model::{
    Conjugation, ConjugationDraft, ConjugationDrillConfig, ConjugationDrillReport, ConjugationId,
    ConjugationOptions, GameOptions, PronominalFilter, VerbFilter, VerbGroup, VocabOptions, Word,
    WordDraft, WordDrillReport, WordId,
};

use crate::gateway::{
    ConjugationCatalog, ConjugationDrillGateway, GatewayError, OptionsGateway, WordCatalog,
    WordDrillGateway,
};
use async_trait::async_trait;

/// REST gateway to the trainer backend.
#[derive(Clone)]
pub struct HttpGateway {
    client: Client,
    base_url: String,
}

impl HttpGateway {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    #[must_use]
    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn get(&self, path: &str) -> Result<reqwest::Response, GatewayError> {
        let response = self
            .client
            .get(self.url(path))
            .send()
            .await
            .map_err(connection_error)?;
        check_status(response)
    }

    async fn post_json<T: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<reqwest::Response, GatewayError> {
        let response = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(connection_error)?;
        check_status(response)
    }

    async fn put_json<T: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<reqwest::Response, GatewayError> {
        let response = self
            .client
            .put(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(connection_error)?;
        check_status(response)
    }

    async fn delete(&self, path: &str) -> Result<reqwest::Response, GatewayError> {
        let response = self
            .client
            .delete(self.url(path))
            .send()
            .await
            .map_err(connection_error)?;
        check_status(response)
    }
}

fn connection_error(err: reqwest::Error) -> GatewayError {
    GatewayError::Connection(err.to_string())
}

fn decode_error(err: reqwest::Error) -> GatewayError {
    GatewayError::Malformed(err.to_string())
}

fn check_status(response: reqwest::Response) -> Result<reqwest::Response, GatewayError> {
    if !response.status().is_success() {
        return Err(GatewayError::Status(response.status().as_u16()));
    }
    Ok(response)
}

//
// ─── QUEUE & REPORT WIRE TYPES ─────────────────────────────────────────────────
//

#[derive(Debug, Serialize)]
struct StartGamePayload {
    time_limit: u32,
}

#[derive(Debug, Deserialize)]
struct WordQueueBody {
    #[serde(default)]
    words: Vec<WordRow>,
}

#[derive(Debug, Deserialize)]
struct WordRow {
    id: u64,
    word: String,
    #[serde(default)]
    translations: Vec<String>,
    #[serde(default)]
    part_of_speech: Option<String>,
    #[serde(default)]
    article: Option<String>,
}

impl WordRow {
    fn into_word(self) -> Result<Word, vocab_core::model::WordError> {
        WordDraft {
            word: self.word,
            translations: self.translations,
            part_of_speech: self.part_of_speech,
            article: self.article,
        }
        .validate(WordId::new(self.id))
    }
}

/// Convert rows to domain words, skipping rows that fail validation.
///
/// A skipped row is a data-integrity problem on the server, never a reason
/// to fail the whole fetch.
fn words_from_rows(rows: Vec<WordRow>) -> Vec<Word> {
    rows.into_iter()
        .filter_map(|row| {
            let id = row.id;
            match row.into_word() {
                Ok(word) => Some(word),
                Err(err) => {
                    warn!(word_id = id, %err, "skipping malformed vocabulary row");
                    None
                }
            }
        })
        .collect()
}

#[derive(Debug, Serialize)]
struct WordResultRow<'a> {
    word_id: u64,
    word: &'a str,
    user_answer: &'a str,
    correct_answer: &'a str,
    correct: bool,
    #[serde(rename = "timeSpent")]
    time_spent: u32,
}

#[derive(Debug, Serialize)]
struct EndGamePayload<'a> {
    time_limit: u32,
    game_type: String,
    zen_mode: bool,
    results: Vec<WordResultRow<'a>>,
    total_attempts: u32,
    score: u32,
    ungraded: bool,
}

impl<'a> EndGamePayload<'a> {
    fn from_report(report: &'a WordDrillReport) -> Self {
        Self {
            time_limit: report.config.time_limit_secs(),
            game_type: report.config.direction().to_string(),
            zen_mode: report.config.zen(),
            results: report
                .results
                .iter()
                .map(|r| WordResultRow {
                    word_id: r.item_id,
                    word: &r.display_label,
                    user_answer: &r.user_answer,
                    correct_answer: &r.correct_answer,
                    correct: r.correct,
                    time_spent: r.time_spent_secs,
                })
                .collect(),
            total_attempts: report.total_attempts,
            score: report.correct,
            ungraded: report.config.ungraded(),
        }
    }
}

#[derive(Debug, Serialize)]
struct StartConjugationPayload<'a> {
    time_limit: u32,
    mode: VerbFilter,
    #[serde(skip_serializing_if = "Option::is_none")]
    tenses: Option<&'a [String]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    groups: Option<Vec<u8>>,
    pronominal_mode: PronominalFilter,
}

impl<'a> StartConjugationPayload<'a> {
    fn from_config(config: &'a ConjugationDrillConfig) -> Self {
        Self {
            time_limit: config.time_limit_secs(),
            mode: config.verbs(),
            tenses: config.tenses(),
            groups: config
                .groups()
                .map(|groups| groups.iter().map(VerbGroup::value).collect()),
            pronominal_mode: config.pronominal(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ConjugationQueueBody {
    #[serde(default)]
    conjugations: Vec<ConjugationRow>,
}

#[derive(Debug, Deserialize)]
struct ConjugationRow {
    id: u64,
    verb: String,
    person: String,
    tense: String,
    conjugation: String,
    #[serde(default)]
    irregular: bool,
    #[serde(default)]
    pronominal: bool,
    #[serde(default = "default_verb_group")]
    verb_group: u8,
}

fn default_verb_group() -> u8 {
    1
}

impl ConjugationRow {
    fn into_conjugation(self) -> Result<Conjugation, vocab_core::model::ConjugationError> {
        ConjugationDraft {
            verb: self.verb,
            person: self.person,
            tense: self.tense,
            conjugation: self.conjugation,
            irregular: self.irregular,
            pronominal: self.pronominal,
            group: self.verb_group,
        }
        .validate(ConjugationId::new(self.id))
    }
}

fn conjugations_from_rows(rows: Vec<ConjugationRow>) -> Vec<Conjugation> {
    rows.into_iter()
        .filter_map(|row| {
            let id = row.id;
            match row.into_conjugation() {
                Ok(conjugation) => Some(conjugation),
                Err(err) => {
                    warn!(conjugation_id = id, %err, "skipping malformed conjugation row");
                    None
                }
            }
        })
        .collect()
}

#[derive(Debug, Serialize)]
struct ConjugationResultRow<'a> {
    id: u64,
    label: &'a str,
    user_answer: &'a str,
    correct_answer: &'a str,
    correct: bool,
    #[serde(rename = "timeSpent")]
    time_spent: u32,
}

#[derive(Debug, Serialize)]
struct EndConjugationPayload<'a> {
    time_limit: u32,
    mode: VerbFilter,
    zen_mode: bool,
    ungraded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    tenses: Option<&'a [String]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    groups: Option<Vec<u8>>,
    pronominal_mode: PronominalFilter,
    results: Vec<ConjugationResultRow<'a>>,
    total_attempts: u32,
    correct_answers: u32,
}

impl<'a> EndConjugationPayload<'a> {
    fn from_report(report: &'a ConjugationDrillReport) -> Self {
        Self {
            time_limit: report.config.time_limit_secs(),
            mode: report.config.verbs(),
            zen_mode: report.config.zen(),
            ungraded: report.config.ungraded(),
            tenses: report.config.tenses(),
            groups: report
                .config
                .groups()
                .map(|groups| groups.iter().map(VerbGroup::value).collect()),
            pronominal_mode: report.config.pronominal(),
            results: report
                .results
                .iter()
                .map(|r| ConjugationResultRow {
                    id: r.item_id,
                    label: &r.display_label,
                    user_answer: &r.user_answer,
                    correct_answer: &r.correct_answer,
                    correct: r.correct,
                    time_spent: r.time_spent_secs,
                })
                .collect(),
            total_attempts: report.total_attempts,
            correct_answers: report.correct,
        }
    }
}

//
// ─── SETTINGS WIRE TYPES ───────────────────────────────────────────────────────
//

#[derive(Debug, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct SettingsPayload {
    source_lang: String,
    target_lang: String,
    vocab: VocabSection,
    conj: ConjugationSection,
}

#[derive(Debug, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct VocabSection {
    parts_of_speech: Vec<String>,
    articles: Vec<String>,
    classes: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ConjugationSection {
    persons: Vec<String>,
    tenses: Vec<String>,
    groups: Vec<u8>,
    allow_pronominal: bool,
    allow_irregular: bool,
}

impl Default for ConjugationSection {
    fn default() -> Self {
        Self {
            persons: Vec::new(),
            tenses: Vec::new(),
            groups: Vec::new(),
            allow_pronominal: true,
            allow_irregular: true,
        }
    }
}

impl SettingsPayload {
    fn into_options(self) -> GameOptions {
        let groups = self
            .conj
            .groups
            .into_iter()
            .filter_map(|raw| match VerbGroup::new(raw) {
                Ok(group) => Some(group),
                Err(err) => {
                    warn!(group = raw, %err, "skipping configured verb group");
                    None
                }
            })
            .collect();

        GameOptions {
            source_lang: self.source_lang,
            target_lang: self.target_lang,
            vocab: VocabOptions {
                parts_of_speech: self.vocab.parts_of_speech,
                articles: self.vocab.articles,
                classes: self.vocab.classes,
            },
            conjugation: ConjugationOptions {
                persons: self.conj.persons,
                tenses: self.conj.tenses,
                groups,
                allow_pronominal: self.conj.allow_pronominal,
                allow_irregular: self.conj.allow_irregular,
            },
        }
    }

    fn from_options(options: &GameOptions) -> Self {
        Self {
            source_lang: options.source_lang.clone(),
            target_lang: options.target_lang.clone(),
            vocab: VocabSection {
                parts_of_speech: options.vocab.parts_of_speech.clone(),
                articles: options.vocab.articles.clone(),
                classes: options.vocab.classes.clone(),
            },
            conj: ConjugationSection {
                persons: options.conjugation.persons.clone(),
                tenses: options.conjugation.tenses.clone(),
                groups: options
                    .conjugation
                    .groups
                    .iter()
                    .map(VerbGroup::value)
                    .collect(),
                allow_pronominal: options.conjugation.allow_pronominal,
                allow_irregular: options.conjugation.allow_irregular,
            },
        }
    }
}

//
// ─── CATALOG WIRE TYPES ────────────────────────────────────────────────────────
//

#[derive(Debug, Serialize)]
struct AddWordPayload<'a> {
    word: &'a str,
    translation: &'a str,
    part_of_speech: Option<&'a str>,
    article: &'a str,
}

#[derive(Debug, Serialize)]
struct UpdateWordPayload<'a> {
    word: &'a str,
    translation: &'a [String],
    part_of_speech: Option<&'a str>,
    article: &'a str,
}

#[derive(Debug, Serialize)]
struct ConjugationPayload<'a> {
    verb: &'a str,
    person: &'a str,
    tense: &'a str,
    conjugation: &'a str,
    irregular: bool,
    pronominal: bool,
    verb_group: u8,
}

impl<'a> ConjugationPayload<'a> {
    fn from_draft(draft: &'a ConjugationDraft) -> Self {
        Self {
            verb: &draft.verb,
            person: &draft.person,
            tense: &draft.tense,
            conjugation: &draft.conjugation,
            irregular: draft.irregular,
            pronominal: draft.pronominal,
            verb_group: draft.group,
        }
    }
}

/// The backend stores "no article" as the literal string "none".
fn article_or_none(article: Option<&str>) -> &str {
    article.unwrap_or("none")
}

//
// ─── GATEWAY IMPLEMENTATIONS ───────────────────────────────────────────────────
//

#[async_trait]
impl WordDrillGateway for HttpGateway {
    async fn fetch_queue(&self, time_limit_secs: u32) -> Result<Vec<Word>, GatewayError> {
        let payload = StartGamePayload {
            time_limit: time_limit_secs,
        };
        let body: WordQueueBody = self
            .post_json("start_game", &payload)
            .await?
            .json()
            .await
            .map_err(decode_error)?;
        debug!(count = body.words.len(), "fetched word queue");
        Ok(words_from_rows(body.words))
    }

    async fn submit_report(&self, report: &WordDrillReport) -> Result<(), GatewayError> {
        let payload = EndGamePayload::from_report(report);
        self.post_json("end_game", &payload).await?;
        Ok(())
    }
}

#[async_trait]
impl ConjugationDrillGateway for HttpGateway {
    async fn fetch_queue(
        &self,
        config: &ConjugationDrillConfig,
    ) -> Result<Vec<Conjugation>, GatewayError> {
        let payload = StartConjugationPayload::from_config(config);
        let body: ConjugationQueueBody = self
            .post_json("start_conjugation_game", &payload)
            .await?
            .json()
            .await
            .map_err(decode_error)?;
        debug!(count = body.conjugations.len(), "fetched conjugation queue");
        Ok(conjugations_from_rows(body.conjugations))
    }

    async fn submit_report(&self, report: &ConjugationDrillReport) -> Result<(), GatewayError> {
        let payload = EndConjugationPayload::from_report(report);
        self.post_json("end_conjugation_game", &payload).await?;
        Ok(())
    }
}

#[async_trait]
impl OptionsGateway for HttpGateway {
    async fn game_options(&self) -> Result<GameOptions, GatewayError> {
        let payload: SettingsPayload = self
            .get("settings")
            .await?
            .json()
            .await
            .map_err(decode_error)?;
        Ok(payload.into_options())
    }

    async fn save_game_options(&self, options: &GameOptions) -> Result<(), GatewayError> {
        let payload = SettingsPayload::from_options(options);
        self.put_json("settings", &payload).await?;
        Ok(())
    }
}

#[async_trait]
impl WordCatalog for HttpGateway {
    async fn list_words(&self) -> Result<Vec<Word>, GatewayError> {
        let rows: Vec<WordRow> = self
            .get("get_words")
            .await?
            .json()
            .await
            .map_err(decode_error)?;
        Ok(words_from_rows(rows))
    }

    async fn add_word(&self, draft: &WordDraft) -> Result<(), GatewayError> {
        let translation = draft
            .translations
            .first()
            .ok_or_else(|| GatewayError::Malformed("word draft has no translation".into()))?;
        let payload = AddWordPayload {
            word: &draft.word,
            translation,
            part_of_speech: draft.part_of_speech.as_deref(),
            article: article_or_none(draft.article.as_deref()),
        };
        self.post_json("add_word", &payload).await?;
        Ok(())
    }

    async fn update_word(&self, id: WordId, draft: &WordDraft) -> Result<(), GatewayError> {
        let payload = UpdateWordPayload {
            word: &draft.word,
            translation: &draft.translations,
            part_of_speech: draft.part_of_speech.as_deref(),
            article: article_or_none(draft.article.as_deref()),
        };
        self.put_json(&format!("update_word/{id}"), &payload).await?;
        Ok(())
    }

    async fn delete_word(&self, id: WordId) -> Result<(), GatewayError> {
        self.delete(&format!("delete_word/{id}")).await?;
        Ok(())
    }
}

#[async_trait]
impl ConjugationCatalog for HttpGateway {
    async fn list_conjugations(&self) -> Result<Vec<Conjugation>, GatewayError> {
        let rows: Vec<ConjugationRow> = self
            .get("get_conjugations")
            .await?
            .json()
            .await
            .map_err(decode_error)?;
        Ok(conjugations_from_rows(rows))
    }

    async fn add_conjugation(&self, draft: &ConjugationDraft) -> Result<(), GatewayError> {
        let payload = ConjugationPayload::from_draft(draft);
        self.post_json("add_conjugation", &payload).await?;
        Ok(())
    }

    async fn update_conjugation(
        &self,
        id: ConjugationId,
        draft: &ConjugationDraft,
    ) -> Result<(), GatewayError> {
        let payload = ConjugationPayload::from_draft(draft);
        self.put_json(&format!("update_conjugation/{id}"), &payload)
            .await?;
        Ok(())
    }

    async fn delete_conjugation(&self, id: ConjugationId) -> Result<(), GatewayError> {
        self.delete(&format!("delete_conjugation/{id}")).await?;
        Ok(())
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_normalized() {
        let gateway = HttpGateway::new("http://localhost:5000/");
        assert_eq!(gateway.url("start_game"), "http://localhost:5000/start_game");
    }

    #[test]
    fn malformed_rows_are_skipped_not_fatal() {
        let rows = vec![
            WordRow {
                id: 1,
                word: "chat".into(),
                translations: vec!["cat".into()],
                part_of_speech: None,
                article: Some("le".into()),
            },
            WordRow {
                id: 2,
                word: "chien".into(),
                translations: Vec::new(),
                part_of_speech: None,
                article: None,
            },
        ];
        let words = words_from_rows(rows);
        assert_eq!(words.len(), 1);
        assert_eq!(words[0].word(), "chat");
    }

    #[test]
    fn unconstrained_dimensions_are_absent_from_queue_request() {
        let config = ConjugationDrillConfig::new(
            300,
            VerbFilter::Both,
            None,
            None,
            PronominalFilter::Both,
            false,
            false,
        )
        .unwrap();
        let payload = StartConjugationPayload::from_config(&config);
        let json = serde_json::to_value(&payload).unwrap();
        assert!(json.get("tenses").is_none());
        assert!(json.get("groups").is_none());
        assert_eq!(json["mode"], "both");
        assert_eq!(json["pronominal_mode"], "both");
    }

    #[test]
    fn settings_payload_round_trips_camel_case() {
        let raw = serde_json::json!({
            "sourceLang": "fr",
            "targetLang": "en",
            "vocab": {
                "partsOfSpeech": ["noun"],
                "articles": ["le", "la"],
                "classes": []
            },
            "conj": {
                "persons": ["je"],
                "tenses": ["présent"],
                "groups": [1, 7],
                "allowPronominal": false,
                "allowIrregular": true
            }
        });
        let payload: SettingsPayload = serde_json::from_value(raw).unwrap();
        let options = payload.into_options();
        assert_eq!(options.source_lang, "fr");
        // Group 7 is out of range and dropped.
        assert_eq!(options.conjugation.groups.len(), 1);
        assert!(!options.conjugation.allow_pronominal);

        let back = serde_json::to_value(SettingsPayload::from_options(&options)).unwrap();
        assert_eq!(back["vocab"]["partsOfSpeech"][0], "noun");
        assert_eq!(back["conj"]["allowIrregular"], true);
    }
}
