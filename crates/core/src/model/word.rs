use thiserror::Error;

use crate::model::ids::WordId;

//
// ─── WORD TYPES ────────────────────────────────────────────────────────────────
//

/// Unvalidated word input, e.g. from a form or a backend row.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WordDraft {
    pub word: String,
    pub translations: Vec<String>,
    pub part_of_speech: Option<String>,
    pub article: Option<String>,
}

impl WordDraft {
    /// Validate and normalize the draft into a `Word`.
    ///
    /// Trims every field, drops blank translations, and collapses the legacy
    /// `"none"` article sentinel to an absent article.
    ///
    /// # Errors
    ///
    /// Returns `WordError::EmptyWord` if the word is blank and
    /// `WordError::NoTranslations` if no usable translation remains.
    pub fn validate(self, id: WordId) -> Result<Word, WordError> {
        let word = self.word.trim().to_string();
        if word.is_empty() {
            return Err(WordError::EmptyWord);
        }

        let translations: Vec<String> = self
            .translations
            .into_iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();
        if translations.is_empty() {
            return Err(WordError::NoTranslations);
        }

        Ok(Word {
            id,
            word,
            translations,
            part_of_speech: normalize_optional(self.part_of_speech),
            article: normalize_article(self.article),
        })
    }
}

/// A vocabulary entry: one word in the source language with its translations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Word {
    id: WordId,
    word: String,
    translations: Vec<String>,
    part_of_speech: Option<String>,
    article: Option<String>,
}

impl Word {
    #[must_use]
    pub fn id(&self) -> WordId {
        self.id
    }

    #[must_use]
    pub fn word(&self) -> &str {
        &self.word
    }

    #[must_use]
    pub fn translations(&self) -> &[String] {
        &self.translations
    }

    #[must_use]
    pub fn part_of_speech(&self) -> Option<&str> {
        self.part_of_speech.as_deref()
    }

    /// Grammatical article, if the word carries one (e.g. "le", "la").
    #[must_use]
    pub fn article(&self) -> Option<&str> {
        self.article.as_deref()
    }
}

//
// ─── VALIDATION ERRORS ─────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum WordError {
    #[error("word must not be empty")]
    EmptyWord,

    #[error("word needs at least one translation")]
    NoTranslations,
}

fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|val| val.trim().to_string())
        .filter(|val| !val.is_empty())
}

/// The backend stores "no article" as the literal string "none".
fn normalize_article(value: Option<String>) -> Option<String> {
    normalize_optional(value).filter(|val| val != "none")
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
