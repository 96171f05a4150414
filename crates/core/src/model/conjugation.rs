use thiserror::Error;

use crate::model::config::VerbGroup;
use crate::model::ids::ConjugationId;

//
// ─── CONJUGATION TYPES ─────────────────────────────────────────────────────────
//

/// Unvalidated conjugation input, e.g. from a form or a backend row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConjugationDraft {
    pub verb: String,
    pub person: String,
    pub tense: String,
    pub conjugation: String,
    pub irregular: bool,
    pub pronominal: bool,
    pub group: u8,
}

impl ConjugationDraft {
    /// Validate and normalize the draft into a `Conjugation`.
    ///
    /// Text fields are trimmed and lower-cased, matching how entries are
    /// stored server-side.
    ///
    /// # Errors
    ///
    /// Returns `ConjugationError` if any text field is blank or the verb
    /// group is out of range.
    pub fn validate(self, id: ConjugationId) -> Result<Conjugation, ConjugationError> {
        let verb = normalize_field(&self.verb, ConjugationError::EmptyVerb)?;
        let person = normalize_field(&self.person, ConjugationError::EmptyPerson)?;
        let tense = normalize_field(&self.tense, ConjugationError::EmptyTense)?;
        let conjugation = normalize_field(&self.conjugation, ConjugationError::EmptyConjugation)?;
        let group =
            VerbGroup::new(self.group).map_err(|_| ConjugationError::InvalidGroup(self.group))?;

        Ok(Conjugation {
            id,
            verb,
            person,
            tense,
            conjugation,
            irregular: self.irregular,
            pronominal: self.pronominal,
            group,
        })
    }
}

/// One conjugated form: a (verb, person, tense) cell and its answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conjugation {
    id: ConjugationId,
    verb: String,
    person: String,
    tense: String,
    conjugation: String,
    irregular: bool,
    pronominal: bool,
    group: VerbGroup,
}

impl Conjugation {
    #[must_use]
    pub fn id(&self) -> ConjugationId {
        self.id
    }

    #[must_use]
    pub fn verb(&self) -> &str {
        &self.verb
    }

    #[must_use]
    pub fn person(&self) -> &str {
        &self.person
    }

    #[must_use]
    pub fn tense(&self) -> &str {
        &self.tense
    }

    /// The expected answer for this cell.
    #[must_use]
    pub fn conjugation(&self) -> &str {
        &self.conjugation
    }

    #[must_use]
    pub fn irregular(&self) -> bool {
        self.irregular
    }

    #[must_use]
    pub fn pronominal(&self) -> bool {
        self.pronominal
    }

    #[must_use]
    pub fn group(&self) -> VerbGroup {
        self.group
    }
}

//
// ─── VALIDATION ERRORS ─────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConjugationError {
    #[error("verb must not be empty")]
    EmptyVerb,

    #[error("person must not be empty")]
    EmptyPerson,

    #[error("tense must not be empty")]
    EmptyTense,

    #[error("conjugated form must not be empty")]
    EmptyConjugation,

    #[error("verb group {0} is out of range")]
    InvalidGroup(u8),
}

fn normalize_field(value: &str, err: ConjugationError) -> Result<String, ConjugationError> {
    let normalized = value.trim().to_lowercase();
    if normalized.is_empty() {
        return Err(err);
    }
    Ok(normalized)
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> ConjugationDraft {
        ConjugationDraft {
            verb: "Parler".into(),
            person: "Je".into(),
            tense: "Présent".into(),
            conjugation: " Parle ".into(),
            irregular: false,
            pronominal: false,
            group: 1,
        }
    }

    #[test]
    fn fields_are_trimmed_and_lowercased() {
        let conj = draft().validate(ConjugationId::new(1)).unwrap();
        assert_eq!(conj.verb(), "parler");
        assert_eq!(conj.person(), "je");
        assert_eq!(conj.tense(), "présent");
        assert_eq!(conj.conjugation(), "parle");
    }

    #[test]
    fn blank_conjugation_is_rejected() {
        let mut d = draft();
        d.conjugation = "  ".into();
        let err = d.validate(ConjugationId::new(1)).unwrap_err();
        assert_eq!(err, ConjugationError::EmptyConjugation);
    }

    #[test]
    fn out_of_range_group_is_rejected() {
        let mut d = draft();
        d.group = 5;
        let err = d.validate(ConjugationId::new(1)).unwrap_err();
        assert_eq!(err, ConjugationError::InvalidGroup(5));
    }
}
