use crate::model::config::VerbGroup;

//
// ─── GAME OPTIONS ──────────────────────────────────────────────────────────────
//

/// Read-only option sets served by the settings collaborator.
///
/// These shape which filters a configuration screen may offer. An empty set
/// means the dimension is not configured: the filter is unavailable and the
/// dimension is left out of queue requests entirely.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GameOptions {
    pub source_lang: String,
    pub target_lang: String,
    pub vocab: VocabOptions,
    pub conjugation: ConjugationOptions,
}

/// Option sets for the vocabulary side of the app.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VocabOptions {
    pub parts_of_speech: Vec<String>,
    pub articles: Vec<String>,
    pub classes: Vec<String>,
}

/// Option sets for conjugation sessions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConjugationOptions {
    pub persons: Vec<String>,
    pub tenses: Vec<String>,
    pub groups: Vec<VerbGroup>,
    pub allow_pronominal: bool,
    pub allow_irregular: bool,
}

impl Default for ConjugationOptions {
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

impl ConjugationOptions {
    /// Whether a tense filter can be offered at all.
    #[must_use]
    pub fn has_tenses(&self) -> bool {
        !self.tenses.is_empty()
    }

    /// Whether a group filter can be offered at all.
    #[must_use]
    pub fn has_groups(&self) -> bool {
        !self.groups.is_empty()
    }

    /// Narrow a user selection to the configured tense set.
    ///
    /// Returns `None` when the dimension is unconfigured or the selection is
    /// empty, i.e. the request should not constrain tenses.
    #[must_use]
    pub fn tense_selection(&self, selected: &[String]) -> Option<Vec<String>> {
        if !self.has_tenses() {
            return None;
        }
        let picked: Vec<String> = selected
            .iter()
            .filter(|t| self.tenses.contains(t))
            .cloned()
            .collect();
        if picked.is_empty() { None } else { Some(picked) }
    }

    /// Narrow a user selection to the configured group set.
    #[must_use]
    pub fn group_selection(&self, selected: &[VerbGroup]) -> Option<Vec<VerbGroup>> {
        if !self.has_groups() {
            return None;
        }
        let picked: Vec<VerbGroup> = selected
            .iter()
            .filter(|g| self.groups.contains(g))
            .copied()
            .collect();
        if picked.is_empty() { None } else { Some(picked) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> ConjugationOptions {
        ConjugationOptions {
            persons: vec!["je".into(), "tu".into()],
            tenses: vec!["présent".into(), "imparfait".into()],
            groups: vec![VerbGroup::new(1).unwrap(), VerbGroup::new(2).unwrap()],
            allow_pronominal: true,
            allow_irregular: true,
        }
    }

    #[test]
    fn unconfigured_dimension_yields_no_constraint() {
        let opts = ConjugationOptions::default();
        assert!(!opts.has_tenses());
        assert_eq!(opts.tense_selection(&["présent".into()]), None);
        assert_eq!(opts.group_selection(&[VerbGroup::new(1).unwrap()]), None);
    }

    #[test]
    fn selection_is_narrowed_to_configured_values() {
        let opts = options();
        let picked = opts
            .tense_selection(&["présent".into(), "futur simple".into()])
            .unwrap();
        assert_eq!(picked, ["présent"]);
    }

    #[test]
    fn empty_selection_yields_no_constraint() {
        let opts = options();
        assert_eq!(opts.tense_selection(&[]), None);
        assert_eq!(opts.group_selection(&[]), None);
    }
}
