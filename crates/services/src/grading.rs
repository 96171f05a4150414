//! Answer comparison.
//!
//! Matching is deliberately exact: trim, case-fold, and test set membership.
//! No diacritic folding and no whitespace collapsing beyond the trim: a
//! missing accent is a wrong answer.

/// Normalize learner input for comparison.
#[must_use]
pub fn normalize_answer(input: &str) -> String {
    input.trim().to_lowercase()
}

/// Exact membership test of the normalized input against the expected set.
#[must_use]
pub fn is_match(input: &str, expected: &[String]) -> bool {
    let normalized = normalize_answer(input);
    expected.iter().any(|answer| *answer == normalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(answers: &[&str]) -> Vec<String> {
        answers.iter().map(|a| (*a).into()).collect()
    }

    #[test]
    fn trims_and_case_folds() {
        assert!(is_match("  Cat ", &set(["cat"].as_ref())));
        assert!(is_match("LE CHAT", &set(["le chat"].as_ref())));
    }

    #[test]
    fn requires_exact_string() {
        let expected = set(["été"].as_ref());
        assert!(is_match("été", &expected));
        // No diacritic folding: "ete" is not accepted.
        assert!(!is_match("ete", &expected));
        // No inner-whitespace collapsing.
        assert!(!is_match("le  chat", &set(["le chat"].as_ref())));
    }

    #[test]
    fn partial_input_never_matches() {
        let expected = set(["chat"].as_ref());
        assert!(!is_match("ca", &expected));
        assert!(!is_match("cha", &expected));
        assert!(is_match("chat", &expected));
    }

    #[test]
    fn matches_any_member_of_the_set() {
        let expected = set(["cat", "pussycat"].as_ref());
        assert!(is_match("pussycat", &expected));
        assert!(!is_match("kitten", &expected));
    }
}
