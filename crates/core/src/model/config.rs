use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

//
// ─── DIRECTION & MODE ──────────────────────────────────────────────────────────
//

/// Which side of a word is shown as the prompt for one queue item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// The source-language word is shown; a translation is expected.
    SourceToTarget,
    /// A translation is shown; the source-language word is expected.
    TargetToSource,
}

/// Direction setting for a whole word session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DirectionChoice {
    SourceToTarget,
    TargetToSource,
    /// Each item gets a direction rolled once when the queue is built.
    Both,
}

impl fmt::Display for DirectionChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DirectionChoice::SourceToTarget => "source_to_target",
            DirectionChoice::TargetToSource => "target_to_source",
            DirectionChoice::Both => "both",
        };
        write!(f, "{label}")
    }
}

/// How answers are collected and scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GradingMode {
    /// Explicit submit per item; right and wrong attempts are both logged.
    #[default]
    Graded,
    /// Real-time checking; only the first exact match is logged and the
    /// queue advances automatically.
    Ungraded,
}

impl GradingMode {
    #[must_use]
    pub fn from_ungraded_flag(ungraded: bool) -> Self {
        if ungraded {
            GradingMode::Ungraded
        } else {
            GradingMode::Graded
        }
    }

    #[must_use]
    pub fn is_ungraded(&self) -> bool {
        matches!(self, GradingMode::Ungraded)
    }
}

//
// ─── CONJUGATION FILTERS ───────────────────────────────────────────────────────
//

/// Regular/irregular verb selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerbFilter {
    Regular,
    Irregular,
    #[default]
    Both,
}

/// Pronominal verb selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PronominalFilter {
    Only,
    Exclude,
    #[default]
    Both,
}

/// Verb group (1, 2, or 3 in the standard classification).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VerbGroup(u8);

impl VerbGroup {
    pub const MAX: u8 = 3;

    /// Creates a verb group, rejecting values outside `1..=3`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidVerbGroup` for out-of-range values.
    pub fn new(group: u8) -> Result<Self, ConfigError> {
        if group == 0 || group > Self::MAX {
            return Err(ConfigError::InvalidVerbGroup(group));
        }
        Ok(Self(group))
    }

    #[must_use]
    pub fn value(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for VerbGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

//
// ─── SESSION CONFIGURATION ─────────────────────────────────────────────────────
//

/// User-chosen parameters for a word session, fixed before the queue is
/// fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordDrillConfig {
    time_limit_secs: u32,
    direction: DirectionChoice,
    ungraded: bool,
    zen: bool,
}

impl WordDrillConfig {
    /// Creates a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ZeroTimeLimit` if the time limit is zero.
    pub fn new(
        time_limit_secs: u32,
        direction: DirectionChoice,
        ungraded: bool,
        zen: bool,
    ) -> Result<Self, ConfigError> {
        if time_limit_secs == 0 {
            return Err(ConfigError::ZeroTimeLimit);
        }
        Ok(Self {
            time_limit_secs,
            direction,
            ungraded,
            zen,
        })
    }

    #[must_use]
    pub fn time_limit_secs(&self) -> u32 {
        self.time_limit_secs
    }

    #[must_use]
    pub fn direction(&self) -> DirectionChoice {
        self.direction
    }

    #[must_use]
    pub fn grading(&self) -> GradingMode {
        GradingMode::from_ungraded_flag(self.ungraded)
    }

    #[must_use]
    pub fn ungraded(&self) -> bool {
        self.ungraded
    }

    /// Zen mode hides the timer and score in the presentation layer only;
    /// grading and timing are unaffected.
    #[must_use]
    pub fn zen(&self) -> bool {
        self.zen
    }
}

/// User-chosen parameters for a conjugation session.
///
/// `tenses` and `groups` are `None` when the dimension is unconstrained:
/// either the user selected everything or the option set is not configured
/// at all. A `None` dimension is omitted from the queue request entirely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConjugationDrillConfig {
    time_limit_secs: u32,
    verbs: VerbFilter,
    tenses: Option<Vec<String>>,
    groups: Option<Vec<VerbGroup>>,
    pronominal: PronominalFilter,
    ungraded: bool,
    zen: bool,
}

impl ConjugationDrillConfig {
    /// Creates a validated configuration.
    ///
    /// Empty tense/group selections are normalized to "unconstrained".
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ZeroTimeLimit` if the time limit is zero.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        time_limit_secs: u32,
        verbs: VerbFilter,
        tenses: Option<Vec<String>>,
        groups: Option<Vec<VerbGroup>>,
        pronominal: PronominalFilter,
        ungraded: bool,
        zen: bool,
    ) -> Result<Self, ConfigError> {
        if time_limit_secs == 0 {
            return Err(ConfigError::ZeroTimeLimit);
        }
        Ok(Self {
            time_limit_secs,
            verbs,
            tenses: tenses.filter(|t| !t.is_empty()),
            groups: groups.filter(|g| !g.is_empty()),
            pronominal,
            ungraded,
            zen,
        })
    }

    #[must_use]
    pub fn time_limit_secs(&self) -> u32 {
        self.time_limit_secs
    }

    #[must_use]
    pub fn verbs(&self) -> VerbFilter {
        self.verbs
    }

    #[must_use]
    pub fn tenses(&self) -> Option<&[String]> {
        self.tenses.as_deref()
    }

    #[must_use]
    pub fn groups(&self) -> Option<&[VerbGroup]> {
        self.groups.as_deref()
    }

    #[must_use]
    pub fn pronominal(&self) -> PronominalFilter {
        self.pronominal
    }

    #[must_use]
    pub fn grading(&self) -> GradingMode {
        GradingMode::from_ungraded_flag(self.ungraded)
    }

    #[must_use]
    pub fn ungraded(&self) -> bool {
        self.ungraded
    }

    #[must_use]
    pub fn zen(&self) -> bool {
        self.zen
    }
}

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("time limit must be at least one second")]
    ZeroTimeLimit,

    #[error("verb group {0} is out of range (expected 1..=3)")]
    InvalidVerbGroup(u8),
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
