mod config;
mod conjugation;
mod ids;
mod options;
mod session;
mod word;

pub use ids::{ConjugationId, WordId};

pub use config::{
    ConfigError, ConjugationDrillConfig, Direction, DirectionChoice, GradingMode,
    PronominalFilter, VerbFilter, VerbGroup, WordDrillConfig,
};
pub use conjugation::{Conjugation, ConjugationDraft, ConjugationError};
pub use options::{ConjugationOptions, GameOptions, VocabOptions};
pub use session::{
    AttemptResult, ConjugationDrillReport, DrillSummary, SummaryError, WordDrillReport,
};
pub use word::{Word, WordDraft, WordError};
