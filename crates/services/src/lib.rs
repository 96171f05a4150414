#![forbid(unsafe_code)]

pub mod conjugation_drill;
pub mod drill;
pub mod error;
pub mod grading;
pub mod options_service;
pub mod prompt;
pub mod view;
pub mod word_drill;

pub use vocab_core::Clock;

pub use conjugation_drill::ConjugationDrillService;
pub use drill::{DrillPhase, DrillSession, InputOutcome, SubmitOutcome, TickOutcome};
pub use error::{DrillError, OptionsServiceError};
pub use grading::{is_match, normalize_answer};
pub use options_service::GameOptionsService;
pub use prompt::{PlannedItem, strip_hints};
pub use view::{DrillProgress, DrillView};
pub use word_drill::WordDrillService;
