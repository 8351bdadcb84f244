//! Rubric data model and the pipeline built on it: scoring, recommendations,
//! narrative synthesis, report rendering and snapshots.

pub mod catalog;
pub mod document;
pub mod domain;
pub mod error;
pub mod narrative;
pub mod recommendations;
pub mod record;
pub mod scoring;
pub mod session;
pub mod snapshot;

pub use catalog::RubricCatalog;
pub use document::DocumentRenderer;
pub use domain::{Dimension, DimensionStatus, DiscussionMode, OralJustification, SuggestionSource};
pub use error::{EvaluationError, ScoreTarget};
pub use narrative::NarrativeSynthesizer;
pub use recommendations::RecommendationSelector;
pub use record::{DimensionEvaluation, EvaluationRecord, Identification};
pub use scoring::{ScoreBreakdown, ScoreTable, ScoreTableRow, ScoringEngine, truncate_to};
pub use session::{EvaluationSession, ImportOutcome, SessionState};
pub use snapshot::{Snapshot, SnapshotCodec};
