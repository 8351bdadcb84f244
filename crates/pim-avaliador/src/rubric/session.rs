use super::catalog::RubricCatalog;
use super::document::DocumentRenderer;
use super::domain::{Dimension, DimensionStatus, DiscussionMode, OralJustification};
use super::error::EvaluationError;
use super::narrative::NarrativeSynthesizer;
use super::recommendations::RecommendationSelector;
use super::record::{check_dimension_score, check_oral_score, EvaluationRecord, Identification};
use super::scoring::{ScoreBreakdown, ScoringEngine};
use super::snapshot::SnapshotCodec;
use serde::Serialize;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Empty,
    InProgress,
    Finalized,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ImportOutcome {
    pub discarded_unsaved_edits: bool,
    pub state: SessionState,
}

/// One evaluator working on one PIM. Every setter validates its input before
/// touching the record, so a rejected call leaves the session as it was.
#[derive(Debug)]
pub struct EvaluationSession {
    catalog: RubricCatalog,
    record: EvaluationRecord,
    state: SessionState,
    unsaved_edits: bool,
}

impl Default for EvaluationSession {
    fn default() -> Self {
        Self::new()
    }
}

impl EvaluationSession {
    pub fn new() -> Self {
        Self::with_catalog(RubricCatalog::standard())
    }

    pub fn with_catalog(catalog: RubricCatalog) -> Self {
        Self {
            catalog,
            record: EvaluationRecord::new(),
            state: SessionState::Empty,
            unsaved_edits: false,
        }
    }

    /// Starts a session from a caller-supplied record, rejecting it when it
    /// breaks a range or bank invariant.
    pub fn from_record(record: EvaluationRecord) -> Result<Self, EvaluationError> {
        let catalog = RubricCatalog::standard();
        record.validate(&catalog)?;
        let state = if record.is_empty() {
            SessionState::Empty
        } else {
            SessionState::InProgress
        };
        Ok(Self {
            catalog,
            record,
            state,
            unsaved_edits: false,
        })
    }

    pub fn catalog(&self) -> &RubricCatalog {
        &self.catalog
    }

    pub fn record(&self) -> &EvaluationRecord {
        &self.record
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn has_unsaved_edits(&self) -> bool {
        self.unsaved_edits
    }

    fn edit<F>(&mut self, apply: F)
    where
        F: FnOnce(&mut EvaluationRecord),
    {
        apply(&mut self.record);
        self.unsaved_edits = true;
        self.state = if self.record.is_empty() {
            SessionState::Empty
        } else {
            SessionState::InProgress
        };
    }

    pub fn set_identification(&mut self, identification: Identification) {
        self.edit(|record| record.identification = identification);
    }

    pub fn set_dimension_score(
        &mut self,
        dimension: Dimension,
        score: f64,
    ) -> Result<(), EvaluationError> {
        check_dimension_score(dimension, score)?;
        self.edit(|record| record.dimension_mut(dimension).score = score);
        Ok(())
    }

    pub fn set_dimension_status(&mut self, dimension: Dimension, status: DimensionStatus) {
        self.edit(|record| record.dimension_mut(dimension).status = status);
    }

    /// Replaces the selected observations of a dimension. On the Discussion
    /// dimension only the entries of `mode` are replaced; selections made under
    /// the other mode stay. `None` keeps the record's current mode, `Some`
    /// switches it.
    pub fn set_dimension_observations<S>(
        &mut self,
        dimension: Dimension,
        selected: &[S],
        mode: Option<DiscussionMode>,
    ) -> Result<(), EvaluationError>
    where
        S: AsRef<str>,
    {
        let mode = mode.unwrap_or(self.record.discussion_mode);
        let mut resolved: Vec<String> = Vec::with_capacity(selected.len());
        for observation in selected {
            let stored = self
                .catalog
                .resolve_observation(dimension, mode, observation.as_ref())?;
            if !resolved.contains(&stored) {
                resolved.push(stored);
            }
        }

        let moded = self.catalog.suggestions(dimension).is_moded();
        self.edit(|record| {
            if moded {
                record.discussion_mode = mode;
            }
            let evaluation = record.dimension_mut(dimension);
            if moded {
                let mut kept: Vec<String> = evaluation
                    .observations
                    .drain(..)
                    .filter(|existing| {
                        let other_mode = DiscussionMode::split_tag(existing)
                            .is_some_and(|(tag, _)| tag != mode);
                        other_mode && !resolved.contains(existing)
                    })
                    .collect();
                kept.extend(resolved);
                evaluation.observations = kept;
            } else {
                evaluation.observations = resolved;
            }
        });
        Ok(())
    }

    pub fn set_dimension_comment(&mut self, dimension: Dimension, comment: impl Into<String>) {
        let comment = comment.into();
        self.edit(|record| record.dimension_mut(dimension).comment = comment);
    }

    pub fn set_oral_score(
        &mut self,
        score: f64,
        justification: OralJustification,
    ) -> Result<(), EvaluationError> {
        check_oral_score(score)?;
        self.edit(|record| {
            record.oral_score = score;
            record.oral_justification = justification;
        });
        Ok(())
    }

    pub fn set_selected_recommendations<S>(&mut self, selected: &[S]) -> Result<(), EvaluationError>
    where
        S: AsRef<str>,
    {
        let mut recommendations: Vec<String> = Vec::with_capacity(selected.len());
        for recommendation in selected {
            let recommendation = recommendation.as_ref();
            if !self.catalog.contains_recommendation(recommendation) {
                return Err(EvaluationError::UnknownRecommendation(
                    recommendation.to_string(),
                ));
            }
            if !recommendations.iter().any(|existing| existing == recommendation) {
                recommendations.push(recommendation.to_string());
            }
        }

        self.edit(|record| record.selected_recommendations = recommendations);
        Ok(())
    }

    pub fn set_additional_comments(&mut self, comments: impl Into<String>) {
        let comments = comments.into();
        self.edit(|record| record.additional_comments = comments);
    }

    pub fn compute_breakdown(&self) -> ScoreBreakdown {
        ScoringEngine::score(&self.record)
    }

    /// Heuristic recommendations derived from the current scores.
    pub fn compute_recommendations(&self) -> Vec<String> {
        RecommendationSelector::select(|dimension| self.record.score_of(dimension))
    }

    /// What the document lists: the evaluator's selections, then heuristic
    /// recommendations not already selected.
    pub fn document_recommendations(&self) -> Vec<String> {
        RecommendationSelector::merge(
            &self.record.selected_recommendations,
            &self.compute_recommendations(),
        )
    }

    pub fn compute_narrative(&self) -> String {
        NarrativeSynthesizer::synthesize(&self.record, &self.compute_breakdown())
    }

    /// Renders the PDF. A render failure leaves the session state untouched.
    pub fn render_document(&mut self) -> Result<Vec<u8>, EvaluationError> {
        let breakdown = self.compute_breakdown();
        let narrative = NarrativeSynthesizer::synthesize(&self.record, &breakdown);
        let recommendations = self.document_recommendations();
        let bytes =
            DocumentRenderer::render(&self.record, &breakdown, &recommendations, &narrative)?;
        self.state = SessionState::Finalized;
        Ok(bytes)
    }

    pub fn export_snapshot(&mut self) -> Result<String, EvaluationError> {
        let text = SnapshotCodec::save(&self.record)?;
        self.unsaved_edits = false;
        Ok(text)
    }

    /// Replaces the record with a snapshot. The snapshot is parsed and
    /// validated first; on error the current record is kept.
    pub fn import_snapshot(&mut self, text: &str) -> Result<ImportOutcome, EvaluationError> {
        let record = SnapshotCodec::load(text)?;
        record.validate(&self.catalog)?;

        let discarded_unsaved_edits = self.state != SessionState::Empty && self.unsaved_edits;
        if discarded_unsaved_edits {
            warn!(
                class_code = %self.record.identification.class_code,
                "snapshot import discarded unsaved edits"
            );
        }

        self.state = if record.is_empty() {
            SessionState::Empty
        } else {
            SessionState::InProgress
        };
        self.record = record;
        self.unsaved_edits = false;
        info!(
            class_code = %self.record.identification.class_code,
            state = ?self.state,
            "imported evaluation snapshot"
        );

        Ok(ImportOutcome {
            discarded_unsaved_edits,
            state: self.state,
        })
    }

    pub fn reset(&mut self) {
        self.record = EvaluationRecord::new();
        self.state = SessionState::Empty;
        self.unsaved_edits = false;
    }

    /// `PIM_<turma>_<empresa>.pdf`, whitespace replaced by underscores.
    pub fn suggested_file_name(&self) -> String {
        suggested_file_name(&self.record.identification)
    }
}

/// Characters that are unsafe in file paths or in a quoted
/// `Content-Disposition` filename are dropped.
pub fn suggested_file_name(identification: &Identification) -> String {
    let part = |value: &str| -> String {
        value
            .trim()
            .chars()
            .filter_map(|ch| match ch {
                '"' | '\\' | '/' | ':' | '*' | '?' | '<' | '>' | '|' => None,
                ch if ch.is_whitespace() => Some('_'),
                ch if ch.is_control() => None,
                ch => Some(ch),
            })
            .collect()
    };
    format!(
        "PIM_{}_{}.pdf",
        part(&identification.class_code),
        part(&identification.organization)
    )
}
