use super::catalog::RubricCatalog;
use super::domain::{Dimension, DimensionStatus, DiscussionMode, OralJustification};
use super::error::{EvaluationError, ScoreTarget};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Upper bound of the oral-presentation score.
pub const ORAL_MAX: f64 = 3.0;

/// Evaluator input for a single rubric dimension.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DimensionEvaluation {
    pub status: DimensionStatus,
    pub score: f64,
    pub observations: Vec<String>,
    pub comment: String,
}

impl DimensionEvaluation {
    /// Observations with their mode tags removed, in selection order.
    pub fn plain_observations(&self) -> impl Iterator<Item = &str> + '_ {
        self.observations.iter().map(|observation| {
            DiscussionMode::split_tag(observation)
                .map(|(_, text)| text)
                .unwrap_or(observation.as_str())
        })
    }

    /// Non-blank lines of the free-text comment.
    pub fn comment_lines(&self) -> impl Iterator<Item = &str> + '_ {
        self.comment
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
    }
}

/// Header information printed on the report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Identification {
    pub course: String,
    pub class_code: String,
    pub pim: String,
    pub group: String,
    pub organization: String,
    pub professor: String,
    pub evaluation_date: Option<NaiveDate>,
}

impl Identification {
    pub fn formatted_date(&self) -> String {
        self.evaluation_date
            .map(|date| date.format("%d/%m/%Y").to_string())
            .unwrap_or_default()
    }
}

/// One evaluation of a PIM against the rubric. Owned by the caller; the
/// scoring, narrative and rendering stages only read it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationRecord {
    pub identification: Identification,
    #[serde(deserialize_with = "deserialize_dimensions")]
    pub dimensions: BTreeMap<Dimension, DimensionEvaluation>,
    pub oral_score: f64,
    pub oral_justification: OralJustification,
    pub discussion_mode: DiscussionMode,
    pub selected_recommendations: Vec<String>,
    pub additional_comments: String,
}

impl Default for EvaluationRecord {
    fn default() -> Self {
        Self::new()
    }
}

impl EvaluationRecord {
    pub fn new() -> Self {
        Self {
            identification: Identification::default(),
            dimensions: Dimension::ordered()
                .into_iter()
                .map(|dimension| (dimension, DimensionEvaluation::default()))
                .collect(),
            oral_score: 0.0,
            oral_justification: OralJustification::default(),
            discussion_mode: DiscussionMode::default(),
            selected_recommendations: Vec::new(),
            additional_comments: String::new(),
        }
    }

    pub fn dimension(&self, dimension: Dimension) -> &DimensionEvaluation {
        // `new` and snapshot loading both populate every dimension.
        &self.dimensions[&dimension]
    }

    pub(crate) fn dimension_mut(&mut self, dimension: Dimension) -> &mut DimensionEvaluation {
        self.dimensions.entry(dimension).or_default()
    }

    pub fn score_of(&self, dimension: Dimension) -> f64 {
        self.dimensions
            .get(&dimension)
            .map(|evaluation| evaluation.score)
            .unwrap_or(0.0)
    }

    /// Per-dimension scores in canonical order.
    pub fn dimension_scores(&self) -> [(Dimension, f64); 6] {
        Dimension::ordered().map(|dimension| (dimension, self.score_of(dimension)))
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::new()
    }

    /// Checks every invariant the scoring and rendering stages rely on.
    pub fn validate(&self, catalog: &RubricCatalog) -> Result<(), EvaluationError> {
        for dimension in Dimension::ordered() {
            let evaluation = self.dimension(dimension);
            check_dimension_score(dimension, evaluation.score)?;
            if let Some(observation) = evaluation
                .observations
                .iter()
                .find(|observation| !catalog.contains_observation(dimension, observation))
            {
                return Err(EvaluationError::UnknownObservation {
                    dimension,
                    observation: observation.clone(),
                });
            }
        }

        check_oral_score(self.oral_score)?;

        if let Some(recommendation) = self
            .selected_recommendations
            .iter()
            .find(|recommendation| !catalog.contains_recommendation(recommendation))
        {
            return Err(EvaluationError::UnknownRecommendation(recommendation.clone()));
        }

        Ok(())
    }
}

/// Fills dimensions absent from the payload with their defaults.
fn deserialize_dimensions<'de, D>(
    deserializer: D,
) -> Result<BTreeMap<Dimension, DimensionEvaluation>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let mut dimensions = BTreeMap::<Dimension, DimensionEvaluation>::deserialize(deserializer)?;
    for dimension in Dimension::ordered() {
        dimensions.entry(dimension).or_default();
    }
    Ok(dimensions)
}

pub(crate) fn check_dimension_score(
    dimension: Dimension,
    value: f64,
) -> Result<(), EvaluationError> {
    check_range(ScoreTarget::Dimension(dimension), value, dimension.max_weight())
}

pub(crate) fn check_oral_score(value: f64) -> Result<(), EvaluationError> {
    check_range(ScoreTarget::Oral, value, ORAL_MAX)
}

fn check_range(target: ScoreTarget, value: f64, max: f64) -> Result<(), EvaluationError> {
    if value.is_finite() && (0.0..=max).contains(&value) {
        Ok(())
    } else {
        Err(EvaluationError::OutOfRangeScore { target, value, max })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_record_covers_every_dimension() {
        let record = EvaluationRecord::new();
        assert_eq!(record.dimensions.len(), 6);
        assert!(record.is_empty());
        assert_eq!(record.oral_justification, OralJustification::NotPresented);
        assert!(record.validate(&RubricCatalog::standard()).is_ok());
    }

    #[test]
    fn validate_rejects_scores_above_weight() {
        let mut record = EvaluationRecord::new();
        record.dimension_mut(Dimension::Conclusion).score = 1.2;

        let err = record
            .validate(&RubricCatalog::standard())
            .expect_err("1.2 exceeds the 1.0 weight");
        match err {
            EvaluationError::OutOfRangeScore { target, value, max } => {
                assert_eq!(target, ScoreTarget::Dimension(Dimension::Conclusion));
                assert_eq!(value, 1.2);
                assert_eq!(max, 1.0);
            }
            other => panic!("expected out of range, got {other:?}"),
        }
    }

    #[test]
    fn validate_rejects_negative_and_nan_oral_scores() {
        let catalog = RubricCatalog::standard();
        let mut record = EvaluationRecord::new();
        record.oral_score = -0.1;
        assert!(record.validate(&catalog).is_err());
        record.oral_score = f64::NAN;
        assert!(record.validate(&catalog).is_err());
        record.oral_score = ORAL_MAX;
        assert!(record.validate(&catalog).is_ok());
    }

    #[test]
    fn validate_rejects_stale_observations_and_recommendations() {
        let catalog = RubricCatalog::standard();
        let mut record = EvaluationRecord::new();
        record
            .dimension_mut(Dimension::Development)
            .observations
            .push("Observação de uma versão antiga".to_string());
        assert!(matches!(
            record.validate(&catalog),
            Err(EvaluationError::UnknownObservation { .. })
        ));

        let mut record = EvaluationRecord::new();
        record
            .selected_recommendations
            .push("Recomendação removida".to_string());
        assert!(matches!(
            record.validate(&catalog),
            Err(EvaluationError::UnknownRecommendation(_))
        ));
    }

    #[test]
    fn deserializing_partial_payload_fills_missing_dimensions() {
        let record: EvaluationRecord = serde_json::from_str(
            r#"{"dimensions": {"development": {"score": 2.5}}, "oral_score": 1.5}"#,
        )
        .expect("partial payload deserializes");
        assert_eq!(record.dimensions.len(), 6);
        assert_eq!(record.score_of(Dimension::Development), 2.5);
        assert_eq!(record.dimension(Dimension::References), &DimensionEvaluation::default());
        assert_eq!(record.oral_score, 1.5);
    }

    #[test]
    fn plain_observations_strip_mode_tags() {
        let evaluation = DimensionEvaluation {
            observations: vec![
                "[Problema] Ausência de dados e análise crítica do problema".to_string(),
                "[Solução] Solução pertinente, mas com detalhamento limitado".to_string(),
            ],
            ..DimensionEvaluation::default()
        };
        let plain: Vec<&str> = evaluation.plain_observations().collect();
        assert_eq!(
            plain,
            vec![
                "Ausência de dados e análise crítica do problema",
                "Solução pertinente, mas com detalhamento limitado",
            ]
        );
    }

    #[test]
    fn comment_lines_skip_blank_lines() {
        let evaluation = DimensionEvaluation {
            comment: "  primeira linha \n\n segunda\n".to_string(),
            ..DimensionEvaluation::default()
        };
        let lines: Vec<&str> = evaluation.comment_lines().collect();
        assert_eq!(lines, vec!["primeira linha", "segunda"]);
    }
}
