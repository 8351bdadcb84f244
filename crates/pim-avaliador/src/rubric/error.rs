use super::domain::Dimension;
use std::fmt;

/// What an out-of-range score was assigned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreTarget {
    Dimension(Dimension),
    Oral,
}

impl fmt::Display for ScoreTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScoreTarget::Dimension(dimension) => write!(f, "{}", dimension.label()),
            ScoreTarget::Oral => write!(f, "Parte Oral"),
        }
    }
}

/// Recoverable conditions reported by the scoring and report pipeline.
#[derive(Debug, thiserror::Error)]
pub enum EvaluationError {
    #[error("score {value} for {target} is outside 0.0..={max:.1}")]
    OutOfRangeScore {
        target: ScoreTarget,
        value: f64,
        max: f64,
    },
    #[error("observation '{observation}' is not in the {} suggestion bank", dimension.label())]
    UnknownObservation {
        dimension: Dimension,
        observation: String,
    },
    #[error("recommendation '{0}' is not in the general recommendation bank")]
    UnknownRecommendation(String),
    #[error("malformed snapshot: {source}")]
    MalformedSnapshot {
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to render evaluation report: {detail}")]
    RenderFailure { detail: String },
}

impl EvaluationError {
    pub(crate) fn render(detail: impl Into<String>) -> Self {
        Self::RenderFailure {
            detail: detail.into(),
        }
    }
}
