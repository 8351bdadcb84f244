use crate::config::ConfigError;
use crate::rubric::EvaluationError;
use crate::telemetry::TelemetryError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Evaluation(EvaluationError),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Evaluation(
                EvaluationError::OutOfRangeScore { .. }
                | EvaluationError::UnknownObservation { .. }
                | EvaluationError::UnknownRecommendation(_),
            ) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Evaluation(EvaluationError::MalformedSnapshot { .. }) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Evaluation(EvaluationError::RenderFailure { .. })
            | AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Evaluation(err) => write!(f, "evaluation error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Evaluation(err) => Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<EvaluationError> for AppError {
    fn from(value: EvaluationError) -> Self {
        Self::Evaluation(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rubric::{Dimension, ScoreTarget};

    #[test]
    fn validation_errors_map_to_unprocessable_entity() {
        let err = AppError::from(EvaluationError::OutOfRangeScore {
            target: ScoreTarget::Dimension(Dimension::Discussion),
            value: 3.5,
            max: 3.0,
        });
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            err.to_string(),
            "evaluation error: score 3.5 for Discussão is outside 0.0..=3.0"
        );
    }

    #[test]
    fn malformed_snapshot_maps_to_bad_request() {
        let source = serde_json::from_str::<serde_json::Value>("{").expect_err("truncated json");
        let err = AppError::from(EvaluationError::MalformedSnapshot { source });
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn render_failures_are_server_errors() {
        let err = AppError::from(EvaluationError::RenderFailure {
            detail: "no pages".to_string(),
        });
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
