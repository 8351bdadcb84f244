use crate::infra::{content_type_for, AppState};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Extension;
use axum::Json;
use pim_avaliador::error::AppError;
use pim_avaliador::rubric::catalog::RubricCatalogView;
use pim_avaliador::rubric::{
    EvaluationRecord, EvaluationSession, RubricCatalog, ScoreBreakdown, ScoreTable, SnapshotCodec,
};
use serde::Serialize;
use serde_json::json;
use std::path::Path;
use tracing::info;

#[derive(Debug, Serialize)]
pub(crate) struct BreakdownResponse {
    pub(crate) breakdown: ScoreBreakdown,
    pub(crate) objective_display: f64,
    pub(crate) weighted_rounded: f64,
    pub(crate) total_rounded: f64,
    pub(crate) table: ScoreTable,
}

#[derive(Debug, Serialize)]
pub(crate) struct RecommendationsResponse {
    pub(crate) generated: Vec<String>,
    pub(crate) selected: Vec<String>,
    pub(crate) document: Vec<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct NarrativeResponse {
    pub(crate) narrative: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct SnapshotImportResponse {
    pub(crate) version: String,
    pub(crate) timestamp: String,
    pub(crate) record: EvaluationRecord,
}

pub(crate) fn with_evaluation_routes() -> axum::Router {
    axum::Router::new()
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route("/api/v1/rubric", axum::routing::get(rubric_endpoint))
        .route(
            "/api/v1/evaluations/breakdown",
            axum::routing::post(breakdown_endpoint),
        )
        .route(
            "/api/v1/evaluations/recommendations",
            axum::routing::post(recommendations_endpoint),
        )
        .route(
            "/api/v1/evaluations/narrative",
            axum::routing::post(narrative_endpoint),
        )
        .route(
            "/api/v1/evaluations/report",
            axum::routing::post(report_endpoint),
        )
        .route(
            "/api/v1/evaluations/snapshot",
            axum::routing::post(snapshot_export_endpoint),
        )
        .route(
            "/api/v1/evaluations/snapshot/import",
            axum::routing::post(snapshot_import_endpoint),
        )
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn rubric_endpoint() -> Json<RubricCatalogView> {
    Json(RubricCatalog::standard().view())
}

pub(crate) async fn breakdown_endpoint(
    Json(record): Json<EvaluationRecord>,
) -> Result<Json<BreakdownResponse>, AppError> {
    let session = EvaluationSession::from_record(record)?;
    let breakdown = session.compute_breakdown();

    Ok(Json(BreakdownResponse {
        breakdown,
        objective_display: breakdown.objective_display(),
        weighted_rounded: breakdown.weighted_rounded(),
        total_rounded: breakdown.total_rounded(),
        table: ScoreTable::from_record(session.record()),
    }))
}

pub(crate) async fn recommendations_endpoint(
    Json(record): Json<EvaluationRecord>,
) -> Result<Json<RecommendationsResponse>, AppError> {
    let session = EvaluationSession::from_record(record)?;

    Ok(Json(RecommendationsResponse {
        generated: session.compute_recommendations(),
        selected: session.record().selected_recommendations.clone(),
        document: session.document_recommendations(),
    }))
}

pub(crate) async fn narrative_endpoint(
    Json(record): Json<EvaluationRecord>,
) -> Result<Json<NarrativeResponse>, AppError> {
    let session = EvaluationSession::from_record(record)?;
    Ok(Json(NarrativeResponse {
        narrative: session.compute_narrative(),
    }))
}

pub(crate) async fn report_endpoint(
    Json(record): Json<EvaluationRecord>,
) -> Result<Response, AppError> {
    let mut session = EvaluationSession::from_record(record)?;
    let file_name = session.suggested_file_name();
    let bytes = session.render_document()?;
    info!(%file_name, bytes = bytes.len(), "served evaluation report");

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content_type_for(Path::new(&file_name))),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{file_name}\""),
            ),
        ],
        bytes,
    )
        .into_response())
}

pub(crate) async fn snapshot_export_endpoint(
    Json(record): Json<EvaluationRecord>,
) -> Result<Response, AppError> {
    let mut session = EvaluationSession::from_record(record)?;
    let snapshot = session.export_snapshot()?;

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, content_type_for(Path::new("snapshot.json")))],
        snapshot,
    )
        .into_response())
}

pub(crate) async fn snapshot_import_endpoint(
    body: String,
) -> Result<Json<SnapshotImportResponse>, AppError> {
    let snapshot = SnapshotCodec::decode(&body)?;
    let session = EvaluationSession::from_record(snapshot.record)?;

    Ok(Json(SnapshotImportResponse {
        version: snapshot.version,
        timestamp: snapshot.timestamp,
        record: session.record().clone(),
    }))
}
