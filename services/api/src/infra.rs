use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use pim_avaliador::error::AppError;
use pim_avaliador::rubric::{EvaluationSession, SnapshotCodec};
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

/// Content type for a generated file, guessed from its extension.
pub(crate) fn content_type_for(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}

/// Reads a snapshot file and opens a session on it.
pub(crate) fn load_session(path: &Path) -> Result<EvaluationSession, AppError> {
    let text = std::fs::read_to_string(path)?;
    let record = SnapshotCodec::load(&text)?;
    Ok(EvaluationSession::from_record(record)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_date_accepts_iso_dates() {
        assert_eq!(
            parse_date(" 2024-05-17 "),
            Ok(NaiveDate::from_ymd_opt(2024, 5, 17).expect("valid date"))
        );
        assert!(parse_date("17/05/2024").is_err());
    }

    #[test]
    fn content_types_follow_extension() {
        assert_eq!(content_type_for(Path::new("PIM_T1_Acme.pdf")), "application/pdf");
        assert_eq!(content_type_for(Path::new("avaliacao.json")), "application/json");
        assert_eq!(content_type_for(Path::new("sem_extensao")), "application/octet-stream");
    }
}
