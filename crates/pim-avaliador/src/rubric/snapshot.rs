use super::domain::{Dimension, DiscussionMode, OralJustification};
use super::error::EvaluationError;
use super::record::{DimensionEvaluation, EvaluationRecord, Identification};
use chrono::{NaiveDate, SecondsFormat, Utc};
use serde::de::{value, IntoDeserializer};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

pub const SNAPSHOT_VERSION: &str = "1.0";

/// On-disk layout of a saved evaluation. Identification fields sit at the top
/// level next to the scores.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
struct SnapshotFile {
    version: String,
    timestamp: String,
    course: String,
    class_code: String,
    group: String,
    pim: String,
    organization: String,
    professor: String,
    evaluation_date: Option<NaiveDate>,
    #[serde(deserialize_with = "known_dimensions")]
    dimensions: BTreeMap<Dimension, DimensionEvaluation>,
    selected_recommendations: Vec<String>,
    additional_comments: String,
    oral_score: f64,
    oral_justification: OralJustification,
    discussion_mode: DiscussionMode,
}

/// Keeps the dimensions this rubric knows and drops keys written by other
/// rubric versions.
fn known_dimensions<'de, D>(
    deserializer: D,
) -> Result<BTreeMap<Dimension, DimensionEvaluation>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = BTreeMap::<String, DimensionEvaluation>::deserialize(deserializer)?;
    let mut dimensions = BTreeMap::new();
    for (key, evaluation) in raw {
        let parsed: Result<Dimension, value::Error> =
            Dimension::deserialize(key.as_str().into_deserializer());
        match parsed {
            Ok(dimension) => {
                dimensions.insert(dimension, evaluation);
            }
            Err(_) => warn!(dimension = %key, "ignoring unknown dimension in snapshot"),
        }
    }
    Ok(dimensions)
}

/// A decoded snapshot with its envelope fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub version: String,
    pub timestamp: String,
    pub record: EvaluationRecord,
}

pub struct SnapshotCodec;

impl SnapshotCodec {
    /// Pretty JSON tagged with the current version and a UTC timestamp.
    pub fn save(record: &EvaluationRecord) -> Result<String, EvaluationError> {
        let identification = record.identification.clone();
        let file = SnapshotFile {
            version: SNAPSHOT_VERSION.to_string(),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            course: identification.course,
            class_code: identification.class_code,
            group: identification.group,
            pim: identification.pim,
            organization: identification.organization,
            professor: identification.professor,
            evaluation_date: identification.evaluation_date,
            dimensions: record.dimensions.clone(),
            selected_recommendations: record.selected_recommendations.clone(),
            additional_comments: record.additional_comments.clone(),
            oral_score: record.oral_score,
            oral_justification: record.oral_justification,
            discussion_mode: record.discussion_mode,
        };

        serde_json::to_string_pretty(&file)
            .map_err(|source| EvaluationError::MalformedSnapshot { source })
    }

    pub fn load(text: &str) -> Result<EvaluationRecord, EvaluationError> {
        Self::decode(text).map(|snapshot| snapshot.record)
    }

    /// Parses a snapshot. Missing fields take their defaults and unknown keys
    /// are ignored; no other migration is applied.
    pub fn decode(text: &str) -> Result<Snapshot, EvaluationError> {
        let file: SnapshotFile = serde_json::from_str(text)
            .map_err(|source| EvaluationError::MalformedSnapshot { source })?;

        let mut dimensions = file.dimensions;
        for dimension in Dimension::ordered() {
            dimensions.entry(dimension).or_default();
        }

        let record = EvaluationRecord {
            identification: Identification {
                course: file.course,
                class_code: file.class_code,
                pim: file.pim,
                group: file.group,
                organization: file.organization,
                professor: file.professor,
                evaluation_date: file.evaluation_date,
            },
            dimensions,
            oral_score: file.oral_score,
            oral_justification: file.oral_justification,
            discussion_mode: file.discussion_mode,
            selected_recommendations: file.selected_recommendations,
            additional_comments: file.additional_comments,
        };

        Ok(Snapshot {
            version: file.version,
            timestamp: file.timestamp,
            record,
        })
    }
}
