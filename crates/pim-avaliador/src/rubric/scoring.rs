use super::domain::Dimension;
use super::record::{EvaluationRecord, ORAL_MAX};
use serde::Serialize;
use std::io::Write;
use tracing::debug;

/// Share of the final grade carried by the written part.
pub const WRITTEN_WEIGHT: f64 = 0.70;

/// Scores derived from a record. Recomputed on demand, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub objective: f64,
    pub weighted: f64,
    pub oral: f64,
    pub total: f64,
}

impl ScoreBreakdown {
    pub fn objective_display(&self) -> f64 {
        truncate_to(self.objective, 1)
    }

    pub fn weighted_rounded(&self) -> f64 {
        round_to(self.weighted, 2)
    }

    pub fn total_rounded(&self) -> f64 {
        round_to(self.weighted_rounded() + self.oral, 2)
    }

    pub fn written_max() -> f64 {
        10.0 * WRITTEN_WEIGHT
    }

    pub fn oral_max() -> f64 {
        ORAL_MAX
    }
}

/// Stateless scorer over an evaluation record.
pub struct ScoringEngine;

impl ScoringEngine {
    pub fn score(record: &EvaluationRecord) -> ScoreBreakdown {
        let objective: f64 = record
            .dimension_scores()
            .iter()
            .map(|(_, score)| *score)
            .sum();
        let weighted = objective * WRITTEN_WEIGHT;
        let oral = record.oral_score;
        let total = weighted + oral;

        debug!(objective, weighted, oral, total, "computed score breakdown");

        ScoreBreakdown {
            objective,
            weighted,
            oral,
            total,
        }
    }
}

/// Truncates toward zero at the given number of decimal places. The epsilon
/// keeps values such as 2.3 (stored as 2.2999...) at 2.3.
pub fn truncate_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    let scaled = value * factor;
    let nudged = if scaled >= 0.0 {
        (scaled + 1e-9).floor()
    } else {
        (scaled - 1e-9).ceil()
    };
    nudged / factor
}

pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Dimension × max × assigned grid shared by the rendered report and CSV exports.
#[derive(Debug, Clone, Serialize)]
pub struct ScoreTable {
    pub rows: Vec<ScoreTableRow>,
    pub total_max: f64,
    pub total_assigned: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScoreTableRow {
    pub dimension: Dimension,
    pub label: &'static str,
    pub max_score: f64,
    pub assigned: f64,
    pub status: &'static str,
}

impl ScoreTable {
    pub fn from_record(record: &EvaluationRecord) -> Self {
        let rows: Vec<ScoreTableRow> = Dimension::ordered()
            .into_iter()
            .map(|dimension| {
                let evaluation = record.dimension(dimension);
                ScoreTableRow {
                    dimension,
                    label: dimension.label(),
                    max_score: dimension.max_weight(),
                    assigned: evaluation.score,
                    status: evaluation.status.label(),
                }
            })
            .collect();

        let total_max = rows.iter().map(|row| row.max_score).sum();
        let total_assigned = rows.iter().map(|row| row.assigned).sum();

        Self {
            rows,
            total_max,
            total_assigned,
        }
    }

    /// Writes the table as CSV with one-decimal score columns.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), csv::Error> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        csv_writer.write_record(["Dimensão", "Nota Máxima", "Nota Atribuída", "Status"])?;
        for row in &self.rows {
            csv_writer.write_record([
                row.label.to_string(),
                format!("{:.1}", row.max_score),
                format!("{:.1}", truncate_to(row.assigned, 1)),
                row.status.to_string(),
            ])?;
        }
        csv_writer.write_record([
            "Total".to_string(),
            format!("{:.1}", self.total_max),
            format!("{:.1}", truncate_to(self.total_assigned, 1)),
            String::new(),
        ])?;
        csv_writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rubric::domain::DimensionStatus;

    fn record_with(scores: [f64; 6], oral: f64) -> EvaluationRecord {
        let mut record = EvaluationRecord::new();
        for (dimension, score) in Dimension::ordered().into_iter().zip(scores) {
            record.dimension_mut(dimension).score = score;
        }
        record.oral_score = oral;
        record
    }

    #[test]
    fn reference_example_scores_match() {
        let record = record_with([1.0, 1.0, 2.0, 2.0, 0.5, 1.0], 2.0);
        let breakdown = ScoringEngine::score(&record);

        assert!((breakdown.objective - 7.5).abs() < 1e-9);
        assert_eq!(breakdown.weighted_rounded(), 5.25);
        assert_eq!(breakdown.total_rounded(), 7.25);
        assert_eq!(format!("{:.2}", breakdown.weighted), "5.25");
    }

    #[test]
    fn all_zero_scores_produce_zero_grades() {
        let breakdown = ScoringEngine::score(&EvaluationRecord::new());
        assert_eq!(breakdown.objective, 0.0);
        assert_eq!(breakdown.weighted_rounded(), 0.0);
        assert_eq!(breakdown.total_rounded(), 0.0);
    }

    #[test]
    fn full_marks_reach_ten() {
        let record = record_with([1.0, 1.0, 3.0, 3.0, 1.0, 1.0], 3.0);
        let breakdown = ScoringEngine::score(&record);
        assert!((breakdown.objective - 10.0).abs() < 1e-9);
        assert_eq!(breakdown.weighted_rounded(), 7.0);
        assert_eq!(breakdown.total_rounded(), 10.0);
    }

    #[test]
    fn breakdown_tracks_record_edits() {
        let mut record = record_with([1.0, 1.0, 2.0, 2.0, 0.5, 1.0], 0.0);
        let before = ScoringEngine::score(&record);
        record.dimension_mut(Dimension::Conclusion).score = 1.0;
        let after = ScoringEngine::score(&record);
        assert!((after.objective - before.objective - 0.5).abs() < 1e-9);
    }

    #[test]
    fn truncation_and_rounding_helpers() {
        assert_eq!(truncate_to(2.29, 1), 2.2);
        assert_eq!(truncate_to(2.3, 1), 2.3);
        assert_eq!(truncate_to(0.1 + 0.2, 1), 0.3);
        assert_eq!(round_to(5.249, 2), 5.25);
        assert_eq!(round_to(4.9049, 2), 4.9);
    }

    #[test]
    fn score_table_csv_lists_every_dimension_and_total() {
        let mut record = record_with([1.0, 0.5, 2.0, 2.5, 0.5, 1.0], 0.0);
        record.dimension_mut(Dimension::Presentation).status = DimensionStatus::Yes;
        let table = ScoreTable::from_record(&record);
        assert_eq!(table.rows.len(), 6);
        assert!((table.total_assigned - 7.5).abs() < 1e-9);

        let mut buffer = Vec::new();
        table.write_csv(&mut buffer).expect("csv writes");
        let csv = String::from_utf8(buffer).expect("utf8");
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 8);
        assert_eq!(lines[1], "Apresentação Geral,1.0,1.0,Sim");
        assert_eq!(lines[7], "Total,10.0,7.5,");
    }
}
