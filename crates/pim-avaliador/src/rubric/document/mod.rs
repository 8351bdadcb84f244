//! Report rendering: blocks are flowed into pages, footers are stamped once the
//! page count is known, and only then is the PDF serialized.

pub mod layout;
pub mod metrics;
pub mod pdf;
pub mod sections;

use self::layout::{stamp_footers, LaidOutDocument, PageGeometry};
use self::pdf::{write_pdf, PdfMetadata};
use self::sections::{build_blocks, ReportContent, REPORT_TITLE};
use super::error::EvaluationError;
use super::record::EvaluationRecord;
use super::scoring::ScoreBreakdown;
use chrono::Utc;
use tracing::info;

pub use self::layout::footer_label;

/// Turns an evaluation and its derived values into a paginated PDF.
pub struct DocumentRenderer;

impl DocumentRenderer {
    /// Runs both pagination passes without serializing.
    pub fn layout(
        record: &EvaluationRecord,
        breakdown: &ScoreBreakdown,
        recommendations: &[String],
        narrative: &str,
    ) -> Result<LaidOutDocument, EvaluationError> {
        let blocks = build_blocks(&ReportContent {
            record,
            breakdown,
            recommendations,
            narrative,
        });
        let geometry = PageGeometry::a4();
        let pages = layout::layout(&blocks, geometry)?;
        Ok(stamp_footers(pages, geometry))
    }

    pub fn render(
        record: &EvaluationRecord,
        breakdown: &ScoreBreakdown,
        recommendations: &[String],
        narrative: &str,
    ) -> Result<Vec<u8>, EvaluationError> {
        let document = Self::layout(record, breakdown, recommendations, narrative)?;
        let metadata = PdfMetadata {
            title: document_title(record),
            created_at: Utc::now(),
        };
        let bytes = write_pdf(&document, &metadata)?;

        info!(
            pages = document.page_count(),
            bytes = bytes.len(),
            "rendered evaluation report"
        );
        Ok(bytes)
    }
}

fn document_title(record: &EvaluationRecord) -> String {
    let class_code = record.identification.class_code.trim();
    if class_code.is_empty() {
        REPORT_TITLE.to_string()
    } else {
        format!("{REPORT_TITLE} - {class_code}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rubric::domain::Dimension;
    use crate::rubric::scoring::ScoringEngine;

    fn long_comment_record() -> EvaluationRecord {
        let mut record = EvaluationRecord::new();
        record.identification.class_code = "LG3P01".to_string();
        let comment = (1..=40)
            .map(|line| format!("Comentário detalhado número {line} sobre a seção avaliada"))
            .collect::<Vec<_>>()
            .join("\n");
        for dimension in Dimension::ordered() {
            record.dimension_mut(dimension).comment = comment.clone();
        }
        record
    }

    #[test]
    fn short_report_fits_one_page() {
        let record = EvaluationRecord::new();
        let breakdown = ScoringEngine::score(&record);
        let document = DocumentRenderer::layout(&record, &breakdown, &[], "Parecer.")
            .expect("layout succeeds");
        assert_eq!(document.page_count(), 1);
        assert_eq!(document.footer(0), Some("Página 1 de 1"));
    }

    #[test]
    fn last_footer_reports_total_pages() {
        let record = long_comment_record();
        let breakdown = ScoringEngine::score(&record);
        let document = DocumentRenderer::layout(&record, &breakdown, &[], "Parecer.")
            .expect("layout succeeds");

        let total = document.page_count();
        assert!(total >= 2, "expected several pages, got {total}");
        for index in 0..total {
            assert_eq!(
                document.footer(index),
                Some(footer_label(index + 1, total).as_str())
            );
        }
        assert_eq!(
            document.footer(total - 1),
            Some(format!("Página {total} de {total}").as_str())
        );
    }

    #[test]
    fn rendered_bytes_form_a_pdf_with_matching_page_count() {
        let record = long_comment_record();
        let breakdown = ScoringEngine::score(&record);
        let recommendations = vec!["Revisar citações e eliminar fontes inadequadas".to_string()];
        let narrative = "Parecer resumido do grupo.";

        let total = DocumentRenderer::layout(&record, &breakdown, &recommendations, narrative)
            .expect("layout succeeds")
            .page_count();
        let bytes = DocumentRenderer::render(&record, &breakdown, &recommendations, narrative)
            .expect("render succeeds");
        let text = String::from_utf8_lossy(&bytes);

        assert!(bytes.starts_with(b"%PDF-1.4"));
        assert!(text.contains(&format!("/Count {total}")));
        assert!(text.contains(&format!("gina {total} de {total}) Tj")));
        assert!(text.contains("/Title (RELAT\\323RIO DE AVALIA\\307\\303O PRELIMINAR DO PIM - LG3P01)"));
    }
}
