//! Minimal PDF 1.4 serializer for laid-out pages: base-14 Helvetica fonts,
//! text, filled and stroked rectangles.

use super::layout::{DrawOp, LaidOutDocument, Page};
use super::metrics::{encode_literal, Font};
use crate::rubric::error::EvaluationError;
use chrono::{DateTime, Utc};
use std::io::Write;

const CATALOG_ID: usize = 1;
const PAGES_ID: usize = 2;
const INFO_ID: usize = 5;
const FIRST_PAGE_ID: usize = 6;
const FONTS: [(usize, Font); 2] = [(3, Font::Regular), (4, Font::Bold)];
const BORDER_WIDTH: f64 = 0.5;

#[derive(Debug, Clone)]
pub struct PdfMetadata {
    pub title: String,
    pub created_at: DateTime<Utc>,
}

struct ObjectWriter {
    buffer: Vec<u8>,
    offsets: Vec<(usize, usize)>,
}

impl ObjectWriter {
    fn new() -> Result<Self, EvaluationError> {
        let mut writer = Self {
            buffer: Vec::new(),
            offsets: Vec::new(),
        };
        writer.write(b"%PDF-1.4\n%\xe2\xe3\xcf\xd3\n")?;
        Ok(writer)
    }

    fn write(&mut self, bytes: &[u8]) -> Result<(), EvaluationError> {
        self.buffer
            .write_all(bytes)
            .map_err(|err| EvaluationError::render(format!("pdf write failed: {err}")))
    }

    fn object(&mut self, id: usize, body: &str) -> Result<(), EvaluationError> {
        self.offsets.push((id, self.buffer.len()));
        self.write(format!("{id} 0 obj\n{body}\nendobj\n").as_bytes())
    }

    fn stream(&mut self, id: usize, content: &str) -> Result<(), EvaluationError> {
        self.offsets.push((id, self.buffer.len()));
        self.write(
            format!(
                "{id} 0 obj\n<< /Length {} >>\nstream\n{content}\nendstream\nendobj\n",
                content.len()
            )
            .as_bytes(),
        )
    }

    fn finish(mut self) -> Result<Vec<u8>, EvaluationError> {
        self.offsets.sort_by_key(|(id, _)| *id);
        let size = self.offsets.len() + 1;
        let xref_offset = self.buffer.len();

        let mut xref = format!("xref\n0 {size}\n0000000000 65535 f \n");
        for (_, offset) in &self.offsets {
            xref.push_str(&format!("{offset:010} 00000 n \n"));
        }
        xref.push_str(&format!(
            "trailer\n<< /Size {size} /Root {CATALOG_ID} 0 R /Info {INFO_ID} 0 R >>\nstartxref\n{xref_offset}\n%%EOF\n"
        ));
        self.write(xref.as_bytes())?;
        Ok(self.buffer)
    }
}

fn number(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    if rounded == 0.0 {
        return "0".to_string();
    }
    let formatted = format!("{rounded:.2}");
    formatted
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}

fn content_stream(page: &Page) -> String {
    let mut ops = String::new();
    for op in &page.ops {
        match op {
            DrawOp::FillRect {
                x,
                y,
                width,
                height,
                gray,
            } => {
                ops.push_str(&format!(
                    "q {} g {} {} {} {} re f Q\n",
                    number(*gray),
                    number(*x),
                    number(*y),
                    number(*width),
                    number(*height)
                ));
            }
            DrawOp::StrokeRect {
                x,
                y,
                width,
                height,
            } => {
                ops.push_str(&format!(
                    "q {} w 0 G {} {} {} {} re S Q\n",
                    number(BORDER_WIDTH),
                    number(*x),
                    number(*y),
                    number(*width),
                    number(*height)
                ));
            }
            DrawOp::Text { x, y, size, runs } => {
                if runs.iter().all(|run| run.text.is_empty()) {
                    continue;
                }
                ops.push_str(&format!("BT 0 g {} {} Td", number(*x), number(*y)));
                for run in runs {
                    ops.push_str(&format!(
                        " /{} {} Tf ({}) Tj",
                        run.font.resource_name(),
                        number(*size),
                        encode_literal(&run.text)
                    ));
                }
                ops.push_str(" ET\n");
            }
        }
    }
    ops
}

/// Serializes every page of `document` into a single PDF byte buffer.
pub fn write_pdf(
    document: &LaidOutDocument,
    metadata: &PdfMetadata,
) -> Result<Vec<u8>, EvaluationError> {
    if document.pages.is_empty() {
        return Err(EvaluationError::render("document has no pages"));
    }

    let geometry = document.geometry;
    let page_ids: Vec<usize> = (0..document.pages.len())
        .map(|index| FIRST_PAGE_ID + 2 * index)
        .collect();
    let kids = page_ids
        .iter()
        .map(|id| format!("{id} 0 R"))
        .collect::<Vec<_>>()
        .join(" ");
    let font_resources = FONTS
        .iter()
        .map(|(id, font)| format!("/{} {id} 0 R", font.resource_name()))
        .collect::<Vec<_>>()
        .join(" ");

    let mut writer = ObjectWriter::new()?;
    writer.object(
        CATALOG_ID,
        &format!("<< /Type /Catalog /Pages {PAGES_ID} 0 R >>"),
    )?;
    writer.object(
        PAGES_ID,
        &format!(
            "<< /Type /Pages /Kids [{kids}] /Count {} >>",
            document.pages.len()
        ),
    )?;
    for (id, font) in FONTS {
        writer.object(
            id,
            &format!(
                "<< /Type /Font /Subtype /Type1 /BaseFont /{} /Encoding /WinAnsiEncoding >>",
                font.base_font()
            ),
        )?;
    }
    writer.object(
        INFO_ID,
        &format!(
            "<< /Title ({}) /Producer (pim-avaliador) /CreationDate (D:{}Z) >>",
            encode_literal(&metadata.title),
            metadata.created_at.format("%Y%m%d%H%M%S")
        ),
    )?;

    for (page, page_id) in document.pages.iter().zip(&page_ids) {
        let content_id = page_id + 1;
        writer.object(
            *page_id,
            &format!(
                "<< /Type /Page /Parent {PAGES_ID} 0 R /MediaBox [0 0 {} {}] \
                 /Resources << /Font << {font_resources} >> >> /Contents {content_id} 0 R >>",
                number(geometry.width),
                number(geometry.height)
            ),
        )?;
        writer.stream(content_id, &content_stream(page))?;
    }

    writer.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rubric::document::layout::{stamp_footers, PageGeometry, TextRun};
    use chrono::TimeZone;

    fn metadata() -> PdfMetadata {
        PdfMetadata {
            title: "Relatório".to_string(),
            created_at: Utc
                .with_ymd_and_hms(2024, 5, 17, 14, 30, 0)
                .single()
                .expect("valid timestamp"),
        }
    }

    fn two_page_document() -> LaidOutDocument {
        let page = |text: &str| Page {
            ops: vec![DrawOp::Text {
                x: 43.2,
                y: 790.0,
                size: 8.0,
                runs: vec![TextRun::regular(text)],
            }],
            footer: None,
        };
        stamp_footers(vec![page("um"), page("dois")], PageGeometry::a4())
    }

    #[test]
    fn number_formatting_trims_trailing_zeros() {
        assert_eq!(number(595.28), "595.28");
        assert_eq!(number(36.0), "36");
        assert_eq!(number(0.5), "0.5");
        assert_eq!(number(-0.001), "0");
    }

    #[test]
    fn pdf_has_header_pages_and_trailer() {
        let bytes = write_pdf(&two_page_document(), &metadata()).expect("pdf renders");
        let text = String::from_utf8_lossy(&bytes);

        assert!(bytes.starts_with(b"%PDF-1.4"));
        assert!(text.contains("/Type /Pages /Kids [6 0 R 8 0 R] /Count 2"));
        assert!(text.contains("/BaseFont /Helvetica-Bold"));
        assert!(text.contains("(P\\341gina 2 de 2) Tj"));
        assert!(text.contains("/CreationDate (D:20240517143000Z)"));
        assert!(text.trim_end().ends_with("%%EOF"));
    }

    #[test]
    fn xref_offsets_point_at_objects() {
        let bytes = write_pdf(&two_page_document(), &metadata()).expect("pdf renders");
        let text = String::from_utf8_lossy(&bytes).into_owned();
        let xref_start = text.find("xref\n").expect("xref present");
        let entries: Vec<usize> = text[xref_start..]
            .lines()
            .skip(3)
            .take_while(|line| line.ends_with(" n "))
            .map(|line| line[..10].parse().expect("numeric offset"))
            .collect();

        assert_eq!(entries.len(), 9);
        for (index, offset) in entries.iter().enumerate() {
            let expected = format!("{} 0 obj", index + 1);
            assert!(
                bytes[*offset..].starts_with(expected.as_bytes()),
                "object {} not at {offset}",
                index + 1
            );
        }
    }

    #[test]
    fn empty_document_is_rejected() {
        let document = LaidOutDocument {
            geometry: PageGeometry::a4(),
            pages: Vec::new(),
        };
        let err = write_pdf(&document, &metadata()).expect_err("no pages");
        assert!(matches!(err, EvaluationError::RenderFailure { .. }));
    }
}
