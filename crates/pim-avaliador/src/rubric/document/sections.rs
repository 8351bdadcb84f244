use super::layout::{Align, Block, TableBlock, TableColumn, TextRun};
use crate::rubric::domain::Dimension;
use crate::rubric::record::EvaluationRecord;
use crate::rubric::scoring::{truncate_to, ScoreBreakdown, ScoreTable};

pub const REPORT_TITLE: &str = "RELATÓRIO DE AVALIAÇÃO PRELIMINAR DO PIM";

const TABLE_COLUMNS: [(&str, f64, Align); 3] = [
    ("Dimensão Avaliada", 252.0, Align::Left),
    ("Nota Máxima", 72.0, Align::Center),
    ("Nota Atribuída", 86.4, Align::Center),
];

/// Everything the report shows, already computed by the earlier stages.
pub struct ReportContent<'a> {
    pub record: &'a EvaluationRecord,
    pub breakdown: &'a ScoreBreakdown,
    pub recommendations: &'a [String],
    pub narrative: &'a str,
}

pub(crate) fn roman(value: usize) -> String {
    const NUMERALS: [(usize, &str); 13] = [
        (1000, "M"),
        (900, "CM"),
        (500, "D"),
        (400, "CD"),
        (100, "C"),
        (90, "XC"),
        (50, "L"),
        (40, "XL"),
        (10, "X"),
        (9, "IX"),
        (5, "V"),
        (4, "IV"),
        (1, "I"),
    ];

    let mut remaining = value;
    let mut numeral = String::new();
    for (amount, symbol) in NUMERALS {
        while remaining >= amount {
            numeral.push_str(symbol);
            remaining -= amount;
        }
    }
    numeral
}

/// Hands out section numbers in emission order, so skipped sections leave no gaps.
#[derive(Default)]
struct SectionNumbers {
    emitted: usize,
}

impl SectionNumbers {
    fn next(&mut self, title: &str) -> (String, Block) {
        self.emitted += 1;
        let number = roman(self.emitted);
        let heading = Block::Heading(format!("{number}. {title}"));
        (number, heading)
    }
}

fn labelled(label: &str, value: impl AsRef<str>) -> Block {
    Block::Paragraph(vec![
        TextRun::bold(format!("{label}:")),
        TextRun::regular(format!(" {}", value.as_ref())),
    ])
}

fn label_only(label: &str) -> Block {
    Block::Label(vec![TextRun::bold(format!("{label}:"))])
}

pub(crate) fn build_blocks(content: &ReportContent<'_>) -> Vec<Block> {
    let mut sections = SectionNumbers::default();
    let mut blocks = vec![Block::Title(REPORT_TITLE.to_string()), Block::Spacer(4.0)];

    identification(content.record, &mut sections, &mut blocks);
    dimensions(content.record, &mut sections, &mut blocks);
    score_table(content.record, &mut sections, &mut blocks);
    recommendations(content, &mut sections, &mut blocks);

    let (_, heading) = sections.next("Parecer Resumido");
    blocks.push(heading);
    blocks.push(Block::Paragraph(vec![TextRun::regular(content.narrative)]));
    blocks.push(Block::Spacer(6.0));

    final_grades(content, &mut sections, &mut blocks);
    blocks
}

fn identification(record: &EvaluationRecord, sections: &mut SectionNumbers, blocks: &mut Vec<Block>) {
    let identification = &record.identification;
    let (_, heading) = sections.next("Identificação");
    blocks.push(heading);
    blocks.extend([
        labelled("Curso", &identification.course),
        labelled("Turma", &identification.class_code),
        labelled("PIM", &identification.pim),
        labelled("Grupo", &identification.group),
        labelled("Organização/Empresa", &identification.organization),
        labelled("Professor responsável", &identification.professor),
        labelled("Data da avaliação preliminar", identification.formatted_date()),
        Block::Spacer(6.0),
    ]);
}

fn dimensions(record: &EvaluationRecord, sections: &mut SectionNumbers, blocks: &mut Vec<Block>) {
    let (number, heading) = sections.next("Dimensões de Avaliação");
    blocks.push(heading);

    for (index, dimension) in Dimension::ordered().into_iter().enumerate() {
        let evaluation = record.dimension(dimension);
        blocks.push(Block::Heading(format!(
            "{number}.{} {}",
            index + 1,
            dimension.title()
        )));
        blocks.push(labelled("Status", evaluation.status.label()));

        if !evaluation.observations.is_empty() {
            blocks.push(label_only("Observações"));
            blocks.extend(evaluation.observations.iter().cloned().map(Block::Bullet));
        }

        let comments: Vec<&str> = evaluation.comment_lines().collect();
        if !comments.is_empty() {
            blocks.push(label_only("Comentários do Professor"));
            blocks.extend(comments.into_iter().map(|line| Block::Bullet(line.to_string())));
        }

        blocks.push(Block::Spacer(3.0));
    }
}

fn score_table(record: &EvaluationRecord, sections: &mut SectionNumbers, blocks: &mut Vec<Block>) {
    let table = ScoreTable::from_record(record);
    let (_, heading) = sections.next("Tabela de Avaliação");
    blocks.push(heading);

    let mut rows: Vec<Vec<String>> = table
        .rows
        .iter()
        .map(|row| {
            vec![
                row.label.to_string(),
                format!("{:.1}", row.max_score),
                format!("{:.1}", truncate_to(row.assigned, 1)),
            ]
        })
        .collect();
    rows.push(vec![
        "Total".to_string(),
        format!("{:.1}", table.total_max),
        format!("{:.1}", truncate_to(table.total_assigned, 1)),
    ]);

    blocks.push(Block::Table(TableBlock {
        columns: TABLE_COLUMNS
            .iter()
            .map(|(header, width, align)| TableColumn {
                header: header.to_string(),
                width: *width,
                align: *align,
            })
            .collect(),
        rows,
    }));
    blocks.push(Block::Spacer(6.0));
}

fn recommendations(content: &ReportContent<'_>, sections: &mut SectionNumbers, blocks: &mut Vec<Block>) {
    let notes: Vec<&str> = content
        .record
        .additional_comments
        .lines()
        .map(str::trim_end)
        .filter(|line| !line.trim().is_empty())
        .collect();
    if content.recommendations.is_empty() && notes.is_empty() {
        return;
    }

    let (_, heading) = sections.next("Recomendações Gerais para Aprimoramento");
    blocks.push(heading);
    blocks.extend(content.recommendations.iter().cloned().map(Block::Bullet));

    if !notes.is_empty() {
        blocks.push(Block::Spacer(2.0));
        blocks.push(label_only("Notas Adicionais"));
        blocks.extend(
            notes
                .into_iter()
                .map(|line| Block::Paragraph(vec![TextRun::regular(line)])),
        );
    }
    blocks.push(Block::Spacer(6.0));
}

fn final_grades(content: &ReportContent<'_>, sections: &mut SectionNumbers, blocks: &mut Vec<Block>) {
    let breakdown = content.breakdown;
    let (_, heading) = sections.next("Nota Sugerida");
    blocks.push(heading);
    blocks.extend([
        labelled(
            "Nota Objetiva",
            format!(
                "{:.1} (nota atribuída considerando o trabalho avaliado em uma escala de 0,0 a 10,0).",
                breakdown.objective_display()
            ),
        ),
        labelled(
            "Nota Ponderada",
            format!(
                "{:.2} (esta nota considera a avaliação escrita, que corresponde a 70% da nota total do PIM).",
                breakdown.weighted_rounded()
            ),
        ),
        labelled(
            "Parte Oral",
            format!(
                "{:.1} ({}).",
                truncate_to(breakdown.oral, 1),
                content.record.oral_justification.label()
            ),
        ),
        labelled("Nota Final", format!("{:.2}.", breakdown.total_rounded())),
    ]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rubric::scoring::ScoringEngine;

    fn headings(blocks: &[Block]) -> Vec<String> {
        blocks
            .iter()
            .filter_map(|block| match block {
                Block::Heading(text) => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn roman_numerals() {
        let numerals: Vec<String> = (1..=9).map(roman).collect();
        assert_eq!(numerals, ["I", "II", "III", "IV", "V", "VI", "VII", "VIII", "IX"]);
        assert_eq!(roman(14), "XIV");
    }

    #[test]
    fn sections_are_numbered_in_emission_order() {
        let record = EvaluationRecord::new();
        let breakdown = ScoringEngine::score(&record);
        let recommendations = vec!["Revisar citações e eliminar fontes inadequadas".to_string()];
        let blocks = build_blocks(&ReportContent {
            record: &record,
            breakdown: &breakdown,
            recommendations: &recommendations,
            narrative: "Parecer.",
        });

        let headings = headings(&blocks);
        assert_eq!(headings[0], "I. Identificação");
        assert_eq!(headings[1], "II. Dimensões de Avaliação");
        assert_eq!(headings[2], "II.1 APRESENTAÇÃO GERAL DO TRABALHO");
        assert_eq!(headings[7], "II.6 REFERÊNCIAS E CITAÇÕES");
        assert_eq!(
            &headings[8..],
            [
                "III. Tabela de Avaliação",
                "IV. Recomendações Gerais para Aprimoramento",
                "V. Parecer Resumido",
                "VI. Nota Sugerida",
            ]
        );
    }

    #[test]
    fn empty_recommendations_and_notes_skip_the_section() {
        let record = EvaluationRecord::new();
        let breakdown = ScoringEngine::score(&record);
        let blocks = build_blocks(&ReportContent {
            record: &record,
            breakdown: &breakdown,
            recommendations: &[],
            narrative: "Parecer.",
        });

        let headings = headings(&blocks);
        assert!(!headings.iter().any(|heading| heading.contains("Recomendações")));
        assert_eq!(headings.last().map(String::as_str), Some("V. Nota Sugerida"));
    }

    #[test]
    fn score_table_has_total_row() {
        let mut record = EvaluationRecord::new();
        record.dimension_mut(Dimension::Development).score = 2.5;
        let breakdown = ScoringEngine::score(&record);
        let blocks = build_blocks(&ReportContent {
            record: &record,
            breakdown: &breakdown,
            recommendations: &[],
            narrative: "",
        });

        let table = blocks
            .iter()
            .find_map(|block| match block {
                Block::Table(table) => Some(table),
                _ => None,
            })
            .expect("score table present");
        assert_eq!(table.rows.len(), 7);
        assert_eq!(table.rows[2], ["Desenvolvimento", "3.0", "2.5"]);
        assert_eq!(table.rows[6], ["Total", "10.0", "2.5"]);
    }

    #[test]
    fn comments_become_one_bullet_per_line() {
        let mut record = EvaluationRecord::new();
        record.dimension_mut(Dimension::Introduction).comment =
            "Objetivo vago\n\nFalta metodologia".to_string();
        let breakdown = ScoringEngine::score(&record);
        let blocks = build_blocks(&ReportContent {
            record: &record,
            breakdown: &breakdown,
            recommendations: &[],
            narrative: "",
        });

        let bullets: Vec<&str> = blocks
            .iter()
            .filter_map(|block| match block {
                Block::Bullet(text) => Some(text.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(bullets, ["Objetivo vago", "Falta metodologia"]);

        let label = blocks
            .iter()
            .position(|block| {
                *block == Block::Label(vec![TextRun::bold("Comentários do Professor:")])
            })
            .expect("comment label present");
        assert_eq!(blocks[label + 1], Block::Bullet("Objetivo vago".to_string()));
    }
}
