use super::domain::Dimension;
use super::record::EvaluationRecord;
use super::scoring::{truncate_to, ScoreBreakdown};

const METHODOLOGY_PREAMBLE: &str = "A construção de um trabalho acadêmico envolve variáveis \
normativas, aspectos formais de pesquisa e adequação de conteúdos aos tópicos propostos pelo \
roteiro do Projeto Integrado Multidisciplinar. Desse modo, a avaliação do PIM (parte escrita) \
serve ao propósito de contemplar a análise das seguintes dimensões e critérios de ponderação: \
cuidados na elaboração da apresentação geral do texto (10%), introdução (10%), \
desenvolvimento (30%), discussão—identificação e descrição do problema (30%), conclusão \
pertinente aos aspectos estudados (10%) e atenção aos procedimentos de citações e referências \
(10%). Para tanto, segue a distribuição dos pontos com o respectivo desempenho discente para \
cada uma das dimensões avaliadas: ";

/// Assembles the "parecer" paragraph from fixed text and record fields.
pub struct NarrativeSynthesizer;

impl NarrativeSynthesizer {
    pub fn synthesize(record: &EvaluationRecord, breakdown: &ScoreBreakdown) -> String {
        let clauses: Vec<String> = Dimension::ordered()
            .into_iter()
            .map(|dimension| dimension_clause(record, dimension))
            .collect();

        format!(
            "{METHODOLOGY_PREAMBLE}{} {}",
            clauses.join(" "),
            closing_clauses(record, breakdown)
        )
    }
}

fn dimension_clause(record: &EvaluationRecord, dimension: Dimension) -> String {
    let evaluation = record.dimension(dimension);
    let mut clause = format!(
        "{}: Nota {:.1}/{:.1} ({})",
        dimension.label(),
        truncate_to(evaluation.score, 1),
        dimension.max_weight(),
        evaluation.status.label()
    );

    let mut details: Vec<&str> = evaluation.plain_observations().collect();
    let comment = evaluation.comment.trim();
    if !comment.is_empty() {
        details.push(comment);
    }

    if details.is_empty() {
        clause.push('.');
    } else {
        clause.push_str(". ");
        clause.push_str(&details.join(", "));
        clause.push('.');
    }

    clause
}

fn closing_clauses(record: &EvaluationRecord, breakdown: &ScoreBreakdown) -> String {
    format!(
        "Parte Escrita: Nota {:.2}/{:.1}. Parte Oral: Nota {:.1}/{:.1} ({}). Nota Final: {:.2}/10.0.",
        breakdown.weighted_rounded(),
        ScoreBreakdown::written_max(),
        truncate_to(breakdown.oral, 1),
        ScoreBreakdown::oral_max(),
        record.oral_justification.label(),
        breakdown.total_rounded()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rubric::domain::{DimensionStatus, DiscussionMode, OralJustification};
    use crate::rubric::scoring::ScoringEngine;

    fn sample_record() -> EvaluationRecord {
        let mut record = EvaluationRecord::new();
        let scores = [1.0, 1.0, 2.0, 2.0, 0.5, 1.0];
        for (dimension, score) in Dimension::ordered().into_iter().zip(scores) {
            record.dimension_mut(dimension).score = score;
        }
        record.oral_score = 2.0;
        record.oral_justification = OralJustification::Presented;
        record
    }

    #[test]
    fn narrative_follows_template() {
        let mut record = sample_record();
        let discussion = record.dimension_mut(Dimension::Discussion);
        discussion.status = DimensionStatus::Partial;
        discussion.observations = vec![
            DiscussionMode::Problem.tagged("Ausência de dados e análise crítica do problema"),
            DiscussionMode::Solution.tagged("Solução pertinente, mas com detalhamento limitado"),
        ];
        discussion.comment = "Rever a seção 4".to_string();

        let breakdown = ScoringEngine::score(&record);
        let narrative = NarrativeSynthesizer::synthesize(&record, &breakdown);

        assert!(narrative.starts_with("A construção de um trabalho acadêmico"));
        assert!(narrative.contains("desenvolvimento (30%)"));
        assert!(narrative.contains("discussão—identificação e descrição do problema (30%)"));
        assert!(narrative.contains("Apresentação Geral: Nota 1.0/1.0 (Não)."));
        assert!(narrative.contains(
            "Discussão: Nota 2.0/3.0 (Parcial). Ausência de dados e análise crítica do problema, \
             Solução pertinente, mas com detalhamento limitado, Rever a seção 4."
        ));
        assert!(!narrative.contains("[Problema]"));
        assert!(!narrative.contains("[Solução]"));
        assert!(narrative.ends_with(
            "Parte Escrita: Nota 5.25/7.0. Parte Oral: Nota 2.0/3.0 (Apresentação realizada). \
             Nota Final: 7.25/10.0."
        ));
    }

    #[test]
    fn dimensions_appear_in_canonical_order() {
        let record = sample_record();
        let narrative =
            NarrativeSynthesizer::synthesize(&record, &ScoringEngine::score(&record));
        let positions: Vec<usize> = Dimension::ordered()
            .into_iter()
            .map(|dimension| {
                narrative
                    .find(&format!("{}: Nota", dimension.label()))
                    .expect("clause present")
            })
            .collect();
        assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn empty_record_uses_default_justification() {
        let record = EvaluationRecord::new();
        let narrative =
            NarrativeSynthesizer::synthesize(&record, &ScoringEngine::score(&record));
        assert!(narrative.contains("Parte Escrita: Nota 0.00/7.0."));
        assert!(narrative.contains("(Grupo não realizou apresentação)"));
    }
}
