use super::domain::Dimension;

/// Hard cap on generated recommendations. Earlier dimensions win.
pub const MAX_RECOMMENDATIONS: usize = 5;

pub const FALLBACK_RECOMMENDATION: &str =
    "Manter a qualidade do trabalho e aprofundar análises quando possível";

/// The two canned recommendations appended when a dimension scores below its threshold.
pub const fn canned_recommendations(dimension: Dimension) -> [&'static str; 2] {
    match dimension {
        Dimension::Presentation => [
            "Revisar estrutura do trabalho conforme normas ABNT",
            "Corrigir erros gramaticais e melhorar clareza da linguagem",
        ],
        Dimension::Introduction => [
            "Melhorar apresentação do contexto e objetivos do trabalho",
            "Detalhar melhor a metodologia e estrutura adotadas",
        ],
        Dimension::Development => [
            "Aprofundar a integração entre teoria e prática",
            "Incluir mais dados, gráficos e exemplos concretos",
        ],
        Dimension::Discussion => [
            "Estruturar melhor a análise e discussão do problema",
            "Apresentar mais evidências e dados que sustentem a análise",
        ],
        Dimension::Conclusion => [
            "Elaborar conclusões mais consistentes e bem fundamentadas",
            "Propor encaminhamentos práticos e viáveis",
        ],
        Dimension::References => [
            "Padronizar todas as referências conforme norma ABNT",
            "Revisar citações e eliminar fontes inadequadas",
        ],
    }
}

/// Derives improvement recommendations from per-dimension scores.
pub struct RecommendationSelector;

impl RecommendationSelector {
    /// `score_of` is consulted once per dimension in canonical order.
    pub fn select<F>(score_of: F) -> Vec<String>
    where
        F: Fn(Dimension) -> f64,
    {
        let mut recommendations: Vec<String> = Dimension::ordered()
            .into_iter()
            .filter(|dimension| score_of(*dimension) < dimension.recommendation_threshold())
            .flat_map(canned_recommendations)
            .map(str::to_string)
            .collect();

        if recommendations.is_empty() {
            recommendations.push(FALLBACK_RECOMMENDATION.to_string());
        }

        recommendations.truncate(MAX_RECOMMENDATIONS);
        recommendations
    }

    /// Merges the evaluator's selections with generated ones, keeping selections
    /// first and dropping duplicates.
    pub fn merge(selected: &[String], generated: &[String]) -> Vec<String> {
        let mut merged: Vec<String> = Vec::with_capacity(selected.len() + generated.len());
        for recommendation in selected.iter().chain(generated) {
            if !merged.contains(recommendation) {
                merged.push(recommendation.clone());
            }
        }
        merged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rubric::catalog::RubricCatalog;

    #[test]
    fn all_zero_scores_truncate_to_first_five() {
        let selected = RecommendationSelector::select(|_| 0.0);
        assert_eq!(
            selected,
            vec![
                "Revisar estrutura do trabalho conforme normas ABNT",
                "Corrigir erros gramaticais e melhorar clareza da linguagem",
                "Melhorar apresentação do contexto e objetivos do trabalho",
                "Detalhar melhor a metodologia e estrutura adotadas",
                "Aprofundar a integração entre teoria e prática",
            ]
        );
    }

    #[test]
    fn strong_scores_fall_back_to_single_item() {
        let selected = RecommendationSelector::select(Dimension::max_weight);
        assert_eq!(selected, vec![FALLBACK_RECOMMENDATION.to_string()]);
    }

    #[test]
    fn threshold_is_strict() {
        let selected = RecommendationSelector::select(|dimension| match dimension {
            Dimension::Conclusion => 0.69,
            other => other.recommendation_threshold(),
        });
        assert_eq!(selected, canned_recommendations(Dimension::Conclusion).to_vec());
    }

    #[test]
    fn earlier_dimensions_take_priority() {
        let selected = RecommendationSelector::select(|dimension| match dimension {
            Dimension::Discussion | Dimension::Conclusion | Dimension::References => 0.0,
            other => other.max_weight(),
        });
        assert_eq!(selected.len(), MAX_RECOMMENDATIONS);
        assert_eq!(selected[0], canned_recommendations(Dimension::Discussion)[0]);
        assert_eq!(selected[4], canned_recommendations(Dimension::References)[0]);
    }

    #[test]
    fn canned_items_exist_in_general_bank() {
        let catalog = RubricCatalog::standard();
        for dimension in Dimension::ordered() {
            for item in canned_recommendations(dimension) {
                assert!(catalog.contains_recommendation(item), "{item}");
            }
        }
    }

    #[test]
    fn merge_keeps_selected_first_without_duplicates() {
        let selected = vec!["B".to_string(), "A".to_string()];
        let generated = vec!["A".to_string(), "C".to_string()];
        assert_eq!(
            RecommendationSelector::merge(&selected, &generated),
            vec!["B", "A", "C"]
        );
    }
}
