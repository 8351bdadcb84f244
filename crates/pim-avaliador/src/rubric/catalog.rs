use super::domain::{
    Dimension, DimensionStatus, DiscussionMode, OralJustification, SuggestionSource,
};
use super::error::EvaluationError;
use serde::Serialize;
use std::collections::BTreeMap;

/// Static rubric definition: observation banks per dimension and the general
/// recommendation bank the evaluator selects from.
#[derive(Debug)]
pub struct RubricCatalog {
    banks: BTreeMap<Dimension, SuggestionSource>,
    general_recommendations: Vec<&'static str>,
}

impl RubricCatalog {
    pub fn standard() -> Self {
        Self {
            banks: standard_banks(),
            general_recommendations: standard_general_recommendations(),
        }
    }

    pub fn suggestions(&self, dimension: Dimension) -> &SuggestionSource {
        // Every dimension is populated by `standard_banks`.
        &self.banks[&dimension]
    }

    pub fn observations(&self, dimension: Dimension, mode: DiscussionMode) -> &[&'static str] {
        self.suggestions(dimension).entries(mode)
    }

    /// Maps a selected observation to the form stored on the record. Moded banks
    /// store the observation prefixed with its mode tag; an already tagged entry
    /// is accepted when the tag matches a mode whose list contains the text.
    pub fn resolve_observation(
        &self,
        dimension: Dimension,
        mode: DiscussionMode,
        observation: &str,
    ) -> Result<String, EvaluationError> {
        let source = self.suggestions(dimension);
        let unknown = || EvaluationError::UnknownObservation {
            dimension,
            observation: observation.to_string(),
        };

        match source {
            SuggestionSource::Flat(entries) => entries
                .iter()
                .find(|entry| **entry == observation)
                .map(|entry| entry.to_string())
                .ok_or_else(unknown),
            SuggestionSource::Moded(_) => {
                let (mode, text) =
                    DiscussionMode::split_tag(observation).unwrap_or((mode, observation));
                if source.entries(mode).contains(&text) {
                    Ok(mode.tagged(text))
                } else {
                    Err(unknown())
                }
            }
        }
    }

    /// Checks an observation already in stored form.
    pub fn contains_observation(&self, dimension: Dimension, stored: &str) -> bool {
        let source = self.suggestions(dimension);
        match source {
            SuggestionSource::Flat(entries) => entries.contains(&stored),
            SuggestionSource::Moded(_) => match DiscussionMode::split_tag(stored) {
                Some((mode, text)) => source.entries(mode).contains(&text),
                None => false,
            },
        }
    }

    pub fn general_recommendations(&self) -> &[&'static str] {
        &self.general_recommendations
    }

    pub fn contains_recommendation(&self, recommendation: &str) -> bool {
        self.general_recommendations.contains(&recommendation)
    }

    pub fn view(&self) -> RubricCatalogView {
        let dimensions = Dimension::ordered()
            .into_iter()
            .map(|dimension| {
                let source = self.suggestions(dimension);
                let suggestions = if source.is_moded() {
                    DiscussionMode::ordered()
                        .into_iter()
                        .map(|mode| SuggestionGroupView {
                            mode: Some(mode),
                            entries: source.entries(mode).to_vec(),
                        })
                        .collect()
                } else {
                    vec![SuggestionGroupView {
                        mode: None,
                        entries: source.entries(DiscussionMode::default()).to_vec(),
                    }]
                };

                DimensionView {
                    dimension,
                    label: dimension.label(),
                    title: dimension.title(),
                    max_weight: dimension.max_weight(),
                    threshold: dimension.recommendation_threshold(),
                    suggestions,
                }
            })
            .collect();

        RubricCatalogView {
            dimensions,
            statuses: DimensionStatus::ordered()
                .into_iter()
                .map(|value| ChoiceView {
                    value,
                    label: value.label(),
                })
                .collect(),
            oral_justifications: OralJustification::ordered()
                .into_iter()
                .map(|value| ChoiceView {
                    value,
                    label: value.label(),
                })
                .collect(),
            general_recommendations: self.general_recommendations.clone(),
        }
    }
}

impl Default for RubricCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RubricCatalogView {
    pub dimensions: Vec<DimensionView>,
    pub statuses: Vec<ChoiceView<DimensionStatus>>,
    pub oral_justifications: Vec<ChoiceView<OralJustification>>,
    pub general_recommendations: Vec<&'static str>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DimensionView {
    pub dimension: Dimension,
    pub label: &'static str,
    pub title: &'static str,
    pub max_weight: f64,
    pub threshold: f64,
    pub suggestions: Vec<SuggestionGroupView>,
}

/// A selectable option with its display label.
#[derive(Debug, Clone, Serialize)]
pub struct ChoiceView<T> {
    pub value: T,
    pub label: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct SuggestionGroupView {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<DiscussionMode>,
    pub entries: Vec<&'static str>,
}

fn standard_banks() -> BTreeMap<Dimension, SuggestionSource> {
    BTreeMap::from([
        (
            Dimension::Presentation,
            SuggestionSource::Flat(vec![
                "Faltam diversos elementos obrigatórios conforme normas ABNT",
                "Diagramação inadequada e desorganizada",
                "Linguagem com erros gramaticais e informalidade",
                "Estrutura conforme normas, mas com pequenos ajustes necessários",
                "Excelente apresentação e conformidade com normas",
            ]),
        ),
        (
            Dimension::Introduction,
            SuggestionSource::Flat(vec![
                "Falta contexto claro sobre a empresa e o tema",
                "Objetivos não estão explicitamente definidos",
                "Metodologia e estrutura do trabalho não mencionadas",
                "Introdução adequada, mas carece de maior profundidade",
                "Excelente introdução com contexto, objetivos e metodologia bem definidos",
            ]),
        ),
        (
            Dimension::Development,
            SuggestionSource::Flat(vec![
                "Abrangência insuficiente das disciplinas propostas",
                "Fraca integração entre teoria e prática",
                "Faltam dados, gráficos e visualizações para suportar análise",
                "Desenvolvimento parcial, com bom conteúdo mas faltam aplicações práticas",
                "Excelente desenvolvimento com integração teórica-prática bem executada",
            ]),
        ),
        (
            Dimension::Discussion,
            SuggestionSource::Moded(vec![
                (
                    DiscussionMode::Problem,
                    vec![
                        "Sem aplicação das etapas metodológicas indicadas",
                        "Ausência de dados e análise crítica do problema",
                        "Contextualização superficial das causas do problema",
                        "Discussão presente, mas com análise crítica limitada",
                        "Excelente discussão com identificação clara do problema e análise profunda",
                    ],
                ),
                (
                    DiscussionMode::Solution,
                    vec![
                        "Solução proposta não dialoga com o problema identificado",
                        "Faltam critérios de viabilidade para a solução apresentada",
                        "Ausência de plano de implementação e indicadores de acompanhamento",
                        "Solução pertinente, mas com detalhamento limitado",
                        "Excelente proposta de solução, viável e bem fundamentada",
                    ],
                ),
            ]),
        ),
        (
            Dimension::Conclusion,
            SuggestionSource::Flat(vec![
                "Seção não foi desenvolvida",
                "Conclusão genérica sem síntese dos achados",
                "Faltam encaminhamentos concretos e contribuições práticas",
                "Conclusão adequada, mas carece de maior conexão com objetivos",
                "Excelente conclusão com síntese clara e contribuições bem articuladas",
            ]),
        ),
        (
            Dimension::References,
            SuggestionSource::Flat(vec![
                "Problemas significativos de padronização e duplicidade",
                "Citações incorretas ou não estão em norma ABNT",
                "Faltam referências ou há excesso de fontes não acadêmicas",
                "Referências adequadas, mas com pequenos problemas de formatação",
                "Excelente padronização das referências e citações conforme ABNT",
            ]),
        ),
    ])
}

fn standard_general_recommendations() -> Vec<&'static str> {
    vec![
        "Revisar estrutura do trabalho conforme normas ABNT",
        "Corrigir erros gramaticais e melhorar clareza da linguagem",
        "Melhorar apresentação do contexto e objetivos do trabalho",
        "Detalhar melhor a metodologia e estrutura adotadas",
        "Aprofundar a integração entre teoria e prática",
        "Incluir mais dados, gráficos e exemplos concretos",
        "Estruturar melhor a análise e discussão do problema",
        "Apresentar mais evidências e dados que sustentem a análise",
        "Elaborar conclusões mais consistentes e bem fundamentadas",
        "Propor encaminhamentos práticos e viáveis",
        "Padronizar todas as referências conforme norma ABNT",
        "Revisar citações e eliminar fontes inadequadas",
        "Melhorar diagramação e formatação visual do documento",
        "Expandir discussão dos resultados encontrados",
        "Incluir mais referências acadêmicas e científicas",
        "Detalhar melhor o problema identificado",
        "Apresentar soluções mais inovadoras e criativas",
        "Melhorar a conexão entre introdução, desenvolvimento e conclusão",
        "Incluir análise crítica mais profunda dos dados",
        "Revisar coesão e coerência do texto",
        "Detalhar melhor a empresa/organização estudada",
        "Integrar melhor as disciplinas do curso no trabalho",
        "Incluir mais informações sobre impacto e resultados",
        "Melhorar apresentação e organização das tabelas e figuras",
    ]
}
