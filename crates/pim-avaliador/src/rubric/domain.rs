use serde::{Deserialize, Serialize};

/// Rubric dimensions of the written part of a PIM, in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Presentation,
    Introduction,
    Development,
    Discussion,
    Conclusion,
    References,
}

impl Dimension {
    pub const fn ordered() -> [Self; 6] {
        [
            Self::Presentation,
            Self::Introduction,
            Self::Development,
            Self::Discussion,
            Self::Conclusion,
            Self::References,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Presentation => "Apresentação Geral",
            Self::Introduction => "Introdução",
            Self::Development => "Desenvolvimento",
            Self::Discussion => "Discussão",
            Self::Conclusion => "Conclusão",
            Self::References => "Referências e Citações",
        }
    }

    /// Heading used for the per-dimension subsections of the rendered report.
    pub const fn title(self) -> &'static str {
        match self {
            Self::Presentation => "APRESENTAÇÃO GERAL DO TRABALHO",
            Self::Introduction => "INTRODUÇÃO",
            Self::Development => "DESENVOLVIMENTO",
            Self::Discussion => "DISCUSSÃO",
            Self::Conclusion => "CONCLUSÃO",
            Self::References => "REFERÊNCIAS E CITAÇÕES",
        }
    }

    pub const fn max_weight(self) -> f64 {
        match self {
            Self::Development | Self::Discussion => 3.0,
            Self::Presentation | Self::Introduction | Self::Conclusion | Self::References => 1.0,
        }
    }

    /// Scores strictly below this value trigger the dimension's canned recommendations.
    pub const fn recommendation_threshold(self) -> f64 {
        match self {
            Self::Development | Self::Discussion => 2.0,
            Self::Presentation | Self::Introduction | Self::Conclusion | Self::References => 0.7,
        }
    }
}

/// Sub-lists of the Discussion bank: the problem diagnosis or the proposed solution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscussionMode {
    #[default]
    Problem,
    Solution,
}

impl DiscussionMode {
    pub const fn ordered() -> [Self; 2] {
        [Self::Problem, Self::Solution]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Problem => "Problema",
            Self::Solution => "Solução",
        }
    }

    /// Prefix carried by stored observations that came from this sub-list.
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Problem => "[Problema]",
            Self::Solution => "[Solução]",
        }
    }

    pub fn tagged(self, observation: &str) -> String {
        format!("{} {}", self.tag(), observation)
    }

    /// Splits a stored observation into its mode and bare text, if it carries a tag.
    pub fn split_tag(observation: &str) -> Option<(Self, &str)> {
        Self::ordered().into_iter().find_map(|mode| {
            observation
                .strip_prefix(mode.tag())
                .map(|rest| (mode, rest.trim_start()))
        })
    }
}

/// Attainment status the evaluator records next to each dimension.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DimensionStatus {
    Yes,
    Partial,
    #[default]
    No,
}

impl DimensionStatus {
    pub const fn ordered() -> [Self; 3] {
        [Self::Yes, Self::Partial, Self::No]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Yes => "Sim",
            Self::Partial => "Parcial",
            Self::No => "Não",
        }
    }
}

/// Reason attached to the oral-presentation score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OralJustification {
    #[default]
    NotPresented,
    AwaitingPresentation,
    Presented,
}

impl OralJustification {
    pub const fn ordered() -> [Self; 3] {
        [
            Self::NotPresented,
            Self::AwaitingPresentation,
            Self::Presented,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::NotPresented => "Grupo não realizou apresentação",
            Self::AwaitingPresentation => "Grupo aguardando para realizar apresentação",
            Self::Presented => "Apresentação realizada",
        }
    }
}

/// Where a dimension's observation bank comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SuggestionSource {
    Flat(Vec<&'static str>),
    Moded(Vec<(DiscussionMode, Vec<&'static str>)>),
}

impl SuggestionSource {
    /// Observations available for the given mode. Flat banks ignore the mode.
    pub fn entries(&self, mode: DiscussionMode) -> &[&'static str] {
        match self {
            SuggestionSource::Flat(entries) => entries.as_slice(),
            SuggestionSource::Moded(modes) => modes
                .iter()
                .find(|(candidate, _)| *candidate == mode)
                .map(|(_, entries)| entries.as_slice())
                .unwrap_or(&[]),
        }
    }

    pub fn is_moded(&self) -> bool {
        matches!(self, SuggestionSource::Moded(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weights_sum_to_ten() {
        let total: f64 = Dimension::ordered()
            .into_iter()
            .map(Dimension::max_weight)
            .sum();
        assert!((total - 10.0).abs() < 1e-9);
    }

    #[test]
    fn thresholds_follow_weight_class() {
        for dimension in Dimension::ordered() {
            let expected = if dimension.max_weight() >= 3.0 { 2.0 } else { 0.7 };
            assert_eq!(dimension.recommendation_threshold(), expected);
        }
    }

    #[test]
    fn split_tag_recognises_both_modes() {
        let tagged = DiscussionMode::Solution.tagged("Solução viável");
        assert_eq!(
            DiscussionMode::split_tag(&tagged),
            Some((DiscussionMode::Solution, "Solução viável"))
        );
        assert_eq!(DiscussionMode::split_tag("Sem marcador"), None);
    }
}
