//! Multi-factor role scoring.
//!
//! Score = 0.4 * structural + 0.3 * lexical + 0.3 * topic, with the
//! weights fixed. Scoring is a pure function of the unit, the role
//! template, and the document's unit count; identical inputs always
//! produce identical output, which is what keeps generated teaching
//! scripts reproducible.

use regex::Regex;

use super::model::{PedagogicalRole, RoleScore};
use super::template::RoleTemplate;
use crate::document::{SectionType, SemanticUnit};

/// Structural weight.
pub const ALPHA: f32 = 0.4;
/// Lexical weight.
pub const BETA: f32 = 0.3;
/// Topic weight.
pub const GAMMA: f32 = 0.3;

/// Scores semantic units for role suitability.
pub struct RoleScorer {
    question: Regex,
    definition: Regex,
    example: Regex,
    misconception: Regex,
    summary: Regex,
    challenge: Regex,
    camel_case: Regex,
    digits: Regex,
    formula: Regex,
}

impl Default for RoleScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl RoleScorer {
    pub fn new() -> Self {
        let compile = |pattern: &str| Regex::new(pattern).expect("hardcoded pattern is valid");

        Self {
            question: compile(r"(?i)\b(what|why|how|when|where|who)\b"),
            definition: compile(r"(?i)\b(is defined as|refers to|means|is|are|defined as)\b"),
            example: compile(r"(?i)\b(for example|for instance|such as|e\.g\.|like|consider)\b"),
            misconception: compile(
                r"(?i)\b(mistake|error|misconception|incorrect|wrong|not|confuse|misunderstand)\b",
            ),
            summary: compile(
                r"(?i)\b(in summary|in conclusion|overall|to summarize|key points|main|important)\b",
            ),
            challenge: compile(
                r"(?i)\b(however|but|limitation|issue|problem|challenge|consider|alternative)\b",
            ),
            camel_case: compile(r"\b[A-Z][a-z]+(?:[A-Z][a-z]+)+\b"),
            digits: compile(r"\d+"),
            formula: compile(r"[=+\-*/]"),
        }
    }

    /// Scores one (unit, role) pair.
    pub fn score(
        &self,
        unit: &SemanticUnit,
        template: &RoleTemplate,
        total_units: usize,
    ) -> RoleScore {
        let structural = self.structural_score(unit, template.role, total_units);
        let lexical = self.lexical_score(unit, template);
        let topic = self.topic_score(unit, template.role);

        RoleScore {
            role: template.role,
            total: ALPHA * structural + BETA * lexical + GAMMA * topic,
            structural,
            lexical,
            topic,
        }
    }

    /// Position, section-type, and length heuristics (0.4/0.4/0.2),
    /// capped to [0, 1].
    fn structural_score(
        &self,
        unit: &SemanticUnit,
        role: PedagogicalRole,
        total_units: usize,
    ) -> f32 {
        let mut score = 0.0f32;

        // Position affinity (0.4 weight)
        let relative_position = unit.position as f32 / total_units.max(1) as f32;
        score += match role {
            // Explainers work best early in the document
            PedagogicalRole::Explainer => 0.4 * (1.0 - relative_position),
            // Summarizers work best late
            PedagogicalRole::Summarizer => 0.4 * relative_position,
            // Challengers work best near the midpoint
            PedagogicalRole::Challenger => 0.4 * (1.0 - (0.5 - relative_position).abs() * 2.0),
            // Example-Generator and Misconception-Spotter are neutral
            _ => 0.2,
        };

        // Section-type bonus (0.4 weight)
        let section = unit.section_type;
        score += match role {
            PedagogicalRole::Explainer => match section {
                SectionType::Introduction => 0.4,
                SectionType::Body => 0.2,
                _ => 0.0,
            },
            PedagogicalRole::Summarizer => match section {
                SectionType::Conclusion => 0.4,
                SectionType::Body => 0.1,
                _ => 0.0,
            },
            PedagogicalRole::Challenger => match section {
                SectionType::Body | SectionType::Methodology => 0.4,
                _ => 0.0,
            },
            PedagogicalRole::ExampleGenerator => match section {
                SectionType::Body => 0.3,
                _ => 0.15,
            },
            PedagogicalRole::MisconceptionSpotter => match section {
                SectionType::Body => 0.3,
                _ => 0.15,
            },
        };

        // Length bonus (0.2 weight)
        let words = unit.word_count;
        score += match role {
            // Summarizers prefer shorter units
            PedagogicalRole::Summarizer => {
                if words < 100 {
                    0.2
                } else if words < 200 {
                    0.1
                } else {
                    0.0
                }
            }
            // Explainers prefer medium-length units
            PedagogicalRole::Explainer => {
                if (100..=300).contains(&words) {
                    0.2
                } else {
                    0.1
                }
            }
            _ => {
                if (50..=250).contains(&words) {
                    0.15
                } else {
                    0.05
                }
            }
        };

        score.min(1.0)
    }

    /// Keyword and pattern cues: 0.5 priority ratio - 0.2 avoid
    /// penalty + 0.3 pattern ratio, clamped to [0, 1].
    fn lexical_score(&self, unit: &SemanticUnit, template: &RoleTemplate) -> f32 {
        let text = unit.text.to_lowercase();
        let mut score = 0.0f32;

        // Priority keywords (0.5 weight), full credit at 5 matches
        let priority_matches = template
            .priority_keywords
            .iter()
            .filter(|kw| text.contains(kw.as_str()))
            .count();
        score += 0.5 * (priority_matches as f32 / 5.0).min(1.0);

        // Avoid keywords (0.2 weight), full penalty at 3 matches
        let avoid_matches = template
            .avoid_keywords
            .iter()
            .filter(|kw| text.contains(kw.as_str()))
            .count();
        score -= 0.2 * (avoid_matches as f32 / 3.0).min(1.0);

        // Role-specific pattern cues (0.3 weight)
        let pattern_ratio = match template.role {
            PedagogicalRole::Explainer => {
                (self.definition.find_iter(&text).count() as f32 / 3.0).min(1.0)
            }
            PedagogicalRole::Challenger => {
                let matches = self.challenge.find_iter(&text).count()
                    + self.question.find_iter(&text).count();
                (matches as f32 / 4.0).min(1.0)
            }
            PedagogicalRole::Summarizer => {
                (self.summary.find_iter(&text).count() as f32 / 2.0).min(1.0)
            }
            PedagogicalRole::ExampleGenerator => {
                (self.example.find_iter(&text).count() as f32 / 2.0).min(1.0)
            }
            PedagogicalRole::MisconceptionSpotter => {
                (self.misconception.find_iter(&text).count() as f32 / 3.0).min(1.0)
            }
        };
        score += 0.3 * pattern_ratio;

        score.clamp(0.0, 1.0)
    }

    /// Complexity affinity (0.4), cohesion contribution (0.3), and
    /// title vocabulary bonus (0.3), capped to [0, 1].
    fn topic_score(&self, unit: &SemanticUnit, role: PedagogicalRole) -> f32 {
        let text = unit.text.to_lowercase();
        let mut score = 0.0f32;

        // Complexity estimate from technical-token density
        let technical_terms = self.camel_case.find_iter(&unit.text).count();
        let has_numbers = self.digits.is_match(&text);
        let has_formulas = self.formula.is_match(&text);

        let complexity = (technical_terms as f32 / 10.0
            + if has_numbers { 0.2 } else { 0.0 }
            + if has_formulas { 0.2 } else { 0.0 })
        .min(1.0);

        score += match role {
            // Explainers prefer moderate complexity
            PedagogicalRole::Explainer => 0.4 * (1.0 - (0.5 - complexity).abs() * 2.0),
            // Challengers prefer high complexity
            PedagogicalRole::Challenger => 0.4 * complexity,
            // Examples prefer concrete, moderately complex content
            PedagogicalRole::ExampleGenerator => 0.4 * (1.0 - (0.4 - complexity).abs() * 2.0),
            _ => 0.2,
        };

        // Cohesion contribution (0.3 weight)
        score += 0.3 * unit.cohesion;

        // Title vocabulary bonus (0.3 weight)
        if let Some(title) = &unit.title {
            let title = title.to_lowercase();
            let title_hit = |words: &[&str]| words.iter().any(|w| title.contains(w));

            score += match role {
                PedagogicalRole::Explainer => {
                    if title_hit(&["introduction", "overview", "what", "basics"]) {
                        0.3
                    } else {
                        0.0
                    }
                }
                PedagogicalRole::Summarizer => {
                    if title_hit(&["summary", "conclusion", "recap"]) {
                        0.3
                    } else {
                        0.0
                    }
                }
                PedagogicalRole::ExampleGenerator => {
                    if title_hit(&["example", "application", "case"]) {
                        0.3
                    } else {
                        0.0
                    }
                }
                PedagogicalRole::MisconceptionSpotter => {
                    if title_hit(&["pitfall", "error", "mistake", "caution"]) {
                        0.3
                    } else {
                        0.0
                    }
                }
                PedagogicalRole::Challenger => 0.1,
            };
        }

        score.min(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roles::template::RoleLibrary;
    use std::collections::HashMap;
    use strum::IntoEnumIterator;

    fn unit(text: &str, title: &str, section_type: SectionType, position: usize) -> SemanticUnit {
        SemanticUnit {
            id: format!("S0_{}", position),
            title: Some(title.to_string()),
            text: text.to_string(),
            section_type,
            position,
            cohesion: 0.9,
            word_count: text.split_whitespace().count(),
            metadata: HashMap::new(),
        }
    }

    #[test]
    fn test_total_is_weighted_sum_of_components() {
        let scorer = RoleScorer::new();
        let library = RoleLibrary::new();
        let sample = unit(
            "Ownership is defined as a set of rules. The concept means each value has an owner.",
            "Introduction",
            SectionType::Introduction,
            0,
        );

        for role in PedagogicalRole::iter() {
            let score = scorer.score(&sample, library.get(role), 10);
            let expected = ALPHA * score.structural + BETA * score.lexical + GAMMA * score.topic;
            assert!(
                (score.total - expected).abs() < 1e-3,
                "total mismatch for {}: {} vs {}",
                role,
                score.total,
                expected
            );
        }
    }

    #[test]
    fn test_components_stay_in_range() {
        let scorer = RoleScorer::new();
        let library = RoleLibrary::new();
        let sample = unit(
            "However, there is a limitation and a trade-off to consider. \
             What if the assumptions fail? DataFrame and MapReduce have issues; 3 + 4 = 7.",
            "Deeper Analysis",
            SectionType::Body,
            5,
        );

        for role in PedagogicalRole::iter() {
            let score = scorer.score(&sample, library.get(role), 10);
            assert!((0.0..=1.0).contains(&score.structural));
            assert!((0.0..=1.0).contains(&score.lexical));
            assert!((0.0..=1.0).contains(&score.topic));
        }
    }

    #[test]
    fn test_scoring_is_deterministic() {
        let scorer = RoleScorer::new();
        let library = RoleLibrary::new();
        let sample = unit(
            "For example, consider a practical use case scenario such as caching.",
            "Examples",
            SectionType::Body,
            3,
        );

        let template = library.get(PedagogicalRole::ExampleGenerator);
        let first = scorer.score(&sample, template, 8);
        let second = scorer.score(&sample, template, 8);
        assert_eq!(first, second);
    }

    #[test]
    fn test_early_introduction_favors_explainer_over_summarizer() {
        let scorer = RoleScorer::new();
        let library = RoleLibrary::new();
        let sample = unit(
            "The fundamental concept is defined as follows. To understand the principle, \
             we explain the meaning and the basics step by step.",
            "Introduction",
            SectionType::Introduction,
            0,
        );

        let explainer = scorer.score(&sample, library.get(PedagogicalRole::Explainer), 10);
        let summarizer = scorer.score(&sample, library.get(PedagogicalRole::Summarizer), 10);
        assert!(explainer.total > summarizer.total);
    }

    #[test]
    fn test_late_conclusion_favors_summarizer() {
        let scorer = RoleScorer::new();
        let library = RoleLibrary::new();
        let sample = unit(
            "In summary, the key points are brief. Overall the recap gives the takeaway and the gist.",
            "Summary",
            SectionType::Conclusion,
            9,
        );

        let summarizer = scorer.score(&sample, library.get(PedagogicalRole::Summarizer), 10);
        let explainer = scorer.score(&sample, library.get(PedagogicalRole::Explainer), 10);
        assert!(summarizer.total > explainer.total);
    }

    #[test]
    fn test_avoid_keywords_penalize_lexical_score() {
        let scorer = RoleScorer::new();
        let library = RoleLibrary::new();

        let clean = unit(
            "The fundamental concept and principle help us understand the meaning.",
            "Basics",
            SectionType::Body,
            1,
        );
        let polluted = unit(
            "The fundamental concept and principle help us understand the meaning, \
             but this summary is an overview full of mistake and error talk.",
            "Basics",
            SectionType::Body,
            1,
        );

        let template = library.get(PedagogicalRole::Explainer);
        let clean_score = scorer.score(&clean, template, 10);
        let polluted_score = scorer.score(&polluted, template, 10);
        assert!(clean_score.lexical > polluted_score.lexical);
    }
}
