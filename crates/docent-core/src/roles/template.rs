//! Role template registry.
//!
//! Static prompt and keyword data for the five pedagogical roles. The
//! library is built once at startup and passed by reference; there is
//! no ambient global instance.

use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

use super::model::PedagogicalRole;

/// Prompt and vocabulary data for one pedagogical role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleTemplate {
    /// Display name, e.g. "Example-Generator".
    pub name: String,
    pub role: PedagogicalRole,
    /// Base system prompt for the text generator.
    pub system_prompt: String,
    /// Per-turn instruction for the text generator.
    pub instruction: String,
    /// Vocabulary that boosts this role's lexical score.
    pub priority_keywords: Vec<String>,
    /// Vocabulary that penalizes this role's lexical score.
    pub avoid_keywords: Vec<String>,
    /// Suggested generation temperature.
    pub temperature: f32,
    /// Suggested generation token cap.
    pub max_tokens: u32,
}

impl RoleTemplate {
    /// Builds the full generation prompt for a unit of context and an
    /// optional out-of-band user question.
    pub fn build_prompt(&self, context: &str, user_input: Option<&str>) -> String {
        let mut prompt = format!(
            "{}\n\n{}\n\nContext:\n{}\n",
            self.system_prompt, self.instruction, context
        );

        match user_input {
            Some(question) => {
                prompt.push_str(&format!("\n\nUser Question: {}\n\n{}:", question, self.name));
            }
            None => {
                prompt.push_str(&format!("\n\n{}:", self.name));
            }
        }

        prompt
    }
}

/// Immutable registry of the five role templates.
///
/// Construct once with [`RoleLibrary::new`] and hand out references;
/// callers receive it via explicit parameter or constructor injection.
#[derive(Debug, Clone)]
pub struct RoleLibrary {
    // Indexed by canonical role order.
    templates: Vec<RoleTemplate>,
}

impl Default for RoleLibrary {
    fn default() -> Self {
        Self::new()
    }
}

impl RoleLibrary {
    pub fn new() -> Self {
        let templates = vec![
            explainer_template(),
            challenger_template(),
            summarizer_template(),
            example_generator_template(),
            misconception_spotter_template(),
        ];
        Self { templates }
    }

    /// Template for a role. Total over the closed role set.
    pub fn get(&self, role: PedagogicalRole) -> &RoleTemplate {
        &self.templates[role_index(role)]
    }

    /// Template lookup by display name, case-insensitive.
    pub fn get_by_name(&self, name: &str) -> Option<&RoleTemplate> {
        let lower = name.to_lowercase();
        self.templates.iter().find(|t| t.name.to_lowercase() == lower)
    }

    /// All templates in canonical role order.
    pub fn all(&self) -> &[RoleTemplate] {
        &self.templates
    }

    /// Display names of all roles in canonical order.
    pub fn names(&self) -> Vec<String> {
        self.templates.iter().map(|t| t.name.clone()).collect()
    }

    /// Picks the role whose vocabulary best matches the text.
    ///
    /// Priority keywords vote +2, avoid keywords -1. Returns `None`
    /// unless some role scores positive; ties resolve to the earlier
    /// role in canonical order.
    pub fn best_role_for(&self, text: &str) -> Option<&RoleTemplate> {
        let lower = text.to_lowercase();

        let mut best: Option<(&RoleTemplate, i32)> = None;
        for role in PedagogicalRole::iter() {
            let template = self.get(role);
            let mut score = 0i32;
            for keyword in &template.priority_keywords {
                if lower.contains(keyword.as_str()) {
                    score += 2;
                }
            }
            for keyword in &template.avoid_keywords {
                if lower.contains(keyword.as_str()) {
                    score -= 1;
                }
            }
            if best.is_none_or(|(_, top)| score > top) {
                best = Some((template, score));
            }
        }

        best.filter(|(_, score)| *score > 0).map(|(t, _)| t)
    }
}

fn role_index(role: PedagogicalRole) -> usize {
    match role {
        PedagogicalRole::Explainer => 0,
        PedagogicalRole::Challenger => 1,
        PedagogicalRole::Summarizer => 2,
        PedagogicalRole::ExampleGenerator => 3,
        PedagogicalRole::MisconceptionSpotter => 4,
    }
}

fn keywords(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

fn explainer_template() -> RoleTemplate {
    RoleTemplate {
        name: "Explainer".to_string(),
        role: PedagogicalRole::Explainer,
        system_prompt: "You are the Explainer, a patient and clear educator. \
            Your role is to break down complex concepts into understandable parts, \
            provide clear definitions, and explain 'how' and 'why' things work. \
            Use simple language and build understanding step-by-step."
            .to_string(),
        instruction: "Explain the following concept clearly and thoroughly. Focus on:\n\
            - Breaking down complex ideas into simpler components\n\
            - Providing clear definitions and explanations\n\
            - Using analogies or comparisons when helpful\n\
            - Ensuring the explanation is accessible to learners"
            .to_string(),
        priority_keywords: keywords(&[
            "explain",
            "definition",
            "meaning",
            "understand",
            "concept",
            "basics",
            "fundamental",
            "principle",
            "what is",
            "how does",
            "tell me about",
        ]),
        avoid_keywords: keywords(&[
            "challenge",
            "question",
            "critique",
            "example",
            "instance",
            "misconception",
            "mistake",
            "error",
            "summary",
            "overview",
        ]),
        temperature: 0.0,
        max_tokens: 500,
    }
}

fn challenger_template() -> RoleTemplate {
    RoleTemplate {
        name: "Challenger".to_string(),
        role: PedagogicalRole::Challenger,
        system_prompt: "You are the Challenger, a critical thinker who encourages deeper analysis. \
            Your role is to question assumptions, probe for edge cases, \
            stimulate critical thinking, and push learners beyond surface understanding. \
            Ask thought-provoking questions without being confrontational."
            .to_string(),
        instruction: "Challenge the learner's understanding by:\n\
            - Asking probing questions about the concept\n\
            - Identifying assumptions that should be questioned\n\
            - Presenting edge cases or limitations\n\
            - Encouraging deeper critical analysis\n\
            - Pushing beyond surface-level understanding"
            .to_string(),
        priority_keywords: keywords(&[
            "limitation",
            "limitations",
            "edge case",
            "alternative",
            "critique",
            "challenge",
            "deeper",
            "analysis",
            "implications",
            "consequences",
            "trade-off",
            "assume",
            "why not",
            "what if",
            "consider",
        ]),
        avoid_keywords: keywords(&[
            "explain",
            "define",
            "summarize",
            "example",
            "instance",
            "misconception",
            "mistake",
            "basic",
            "simple",
        ]),
        temperature: 0.1,
        max_tokens: 400,
    }
}

fn summarizer_template() -> RoleTemplate {
    RoleTemplate {
        name: "Summarizer".to_string(),
        role: PedagogicalRole::Summarizer,
        system_prompt: "You are the Summarizer, skilled at distilling complex information. \
            Your role is to synthesize key points, create concise overviews, \
            and help learners see the big picture. \
            Extract and organize the most important information efficiently."
            .to_string(),
        instruction: "Provide a clear, concise summary by:\n\
            - Identifying and extracting key points\n\
            - Organizing information logically\n\
            - Highlighting the most important concepts\n\
            - Creating a coherent overview\n\
            - Using bullet points or structured format when helpful"
            .to_string(),
        priority_keywords: keywords(&[
            "summary",
            "summarize",
            "overview",
            "key points",
            "main idea",
            "briefly",
            "concise",
            "recap",
            "synthesize",
            "gist",
            "takeaway",
            "essence",
            "core",
        ]),
        avoid_keywords: keywords(&[
            "detail",
            "explain",
            "depth",
            "challenge",
            "question",
            "example",
            "instance",
            "misconception",
            "elaborate",
        ]),
        temperature: 0.0,
        max_tokens: 300,
    }
}

fn example_generator_template() -> RoleTemplate {
    RoleTemplate {
        name: "Example-Generator".to_string(),
        role: PedagogicalRole::ExampleGenerator,
        system_prompt: "You are the Example-Generator, adept at creating concrete illustrations. \
            Your role is to provide real-world examples, use cases, and practical applications \
            that make abstract concepts tangible. \
            Create clear, relevant examples that reinforce understanding."
            .to_string(),
        instruction: "Generate concrete examples by:\n\
            - Providing real-world applications or use cases\n\
            - Creating practical illustrations of the concept\n\
            - Using familiar contexts when possible\n\
            - Showing multiple examples if helpful\n\
            - Making abstract concepts concrete and relatable"
            .to_string(),
        priority_keywords: keywords(&[
            "example",
            "instance",
            "case",
            "application",
            "use case",
            "scenario",
            "practical",
            "real-world",
            "demonstrate",
            "illustrate",
            "show",
            "sample",
            "analogy",
        ]),
        avoid_keywords: keywords(&[
            "define",
            "explain",
            "theory",
            "challenge",
            "question",
            "summarize",
            "overview",
            "misconception",
            "mistake",
        ]),
        temperature: 0.2,
        max_tokens: 450,
    }
}

fn misconception_spotter_template() -> RoleTemplate {
    RoleTemplate {
        name: "Misconception-Spotter".to_string(),
        role: PedagogicalRole::MisconceptionSpotter,
        system_prompt: "You are the Misconception-Spotter, vigilant about common errors. \
            Your role is to identify typical misunderstandings, correct faulty assumptions, \
            and clarify confusing points before they become ingrained. \
            Be gentle but clear in addressing misconceptions."
            .to_string(),
        instruction: "Address potential misconceptions by:\n\
            - Identifying common misunderstandings about this concept\n\
            - Explaining why these misconceptions occur\n\
            - Providing clear corrections\n\
            - Distinguishing between similar but different concepts\n\
            - Preventing confusion before it develops"
            .to_string(),
        priority_keywords: keywords(&[
            "misconception",
            "misconceptions",
            "mistake",
            "error",
            "confuse",
            "wrong",
            "common error",
            "pitfall",
            "misunderstand",
            "clarify",
            "distinguish",
            "difference",
            "versus",
            "vs",
            "common mistake",
        ]),
        avoid_keywords: keywords(&[
            "example",
            "summarize",
            "overview",
            "detail",
            "explain how",
        ]),
        temperature: 0.0,
        max_tokens: 400,
    }
}
