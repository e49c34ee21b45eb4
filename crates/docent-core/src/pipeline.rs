//! Document processing pipeline.
//!
//! Orchestrates the stages that turn raw text into a teaching script:
//! heading detection, section splitting, semantic segmentation, role
//! assignment, and queue construction. The pipeline works on text the
//! caller already loaded; it never reads files itself.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::config::SegmenterConfig;
use crate::conversation::ConversationStateMachine;
use crate::document::{Embedder, HeadingDetector, SemanticSegmenter, SemanticUnit};
use crate::error::{DocentError, Result};
use crate::roles::{AssignmentStatistics, PedagogicalRole, RoleAssigner, RoleAssignment};

/// Documents shorter than this are rejected as too sparse to teach.
const MIN_CONTENT_LEN: usize = 100;

/// Per-section-type rollup inside a [`DocumentSummary`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SectionSummary {
    pub count: usize,
    pub words: usize,
    pub titles: Vec<String>,
}

/// Statistics over one processed document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub source_file: String,
    pub total_units: usize,
    pub total_words: usize,
    pub avg_words_per_unit: f32,
    pub avg_cohesion: f32,
    pub sections: BTreeMap<String, SectionSummary>,
}

/// Turns raw document text into ordered semantic units.
pub struct DocumentProcessor {
    detector: HeadingDetector,
    segmenter: SemanticSegmenter,
}

impl DocumentProcessor {
    pub fn new(embedder: Box<dyn Embedder>, config: SegmenterConfig) -> Self {
        Self {
            detector: HeadingDetector::new(),
            segmenter: SemanticSegmenter::new(embedder, config),
        }
    }

    /// Runs the full analysis pipeline on one document.
    ///
    /// `source_name` is recorded in each unit's metadata so downstream
    /// consumers can trace units back to their document.
    ///
    /// # Errors
    ///
    /// Fails when the content is shorter than the processing minimum,
    /// or if the embedder fails.
    pub fn process(&self, source_name: &str, text: &str) -> Result<Vec<SemanticUnit>> {
        if text.trim().chars().count() < MIN_CONTENT_LEN {
            return Err(DocentError::precondition(
                "process",
                format!("document content too short: {}", source_name),
            ));
        }

        let headings = self.detector.detect_headings(text);
        tracing::info!("Detected {} headings", headings.len());

        let sections = self.detector.split_by_headings(text, &headings);
        tracing::info!("Split into {} sections", sections.len());

        let mut units = self.segmenter.segment(&sections)?;
        for unit in &mut units {
            unit.metadata
                .insert("source_file".to_string(), json!(source_name));
        }

        tracing::info!("Created {} semantic units from {}", units.len(), source_name);
        Ok(units)
    }

    /// Rolls processed units up into document statistics.
    pub fn summary(&self, units: &[SemanticUnit]) -> DocumentSummary {
        if units.is_empty() {
            return DocumentSummary::default();
        }

        let total_words: usize = units.iter().map(|u| u.word_count).sum();
        let avg_cohesion = units.iter().map(|u| u.cohesion).sum::<f32>() / units.len() as f32;

        let mut sections: BTreeMap<String, SectionSummary> = BTreeMap::new();
        for unit in units {
            let entry = sections
                .entry(unit.section_type.as_str().to_string())
                .or_default();
            entry.count += 1;
            entry.words += unit.word_count;
            if let Some(title) = &unit.title
                && !entry.titles.contains(title)
            {
                entry.titles.push(title.clone());
            }
        }

        let source_file = units[0]
            .metadata
            .get("source_file")
            .and_then(|v| v.as_str())
            .unwrap_or("unknown")
            .to_string();

        DocumentSummary {
            source_file,
            total_units: units.len(),
            total_words,
            avg_words_per_unit: total_words as f32 / units.len() as f32,
            avg_cohesion,
            sections,
        }
    }
}

/// A fully prepared walkthrough: units, their role assignments, and
/// the reading-order queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeachingScript {
    pub source_file: String,
    pub units: Vec<SemanticUnit>,
    pub assignments: Vec<RoleAssignment>,
    pub queue: Vec<(PedagogicalRole, SemanticUnit)>,
    pub statistics: AssignmentStatistics,
}

impl TeachingScript {
    /// Spins up a session over this script, advanced through setup to
    /// the engaged state with a fresh session id.
    ///
    /// # Errors
    ///
    /// Infallible in practice; setup events are always valid from a
    /// fresh machine.
    pub fn start_session(&self) -> Result<ConversationStateMachine> {
        let mut machine = ConversationStateMachine::new(Some(Uuid::new_v4().to_string()));
        machine.load_document(self.queue.len())?;
        machine.mark_roles_assigned()?;
        machine.start_dialogue()?;
        machine.set_current_role(self.queue.first().map(|(role, _)| role.to_string()));
        Ok(machine)
    }
}

/// End-to-end builder: document text in, teaching script out.
pub struct ScriptBuilder {
    processor: DocumentProcessor,
    assigner: RoleAssigner,
    balance: bool,
}

impl ScriptBuilder {
    pub fn new(embedder: Box<dyn Embedder>, config: SegmenterConfig, balance: bool) -> Self {
        Self {
            processor: DocumentProcessor::new(embedder, config),
            assigner: RoleAssigner::default(),
            balance,
        }
    }

    pub fn processor(&self) -> &DocumentProcessor {
        &self.processor
    }

    pub fn assigner(&self) -> &RoleAssigner {
        &self.assigner
    }

    /// Builds the complete teaching script for one document.
    ///
    /// # Errors
    ///
    /// Propagates processing failures; an analyzable document that
    /// yields zero units produces an empty script, not an error.
    pub fn build(&self, source_name: &str, text: &str) -> Result<TeachingScript> {
        let units = self.processor.process(source_name, text)?;
        let assignments = self.assigner.assign_roles(&units, self.balance);
        let queue = self.assigner.role_queue(&assignments);
        let statistics = self.assigner.statistics(&assignments);

        tracing::info!(
            "Teaching script ready: {} units, {} queue entries",
            units.len(),
            queue.len()
        );

        Ok(TeachingScript {
            source_file: source_name.to_string(),
            units,
            assignments,
            queue,
            statistics,
        })
    }
}
