//! Role domain model.
//!
//! The five pedagogical roles form a closed set with one canonical
//! iteration order (declaration order). Assignment determinism depends
//! on that order for tie-breaking, so the enum derives `EnumIter` and
//! `Ord` rather than being stringly typed anywhere.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use crate::document::SemanticUnit;
use crate::roles::template::RoleTemplate;

/// The five fixed dialogue personas.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
)]
pub enum PedagogicalRole {
    Explainer,
    Challenger,
    Summarizer,
    #[serde(rename = "Example-Generator")]
    #[strum(serialize = "Example-Generator")]
    ExampleGenerator,
    #[serde(rename = "Misconception-Spotter")]
    #[strum(serialize = "Misconception-Spotter")]
    MisconceptionSpotter,
}

impl PedagogicalRole {
    /// Target share of assignments in balanced mode.
    pub fn target_ratio(&self) -> f32 {
        match self {
            PedagogicalRole::Explainer => 0.30,
            PedagogicalRole::Challenger => 0.20,
            PedagogicalRole::Summarizer => 0.15,
            PedagogicalRole::ExampleGenerator => 0.20,
            PedagogicalRole::MisconceptionSpotter => 0.15,
        }
    }
}

/// Multi-factor suitability score for one (unit, role) pair.
///
/// `total` is the weighted sum of the three components; it is not
/// independently clamped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleScore {
    pub role: PedagogicalRole,
    pub total: f32,
    pub structural: f32,
    pub lexical: f32,
    pub topic: f32,
}

/// Final role assignment for a semantic unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleAssignment {
    pub unit: SemanticUnit,
    pub role: PedagogicalRole,
    pub template: RoleTemplate,
    pub score: RoleScore,
    /// Identical to the winning total score.
    pub confidence: f32,
}

/// Aggregate view over a set of assignments.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssignmentStatistics {
    pub total_assignments: usize,
    pub role_counts: BTreeMap<PedagogicalRole, usize>,
    pub role_percentages: BTreeMap<PedagogicalRole, f32>,
    pub average_confidences: BTreeMap<PedagogicalRole, f32>,
    pub overall_confidence: f32,
}
