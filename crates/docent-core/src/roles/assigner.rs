//! Deterministic role assignment and queue generation.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use strum::IntoEnumIterator;

use super::model::{AssignmentStatistics, PedagogicalRole, RoleAssignment, RoleScore};
use super::scorer::RoleScorer;
use super::template::RoleLibrary;
use crate::document::SemanticUnit;

/// Assigns pedagogical roles to semantic units.
pub struct RoleAssigner {
    library: RoleLibrary,
    scorer: RoleScorer,
}

impl Default for RoleAssigner {
    fn default() -> Self {
        Self::new(RoleLibrary::new())
    }
}

impl RoleAssigner {
    pub fn new(library: RoleLibrary) -> Self {
        Self {
            library,
            scorer: RoleScorer::new(),
        }
    }

    pub fn library(&self) -> &RoleLibrary {
        &self.library
    }

    /// Assigns a role to every unit.
    ///
    /// An empty unit list yields an empty assignment list; that is a
    /// valid result, not an error.
    pub fn assign_roles(&self, units: &[SemanticUnit], balance: bool) -> Vec<RoleAssignment> {
        if units.is_empty() {
            return Vec::new();
        }

        let total_units = units.len();

        // Score each unit for each role, canonical role order.
        let all_scores: Vec<Vec<RoleScore>> = units
            .iter()
            .map(|unit| {
                PedagogicalRole::iter()
                    .map(|role| self.scorer.score(unit, self.library.get(role), total_units))
                    .collect()
            })
            .collect();

        let assignments = if balance {
            self.assign_with_balancing(units, &all_scores)
        } else {
            self.assign_greedy(units, &all_scores)
        };

        tracing::debug!("Assigned roles to {} semantic units", assignments.len());
        assignments
    }

    /// Greedy assignment: best-scoring role per unit, ties broken by
    /// canonical role order.
    fn assign_greedy(
        &self,
        units: &[SemanticUnit],
        all_scores: &[Vec<RoleScore>],
    ) -> Vec<RoleAssignment> {
        units
            .iter()
            .zip(all_scores.iter())
            .map(|(unit, scores)| {
                let best = preferred_score(scores);
                self.make_assignment(unit, best)
            })
            .collect()
    }

    /// Balanced assignment: units are visited in descending order of
    /// their preferred score (stable sort) and a role's share of the
    /// assignments made so far is held near its target ratio.
    ///
    /// When every alternative is already at target, the over-allocated
    /// preferred role is reused; a greedy single-pass heuristic, not an
    /// optimal allocation.
    fn assign_with_balancing(
        &self,
        units: &[SemanticUnit],
        all_scores: &[Vec<RoleScore>],
    ) -> Vec<RoleAssignment> {
        let mut preferences: Vec<(usize, &RoleScore)> = all_scores
            .iter()
            .enumerate()
            .map(|(i, scores)| (i, preferred_score(scores)))
            .collect();

        // Stable: ties preserve original unit order.
        preferences.sort_by(|a, b| {
            b.1.total
                .partial_cmp(&a.1.total)
                .unwrap_or(Ordering::Equal)
        });

        let mut counts: BTreeMap<PedagogicalRole, usize> = BTreeMap::new();
        let mut assignments = Vec::with_capacity(units.len());

        for (unit_index, preferred) in preferences {
            let made = assignments.len().max(1) as f32;
            let current_ratio =
                counts.get(&preferred.role).copied().unwrap_or(0) as f32 / made;

            let assigned_role = if current_ratio <= preferred.role.target_ratio()
                || assignments.is_empty()
            {
                preferred.role
            } else {
                // First under-target role in descending score order,
                // falling back to the over-allocated preference.
                let mut by_score: Vec<&RoleScore> = all_scores[unit_index].iter().collect();
                by_score.sort_by(|a, b| {
                    b.total.partial_cmp(&a.total).unwrap_or(Ordering::Equal)
                });

                by_score
                    .iter()
                    .find(|score| {
                        let ratio = counts.get(&score.role).copied().unwrap_or(0) as f32 / made;
                        ratio < score.role.target_ratio()
                    })
                    .map(|score| score.role)
                    .unwrap_or(preferred.role)
            };

            let score = all_scores[unit_index]
                .iter()
                .find(|s| s.role == assigned_role)
                .cloned()
                .unwrap_or_else(|| preferred.clone());

            assignments.push(self.make_assignment(&units[unit_index], &score));
            *counts.entry(assigned_role).or_insert(0) += 1;
        }

        tracing::debug!("Role distribution: {:?}", counts);
        assignments
    }

    fn make_assignment(&self, unit: &SemanticUnit, score: &RoleScore) -> RoleAssignment {
        RoleAssignment {
            unit: unit.clone(),
            role: score.role,
            template: self.library.get(score.role).clone(),
            score: score.clone(),
            confidence: score.total,
        }
    }

    /// The role queue: (role, unit) pairs in document reading order,
    /// regardless of how assignment was computed.
    pub fn role_queue(
        &self,
        assignments: &[RoleAssignment],
    ) -> Vec<(PedagogicalRole, SemanticUnit)> {
        let mut sorted: Vec<&RoleAssignment> = assignments.iter().collect();
        sorted.sort_by_key(|a| a.unit.position);
        sorted.iter().map(|a| (a.role, a.unit.clone())).collect()
    }

    /// Counts, percentages, and confidence aggregates.
    pub fn statistics(&self, assignments: &[RoleAssignment]) -> AssignmentStatistics {
        if assignments.is_empty() {
            return AssignmentStatistics::default();
        }

        let total = assignments.len();
        let mut counts: BTreeMap<PedagogicalRole, usize> = BTreeMap::new();
        let mut confidence_sums: BTreeMap<PedagogicalRole, f32> = BTreeMap::new();

        for role in PedagogicalRole::iter() {
            counts.insert(role, 0);
            confidence_sums.insert(role, 0.0);
        }
        for assignment in assignments {
            *counts.entry(assignment.role).or_insert(0) += 1;
            *confidence_sums.entry(assignment.role).or_insert(0.0) += assignment.confidence;
        }

        let role_percentages = counts
            .iter()
            .map(|(&role, &count)| (role, count as f32 / total as f32 * 100.0))
            .collect();
        let average_confidences = counts
            .iter()
            .map(|(&role, &count)| {
                let sum = confidence_sums.get(&role).copied().unwrap_or(0.0);
                let avg = if count > 0 { sum / count as f32 } else { 0.0 };
                (role, avg)
            })
            .collect();
        let overall_confidence =
            assignments.iter().map(|a| a.confidence).sum::<f32>() / total as f32;

        AssignmentStatistics {
            total_assignments: total,
            role_counts: counts,
            role_percentages,
            average_confidences,
            overall_confidence,
        }
    }
}

/// Highest-scoring entry; ties resolve to the earlier role in
/// canonical order because comparisons are strict.
fn preferred_score(scores: &[RoleScore]) -> &RoleScore {
    let mut best = &scores[0];
    for score in &scores[1..] {
        if score.total > best.total {
            best = score;
        }
    }
    best
}
