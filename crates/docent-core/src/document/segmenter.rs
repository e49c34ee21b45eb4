//! Semantic segmentation.
//!
//! Groups the paragraphs of each section into cohesive semantic units
//! using embedding similarity. The grouping is an online greedy pass
//! against the open group's centroid: single pass, stable ordering,
//! no global clustering.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::json;

use super::embedding::{Embedder, centroid, cosine_similarity};
use super::heading::{Section, SectionType};
use crate::config::SegmenterConfig;
use crate::error::Result;

/// A group of one or more paragraphs treated as one teaching chunk.
///
/// Created by the segmenter and immutable thereafter. `position` is
/// dense, zero-based across the whole document and is the sole
/// ordering key for everything downstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SemanticUnit {
    /// Identifier combining section and group index, e.g. "S0_1".
    pub id: String,
    /// Section heading, if the section had one.
    pub title: Option<String>,
    /// Concatenation of the grouped paragraphs.
    pub text: String,
    /// Coarse label inherited from the section.
    pub section_type: SectionType,
    /// Zero-based order in the document.
    pub position: usize,
    /// Mean pairwise embedding similarity within the group; 1.0 for
    /// singletons by convention.
    pub cohesion: f32,
    /// Whitespace-delimited token count.
    pub word_count: usize,
    /// Free-form context (section id, group id, heading level,
    /// paragraph count, source file once known).
    pub metadata: HashMap<String, serde_json::Value>,
}

/// Segments sections into semantic units.
pub struct SemanticSegmenter {
    embedder: Box<dyn Embedder>,
    config: SegmenterConfig,
}

impl SemanticSegmenter {
    pub fn new(embedder: Box<dyn Embedder>, config: SegmenterConfig) -> Self {
        Self { embedder, config }
    }

    /// Segments every section into ordered semantic units.
    ///
    /// Sections with no surviving paragraphs contribute no units; this
    /// is a valid empty result, not an error.
    ///
    /// # Errors
    ///
    /// Returns an error only if the embedder fails.
    pub fn segment(&self, sections: &[Section]) -> Result<Vec<SemanticUnit>> {
        let mut units: Vec<SemanticUnit> = Vec::new();

        for (section_id, section) in sections.iter().enumerate() {
            let paragraphs = self.extract_paragraphs(&section.text);
            if paragraphs.is_empty() {
                tracing::debug!("No paragraphs survived in section {}", section_id);
                continue;
            }

            let embeddings = self.embedder.embed(&paragraphs)?;
            let groups = self.group_by_similarity(&embeddings);

            tracing::debug!(
                "Section {}: {} paragraphs -> {} groups",
                section_id,
                paragraphs.len(),
                groups.len()
            );

            for (group_id, group) in groups.iter().enumerate() {
                let text = group
                    .iter()
                    .map(|&i| paragraphs[i].as_str())
                    .collect::<Vec<_>>()
                    .join("\n\n");
                let word_count = group
                    .iter()
                    .map(|&i| paragraphs[i].split_whitespace().count())
                    .sum();

                let mut metadata = HashMap::new();
                metadata.insert("heading_level".to_string(), json!(section.level));
                metadata.insert("paragraph_count".to_string(), json!(group.len()));
                metadata.insert("section_id".to_string(), json!(section_id));
                metadata.insert("group_id".to_string(), json!(group_id));

                units.push(SemanticUnit {
                    id: format!("S{}_{}", section_id, group_id),
                    title: Some(section.title.clone()),
                    text,
                    section_type: section.section_type,
                    position: units.len(),
                    cohesion: compute_cohesion(&embeddings, group),
                    word_count,
                    metadata,
                });
            }
        }

        tracing::debug!("Document segmented into {} semantic units", units.len());
        Ok(units)
    }

    /// Splits section text on blank lines and drops noise paragraphs.
    fn extract_paragraphs(&self, text: &str) -> Vec<String> {
        text.split("\n\n")
            .map(str::trim)
            .filter(|p| !p.is_empty() && p.chars().count() >= self.config.min_paragraph_len)
            .map(str::to_string)
            .collect()
    }

    /// Greedy single-pass grouping against the open group's centroid.
    ///
    /// Returns groups of paragraph indices. A paragraph joins the open
    /// group when its similarity to the centroid reaches the threshold
    /// and the group is below the maximum size; otherwise it seeds a
    /// new group. Undersized groups are then merged forward.
    fn group_by_similarity(&self, embeddings: &[Vec<f32>]) -> Vec<Vec<usize>> {
        if embeddings.is_empty() {
            return Vec::new();
        }
        if embeddings.len() == 1 {
            return vec![vec![0]];
        }

        let mut groups: Vec<Vec<usize>> = Vec::new();
        let mut current: Vec<usize> = vec![0];

        for i in 1..embeddings.len() {
            let members: Vec<&[f32]> = current.iter().map(|&j| embeddings[j].as_slice()).collect();
            let group_centroid = centroid(&members);
            let similarity = cosine_similarity(&embeddings[i], &group_centroid);

            let can_add = similarity >= self.config.similarity_threshold
                && current.len() < self.config.max_group_size;

            if can_add {
                current.push(i);
            } else {
                groups.push(std::mem::replace(&mut current, vec![i]));
            }
        }
        groups.push(current);

        self.merge_small_groups(groups)
    }

    /// Merges groups below the minimum size into the *next* group.
    /// The final group is exempt and may stay small. A merge may push
    /// the combined group past the maximum size; the size cap only
    /// bounds the similarity grouping pass.
    fn merge_small_groups(&self, groups: Vec<Vec<usize>>) -> Vec<Vec<usize>> {
        if groups.len() <= 1 {
            return groups;
        }

        let mut merged = Vec::new();
        let mut i = 0;
        while i < groups.len() {
            let mut current = groups[i].clone();
            if current.len() < self.config.min_group_size && i < groups.len() - 1 {
                current.extend(groups[i + 1].iter().copied());
                i += 2;
            } else {
                i += 1;
            }
            merged.push(current);
        }
        merged
    }
}

/// Mean pairwise cosine similarity across the group; 1.0 for a
/// singleton (no pairs to disagree).
fn compute_cohesion(embeddings: &[Vec<f32>], group: &[usize]) -> f32 {
    if group.len() <= 1 {
        return 1.0;
    }

    let mut similarities = Vec::new();
    for (a, &i) in group.iter().enumerate() {
        for &j in &group[a + 1..] {
            similarities.push(cosine_similarity(&embeddings[i], &embeddings[j]));
        }
    }

    similarities.iter().sum::<f32>() / similarities.len() as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::heading::SectionType;

    /// Maps paragraphs to axis vectors by topic marker so grouping
    /// behavior is fully controlled.
    struct StubEmbedder;

    impl Embedder for StubEmbedder {
        fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(texts
                .iter()
                .map(|t| {
                    if t.contains("alpha") {
                        vec![1.0, 0.0, 0.0]
                    } else if t.contains("beta") {
                        vec![0.0, 1.0, 0.0]
                    } else {
                        vec![0.0, 0.0, 0.0]
                    }
                })
                .collect())
        }
    }

    fn segmenter() -> SemanticSegmenter {
        SemanticSegmenter::new(Box::new(StubEmbedder), SegmenterConfig::default())
    }

    fn section(text: &str) -> Section {
        Section {
            title: "Topic".to_string(),
            text: text.to_string(),
            level: 1,
            section_type: SectionType::Body,
            start_pos: 0,
            end_pos: text.len(),
        }
    }

    const ALPHA: &str = "alpha alpha alpha alpha alpha";
    const BETA: &str = "beta beta beta beta beta beta";

    fn joined(paragraphs: &[&str]) -> String {
        paragraphs.join("\n\n")
    }

    #[test]
    fn test_topic_shift_starts_new_group() {
        let text = joined(&[ALPHA, ALPHA, ALPHA, BETA, BETA]);
        let units = segmenter().segment(&[section(&text)]).unwrap();

        assert_eq!(units.len(), 2);
        assert_eq!(units[0].id, "S0_0");
        assert_eq!(units[1].id, "S0_1");
        assert_eq!(units[0].metadata["paragraph_count"], 3);
        assert_eq!(units[1].metadata["paragraph_count"], 2);
        assert_eq!(units[0].position, 0);
        assert_eq!(units[1].position, 1);
    }

    #[test]
    fn test_max_group_size_closes_group() {
        let text = joined(&[ALPHA; 7]);
        let units = segmenter().segment(&[section(&text)]).unwrap();

        assert_eq!(units.len(), 2);
        assert_eq!(units[0].metadata["paragraph_count"], 5);
        assert_eq!(units[1].metadata["paragraph_count"], 2);
    }

    #[test]
    fn test_small_group_merges_forward() {
        let text = joined(&[BETA, ALPHA, ALPHA, ALPHA]);
        let units = segmenter().segment(&[section(&text)]).unwrap();

        assert_eq!(units.len(), 1);
        assert_eq!(units[0].metadata["paragraph_count"], 4);
    }

    #[test]
    fn test_merge_into_full_group_may_exceed_max_size() {
        // A lone off-topic seed followed by a full group of five: the
        // forward merge absorbs the seed into the full group.
        let text = joined(&[BETA, ALPHA, ALPHA, ALPHA, ALPHA, ALPHA]);
        let units = segmenter().segment(&[section(&text)]).unwrap();

        assert_eq!(units.len(), 1);
        assert_eq!(units[0].metadata["paragraph_count"], 6);
    }

    #[test]
    fn test_trailing_small_group_is_kept() {
        let text = joined(&[ALPHA, ALPHA, BETA]);
        let units = segmenter().segment(&[section(&text)]).unwrap();

        assert_eq!(units.len(), 2);
        assert_eq!(units[1].metadata["paragraph_count"], 1);
        // Singleton cohesion is exactly 1.0 by convention.
        assert_eq!(units[1].cohesion, 1.0);
    }

    #[test]
    fn test_group_size_bounds_property() {
        let text = joined(&[ALPHA, ALPHA, ALPHA, ALPHA, ALPHA, ALPHA, BETA, BETA, ALPHA]);
        let units = segmenter().segment(&[section(&text)]).unwrap();

        let last = units.len() - 1;
        for (i, unit) in units.iter().enumerate() {
            let count = unit.metadata["paragraph_count"].as_u64().unwrap() as usize;
            assert!(count <= 5, "group too large: {}", count);
            if i != last {
                assert!(count >= 2, "non-final group too small: {}", count);
            }
        }
    }

    #[test]
    fn test_identical_paragraphs_have_full_cohesion() {
        let text = joined(&[ALPHA, ALPHA]);
        let units = segmenter().segment(&[section(&text)]).unwrap();

        assert_eq!(units.len(), 1);
        assert!((units[0].cohesion - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_short_paragraphs_are_noise() {
        let text = joined(&["tiny", ALPHA, "also tiny", ALPHA]);
        let units = segmenter().segment(&[section(&text)]).unwrap();

        assert_eq!(units.len(), 1);
        assert_eq!(units[0].metadata["paragraph_count"], 2);
        assert_eq!(units[0].word_count, 10);
    }

    #[test]
    fn test_section_with_only_noise_contributes_nothing() {
        let units = segmenter().segment(&[section("too short")]).unwrap();
        assert!(units.is_empty());
    }

    #[test]
    fn test_empty_input_is_empty_output() {
        let units = segmenter().segment(&[]).unwrap();
        assert!(units.is_empty());
    }

    #[test]
    fn test_positions_are_dense_across_sections() {
        let first = joined(&[ALPHA, ALPHA, BETA, BETA]);
        let second = joined(&[BETA, BETA]);
        let units = segmenter()
            .segment(&[section(&first), section(&second)])
            .unwrap();

        let positions: Vec<usize> = units.iter().map(|u| u.position).collect();
        assert_eq!(positions, (0..units.len()).collect::<Vec<_>>());
        assert_eq!(units.last().unwrap().id, "S1_0");
    }
}
