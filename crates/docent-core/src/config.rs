//! On-disk configuration for the pipeline.
//!
//! Tuning knobs live in a `docent.toml` file; everything has a serde
//! default so a missing or partial file behaves like the built-in
//! defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Root of the `docent.toml` configuration file.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct ConfigRoot {
    #[serde(default)]
    pub segmenter: SegmenterConfig,
    #[serde(default)]
    pub assignment: AssignmentConfig,
}

impl ConfigRoot {
    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config = toml::from_str(&raw)?;
        Ok(config)
    }
}

/// Tuning parameters for the semantic segmenter.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct SegmenterConfig {
    /// Minimum cosine similarity for a paragraph to join the open group.
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f32,
    /// Groups smaller than this are merged into the following group.
    #[serde(default = "default_min_group_size")]
    pub min_group_size: usize,
    /// Maximum paragraphs per group.
    #[serde(default = "default_max_group_size")]
    pub max_group_size: usize,
    /// Paragraphs shorter than this many characters are discarded as noise.
    #[serde(default = "default_min_paragraph_len")]
    pub min_paragraph_len: usize,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: default_similarity_threshold(),
            min_group_size: default_min_group_size(),
            max_group_size: default_max_group_size(),
            min_paragraph_len: default_min_paragraph_len(),
        }
    }
}

fn default_similarity_threshold() -> f32 {
    0.75
}

fn default_min_group_size() -> usize {
    2
}

fn default_max_group_size() -> usize {
    5
}

fn default_min_paragraph_len() -> usize {
    20
}

/// Tuning parameters for role assignment.
///
/// The scoring weights themselves are fixed (see `roles::scorer`); the
/// only runtime choice is whether the balanced distribution pass runs.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct AssignmentConfig {
    /// Balance role distribution across the document.
    #[serde(default = "default_balance_roles")]
    pub balance_roles: bool,
}

impl Default for AssignmentConfig {
    fn default() -> Self {
        Self {
            balance_roles: default_balance_roles(),
        }
    }
}

fn default_balance_roles() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ConfigRoot::default();
        assert_eq!(config.segmenter.similarity_threshold, 0.75);
        assert_eq!(config.segmenter.min_group_size, 2);
        assert_eq!(config.segmenter.max_group_size, 5);
        assert_eq!(config.segmenter.min_paragraph_len, 20);
        assert!(config.assignment.balance_roles);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: ConfigRoot = toml::from_str(
            r#"
            [segmenter]
            similarity_threshold = 0.6
            "#,
        )
        .unwrap();

        assert_eq!(config.segmenter.similarity_threshold, 0.6);
        assert_eq!(config.segmenter.max_group_size, 5);
        assert!(config.assignment.balance_roles);
    }
}
