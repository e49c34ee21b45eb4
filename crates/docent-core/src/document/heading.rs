//! Structural records produced by the heading pre-pass.

use serde::{Deserialize, Serialize};

/// A detected document heading.
///
/// Headings are produced once per document, ordered by document
/// position, and immutable afterward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heading {
    /// Heading text with any numbering prefix stripped.
    pub text: String,
    /// Nesting level (1 = top-level, 2 = subsection, ...).
    pub level: usize,
    /// Character offset of the heading in the document.
    pub position: usize,
    /// Line number of the heading in the document.
    pub line_number: usize,
}

/// Coarse semantic label for a section, derived from its heading text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionType {
    Introduction,
    Body,
    Methodology,
    Conclusion,
}

impl SectionType {
    /// Classifies a heading into a coarse section type by keyword.
    pub fn classify(heading_text: &str) -> Self {
        let lower = heading_text.to_lowercase();

        const INTRODUCTION: [&str; 5] =
            ["introduction", "overview", "background", "preface", "abstract"];
        const CONCLUSION: [&str; 5] = ["conclusion", "summary", "final", "closing", "recap"];
        const METHODOLOGY: [&str; 5] =
            ["method", "approach", "implementation", "procedure", "experiment"];

        if INTRODUCTION.iter().any(|kw| lower.contains(kw)) {
            SectionType::Introduction
        } else if CONCLUSION.iter().any(|kw| lower.contains(kw)) {
            SectionType::Conclusion
        } else if METHODOLOGY.iter().any(|kw| lower.contains(kw)) {
            SectionType::Methodology
        } else {
            SectionType::Body
        }
    }

    /// Lowercase name used in unit metadata and scoring.
    pub fn as_str(&self) -> &'static str {
        match self {
            SectionType::Introduction => "introduction",
            SectionType::Body => "body",
            SectionType::Methodology => "methodology",
            SectionType::Conclusion => "conclusion",
        }
    }
}

/// A titled span of document text between two headings.
///
/// Sections never carry empty text; empty spans are dropped by the
/// splitter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    /// Section title (the heading text, or "Document" for the
    /// no-heading fallback).
    pub title: String,
    /// Body text of the section, headings excluded.
    pub text: String,
    /// Heading level (0 for the no-heading fallback).
    pub level: usize,
    /// Coarse semantic label.
    pub section_type: SectionType,
    /// Character offset where the section starts.
    pub start_pos: usize,
    /// Character offset where the section ends.
    pub end_pos: usize,
}
