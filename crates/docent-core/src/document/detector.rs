//! Heading detection and structural splitting.
//!
//! A regex pre-pass that turns raw text into ordered, titled sections
//! for the semantic segmenter. Three heading shapes are recognized:
//! ALL-CAPS lines, numbered headings ("1. Overview", "1.1 Details"),
//! and underlined headings (`===` / `---`).

use regex::Regex;

use super::heading::{Heading, Section, SectionType};

/// Detects headings in plain text and splits the text into sections.
pub struct HeadingDetector {
    numbered: Regex,
    underline: Regex,
}

impl Default for HeadingDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadingDetector {
    pub fn new() -> Self {
        Self {
            numbered: Regex::new(r"^((?:\d+\.)+)\s+(.+)$").expect("hardcoded pattern is valid"),
            underline: Regex::new(r"^[=\-]{3,}$").expect("hardcoded pattern is valid"),
        }
    }

    /// Detects document headings.
    ///
    /// Returns headings ordered by document position. Numbered headings
    /// carry the text after the numbering prefix; their level is the
    /// number of dots in the prefix ("1.1" is level 2).
    pub fn detect_headings(&self, text: &str) -> Vec<Heading> {
        let lines: Vec<&str> = text.split('\n').collect();
        let offsets = line_offsets(&lines);

        let mut headings = Vec::new();

        for (i, line) in lines.iter().enumerate() {
            let stripped = line.trim();
            if stripped.is_empty() {
                continue;
            }

            // Pattern 1: ALL CAPS (3-10 words, no leading digit)
            let words = stripped.split_whitespace().count();
            if is_all_caps(stripped)
                && (3..=10).contains(&words)
                && !stripped.chars().take(3).any(|c| c.is_ascii_digit())
            {
                headings.push(Heading {
                    text: stripped.to_string(),
                    level: 1,
                    position: offsets[i],
                    line_number: i,
                });
                tracing::debug!("Found ALL CAPS heading at line {}: {}", i, stripped);
                continue;
            }

            // Pattern 2: numbered headings ("1.", "1.1", "1.1.1")
            if let Some(captures) = self.numbered.captures(stripped) {
                let level = captures[1].matches('.').count();
                let heading_text = captures[2].to_string();

                tracing::debug!(
                    "Found numbered heading at line {}: {} (level {})",
                    i,
                    heading_text,
                    level
                );
                headings.push(Heading {
                    text: heading_text,
                    level,
                    position: offsets[i],
                    line_number: i,
                });
                continue;
            }

            // Pattern 3: underlined headings
            if i > 0 && self.underline.is_match(stripped) {
                let prev_line = lines[i - 1].trim();
                if !prev_line.is_empty() && prev_line.split_whitespace().count() <= 10 {
                    let level = if stripped.contains('=') { 1 } else { 2 };

                    tracing::debug!(
                        "Found underlined heading at line {}: {} (level {})",
                        i - 1,
                        prev_line,
                        level
                    );
                    headings.push(Heading {
                        text: prev_line.to_string(),
                        level,
                        position: offsets[i - 1],
                        line_number: i - 1,
                    });
                }
            }
        }

        tracing::debug!("Detected {} headings", headings.len());
        headings
    }

    /// Splits the document into sections at heading boundaries.
    ///
    /// Each section spans from the line after its heading to the next
    /// heading. Empty sections are dropped. With no headings at all the
    /// whole document becomes one level-0 body section.
    pub fn split_by_headings(&self, text: &str, headings: &[Heading]) -> Vec<Section> {
        if headings.is_empty() {
            if text.trim().is_empty() {
                return Vec::new();
            }
            return vec![Section {
                title: "Document".to_string(),
                text: text.to_string(),
                level: 0,
                section_type: SectionType::Body,
                start_pos: 0,
                end_pos: text.chars().count(),
            }];
        }

        let lines: Vec<&str> = text.split('\n').collect();
        let offsets = line_offsets(&lines);

        let mut sections = Vec::new();

        for (i, heading) in headings.iter().enumerate() {
            let start_line = heading.line_number + 1;
            let end_line = match headings.get(i + 1) {
                Some(next) => next.line_number,
                None => lines.len(),
            };

            let section_text = lines[start_line..end_line].join("\n").trim().to_string();
            if section_text.is_empty() {
                continue;
            }

            sections.push(Section {
                title: heading.text.clone(),
                text: section_text,
                level: heading.level,
                section_type: SectionType::classify(&heading.text),
                start_pos: heading.position,
                end_pos: offsets[end_line],
            });
        }

        tracing::debug!("Split document into {} sections", sections.len());
        sections
    }
}

/// Character offset of each line start, plus one past the final line.
fn line_offsets(lines: &[&str]) -> Vec<usize> {
    let mut offsets = Vec::with_capacity(lines.len() + 1);
    let mut offset = 0usize;
    for line in lines {
        offsets.push(offset);
        offset += line.chars().count() + 1;
    }
    offsets.push(offset);
    offsets
}

fn is_all_caps(line: &str) -> bool {
    line.chars().any(|c| c.is_alphabetic()) && !line.chars().any(|c| c.is_lowercase())
}
