use std::path::Path;

use anyhow::{Context, Result};

use super::{builder_for, read_document};

/// Builds and prints the teaching script for one document.
pub fn run(file: &Path, greedy: bool, json: bool, config: Option<&Path>) -> Result<()> {
    let (name, text) = read_document(file)?;
    let builder = builder_for(config, greedy)?;
    let script = builder
        .build(&name, &text)
        .with_context(|| format!("Failed to build teaching script for {}", name))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&script)?);
        return Ok(());
    }

    let summary = builder.processor().summary(&script.units);
    println!("Document: {}", summary.source_file);
    println!(
        "Units: {} ({} words, avg {:.1} words/unit, avg cohesion {:.2})",
        summary.total_units, summary.total_words, summary.avg_words_per_unit, summary.avg_cohesion
    );

    println!("\nSections:");
    for (section_type, section) in &summary.sections {
        println!(
            "  {}: {} units, {} words",
            section_type, section.count, section.words
        );
    }

    println!("\nScript:");
    for (role, unit) in &script.queue {
        let preview: String = unit.text.chars().take(60).collect();
        println!(
            "  {:>3}. [{}] {} - {}...",
            unit.position,
            role,
            unit.title.as_deref().unwrap_or("(untitled)"),
            preview
        );
    }

    println!("\nRole distribution:");
    for (role, count) in &script.statistics.role_counts {
        let percentage = script.statistics.role_percentages.get(role).copied();
        println!(
            "  {}: {} ({:.0}%)",
            role,
            count,
            percentage.unwrap_or(0.0)
        );
    }
    println!(
        "Overall confidence: {:.2}",
        script.statistics.overall_confidence
    );

    Ok(())
}
