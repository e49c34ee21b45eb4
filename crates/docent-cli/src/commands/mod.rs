pub mod script;
pub mod walk;

use std::path::Path;

use anyhow::{Context, Result};
use docent_core::config::ConfigRoot;
use docent_core::document::HashingEmbedder;
use docent_core::pipeline::ScriptBuilder;

/// Sets up the pipeline from an optional config file. The `--greedy`
/// flag wins over the config's balancing setting.
pub fn builder_for(config_path: Option<&Path>, greedy: bool) -> Result<ScriptBuilder> {
    let config = match config_path {
        Some(path) => ConfigRoot::load(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => ConfigRoot::default(),
    };

    let balance = !greedy && config.assignment.balance_roles;
    Ok(ScriptBuilder::new(
        Box::new(HashingEmbedder::default()),
        config.segmenter,
        balance,
    ))
}

pub fn read_document(path: &Path) -> Result<(String, String)> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read document: {}", path.display()))?;
    tracing::debug!("Read {} chars from {}", text.chars().count(), path.display());
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok((name, text))
}
