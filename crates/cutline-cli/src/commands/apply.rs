//! Fill template slots in a composition.

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::Context;
use cutline_core::EditorConfig;
use cutline_timeline::{apply_modifications, CompositionFile, Modification};

pub fn run(
    path: PathBuf,
    modifications: PathBuf,
    output: Option<PathBuf>,
    config: &EditorConfig,
) -> anyhow::Result<()> {
    let file = super::load(&path)?;
    let data = std::fs::read(&modifications)
        .with_context(|| format!("Failed to read {}", modifications.display()))?;
    let mods: HashMap<String, Modification> =
        serde_json::from_slice(&data).context("Modifications must be a JSON object")?;

    let (resolved, changed) = apply_modifications(&file.composition, &mods, config);
    let output = output.unwrap_or(path);
    CompositionFile::new(resolved)
        .save_to_file(&output)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    println!("Updated {changed} element(s), wrote {}", output.display());
    Ok(())
}
