//! Build a starting composition from project metadata.

use std::path::{Path, PathBuf};

use anyhow::Context;
use cutline_core::EditorConfig;
use cutline_timeline::{Composition, CompositionFile, ProjectMetadata};

pub fn synthesize(metadata: &Path, config: &EditorConfig) -> anyhow::Result<CompositionFile> {
    let data = std::fs::read(metadata)
        .with_context(|| format!("Failed to read metadata {}", metadata.display()))?;
    let meta: ProjectMetadata =
        serde_json::from_slice(&data).context("Invalid project metadata")?;
    Ok(CompositionFile::new(Composition::synthesize(&meta, config)))
}

pub fn run(metadata: PathBuf, output: PathBuf, config: &EditorConfig) -> anyhow::Result<()> {
    let file = synthesize(&metadata, config)?;
    file.save_to_file(&output)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    println!(
        "Wrote {} ({} tracks, {} elements)",
        output.display(),
        file.composition.tracks.len(),
        file.composition.element_count()
    );
    Ok(())
}
