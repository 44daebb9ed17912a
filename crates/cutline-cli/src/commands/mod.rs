pub mod apply;
pub mod edl;
pub mod info;
pub mod synthesize;
pub mod validate;

use std::path::Path;

use anyhow::Context;
use cutline_timeline::CompositionFile;

/// Read and validate a composition document.
pub fn load(path: &Path) -> anyhow::Result<CompositionFile> {
    CompositionFile::load_from_file(path)
        .with_context(|| format!("Failed to load composition {}", path.display()))
}
