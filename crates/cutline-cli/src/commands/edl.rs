//! Print the edit decision list.

use std::path::PathBuf;

use anyhow::Context;
use cutline_timeline::Edl;

pub fn run(path: PathBuf, primary: bool) -> anyhow::Result<()> {
    let file = super::load(&path)?;
    let edl = if primary {
        Edl::primary_video(&file.composition)
    } else {
        Edl::build(&file.composition)
    };
    tracing::debug!(tracks = edl.tracks.len(), clips = edl.clip_count(), "EDL built");

    let json = serde_json::to_string_pretty(&edl).context("Failed to serialize EDL")?;
    println!("{json}");
    Ok(())
}
