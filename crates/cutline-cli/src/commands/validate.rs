//! Validate a composition document.

use std::path::PathBuf;

pub fn run(path: PathBuf) -> anyhow::Result<()> {
    println!("Validating composition at: {}", path.display());

    let file = super::load(&path)?;
    let comp = &file.composition;

    println!("  Version: {}", file.version);
    println!("  Canvas: {}x{} @ {} fps", comp.width, comp.height, comp.fps);
    println!("  Tracks: {}", comp.tracks.len());
    println!("  Elements: {}", comp.element_count());

    let missing: Vec<String> = comp
        .all_elements()
        .filter(|(_, e)| e.is_media() && e.source.is_none())
        .map(|(track, e)| format!("{} on {track}: media element without source", e.id))
        .collect();

    for track in &comp.tracks {
        for (a, b) in track.overlapping_pairs() {
            println!("  Note: {} overlaps {} on {}", a.id, b.id, track.name);
        }
    }

    if missing.is_empty() {
        println!("\nComposition is valid.");
    } else {
        println!("\nValidation issues:");
        for issue in &missing {
            println!("  - {issue}");
        }
        println!(
            "\n{} issue(s) found. Rendering may skip these elements.",
            missing.len()
        );
    }

    Ok(())
}
