//! Show composition information.

use std::path::PathBuf;

use cutline_core::EditorConfig;
use cutline_timeline::{Editor, ElementType};

pub fn run(path: PathBuf, config: &EditorConfig) -> anyhow::Result<()> {
    let file = super::load(&path)?;
    let editor = Editor::with_config(config.clone(), file.into_composition());
    let comp = editor.composition();

    println!("Composition: {}", path.display());
    println!("  Canvas: {}x{} ({:.3}:1)", comp.width, comp.height, comp.aspect_ratio());
    println!("  Background: {}", comp.background_color);
    println!("  Duration: {}", editor.timeline_duration());
    println!();

    for (index, track) in editor.tracks().iter().enumerate() {
        let mut flags = Vec::new();
        if track.muted {
            flags.push("muted");
        }
        if track.locked {
            flags.push("locked");
        }
        if !track.visible {
            flags.push("hidden");
        }
        println!(
            "  [{index}] {} ({:?}, {} elements){}",
            track.name,
            track.kind,
            track.element_count(),
            if flags.is_empty() {
                String::new()
            } else {
                format!(" [{}]", flags.join(", "))
            }
        );
        for el in track.sorted_elements() {
            let frame = if el.element_type() == ElementType::Audio {
                String::new()
            } else {
                format!(
                    "  {:.0}x{:.0}px",
                    el.width.resolve(f64::from(comp.width)),
                    el.height.resolve(f64::from(comp.height))
                )
            };
            println!(
                "      {:<24} {:?} {} → {}  src {} → {}{frame}",
                el.id.as_str(),
                el.element_type(),
                el.time,
                el.end(),
                el.trim_start,
                el.source_end()
            );
        }
    }

    Ok(())
}
