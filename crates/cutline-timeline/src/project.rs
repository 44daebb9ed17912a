//! Project metadata and initial composition synthesis.

use cutline_core::{EditorConfig, RationalTime};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::composition::Composition;
use crate::element::{Element, ElementKind};
use crate::serialization::CompositionFile;
use crate::track::{Track, TrackKind};

/// One timed transcript line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    pub start: RationalTime,
    pub end: RationalTime,
    #[serde(default)]
    pub text: String,
}

/// What the project store knows about a project besides its composition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectMetadata {
    pub id: String,
    pub name: String,
    /// Length of the uploaded media
    pub duration: RationalTime,
    pub width: Option<u32>,
    pub height: Option<u32>,
    /// Media reference of the uploaded video
    pub source: Option<String>,
    pub original_filename: Option<String>,
    pub segments: Vec<TranscriptSegment>,
}

/// Where a session's composition came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompositionOrigin {
    Persisted,
    Synthesized,
}

fn media_element(kind: ElementKind, meta: &ProjectMetadata, source: &str, fallback_name: &str) -> Element {
    let mut el = Element::new(kind, RationalTime::ZERO, meta.duration);
    el.name = meta
        .original_filename
        .clone()
        .unwrap_or_else(|| fallback_name.to_string());
    el.source = Some(source.to_string());
    el.source_duration = Some(meta.duration);
    el
}

impl Composition {
    /// Build the starting composition for a fresh project: main video on
    /// top, an empty overlay, one caption per transcript line, and the
    /// linked audio at the bottom.
    pub fn synthesize(meta: &ProjectMetadata, config: &EditorConfig) -> Self {
        let mut comp = Composition::new(
            meta.width.filter(|w| *w > 0).unwrap_or(config.default_width),
            meta.height.filter(|h| *h > 0).unwrap_or(config.default_height),
        );
        comp.fps = config.default_fps;

        let media = meta
            .source
            .as_deref()
            .filter(|_| meta.duration.is_positive());

        if let Some(source) = media {
            let mut video = Track::new(TrackKind::Video, "Main Video");
            let mut el = media_element(ElementKind::Video, meta, source, "Video");
            // The audio track carries the sound
            el.volume = 0.0;
            video.push_element(el);
            comp.tracks.push(video);
        }

        comp.tracks.push(Track::new(TrackKind::Overlay, "Overlay"));

        let mut captions = Track::new(TrackKind::Captions, "Captions");
        for segment in &meta.segments {
            let text = segment.text.trim();
            let duration = segment.end - segment.start;
            if text.is_empty() || !duration.is_positive() || segment.start.is_negative() {
                continue;
            }
            let mut el = Element::new(
                ElementKind::Caption {
                    text: text.to_string(),
                },
                segment.start,
                duration,
            );
            el.name = "Caption".to_string();
            el.apply_default_layout(comp.width, comp.height);
            captions.push_element(el);
        }
        if !captions.elements.is_empty() {
            comp.tracks.push(captions);
        }

        let mut audio = Track::new(TrackKind::Audio, "Audio");
        if let Some(source) = media {
            audio.push_element(media_element(ElementKind::Audio, meta, source, "Audio"));
        }
        comp.tracks.push(audio);

        comp.captions = Some(serde_json::json!({
            "enabled": !meta.segments.is_empty(),
            "style": "clean",
            "settings": {
                "position": "bottom",
                "font_size": 48,
                "highlight_keywords": false,
            },
        }));

        info!(
            project = %meta.id,
            tracks = comp.tracks.len(),
            elements = comp.element_count(),
            "Synthesized composition"
        );
        comp
    }

    /// Use the persisted composition when it parses and validates, else
    /// synthesize one from metadata. Never fails.
    pub fn load_or_synthesize(
        raw: Option<&[u8]>,
        meta: &ProjectMetadata,
        config: &EditorConfig,
    ) -> (Self, CompositionOrigin) {
        if let Some(data) = raw {
            match CompositionFile::from_json(data) {
                Ok(file) => return (file.into_composition(), CompositionOrigin::Persisted),
                Err(e) => {
                    warn!(project = %meta.id, error = %e, "Persisted composition unusable, synthesizing");
                }
            }
        }
        (Self::synthesize(meta, config), CompositionOrigin::Synthesized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edl::Edl;

    fn meta() -> ProjectMetadata {
        ProjectMetadata {
            id: "p1".into(),
            name: "Demo".into(),
            duration: RationalTime::from_secs(30),
            source: Some("media://video-projects/7/clip.mp4".into()),
            original_filename: Some("clip.mp4".into()),
            segments: vec![
                TranscriptSegment {
                    start: RationalTime::from_secs(1),
                    end: RationalTime::from_secs(3),
                    text: "Hello there".into(),
                },
                TranscriptSegment {
                    start: RationalTime::from_secs(3),
                    end: RationalTime::from_secs(4),
                    text: "   ".into(),
                },
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_synthesize_layout() {
        let comp = Composition::synthesize(&meta(), &EditorConfig::default());
        let kinds: Vec<TrackKind> = comp.tracks.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![TrackKind::Video, TrackKind::Overlay, TrackKind::Captions, TrackKind::Audio]
        );
        assert_eq!((comp.width, comp.height), (1080, 1920));
        assert_eq!(comp.tracks[0].name, "Main Video");
        assert_eq!(comp.tracks[0].elements[0].name, "clip.mp4");
        assert_eq!(comp.tracks[0].elements[0].volume, 0.0);
        assert_eq!(comp.tracks[2].elements.len(), 1);
        assert_eq!(comp.tracks[2].elements[0].text(), Some("Hello there"));
        assert_eq!(comp.tracks[3].elements[0].duration, RationalTime::from_secs(30));
        assert!(comp.validate().is_ok());

        let edl = Edl::build(&comp);
        assert_eq!(edl.tracks[0].clips[0].end, RationalTime::from_secs(30));
    }

    #[test]
    fn test_synthesize_without_media() {
        let meta = ProjectMetadata {
            width: Some(1920),
            height: Some(1080),
            ..Default::default()
        };
        let comp = Composition::synthesize(&meta, &EditorConfig::default());
        let kinds: Vec<TrackKind> = comp.tracks.iter().map(|t| t.kind).collect();
        assert_eq!(kinds, vec![TrackKind::Overlay, TrackKind::Audio]);
        assert_eq!(comp.element_count(), 0);
        assert_eq!(comp.width, 1920);
    }

    #[test]
    fn test_corrupt_data_falls_back() {
        let config = EditorConfig::default();
        let (comp, origin) = Composition::load_or_synthesize(Some(b"{ nope"), &meta(), &config);
        assert_eq!(origin, CompositionOrigin::Synthesized);
        assert!(!comp.tracks.is_empty());

        let (_, origin) = Composition::load_or_synthesize(None, &meta(), &config);
        assert_eq!(origin, CompositionOrigin::Synthesized);
    }

    #[test]
    fn test_out_of_range_times_fall_back() {
        let config = EditorConfig::default();
        let mut doc = CompositionFile::new(Composition::synthesize(&meta(), &config))
            .to_value()
            .unwrap();
        let el = &mut doc["tracks"][0]["elements"][0];
        el["duration"] = serde_json::json!(9_300_000_000_000.0);
        el["trim_start"] = serde_json::json!(9_300_000_000_000.0);
        el["source_duration"] = serde_json::json!(1);
        let raw = serde_json::to_vec(&doc).unwrap();

        let (comp, origin) = Composition::load_or_synthesize(Some(&raw), &meta(), &config);
        assert_eq!(origin, CompositionOrigin::Synthesized);
        assert_eq!(comp.tracks[0].elements[0].duration, RationalTime::from_secs(30));
    }

    #[test]
    fn test_persisted_data_wins() {
        let config = EditorConfig::default();
        let saved = CompositionFile::new(Composition::new(640, 480)).to_json().unwrap();
        let (comp, origin) = Composition::load_or_synthesize(Some(&saved), &meta(), &config);
        assert_eq!(origin, CompositionOrigin::Persisted);
        assert_eq!(comp.width, 640);
        assert!(comp.tracks.is_empty());
    }

    #[test]
    fn test_metadata_from_sparse_json() {
        let meta: ProjectMetadata = serde_json::from_value(serde_json::json!({
            "id": "42",
            "duration": 12.5,
            "segments": [{ "start": 0, "end": 1.5, "text": "a" }],
        }))
        .unwrap();
        assert_eq!(meta.duration, RationalTime::new(25, 2));
        assert!(meta.source.is_none());
        assert_eq!(meta.segments.len(), 1);
    }
}
