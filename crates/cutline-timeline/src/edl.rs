//! Edit Decision List export.
//!
//! The EDL is what the render service consumes: per track, the source ranges
//! to play, ordered by timeline start. Field names are part of the render
//! contract.

use cutline_core::{CutlineError, RationalTime, Result};
use serde::{Deserialize, Serialize};

use crate::composition::Composition;
use crate::element::{Element, ElementType};
use crate::track::{Track, TrackKind};

/// One source range to play.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdlClip {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ElementType,
    /// Source-space start
    pub start: RationalTime,
    /// Source-space end
    pub end: RationalTime,
    /// Extra renderer-side trim, zero unless a renderer applies more
    pub trim_start: RationalTime,
    pub trim_end: RationalTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl EdlClip {
    fn from_element(element: &Element) -> Self {
        Self {
            id: element.id.to_string(),
            kind: element.element_type(),
            start: element.trim_start,
            end: element.source_end(),
            trim_start: RationalTime::ZERO,
            trim_end: RationalTime::ZERO,
            text: element.text().map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdlTrack {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: TrackKind,
    pub muted: bool,
    pub clips: Vec<EdlClip>,
}

/// Per-track, time-ordered clip lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edl {
    pub tracks: Vec<EdlTrack>,
}

fn clips_by_time<'a>(elements: impl Iterator<Item = &'a Element>) -> Vec<EdlClip> {
    let mut ordered: Vec<&Element> = elements.collect();
    // Stable: equal start times keep list order
    ordered.sort_by_key(|e| e.time);
    ordered.into_iter().map(EdlClip::from_element).collect()
}

impl Edl {
    /// Project every track. Pure: the same composition always yields the
    /// same list.
    pub fn build(composition: &Composition) -> Self {
        let tracks = composition
            .tracks
            .iter()
            .map(|track: &Track| EdlTrack {
                id: track.id.to_string(),
                kind: track.kind,
                muted: track.muted,
                clips: clips_by_time(track.elements.iter()),
            })
            .collect();
        Self { tracks }
    }

    /// Single-track projection for simple trims: video elements from video
    /// tracks only, merged and time-ordered.
    pub fn primary_video(composition: &Composition) -> Self {
        let elements = composition
            .tracks
            .iter()
            .filter(|t| t.kind == TrackKind::Video)
            .flat_map(|t| t.elements.iter())
            .filter(|e| e.element_type() == ElementType::Video);
        Self {
            tracks: vec![EdlTrack {
                id: "video".to_string(),
                kind: TrackKind::Video,
                muted: false,
                clips: clips_by_time(elements),
            }],
        }
    }

    pub fn clip_count(&self) -> usize {
        self.tracks.iter().map(|t| t.clips.len()).sum()
    }

    /// Request body for the render service.
    pub fn to_json(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self)
            .map_err(|e| CutlineError::Serialization(format!("Failed to serialize EDL: {}", e)))
    }
}
