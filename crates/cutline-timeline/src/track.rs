//! Track types for the timeline.

use cutline_core::RationalTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::element::{Element, ElementId};

/// Stable track identifier (`track_…`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackId(String);

impl TrackId {
    pub fn generate() -> Self {
        let hex = Uuid::new_v4().simple().to_string();
        Self(format!("track_{}", &hex[..12]))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TrackId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Kind of track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackKind {
    Video,
    Audio,
    Overlay,
    Captions,
}

impl TrackKind {
    /// Visual tracks stack top-to-bottom in list order.
    pub fn is_visual(self) -> bool {
        !matches!(self, Self::Audio)
    }

    pub fn default_name(self) -> &'static str {
        match self {
            Self::Video => "Video",
            Self::Audio => "Audio",
            Self::Overlay => "Overlay",
            Self::Captions => "Captions",
        }
    }
}

fn default_visible() -> bool {
    true
}

/// A track containing placed elements.
///
/// Element order is insertion order only; each element carries its own
/// timeline position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    /// Unique track ID
    pub id: TrackId,
    /// Track name
    #[serde(default)]
    pub name: String,
    /// Track kind
    #[serde(rename = "type")]
    pub kind: TrackKind,
    /// Is track muted
    #[serde(default)]
    pub muted: bool,
    /// Is track locked (prevent edits)
    #[serde(default)]
    pub locked: bool,
    /// Is track shown in the preview
    #[serde(default = "default_visible")]
    pub visible: bool,
    /// Elements in this track
    #[serde(default)]
    pub elements: Vec<Element>,
}

impl Track {
    /// Create an empty track.
    pub fn new(kind: TrackKind, name: impl Into<String>) -> Self {
        Self {
            id: TrackId::generate(),
            name: name.into(),
            kind,
            muted: false,
            locked: false,
            visible: true,
            elements: Vec::new(),
        }
    }

    /// Latest element end on this track.
    pub fn end_time(&self) -> RationalTime {
        self.elements
            .iter()
            .map(Element::end)
            .max()
            .unwrap_or(RationalTime::ZERO)
    }

    /// Append an element.
    pub fn push_element(&mut self, element: Element) {
        self.elements.push(element);
    }

    /// Insert an element at the given list index (clamped).
    pub fn insert_element(&mut self, index: usize, element: Element) {
        let index = index.min(self.elements.len());
        self.elements.insert(index, element);
    }

    /// Index of an element in this track's list.
    pub fn position_of(&self, id: &ElementId) -> Option<usize> {
        self.elements.iter().position(|e| &e.id == id)
    }

    pub fn contains(&self, id: &ElementId) -> bool {
        self.position_of(id).is_some()
    }

    /// Pairs of elements whose timeline ranges overlap. Overlap is legal;
    /// this is for reporting.
    pub fn overlapping_pairs(&self) -> Vec<(&Element, &Element)> {
        let sorted = self.sorted_elements();
        let mut pairs = Vec::new();
        for (i, a) in sorted.iter().enumerate() {
            for b in &sorted[i + 1..] {
                if b.time >= a.end() {
                    break;
                }
                if a.timeline_range().overlaps(b.timeline_range()) {
                    pairs.push((*a, *b));
                }
            }
        }
        pairs
    }

    /// Elements ordered by timeline start. Ties keep insertion order.
    pub fn sorted_elements(&self) -> Vec<&Element> {
        let mut sorted: Vec<&Element> = self.elements.iter().collect();
        sorted.sort_by_key(|e| e.time);
        sorted
    }

    /// Elements that are playing at `time`.
    pub fn elements_at(&self, time: RationalTime) -> impl Iterator<Item = &Element> {
        self.elements
            .iter()
            .filter(move |e| e.timeline_range().contains(time))
    }

    /// Number of elements in this track.
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }
}
