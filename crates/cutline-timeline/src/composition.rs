//! The composition: canvas plus ordered tracks.

use cutline_core::{CutlineError, RationalTime, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::element::{Element, ElementId};
use crate::track::{Track, TrackId};

fn default_fps() -> u32 {
    30
}

fn default_background() -> String {
    "#000000".to_string()
}

/// Root aggregate of an editing session.
///
/// Track order is visual stacking order, first track on top.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Composition {
    /// Canvas width in pixels
    pub width: u32,
    /// Canvas height in pixels
    pub height: u32,
    #[serde(default = "default_fps")]
    pub fps: u32,
    #[serde(default = "default_background")]
    pub background_color: String,
    #[serde(default)]
    pub tracks: Vec<Track>,
    /// Caption styling passed through untouched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub captions: Option<serde_json::Value>,
}

/// Position of an element: (track index, element index).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    pub track: usize,
    pub index: usize,
}

impl Composition {
    /// Create an empty composition.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            fps: default_fps(),
            background_color: default_background(),
            tracks: Vec::new(),
            captions: None,
        }
    }

    /// Width over height.
    pub fn aspect_ratio(&self) -> f64 {
        self.width as f64 / self.height.max(1) as f64
    }

    pub fn track(&self, id: &TrackId) -> Option<&Track> {
        self.tracks.iter().find(|t| &t.id == id)
    }

    pub fn track_mut(&mut self, id: &TrackId) -> Option<&mut Track> {
        self.tracks.iter_mut().find(|t| &t.id == id)
    }

    pub fn track_index(&self, id: &TrackId) -> Option<usize> {
        self.tracks.iter().position(|t| &t.id == id)
    }

    /// Find where an element lives.
    pub fn locate(&self, id: &ElementId) -> Option<Location> {
        self.tracks.iter().enumerate().find_map(|(track, t)| {
            t.position_of(id).map(|index| Location { track, index })
        })
    }

    pub fn element(&self, id: &ElementId) -> Option<&Element> {
        let loc = self.locate(id)?;
        Some(&self.tracks[loc.track].elements[loc.index])
    }

    /// The track holding an element.
    pub fn track_of(&self, id: &ElementId) -> Option<&Track> {
        self.locate(id).map(|loc| &self.tracks[loc.track])
    }

    /// Every element with its owning track id, in track order.
    pub fn all_elements(&self) -> impl Iterator<Item = (&TrackId, &Element)> {
        self.tracks
            .iter()
            .flat_map(|t| t.elements.iter().map(move |e| (&t.id, e)))
    }

    /// Latest element end across all tracks, without any floor.
    pub fn content_duration(&self) -> RationalTime {
        self.tracks
            .iter()
            .map(Track::end_time)
            .max()
            .unwrap_or(RationalTime::ZERO)
    }

    pub fn element_count(&self) -> usize {
        self.tracks.iter().map(Track::element_count).sum()
    }

    /// Structural validation of a loaded or edited composition.
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(CutlineError::Validation(format!(
                "canvas {}x{} is empty",
                self.width, self.height
            )));
        }

        let mut track_ids = HashSet::new();
        let mut element_ids = HashSet::new();
        for track in &self.tracks {
            if track.id.as_str().is_empty() || !track_ids.insert(&track.id) {
                return Err(CutlineError::Validation(format!(
                    "duplicate or empty track id {:?}",
                    track.id.as_str()
                )));
            }
            for element in &track.elements {
                element.validate()?;
                if !element_ids.insert(&element.id) {
                    return Err(CutlineError::Validation(format!(
                        "duplicate element id {}",
                        element.id
                    )));
                }
            }
        }
        Ok(())
    }
}
