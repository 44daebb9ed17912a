//! Edit operations.
//!
//! Each operation validates first, then mutates and commits. A failed
//! precondition (locked track, unknown id, playhead outside the element,
//! result below the trim floor) is a silent no-op: state is untouched and no
//! history entry is pushed. Operations report whether they applied.

use cutline_core::{Dimension, RationalTime};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::debug;

use crate::composition::Location;
use crate::element::{Effect, Element, ElementId, ElementKind, Fit, Transition};
use crate::modifications::{self, Modification};
use crate::session::Editor;
use crate::track::{Track, TrackId, TrackKind};

/// Which edge of an element a trim drags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrimSide {
    Start,
    End,
}

// ── Element construction & property edits ───────────────────────

/// Caller-supplied fields for a new element. Unset fields take the
/// type-dependent defaults.
#[derive(Debug, Clone)]
pub struct ElementDraft {
    pub kind: ElementKind,
    pub name: Option<String>,
    pub time: Option<RationalTime>,
    pub duration: Option<RationalTime>,
    pub source: Option<String>,
    pub source_duration: Option<RationalTime>,
    pub trim_start: Option<RationalTime>,
    pub x: Option<Dimension>,
    pub y: Option<Dimension>,
    pub width: Option<Dimension>,
    pub height: Option<Dimension>,
    pub fit: Option<Fit>,
    pub volume: Option<f64>,
    pub modification_key: Option<String>,
}

impl Default for ElementDraft {
    fn default() -> Self {
        Self::new(ElementKind::Video)
    }
}

impl ElementDraft {
    pub fn new(kind: ElementKind) -> Self {
        Self {
            kind,
            name: None,
            time: None,
            duration: None,
            source: None,
            source_duration: None,
            trim_start: None,
            x: None,
            y: None,
            width: None,
            height: None,
            fit: None,
            volume: None,
            modification_key: None,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn at(mut self, time: RationalTime) -> Self {
        self.time = Some(time);
        self
    }

    pub fn lasting(mut self, duration: RationalTime) -> Self {
        self.duration = Some(duration);
        self
    }

    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Known total length of the source media.
    pub fn source_length(mut self, length: RationalTime) -> Self {
        self.source_duration = Some(length);
        self
    }

    pub fn trim_start(mut self, trim_start: RationalTime) -> Self {
        self.trim_start = Some(trim_start);
        self
    }

    fn build(self, canvas_width: u32, canvas_height: u32, default_duration: RationalTime) -> Element {
        let mut element = Element::new(
            self.kind,
            self.time.unwrap_or(RationalTime::ZERO),
            self.duration.unwrap_or(default_duration),
        );
        element.apply_default_layout(canvas_width, canvas_height);

        if let Some(name) = self.name {
            element.name = name;
        }
        element.source = self.source;
        element.source_duration = self.source_duration;
        if let Some(trim_start) = self.trim_start {
            element.trim_start = trim_start;
        }
        if let Some(x) = self.x {
            element.x = x;
        }
        if let Some(y) = self.y {
            element.y = y;
        }
        if let Some(width) = self.width {
            element.width = width;
        }
        if let Some(height) = self.height {
            element.height = height;
        }
        if let Some(fit) = self.fit {
            element.fit = fit;
        }
        if let Some(volume) = self.volume {
            element.volume = volume;
        }
        element.modification_key = self.modification_key;
        element
    }
}

/// A typed property edit. `None` leaves a field alone.
#[derive(Debug, Clone, Default)]
pub struct ElementPatch {
    pub name: Option<String>,
    pub source: Option<String>,
    pub x: Option<Dimension>,
    pub y: Option<Dimension>,
    pub width: Option<Dimension>,
    pub height: Option<Dimension>,
    pub rotation: Option<f64>,
    pub opacity: Option<f64>,
    pub fit: Option<Fit>,
    pub volume: Option<f64>,
    pub fade_in: Option<RationalTime>,
    pub fade_out: Option<RationalTime>,
    /// Only for text-bearing elements.
    pub text: Option<String>,
    pub effects: Option<Vec<Effect>>,
    /// `Some(None)` removes the transition.
    pub transition: Option<Option<Transition>>,
    /// Only for generated elements; media length follows its source.
    pub duration: Option<RationalTime>,
}

impl ElementPatch {
    /// Apply onto `element`. Returns false if the patch does not fit the
    /// element's kind.
    fn apply_to(&self, element: &mut Element) -> bool {
        if let Some(text) = &self.text {
            match element.kind.text_mut() {
                Some(slot) => *slot = text.clone(),
                None => return false,
            }
        }
        if let Some(duration) = self.duration {
            if element.is_media() {
                return false;
            }
            element.duration = duration;
        }
        if let Some(name) = &self.name {
            element.name = name.clone();
        }
        if let Some(source) = &self.source {
            element.source = Some(source.clone());
        }
        if let Some(x) = self.x {
            element.x = x;
        }
        if let Some(y) = self.y {
            element.y = y;
        }
        if let Some(width) = self.width {
            element.width = width;
        }
        if let Some(height) = self.height {
            element.height = height;
        }
        if let Some(rotation) = self.rotation {
            element.rotation = rotation;
        }
        if let Some(opacity) = self.opacity {
            element.opacity = opacity;
        }
        if let Some(fit) = self.fit {
            element.fit = fit;
        }
        if let Some(volume) = self.volume {
            element.volume = volume;
        }
        if let Some(fade_in) = self.fade_in {
            element.fade_in = fade_in;
        }
        if let Some(fade_out) = self.fade_out {
            element.fade_out = fade_out;
        }
        if let Some(effects) = &self.effects {
            element.effects = effects.clone();
        }
        if let Some(transition) = &self.transition {
            element.transition = transition.clone();
        }
        true
    }
}

impl Editor {
    /// Locate an element that may be edited (exists, track unlocked).
    fn editable(&self, id: &ElementId) -> Option<Location> {
        let Some(loc) = self.composition.locate(id) else {
            debug!(element = %id, "Edit ignored: unknown element");
            return None;
        };
        if self.composition.tracks[loc.track].locked {
            debug!(element = %id, "Edit ignored: track is locked");
            return None;
        }
        Some(loc)
    }

    fn element_at(&self, loc: Location) -> &Element {
        &self.composition.tracks[loc.track].elements[loc.index]
    }

    fn replace_element(&mut self, loc: Location, element: Element) {
        self.composition.tracks[loc.track].elements[loc.index] = element;
    }

    // ── Tracks ──────────────────────────────────────────────────

    /// Create an empty track. Visual tracks go on top of the stack, audio
    /// tracks at the bottom.
    pub fn add_track(&mut self, kind: TrackKind, name: Option<&str>) -> TrackId {
        let track = Track::new(kind, name.unwrap_or(kind.default_name()));
        let id = track.id.clone();
        if kind.is_visual() {
            self.composition.tracks.insert(0, track);
        } else {
            self.composition.tracks.push(track);
        }
        self.commit("Add track");
        id
    }

    /// Delete a track and everything on it.
    pub fn remove_track(&mut self, id: &TrackId) -> bool {
        let Some(index) = self.composition.track_index(id) else {
            return false;
        };
        let removed = self.composition.tracks.remove(index);
        if self.selection.active_track() == Some(id) {
            self.selection.clear();
        } else {
            self.selection.retain(|e| !removed.contains(e));
        }
        self.commit("Remove track");
        true
    }

    /// Move a track within the stack.
    pub fn reorder_track(&mut self, from: usize, to: usize) -> bool {
        let len = self.composition.tracks.len();
        if from >= len || to >= len || from == to {
            debug!(from, to, len, "Reorder ignored");
            return false;
        }
        let track = self.composition.tracks.remove(from);
        self.composition.tracks.insert(to, track);
        self.commit("Reorder tracks");
        true
    }

    /// One step towards the top. No-op at the boundary.
    pub fn move_track_up(&mut self, id: &TrackId) -> bool {
        match self.composition.track_index(id) {
            Some(index) if index > 0 => self.reorder_track(index, index - 1),
            _ => false,
        }
    }

    /// One step towards the bottom. No-op at the boundary.
    pub fn move_track_down(&mut self, id: &TrackId) -> bool {
        let len = self.composition.tracks.len();
        match self.composition.track_index(id) {
            Some(index) if index + 1 < len => self.reorder_track(index, index + 1),
            _ => false,
        }
    }

    fn toggle_track_flag(
        &mut self,
        id: &TrackId,
        label: &str,
        flag: fn(&mut Track) -> &mut bool,
    ) -> bool {
        let Some(track) = self.composition.track_mut(id) else {
            return false;
        };
        let value = flag(track);
        *value = !*value;
        self.commit(label);
        true
    }

    pub fn toggle_mute(&mut self, id: &TrackId) -> bool {
        self.toggle_track_flag(id, "Toggle mute", |t| &mut t.muted)
    }

    pub fn toggle_lock(&mut self, id: &TrackId) -> bool {
        self.toggle_track_flag(id, "Toggle lock", |t| &mut t.locked)
    }

    pub fn toggle_visibility(&mut self, id: &TrackId) -> bool {
        self.toggle_track_flag(id, "Toggle visibility", |t| &mut t.visible)
    }

    // ── Element placement ───────────────────────────────────────

    /// Add an element built from `draft` over the type defaults. The new
    /// element becomes the sole selection.
    pub fn add_element(&mut self, track_id: &TrackId, draft: ElementDraft) -> Option<ElementId> {
        let Some(index) = self.composition.track_index(track_id) else {
            debug!(track = %track_id, "Add ignored: unknown track");
            return None;
        };
        if self.composition.tracks[index].locked {
            debug!(track = %track_id, "Add ignored: track is locked");
            return None;
        }
        let element = draft.build(
            self.composition.width,
            self.composition.height,
            self.config().default_element_duration,
        );
        if let Err(e) = element.validate() {
            debug!(error = %e, "Add ignored: invalid element");
            return None;
        }

        let id = element.id.clone();
        self.composition.tracks[index].push_element(element);
        self.selection.select_only(id.clone(), track_id.clone());
        self.commit("Add element");
        Some(id)
    }

    /// Delete one element.
    pub fn remove_element(&mut self, id: &ElementId) -> bool {
        let Some(loc) = self.editable(id) else {
            return false;
        };
        self.composition.tracks[loc.track].elements.remove(loc.index);
        self.selection.retain(|e| e != id);
        self.commit("Remove element");
        true
    }

    /// Delete several elements. Elements on locked tracks are skipped.
    /// Returns how many were removed.
    pub fn remove_elements(&mut self, ids: &[ElementId]) -> usize {
        let wanted: HashSet<&ElementId> = ids.iter().collect();
        let mut removed: HashSet<ElementId> = HashSet::new();
        for track in self.composition.tracks.iter_mut().filter(|t| !t.locked) {
            track.elements.retain(|e| {
                if wanted.contains(&e.id) {
                    removed.insert(e.id.clone());
                    false
                } else {
                    true
                }
            });
        }
        if removed.is_empty() {
            return 0;
        }
        self.selection.retain(|e| !removed.contains(e));
        self.commit("Remove elements");
        removed.len()
    }

    /// Copy an element and place the copy right after it on the timeline.
    pub fn duplicate_element(&mut self, id: &ElementId) -> Option<ElementId> {
        let loc = self.editable(id)?;
        let copy = self.element_at(loc).duplicate();
        let copy_id = copy.id.clone();

        let track = &mut self.composition.tracks[loc.track];
        track.insert_element(loc.index + 1, copy);
        let track_id = track.id.clone();

        self.selection.select_only(copy_id.clone(), track_id);
        self.commit("Duplicate element");
        Some(copy_id)
    }

    // ── Split ───────────────────────────────────────────────────

    /// Split the sole selected element at the playhead. The right-hand piece
    /// becomes the selection. Returns its id.
    pub fn split_element_at_playhead(&mut self) -> Option<ElementId> {
        let Some(id) = self.selection.sole().cloned() else {
            debug!("Split ignored: exactly one element must be selected");
            return None;
        };
        let playhead = self.playhead();
        self.split_element(&id, playhead)
    }

    /// Split an element at an absolute timeline position strictly inside it.
    pub fn split_element(&mut self, id: &ElementId, at: RationalTime) -> Option<ElementId> {
        let loc = self.editable(id)?;
        let Some((left, right)) = self.element_at(loc).split_at(at, ElementId::generate()) else {
            debug!(element = %id, at = %at, "Split ignored: position not inside element");
            return None;
        };

        let right_id = right.id.clone();
        let track = &mut self.composition.tracks[loc.track];
        track.elements[loc.index] = left;
        track.insert_element(loc.index + 1, right);
        let track_id = track.id.clone();

        self.selection.select_only(right_id.clone(), track_id);
        self.commit("Split element");
        Some(right_id)
    }

    // ── Trim ────────────────────────────────────────────────────

    /// Drag one edge of an element to a timeline position.
    pub fn trim_element(&mut self, id: &ElementId, side: TrimSide, edge: RationalTime) -> bool {
        let Some(loc) = self.editable(id) else {
            return false;
        };
        let floor = self.config().min_element_duration;
        let current = self.element_at(loc);
        let trimmed = match side {
            TrimSide::Start => current.trimmed_start(edge, floor),
            TrimSide::End => current.trimmed_end(edge, floor),
        };
        let Some(trimmed) = trimmed else {
            debug!(element = %id, ?side, edge = %edge, "Trim rejected: below minimum duration");
            return false;
        };
        if &trimmed == current || trimmed.validate().is_err() {
            return false;
        }
        self.replace_element(loc, trimmed);
        self.commit("Trim element");
        true
    }

    // ── Move ────────────────────────────────────────────────────

    /// Place an element at a new timeline start (clamped at zero). The source
    /// range is untouched.
    pub fn move_element(&mut self, id: &ElementId, time: RationalTime) -> bool {
        let Some(loc) = self.editable(id) else {
            return false;
        };
        let time = time.non_negative();
        if self.element_at(loc).time == time {
            return false;
        }
        self.composition.tracks[loc.track].elements[loc.index].time = time;
        self.commit("Move element");
        true
    }

    /// Shift several elements by the same delta, each clamped at zero
    /// independently. Overlaps are allowed. Returns how many moved.
    pub fn move_elements(&mut self, ids: &[ElementId], delta: RationalTime) -> usize {
        let mut moved = 0;
        for id in ids {
            let Some(loc) = self.composition.locate(id) else {
                continue;
            };
            let track = &mut self.composition.tracks[loc.track];
            if track.locked {
                continue;
            }
            let element = &mut track.elements[loc.index];
            let time = (element.time + delta).non_negative();
            if time != element.time {
                element.time = time;
                moved += 1;
            }
        }
        if moved > 0 {
            self.commit("Move elements");
        }
        moved
    }

    /// Move an element, unchanged, to the end of another track's list. The
    /// target becomes the active track.
    pub fn move_element_to_track(&mut self, id: &ElementId, target: &TrackId) -> bool {
        let Some(loc) = self.editable(id) else {
            return false;
        };
        let Some(target_index) = self.composition.track_index(target) else {
            return false;
        };
        if target_index == loc.track || self.composition.tracks[target_index].locked {
            return false;
        }
        let element = self.composition.tracks[loc.track].elements.remove(loc.index);
        self.composition.tracks[target_index].push_element(element);
        self.selection.set_active_track(Some(target.clone()));
        self.commit("Move element to track");
        true
    }

    // ── Properties ──────────────────────────────────────────────

    /// Apply a property patch. Rejected if it does not fit the element kind
    /// or the result breaks an invariant.
    pub fn update_element(&mut self, id: &ElementId, patch: ElementPatch) -> bool {
        let Some(loc) = self.editable(id) else {
            return false;
        };
        let current = self.element_at(loc);
        let mut updated = current.clone();
        if !patch.apply_to(&mut updated) {
            debug!(element = %id, "Update ignored: patch does not fit element kind");
            return false;
        }
        if updated == *current {
            return false;
        }
        if updated.duration < self.config().min_element_duration {
            return false;
        }
        if let Err(e) = updated.validate() {
            debug!(error = %e, "Update ignored");
            return false;
        }
        self.replace_element(loc, updated);
        self.commit("Update element");
        true
    }

    /// Change the canvas dimensions.
    pub fn set_canvas_size(&mut self, width: u32, height: u32) -> bool {
        if width == 0 || height == 0 {
            return false;
        }
        if self.composition.width == width && self.composition.height == height {
            return false;
        }
        self.composition.width = width;
        self.composition.height = height;
        self.commit("Resize canvas");
        true
    }

    /// Fill template slots. Returns how many elements changed.
    pub fn apply_modifications(&mut self, mods: &HashMap<String, Modification>) -> usize {
        let (resolved, changed) = modifications::apply_modifications(&self.composition, mods, self.config());
        if changed > 0 {
            self.composition = resolved;
            self.commit("Apply modifications");
        }
        changed
    }
}
