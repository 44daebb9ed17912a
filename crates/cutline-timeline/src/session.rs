//! The editing session: one composition plus its transient edit state.
//!
//! An `Editor` is an explicit value owned by the caller, so several can
//! coexist. The composition is only reachable read-only from outside; every
//! change goes through the operations in [`crate::edit`], which keep the
//! dirty flag and history in step.

use cutline_core::{EditorConfig, RationalTime};
use tracing::debug;
use uuid::Uuid;

use crate::composition::Composition;
use crate::element::{Element, ElementId};
use crate::history::{History, Snapshot};
use crate::selection::Selection;
use crate::serialization::CompositionFile;
use crate::track::{Track, TrackId};

/// Continuous interaction (drag, trim) collapsed into one history entry.
#[derive(Debug)]
struct Gesture {
    label: String,
    changed: bool,
}

/// Identifies one state of one editor. Revisions restart in every
/// editor, so the editor's own id is part of the token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveToken {
    editor: Uuid,
    pub revision: u64,
}

/// What to persist, tagged with the state it was taken at.
#[derive(Debug)]
pub struct SavePoint {
    pub token: SaveToken,
    pub file: CompositionFile,
}

/// An editing session.
#[derive(Debug)]
pub struct Editor {
    id: Uuid,
    config: EditorConfig,
    pub(crate) composition: Composition,
    pub(crate) selection: Selection,
    history: History,
    playhead: RationalTime,
    zoom: f64,
    dirty: bool,
    revision: u64,
    gesture: Option<Gesture>,
}

impl Editor {
    /// Start a session on an empty canvas with default settings.
    pub fn new(width: u32, height: u32) -> Self {
        Self::with_config(EditorConfig::default(), Composition::new(width, height))
    }

    /// Start a session on an existing composition.
    pub fn from_composition(composition: Composition) -> Self {
        Self::with_config(EditorConfig::default(), composition)
    }

    pub fn with_config(config: EditorConfig, composition: Composition) -> Self {
        let selection = Selection::new();
        let history = History::new(
            config.history_capacity,
            Snapshot {
                composition: composition.clone(),
                selection: selection.clone(),
            },
        );
        Self {
            id: Uuid::new_v4(),
            zoom: config.default_zoom,
            config,
            composition,
            selection,
            history,
            playhead: RationalTime::ZERO,
            dirty: false,
            revision: 0,
            gesture: None,
        }
    }

    /// Replace the composition wholesale (project load). Selection, history,
    /// playhead and zoom start fresh and the session is clean.
    pub fn load(&mut self, composition: Composition) {
        self.composition = composition;
        self.selection.clear();
        self.gesture = None;
        let snapshot = self.snapshot();
        self.history.reset(snapshot);
        self.playhead = RationalTime::ZERO;
        self.zoom = self.config.default_zoom;
        self.dirty = false;
        self.revision += 1;
        debug!(tracks = self.composition.tracks.len(), "Composition loaded");
    }

    /// Return to an empty canvas of the configured default size.
    pub fn reset(&mut self) {
        let empty = Composition::new(self.config.default_width, self.config.default_height);
        self.load(empty);
    }

    // ── Commit plumbing ─────────────────────────────────────────

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            composition: self.composition.clone(),
            selection: self.selection.clone(),
        }
    }

    /// Record a committed mutation: mark dirty and push a snapshot (or fold
    /// it into the running gesture).
    pub(crate) fn commit(&mut self, label: &str) {
        self.dirty = true;
        self.revision += 1;
        if let Some(gesture) = self.gesture.as_mut() {
            gesture.changed = true;
            return;
        }
        let snapshot = self.snapshot();
        self.history.push(label, snapshot);
    }

    fn restore(&mut self, snapshot: Snapshot) {
        self.composition = snapshot.composition;
        self.selection = snapshot.selection;
        self.dirty = true;
        self.revision += 1;
    }

    /// Begin a continuous interaction. Edits until [`Editor::end_gesture`]
    /// produce a single history entry. Returns false if one is already open.
    pub fn begin_gesture(&mut self, label: &str) -> bool {
        if self.gesture.is_some() {
            debug!(label, "Gesture already open, ignoring");
            return false;
        }
        self.gesture = Some(Gesture {
            label: label.to_string(),
            changed: false,
        });
        true
    }

    /// Close the open gesture. Returns true if it produced a history entry.
    pub fn end_gesture(&mut self) -> bool {
        let Some(gesture) = self.gesture.take() else {
            return false;
        };
        if !gesture.changed {
            debug!(label = %gesture.label, "Gesture ended without changes");
            return false;
        }
        let snapshot = self.snapshot();
        self.history.push(&gesture.label, snapshot);
        true
    }

    pub fn in_gesture(&self) -> bool {
        self.gesture.is_some()
    }

    // ── Undo / redo ─────────────────────────────────────────────

    /// Restore the previous snapshot. An open gesture is closed first.
    pub fn undo(&mut self) -> bool {
        self.end_gesture();
        let Some(snapshot) = self.history.undo().cloned() else {
            debug!("Nothing to undo");
            return false;
        };
        self.restore(snapshot);
        true
    }

    /// Re-apply the next snapshot.
    pub fn redo(&mut self) -> bool {
        self.end_gesture();
        let Some(snapshot) = self.history.redo().cloned() else {
            debug!("Nothing to redo");
            return false;
        };
        self.restore(snapshot);
        true
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn undo_label(&self) -> Option<&str> {
        self.history.undo_label()
    }

    pub fn redo_label(&self) -> Option<&str> {
        self.history.redo_label()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    // ── Persistence handshake ───────────────────────────────────

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Monotonic counter bumped by every state change.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Capture the composition for persisting.
    pub fn save_point(&self) -> SavePoint {
        SavePoint {
            token: SaveToken {
                editor: self.id,
                revision: self.revision,
            },
            file: CompositionFile::new(self.composition.clone()),
        }
    }

    /// Whether `token` was issued by this editor.
    pub fn issued(&self, token: SaveToken) -> bool {
        token.editor == self.id
    }

    /// Acknowledge a successful persist. The dirty flag clears only if the
    /// token came from this editor and nothing changed since it was taken.
    pub fn mark_saved(&mut self, token: SaveToken) -> bool {
        if !self.issued(token) {
            debug!(saved = token.revision, "Save point from another editor, ignoring");
            return false;
        }
        if token.revision != self.revision {
            debug!(saved = token.revision, current = self.revision, "Edits since save, staying dirty");
            return false;
        }
        self.dirty = false;
        true
    }

    // ── Read-only views ─────────────────────────────────────────

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn composition(&self) -> &Composition {
        &self.composition
    }

    pub fn tracks(&self) -> &[Track] {
        &self.composition.tracks
    }

    pub fn track(&self, id: &TrackId) -> Option<&Track> {
        self.composition.track(id)
    }

    pub fn element(&self, id: &ElementId) -> Option<&Element> {
        self.composition.element(id)
    }

    pub fn all_elements(&self) -> impl Iterator<Item = (&TrackId, &Element)> {
        self.composition.all_elements()
    }

    /// A track's elements ordered by timeline start.
    pub fn sorted_elements(&self, track_id: &TrackId) -> Vec<&Element> {
        self.composition
            .track(track_id)
            .map(Track::sorted_elements)
            .unwrap_or_default()
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// The primary (first) selected element.
    pub fn selected_element(&self) -> Option<&Element> {
        self.selection
            .primary()
            .and_then(|id| self.composition.element(id))
    }

    /// Selected elements in track order.
    pub fn selected_elements(&self) -> Vec<&Element> {
        self.composition
            .all_elements()
            .filter(|(_, e)| self.selection.contains(&e.id))
            .map(|(_, e)| e)
            .collect()
    }

    /// The explicitly active track, else the track of the primary element.
    pub fn selected_track(&self) -> Option<&Track> {
        if let Some(id) = self.selection.active_track() {
            return self.composition.track(id);
        }
        self.selection
            .primary()
            .and_then(|id| self.composition.track_of(id))
    }

    /// Elements under the playhead, in track order.
    pub fn elements_at_playhead(&self) -> Vec<&Element> {
        self.composition
            .tracks
            .iter()
            .flat_map(|t| t.elements_at(self.playhead))
            .collect()
    }

    /// Max element end, floored so an empty timeline still has a ruler.
    pub fn timeline_duration(&self) -> RationalTime {
        self.composition
            .content_duration()
            .max(self.config.min_timeline_duration)
    }

    /// Laid-out timeline width in pixels at the current zoom.
    pub fn timeline_width(&self) -> f64 {
        self.timeline_duration().scale_f64(self.zoom) + self.config.timeline_padding_px
    }

    pub fn playhead(&self) -> RationalTime {
        self.playhead
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    // ── Playhead & zoom (not history-tracked) ───────────────────

    /// Move the playhead, clamped at zero.
    pub fn seek_to(&mut self, time: RationalTime) {
        self.playhead = time.non_negative();
    }

    /// Set zoom in pixels per second, clamped to the configured range.
    pub fn set_zoom(&mut self, px_per_sec: f64) {
        self.zoom = self.config.clamp_zoom(px_per_sec);
    }

    // ── Selection (not history-tracked) ─────────────────────────

    /// Select exactly one element and make its track active.
    pub fn select_element(&mut self, id: &ElementId) -> bool {
        let Some(track) = self.composition.track_of(id) else {
            debug!(element = %id, "Select ignored: unknown element");
            return false;
        };
        let track_id = track.id.clone();
        self.selection.select_only(id.clone(), track_id);
        true
    }

    /// Add or remove one element from the selection.
    pub fn toggle_element_selection(&mut self, id: &ElementId) -> bool {
        let Some(track) = self.composition.track_of(id) else {
            return false;
        };
        let track_id = track.id.clone();
        if self.selection.toggle(id) {
            self.selection.set_active_track(Some(track_id));
        }
        true
    }

    /// Select every element on every track.
    pub fn select_all_elements(&mut self) {
        let ids: Vec<ElementId> = self
            .composition
            .all_elements()
            .map(|(_, e)| e.id.clone())
            .collect();
        self.selection.set_elements(ids);
    }

    /// Make a track active with no elements selected.
    pub fn select_track(&mut self, id: &TrackId) -> bool {
        if self.composition.track(id).is_none() {
            return false;
        }
        self.selection.select_track(id.clone());
        true
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }
}
