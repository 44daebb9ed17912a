//! Element and track selection state.
//!
//! Transient: never persisted, reset on project load.

use smallvec::SmallVec;

use crate::element::ElementId;
use crate::track::TrackId;

/// Current multi-selection plus the active track.
///
/// Element ids keep selection order; the first one is the primary selection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    element_ids: SmallVec<[ElementId; 4]>,
    track_id: Option<TrackId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the selection with a single element on `track`.
    pub fn select_only(&mut self, id: ElementId, track: TrackId) {
        self.element_ids.clear();
        self.element_ids.push(id);
        self.track_id = Some(track);
    }

    /// Add or remove one id. Returns true when the id is selected afterwards.
    pub fn toggle(&mut self, id: &ElementId) -> bool {
        if let Some(pos) = self.element_ids.iter().position(|e| e == id) {
            self.element_ids.remove(pos);
            false
        } else {
            self.element_ids.push(id.clone());
            true
        }
    }

    /// Replace the element set, keeping the active track.
    pub fn set_elements(&mut self, ids: impl IntoIterator<Item = ElementId>) {
        self.element_ids.clear();
        for id in ids {
            if !self.element_ids.contains(&id) {
                self.element_ids.push(id);
            }
        }
    }

    /// Make `track` active with no elements selected.
    pub fn select_track(&mut self, track: TrackId) {
        self.element_ids.clear();
        self.track_id = Some(track);
    }

    pub fn set_active_track(&mut self, track: Option<TrackId>) {
        self.track_id = track;
    }

    pub fn clear(&mut self) {
        self.element_ids.clear();
        self.track_id = None;
    }

    /// Drop ids that no longer satisfy `keep`.
    pub fn retain(&mut self, mut keep: impl FnMut(&ElementId) -> bool) {
        self.element_ids.retain(|id| keep(id));
    }

    pub fn contains(&self, id: &ElementId) -> bool {
        self.element_ids.contains(id)
    }

    pub fn element_ids(&self) -> &[ElementId] {
        &self.element_ids
    }

    /// First selected element.
    pub fn primary(&self) -> Option<&ElementId> {
        self.element_ids.first()
    }

    /// The selected element when exactly one is selected.
    pub fn sole(&self) -> Option<&ElementId> {
        match self.element_ids.as_slice() {
            [only] => Some(only),
            _ => None,
        }
    }

    pub fn active_track(&self) -> Option<&TrackId> {
        self.track_id.as_ref()
    }

    pub fn len(&self) -> usize {
        self.element_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.element_ids.is_empty() && self.track_id.is_none()
    }
}
