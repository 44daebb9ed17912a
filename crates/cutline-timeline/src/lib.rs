//! Cutline Timeline - Composition model and edit engine
//!
//! Implements the editable timeline:
//! - Compositions containing tracks of placed elements
//! - An `Editor` session with selection, snapshot undo/redo and gestures
//! - Split, trim, move, duplicate and track operations
//! - EDL export for the render service
//! - Versioned persistence, synthesis from project metadata, template fills

pub mod composition;
pub mod edit;
pub mod edl;
pub mod element;
pub mod history;
pub mod modifications;
pub mod project;
pub mod selection;
pub mod serialization;
pub mod session;
pub mod track;

pub use composition::{Composition, Location};
pub use edit::{ElementDraft, ElementPatch, TrimSide};
pub use edl::{Edl, EdlClip, EdlTrack};
pub use element::{Effect, Element, ElementId, ElementKind, ElementType, Fit, Transition};
pub use history::{History, Snapshot};
pub use modifications::{apply_modifications, Modification};
pub use project::{CompositionOrigin, ProjectMetadata, TranscriptSegment};
pub use selection::Selection;
pub use serialization::{CompositionFile, CURRENT_VERSION};
pub use session::{Editor, SavePoint, SaveToken};
pub use track::{Track, TrackId, TrackKind};
