//! Cutline Services - Async collaborators of the timeline engine
//!
//! The editor itself is synchronous; everything that talks to the outside
//! world lives here:
//! - `ProjectBackend`: load, save, upload, export and aux-data requests
//! - `AuxCache`: per-project waveform/thumbnail cache that drops stale responses
//! - `ProjectSession`: an `Editor` bound to a backend, with load fallback and
//!   the two-phase save handshake

pub mod backend;
pub mod cache;
pub mod error;
pub mod memory;
pub mod session;

pub use backend::{ExportTicket, MediaRef, ProjectBackend, ProjectPayload, Thumbnail};
pub use cache::AuxCache;
pub use error::{ServiceError, ServiceResult};
pub use memory::MemoryBackend;
pub use session::ProjectSession;
