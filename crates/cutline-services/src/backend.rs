//! The project backend boundary.
//!
//! Everything the editor needs from the outside world: project metadata and
//! persisted compositions, media uploads, render exports, and precomputed
//! visual aids. Implementations own the transport.

use cutline_core::RationalTime;
use cutline_timeline::{CompositionFile, Edl, ProjectMetadata};
use serde::{Deserialize, Serialize};

use crate::error::ServiceResult;

/// What a project load returns.
#[derive(Debug, Clone)]
pub struct ProjectPayload {
    pub metadata: ProjectMetadata,
    /// Persisted composition JSON exactly as stored, possibly corrupt.
    pub composition: Option<Vec<u8>>,
}

/// An uploaded media file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaRef {
    pub id: String,
    /// Reference to put in an element's `source`
    pub source: String,
    #[serde(default)]
    pub duration: Option<RationalTime>,
}

/// Handle for a submitted render job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportTicket {
    pub job_id: String,
}

/// A filmstrip frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thumbnail {
    pub time: RationalTime,
    pub url: String,
}

/// Remote project store and render service.
#[async_trait::async_trait]
pub trait ProjectBackend: Send + Sync {
    /// Fetch metadata and the persisted composition, if any.
    async fn load_project(&self, project_id: &str) -> ServiceResult<ProjectPayload>;

    /// Persist a composition document.
    async fn save_composition(&self, project_id: &str, file: &CompositionFile) -> ServiceResult<()>;

    /// Store a media file and return a reference usable as an element source.
    async fn upload_media(
        &self,
        project_id: &str,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> ServiceResult<MediaRef>;

    /// Submit an EDL for rendering.
    async fn export_timeline(&self, project_id: &str, edl: &Edl) -> ServiceResult<ExportTicket>;

    /// Audio peak envelope for the project's main media.
    async fn fetch_waveform(&self, project_id: &str) -> ServiceResult<Vec<f32>>;

    /// Filmstrip frames for the project's main media.
    async fn fetch_thumbnails(&self, project_id: &str) -> ServiceResult<Vec<Thumbnail>>;
}
