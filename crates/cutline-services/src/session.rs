//! An editing session bound to a backend.
//!
//! Edits stay synchronous and local. The session adds loading with
//! fallback, the save handshake, export and cached visual aids. A failed
//! persist never rolls local state back: the session stays dirty and the
//! caller may retry.

use cutline_core::EditorConfig;
use cutline_timeline::{
    Composition, CompositionOrigin, Edl, Editor, ProjectMetadata, SavePoint, SaveToken,
};
use std::sync::Arc;
use tracing::{info, warn};

use crate::backend::{ExportTicket, MediaRef, ProjectBackend, Thumbnail};
use crate::cache::AuxCache;
use crate::error::{ServiceError, ServiceResult};

#[derive(Debug)]
struct OpenProject {
    id: String,
    metadata: ProjectMetadata,
    origin: CompositionOrigin,
    editor: Editor,
}

/// One open project at a time, backed by `B`.
pub struct ProjectSession<B: ProjectBackend> {
    backend: Arc<B>,
    config: EditorConfig,
    cache: AuxCache,
    project: Option<OpenProject>,
}

impl<B: ProjectBackend> ProjectSession<B> {
    pub fn new(backend: Arc<B>, config: EditorConfig) -> Self {
        Self {
            backend,
            config,
            cache: AuxCache::new(),
            project: None,
        }
    }

    /// Load a project. A missing or corrupt persisted composition is
    /// replaced by one synthesized from the metadata.
    pub async fn open(&mut self, project_id: &str) -> ServiceResult<CompositionOrigin> {
        let payload = self.backend.load_project(project_id).await?;
        let (composition, origin) = Composition::load_or_synthesize(
            payload.composition.as_deref(),
            &payload.metadata,
            &self.config,
        );

        self.cache.activate(project_id);
        info!(project = project_id, ?origin, tracks = composition.tracks.len(), "Project opened");
        self.project = Some(OpenProject {
            id: project_id.to_string(),
            metadata: payload.metadata,
            origin,
            editor: Editor::with_config(self.config.clone(), composition),
        });
        Ok(origin)
    }

    /// Drop the open project. Unsaved edits are lost.
    pub fn close(&mut self) {
        if let Some(project) = self.project.take() {
            if project.editor.is_dirty() {
                warn!(project = %project.id, "Closing project with unsaved edits");
            }
        }
        self.cache.clear();
    }

    fn open_project(&self) -> ServiceResult<&OpenProject> {
        self.project.as_ref().ok_or(ServiceError::NoProject)
    }

    pub fn project_id(&self) -> Option<&str> {
        self.project.as_ref().map(|p| p.id.as_str())
    }

    pub fn metadata(&self) -> Option<&ProjectMetadata> {
        self.project.as_ref().map(|p| &p.metadata)
    }

    pub fn origin(&self) -> Option<CompositionOrigin> {
        self.project.as_ref().map(|p| p.origin)
    }

    pub fn editor(&self) -> Option<&Editor> {
        self.project.as_ref().map(|p| &p.editor)
    }

    pub fn editor_mut(&mut self) -> Option<&mut Editor> {
        self.project.as_mut().map(|p| &mut p.editor)
    }

    pub fn cache(&self) -> &AuxCache {
        &self.cache
    }

    // ── Save handshake ──────────────────────────────────────────

    /// First half of a save: what to persist, or `None` when clean.
    pub fn pending_save(&self) -> ServiceResult<Option<SavePoint>> {
        let project = self.open_project()?;
        Ok(project
            .editor
            .is_dirty()
            .then(|| project.editor.save_point()))
    }

    /// Second half of a save. Success clears the dirty flag only if nothing
    /// changed since the save point; failure leaves the session untouched.
    /// A save point taken before another project was opened is stale.
    pub fn complete_save(&mut self, token: SaveToken, result: ServiceResult<()>) -> ServiceResult<bool> {
        let project = self.project.as_mut().ok_or(ServiceError::NoProject)?;
        if !project.editor.issued(token) {
            warn!(project = %project.id, revision = token.revision, "Save completed for a closed project");
            return Err(ServiceError::Stale {
                project_id: project.id.clone(),
            });
        }
        let revision = token.revision;
        match result {
            Ok(()) => {
                let clean = project.editor.mark_saved(token);
                info!(project = %project.id, revision, clean, "Composition saved");
                Ok(clean)
            }
            Err(e) => {
                warn!(project = %project.id, revision, error = %e, "Save failed, keeping local edits");
                Err(e)
            }
        }
    }

    /// Persist the composition if dirty. Returns whether the session is
    /// clean afterwards.
    pub async fn save(&mut self) -> ServiceResult<bool> {
        let Some(point) = self.pending_save()? else {
            return Ok(true);
        };
        let project_id = self.open_project()?.id.clone();
        let result = self
            .backend
            .save_composition(&project_id, &point.file)
            .await;
        self.complete_save(point.token, result)
    }

    // ── Outbound requests ───────────────────────────────────────

    /// Build the EDL and submit it for rendering.
    pub async fn export(&self) -> ServiceResult<ExportTicket> {
        let project = self.open_project()?;
        let edl = Edl::build(project.editor.composition());
        let ticket = self.backend.export_timeline(&project.id, &edl).await?;
        info!(project = %project.id, job = %ticket.job_id, clips = edl.clip_count(), "Export submitted");
        Ok(ticket)
    }

    pub async fn upload(&self, file_name: &str, bytes: Vec<u8>) -> ServiceResult<MediaRef> {
        let project = self.open_project()?;
        let media = self
            .backend
            .upload_media(&project.id, file_name, bytes)
            .await?;
        info!(project = %project.id, media = %media.id, "Media uploaded");
        Ok(media)
    }

    pub async fn waveform(&self) -> ServiceResult<Arc<Vec<f32>>> {
        let project = self.open_project()?;
        self.cache.waveform(self.backend.as_ref(), &project.id).await
    }

    pub async fn thumbnails(&self) -> ServiceResult<Arc<Vec<Thumbnail>>> {
        let project = self.open_project()?;
        self.cache.thumbnails(self.backend.as_ref(), &project.id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryBackend;
    use cutline_core::RationalTime;
    use cutline_timeline::{CompositionFile, ElementDraft, ElementKind, TrackKind};

    fn metadata(id: &str) -> ProjectMetadata {
        ProjectMetadata {
            id: id.into(),
            name: "Demo".into(),
            duration: RationalTime::from_secs(20),
            source: Some("media://video-projects/1/demo.mp4".into()),
            ..Default::default()
        }
    }

    fn session_with(stored: Option<Vec<u8>>) -> (Arc<MemoryBackend>, ProjectSession<MemoryBackend>) {
        let backend = Arc::new(MemoryBackend::new());
        backend.insert_project(metadata("p1"), stored);
        let session = ProjectSession::new(Arc::clone(&backend), EditorConfig::default());
        (backend, session)
    }

    fn add_title(session: &mut ProjectSession<MemoryBackend>) {
        let editor = session.editor_mut().unwrap();
        let track = editor.add_track(TrackKind::Overlay, Some("Titles"));
        editor
            .add_element(&track, ElementDraft::new(ElementKind::Text { text: "Hi".into() }))
            .unwrap();
    }

    #[tokio::test]
    async fn test_open_synthesizes_when_nothing_stored() {
        let (_, mut session) = session_with(None);
        let origin = session.open("p1").await.unwrap();
        assert_eq!(origin, CompositionOrigin::Synthesized);
        assert_eq!(session.project_id(), Some("p1"));
        assert_eq!(session.origin(), Some(CompositionOrigin::Synthesized));
        assert_eq!(session.metadata().unwrap().name, "Demo");
        let editor = session.editor().unwrap();
        assert_eq!(editor.tracks()[0].name, "Main Video");
        assert!(!editor.is_dirty());
    }

    #[tokio::test]
    async fn test_open_falls_back_on_corrupt_document() {
        let (_, mut session) = session_with(Some(b"{\"version\": 1, \"tracks\": 7}".to_vec()));
        assert_eq!(session.open("p1").await.unwrap(), CompositionOrigin::Synthesized);
        assert!(session.editor().unwrap().composition().element_count() > 0);
    }

    #[tokio::test]
    async fn test_open_uses_stored_document() {
        let stored = CompositionFile::new(Composition::new(720, 720)).to_json().unwrap();
        let (_, mut session) = session_with(Some(stored));
        assert_eq!(session.open("p1").await.unwrap(), CompositionOrigin::Persisted);
        assert_eq!(session.editor().unwrap().composition().width, 720);
    }

    #[tokio::test]
    async fn test_open_unknown_project_fails() {
        let (_, mut session) = session_with(None);
        assert!(matches!(
            session.open("nope").await,
            Err(ServiceError::Request { .. })
        ));
        assert!(matches!(session.save().await, Err(ServiceError::NoProject)));
    }

    #[tokio::test]
    async fn test_save_round_trip() {
        let (backend, mut session) = session_with(None);
        session.open("p1").await.unwrap();
        assert!(session.save().await.unwrap());
        assert_eq!(backend.save_count(), 0);

        add_title(&mut session);
        assert!(session.save().await.unwrap());
        assert!(!session.editor().unwrap().is_dirty());
        assert_eq!(backend.save_count(), 1);

        let stored = backend.stored_composition("p1").unwrap();
        let loaded = CompositionFile::from_json(&stored).unwrap();
        assert_eq!(&loaded.composition, session.editor().unwrap().composition());
    }

    #[tokio::test]
    async fn test_failed_save_keeps_local_state() {
        let (backend, mut session) = session_with(None);
        session.open("p1").await.unwrap();
        add_title(&mut session);
        let before = session.editor().unwrap().composition().clone();

        backend.set_fail_saves(true);
        assert!(session.save().await.is_err());
        let editor = session.editor().unwrap();
        assert!(editor.is_dirty());
        assert_eq!(editor.composition(), &before);

        backend.set_fail_saves(false);
        assert!(session.save().await.unwrap());
    }

    #[tokio::test]
    async fn test_edit_during_save_stays_dirty() {
        let (_, mut session) = session_with(None);
        session.open("p1").await.unwrap();
        add_title(&mut session);

        let point = session.pending_save().unwrap().unwrap();
        add_title(&mut session);
        assert!(!session.complete_save(point.token, Ok(())).unwrap());
        assert!(session.editor().unwrap().is_dirty());
    }

    #[tokio::test]
    async fn test_save_finishing_after_project_switch_is_stale() {
        let (backend, mut session) = session_with(None);
        backend.insert_project(metadata("p2"), None);
        session.open("p1").await.unwrap();
        add_title(&mut session);
        let point = session.pending_save().unwrap().unwrap();

        session.open("p2").await.unwrap();
        add_title(&mut session);
        assert_eq!(
            session.editor().unwrap().revision(),
            point.token.revision
        );

        let result = session.complete_save(point.token, Ok(()));
        assert!(matches!(result, Err(ServiceError::Stale { ref project_id }) if project_id == "p2"));
        assert!(session.editor().unwrap().is_dirty());
        assert_eq!(backend.save_count(), 0);
    }

    #[tokio::test]
    async fn test_export_and_upload() {
        let (backend, mut session) = session_with(None);
        session.open("p1").await.unwrap();

        let ticket = session.export().await.unwrap();
        assert_eq!(ticket.job_id, "render_1");
        let exports = backend.exports("p1");
        assert_eq!(exports.len(), 1);
        assert_eq!(exports[0], Edl::build(session.editor().unwrap().composition()));

        let media = session.upload("logo.png", vec![1, 2, 3]).await.unwrap();
        assert!(media.source.ends_with("/logo.png"));
        assert!(session.upload("empty.png", Vec::new()).await.is_err());
        assert_eq!(backend.upload_count("p1"), 1);
    }

    #[tokio::test]
    async fn test_close_clears_cache() {
        let (backend, mut session) = session_with(None);
        backend.set_waveform("p1", vec![0.2; 8]);
        session.open("p1").await.unwrap();
        assert_eq!(session.waveform().await.unwrap().len(), 8);

        session.close();
        assert!(session.cache().cached_waveform("p1").is_none());
        assert!(matches!(session.waveform().await, Err(ServiceError::NoProject)));
    }
}
