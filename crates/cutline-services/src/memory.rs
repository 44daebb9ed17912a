//! In-process backend.
//!
//! Holds projects in memory and records what it was asked to do. Latency and
//! save failures can be injected to exercise the session's failure paths.

use cutline_core::CutlineError;
use cutline_timeline::{CompositionFile, Edl, ProjectMetadata};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

use crate::backend::{ExportTicket, MediaRef, ProjectBackend, ProjectPayload, Thumbnail};
use crate::error::{ServiceError, ServiceResult};

#[derive(Debug, Default)]
struct StoredProject {
    metadata: ProjectMetadata,
    composition: Option<Vec<u8>>,
    waveform: Option<Vec<f32>>,
    thumbnails: Vec<Thumbnail>,
    uploads: Vec<(String, usize)>,
    exports: Vec<Edl>,
}

#[derive(Debug, Default)]
pub struct MemoryBackend {
    projects: Mutex<HashMap<String, StoredProject>>,
    latency: Mutex<Option<Duration>>,
    fail_saves: AtomicBool,
    saves: AtomicUsize,
    waveform_fetches: AtomicUsize,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a project, optionally with a stored composition document.
    pub fn insert_project(&self, metadata: ProjectMetadata, composition: Option<Vec<u8>>) {
        let id = metadata.id.clone();
        self.projects.lock().insert(
            id,
            StoredProject {
                metadata,
                composition,
                ..Default::default()
            },
        );
    }

    pub fn set_waveform(&self, project_id: &str, peaks: Vec<f32>) {
        if let Some(project) = self.projects.lock().get_mut(project_id) {
            project.waveform = Some(peaks);
        }
    }

    pub fn set_thumbnails(&self, project_id: &str, thumbnails: Vec<Thumbnail>) {
        if let Some(project) = self.projects.lock().get_mut(project_id) {
            project.thumbnails = thumbnails;
        }
    }

    /// Delay every request by `latency`.
    pub fn set_latency(&self, latency: Duration) {
        *self.latency.lock() = Some(latency);
    }

    /// Make subsequent saves fail.
    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::Release);
    }

    /// The last composition document saved for a project.
    pub fn stored_composition(&self, project_id: &str) -> Option<Vec<u8>> {
        self.projects
            .lock()
            .get(project_id)
            .and_then(|p| p.composition.clone())
    }

    pub fn exports(&self, project_id: &str) -> Vec<Edl> {
        self.projects
            .lock()
            .get(project_id)
            .map(|p| p.exports.clone())
            .unwrap_or_default()
    }

    pub fn upload_count(&self, project_id: &str) -> usize {
        self.projects
            .lock()
            .get(project_id)
            .map_or(0, |p| p.uploads.len())
    }

    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::Acquire)
    }

    pub fn waveform_fetches(&self) -> usize {
        self.waveform_fetches.load(Ordering::Acquire)
    }

    async fn simulate_latency(&self) {
        let latency = *self.latency.lock();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
    }

    fn with_project<T>(
        &self,
        operation: &'static str,
        project_id: &str,
        f: impl FnOnce(&mut StoredProject) -> ServiceResult<T>,
    ) -> ServiceResult<T> {
        let mut projects = self.projects.lock();
        let project = projects.get_mut(project_id).ok_or_else(|| {
            ServiceError::request(operation, format!("unknown project {project_id}"))
        })?;
        f(project)
    }
}

#[async_trait::async_trait]
impl ProjectBackend for MemoryBackend {
    async fn load_project(&self, project_id: &str) -> ServiceResult<ProjectPayload> {
        self.simulate_latency().await;
        self.with_project("load_project", project_id, |p| {
            Ok(ProjectPayload {
                metadata: p.metadata.clone(),
                composition: p.composition.clone(),
            })
        })
    }

    async fn save_composition(&self, project_id: &str, file: &CompositionFile) -> ServiceResult<()> {
        self.simulate_latency().await;
        if self.fail_saves.load(Ordering::Acquire) {
            return Err(ServiceError::request("save_composition", "backend unavailable"));
        }
        let data = file.to_json()?;
        self.with_project("save_composition", project_id, |p| {
            p.composition = Some(data);
            Ok(())
        })?;
        self.saves.fetch_add(1, Ordering::AcqRel);
        debug!(project = project_id, "Composition stored");
        Ok(())
    }

    async fn upload_media(
        &self,
        project_id: &str,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> ServiceResult<MediaRef> {
        self.simulate_latency().await;
        if bytes.is_empty() {
            return Err(CutlineError::InvalidParameter(format!("{file_name} is empty")).into());
        }
        self.with_project("upload_media", project_id, |p| {
            let id = Uuid::new_v4().simple().to_string();
            p.uploads.push((file_name.to_string(), bytes.len()));
            Ok(MediaRef {
                source: format!("media://uploads/{project_id}/{id}/{file_name}"),
                id,
                duration: None,
            })
        })
    }

    async fn export_timeline(&self, project_id: &str, edl: &Edl) -> ServiceResult<ExportTicket> {
        self.simulate_latency().await;
        self.with_project("export_timeline", project_id, |p| {
            p.exports.push(edl.clone());
            Ok(ExportTicket {
                job_id: format!("render_{}", p.exports.len()),
            })
        })
    }

    async fn fetch_waveform(&self, project_id: &str) -> ServiceResult<Vec<f32>> {
        self.simulate_latency().await;
        self.waveform_fetches.fetch_add(1, Ordering::AcqRel);
        self.with_project("fetch_waveform", project_id, |p| {
            p.waveform
                .clone()
                .ok_or_else(|| ServiceError::request("fetch_waveform", "no audio peaks"))
        })
    }

    async fn fetch_thumbnails(&self, project_id: &str) -> ServiceResult<Vec<Thumbnail>> {
        self.simulate_latency().await;
        self.with_project("fetch_thumbnails", project_id, |p| Ok(p.thumbnails.clone()))
    }
}
