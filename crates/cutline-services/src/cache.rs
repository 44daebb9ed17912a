//! Per-project cache for waveform peaks and thumbnails.
//!
//! Values are fetched once and shared. Concurrent requests for the same
//! value wait on one in-flight fetch. Switching projects bumps a generation
//! counter; a fetch that started under an older generation is discarded
//! when it completes instead of landing in the new project's cache.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex as FetchGate;
use tracing::debug;

use crate::backend::{ProjectBackend, Thumbnail};
use crate::error::{ServiceError, ServiceResult};

#[derive(Debug, Default)]
struct Entries {
    waveforms: HashMap<String, Arc<Vec<f32>>>,
    thumbnails: HashMap<String, Arc<Vec<Thumbnail>>>,
}

type GateKey = (&'static str, String);

/// Read-only visual aids, keyed by project id.
#[derive(Debug, Default)]
pub struct AuxCache {
    generation: AtomicU64,
    entries: Mutex<Entries>,
    gates: Mutex<HashMap<GateKey, Arc<FetchGate<()>>>>,
}

impl AuxCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `project_id` the active project. In-flight fetches for anything
    /// else become stale, and entries of other projects are dropped.
    pub fn activate(&self, project_id: &str) -> u64 {
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        let mut entries = self.entries.lock();
        entries.waveforms.retain(|k, _| k == project_id);
        entries.thumbnails.retain(|k, _| k == project_id);
        self.gates.lock().retain(|(_, k), _| k == project_id);
        debug!(project = project_id, generation, "Aux cache activated");
        generation
    }

    /// Forget everything and invalidate in-flight fetches.
    pub fn clear(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
        let mut entries = self.entries.lock();
        entries.waveforms.clear();
        entries.thumbnails.clear();
        self.gates.lock().clear();
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    pub fn cached_waveform(&self, project_id: &str) -> Option<Arc<Vec<f32>>> {
        self.entries.lock().waveforms.get(project_id).cloned()
    }

    pub fn cached_thumbnails(&self, project_id: &str) -> Option<Arc<Vec<Thumbnail>>> {
        self.entries.lock().thumbnails.get(project_id).cloned()
    }

    /// Waveform peaks, fetched on first use.
    pub async fn waveform<B>(&self, backend: &B, project_id: &str) -> ServiceResult<Arc<Vec<f32>>>
    where
        B: ProjectBackend + ?Sized,
    {
        self.get_or_fetch(
            "waveform",
            project_id,
            |e| &mut e.waveforms,
            || backend.fetch_waveform(project_id),
        )
        .await
    }

    /// Thumbnails, fetched on first use.
    pub async fn thumbnails<B>(
        &self,
        backend: &B,
        project_id: &str,
    ) -> ServiceResult<Arc<Vec<Thumbnail>>>
    where
        B: ProjectBackend + ?Sized,
    {
        self.get_or_fetch(
            "thumbnails",
            project_id,
            |e| &mut e.thumbnails,
            || backend.fetch_thumbnails(project_id),
        )
        .await
    }

    async fn get_or_fetch<T, F, Fut>(
        &self,
        kind: &'static str,
        project_id: &str,
        slot: fn(&mut Entries) -> &mut HashMap<String, Arc<T>>,
        fetch: F,
    ) -> ServiceResult<Arc<T>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = ServiceResult<T>>,
    {
        let hit = slot(&mut self.entries.lock()).get(project_id).cloned();
        if let Some(hit) = hit {
            return Ok(hit);
        }

        let gate = Arc::clone(
            self.gates
                .lock()
                .entry((kind, project_id.to_string()))
                .or_default(),
        );
        let _fetching = gate.lock().await;
        let hit = slot(&mut self.entries.lock()).get(project_id).cloned();
        if let Some(hit) = hit {
            debug!(project = project_id, kind, "Joined in-flight aux fetch");
            return Ok(hit);
        }

        let started = self.generation();
        let value = fetch().await?;

        if self.generation() != started {
            debug!(project = project_id, started, "Dropping stale aux response");
            return Err(ServiceError::Stale {
                project_id: project_id.to_string(),
            });
        }

        let value = Arc::new(value);
        slot(&mut self.entries.lock()).insert(project_id.to_string(), Arc::clone(&value));
        Ok(value)
    }
}
