//! Integration tests for sessions against the in-memory backend.

use std::sync::Arc;
use std::time::Duration;

use cutline_core::{EditorConfig, RationalTime};
use cutline_services::{MemoryBackend, ProjectSession, ServiceError, Thumbnail};
use cutline_timeline::{
    CompositionFile, CompositionOrigin, Edl, ElementDraft, ElementKind, ProjectMetadata, TrackKind,
};

fn metadata(id: &str) -> ProjectMetadata {
    ProjectMetadata {
        id: id.into(),
        name: format!("Project {id}"),
        duration: RationalTime::from_secs(15),
        source: Some(format!("media://video-projects/1/{id}.mp4")),
        ..Default::default()
    }
}

fn backend() -> Arc<MemoryBackend> {
    let backend = Arc::new(MemoryBackend::new());
    for id in ["alpha", "beta"] {
        backend.insert_project(metadata(id), None);
        backend.set_waveform(id, vec![0.0, 0.25, 0.5]);
        backend.set_thumbnails(
            id,
            vec![Thumbnail {
                time: RationalTime::ZERO,
                url: format!("media://thumbs/{id}/0.jpg"),
            }],
        );
    }
    backend
}

#[tokio::test]
async fn edit_save_reopen_round_trip() {
    let backend = backend();
    let mut session = ProjectSession::new(Arc::clone(&backend), EditorConfig::default());
    assert_eq!(session.open("alpha").await.unwrap(), CompositionOrigin::Synthesized);

    let media = session.upload("logo.png", vec![0x89, 0x50]).await.unwrap();
    {
        let editor = session.editor_mut().unwrap();
        let overlay = editor.add_track(TrackKind::Overlay, Some("Branding"));
        editor
            .add_element(
                &overlay,
                ElementDraft::new(ElementKind::Image)
                    .source(media.source.clone())
                    .lasting(RationalTime::from_secs(3)),
            )
            .unwrap();
    }
    assert!(session.save().await.unwrap());
    let saved = session.editor().unwrap().composition().clone();

    let mut reopened = ProjectSession::new(Arc::clone(&backend), EditorConfig::default());
    assert_eq!(reopened.open("alpha").await.unwrap(), CompositionOrigin::Persisted);
    assert_eq!(reopened.editor().unwrap().composition(), &saved);
}

#[tokio::test]
async fn export_sends_the_current_edl() {
    let backend = backend();
    let mut session = ProjectSession::new(Arc::clone(&backend), EditorConfig::default());
    session.open("alpha").await.unwrap();

    {
        let editor = session.editor_mut().unwrap();
        let clip = editor.tracks()[0].elements[0].id.clone();
        editor.select_element(&clip);
        editor.seek_to(RationalTime::from_secs(5));
        editor.split_element_at_playhead().unwrap();
    }
    session.export().await.unwrap();

    let exports = backend.exports("alpha");
    assert_eq!(exports.len(), 1);
    assert_eq!(exports[0].tracks[0].clips.len(), 2);
    assert_eq!(
        exports[0],
        Edl::build(session.editor().unwrap().composition())
    );
}

#[tokio::test]
async fn switching_projects_never_leaks_aux_data() {
    let backend = backend();
    backend.set_latency(Duration::from_millis(50));
    let mut session = ProjectSession::new(Arc::clone(&backend), EditorConfig::default());
    session.open("alpha").await.unwrap();

    let cache = session.cache();
    let (stale, _) = tokio::join!(cache.waveform(backend.as_ref(), "alpha"), async {
        tokio::time::sleep(Duration::from_millis(5)).await;
        cache.activate("beta");
    });
    assert!(matches!(stale, Err(ServiceError::Stale { .. })));
    assert!(cache.cached_waveform("alpha").is_none());

    session.open("beta").await.unwrap();
    let thumbs = session.thumbnails().await.unwrap();
    assert!(thumbs[0].url.contains("/beta/"));
    assert_eq!(session.waveform().await.unwrap().len(), 3);
}

#[tokio::test]
async fn corrupt_persisted_document_recovers_and_resaves() {
    let backend = Arc::new(MemoryBackend::new());
    backend.insert_project(metadata("gamma"), Some(b"{\"version\":1,\"width\":0}".to_vec()));
    let mut session = ProjectSession::new(Arc::clone(&backend), EditorConfig::default());

    assert_eq!(session.open("gamma").await.unwrap(), CompositionOrigin::Synthesized);
    {
        let editor = session.editor_mut().unwrap();
        assert!(editor.composition().element_count() > 0);
        editor.set_canvas_size(1920, 1080);
    }
    assert!(session.save().await.unwrap());

    let stored = backend.stored_composition("gamma").unwrap();
    let file = CompositionFile::from_json(&stored).unwrap();
    assert_eq!(file.composition.width, 1920);
}
