//! Integration tests for the timeline subsystem.
//!
//! Exercises editing, history, EDL export and persistence together.

use cutline_core::{EditorConfig, RationalTime};
use cutline_timeline::{
    Composition, CompositionFile, Edl, Editor, ElementDraft, ElementId, ElementKind,
    ProjectMetadata, TrackId, TrackKind, TranscriptSegment, TrimSide,
};
use proptest::prelude::*;

// ── Helpers ────────────────────────────────────────────────────

fn secs(s: i64) -> RationalTime {
    RationalTime::from_secs(s)
}

fn metadata() -> ProjectMetadata {
    ProjectMetadata {
        id: "proj_1".into(),
        name: "Integration".into(),
        duration: secs(60),
        source: Some("media://video-projects/1/interview.mp4".into()),
        original_filename: Some("interview.mp4".into()),
        segments: vec![
            TranscriptSegment {
                start: secs(0),
                end: secs(4),
                text: "Welcome back".into(),
            },
            TranscriptSegment {
                start: secs(4),
                end: secs(9),
                text: "Today we cut video".into(),
            },
        ],
        ..Default::default()
    }
}

fn synthesized_editor() -> Editor {
    let comp = Composition::synthesize(&metadata(), &EditorConfig::default());
    Editor::from_composition(comp)
}

fn main_video(editor: &Editor) -> (TrackId, ElementId) {
    let track = &editor.tracks()[0];
    (track.id.clone(), track.elements[0].id.clone())
}

// ── Editing workflow ───────────────────────────────────────────

#[test]
fn rough_cut_workflow() {
    let mut editor = synthesized_editor();
    let (track, clip) = main_video(&editor);

    // Cut out 20s..30s of the interview
    editor.select_element(&clip);
    editor.seek_to(secs(20));
    let middle = editor.split_element_at_playhead().unwrap();
    editor.seek_to(secs(30));
    let tail = editor.split_element_at_playhead().unwrap();
    assert!(editor.remove_element(&middle));
    assert!(editor.move_element(&tail, secs(20)));

    let clips = editor.sorted_elements(&track);
    assert_eq!(clips.len(), 2);
    assert_eq!(clips[0].source_range().end(), secs(20));
    assert_eq!(clips[1].trim_start, secs(30));
    assert_eq!(clips[1].time, secs(20));
    assert_eq!(clips[1].end(), secs(50));

    // The audio track is untouched, so it still sets the duration
    assert_eq!(editor.timeline_duration(), secs(60));

    let edl = Edl::build(editor.composition());
    let video = &edl.tracks[0];
    assert_eq!(video.clips.len(), 2);
    assert_eq!((video.clips[0].start, video.clips[0].end), (secs(0), secs(20)));
    assert_eq!((video.clips[1].start, video.clips[1].end), (secs(30), secs(60)));
}

#[test]
fn undo_everything_restores_the_original() {
    let mut editor = synthesized_editor();
    let original = editor.composition().clone();
    let (_, clip) = main_video(&editor);

    editor.trim_element(&clip, TrimSide::Start, secs(5));
    editor.trim_element(&clip, TrimSide::End, secs(40));
    let copy = editor.duplicate_element(&clip).unwrap();
    editor.move_element(&copy, secs(50));
    let overlay = editor.add_track(TrackKind::Overlay, None);
    editor.add_element(
        &overlay,
        ElementDraft::new(ElementKind::Text {
            text: "Chapter 1".into(),
        }),
    );

    while editor.undo() {}
    assert_eq!(editor.composition(), &original);
    assert!(!editor.can_undo());
    assert!(editor.can_redo());
}

#[test]
fn captions_are_exported_with_text() {
    let editor = synthesized_editor();
    let edl = Edl::build(editor.composition());
    let captions = edl
        .tracks
        .iter()
        .find(|t| t.kind == TrackKind::Captions)
        .unwrap();
    let texts: Vec<_> = captions.clips.iter().filter_map(|c| c.text.as_deref()).collect();
    assert_eq!(texts, vec!["Welcome back", "Today we cut video"]);
}

#[test]
fn locked_audio_survives_bulk_delete() {
    let mut editor = synthesized_editor();
    let audio = editor.tracks().last().unwrap().id.clone();
    editor.toggle_lock(&audio);

    editor.select_all_elements();
    let ids: Vec<ElementId> = editor.selection().element_ids().to_vec();
    let removed = editor.remove_elements(&ids);

    assert_eq!(removed, ids.len() - 1);
    assert_eq!(editor.track(&audio).unwrap().element_count(), 1);
}

// ── Persistence ────────────────────────────────────────────────

#[test]
fn load_save_load_is_lossless() {
    let mut editor = synthesized_editor();
    let (_, clip) = main_video(&editor);
    editor.select_element(&clip);
    editor.seek_to(RationalTime::new(37, 3));
    editor.split_element_at_playhead().unwrap();

    // A cut at 37/3 s is not representable on the wire; after the first
    // load the times sit on the microsecond grid and stay there.
    let first = editor.save_point().file.to_json().unwrap();
    let loaded = CompositionFile::from_json(&first).unwrap();
    let second = loaded.to_json().unwrap();
    let reloaded = CompositionFile::from_json(&second).unwrap();

    assert_eq!(second, reloaded.to_json().unwrap());
    assert_eq!(loaded, reloaded);
    assert_eq!(
        Edl::build(&loaded.composition),
        Edl::build(&reloaded.composition)
    );
}

#[test]
fn saved_file_reopens_in_a_fresh_editor() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("project.json");

    let mut editor = synthesized_editor();
    editor.add_track(TrackKind::Overlay, Some("Lower thirds"));
    let point = editor.save_point();
    point.file.save_to_file(&path).unwrap();
    assert!(editor.mark_saved(point.token));

    let mut reopened = Editor::new(1, 1);
    reopened.load(CompositionFile::load_from_file(&path).unwrap().into_composition());
    assert_eq!(reopened.composition(), editor.composition());
    assert_eq!(reopened.tracks()[0].name, "Lower thirds");
    assert!(!reopened.is_dirty());
}

#[test]
fn foreign_document_with_float_times_loads() {
    let json = serde_json::json!({
        "version": 1,
        "width": 1080,
        "height": 1920,
        "fps": 30,
        "background_color": "#000000",
        "tracks": [{
            "id": "track_abc",
            "name": "Main Video",
            "type": "video",
            "muted": false,
            "locked": false,
            "visible": true,
            "elements": [{
                "id": "el_1",
                "type": "video",
                "name": "clip.mp4",
                "time": 0.0,
                "duration": 12.345,
                "source": "media://clip.mp4",
                "trim_start": 1.5,
                "trim_end": 0.0,
                "x": "50%", "y": "50%", "width": "100%", "height": "100%",
                "rotation": 0, "opacity": 1.0, "fit": "cover", "volume": 0,
                "fade_in": 0, "fade_out": 0, "effects": [], "transition": null,
                "modification_key": null
            }]
        }],
        "captions": { "enabled": false }
    });
    let file = CompositionFile::from_value(json).unwrap();
    let el = &file.composition.tracks[0].elements[0];
    assert_eq!(el.duration, RationalTime::new(12_345, 1000));
    assert_eq!(el.source_end(), RationalTime::new(13_845, 1000));
}

// ── Properties ─────────────────────────────────────────────────

proptest! {
    #[test]
    fn split_then_undo_is_identity(cut_ms in 1i64..59_999) {
        let mut editor = synthesized_editor();
        let before = editor.composition().clone();
        let (_, clip) = main_video(&editor);

        editor.select_element(&clip);
        editor.seek_to(RationalTime::new(cut_ms, 1000));
        let right = editor.split_element_at_playhead();
        prop_assert!(right.is_some());

        let left = editor.element(&clip).unwrap();
        let right = editor.element(right.as_ref().unwrap()).unwrap();
        prop_assert_eq!(left.source_end(), right.trim_start);
        prop_assert_eq!(left.duration + right.duration, secs(60));

        prop_assert!(editor.undo());
        prop_assert_eq!(editor.composition(), &before);
    }

    #[test]
    fn edl_is_sorted_after_random_moves(targets in proptest::collection::vec(0i64..120, 1..8)) {
        let mut editor = Editor::new(1080, 1920);
        let track = editor.add_track(TrackKind::Video, None);
        for (i, target) in targets.iter().enumerate() {
            let id = editor
                .add_element(
                    &track,
                    ElementDraft::new(ElementKind::Video)
                        .at(secs(i as i64 * 2))
                        .lasting(secs(2))
                        .trim_start(secs(i as i64)),
                )
                .unwrap();
            editor.move_element(&id, secs(*target));
        }

        let edl = Edl::build(editor.composition());
        let times: Vec<RationalTime> = edl.tracks[0]
            .clips
            .iter()
            .map(|c| editor.element(&ElementId::from(c.id.as_str())).unwrap().time)
            .collect();
        prop_assert!(times.windows(2).all(|w| w[0] <= w[1]));
    }
}
