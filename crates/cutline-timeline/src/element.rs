//! Element types for the timeline.
//!
//! An element lives in two coordinate spaces at once: timeline space
//! `[time, time + duration)` and source space
//! `[trim_start, trim_start + duration)`. Every edit below preserves the
//! pairing.

use cutline_core::{CutlineError, Dimension, RationalTime, Result, TimeRange};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Stable element identifier (`el_…`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(String);

impl ElementId {
    /// Generate a fresh random id.
    pub fn generate() -> Self {
        let hex = Uuid::new_v4().simple().to_string();
        Self(format!("el_{}", &hex[..16]))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ElementId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ElementId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Element variant, tagged by `type` on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ElementKind {
    Video,
    Audio,
    Image,
    Text {
        #[serde(default)]
        text: String,
    },
    Caption {
        #[serde(default)]
        text: String,
    },
    Shape,
}

/// Fieldless view of [`ElementKind`], used where only the tag matters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementType {
    Video,
    Audio,
    Image,
    Text,
    Caption,
    Shape,
}

impl ElementKind {
    pub fn element_type(&self) -> ElementType {
        match self {
            Self::Video => ElementType::Video,
            Self::Audio => ElementType::Audio,
            Self::Image => ElementType::Image,
            Self::Text { .. } => ElementType::Text,
            Self::Caption { .. } => ElementType::Caption,
            Self::Shape => ElementType::Shape,
        }
    }

    /// Video and audio reference media of fixed length: duration is bound to
    /// the source range.
    pub fn is_media(&self) -> bool {
        matches!(self, Self::Video | Self::Audio)
    }

    /// Text-bearing kinds.
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Text { text } | Self::Caption { text } => Some(text),
            _ => None,
        }
    }

    pub fn text_mut(&mut self) -> Option<&mut String> {
        match self {
            Self::Text { text } | Self::Caption { text } => Some(text),
            _ => None,
        }
    }
}

/// How visual content fits its box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Fit {
    #[default]
    Cover,
    Contain,
    Fill,
}

/// A named effect with free-form parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Effect {
    pub name: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

/// Transition into this element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    #[serde(rename = "type")]
    pub kind: String,
    pub duration: RationalTime,
}

fn default_opacity() -> f64 {
    1.0
}

fn default_volume() -> f64 {
    1.0
}

fn default_name() -> String {
    "New Element".to_string()
}

/// A placed element on a track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    /// Unique element ID
    pub id: ElementId,
    #[serde(flatten)]
    pub kind: ElementKind,
    /// Display name
    #[serde(default = "default_name")]
    pub name: String,
    /// Timeline start
    #[serde(default)]
    pub time: RationalTime,
    /// Length on the timeline
    pub duration: RationalTime,
    /// Media reference (URL or upload id)
    #[serde(default)]
    pub source: Option<String>,
    /// Total length of the referenced media, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_duration: Option<RationalTime>,
    /// Source-space start
    #[serde(default)]
    pub trim_start: RationalTime,
    #[serde(default)]
    pub x: Dimension,
    #[serde(default)]
    pub y: Dimension,
    #[serde(default = "full_dimension")]
    pub width: Dimension,
    #[serde(default = "full_dimension")]
    pub height: Dimension,
    #[serde(default)]
    pub rotation: f64,
    #[serde(default = "default_opacity")]
    pub opacity: f64,
    #[serde(default)]
    pub fit: Fit,
    #[serde(default = "default_volume")]
    pub volume: f64,
    #[serde(default)]
    pub fade_in: RationalTime,
    #[serde(default)]
    pub fade_out: RationalTime,
    #[serde(default)]
    pub effects: Vec<Effect>,
    #[serde(default)]
    pub transition: Option<Transition>,
    /// Template slot this element can be swapped through
    #[serde(default)]
    pub modification_key: Option<String>,
}

fn full_dimension() -> Dimension {
    Dimension::FULL
}

impl Element {
    /// Create an element with media-style defaults (full frame, cover fit).
    pub fn new(kind: ElementKind, time: RationalTime, duration: RationalTime) -> Self {
        Self {
            id: ElementId::generate(),
            kind,
            name: default_name(),
            time,
            duration,
            source: None,
            source_duration: None,
            trim_start: RationalTime::ZERO,
            x: Dimension::CENTER,
            y: Dimension::CENTER,
            width: Dimension::FULL,
            height: Dimension::FULL,
            rotation: 0.0,
            opacity: 1.0,
            fit: Fit::Cover,
            volume: 1.0,
            fade_in: RationalTime::ZERO,
            fade_out: RationalTime::ZERO,
            effects: Vec::new(),
            transition: None,
            modification_key: None,
        }
    }

    /// Apply the type-dependent default box for a canvas.
    ///
    /// Media fills the frame. Everything else gets half the canvas width and
    /// a height scaled by the aspect ratio so the box looks square on screen.
    pub fn apply_default_layout(&mut self, canvas_width: u32, canvas_height: u32) {
        if self.kind.is_media() {
            self.width = Dimension::FULL;
            self.height = Dimension::FULL;
            self.fit = Fit::Cover;
        } else {
            let (width, height) = square_box_percent(50.0, canvas_width, canvas_height);
            self.width = Dimension::Percent(width);
            self.height = Dimension::Percent(height);
            self.fit = Fit::Contain;
        }
    }

    pub fn element_type(&self) -> ElementType {
        self.kind.element_type()
    }

    pub fn is_media(&self) -> bool {
        self.kind.is_media()
    }

    pub fn text(&self) -> Option<&str> {
        self.kind.text()
    }

    /// Timeline end (exclusive).
    pub fn end(&self) -> RationalTime {
        self.time + self.duration
    }

    /// Where this element plays on the timeline.
    pub fn timeline_range(&self) -> TimeRange {
        TimeRange::new(self.time, self.duration)
    }

    /// Which portion of the source is used.
    pub fn source_range(&self) -> TimeRange {
        TimeRange::new(self.trim_start, self.duration)
    }

    /// Source-space end (exclusive).
    pub fn source_end(&self) -> RationalTime {
        self.trim_start + self.duration
    }

    /// Check the element invariants.
    pub fn validate(&self) -> Result<()> {
        let fail = |what: &str| Err(CutlineError::Validation(format!("element {}: {what}", self.id)));
        if self.id.as_str().is_empty() {
            return fail("empty id");
        }
        if self.time.is_negative() {
            return fail("time must be >= 0");
        }
        if !self.duration.is_positive() {
            return fail("duration must be > 0");
        }
        if self.trim_start.is_negative() {
            return fail("trim_start must be >= 0");
        }
        if self.is_media() {
            if let Some(total) = self.source_duration {
                if self.source_end() > total {
                    return fail("source range exceeds media length");
                }
            }
        }
        if !(0.0..=1.0).contains(&self.opacity) {
            return fail("opacity must be within [0, 1]");
        }
        if !(self.volume >= 0.0 && self.volume.is_finite()) {
            return fail("volume must be >= 0");
        }
        if !self.rotation.is_finite() {
            return fail("rotation must be finite");
        }
        if self.fade_in.is_negative() || self.fade_out.is_negative() {
            return fail("fades must be >= 0");
        }
        if ![self.x, self.y, self.width, self.height].iter().all(|d| d.is_finite()) {
            return fail("layout must be finite");
        }
        Ok(())
    }

    /// Cut at an absolute timeline position strictly inside the element.
    ///
    /// The left piece keeps this element's id; the right piece gets
    /// `right_id`. Their source ranges partition the original exactly.
    pub fn split_at(&self, at: RationalTime, right_id: ElementId) -> Option<(Element, Element)> {
        if !self.timeline_range().strictly_contains(at) {
            return None;
        }
        let relative = at - self.time;

        let mut left = self.clone();
        left.duration = relative;

        let mut right = self.clone();
        right.id = right_id;
        right.name = format!("{} (split)", self.name);
        right.time = at;
        right.duration = self.duration - relative;
        right.trim_start = self.trim_start + relative;

        Some((left, right))
    }

    /// Drag the start edge to `edge`. Returns `None` when the result would
    /// fall below `floor`.
    ///
    /// The end edge stays put. For media the start cannot be pulled before
    /// the beginning of the source.
    pub fn trimmed_start(&self, edge: RationalTime, floor: RationalTime) -> Option<Element> {
        let edge = edge.non_negative();
        let mut delta = edge - self.time;
        if self.is_media() && self.trim_start + delta < RationalTime::ZERO {
            delta = -self.trim_start;
        }
        let duration = self.duration - delta;
        if duration < floor {
            return None;
        }
        let mut out = self.clone();
        out.time = self.time + delta;
        out.duration = duration;
        out.trim_start = (self.trim_start + delta).non_negative();
        Some(out)
    }

    /// Drag the end edge to `edge`. Returns `None` when the result would fall
    /// below `floor`. Fixed-length media is clamped to the source length.
    pub fn trimmed_end(&self, edge: RationalTime, floor: RationalTime) -> Option<Element> {
        let mut duration = edge - self.time;
        if self.is_media() {
            if let Some(total) = self.source_duration {
                duration = duration.min(total - self.trim_start);
            }
        }
        if duration < floor {
            return None;
        }
        let mut out = self.clone();
        out.duration = duration;
        Some(out)
    }

    /// A copy with a fresh id placed right after this element.
    pub fn duplicate(&self) -> Element {
        let mut copy = self.clone();
        copy.id = ElementId::generate();
        copy.name = format!("{} (copy)", self.name);
        copy.time = self.end();
        copy
    }
}

/// Box of `width_pct` canvas width whose height (in percent of canvas
/// height) makes it square in pixels, rounded to two decimals.
pub fn square_box_percent(width_pct: f64, canvas_width: u32, canvas_height: u32) -> (f64, f64) {
    let (w, h) = (canvas_width.max(1) as f64, canvas_height.max(1) as f64);
    let height_pct = (width_pct * w / h * 100.0).round() / 100.0;
    (width_pct, height_pct)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn secs(s: i64) -> RationalTime {
        RationalTime::from_secs(s)
    }

    fn video(time: i64, duration: i64, trim_start: i64) -> Element {
        let mut el = Element::new(ElementKind::Video, secs(time), secs(duration));
        el.trim_start = secs(trim_start);
        el.source = Some("media://clip.mp4".into());
        el
    }

    #[test]
    fn test_split_scenario() {
        let el = video(0, 10, 0);
        let (left, right) = el.split_at(secs(4), ElementId::from("el_right")).unwrap();

        assert_eq!(left.id, el.id);
        assert_eq!(left.timeline_range(), TimeRange::new(secs(0), secs(4)));
        assert_eq!(left.source_range(), TimeRange::new(secs(0), secs(4)));

        assert_eq!(right.id.as_str(), "el_right");
        assert_eq!(right.timeline_range(), TimeRange::new(secs(4), secs(6)));
        assert_eq!(right.source_range(), TimeRange::new(secs(4), secs(6)));
        assert!(right.name.ends_with("(split)"));
    }

    #[test]
    fn test_split_at_boundary_rejected() {
        let el = video(2, 3, 0);
        assert!(el.split_at(secs(2), ElementId::generate()).is_none());
        assert!(el.split_at(secs(5), ElementId::generate()).is_none());
    }

    #[test]
    fn test_trim_end_below_floor_rejected() {
        let el = video(5, 10, 0);
        assert!(el.trimmed_end(secs(3), RationalTime::new(1, 10)).is_none());
    }

    #[test]
    fn test_trim_start_consumes_media() {
        let el = video(2, 8, 1);
        let out = el.trimmed_start(secs(4), RationalTime::new(1, 10)).unwrap();
        assert_eq!(out.time, secs(4));
        assert_eq!(out.duration, secs(6));
        assert_eq!(out.trim_start, secs(3));
        assert_eq!(out.source_end(), el.source_end());
    }

    #[test]
    fn test_trim_start_cannot_reveal_before_source() {
        let el = video(5, 5, 1);
        let out = el.trimmed_start(secs(0), RationalTime::new(1, 10)).unwrap();
        assert_eq!(out.time, secs(4));
        assert_eq!(out.trim_start, RationalTime::ZERO);
        assert_eq!(out.end(), el.end());
    }

    #[test]
    fn test_trim_end_clamps_to_media_length() {
        let mut el = video(0, 5, 2);
        el.source_duration = Some(secs(10));
        let out = el.trimmed_end(secs(20), RationalTime::new(1, 10)).unwrap();
        assert_eq!(out.duration, secs(8));
        assert_eq!(out.source_end(), secs(10));
    }

    #[test]
    fn test_generated_elements_extend_freely() {
        let el = Element::new(
            ElementKind::Text { text: "Hi".into() },
            secs(3),
            secs(2),
        );
        let out = el.trimmed_start(secs(1), RationalTime::new(1, 10)).unwrap();
        assert_eq!(out.time, secs(1));
        assert_eq!(out.duration, secs(4));
        assert_eq!(out.trim_start, RationalTime::ZERO);
    }

    #[test]
    fn test_default_layout_square_box() {
        let mut el = Element::new(ElementKind::Image, secs(0), secs(5));
        el.apply_default_layout(1080, 1920);
        assert_eq!(el.width, Dimension::Percent(50.0));
        assert_eq!(el.height, Dimension::Percent(28.13));
        assert_eq!(el.fit, Fit::Contain);

        let mut media = Element::new(ElementKind::Video, secs(0), secs(5));
        media.apply_default_layout(1080, 1920);
        assert_eq!(media.height, Dimension::FULL);
        assert_eq!(media.fit, Fit::Cover);
    }

    #[test]
    fn test_validate_rejects_bad_opacity() {
        let mut el = video(0, 1, 0);
        el.opacity = 1.5;
        assert!(el.validate().is_err());
    }

    #[test]
    fn test_wire_shape() {
        let el = Element::new(ElementKind::Caption { text: "hello".into() }, secs(1), secs(2));
        let json = serde_json::to_value(&el).unwrap();
        assert_eq!(json["type"], "caption");
        assert_eq!(json["text"], "hello");
        assert_eq!(json["time"], 1.0);
        assert_eq!(json["width"], "100%");

        let back: Element = serde_json::from_value(json).unwrap();
        assert_eq!(back, el);
    }

    #[test]
    fn test_sparse_wire_element_gets_defaults() {
        let json = serde_json::json!({
            "id": "el_abc",
            "type": "video",
            "time": 0,
            "duration": 3.5,
        });
        let el: Element = serde_json::from_value(json).unwrap();
        assert_eq!(el.duration, RationalTime::new(7, 2));
        assert_eq!(el.opacity, 1.0);
        assert_eq!(el.width, Dimension::FULL);
        assert!(el.validate().is_ok());
    }

    proptest! {
        #[test]
        fn split_reconstructs_the_whole(
            t0 in 0i64..10_000,
            d0 in 2i64..10_000,
            s0 in 0i64..10_000,
            cut in 1i64..10_000,
        ) {
            prop_assume!(cut < d0);
            let us = |v: i64| RationalTime::new(v, 1000);
            let mut el = Element::new(ElementKind::Video, us(t0), us(d0));
            el.trim_start = us(s0);
            let p = us(t0 + cut);

            let (left, right) = el.split_at(p, ElementId::generate()).unwrap();
            prop_assert_eq!(left.source_end(), right.trim_start);
            prop_assert_eq!(left.trim_start, us(s0));
            prop_assert_eq!(right.source_end(), us(s0 + d0));
            prop_assert_eq!(left.timeline_range(), TimeRange::from_start_end(us(t0), p));
            prop_assert_eq!(right.timeline_range(), TimeRange::from_start_end(p, us(t0 + d0)));
        }

        #[test]
        fn trim_never_goes_below_floor(
            time in 0i64..1_000,
            duration in 1i64..1_000,
            edge in -2_000i64..2_000,
            start_side in any::<bool>(),
        ) {
            let ds = |v: i64| RationalTime::new(v, 10);
            let floor = RationalTime::new(1, 10);
            let el = Element::new(ElementKind::Video, ds(time), ds(duration));
            let out = if start_side {
                el.trimmed_start(ds(edge), floor)
            } else {
                el.trimmed_end(ds(edge), floor)
            };
            if let Some(out) = out {
                prop_assert!(out.duration >= floor);
                prop_assert!(!out.time.is_negative());
                prop_assert!(!out.trim_start.is_negative());
            }
        }
    }
}
