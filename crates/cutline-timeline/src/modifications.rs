//! Template modifications: fill elements that carry a `modification_key`.

use cutline_core::{EditorConfig, RationalTime};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

use crate::composition::Composition;
use crate::element::{Element, ElementType};

/// A value for one template slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Modification {
    /// New source for media and images, new text for text kinds.
    Value(String),
    /// Fields merged over the element.
    Patch(serde_json::Map<String, serde_json::Value>),
}

fn apply_value(element: &mut Element, value: &str) -> bool {
    match element.element_type() {
        ElementType::Video | ElementType::Image | ElementType::Audio => {
            element.source = Some(value.to_string());
            true
        }
        _ => match element.kind.text_mut() {
            Some(text) => {
                *text = value.to_string();
                true
            }
            None => false,
        },
    }
}

fn apply_patch(
    element: &Element,
    patch: &serde_json::Map<String, serde_json::Value>,
    min_duration: RationalTime,
) -> Option<Element> {
    let mut value = serde_json::to_value(element).ok()?;
    let fields = value.as_object_mut()?;
    for (key, v) in patch {
        // Identity is not templatable
        if key != "id" {
            fields.insert(key.clone(), v.clone());
        }
    }
    let patched: Element = match serde_json::from_value(value) {
        Ok(el) => el,
        Err(e) => {
            debug!(element = %element.id, error = %e, "Modification patch does not parse");
            return None;
        }
    };
    if patched.duration < min_duration {
        debug!(element = %element.id, duration = %patched.duration, "Modification patch below trim floor");
        return None;
    }
    if let Err(e) = patched.validate() {
        debug!(error = %e, "Modification patch rejected");
        return None;
    }
    Some(patched)
}

/// Resolve template slots on a copy of `composition`. Elements on locked
/// tracks are left alone, as are patches that would break an element or
/// shorten it below `config.min_element_duration`. Returns the result and
/// how many elements changed.
pub fn apply_modifications(
    composition: &Composition,
    mods: &HashMap<String, Modification>,
    config: &EditorConfig,
) -> (Composition, usize) {
    let mut out = composition.clone();
    let mut changed = 0;
    for track in out.tracks.iter_mut().filter(|t| !t.locked) {
        for element in &mut track.elements {
            let Some(m) = element.modification_key.as_ref().and_then(|k| mods.get(k)) else {
                continue;
            };
            let before = element.clone();
            match m {
                Modification::Value(value) => {
                    apply_value(element, value);
                }
                Modification::Patch(patch) => {
                    if let Some(patched) = apply_patch(element, patch, config.min_element_duration) {
                        *element = patched;
                    }
                }
            }
            if *element != before {
                changed += 1;
            }
        }
    }
    (out, changed)
}
