//! Canvas lengths for element placement.
//!
//! Position and size fields are either a percentage of the canvas axis
//! (`"50%"` on the wire) or an absolute pixel count (a bare number).

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A length along one canvas axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Dimension {
    /// Percentage of the axis length (50.0 = half).
    Percent(f64),
    /// Absolute pixels.
    Pixels(f64),
}

impl Dimension {
    pub const FULL: Self = Self::Percent(100.0);
    pub const CENTER: Self = Self::Percent(50.0);

    /// Resolve to pixels against the total axis length.
    pub fn resolve(self, total: f64) -> f64 {
        match self {
            Self::Percent(p) => p / 100.0 * total,
            Self::Pixels(px) => px,
        }
    }

    /// Parse the wire form: `"12.5%"`, `"40px"`, or a bare number string.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if let Some(pct) = text.strip_suffix('%') {
            return pct.trim().parse::<f64>().ok().filter(|v| v.is_finite()).map(Self::Percent);
        }
        let px = text.strip_suffix("px").unwrap_or(text);
        px.trim().parse::<f64>().ok().filter(|v| v.is_finite()).map(Self::Pixels)
    }

    pub fn is_finite(self) -> bool {
        match self {
            Self::Percent(v) | Self::Pixels(v) => v.is_finite(),
        }
    }
}

impl Default for Dimension {
    fn default() -> Self {
        Self::CENTER
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Percent(p) => write!(f, "{p}%"),
            Self::Pixels(px) => write!(f, "{px}"),
        }
    }
}

impl Serialize for Dimension {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::Percent(_) => serializer.collect_str(self),
            Self::Pixels(px) => serializer.serialize_f64(*px),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawDimension {
    Number(f64),
    Text(String),
}

impl<'de> Deserialize<'de> for Dimension {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        match RawDimension::deserialize(deserializer)? {
            RawDimension::Number(px) if px.is_finite() => Ok(Self::Pixels(px)),
            RawDimension::Number(_) => Err(serde::de::Error::custom("dimension must be finite")),
            RawDimension::Text(text) => Self::parse(&text).ok_or_else(|| {
                serde::de::Error::custom(format!("invalid dimension: {text:?}"))
            }),
        }
    }
}
