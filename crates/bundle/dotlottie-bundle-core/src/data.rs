//! Parsed bundle model: animations plus theme, marker, and state dictionaries.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One renderable animation. The document body is opaque to this crate
/// except for its declared frame bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationDocument {
    /// Logical name (entry path below `animations/` without extension).
    pub id: String,
    /// Archive entry the document came from.
    pub entry: String,
    pub data: serde_json::Value,
}

/// Declared frame range of an animation document.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameBounds {
    pub start: f64,
    pub end: f64,
}

impl FrameBounds {
    #[inline]
    pub fn contains(&self, frame: f64) -> bool {
        frame >= self.start && frame <= self.end
    }
}

impl AnimationDocument {
    /// Frame bounds declared by the document: Lottie `ip`/`op` when present,
    /// otherwise a plain `frames` count starting at zero.
    pub fn frame_bounds(&self) -> Option<FrameBounds> {
        let number = |key: &str| self.data.get(key).and_then(|v| v.as_f64());
        let start = number("ip").unwrap_or(0.0);
        number("op")
            .or_else(|| number("frames"))
            .map(|end| FrameBounds { start, end })
    }
}

/// A named set of visual overrides. The payload is handed to the engine
/// exactly as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThemeDefinition {
    pub name: String,
    pub entry: String,
    pub payload: serde_json::Value,
    /// Animation ids this theme is scoped to; empty applies to all.
    #[serde(default)]
    pub animations: Vec<String>,
}

impl ThemeDefinition {
    pub fn applies_to(&self, animation_id: &str) -> bool {
        self.animations.is_empty() || self.animations.iter().any(|a| a == animation_id)
    }
}

/// A named seek point. Accepts `{ "frame": n }` plus Lottie-style `tm`/`dr`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarkerDefinition {
    #[serde(alias = "tm")]
    pub frame: f64,
    #[serde(default, alias = "dr", skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    #[serde(
        default,
        rename = "endFrame",
        alias = "end_frame",
        skip_serializing_if = "Option::is_none"
    )]
    pub end_frame: Option<f64>,
}

impl MarkerDefinition {
    /// Last frame of the marker range, if it declares one.
    pub fn end(&self) -> Option<f64> {
        self.end_frame
            .or_else(|| self.duration.map(|d| self.frame + d))
    }
}

/// Interactivity descriptor. Only the name is interpreted for now.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateDefinition {
    pub name: String,
    pub entry: String,
    pub payload: serde_json::Value,
}

/// Optional `manifest.json` metadata. Parsed leniently; unknown keys are kept.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    /// Packaging tools write this as either a string or a number.
    #[serde(default)]
    pub version: Option<serde_json::Value>,
    #[serde(default)]
    pub generator: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub active_animation_id: Option<String>,
    #[serde(default)]
    pub animations: Vec<ManifestItem>,
    #[serde(default)]
    pub themes: Vec<ManifestItem>,
    #[serde(default)]
    pub states: Vec<serde_json::Value>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestItem {
    pub id: String,
    #[serde(default)]
    pub animations: Vec<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Why an entry did not make it into the bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WarningKind {
    /// Entry content could not be parsed
    Malformed { reason: String },
    /// Another entry already claimed the same logical name
    Duplicate { kept: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleWarning {
    pub entry: String,
    pub kind: WarningKind,
}

/// Parsed contents of one archive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bundle {
    /// Never empty; ordered by normalized entry path.
    pub animations: Vec<AnimationDocument>,
    pub themes: IndexMap<String, ThemeDefinition>,
    pub markers: IndexMap<String, MarkerDefinition>,
    pub states: IndexMap<String, StateDefinition>,
    #[serde(default)]
    pub manifest: Option<Manifest>,
    #[serde(default)]
    pub warnings: Vec<BundleWarning>,
}

impl Bundle {
    pub fn animation(&self, index: usize) -> Option<&AnimationDocument> {
        self.animations.get(index)
    }

    pub fn theme_names(&self) -> Vec<String> {
        self.themes.keys().cloned().collect()
    }

    pub fn marker_names(&self) -> Vec<String> {
        self.markers.keys().cloned().collect()
    }

    pub fn state_names(&self) -> Vec<String> {
        self.states.keys().cloned().collect()
    }
}
