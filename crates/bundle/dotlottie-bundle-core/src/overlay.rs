//! Overlay resolution: theme and marker names → engine-ready effects.
//!
//! Pure lookups with validation; nothing here mutates the bundle.

use serde::{Deserialize, Serialize};

use crate::data::Bundle;
use crate::error::BundleError;

/// Theme overrides ready for the engine. `payload` is the stored JSON,
/// unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThemeEffect {
    pub name: String,
    pub payload: serde_json::Value,
}

/// Validated seek target within the active animation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameTarget {
    pub frame: f64,
    pub end_frame: Option<f64>,
}

pub fn resolve_theme(bundle: &Bundle, name: &str) -> Result<ThemeEffect, BundleError> {
    let theme = bundle
        .themes
        .get(name)
        .ok_or_else(|| BundleError::ThemeNotFound {
            name: name.to_string(),
        })?;
    Ok(ThemeEffect {
        name: theme.name.clone(),
        payload: theme.payload.clone(),
    })
}

/// Resolve a marker against the animation at `active`. Documents that declare
/// no frame bounds accept any marker.
pub fn resolve_marker(
    bundle: &Bundle,
    active: usize,
    name: &str,
) -> Result<FrameTarget, BundleError> {
    let marker = bundle
        .markers
        .get(name)
        .ok_or_else(|| BundleError::MarkerNotFound {
            name: name.to_string(),
        })?;
    let animation = bundle
        .animation(active)
        .ok_or(BundleError::IndexOutOfRange {
            index: active,
            len: bundle.animations.len(),
        })?;

    if let Some(bounds) = animation.frame_bounds() {
        if !bounds.contains(marker.frame) {
            return Err(BundleError::MarkerOutOfRange {
                name: name.to_string(),
                frame: marker.frame,
                min: bounds.start,
                max: bounds.end,
            });
        }
    }

    Ok(FrameTarget {
        frame: marker.frame,
        end_frame: marker.end(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{AnimationDocument, MarkerDefinition, ThemeDefinition};
    use indexmap::IndexMap;
    use serde_json::json;

    fn bundle(max_frame: u32) -> Bundle {
        let mut themes = IndexMap::new();
        themes.insert(
            "dark".to_string(),
            ThemeDefinition {
                name: "dark".into(),
                entry: "themes/dark.json".into(),
                payload: json!({ "color": "#000" }),
                animations: Vec::new(),
            },
        );
        let mut markers = IndexMap::new();
        for (name, frame) in [("intro", 30.0), ("start", 0.0), ("late", 20.0)] {
            markers.insert(
                name.to_string(),
                MarkerDefinition {
                    frame,
                    duration: None,
                    end_frame: None,
                },
            );
        }
        Bundle {
            animations: vec![
                AnimationDocument {
                    id: "short".into(),
                    entry: "animations/short.json".into(),
                    data: json!({ "frames": max_frame }),
                },
                AnimationDocument {
                    id: "open".into(),
                    entry: "animations/open.json".into(),
                    data: json!({ "layers": [] }),
                },
            ],
            themes,
            markers,
            states: IndexMap::new(),
            manifest: None,
            warnings: Vec::new(),
        }
    }

    #[test]
    fn theme_round_trips_stored_payload() {
        let b = bundle(20);
        let effect = resolve_theme(&b, "dark").unwrap();
        assert_eq!(effect.payload, json!({ "color": "#000" }));
        assert_eq!(effect.payload, b.themes["dark"].payload);
    }

    #[test]
    fn unknown_theme() {
        let err = resolve_theme(&bundle(20), "light").unwrap_err();
        assert_eq!(
            err,
            BundleError::ThemeNotFound {
                name: "light".into()
            }
        );
    }

    #[test]
    fn marker_past_max_frame_is_out_of_range() {
        let err = resolve_marker(&bundle(20), 0, "intro").unwrap_err();
        assert!(matches!(
            err,
            BundleError::MarkerOutOfRange { frame, max, .. } if frame == 30.0 && max == 20.0
        ));
    }

    #[test]
    fn marker_on_boundary_resolves_exact_frame() {
        let b = bundle(20);
        assert_eq!(resolve_marker(&b, 0, "late").unwrap().frame, 20.0);
        assert_eq!(resolve_marker(&b, 0, "start").unwrap().frame, 0.0);
    }

    #[test]
    fn unbounded_document_accepts_any_marker() {
        assert_eq!(resolve_marker(&bundle(20), 1, "intro").unwrap().frame, 30.0);
    }

    #[test]
    fn unknown_marker_and_bad_index() {
        let b = bundle(20);
        assert!(matches!(
            resolve_marker(&b, 0, "outro"),
            Err(BundleError::MarkerNotFound { .. })
        ));
        assert!(matches!(
            resolve_marker(&b, 7, "intro"),
            Err(BundleError::IndexOutOfRange { index: 7, len: 2 })
        ));
    }
}
