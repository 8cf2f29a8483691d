//! Player configuration.

use serde::{Deserialize, Serialize};

use crate::error::BundleError;

fn default_true() -> bool {
    true
}

fn default_speed() -> f64 {
    1.0
}

/// Rendering backend requested from the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Renderer {
    #[default]
    Svg,
    Canvas,
    Html,
}

/// Playback direction, serialized as `1` / `-1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "i8", into = "i8")]
pub enum Direction {
    #[default]
    Forward,
    Reverse,
}

impl TryFrom<i8> for Direction {
    type Error = String;

    fn try_from(value: i8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Forward),
            -1 => Ok(Self::Reverse),
            other => Err(format!("direction must be 1 or -1, got {other}")),
        }
    }
}

impl From<Direction> for i8 {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Forward => 1,
            Direction::Reverse => -1,
        }
    }
}

/// Construction-time options for a player. Missing keys take the defaults
/// of the framework adapters (looping autoplay at 1x, forward, SVG).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerConfig {
    #[serde(rename = "loop", default = "default_true")]
    pub loop_playback: bool,
    #[serde(default = "default_true")]
    pub autoplay: bool,
    #[serde(default = "default_speed")]
    pub speed: f64,
    #[serde(default)]
    pub direction: Direction,
    #[serde(default)]
    pub renderer: Renderer,
    /// Theme applied after each bundle load.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    /// Marker sought after each bundle load.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marker: Option<String>,
    /// Reserved until state application is defined; only recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            loop_playback: true,
            autoplay: true,
            speed: default_speed(),
            direction: Direction::Forward,
            renderer: Renderer::Svg,
            theme: None,
            marker: None,
            state: None,
        }
    }
}

impl PlayerConfig {
    /// Parse and validate a JSON configuration object.
    pub fn from_json(s: &str) -> Result<Self, BundleError> {
        let cfg: PlayerConfig = serde_json::from_str(s).map_err(|e| BundleError::InvalidConfig {
            reason: e.to_string(),
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), BundleError> {
        if !self.speed.is_finite() || self.speed <= 0.0 {
            return Err(BundleError::InvalidConfig {
                reason: format!("speed must be a positive number, got {}", self.speed),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_yields_adapter_defaults() {
        let cfg = PlayerConfig::from_json("{}").unwrap();
        assert_eq!(cfg, PlayerConfig::default());
        assert!(cfg.loop_playback);
        assert!(cfg.autoplay);
        assert_eq!(cfg.renderer, Renderer::Svg);
    }

    #[test]
    fn parses_adapter_options() {
        let cfg = PlayerConfig::from_json(
            r#"{ "loop": false, "autoplay": false, "speed": 2.5, "direction": -1,
                 "renderer": "canvas", "theme": "dark" }"#,
        )
        .unwrap();
        assert!(!cfg.loop_playback);
        assert_eq!(cfg.speed, 2.5);
        assert_eq!(cfg.direction, Direction::Reverse);
        assert_eq!(cfg.renderer, Renderer::Canvas);
        assert_eq!(cfg.theme.as_deref(), Some("dark"));
    }

    #[test]
    fn rejects_bad_direction_and_speed() {
        assert!(PlayerConfig::from_json(r#"{ "direction": 0 }"#).is_err());
        assert!(PlayerConfig::from_json(r#"{ "renderer": "webgl" }"#).is_err());
        let err = PlayerConfig::from_json(r#"{ "speed": 0 }"#).unwrap_err();
        assert_eq!(err.category(), "config");
    }

    #[test]
    fn direction_serializes_as_sign() {
        assert_eq!(serde_json::to_string(&Direction::Reverse).unwrap(), "-1");
    }
}
