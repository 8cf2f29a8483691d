//! Boundary with the playback engine that renders animations.
//!
//! The engine is supplied by the host and is already bound to its render
//! target (DOM container, canvas, texture). This crate only tells it what to
//! show; frame stepping and drawing stay on the other side of the trait.

use crate::config::{Direction, PlayerConfig};
use crate::overlay::ThemeEffect;

pub trait PlaybackEngine: Send {
    /// Called once when the player is constructed.
    fn configure(&mut self, config: &PlayerConfig);

    /// Replace the currently rendered animation.
    fn load(&mut self, document: &serde_json::Value);

    /// Apply a resolved theme's overrides to the current render.
    fn apply_theme_effect(&mut self, effect: &ThemeEffect);

    /// Move the playhead without changing play state.
    fn seek_to_frame(&mut self, frame: f64);

    fn play(&mut self);
    fn pause(&mut self);
    fn stop(&mut self);
    fn set_speed(&mut self, speed: f64);
    fn set_direction(&mut self, direction: Direction);

    /// Release engine resources. Must tolerate repeated calls.
    fn destroy(&mut self);
}

impl<E: PlaybackEngine + ?Sized> PlaybackEngine for Box<E> {
    fn configure(&mut self, config: &PlayerConfig) {
        (**self).configure(config)
    }
    fn load(&mut self, document: &serde_json::Value) {
        (**self).load(document)
    }
    fn apply_theme_effect(&mut self, effect: &ThemeEffect) {
        (**self).apply_theme_effect(effect)
    }
    fn seek_to_frame(&mut self, frame: f64) {
        (**self).seek_to_frame(frame)
    }
    fn play(&mut self) {
        (**self).play()
    }
    fn pause(&mut self) {
        (**self).pause()
    }
    fn stop(&mut self) {
        (**self).stop()
    }
    fn set_speed(&mut self, speed: f64) {
        (**self).set_speed(speed)
    }
    fn set_direction(&mut self, direction: Direction) {
        (**self).set_direction(direction)
    }
    fn destroy(&mut self) {
        (**self).destroy()
    }
}
