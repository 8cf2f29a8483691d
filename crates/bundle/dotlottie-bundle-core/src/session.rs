//! Bundle session: the per-player state machine.
//!
//! ```text
//! Empty ──begin_load──▶ Loading ──commit──▶ Ready
//!   ▲                      │                  │
//!   └──────abort───────────┘◀───begin_load────┘
//! ```
//!
//! A failed load returns to whatever state preceded it, so a reload that
//! fails keeps the previous bundle. While loading, the previous bundle stays
//! queryable but cannot be modified.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::container;
use crate::data::{AnimationDocument, Bundle};
use crate::engine::PlaybackEngine;
use crate::error::{BundleError, Operation, OperationError};
use crate::ids::{GenerationCounter, LoadToken};
use crate::overlay::{self, FrameTarget, ThemeEffect};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionState {
    Empty,
    Loading,
    Ready,
}

#[derive(Debug)]
pub struct BundleSession {
    bundle: Option<Bundle>,
    active_animation: Option<usize>,
    active_theme: Option<String>,
    active_marker: Option<String>,
    state: SessionState,
    /// State restored when the in-flight load fails.
    settled: SessionState,
    generations: GenerationCounter,
}

impl Default for BundleSession {
    fn default() -> Self {
        Self::new()
    }
}

impl BundleSession {
    pub fn new() -> Self {
        Self {
            bundle: None,
            active_animation: None,
            active_theme: None,
            active_marker: None,
            state: SessionState::Empty,
            settled: SessionState::Empty,
            generations: GenerationCounter::new(),
        }
    }

    #[inline]
    pub fn state(&self) -> SessionState {
        self.state
    }

    #[inline]
    pub fn bundle(&self) -> Option<&Bundle> {
        self.bundle.as_ref()
    }

    #[inline]
    pub fn active_animation(&self) -> Option<usize> {
        self.active_animation
    }

    pub fn active_document(&self) -> Option<&AnimationDocument> {
        let index = self.active_animation?;
        self.bundle.as_ref()?.animation(index)
    }

    #[inline]
    pub fn active_theme(&self) -> Option<&str> {
        self.active_theme.as_deref()
    }

    #[inline]
    pub fn active_marker(&self) -> Option<&str> {
        self.active_marker.as_deref()
    }

    #[inline]
    pub fn is_current(&self, token: LoadToken) -> bool {
        self.generations.is_latest(token)
    }

    // ---- load lifecycle ----

    /// Start a load. Any load already in flight is superseded.
    pub fn begin_load(&mut self) -> LoadToken {
        if self.state != SessionState::Loading {
            self.settled = self.state;
        }
        self.state = SessionState::Loading;
        let token = self.generations.issue();
        debug!("load {:?} started", token);
        token
    }

    /// Install a parsed bundle and hand its first animation to the engine.
    /// Returns false, without touching anything, when `token` is stale.
    pub fn commit_bundle(
        &mut self,
        token: LoadToken,
        bundle: Bundle,
        engine: &mut dyn PlaybackEngine,
    ) -> bool {
        if !self.is_current(token) {
            debug!("load {:?} superseded; bundle discarded", token);
            return false;
        }
        if let Some(first) = bundle.animation(0) {
            engine.load(&first.data);
        }
        self.active_animation = (!bundle.animations.is_empty()).then_some(0);
        self.bundle = Some(bundle);
        self.active_theme = None;
        self.active_marker = None;
        self.state = SessionState::Ready;
        self.settled = SessionState::Ready;
        debug!("load {:?} committed", token);
        true
    }

    /// Record that a plain animation document (no bundle) is now rendered.
    pub fn commit_document(
        &mut self,
        token: LoadToken,
        document: &serde_json::Value,
        engine: &mut dyn PlaybackEngine,
    ) -> bool {
        if !self.is_current(token) {
            debug!("load {:?} superseded; document discarded", token);
            return false;
        }
        engine.load(document);
        self.clear();
        true
    }

    /// Abandon a failed load, restoring the state that preceded it.
    pub fn abort_load(&mut self, token: LoadToken) -> bool {
        if !self.is_current(token) {
            return false;
        }
        self.state = self.settled;
        debug!("load {:?} aborted; back to {:?}", token, self.state);
        true
    }

    /// Drop the bundle and all selections.
    pub fn clear(&mut self) {
        self.bundle = None;
        self.active_animation = None;
        self.active_theme = None;
        self.active_marker = None;
        self.state = SessionState::Empty;
        self.settled = SessionState::Empty;
    }

    /// Parse `bytes` and replace the current bundle. On failure the session
    /// keeps its prior bundle and selections.
    pub fn load_from_bytes(
        &mut self,
        bytes: &[u8],
        engine: &mut dyn PlaybackEngine,
    ) -> Result<(), OperationError> {
        let token = self.begin_load();
        match container::parse(bytes) {
            Ok(bundle) => {
                self.commit_bundle(token, bundle, engine);
                Ok(())
            }
            Err(err) => {
                self.abort_load(token);
                Err(OperationError::new(
                    Operation::LoadFromBytes,
                    format!("<{} bytes>", bytes.len()),
                    err,
                ))
            }
        }
    }

    // ---- selections ----

    fn ready_bundle(&self, op: Operation, subject: &str) -> Result<&Bundle, OperationError> {
        match (&self.bundle, self.state) {
            (Some(bundle), SessionState::Ready) => Ok(bundle),
            _ => Err(OperationError::new(
                op,
                subject,
                BundleError::SessionNotReady { state: self.state },
            )),
        }
    }

    /// Switch the active animation. The active marker is cleared; the active
    /// theme is re-applied to the new document.
    pub fn select_animation(
        &mut self,
        index: usize,
        engine: &mut dyn PlaybackEngine,
    ) -> Result<(), OperationError> {
        let subject = index.to_string();
        let bundle = self.ready_bundle(Operation::SelectAnimation, &subject)?;
        let document = bundle.animation(index).ok_or_else(|| {
            OperationError::new(
                Operation::SelectAnimation,
                &subject,
                BundleError::IndexOutOfRange {
                    index,
                    len: bundle.animations.len(),
                },
            )
        })?;
        engine.load(&document.data);

        let reapply = self
            .active_theme
            .as_deref()
            .and_then(|name| overlay::resolve_theme(bundle, name).ok());
        if let Some(effect) = &reapply {
            engine.apply_theme_effect(effect);
        }

        self.active_animation = Some(index);
        self.active_marker = None;
        Ok(())
    }

    /// Resolve and apply a theme. On error nothing changes.
    pub fn set_theme(
        &mut self,
        name: &str,
        engine: &mut dyn PlaybackEngine,
    ) -> Result<ThemeEffect, OperationError> {
        let bundle = self.ready_bundle(Operation::SetTheme, name)?;
        let effect = overlay::resolve_theme(bundle, name)
            .map_err(|e| OperationError::new(Operation::SetTheme, name, e))?;

        if let (Some(theme), Some(doc)) = (bundle.themes.get(name), self.active_document()) {
            if !theme.applies_to(&doc.id) {
                debug!("theme '{}' is not scoped to animation '{}'", name, doc.id);
            }
        }

        engine.apply_theme_effect(&effect);
        self.active_theme = Some(name.to_string());
        Ok(effect)
    }

    /// Resolve a marker against the active animation and seek to it. On error
    /// nothing changes.
    pub fn set_marker(
        &mut self,
        name: &str,
        engine: &mut dyn PlaybackEngine,
    ) -> Result<FrameTarget, OperationError> {
        let bundle = self.ready_bundle(Operation::SetMarker, name)?;
        let active = self.active_animation.unwrap_or(0);
        let target = overlay::resolve_marker(bundle, active, name)
            .map_err(|e| OperationError::new(Operation::SetMarker, name, e))?;

        engine.seek_to_frame(target.frame);
        self.active_marker = Some(name.to_string());
        Ok(target)
    }

    // ---- queries ----

    pub fn list_themes(&self) -> Vec<String> {
        self.bundle.as_ref().map(Bundle::theme_names).unwrap_or_default()
    }

    pub fn list_markers(&self) -> Vec<String> {
        self.bundle.as_ref().map(Bundle::marker_names).unwrap_or_default()
    }

    pub fn list_states(&self) -> Vec<String> {
        self.bundle.as_ref().map(Bundle::state_names).unwrap_or_default()
    }
}
