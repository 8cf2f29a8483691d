//! Load orchestration: the handle a host holds.
//!
//! `DotLottiePlayer` owns one [`BundleSession`] and one engine behind a
//! shared lock. Loads are async (fetch, then parse on the blocking pool) and
//! the lock is released across every suspension point; each load carries a
//! generation token and only the newest one may commit. Any executor can poll
//! a load; without a tokio runtime, parsing runs inline.

use std::sync::Arc;

use log::{debug, warn};
use parking_lot::Mutex;

use crate::config::{Direction, PlayerConfig};
use crate::container;
use crate::data::{Bundle, BundleWarning};
use crate::engine::PlaybackEngine;
use crate::error::{BundleError, Operation, OperationError};
use crate::fetch::{Fetcher, NoFetcher};
use crate::ids::LoadToken;
use crate::overlay::{FrameTarget, ThemeEffect};
use crate::session::{BundleSession, SessionState};

const ARCHIVE_EXTENSION: &str = ".lottie";

/// What to load.
#[derive(Debug, Clone, PartialEq)]
pub enum Source {
    /// Raw `.lottie` archive bytes.
    Bytes(Vec<u8>),
    /// Remote resource; archives are recognized by their `.lottie` path.
    Url(String),
    /// A plain animation document, rendered without a bundle.
    Document(serde_json::Value),
}

impl Source {
    pub fn url(url: impl Into<String>) -> Self {
        Source::Url(url.into())
    }

    fn operation(&self) -> Operation {
        match self {
            Source::Bytes(_) => Operation::LoadFromBytes,
            _ => Operation::LoadFrom,
        }
    }

    fn subject(&self) -> String {
        match self {
            Source::Bytes(bytes) => format!("<{} bytes>", bytes.len()),
            Source::Url(url) => url.clone(),
            Source::Document(_) => "<document>".to_string(),
        }
    }
}

impl From<Vec<u8>> for Source {
    fn from(bytes: Vec<u8>) -> Self {
        Source::Bytes(bytes)
    }
}

impl From<serde_json::Value> for Source {
    fn from(document: serde_json::Value) -> Self {
        Source::Document(document)
    }
}

/// How a load request ended when it did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Committed and handed to the engine.
    Loaded,
    /// A newer load started first; this result was discarded.
    Superseded,
    /// The player was destroyed before the load finished.
    Cancelled,
}

/// True when the URL path, ignoring query and fragment, names an archive.
pub fn is_archive_url(url: &str) -> bool {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    path.len()
        .checked_sub(ARCHIVE_EXTENSION.len())
        .and_then(|split| path.get(split..))
        .is_some_and(|ext| ext.eq_ignore_ascii_case(ARCHIVE_EXTENSION))
}

type ErrorCallback = Arc<dyn Fn(&OperationError) + Send + Sync>;
type LoadCallback = Arc<dyn Fn() + Send + Sync>;

enum Payload {
    Bundle(Bundle),
    Document(serde_json::Value),
}

struct Inner {
    session: BundleSession,
    engine: Box<dyn PlaybackEngine>,
    config: PlayerConfig,
    destroyed: bool,
    on_error: Option<ErrorCallback>,
    on_load: Option<LoadCallback>,
}

impl Inner {
    /// Apply the configured theme and marker to a freshly committed bundle.
    fn apply_initial_selection(&mut self) -> Vec<OperationError> {
        let Inner {
            session,
            engine,
            config,
            ..
        } = self;
        let mut errors = Vec::new();
        if let Some(theme) = config.theme.as_deref() {
            if let Err(err) = session.set_theme(theme, engine.as_mut()) {
                errors.push(err);
            }
        }
        if let Some(marker) = config.marker.as_deref() {
            if let Err(err) = session.set_marker(marker, engine.as_mut()) {
                errors.push(err);
            }
        }
        errors
    }
}

/// Cloneable handle to a player. Clones share one session and engine.
#[derive(Clone)]
pub struct DotLottiePlayer {
    inner: Arc<Mutex<Inner>>,
    fetcher: Arc<dyn Fetcher>,
}

impl std::fmt::Debug for DotLottiePlayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("DotLottiePlayer")
            .field("state", &inner.session.state())
            .field("destroyed", &inner.destroyed)
            .finish_non_exhaustive()
    }
}

impl DotLottiePlayer {
    /// Wrap a host-created engine. The engine is configured once, here.
    pub fn new<E>(engine: E, config: PlayerConfig) -> Result<Self, BundleError>
    where
        E: PlaybackEngine + 'static,
    {
        config.validate()?;
        let mut engine: Box<dyn PlaybackEngine> = Box::new(engine);
        engine.configure(&config);
        Ok(Self {
            inner: Arc::new(Mutex::new(Inner {
                session: BundleSession::new(),
                engine,
                config,
                destroyed: false,
                on_error: None,
                on_load: None,
            })),
            fetcher: Arc::new(NoFetcher),
        })
    }

    pub fn with_fetcher<F>(mut self, fetcher: F) -> Self
    where
        F: Fetcher + 'static,
    {
        self.fetcher = Arc::new(fetcher);
        self
    }

    /// Called once for every failed operation, after the lock is released.
    pub fn on_error<F>(&self, callback: F)
    where
        F: Fn(&OperationError) + Send + Sync + 'static,
    {
        self.inner.lock().on_error = Some(Arc::new(callback));
    }

    /// Called after each committed load.
    pub fn on_load<F>(&self, callback: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.inner.lock().on_load = Some(Arc::new(callback));
    }

    fn report(&self, err: OperationError) -> OperationError {
        warn!("{} [{}]", err, err.kind().category());
        let callback = self.inner.lock().on_error.clone();
        if let Some(callback) = callback {
            callback(&err);
        }
        err
    }

    // ---- loading ----

    /// Load a source and, if it is still the newest request when it
    /// completes, commit it.
    pub async fn load_from(&self, source: Source) -> Result<LoadOutcome, OperationError> {
        let operation = source.operation();
        let subject = source.subject();

        let token = {
            let mut inner = self.inner.lock();
            if inner.destroyed {
                return Ok(LoadOutcome::Cancelled);
            }
            inner.session.begin_load()
        };
        debug!("{}({}) dispatched as {:?}", operation, subject, token);

        let payload = self.resolve(source).await;
        self.finish_load(token, operation, subject, payload)
    }

    async fn resolve(&self, source: Source) -> Result<Payload, BundleError> {
        match source {
            Source::Bytes(bytes) => parse_blocking(bytes).await.map(Payload::Bundle),
            Source::Document(document) => Ok(Payload::Document(document)),
            Source::Url(url) => {
                let bytes = self.fetcher.fetch(&url).await?;
                if is_archive_url(&url) {
                    parse_blocking(bytes).await.map(Payload::Bundle)
                } else {
                    serde_json::from_slice(&bytes)
                        .map(Payload::Document)
                        .map_err(|e| BundleError::MalformedManifest {
                            entry: url,
                            reason: e.to_string(),
                        })
                }
            }
        }
    }

    fn finish_load(
        &self,
        token: LoadToken,
        operation: Operation,
        subject: String,
        payload: Result<Payload, BundleError>,
    ) -> Result<LoadOutcome, OperationError> {
        let mut guard = self.inner.lock();
        if guard.destroyed {
            debug!("{:?} finished after destroy; dropped", token);
            return Ok(LoadOutcome::Cancelled);
        }
        if !guard.session.is_current(token) {
            debug!("{:?} superseded; dropped", token);
            return Ok(LoadOutcome::Superseded);
        }

        let inner = &mut *guard;
        let followups = match payload {
            Err(err) => {
                inner.session.abort_load(token);
                drop(guard);
                return Err(self.report(OperationError::new(operation, subject, err)));
            }
            Ok(Payload::Bundle(bundle)) => {
                inner
                    .session
                    .commit_bundle(token, bundle, inner.engine.as_mut());
                inner.apply_initial_selection()
            }
            Ok(Payload::Document(document)) => {
                inner
                    .session
                    .commit_document(token, &document, inner.engine.as_mut());
                Vec::new()
            }
        };
        if inner.config.autoplay {
            inner.engine.play();
        }
        let on_load = inner.on_load.clone();
        drop(guard);

        for err in followups {
            self.report(err);
        }
        if let Some(callback) = on_load {
            callback();
        }
        Ok(LoadOutcome::Loaded)
    }

    // ---- selections ----

    fn with_session<T>(
        &self,
        f: impl FnOnce(&mut BundleSession, &mut dyn PlaybackEngine) -> Result<T, OperationError>,
    ) -> Result<T, OperationError> {
        let result = {
            let mut guard = self.inner.lock();
            let inner = &mut *guard;
            f(&mut inner.session, inner.engine.as_mut())
        };
        result.map_err(|err| self.report(err))
    }

    pub fn select_animation(&self, index: usize) -> Result<(), OperationError> {
        self.with_session(|session, engine| session.select_animation(index, engine))
    }

    pub fn set_theme(&self, name: &str) -> Result<ThemeEffect, OperationError> {
        self.with_session(|session, engine| session.set_theme(name, engine))
    }

    pub fn set_marker(&self, name: &str) -> Result<FrameTarget, OperationError> {
        self.with_session(|session, engine| session.set_marker(name, engine))
    }

    // ---- queries ----

    pub fn state(&self) -> SessionState {
        self.inner.lock().session.state()
    }

    pub fn list_themes(&self) -> Vec<String> {
        self.inner.lock().session.list_themes()
    }

    pub fn list_markers(&self) -> Vec<String> {
        self.inner.lock().session.list_markers()
    }

    pub fn list_states(&self) -> Vec<String> {
        self.inner.lock().session.list_states()
    }

    pub fn active_animation(&self) -> Option<usize> {
        self.inner.lock().session.active_animation()
    }

    pub fn active_theme(&self) -> Option<String> {
        self.inner.lock().session.active_theme().map(str::to_string)
    }

    pub fn active_marker(&self) -> Option<String> {
        self.inner.lock().session.active_marker().map(str::to_string)
    }

    /// Entries skipped while parsing the current bundle.
    pub fn warnings(&self) -> Vec<BundleWarning> {
        self.inner
            .lock()
            .session
            .bundle()
            .map(|b| b.warnings.clone())
            .unwrap_or_default()
    }

    /// Snapshot of the current bundle. The lock is released before return,
    /// so the copy can be inspected while calling back into the player.
    pub fn bundle(&self) -> Option<Bundle> {
        self.inner.lock().session.bundle().cloned()
    }

    pub fn config(&self) -> PlayerConfig {
        self.inner.lock().config.clone()
    }

    pub fn is_destroyed(&self) -> bool {
        self.inner.lock().destroyed
    }

    // ---- transport ----

    fn with_engine(&self, f: impl FnOnce(&mut Inner)) {
        let mut inner = self.inner.lock();
        if !inner.destroyed {
            f(&mut *inner);
        }
    }

    pub fn play(&self) {
        self.with_engine(|inner| inner.engine.play());
    }

    pub fn pause(&self) {
        self.with_engine(|inner| inner.engine.pause());
    }

    pub fn stop(&self) {
        self.with_engine(|inner| inner.engine.stop());
    }

    pub fn set_speed(&self, speed: f64) -> Result<(), OperationError> {
        if !speed.is_finite() || speed <= 0.0 {
            let err = BundleError::InvalidConfig {
                reason: format!("speed must be a positive number, got {speed}"),
            };
            return Err(self.report(OperationError::new(
                Operation::SetSpeed,
                speed.to_string(),
                err,
            )));
        }
        self.with_engine(|inner| {
            inner.config.speed = speed;
            inner.engine.set_speed(speed);
        });
        Ok(())
    }

    pub fn set_direction(&self, direction: Direction) {
        self.with_engine(|inner| {
            inner.config.direction = direction;
            inner.engine.set_direction(direction);
        });
    }

    /// Tear down the engine and drop the bundle. Loads still in flight
    /// complete as [`LoadOutcome::Cancelled`]. Safe to call repeatedly.
    pub fn destroy(&self) {
        let mut inner = self.inner.lock();
        if inner.destroyed {
            return;
        }
        inner.destroyed = true;
        inner.session.clear();
        inner.engine.destroy();
        inner.on_error = None;
        inner.on_load = None;
        debug!("player destroyed");
    }
}

/// Parse on tokio's blocking pool when a runtime is driving this future,
/// otherwise on the polling thread.
async fn parse_blocking(bytes: Vec<u8>) -> Result<Bundle, BundleError> {
    match tokio::runtime::Handle::try_current() {
        Ok(handle) => handle
            .spawn_blocking(move || container::parse(&bytes))
            .await
            .map_err(|e| BundleError::Task {
                reason: e.to_string(),
            })?,
        Err(_) => container::parse(&bytes),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn archive_urls_by_path_extension() {
        assert!(is_archive_url("https://cdn.example.com/anim.lottie"));
        assert!(is_archive_url("https://cdn.example.com/ANIM.LOTTIE?v=3"));
        assert!(is_archive_url("/local/anim.lottie#frame=2"));
        assert!(!is_archive_url("https://cdn.example.com/anim.json"));
        assert!(!is_archive_url("https://cdn.example.com/anim.json?name=x.lottie"));
        assert!(!is_archive_url("lottie"));
        assert!(!is_archive_url(""));
    }

    #[test]
    fn sources_name_their_operation() {
        let bytes = Source::from(vec![0u8; 4]);
        assert_eq!(bytes.operation(), Operation::LoadFromBytes);
        assert_eq!(bytes.subject(), "<4 bytes>");

        let url = Source::url("https://example.com/a.lottie");
        assert_eq!(url.operation(), Operation::LoadFrom);
        assert_eq!(url.subject(), "https://example.com/a.lottie");

        assert_eq!(Source::from(json!({})).subject(), "<document>");
    }
}
