//! Test doubles shared by the integration tests.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use dotlottie_bundle_core::{Direction, FetchError, Fetcher, PlaybackEngine, PlayerConfig, ThemeEffect};
use parking_lot::Mutex;
use tokio::sync::oneshot;

/// One call received by [`RecordingEngine`].
#[derive(Debug, Clone, PartialEq)]
pub enum EngineCall {
    Configure,
    Load(serde_json::Value),
    Theme(String),
    Seek(f64),
    Play,
    Pause,
    Stop,
    Speed(f64),
    Direction(Direction),
    Destroy,
}

/// Engine that appends every call to a shared log.
#[derive(Clone, Default)]
pub struct RecordingEngine {
    calls: Arc<Mutex<Vec<EngineCall>>>,
}

impl RecordingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<EngineCall> {
        self.calls.lock().clone()
    }

    /// Calls after construction-time configuration.
    pub fn calls_since_configure(&self) -> Vec<EngineCall> {
        self.calls
            .lock()
            .iter()
            .filter(|c| **c != EngineCall::Configure)
            .cloned()
            .collect()
    }

    pub fn loads(&self) -> Vec<serde_json::Value> {
        self.calls
            .lock()
            .iter()
            .filter_map(|c| match c {
                EngineCall::Load(doc) => Some(doc.clone()),
                _ => None,
            })
            .collect()
    }

    fn push(&self, call: EngineCall) {
        self.calls.lock().push(call);
    }
}

impl PlaybackEngine for RecordingEngine {
    fn configure(&mut self, _config: &PlayerConfig) {
        self.push(EngineCall::Configure);
    }
    fn load(&mut self, document: &serde_json::Value) {
        self.push(EngineCall::Load(document.clone()));
    }
    fn apply_theme_effect(&mut self, effect: &ThemeEffect) {
        self.push(EngineCall::Theme(effect.name.clone()));
    }
    fn seek_to_frame(&mut self, frame: f64) {
        self.push(EngineCall::Seek(frame));
    }
    fn play(&mut self) {
        self.push(EngineCall::Play);
    }
    fn pause(&mut self) {
        self.push(EngineCall::Pause);
    }
    fn stop(&mut self) {
        self.push(EngineCall::Stop);
    }
    fn set_speed(&mut self, speed: f64) {
        self.push(EngineCall::Speed(speed));
    }
    fn set_direction(&mut self, direction: Direction) {
        self.push(EngineCall::Direction(direction));
    }
    fn destroy(&mut self) {
        self.push(EngineCall::Destroy);
    }
}

/// Serves fixed bodies; unknown URLs fail like a 404.
#[derive(Default)]
pub struct StaticFetcher {
    bodies: HashMap<String, Vec<u8>>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, url: &str, body: Vec<u8>) -> Self {
        self.bodies.insert(url.to_string(), body);
        self
    }
}

#[async_trait]
impl Fetcher for StaticFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        self.bodies
            .get(url)
            .cloned()
            .ok_or_else(|| FetchError::new(url, "404 Not Found"))
    }
}

/// Holds each response until the test releases it through the gate sender.
#[derive(Default)]
pub struct GatedFetcher {
    gates: Mutex<HashMap<String, oneshot::Receiver<Vec<u8>>>>,
}

impl GatedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn gate(&self, url: &str) -> oneshot::Sender<Vec<u8>> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().insert(url.to_string(), rx);
        tx
    }
}

#[async_trait]
impl Fetcher for GatedFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let rx = self.gates.lock().remove(url);
        match rx {
            Some(rx) => rx.await.map_err(|_| FetchError::new(url, "gate dropped")),
            None => Err(FetchError::new(url, "no gate registered")),
        }
    }
}
