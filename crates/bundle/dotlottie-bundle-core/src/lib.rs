//! dotLottie bundle core (engine-agnostic)
//!
//! Turns `.lottie` archives into an in-memory bundle (animations, themes,
//! markers, states), tracks a player's active selections, and resolves
//! theme/marker names into commands for a host-supplied playback engine.
//! Rendering, frame stepping, and UI bindings live on the other side of
//! [`PlaybackEngine`].

pub mod archive;
pub mod config;
pub mod container;
pub mod data;
pub mod engine;
pub mod error;
pub mod fetch;
pub mod ids;
pub mod overlay;
pub mod player;
pub mod session;

// Re-exports for consumers (adapters)
pub use config::{Direction, PlayerConfig, Renderer};
pub use container::parse;
pub use data::{
    AnimationDocument, Bundle, BundleWarning, FrameBounds, Manifest, MarkerDefinition,
    StateDefinition, ThemeDefinition, WarningKind,
};
pub use engine::PlaybackEngine;
pub use error::{BundleError, Operation, OperationError};
#[cfg(feature = "http")]
pub use fetch::HttpFetcher;
pub use fetch::{FetchError, Fetcher, NoFetcher};
pub use ids::LoadToken;
pub use overlay::{resolve_marker, resolve_theme, FrameTarget, ThemeEffect};
pub use player::{is_archive_url, DotLottiePlayer, LoadOutcome, Source};
pub use session::{BundleSession, SessionState};

/// Result type for bundle operations
pub type Result<T> = std::result::Result<T, BundleError>;
