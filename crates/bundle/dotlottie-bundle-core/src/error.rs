//! Error types for bundle loading and resolution

use serde::{Deserialize, Serialize};

use crate::archive::{ArchiveError, ArchiveErrorKind};
use crate::session::SessionState;

/// Everything that can go wrong between raw bytes and the playback engine.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum BundleError {
    /// Bytes are not a readable zip container
    #[error("Corrupt archive: {reason}")]
    CorruptArchive { reason: String },

    /// Named entry is missing from the archive
    #[error("Entry not found: {entry}")]
    EntryNotFound { entry: String },

    /// Archive holds no usable animation document
    #[error("No animation found in archive")]
    NoAnimationFound,

    /// A located document is not valid structured data
    #[error("Malformed entry {entry}: {reason}")]
    MalformedManifest { entry: String, reason: String },

    /// Theme name is not part of the loaded bundle
    #[error("Theme not found: {name}")]
    ThemeNotFound { name: String },

    /// Marker name is not part of the loaded bundle
    #[error("Marker not found: {name}")]
    MarkerNotFound { name: String },

    /// Marker lies outside the active animation's frame bounds
    #[error("Marker {name} at frame {frame} is out of range [{min}, {max}]")]
    MarkerOutOfRange {
        name: String,
        frame: f64,
        min: f64,
        max: f64,
    },

    /// Animation index outside the bundle
    #[error("Animation index {index} is out of range (len {len})")]
    IndexOutOfRange { index: usize, len: usize },

    /// Fetch layer failure, reported unchanged
    #[error("Network failure for {url}: {reason}")]
    NetworkFailure { url: String, reason: String },

    /// Operation requires a loaded bundle
    #[error("Session is not ready (state: {state:?})")]
    SessionNotReady { state: SessionState },

    /// Player configuration rejected
    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    /// Background parse task did not complete
    #[error("Load task failed: {reason}")]
    Task { reason: String },
}

impl BundleError {
    /// Check if the session stays usable after this error
    #[inline]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::ThemeNotFound { .. }
                | Self::MarkerNotFound { .. }
                | Self::MarkerOutOfRange { .. }
                | Self::IndexOutOfRange { .. }
                | Self::SessionNotReady { .. }
                | Self::NetworkFailure { .. }
        )
    }

    /// Get error category for logging
    #[inline]
    pub fn category(&self) -> &'static str {
        match self {
            Self::CorruptArchive { .. } | Self::EntryNotFound { .. } => "archive",
            Self::NoAnimationFound | Self::MalformedManifest { .. } => "container",
            Self::ThemeNotFound { .. }
            | Self::MarkerNotFound { .. }
            | Self::MarkerOutOfRange { .. }
            | Self::IndexOutOfRange { .. } => "resolution",
            Self::NetworkFailure { .. } => "network",
            Self::SessionNotReady { .. } => "session",
            Self::InvalidConfig { .. } => "config",
            Self::Task { .. } => "task",
        }
    }
}

impl From<ArchiveError> for BundleError {
    fn from(err: ArchiveError) -> Self {
        match err.kind() {
            ArchiveErrorKind::EntryNotFound(entry) => BundleError::EntryNotFound {
                entry: entry.clone(),
            },
            _ => BundleError::CorruptArchive {
                reason: err.to_string(),
            },
        }
    }
}

/// Public operations that surface errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    LoadFrom,
    LoadFromBytes,
    SelectAnimation,
    SetTheme,
    SetMarker,
    SetSpeed,
}

impl Operation {
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Self::LoadFrom => "load_from",
            Self::LoadFromBytes => "load_from_bytes",
            Self::SelectAnimation => "select_animation",
            Self::SetTheme => "set_theme",
            Self::SetMarker => "set_marker",
            Self::SetSpeed => "set_speed",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// An error tagged with the failing operation and the identifier it was
/// called with (archive URL, theme or marker name, animation index).
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("{operation}({subject}) failed: {source}")]
pub struct OperationError {
    pub operation: Operation,
    pub subject: String,
    #[source]
    pub source: BundleError,
}

impl OperationError {
    pub fn new(operation: Operation, subject: impl Into<String>, source: BundleError) -> Self {
        Self {
            operation,
            subject: subject.into(),
            source,
        }
    }

    /// The underlying error kind
    #[inline]
    pub fn kind(&self) -> &BundleError {
        &self.source
    }
}
