/// Error type for archive operations
#[derive(Debug)]
pub struct ArchiveError {
    kind: ArchiveErrorKind,
}

impl ArchiveError {
    /// Returns the specific kind of error
    pub fn kind(&self) -> &ArchiveErrorKind {
        &self.kind
    }
}

impl From<ArchiveErrorKind> for ArchiveError {
    fn from(kind: ArchiveErrorKind) -> Self {
        ArchiveError { kind }
    }
}

impl From<std::io::Error> for ArchiveError {
    fn from(error: std::io::Error) -> Self {
        ArchiveError {
            kind: ArchiveErrorKind::Io(error),
        }
    }
}

/// Specific kind of archive error
#[derive(Debug)]
pub enum ArchiveErrorKind {
    /// IO error while decompressing an entry
    Io(std::io::Error),
    /// Error from ZIP archive processing
    Zip(rawzip::Error),
    /// No entry with the requested path
    EntryNotFound(String),
    /// Entry uses a compression method other than store or deflate
    UnsupportedCompression { entry: String, method: String },
    /// Entry content is not UTF-8 text
    InvalidUtf8(String),
}

impl std::error::Error for ArchiveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.kind {
            ArchiveErrorKind::Io(err) => Some(err),
            ArchiveErrorKind::Zip(err) => Some(err),
            _ => None,
        }
    }
}

impl std::fmt::Display for ArchiveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            ArchiveErrorKind::Io(err) => write!(f, "IO error: {}", err),
            ArchiveErrorKind::Zip(err) => write!(f, "Zip error: {}", err),
            ArchiveErrorKind::EntryNotFound(entry) => write!(f, "Zip missing entry: {}", entry),
            ArchiveErrorKind::UnsupportedCompression { entry, method } => {
                write!(f, "Zip entry {} uses unsupported compression {}", entry, method)
            }
            ArchiveErrorKind::InvalidUtf8(entry) => write!(f, "Zip entry {} is not UTF-8", entry),
        }
    }
}
