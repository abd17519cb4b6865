use std::path::PathBuf;

/// Why a cached file was quarantined.
#[derive(Debug, thiserror::Error)]
pub enum Corruption {
    #[error("invalid gzip stream: {0}")]
    Gzip(String),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors that can occur while resolving, fetching or loading a cached resource.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// The server answered with a status other than 200 or 304.
    #[error("fetching {url} returned unexpected HTTP {status}")]
    FetchFailed { url: String, status: u16 },

    /// The request never produced a usable response (connect, timeout, body read).
    #[error("network error fetching {url}: {message}")]
    Network { url: String, message: String },

    #[error(
        "`{tool}` is required to decompress cached files on this platform but was not found on PATH; install it and try again"
    )]
    ToolMissing { tool: String },

    #[error("cached file {} is corrupted; moved to {} for inspection", path.display(), quarantine_path.display())]
    CorruptCache {
        path: PathBuf,
        quarantine_path: PathBuf,
        #[source]
        source: Corruption,
    },

    #[error("failed to decompress {}: {message}", path.display())]
    Decompress { path: PathBuf, message: String },

    #[error("cached document {} does not match the expected shape: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not determine the user cache directory")]
    NoCacheDir,

    #[error("failed to initialise HTTP client: {0}")]
    HttpClient(String),
}

impl CacheError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Returns true for both failure modes of the network round-trip.
    pub fn is_fetch_failure(&self) -> bool {
        matches!(self, Self::FetchFailed { .. } | Self::Network { .. })
    }

    /// The HTTP status carried by a [`CacheError::FetchFailed`].
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::FetchFailed { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns true if the cached file was moved aside.
    pub fn is_corrupt_cache(&self) -> bool {
        matches!(self, Self::CorruptCache { .. })
    }
}
