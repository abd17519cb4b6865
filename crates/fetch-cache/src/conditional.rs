use std::path::Path;
use std::time::SystemTime;

use chrono::{DateTime, Utc};

use crate::{CacheError, CachedResource};

/// Timestamp layout used for `If-Modified-Since`.
pub const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Transport encoding requested on every fetch. Compressed payloads are
/// stored as-is and undone by the loader, never by the HTTP layer.
const IDENTITY_ENCODING: &str = "identity";

/// Format a timestamp as an HTTP date in GMT.
pub fn format_http_date(time: SystemTime) -> String {
    DateTime::<Utc>::from(time).format(HTTP_DATE_FORMAT).to_string()
}

/// Request settings derived from whatever is currently cached at a path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConditionalRequest {
    /// Set only when a cached copy exists.
    pub if_modified_since: Option<String>,
}

impl ConditionalRequest {
    /// An unconditional request.
    pub fn unconditional() -> Self {
        Self::default()
    }

    /// Build the request for a cached resource snapshot.
    pub fn for_resource(resource: &CachedResource) -> Self {
        Self {
            if_modified_since: resource.modified.map(format_http_date),
        }
    }

    /// Inspect `path` and build the matching request.
    pub fn for_path(path: &Path) -> Result<Self, CacheError> {
        let resource = CachedResource::inspect(path)?;
        Ok(Self::for_resource(&resource))
    }

    pub fn is_conditional(&self) -> bool {
        self.if_modified_since.is_some()
    }

    pub fn accept_encoding(&self) -> &'static str {
        IDENTITY_ENCODING
    }

    /// Header name/value pairs to attach to the GET.
    pub fn headers(&self) -> Vec<(&'static str, String)> {
        let mut headers = vec![("Accept-Encoding", self.accept_encoding().to_owned())];
        if let Some(since) = &self.if_modified_since {
            headers.push(("If-Modified-Since", since.clone()));
        }
        headers
    }
}
