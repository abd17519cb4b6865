use std::path::{Path, PathBuf};
use std::time::Duration;

use fetch_cache::{
    CacheError, CacheResolver, ConditionalRequest, Decompression, DecompressionMode, Loader,
    Progress,
};
use reqwest::StatusCode;
use reqwest::header::CONTENT_LENGTH;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use crate::FetchOutcome;

/// Bytes written (and reported to progress) per step while saving a body.
pub const CHUNK_SIZE: usize = 10 * 1024;

/// Configuration for a [`CachedFetcher`].
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    /// Cache root for relative resource names. `None` uses the per-user
    /// cache directory.
    pub cache_root: Option<PathBuf>,
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
    pub decompression: DecompressionMode,
    pub user_agent: String,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            cache_root: None,
            connect_timeout: Duration::from_secs(8),
            read_timeout: Duration::from_secs(24),
            decompression: DecompressionMode::Auto,
            user_agent: concat!("fetch-cache/", env!("CARGO_PKG_VERSION")).to_owned(),
        }
    }
}

/// Fetches remote JSON documents into a local cache, re-downloading only
/// when the server reports a change.
///
/// Holds no mutable state; one instance can serve concurrent fetches of
/// distinct resources.
pub struct CachedFetcher {
    client: reqwest::Client,
    resolver: CacheResolver,
    loader: Loader,
}

impl CachedFetcher {
    pub fn new(config: FetcherConfig) -> Result<Self, CacheError> {
        let resolver = match config.cache_root {
            Some(root) => CacheResolver::new(root),
            None => CacheResolver::user_default()?,
        };
        let loader = Loader::new(Decompression::from_mode(config.decompression)?);

        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .read_timeout(config.read_timeout)
            .user_agent(config.user_agent)
            .build()
            .map_err(|e| CacheError::HttpClient(e.to_string()))?;

        Ok(Self {
            client,
            resolver,
            loader,
        })
    }

    pub fn resolver(&self) -> &CacheResolver {
        &self.resolver
    }

    pub fn loader(&self) -> &Loader {
        &self.loader
    }

    /// Bring the cached copy of `name` up to date with `url` and return its
    /// parsed contents.
    pub async fn fetch(
        &self,
        name: &str,
        url: &str,
        progress: &mut dyn Progress,
    ) -> Result<Value, CacheError> {
        let path = self.resolver.resolve(name)?;
        self.download(&path, url, progress).await?;
        self.loader.load(&path)
    }

    /// Like [`fetch`](Self::fetch), deserializing into `T`.
    pub async fn fetch_as<T: DeserializeOwned>(
        &self,
        name: &str,
        url: &str,
        progress: &mut dyn Progress,
    ) -> Result<T, CacheError> {
        let path = self.resolver.resolve(name)?;
        self.download(&path, url, progress).await?;
        self.loader.load_as(&path)
    }

    /// Issue the conditional GET for `path` and save a changed body over it.
    ///
    /// Any status besides 200 and 304 fails without touching the file.
    pub async fn download(
        &self,
        path: &Path,
        url: &str,
        progress: &mut dyn Progress,
    ) -> Result<FetchOutcome, CacheError> {
        let conditional = ConditionalRequest::for_path(path)?;

        match &conditional.if_modified_since {
            Some(since) => debug!("{} was last modified at {since}", path.display()),
            None => debug!("We have not been able to find {} on disk.", path.display()),
        }

        let mut req = self.client.get(url);
        for (name, value) in conditional.headers() {
            req = req.header(name, value);
        }

        let response = req.send().await.map_err(|e| network_error(url, e))?;

        match response.status() {
            StatusCode::OK => {
                if let Some(since) = &conditional.if_modified_since {
                    debug!("The local file was last modified at {since}. We need to fetch it again.");
                }
                debug!("About to fetch {} from {}", path.display(), response.url());

                let bytes = save_body(response, path, url, progress).await?;
                Ok(FetchOutcome::Updated { bytes })
            }
            StatusCode::NOT_MODIFIED => {
                debug!("{} is on disk and it is current.", path.display());
                Ok(FetchOutcome::NotModified)
            }
            status => Err(CacheError::FetchFailed {
                url: url.to_owned(),
                status: status.as_u16(),
            }),
        }
    }
}

fn network_error(url: &str, e: reqwest::Error) -> CacheError {
    CacheError::Network {
        url: url.to_owned(),
        message: e.to_string(),
    }
}

fn content_length(response: &reqwest::Response) -> Option<u64> {
    let header = response.headers().get(CONTENT_LENGTH)?;
    let parsed = header.to_str().ok()?.trim().parse().ok();
    if parsed.is_none() {
        warn!("ignoring unparsable Content-Length {header:?}");
    }
    parsed
}

/// Stream the body over `path`, truncating whatever was there.
///
/// A transfer that breaks off midway removes the partial file so the next
/// call requests the resource unconditionally.
async fn save_body(
    response: reqwest::Response,
    path: &Path,
    url: &str,
    progress: &mut dyn Progress,
) -> Result<u64, CacheError> {
    let total = content_length(&response);
    if total.is_none() {
        warn!("{url} sent no Content-Length; progress size is unknown");
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| io_error(parent, e))?;
    }

    let label = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let mut file = tokio::fs::File::create(path)
        .await
        .map_err(|e| io_error(path, e))?;

    progress.start(&label, total);
    let written = match write_chunks(response, &mut file, path, url, progress).await {
        Ok(written) => written,
        Err(e) => {
            drop(file);
            if let Err(cleanup) = tokio::fs::remove_file(path).await {
                warn!(
                    "could not remove partial download {}: {cleanup}",
                    path.display()
                );
            }
            return Err(e);
        }
    };
    progress.finish();

    Ok(written)
}

async fn write_chunks(
    mut response: reqwest::Response,
    file: &mut tokio::fs::File,
    path: &Path,
    url: &str,
    progress: &mut dyn Progress,
) -> Result<u64, CacheError> {
    let mut written = 0u64;

    while let Some(chunk) = response.chunk().await.map_err(|e| network_error(url, e))? {
        // empty keep-alive chunks yield no pieces
        for piece in chunk.chunks(CHUNK_SIZE) {
            file.write_all(piece).await.map_err(|e| io_error(path, e))?;
            written += piece.len() as u64;
            progress.update(written);
        }
    }

    file.flush().await.map_err(|e| io_error(path, e))?;
    Ok(written)
}

fn io_error(path: &Path, source: std::io::Error) -> CacheError {
    CacheError::Io {
        path: path.to_path_buf(),
        source,
    }
}
