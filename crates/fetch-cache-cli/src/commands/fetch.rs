use anyhow::{Context, Result};
use fetch_cache::{NoProgress, Progress};
use fetch_cache_http::CachedFetcher;

use super::format;
use crate::progress::BarProgress;

pub async fn run(
    fetcher: &CachedFetcher,
    name: &str,
    url: &str,
    compact: bool,
    quiet: bool,
) -> Result<()> {
    let mut progress: Box<dyn Progress> = if quiet {
        Box::new(NoProgress)
    } else {
        Box::new(BarProgress::new())
    };

    let value = fetcher
        .fetch(name, url, progress.as_mut())
        .await
        .with_context(|| format!("failed to fetch {name} from {url}"))?;

    format::print_document(&value, compact)
}
