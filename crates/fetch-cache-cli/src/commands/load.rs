use anyhow::{Context, Result};
use fetch_cache::{CacheResolver, Loader};

use super::format;

/// Print the cached copy of `name` without touching the network.
pub fn run(resolver: &CacheResolver, loader: &Loader, name: &str, compact: bool) -> Result<()> {
    let path = resolver.resolve(name)?;
    let value = loader
        .load(&path)
        .with_context(|| format!("failed to load cached {name}"))?;

    format::print_document(&value, compact)
}
