use anyhow::Result;
use fetch_cache::CacheResolver;

pub fn run(resolver: &CacheResolver, name: &str) -> Result<()> {
    println!("{}", resolver.resolve(name)?.display());
    Ok(())
}
