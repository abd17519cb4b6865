use anyhow::Result;
use fetch_cache::{
    CacheResolver, CachedResource, ConditionalRequest, format_http_date, quarantine_path,
};

pub fn run(resolver: &CacheResolver, name: &str) -> Result<()> {
    let path = resolver.resolve(name)?;
    let resource = CachedResource::inspect(&path)?;
    let request = ConditionalRequest::for_resource(&resource);

    println!("Path:              {}", resource.path.display());
    println!("Cached:            {}", if resource.exists { "yes" } else { "no" });

    if let Some(modified) = resource.modified {
        println!("Last modified:     {}", format_http_date(modified));
    }

    match &request.if_modified_since {
        Some(since) => println!("If-Modified-Since: {since}"),
        None => println!("If-Modified-Since: (unconditional fetch)"),
    }

    let quarantined = quarantine_path(&path);
    if quarantined.exists() {
        println!("Quarantined copy:  {}", quarantined.display());
    }

    Ok(())
}
