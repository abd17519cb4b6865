pub mod fetcher;
pub mod outcome;

pub use fetcher::{CHUNK_SIZE, CachedFetcher, FetcherConfig};
pub use outcome::FetchOutcome;
