pub mod conditional;
pub mod decompress;
pub mod error;
pub mod load;
pub mod progress;
pub mod resolve;

pub use conditional::{ConditionalRequest, HTTP_DATE_FORMAT, format_http_date};
pub use decompress::{Decompression, DecompressionMode, GZIP_MAGIC};
pub use error::{CacheError, Corruption};
pub use load::{Loader, QUARANTINE_SUFFIX, quarantine_path};
pub use progress::{NoProgress, Progress};
pub use resolve::{CacheResolver, CachedResource};

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
