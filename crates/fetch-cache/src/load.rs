use std::ffi::OsString;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error, info};

use crate::decompress::is_gzip;
use crate::error::Corruption;
use crate::{CacheError, Decompression};

/// Suffix appended to files that failed to parse.
pub const QUARANTINE_SUFFIX: &str = ".corrupted";

/// `<path>.corrupted`
pub fn quarantine_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(QUARANTINE_SUFFIX);
    PathBuf::from(name)
}

/// Reads cached files back into structured data.
#[derive(Debug, Clone)]
pub struct Loader {
    decompression: Decompression,
}

impl Loader {
    pub fn new(decompression: Decompression) -> Self {
        Self { decompression }
    }

    pub fn decompression(&self) -> &Decompression {
        &self.decompression
    }

    /// Load and parse the JSON document at `path`, decompressing it first if
    /// it is gzipped.
    ///
    /// A file whose gzip stream is broken or whose contents do not parse is
    /// moved to `<path>.corrupted` before [`CacheError::CorruptCache`] is
    /// returned, so the next fetch for the same path starts from an empty
    /// slot.
    pub fn load(&self, path: &Path) -> Result<Value, CacheError> {
        debug!("About to load {}.", path.display());

        let data = match self.read_payload(path) {
            Ok(data) => data,
            Err(CacheError::Decompress { message, .. }) => {
                return Err(quarantine(path, Corruption::Gzip(message)));
            }
            Err(e) => return Err(e),
        };

        match serde_json::from_slice(&data) {
            Ok(value) => Ok(value),
            Err(source) => Err(quarantine(path, Corruption::Json(source))),
        }
    }

    /// Load the document at `path` and deserialize it into `T`.
    ///
    /// Only a document that is not valid JSON is quarantined; valid JSON of
    /// the wrong shape is reported as [`CacheError::Decode`] and left alone.
    pub fn load_as<T: DeserializeOwned>(&self, path: &Path) -> Result<T, CacheError> {
        let value = self.load(path)?;
        serde_json::from_value(value).map_err(|source| CacheError::Decode {
            path: path.to_path_buf(),
            source,
        })
    }

    /// The file's bytes with any gzip compression undone.
    fn read_payload(&self, path: &Path) -> Result<Vec<u8>, CacheError> {
        let mut file = File::open(path).map_err(|e| CacheError::io(path, e))?;

        let mut magic = [0u8; 2];
        let sniffed = read_prefix(&mut file, &mut magic).map_err(|e| CacheError::io(path, e))?;
        file.seek(SeekFrom::Start(0))
            .map_err(|e| CacheError::io(path, e))?;

        if is_gzip(&magic[..sniffed]) {
            debug!("{} is gzip compressed", path.display());
            return self.decompression.decompress(path, file);
        }

        let mut data = Vec::new();
        file.read_to_end(&mut data)
            .map_err(|e| CacheError::io(path, e))?;
        Ok(data)
    }
}

/// Fill as much of `buf` as the file allows; returns the number of bytes read.
fn read_prefix(file: &mut File, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match file.read(&mut buf[filled..])? {
            0 => break,
            n => filled += n,
        }
    }
    Ok(filled)
}

fn quarantine(path: &Path, source: Corruption) -> CacheError {
    error!("{}: {source}", path.display());
    let target = quarantine_path(path);

    // rename replaces an existing target on every supported platform
    if let Err(e) = std::fs::rename(path, &target) {
        error!(
            "Could not move {} to {}: {e}; the invalid file is still in place",
            path.display(),
            target.display()
        );
        return CacheError::io(path, e);
    }

    error!("The file on-disk does not have valid data");
    info!(
        "We have moved {} to {} for inspection.",
        path.display(),
        target.display()
    );

    CacheError::CorruptCache {
        path: path.to_path_buf(),
        quarantine_path: target,
        source,
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use flate2::Compression;
    use flate2::write::GzEncoder;
    use serde::Deserialize;
    use serde_json::json;

    use super::*;

    fn loader() -> Loader {
        Loader::new(Decompression::Native)
    }

    fn gzip(data: &[u8]) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn quarantine_path_appends_suffix() {
        assert_eq!(
            quarantine_path(Path::new("/cache/x.json")),
            PathBuf::from("/cache/x.json.corrupted")
        );
    }

    #[test]
    fn loads_plain_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plain.json");
        std::fs::write(&path, r#"{"a":1,"b":[true,null]}"#).unwrap();

        let value = loader().load(&path).unwrap();

        assert_eq!(value, json!({"a": 1, "b": [true, null]}));
    }

    #[test]
    fn loads_gzipped_json_to_same_value() {
        let dir = tempfile::tempdir().unwrap();
        let doc = br#"{"builds":[{"id":7,"result":"success"}]}"#;
        let plain = dir.path().join("plain.json");
        let packed = dir.path().join("packed.json");
        std::fs::write(&plain, doc).unwrap();
        std::fs::write(&packed, gzip(doc)).unwrap();

        assert_eq!(
            loader().load(&plain).unwrap(),
            loader().load(&packed).unwrap()
        );
    }

    #[test]
    fn loads_single_byte_scalar() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("one.json");
        std::fs::write(&path, "7").unwrap();

        assert_eq!(loader().load(&path).unwrap(), json!(7));
    }

    #[test]
    fn malformed_file_is_quarantined() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        let original = b"{\"a\": 1,,}";
        std::fs::write(&path, original).unwrap();

        let err = loader().load(&path).unwrap_err();

        let expected = dir.path().join("broken.json.corrupted");
        match &err {
            CacheError::CorruptCache {
                path: reported,
                quarantine_path,
                ..
            } => {
                assert_eq!(reported, &path);
                assert_eq!(quarantine_path, &expected);
            }
            other => panic!("expected CorruptCache, got {other:?}"),
        }
        assert!(!path.exists());
        assert_eq!(std::fs::read(&expected).unwrap(), original);
    }

    #[test]
    fn malformed_gzip_payload_is_quarantined_compressed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json.gz");
        let original = gzip(b"not json at all");
        std::fs::write(&path, &original).unwrap();

        let err = loader().load(&path).unwrap_err();

        assert!(err.is_corrupt_cache());
        assert!(!path.exists());
        assert_eq!(std::fs::read(quarantine_path(&path)).unwrap(), original);
    }

    #[test]
    fn truncated_gzip_is_quarantined() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("x.json");
        let packed = gzip(br#"{"key":"a value long enough to be split in two"}"#);
        let truncated = &packed[..packed.len() / 2];
        std::fs::write(&path, truncated).unwrap();

        let err = loader().load(&path).unwrap_err();

        match &err {
            CacheError::CorruptCache {
                quarantine_path: moved,
                source: Corruption::Gzip(_),
                ..
            } => assert_eq!(moved, &quarantine_path(&path)),
            other => panic!("expected gzip CorruptCache, got {other:?}"),
        }
        assert!(!path.exists());
        assert_eq!(std::fs::read(quarantine_path(&path)).unwrap(), truncated);
    }

    #[cfg(unix)]
    #[test]
    fn failed_quarantine_reports_io_and_keeps_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stuck.json");
        std::fs::write(&path, "{broken").unwrap();
        // a non-empty directory cannot be replaced by a file
        let blocker = quarantine_path(&path);
        std::fs::create_dir(&blocker).unwrap();
        std::fs::write(blocker.join("keep"), "x").unwrap();

        let err = loader().load(&path).unwrap_err();

        assert!(matches!(err, CacheError::Io { .. }));
        assert!(path.exists());
    }

    #[test]
    fn quarantine_replaces_previous_copy() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("again.json");
        std::fs::write(quarantine_path(&path), "old junk").unwrap();
        std::fs::write(&path, "new junk").unwrap();

        let err = loader().load(&path).unwrap_err();

        assert!(err.is_corrupt_cache());
        assert_eq!(
            std::fs::read_to_string(quarantine_path(&path)).unwrap(),
            "new junk"
        );
    }

    #[test]
    fn empty_file_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.json");
        std::fs::write(&path, "").unwrap();

        assert!(loader().load(&path).unwrap_err().is_corrupt_cache());
        assert!(!path.exists());
    }

    #[test]
    fn missing_file_is_io_error_without_quarantine() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");

        let err = loader().load(&path).unwrap_err();

        assert!(matches!(err, CacheError::Io { .. }));
        assert!(!quarantine_path(&path).exists());
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Build {
        id: u64,
        result: String,
    }

    #[test]
    fn load_as_deserializes_typed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("build.json");
        std::fs::write(&path, r#"{"id":3,"result":"busted"}"#).unwrap();

        let build: Build = loader().load_as(&path).unwrap();

        assert_eq!(
            build,
            Build {
                id: 3,
                result: "busted".into()
            }
        );
    }

    #[test]
    fn load_as_shape_mismatch_keeps_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shape.json");
        std::fs::write(&path, r#"{"id":"not a number"}"#).unwrap();

        let err = loader().load_as::<Build>(&path).unwrap_err();

        assert!(matches!(err, CacheError::Decode { .. }));
        assert!(path.exists());
        assert!(!quarantine_path(&path).exists());
    }
}
