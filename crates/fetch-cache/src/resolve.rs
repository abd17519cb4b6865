use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::CacheError;

/// Directory name used under the platform cache directory.
const CACHE_DIR_NAME: &str = "fetch-cache";

/// Maps resource names to locations under a cache root.
#[derive(Debug, Clone)]
pub struct CacheResolver {
    root: PathBuf,
}

impl CacheResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolver rooted at the per-user cache directory
    /// (e.g. `~/.cache/fetch-cache` on Linux).
    pub fn user_default() -> Result<Self, CacheError> {
        let base = dirs::cache_dir().ok_or(CacheError::NoCacheDir)?;
        Ok(Self::new(base.join(CACHE_DIR_NAME)))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a resource name to its on-disk path.
    ///
    /// Absolute names are returned unchanged. Relative names are joined onto
    /// the cache root, which is created (with any missing parents) first.
    /// Creating a root that already exists is not an error, so this is safe
    /// to call repeatedly and from several processes at once.
    pub fn resolve(&self, name: impl AsRef<Path>) -> Result<PathBuf, CacheError> {
        let name = name.as_ref();
        if name.is_absolute() {
            return Ok(name.to_path_buf());
        }

        std::fs::create_dir_all(&self.root).map_err(|e| CacheError::io(&self.root, e))?;
        Ok(self.root.join(name))
    }
}

/// A snapshot of what is currently cached at a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedResource {
    pub path: PathBuf,
    pub exists: bool,
    pub modified: Option<SystemTime>,
}

impl CachedResource {
    pub fn inspect(path: impl Into<PathBuf>) -> Result<Self, CacheError> {
        let path = path.into();
        match std::fs::metadata(&path) {
            Ok(meta) => {
                let modified = meta.modified().map_err(|e| CacheError::io(&path, e))?;
                Ok(Self {
                    path,
                    exists: true,
                    modified: Some(modified),
                })
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self {
                path,
                exists: false,
                modified: None,
            }),
            Err(e) => Err(CacheError::io(&path, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_name_lands_under_root() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = CacheResolver::new(dir.path().join("cache"));

        let path = resolver.resolve("x.json").unwrap();

        assert_eq!(path, dir.path().join("cache").join("x.json"));
        assert!(dir.path().join("cache").is_dir());
    }

    #[test]
    fn resolve_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = CacheResolver::new(dir.path().join("nested/deeper/cache"));

        let first = resolver.resolve("data.json").unwrap();
        let second = resolver.resolve("data.json").unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn absolute_name_is_returned_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("never-created");
        let resolver = CacheResolver::new(&root);
        let absolute = dir.path().join("elsewhere.json");

        let path = resolver.resolve(&absolute).unwrap();

        assert_eq!(path, absolute);
        assert!(!root.exists());
    }

    #[test]
    fn inspect_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let resource = CachedResource::inspect(dir.path().join("missing.json")).unwrap();

        assert!(!resource.exists);
        assert!(resource.modified.is_none());
    }

    #[test]
    fn inspect_reports_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("present.json");
        std::fs::write(&path, "{}").unwrap();

        let resource = CachedResource::inspect(&path).unwrap();

        assert!(resource.exists);
        assert!(resource.modified.is_some());
    }
}
