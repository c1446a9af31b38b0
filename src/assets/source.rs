//! Asset byte sources and providers.
//!
//! [`AssetSource`] is the async-capable input to the asset server (paths,
//! in-memory buffers). [`AssetProvider`] is the synchronous, dyn-safe
//! interface the wardrobe uses to resolve an `asset_path` into bytes; the
//! host's asset-serving layer implements it however it routes files.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;

use crate::errors::AssetLoadError;

/// Something the asset server can fetch bytes from.
pub trait AssetSource {
    /// Identifier used for caching and log messages.
    fn uri(&self) -> Cow<'_, str>;

    /// Last path segment of the URI, when there is one.
    fn filename(&self) -> Option<Cow<'_, str>> {
        let uri = self.uri().into_owned();
        uri.rsplit('/')
            .next()
            .map(|s| Cow::Owned(s.to_string()))
    }

    /// Reads the full contents of the source.
    fn read(&self) -> impl Future<Output = Result<Vec<u8>, AssetLoadError>> + Send;
}

impl AssetSource for &Path {
    fn uri(&self) -> Cow<'_, str> {
        self.to_string_lossy()
    }

    async fn read(&self) -> Result<Vec<u8>, AssetLoadError> {
        Ok(tokio::fs::read(self).await?)
    }
}

impl AssetSource for PathBuf {
    fn uri(&self) -> Cow<'_, str> {
        self.to_string_lossy()
    }

    async fn read(&self) -> Result<Vec<u8>, AssetLoadError> {
        Ok(tokio::fs::read(self).await?)
    }
}

impl AssetSource for &str {
    fn uri(&self) -> Cow<'_, str> {
        Cow::Borrowed(self)
    }

    async fn read(&self) -> Result<Vec<u8>, AssetLoadError> {
        Ok(tokio::fs::read(Path::new(self)).await?)
    }
}

impl AssetSource for String {
    fn uri(&self) -> Cow<'_, str> {
        Cow::Borrowed(self.as_str())
    }

    async fn read(&self) -> Result<Vec<u8>, AssetLoadError> {
        Ok(tokio::fs::read(Path::new(self)).await?)
    }
}

/// An in-memory asset (freshly generated GLB, test fixtures).
#[derive(Debug, Clone)]
pub struct BytesSource {
    name: String,
    bytes: Vec<u8>,
}

impl BytesSource {
    #[must_use]
    pub fn new(name: &str, bytes: Vec<u8>) -> Self {
        Self {
            name: name.to_string(),
            bytes,
        }
    }
}

impl AssetSource for BytesSource {
    fn uri(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.name)
    }

    async fn read(&self) -> Result<Vec<u8>, AssetLoadError> {
        Ok(self.bytes.clone())
    }
}

/// Resolves wardrobe `asset_path`s to raw bytes.
///
/// Dyn-safe and synchronous: equipment assets are small and the attachment
/// runtime only touches them on an explicit look change.
pub trait AssetProvider {
    fn fetch(&self, path: &str) -> Result<Vec<u8>, AssetLoadError>;
}

/// Reads equipment assets from a base directory on disk.
#[derive(Debug, Clone)]
pub struct FileAssetProvider {
    base_dir: PathBuf,
}

impl FileAssetProvider {
    #[must_use]
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }
}

impl AssetProvider for FileAssetProvider {
    fn fetch(&self, path: &str) -> Result<Vec<u8>, AssetLoadError> {
        Ok(std::fs::read(self.base_dir.join(path))?)
    }
}

/// Serves equipment assets from memory. Used in tests and wherever the
/// host has already fetched the bytes itself.
#[derive(Debug, Clone, Default)]
pub struct MemoryAssetProvider {
    entries: FxHashMap<String, Vec<u8>>,
}

impl MemoryAssetProvider {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: &str, bytes: Vec<u8>) {
        self.entries.insert(path.to_string(), bytes);
    }
}

impl AssetProvider for MemoryAssetProvider {
    fn fetch(&self, path: &str) -> Result<Vec<u8>, AssetLoadError> {
        self.entries.get(path).cloned().ok_or_else(|| {
            AssetLoadError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("no asset registered for '{path}'"),
            ))
        })
    }
}
