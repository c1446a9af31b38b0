//! Asset server.
//!
//! Byte fetching with a URI-keyed cache, plus the blocking façade over the
//! async loaders. Asset loading is inherently asynchronous (the host issues
//! a fetch and acts on completion); the blocking wrappers exist for
//! generation-time tooling and tests.

use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use tokio::runtime::Runtime;

use crate::assets::loader::{GlbLoader, LoadedModel};
use crate::assets::source::AssetSource;
use crate::errors::AssetLoadError;
use crate::scene::Scene;

fn get_asset_runtime() -> &'static Runtime {
    static RUNTIME: OnceLock<Runtime> = OnceLock::new();
    RUNTIME.get_or_init(|| {
        tokio::runtime::Builder::new_current_thread()
            .build()
            .expect("Failed to create asset loader runtime")
    })
}

/// Lightweight, clonable handle to the shared byte cache.
#[derive(Clone, Default)]
pub struct AssetServer {
    cache: Arc<RwLock<FxHashMap<String, Arc<Vec<u8>>>>>,
}

impl AssetServer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Async methods
    // ========================================================================

    /// Fetches the raw bytes of `source`, consulting the cache first.
    pub async fn fetch_bytes_async(
        &self,
        source: &impl AssetSource,
    ) -> Result<Arc<Vec<u8>>, AssetLoadError> {
        let uri = source.uri().into_owned();

        if let Some(bytes) = self.cache.read().get(&uri) {
            return Ok(Arc::clone(bytes));
        }

        log::debug!("fetching asset '{uri}'");
        let bytes = Arc::new(source.read().await?);
        self.cache.write().insert(uri, Arc::clone(&bytes));
        Ok(bytes)
    }

    /// Fetches and instantiates a GLB asset into `scene`.
    pub async fn load_model_async(
        &self,
        source: &impl AssetSource,
        scene: &mut Scene,
    ) -> Result<LoadedModel, AssetLoadError> {
        let bytes = self.fetch_bytes_async(source).await?;
        GlbLoader::load_slice(&bytes, scene)
    }

    // ========================================================================
    // Blocking wrappers
    // ========================================================================

    pub fn fetch_bytes(&self, source: &impl AssetSource) -> Result<Arc<Vec<u8>>, AssetLoadError> {
        get_asset_runtime().block_on(self.fetch_bytes_async(source))
    }

    pub fn load_model(
        &self,
        source: &impl AssetSource,
        scene: &mut Scene,
    ) -> Result<LoadedModel, AssetLoadError> {
        get_asset_runtime().block_on(self.load_model_async(source, scene))
    }

    /// Drops every cached buffer.
    pub fn clear_cache(&self) {
        self.cache.write().clear();
    }
}
