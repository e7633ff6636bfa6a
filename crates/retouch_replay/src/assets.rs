//! Asset storage for layer images.
//!
//! Actions and snapshots carry only [`AssetId`]s; the pixels are held here
//! and shared by reference count.

use image::RgbaImage;
use indexmap::IndexMap;
use retouch_core::{AssetId, Dims, Timestamp};
use std::sync::Arc;
use tracing::debug;

/// An immutable image registered with the asset manager
#[derive(Debug, Clone)]
pub struct Asset {
    /// Registry key
    pub id: AssetId,
    /// Display name
    pub name: String,
    /// Pixel size
    pub dims: Dims,
    /// Shared pixel data; cloning an asset never copies it
    pub pixels: Arc<RgbaImage>,
    /// When the asset was registered
    pub added_at: Timestamp,
}

impl Asset {
    fn new(id: AssetId, name: String, image: RgbaImage) -> Self {
        Self {
            id,
            name,
            dims: Dims::new(image.width(), image.height()),
            pixels: Arc::new(image),
            added_at: Timestamp::now(),
        }
    }
}

/// Lookup of assets by id
pub trait AssetManager {
    /// The asset registered under `id`, if any
    fn get_asset(&self, id: &AssetId) -> Option<&Asset>;
}

/// In-memory asset manager
#[derive(Debug, Clone, Default)]
pub struct AssetRegistry {
    assets: IndexMap<AssetId, Asset>,
}

impl AssetRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `image` under a fresh id
    pub fn add_asset(&mut self, image: RgbaImage, name: impl Into<String>) -> AssetId {
        let id = AssetId::new();
        self.insert(id, image, name);
        id
    }

    /// Register `image` under a caller-chosen id, returning any asset it
    /// replaced
    pub fn insert(&mut self, id: AssetId, image: RgbaImage, name: impl Into<String>) -> Option<Asset> {
        let asset = Asset::new(id, name.into(), image);
        debug!(asset = %id, dims = %asset.dims, "registered asset");
        self.assets.insert(id, asset)
    }

    /// Unregister an asset, returning it
    pub fn remove_asset(&mut self, id: &AssetId) -> Option<Asset> {
        self.assets.shift_remove(id)
    }

    /// Unregister every asset
    pub fn clear(&mut self) {
        self.assets.clear();
    }

    /// Number of registered assets
    #[must_use]
    pub fn len(&self) -> usize {
        self.assets.len()
    }

    /// True if nothing is registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

impl AssetManager for AssetRegistry {
    fn get_asset(&self, id: &AssetId) -> Option<&Asset> {
        self.assets.get(id)
    }
}
