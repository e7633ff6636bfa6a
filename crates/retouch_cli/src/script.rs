//! Scripted sessions: synthetic assets plus an action list.
//!
//! ```json
//! {
//!   "assets": [{ "name": "photo", "w": 400, "h": 600, "fill": [200, 180, 160, 255] }],
//!   "config": { "keyframe_interval": 10 },
//!   "actions": [{ "type": "LOAD_IMAGE", "payload": { "asset_id": "photo", "slot": "A" } }]
//! }
//! ```
//!
//! A bare array of actions is also accepted. Asset names double as ids.

use color_eyre::eyre::{bail, WrapErr};
use color_eyre::Result;
use image::{Rgba, RgbaImage};
use retouch_core::AssetId;
use retouch_log::{decode_actions, EditAction};
use retouch_replay::{AssetRegistry, ReplayConfig};
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;

/// A solid-colour asset generated for the session
#[derive(Debug, Clone, Deserialize)]
pub struct AssetSpec {
    /// Name actions use as `asset_id`
    pub name: String,
    /// Width in pixels
    pub w: u32,
    /// Height in pixels
    pub h: u32,
    /// RGBA fill, opaque white by default
    #[serde(default = "default_fill")]
    pub fill: [u8; 4],
}

fn default_fill() -> [u8; 4] {
    [255, 255, 255, 255]
}

impl AssetSpec {
    /// Id that actions use to reference this asset
    #[must_use]
    pub fn id(&self) -> AssetId {
        AssetId::from_name(&self.name)
    }
}

#[derive(Debug, Deserialize)]
struct RawScript {
    #[serde(default)]
    assets: Vec<AssetSpec>,
    #[serde(default)]
    config: Option<ReplayConfig>,
    actions: Vec<Value>,
}

/// A decoded script
#[derive(Debug, Clone)]
pub struct Script {
    /// Assets to generate before replaying
    pub assets: Vec<AssetSpec>,
    /// Config embedded in the script
    pub config: Option<ReplayConfig>,
    /// Decoded actions in order
    pub actions: Vec<EditAction>,
}

impl Script {
    /// Parse a script from JSON
    ///
    /// # Errors
    ///
    /// Returns error if the JSON, an asset or an action is malformed
    pub fn from_json(json: &str) -> Result<Self> {
        let root: Value = serde_json::from_str(json).wrap_err("script is not valid JSON")?;
        let raw = match root {
            Value::Array(actions) => RawScript {
                assets: Vec::new(),
                config: None,
                actions,
            },
            other => serde_json::from_value(other).wrap_err("malformed script")?,
        };

        for asset in &raw.assets {
            if asset.w == 0 || asset.h == 0 {
                bail!("asset `{}` has empty dimensions {}x{}", asset.name, asset.w, asset.h);
            }
        }

        Ok(Self {
            assets: raw.assets,
            config: raw.config,
            actions: decode_actions(raw.actions)?,
        })
    }

    /// Read and parse a script file
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or parsed
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("reading script {}", path.display()))?;
        Self::from_json(&json).wrap_err_with(|| format!("loading script {}", path.display()))
    }

    /// Register every asset in a fresh registry
    #[must_use]
    pub fn registry(&self) -> AssetRegistry {
        let mut registry = AssetRegistry::new();
        for asset in &self.assets {
            let image = RgbaImage::from_pixel(asset.w, asset.h, Rgba(asset.fill));
            registry.insert(asset.id(), image, asset.name.clone());
        }
        registry
    }
}
