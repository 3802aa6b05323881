//! Configuration file for the CLI
//!
//! TOML, loaded from `~/.config/xldeck/config.toml` unless a path is given.
//! A missing file yields the defaults.
//!
//! ```toml
//! device = "/dev/hidraw4"
//! brightness = 70
//! log_level = "info"
//!
//! [[keys]]
//! index = 0
//! color = "#ff8800"
//!
//! [[keys]]
//! index = 1
//! image = "icons/play.rgb"
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use xldeck_surface::{KeyIndex, Rgb};

/// Top-level config
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DeckConfig {
    /// Device path; first matching device when unset
    pub device: Option<String>,
    /// Panel brightness applied by `apply` (0-100)
    pub brightness: Option<i32>,
    /// Default log filter when RUST_LOG is unset
    pub log_level: Option<String>,
    /// Per-key content
    pub keys: Vec<KeyConfig>,
}

/// What to show on one key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KeyConfig {
    pub index: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Raw RGB file (96×96 or 72×72), relative to the config file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<PathBuf>,
}

/// Resolved key content
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyContent {
    Color(Rgb),
    Image(PathBuf),
}

impl KeyConfig {
    /// Validated key index and content, with image paths made relative to `base`
    pub fn resolve(&self, base: &Path) -> anyhow::Result<(KeyIndex, KeyContent)> {
        let key = KeyIndex::new(self.index)?;
        let content = match (&self.color, &self.image) {
            (Some(color), None) => KeyContent::Color(
                color
                    .parse()
                    .with_context(|| format!("key {}: bad color", self.index))?,
            ),
            (None, Some(image)) => KeyContent::Image(base.join(image)),
            (Some(_), Some(_)) => bail!("key {}: set either color or image, not both", self.index),
            (None, None) => bail!("key {}: needs a color or an image", self.index),
        };
        Ok((key, content))
    }
}

impl DeckConfig {
    /// Get the default config file path
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("xldeck")
            .join("config.toml")
    }

    /// Load config from a file, or return default if not found
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("in {}", path.display()))
    }

    /// Parse and validate TOML text
    pub fn parse(content: &str) -> anyhow::Result<Self> {
        let config: DeckConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check ranges and key entries
    pub fn validate(&self) -> anyhow::Result<()> {
        if let Some(b) = self.brightness {
            if !(0..=100).contains(&b) {
                bail!("brightness {b} out of range 0-100");
            }
        }

        let mut seen = HashSet::new();
        for key in &self.keys {
            key.resolve(Path::new(""))?;
            if !seen.insert(key.index) {
                bail!("key {} configured more than once", key.index);
            }
        }
        Ok(())
    }

    /// Directory that relative image paths are resolved against
    pub fn base_dir(path: &Path) -> PathBuf {
        path.parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    }
}
