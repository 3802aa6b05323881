//! Apply the config file to the panel.

use std::path::Path;

use super::{CommandResult, Context};
use anyhow::Context as _;
use tracing::info;
use xldeck::{DeckConfig, KeyContent};

/// Set brightness and key contents from `config`
///
/// Image paths are resolved relative to the directory holding the config.
pub fn apply(ctx: &Context, config: &DeckConfig, config_path: &Path) -> CommandResult {
    if config.brightness.is_none() && config.keys.is_empty() {
        println!("Nothing to apply ({} has no brightness or keys)", config_path.display());
        return Ok(());
    }

    let base = DeckConfig::base_dir(config_path);
    // Resolve everything before touching the device
    let keys = config
        .keys
        .iter()
        .map(|k| k.resolve(&base))
        .collect::<anyhow::Result<Vec<_>>>()?;

    let surface = ctx.open_surface()?;

    if let Some(percent) = config.brightness {
        surface
            .set_brightness(percent)
            .context("setting brightness")?;
        info!("Brightness {}%", percent);
    }

    for (key, content) in keys {
        match content {
            KeyContent::Color(rgb) => {
                surface
                    .fill_rgb(key, rgb)
                    .with_context(|| format!("filling key {key}"))?;
            }
            KeyContent::Image(path) => {
                let pixels = std::fs::read(&path)
                    .with_context(|| format!("reading {}", path.display()))?;
                surface
                    .fill_image(key.get().into(), &pixels)
                    .with_context(|| format!("drawing {} on key {key}", path.display()))?;
            }
        }
        info!("Key {} applied", key);
    }

    println!("Applied {}", config_path.display());
    Ok(())
}
