//! Key image command handlers.

use std::path::Path;

use super::{CommandResult, Context};
use anyhow::Context as _;
use xldeck_surface::Rgb;

/// Fill a key with a solid color
pub fn fill(ctx: &Context, key: i32, color: &str) -> CommandResult {
    let rgb: Rgb = color.parse()?;
    let surface = ctx.open_surface()?;
    surface
        .fill_color(key, rgb.r.into(), rgb.g.into(), rgb.b.into())
        .with_context(|| format!("filling key {key}"))?;
    println!("Key {key} filled with {rgb}");
    Ok(())
}

/// Draw a raw RGB file on a key
pub fn image(ctx: &Context, key: i32, file: &Path) -> CommandResult {
    let pixels = std::fs::read(file).with_context(|| format!("reading {}", file.display()))?;
    let surface = ctx.open_surface()?;
    surface
        .fill_image(key, &pixels)
        .with_context(|| format!("drawing {} on key {key}", file.display()))?;
    println!("Key {key} set from {}", file.display());
    Ok(())
}

/// Blank one key or the whole panel
pub fn clear(ctx: &Context, key: Option<i32>) -> CommandResult {
    let surface = ctx.open_surface()?;
    match key {
        Some(key) => {
            surface
                .clear_key(key)
                .with_context(|| format!("clearing key {key}"))?;
            println!("Key {key} cleared");
        }
        None => {
            surface.clear_all().context("clearing all keys")?;
            println!("All keys cleared");
        }
    }
    Ok(())
}
