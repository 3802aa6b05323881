//! Panel setting command handlers.

use super::{CommandResult, Context};
use anyhow::Context as _;

/// Set panel brightness
pub fn brightness(ctx: &Context, percent: i32) -> CommandResult {
    let surface = ctx.open_surface()?;
    surface
        .set_brightness(percent)
        .context("setting brightness")?;
    println!("Brightness set to {percent}%");
    Ok(())
}

/// Return the panel to its idle screen
pub fn reset(ctx: &Context) -> CommandResult {
    let surface = ctx.open_surface()?;
    surface.reset().context("resetting panel")?;
    println!("Panel reset");
    Ok(())
}
