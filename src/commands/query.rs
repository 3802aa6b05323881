//! Query (read-only) command handlers.

use super::{CommandResult, Context};
use anyhow::Context as _;
use xldeck_transport::{is_supported, HidDiscovery};

/// List attached control surfaces, or every HID interface with `all`
pub fn list(ctx: &Context, all: bool, json: bool) -> CommandResult {
    if all {
        let interfaces = HidDiscovery::list_all_hid().context("enumerating HID devices")?;
        if json {
            println!("{}", serde_json::to_string_pretty(&interfaces)?);
            return Ok(());
        }
        println!("All HID devices:");
        for d in &interfaces {
            let marker = if is_supported(d.vid, d.pid) { "*" } else { " " };
            println!(
                "{} VID={:04x} PID={:04x} usage={:04x} page={:04x} if={} path={}",
                marker, d.vid, d.pid, d.usage, d.usage_page, d.interface, d.path
            );
        }
        return Ok(());
    }

    let devices = HidDiscovery::new()
        .list_devices()
        .context("enumerating control surfaces")?;
    if json {
        println!("{}", serde_json::to_string_pretty(&devices)?);
        return Ok(());
    }
    if devices.is_empty() {
        println!("No control surfaces found");
        return Ok(());
    }
    for d in &devices {
        let marker = match &ctx.device {
            Some(path) if *path == d.info.device_path => " (selected)",
            _ => "",
        };
        println!(
            "{}  {}  serial={}  product={}{}",
            d.info.id_string(),
            d.info.device_path,
            d.info.serial.as_deref().unwrap_or("-"),
            d.info.product_name.as_deref().unwrap_or("-"),
            marker
        );
    }
    Ok(())
}

/// Print device path, serial number and firmware version
pub fn info(ctx: &Context) -> CommandResult {
    let surface = ctx.open_surface()?;
    let info = surface.device_info();
    println!("Device:   VID={:04X} PID={:04X}", info.vid, info.pid);
    println!("Path:     {}", info.device_path);
    if let Some(product) = &info.product_name {
        println!("Product:  {product}");
    }
    println!(
        "Serial:   {}",
        surface.serial_number().context("reading serial number")?
    );
    println!(
        "Firmware: {}",
        surface
            .firmware_version()
            .context("reading firmware version")?
    );
    Ok(())
}
