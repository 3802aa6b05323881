//! Integration tests for config file loading and validation.
//!
//! These exercise the public `DeckConfig` API the way the CLI uses it:
//! load from disk, validate, then resolve per-key content.

use std::path::{Path, PathBuf};

use xldeck::{DeckConfig, KeyContent};
use xldeck_surface::Rgb;

fn temp_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("xldeck-test-{}-{}", name, std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

// ── Loading ──

#[test]
fn missing_file_yields_defaults() {
    let path = temp_dir("missing").join("does-not-exist.toml");
    let config = DeckConfig::load(&path).unwrap();
    assert_eq!(config, DeckConfig::default());
}

#[test]
fn full_file_loads_and_resolves() {
    let dir = temp_dir("full");
    let path = dir.join("config.toml");
    std::fs::write(
        &path,
        r##"
device = "/dev/hidraw7"
brightness = 70
log_level = "debug"

[[keys]]
index = 0
color = "#ff8800"

[[keys]]
index = 31
image = "icons/stop.rgb"

[[keys]]
index = 8
color = "0, 128, 255"
"##,
    )
    .unwrap();

    let config = DeckConfig::load(&path).unwrap();
    assert_eq!(config.device.as_deref(), Some("/dev/hidraw7"));
    assert_eq!(config.brightness, Some(70));
    assert_eq!(config.log_level.as_deref(), Some("debug"));
    assert_eq!(config.keys.len(), 3);

    let base = DeckConfig::base_dir(&path);
    let resolved: Vec<_> = config
        .keys
        .iter()
        .map(|k| k.resolve(&base).unwrap())
        .collect();
    assert_eq!(resolved[0].0.get(), 0);
    assert_eq!(resolved[0].1, KeyContent::Color(Rgb::new(255, 136, 0)));
    assert_eq!(
        resolved[1].1,
        KeyContent::Image(dir.join("icons/stop.rgb"))
    );
    assert_eq!(resolved[2].1, KeyContent::Color(Rgb::new(0, 128, 255)));
}

#[test]
fn load_reports_file_in_error() {
    let dir = temp_dir("broken");
    let path = dir.join("broken.toml");
    std::fs::write(&path, "brightness = \"high\"\n").unwrap();

    let err = DeckConfig::load(&path).unwrap_err();
    assert!(format!("{err:#}").contains("broken.toml"));
}

// ── Validation ──

fn parse_err(text: &str) -> String {
    format!("{:#}", DeckConfig::parse(text).unwrap_err())
}

#[test]
fn rejects_out_of_range_key() {
    assert!(parse_err("[[keys]]\nindex = 32\ncolor = \"#000000\"\n").contains("32"));
    assert!(parse_err("[[keys]]\nindex = -1\ncolor = \"#000000\"\n").contains("-1"));
}

#[test]
fn rejects_duplicate_key() {
    let text = r##"
[[keys]]
index = 4
color = "#000000"

[[keys]]
index = 4
color = "#ffffff"
"##;
    assert!(parse_err(text).contains("more than once"));
}

#[test]
fn rejects_bad_color() {
    assert!(parse_err("[[keys]]\nindex = 1\ncolor = \"#12345\"\n").contains("bad color"));
    assert!(parse_err("[[keys]]\nindex = 1\ncolor = \"1,2,300\"\n").contains("bad color"));
}

#[test]
fn rejects_color_and_image_together_or_neither() {
    let both = "[[keys]]\nindex = 1\ncolor = \"#000000\"\nimage = \"a.rgb\"\n";
    assert!(parse_err(both).contains("not both"));
    assert!(parse_err("[[keys]]\nindex = 1\n").contains("color or an image"));
}

#[test]
fn rejects_brightness_out_of_range() {
    assert!(parse_err("brightness = 150\n").contains("150"));
    assert!(parse_err("brightness = -1\n").contains("-1"));
    assert!(DeckConfig::parse("brightness = 100\n").is_ok());
}

#[test]
fn rejects_unknown_fields() {
    assert!(DeckConfig::parse("brigthness = 10\n").is_err());
    assert!(DeckConfig::parse("[[keys]]\nindex = 1\ncolour = \"#000000\"\n").is_err());
}

#[test]
fn base_dir_of_bare_file_name() {
    assert_eq!(DeckConfig::base_dir(Path::new("config.toml")), PathBuf::from(""));
}
