// CLI definitions using clap

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "xldeck")]
#[command(author, version, about = "32-key LCD control surface driver")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Device path (default: first attached surface, or `device` from config)
    #[arg(long, short, global = true, value_name = "PATH")]
    pub device: Option<String>,

    /// Config file (default: ~/.config/xldeck/config.toml)
    #[arg(long, short, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable transport monitoring (prints all frames, feature and input reports)
    #[arg(long, global = true)]
    pub monitor: bool,

    /// Show raw hex dump alongside decoded output
    #[arg(long, global = true)]
    pub hex: bool,

    /// Filter monitor output (all, frames, features, input)
    #[arg(long, global = true)]
    pub filter: Option<String>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    // === Query Commands ===
    /// List attached control surfaces
    #[command(visible_alias = "ls")]
    List {
        /// List every HID interface, not only control surfaces
        #[arg(long)]
        all: bool,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Show device path, serial number and firmware version
    #[command(visible_aliases = ["version", "ver"])]
    Info,

    // === Render Commands ===
    /// Fill a key with a solid color
    #[command(visible_alias = "f")]
    Fill {
        /// Key index (0-31)
        #[arg(allow_negative_numbers = true)]
        key: i32,
        /// Color as #rrggbb or r,g,b
        color: String,
    },

    /// Draw a raw RGB image file on a key (96x96 or 72x72, 3 bytes per pixel)
    #[command(visible_alias = "img")]
    Image {
        /// Key index (0-31)
        #[arg(allow_negative_numbers = true)]
        key: i32,
        /// Path to the raw pixel file
        file: PathBuf,
    },

    /// Blank one key, or all keys when no index is given
    #[command(visible_alias = "c")]
    Clear {
        /// Key index (0-31)
        #[arg(allow_negative_numbers = true)]
        key: Option<i32>,
    },

    // === Panel Commands ===
    /// Set panel brightness
    #[command(visible_alias = "b")]
    Brightness {
        /// Brightness percentage (0-100)
        #[arg(allow_negative_numbers = true)]
        percent: i32,
    },

    /// Return every key to the idle logo screen
    Reset,

    // === Events ===
    /// Print key presses and releases until Ctrl-C
    #[command(visible_alias = "w")]
    Watch,

    /// Apply brightness and key contents from the config file
    Apply,
}
