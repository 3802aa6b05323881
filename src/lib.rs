// xldeck - Control surface CLI support library
// Configuration file handling shared by the binary and its tests

pub mod config;

pub use config::{DeckConfig, KeyConfig, KeyContent};
