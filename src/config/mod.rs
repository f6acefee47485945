//! Configuration module
//!
//! Settings loaded from `config.toml`: view defaults, report location and
//! export destination.

#[allow(clippy::module_inception)]
pub mod config;

pub use config::Config;
