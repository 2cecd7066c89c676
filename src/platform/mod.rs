// LogTally - platform/mod.rs
//
// Platform layer: config directory resolution, config.toml loading,
// and filesystem helpers. The only layer that touches the filesystem
// besides app-level orchestration.

pub mod config;
pub mod fs;
