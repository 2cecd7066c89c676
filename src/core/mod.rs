// LogTally - core/mod.rs
//
// Core classification logic.
// Dependencies: data crates only (regex, serde).
// Must NOT depend on: platform, app, or any filesystem access directly.

pub mod classify;
pub mod export;
pub mod model;
pub mod ruleset;
