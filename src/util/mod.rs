// LogTally - util/mod.rs
//
// Cross-cutting utilities: named constants, the typed error hierarchy,
// and logging initialisation.

pub mod constants;
pub mod error;
pub mod logging;
