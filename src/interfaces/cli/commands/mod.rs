//! CLI command implementations
//!
//! This module re-exports all CLI command functions.

mod config_gen;
mod lookup;
mod prune;
mod sessions;

pub use config_gen::*;
pub use lookup::*;
pub use prune::*;
pub use sessions::*;
