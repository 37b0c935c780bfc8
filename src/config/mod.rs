//! Configuration management
//!
//! Static configuration loaded from `config.toml` and `SM__*` environment
//! variables. The loaded [`AppConfig`] is passed explicitly to the components
//! that need it; nothing in the library reads configuration from globals.

mod structs;

pub use structs::*;
