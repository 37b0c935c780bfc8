//! System-level modules
//!
//! Process-wide setup shared by the binary: logging initialization.

pub mod logging;
