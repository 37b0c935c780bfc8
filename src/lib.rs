//! session-manager - track, enrich and revoke user login sessions
//!
//! Keeps a `sessions` table in sync for session drivers that do not write one
//! themselves, and turns its rows into user-facing session lists with parsed
//! device details and an approximate, privacy-conscious location.
//!
//! # Features
//! - **server**: actix-web session metadata middleware (default)
//! - **cli**: Command-line interface (default)
//!
//! # Architecture
//! - `geo`: MaxMind lookups, confidence classification, location labels
//! - `cache`: Location cache backends (moka, redis, null)
//! - `i18n`: Localized label catalogs
//! - `device`: User-agent classification
//! - `storage`: Session store trait and SeaORM backend
//! - `services`: Session listing, logout and pruning
//! - `middleware`: Throttled session metadata writes
//! - `config` / `system`: Configuration and logging

pub mod cache;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod device;
pub mod errors;
pub mod geo;
pub mod i18n;
#[cfg(feature = "cli")]
pub mod interfaces;
#[cfg(feature = "server")]
pub mod middleware;
pub mod services;
pub mod storage;
pub mod system;
