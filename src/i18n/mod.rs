//! Localization of user-facing location strings
//!
//! Labels are resolved through the pluggable [`Localizer`] trait, keyed by
//! locale. [`CatalogLocalizer`] is the bundled implementation, backed by TOML
//! catalogs (`lang/<locale>.toml`).
//!
//! Lookups are fallible so that callers can decide how to degrade: the
//! location formatting code swallows every [`LocalizeError`] and falls back to
//! raw identifiers.

mod catalog;

use strum::{EnumIter, IntoStaticStr};
use thiserror::Error;
use tracing::debug;

pub use catalog::CatalogLocalizer;

/// Translatable message keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, IntoStaticStr)]
pub enum MessageKey {
    #[strum(serialize = "unknown_location")]
    UnknownLocation,
    /// Template with a `:location` placeholder
    #[strum(serialize = "near_location")]
    NearLocation,
    #[strum(serialize = "confidence.high")]
    ConfidenceHigh,
    #[strum(serialize = "confidence.medium")]
    ConfidenceMedium,
    #[strum(serialize = "confidence.low")]
    ConfidenceLow,
    /// Used when no confidence could be derived
    #[strum(serialize = "confidence.approximate")]
    ConfidenceApproximate,
}

impl MessageKey {
    /// Dotted catalog key, e.g. `confidence.high`
    pub fn as_key(&self) -> &'static str {
        self.into()
    }

    /// Built-in English text, used when no catalog provides the key.
    pub fn fallback_text(&self) -> &'static str {
        match self {
            MessageKey::UnknownLocation => "Unknown location",
            MessageKey::NearLocation => "Near :location",
            MessageKey::ConfidenceHigh => "Precise location",
            MessageKey::ConfidenceMedium => "Approximate location",
            MessageKey::ConfidenceLow => "Rough location",
            MessageKey::ConfidenceApproximate => "Approximate location",
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LocalizeError {
    #[error("missing translation `{key}` for locale `{locale}`")]
    MissingMessage { key: &'static str, locale: String },
    #[error("invalid country code `{0}`")]
    InvalidCountryCode(String),
    #[error("unknown timezone `{0}`")]
    UnknownTimezone(String),
    #[error("failed to load catalog `{path}`: {reason}")]
    Catalog { path: String, reason: String },
    #[error("localization unavailable: {0}")]
    Unavailable(String),
}

/// Pluggable translation mechanism keyed by locale
pub trait Localizer: Send + Sync {
    /// Locale used when a caller passes no explicit locale
    fn default_locale(&self) -> &str;

    /// Raw message (template) for `key` in `locale`
    fn message(&self, locale: &str, key: MessageKey) -> Result<String, LocalizeError>;

    /// Localized name for an upper-case ISO 3166-1 alpha-2 code.
    /// `Ok(None)` when the code is well-formed but unknown.
    fn country_name(&self, locale: &str, code: &str) -> Result<Option<String>, LocalizeError>;

    /// Localized generic display name for an IANA timezone id.
    /// `Ok(None)` when the zone is valid but has no display name.
    fn timezone_name(&self, locale: &str, timezone: &str)
    -> Result<Option<String>, LocalizeError>;

    /// Message text with `:name` placeholders replaced. Never fails: a failed
    /// lookup falls back to the built-in English text.
    fn translate(&self, locale: &str, key: MessageKey, replacements: &[(&str, &str)]) -> String {
        let template = match self.message(locale, key) {
            Ok(text) => text,
            Err(e) => {
                debug!("Falling back to built-in text for {}: {}", key.as_key(), e);
                key.fallback_text().to_string()
            }
        };

        replacements
            .iter()
            .fold(template, |text, (name, value)| {
                text.replace(&format!(":{}", name), value)
            })
    }
}
