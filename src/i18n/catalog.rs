//! TOML-backed message catalogs
//!
//! English and French catalogs are compiled in; additional `<locale>.toml`
//! files can be loaded from `localization.lang_path`, overlaying the bundled
//! entries for the same locale.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, info};

use super::{LocalizeError, Localizer, MessageKey};
use crate::config::LocalizationConfig;

const BUNDLED: &[(&str, &str)] = &[
    ("en", include_str!("../../lang/en.toml")),
    ("fr", include_str!("../../lang/fr.toml")),
];

#[derive(Debug, Clone, Default, Deserialize)]
struct ConfidenceMessages {
    high: Option<String>,
    medium: Option<String>,
    low: Option<String>,
    approximate: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct Catalog {
    unknown_location: Option<String>,
    near_location: Option<String>,
    #[serde(default)]
    confidence: ConfidenceMessages,
    #[serde(default)]
    countries: HashMap<String, String>,
    #[serde(default)]
    timezones: HashMap<String, String>,
}

impl Catalog {
    fn parse(source: &str, origin: &str) -> Result<Self, LocalizeError> {
        toml::from_str(source).map_err(|e| LocalizeError::Catalog {
            path: origin.to_string(),
            reason: e.to_string(),
        })
    }

    fn message(&self, key: MessageKey) -> Option<&str> {
        let value = match key {
            MessageKey::UnknownLocation => &self.unknown_location,
            MessageKey::NearLocation => &self.near_location,
            MessageKey::ConfidenceHigh => &self.confidence.high,
            MessageKey::ConfidenceMedium => &self.confidence.medium,
            MessageKey::ConfidenceLow => &self.confidence.low,
            MessageKey::ConfidenceApproximate => &self.confidence.approximate,
        };
        value.as_deref()
    }

    fn merge(&mut self, other: Catalog) {
        fn take(slot: &mut Option<String>, value: Option<String>) {
            if value.is_some() {
                *slot = value;
            }
        }

        take(&mut self.unknown_location, other.unknown_location);
        take(&mut self.near_location, other.near_location);
        take(&mut self.confidence.high, other.confidence.high);
        take(&mut self.confidence.medium, other.confidence.medium);
        take(&mut self.confidence.low, other.confidence.low);
        take(&mut self.confidence.approximate, other.confidence.approximate);
        self.countries.extend(other.countries);
        self.timezones.extend(other.timezones);
    }
}

/// Catalog-based [`Localizer`]
///
/// Locale lookup order: the exact locale (`pt-br`), its language (`pt`), then
/// the fallback locale. `_` and `-` are interchangeable and case is ignored.
#[derive(Debug, Clone)]
pub struct CatalogLocalizer {
    catalogs: HashMap<String, Catalog>,
    default_locale: String,
    fallback_locale: String,
}

impl Default for CatalogLocalizer {
    fn default() -> Self {
        Self::bundled("en")
    }
}

impl CatalogLocalizer {
    /// Bundled catalogs only
    pub fn bundled(default_locale: &str) -> Self {
        let mut catalogs = HashMap::new();
        for (locale, source) in BUNDLED {
            // bundled catalogs are covered by tests
            if let Ok(catalog) = Catalog::parse(source, locale) {
                catalogs.insert(locale.to_string(), catalog);
            }
        }

        Self {
            catalogs,
            default_locale: normalize_locale(default_locale),
            fallback_locale: "en".to_string(),
        }
    }

    /// Bundled catalogs plus any `<locale>.toml` files under `lang_path`
    pub fn from_config(config: &LocalizationConfig) -> Result<Self, LocalizeError> {
        let mut localizer = Self::bundled(&config.default_locale);
        localizer.fallback_locale = normalize_locale(&config.fallback_locale);

        if let Some(ref dir) = config.lang_path {
            localizer.load_dir(Path::new(dir))?;
        }

        Ok(localizer)
    }

    /// Overlay a catalog given as TOML source
    pub fn with_catalog(mut self, locale: &str, source: &str) -> Result<Self, LocalizeError> {
        let catalog = Catalog::parse(source, locale)?;
        self.add_catalog(locale, catalog);
        Ok(self)
    }

    pub fn locales(&self) -> Vec<String> {
        let mut locales: Vec<String> = self.catalogs.keys().cloned().collect();
        locales.sort();
        locales
    }

    fn add_catalog(&mut self, locale: &str, catalog: Catalog) {
        self.catalogs
            .entry(normalize_locale(locale))
            .or_default()
            .merge(catalog);
    }

    fn load_dir(&mut self, dir: &Path) -> Result<(), LocalizeError> {
        let io_err = |e: std::io::Error| LocalizeError::Catalog {
            path: dir.display().to_string(),
            reason: e.to_string(),
        };

        let mut loaded = 0usize;
        for entry in std::fs::read_dir(dir).map_err(io_err)? {
            let path = entry.map_err(io_err)?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("toml") {
                continue;
            }
            let Some(locale) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };

            let source = std::fs::read_to_string(&path).map_err(io_err)?;
            let catalog = Catalog::parse(&source, &path.display().to_string())?;
            self.add_catalog(locale, catalog);
            loaded += 1;
            debug!("Loaded locale catalog {} from {}", locale, path.display());
        }

        info!("Loaded {} locale catalog(s) from {}", loaded, dir.display());
        Ok(())
    }

    /// Catalogs to consult for `locale`, most specific first
    fn chain(&self, locale: &str) -> Vec<&Catalog> {
        let mut names = locale_and_language(locale);
        names.push(self.fallback_locale.clone());
        names.dedup();

        names
            .iter()
            .filter_map(|name| self.catalogs.get(name))
            .collect()
    }

    /// Catalogs in the requested language only, without the fallback locale
    fn language_chain(&self, locale: &str) -> Vec<&Catalog> {
        locale_and_language(locale)
            .iter()
            .filter_map(|name| self.catalogs.get(name))
            .collect()
    }
}

impl Localizer for CatalogLocalizer {
    fn default_locale(&self) -> &str {
        &self.default_locale
    }

    fn message(&self, locale: &str, key: MessageKey) -> Result<String, LocalizeError> {
        self.chain(locale)
            .into_iter()
            .find_map(|catalog| catalog.message(key))
            .map(str::to_string)
            .ok_or_else(|| LocalizeError::MissingMessage {
                key: key.as_key(),
                locale: locale.to_string(),
            })
    }

    fn country_name(&self, locale: &str, code: &str) -> Result<Option<String>, LocalizeError> {
        if code.len() != 2 || !code.bytes().all(|b| b.is_ascii_uppercase()) {
            return Err(LocalizeError::InvalidCountryCode(code.to_string()));
        }

        // 不回退到其他语言，避免标签里混用两种语言
        let localized = self
            .language_chain(locale)
            .into_iter()
            .find_map(|catalog| catalog.countries.get(code));
        if let Some(name) = localized {
            return Ok(Some(name.clone()));
        }

        let english = locale_and_language(locale).last().is_some_and(|l| l == "en");
        if !english {
            return Ok(None);
        }
        Ok(rust_iso3166::from_alpha2(code).map(|country| country.name.to_string()))
    }

    fn timezone_name(
        &self,
        locale: &str,
        timezone: &str,
    ) -> Result<Option<String>, LocalizeError> {
        if timezone.parse::<chrono_tz::Tz>().is_err() {
            return Err(LocalizeError::UnknownTimezone(timezone.to_string()));
        }

        Ok(self
            .chain(locale)
            .into_iter()
            .find_map(|catalog| catalog.timezones.get(timezone))
            .cloned())
    }
}

fn normalize_locale(locale: &str) -> String {
    locale.trim().replace('_', "-").to_ascii_lowercase()
}

/// `fr-ca` → `["fr-ca", "fr"]`
fn locale_and_language(locale: &str) -> Vec<String> {
    let normalized = normalize_locale(locale);
    match normalized.split_once('-') {
        Some((language, _)) => {
            let language = language.to_string();
            vec![normalized, language]
        }
        None => vec![normalized],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_catalogs_parse() {
        for (locale, source) in BUNDLED {
            assert!(Catalog::parse(source, locale).is_ok(), "{locale}");
        }
        let l10n = CatalogLocalizer::default();
        assert_eq!(l10n.locales(), vec!["en".to_string(), "fr".to_string()]);
    }

    #[test]
    fn test_english_messages() {
        let l10n = CatalogLocalizer::default();
        assert_eq!(
            l10n.message("en", MessageKey::UnknownLocation).unwrap(),
            "Unknown location"
        );
        assert_eq!(
            l10n.message("en", MessageKey::NearLocation).unwrap(),
            "Near :location"
        );
        assert_eq!(
            l10n.message("en", MessageKey::ConfidenceLow).unwrap(),
            "Rough location"
        );
    }

    #[test]
    fn test_region_locale_falls_back_to_language() {
        let l10n = CatalogLocalizer::default();
        assert_eq!(
            l10n.message("fr_CA", MessageKey::UnknownLocation).unwrap(),
            "Emplacement inconnu"
        );
    }

    #[test]
    fn test_unknown_locale_falls_back_to_english() {
        let l10n = CatalogLocalizer::default();
        assert_eq!(
            l10n.message("xx", MessageKey::ConfidenceHigh).unwrap(),
            "Precise location"
        );
    }

    #[test]
    fn test_country_names() {
        let l10n = CatalogLocalizer::default();
        assert_eq!(
            l10n.country_name("en", "US").unwrap().as_deref(),
            Some("United States")
        );
        assert_eq!(
            l10n.country_name("fr", "DE").unwrap().as_deref(),
            Some("Allemagne")
        );
        // ISO 3166 name when no catalog entry exists
        assert_eq!(
            l10n.country_name("en", "FR").unwrap().as_deref(),
            Some("France")
        );
        assert_eq!(l10n.country_name("en", "XX").unwrap(), None);
        assert_eq!(
            l10n.country_name("en-GB", "FR").unwrap().as_deref(),
            Some("France")
        );
    }

    #[test]
    fn test_country_name_stays_in_requested_language() {
        let l10n = CatalogLocalizer::default();
        assert_eq!(
            l10n.country_name("fr", "BR").unwrap().as_deref(),
            Some("Brésil")
        );
        // 法语目录没有的代码不回退到英文名称
        assert_eq!(l10n.country_name("fr", "KR").unwrap(), None);
        assert_eq!(l10n.country_name("fr-CA", "TV").unwrap(), None);
    }

    #[test]
    fn test_country_name_rejects_malformed_codes() {
        let l10n = CatalogLocalizer::default();
        assert!(l10n.country_name("en", "USA").is_err());
        assert!(l10n.country_name("en", "us").is_err());
        assert!(l10n.country_name("en", "1A").is_err());
    }

    #[test]
    fn test_timezone_names() {
        let l10n = CatalogLocalizer::default();
        assert_eq!(
            l10n.timezone_name("en", "America/New_York").unwrap().as_deref(),
            Some("Eastern Time")
        );
        assert_eq!(
            l10n.timezone_name("fr", "Europe/Paris").unwrap().as_deref(),
            Some("heure d’Europe centrale")
        );
        // valid zone without a display name
        assert_eq!(l10n.timezone_name("en", "Asia/Kathmandu").unwrap(), None);
        assert!(l10n.timezone_name("en", "Invalid/Timezone").is_err());
    }

    #[test]
    fn test_with_catalog_overlays_bundled_entries() {
        let l10n = CatalogLocalizer::default()
            .with_catalog("en", "unknown_location = \"Somewhere\"")
            .unwrap();
        assert_eq!(
            l10n.message("en", MessageKey::UnknownLocation).unwrap(),
            "Somewhere"
        );
        // untouched keys survive the overlay
        assert_eq!(
            l10n.message("en", MessageKey::NearLocation).unwrap(),
            "Near :location"
        );
    }

    #[test]
    fn test_from_config_loads_lang_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("de.toml"),
            "unknown_location = \"Unbekannter Ort\"\nnear_location = \"In der Nähe von :location\"\n",
        )
        .unwrap();

        let config = LocalizationConfig {
            default_locale: "de".to_string(),
            fallback_locale: "en".to_string(),
            lang_path: Some(dir.path().display().to_string()),
        };
        let l10n = CatalogLocalizer::from_config(&config).unwrap();

        assert_eq!(l10n.default_locale(), "de");
        assert_eq!(
            l10n.translate("de", MessageKey::NearLocation, &[("location", "Berlin")]),
            "In der Nähe von Berlin"
        );
        // missing German key resolves through the fallback locale
        assert_eq!(
            l10n.message("de", MessageKey::ConfidenceHigh).unwrap(),
            "Precise location"
        );
    }

    #[test]
    fn test_from_config_reports_bad_catalog() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("en.toml"), "unknown_location = [").unwrap();

        let config = LocalizationConfig {
            lang_path: Some(dir.path().display().to_string()),
            ..LocalizationConfig::default()
        };
        assert!(matches!(
            CatalogLocalizer::from_config(&config),
            Err(LocalizeError::Catalog { .. })
        ));
    }
}
