//! IP lookup command

use colored::Colorize;

use crate::cache::LocationCacheFactory;
use crate::config::AppConfig;
use crate::geo::{CachedIpLocationResolver, IpLocationResolver, LabelOptions};
use crate::i18n::CatalogLocalizer;
use crate::interfaces::cli::CliError;

/// Resolve one address with the configured database and cache
///
/// Runs even when `location.enabled` is false so the database can be checked
/// before enabling enrichment.
pub async fn lookup_ip(
    config: &AppConfig,
    ip: &str,
    locale: Option<&str>,
    json: bool,
) -> Result<(), CliError> {
    let cache = LocationCacheFactory::create(&config.location.cache, &config.redis)?;
    let resolver = CachedIpLocationResolver::from_config(&config.location, cache);
    if !resolver.is_available() {
        return Err(CliError::CommandError(
            "GeoIP database is not available, check location.maxmind.database_path".to_string(),
        ));
    }

    let localizer = CatalogLocalizer::from_config(&config.localization)
        .map_err(|e| CliError::CommandError(e.to_string()))?;

    let location = resolver.resolve(ip).await;

    if json {
        let out = serde_json::to_string_pretty(&location)
            .map_err(|e| CliError::CommandError(format!("Failed to serialize location: {}", e)))?;
        println!("{}", out);
        return Ok(());
    }

    let Some(location) = location else {
        println!("{} No location found for {}", "ℹ".bold().blue(), ip.cyan());
        return Ok(());
    };

    let opts = LabelOptions {
        include_country: true,
        with_timezone: true,
        locale,
    };
    println!(
        "{} {} {}",
        ip.cyan(),
        location.confidence_icon(),
        location.label_with_confidence(&localizer, opts).bold()
    );
    println!(
        "  {} {}",
        "confidence:".dimmed(),
        location.confidence_label(&localizer, locale)
    );
    if let (Some(lat), Some(lon)) = (location.latitude(), location.longitude()) {
        println!("  {} {:.4}, {:.4}", "coordinates:".dimmed(), lat, lon);
    }
    Ok(())
}
