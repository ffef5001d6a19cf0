//! Configuration commands.
//!
//! Configuration is loaded from TOML files and merged with environment variables
//! prefixed with `JUSTPREMIUM__`. For example, `JUSTPREMIUM__ADAPTER__ENDPOINT_HOST`
//! will override `adapter.endpoint_host` in the TOML file.

use std::fs;
use std::path::{Path, PathBuf};

use justpremium_adapter_common::settings::Settings;

use crate::error::CliError;

/// Load settings from `file`, or the embedded defaults when no file is given.
///
/// Environment overrides and validation are applied in both cases.
pub(crate) fn load_settings(file: Option<&Path>, verbose: bool) -> Result<Settings, CliError> {
    let settings = match file {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            if verbose {
                println!("Loading config from: {}", path.display());
                println!("Environment variables with JUSTPREMIUM__ prefix will be merged");
            }
            Settings::from_toml(&content)?
        }
        None => Settings::new()?,
    };

    Ok(settings)
}

/// Validate configuration file.
///
/// Validates TOML syntax, value ranges, and merges with environment variables.
pub fn validate(file: PathBuf, verbose: bool) -> Result<(), CliError> {
    let settings = load_settings(Some(&file), verbose)?;

    println!("Configuration is valid");
    println!("  File: {}", file.display());
    println!(
        "  Endpoint: {}{}",
        settings.adapter.endpoint_host, settings.adapter.endpoint_path
    );
    println!("  Enabled: {}", settings.adapter.enabled);
    println!(
        "  Defaults: currency {}, ttl {}ms",
        settings.adapter.default_currency, settings.adapter.default_ttl_ms
    );

    if verbose {
        let merged_toml = settings.to_canonical_toml()?;
        println!("\nMerged configuration:");
        println!("---");
        println!("{}", merged_toml);
        println!("---");
    }

    Ok(())
}
