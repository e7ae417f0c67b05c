//! Configuration management for the Wayfarer application
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::WayfarerError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure for the Wayfarer application
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WayfarerConfig {
    /// Overpass geodata query configuration
    pub overpass: OverpassConfig,
    /// Forward-geocoding configuration
    pub geocoding: GeocodingConfig,
    /// Cache configuration
    pub cache: CacheConfig,
    /// HTTP server configuration
    pub server: ServerConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Overpass API configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverpassConfig {
    /// Primary interpreter endpoint
    #[serde(default = "default_overpass_primary_url")]
    pub primary_url: String,
    /// Mirror endpoint tried once after a primary failure
    #[serde(default = "default_overpass_mirror_url")]
    pub mirror_url: String,
    /// Request timeout per attempt in seconds
    #[serde(default = "default_overpass_timeout")]
    pub timeout_seconds: u32,
    /// Search radius for points of interest in kilometers
    #[serde(default = "default_search_radius")]
    pub radius_km: u32,
}

/// Forward-geocoding configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodingConfig {
    /// Base URL of the geocoding service
    #[serde(default = "default_geocoding_base_url")]
    pub base_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_geocoding_timeout")]
    pub timeout_seconds: u32,
}

/// Cache configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Time-to-live for cached place results in seconds
    #[serde(default = "default_cache_ttl")]
    pub ttl_seconds: u64,
    /// Cache directory location
    #[serde(default = "default_cache_location")]
    pub location: String,
}

/// HTTP server configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Port to listen on
    #[serde(default = "default_server_port")]
    pub port: u16,
    /// Directory of static front-end assets
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
}

// Default value functions
fn default_overpass_primary_url() -> String {
    "https://overpass-api.de/api/interpreter".to_string()
}

fn default_overpass_mirror_url() -> String {
    "https://overpass.kumi.systems/api/interpreter".to_string()
}

fn default_overpass_timeout() -> u32 {
    30
}

fn default_search_radius() -> u32 {
    300
}

fn default_geocoding_base_url() -> String {
    "https://nominatim.openstreetmap.org".to_string()
}

fn default_geocoding_timeout() -> u32 {
    15
}

fn default_cache_ttl() -> u64 {
    3600
}

fn default_cache_location() -> String {
    dirs::cache_dir()
        .map(|dir| dir.join("wayfarer").to_string_lossy().into_owned())
        .unwrap_or_else(|| ".wayfarer-cache".to_string())
}

fn default_server_port() -> u16 {
    3000
}

fn default_static_dir() -> String {
    "public".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for WayfarerConfig {
    fn default() -> Self {
        Self {
            overpass: OverpassConfig {
                primary_url: default_overpass_primary_url(),
                mirror_url: default_overpass_mirror_url(),
                timeout_seconds: default_overpass_timeout(),
                radius_km: default_search_radius(),
            },
            geocoding: GeocodingConfig {
                base_url: default_geocoding_base_url(),
                timeout_seconds: default_geocoding_timeout(),
            },
            cache: CacheConfig {
                ttl_seconds: default_cache_ttl(),
                location: default_cache_location(),
            },
            server: ServerConfig {
                port: default_server_port(),
                static_dir: default_static_dir(),
            },
            logging: LoggingConfig {
                level: default_log_level(),
            },
        }
    }
}

impl WayfarerConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        // Load from file if path is provided or use default location
        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // Add environment variable overrides with WAYFARER_ prefix
        builder = builder.add_source(
            Environment::with_prefix("WAYFARER")
                .separator("_")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let config: WayfarerConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("wayfarer").join("config.toml"))
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> crate::Result<()> {
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> crate::Result<()> {
        if self.overpass.timeout_seconds == 0 || self.overpass.timeout_seconds > 300 {
            return Err(WayfarerError::config(
                "Overpass timeout must be between 1 and 300 seconds",
            ));
        }

        if self.geocoding.timeout_seconds == 0 || self.geocoding.timeout_seconds > 300 {
            return Err(WayfarerError::config(
                "Geocoding timeout must be between 1 and 300 seconds",
            ));
        }

        if self.overpass.radius_km == 0 || self.overpass.radius_km > 1000 {
            return Err(WayfarerError::config(
                "Search radius must be between 1 and 1000 km",
            ));
        }

        if self.cache.ttl_seconds > 7 * 24 * 3600 {
            return Err(WayfarerError::config("Cache TTL cannot exceed 1 week"));
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> crate::Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(WayfarerError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            )));
        }

        for url in [
            &self.overpass.primary_url,
            &self.overpass.mirror_url,
            &self.geocoding.base_url,
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(WayfarerError::config(format!(
                    "Upstream URL must be a valid HTTP or HTTPS URL, got '{url}'"
                )));
            }
        }

        if self.cache.location.is_empty() {
            return Err(WayfarerError::config("Cache location cannot be empty"));
        }

        Ok(())
    }
}
