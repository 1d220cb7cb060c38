//! Configuration for the snowmap client

use serde::{Deserialize, Serialize};
use snowmap_layers::LineStyle;
use snowmap_sync::SyncConfig;
use snowmap_types::{Catalog, GeoPoint};

/// Main client configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Remote source and polling
    #[serde(default)]
    pub sync: SyncConfig,

    /// Report categories, in draw priority order
    #[serde(default)]
    pub catalog: Catalog,

    /// Map defaults
    #[serde(default)]
    pub map: MapConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Initial map state and styling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapConfig {
    /// Center shown before the user moves the map
    #[serde(default = "default_center")]
    pub center: GeoPoint,

    #[serde(default = "default_zoom")]
    pub zoom: f64,

    /// Stroke width of path segments
    #[serde(default = "default_line_width")]
    pub line_width: f64,

    /// Initial snow report window in days, none shows every report
    #[serde(default)]
    pub from_days: Option<u32>,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            center: default_center(),
            zoom: default_zoom(),
            line_width: default_line_width(),
            from_days: None,
        }
    }
}

impl MapConfig {
    pub fn line_style(&self) -> LineStyle {
        LineStyle {
            width: self.line_width,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level, overridden by `RUST_LOG`
    #[serde(default = "default_log_level")]
    pub level: String,

    /// JSON format
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// Default value helpers
fn default_center() -> GeoPoint {
    GeoPoint::new(-73.5673, 45.5017)
}

fn default_zoom() -> f64 {
    13.0
}

fn default_line_width() -> f64 {
    snowmap_layers::style::DEFAULT_LINE_WIDTH
}

fn default_log_level() -> String {
    "info".to_string()
}

impl ClientConfig {
    /// Load configuration: built-in defaults, then the optional file, then
    /// `SNOWMAP__`-prefixed environment variables (`SNOWMAP__SYNC__ENDPOINT`).
    pub fn load(path: Option<&str>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();

        builder = builder.add_source(config::Config::try_from(&ClientConfig::default())?);

        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("SNOWMAP")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }
}
