/*
 *  config.rs
 *
 *  PaperWeather - weather at a glance
 *  (c) 2020-26 Stuart Hunter
 *
 *  Configuration: file, .env, environment and command line, then validation
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use dirs_next::home_dir;
use embedded_graphics::geometry::Size;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::layout::{LayoutConfig, LayoutSpec};
use crate::weather::{SourcePolicy, Units};

pub const CREDENTIAL_PLACEHOLDER: &str = "YOUR_OPENWEATHER_APPID";
pub const PANEL_WIDTH: u32 = 800;
pub const PANEL_HEIGHT: u32 = 480;

/// Error type for config loading/validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Validation error: {0}")]
    Validation(String),
}

/// How the display sink is chosen at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    /// panel when present, simulation otherwise
    #[default]
    Auto,
    Hardware,
    Simulation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub width: u32,
    pub height: u32,
    pub mode: DisplayMode,
    /// where the simulation panel writes its images
    pub output_dir: PathBuf,
    pub spi_bus: String,
    pub spi_speed_hz: u32,
    /// BCM numbering
    pub busy_pin: u64,
    pub dc_pin: u64,
    pub rst_pin: u64,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: PANEL_WIDTH,
            height: PANEL_HEIGHT,
            mode: DisplayMode::Auto,
            output_dir: PathBuf::from("."),
            spi_bus: "/dev/spidev0.0".to_string(),
            spi_speed_hz: 4_000_000,
            busy_pin: 24,
            dc_pin: 25,
            rst_pin: 17,
        }
    }
}

impl DisplayConfig {
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

/// One week; longer intervals and cache lifetimes are rejected.
pub const MAX_MINUTES: u64 = 7 * 24 * 60;

/// Top-level app configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub openweather_appid: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// shown in the header; coordinates are used when unset
    pub location_name: Option<String>,
    pub units: Units,
    pub locale: String,
    pub locale_dir: PathBuf,
    pub refresh_interval_minutes: u64,
    pub cache_ttl_minutes: u64,
    pub request_timeout_secs: u64,
    pub retry_backoff_ms: u64,
    pub display: DisplayConfig,
    pub layout: LayoutConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            openweather_appid: CREDENTIAL_PLACEHOLDER.to_string(),
            latitude: None,
            longitude: None,
            location_name: None,
            units: Units::Metric,
            locale: "en_US".to_string(),
            locale_dir: PathBuf::from("locale"),
            refresh_interval_minutes: 30,
            cache_ttl_minutes: 10,
            request_timeout_secs: 10,
            retry_backoff_ms: 1500,
            display: DisplayConfig::default(),
            layout: LayoutConfig::default(),
        }
    }
}

impl Config {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_minutes.saturating_mul(60))
    }

    pub fn source_policy(&self) -> SourcePolicy {
        SourcePolicy {
            ttl: Duration::from_secs(self.cache_ttl_minutes.saturating_mul(60)),
            retry_backoff: Duration::from_millis(self.retry_backoff_ms),
        }
    }

    pub fn has_credential(&self) -> bool {
        let key = self.openweather_appid.trim();
        !key.is_empty() && key != CREDENTIAL_PLACEHOLDER
    }

    /// Validated layout for this configuration's canvas.
    pub fn layout_spec(&self) -> Result<LayoutSpec, ConfigError> {
        LayoutSpec::from_config(&self.layout, self.display.size())
    }

    /// Reject anything that would make a cycle meaningless.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => {
                if !(-90.0..=90.0).contains(&lat) {
                    return Err(ConfigError::Validation(format!("latitude {} outside [-90, 90]", lat)));
                }
                if !(-180.0..=180.0).contains(&lon) {
                    return Err(ConfigError::Validation(format!("longitude {} outside [-180, 180]", lon)));
                }
            }
            _ => {
                return Err(ConfigError::Validation("latitude and longitude must both be set".into()));
            }
        }
        if !(1..=MAX_MINUTES).contains(&self.refresh_interval_minutes) {
            return Err(ConfigError::Validation(format!(
                "refresh_interval_minutes {} outside [1, {}]",
                self.refresh_interval_minutes, MAX_MINUTES
            )));
        }
        if self.cache_ttl_minutes > MAX_MINUTES {
            return Err(ConfigError::Validation(format!(
                "cache_ttl_minutes {} exceeds {}",
                self.cache_ttl_minutes, MAX_MINUTES
            )));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Validation("request_timeout_secs must be positive".into()));
        }
        self.layout_spec().map(|_| ())
    }
}

/// Command line values that feed configuration.
#[derive(Debug, Clone, Default)]
pub struct CliOptions {
    pub config: Option<PathBuf>,
    pub simulate: bool,
    pub output_dir: Option<PathBuf>,
}

/// Build the effective configuration: defaults, file, `.env` + environment,
/// command line, then validation.
pub fn load(cli: &CliOptions) -> Result<Config, ConfigError> {
    match dotenvy::dotenv() {
        Ok(path) => debug!("loaded {}", path.display()),
        Err(e) if e.not_found() => {}
        Err(e) => warn!(".env ignored: {}", e),
    }

    let mut cfg = match cli.config.as_ref() {
        Some(p) if p.exists() => read_config(p)?,
        Some(p) => {
            return Err(ConfigError::Validation(format!("Config file not found: {}", p.display())));
        }
        None => match find_config_file() {
            Some(p) => read_config(&p)?,
            None => {
                warn!("no config file found, using defaults");
                Config::default()
            }
        },
    };

    apply_env_overrides(&mut cfg, |key| std::env::var(key).ok());
    apply_cli_overrides(&mut cfg, cli);
    cfg.validate()?;

    if !cfg.has_credential() {
        warn!("OpenWeather API key is not set; fetches will fail until OPENWEATHER_APPID is provided");
    }
    Ok(cfg)
}

/// Environment wins over the file. Bad numbers are logged and skipped.
pub fn apply_env_overrides<F>(cfg: &mut Config, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(v) = lookup("OPENWEATHER_APPID") {
        cfg.openweather_appid = v;
    }
    if let Some(v) = lookup("LATITUDE") {
        match v.trim().parse::<f64>() {
            Ok(lat) => cfg.latitude = Some(lat),
            Err(_) => warn!("LATITUDE='{}' is not a number, keeping configured value", v),
        }
    }
    if let Some(v) = lookup("LONGITUDE") {
        match v.trim().parse::<f64>() {
            Ok(lon) => cfg.longitude = Some(lon),
            Err(_) => warn!("LONGITUDE='{}' is not a number, keeping configured value", v),
        }
    }
    if let Some(v) = lookup("LOCALE") {
        cfg.locale = v;
    }
    if let Some(v) = lookup("UNITS") {
        match v.parse::<Units>() {
            Ok(units) => cfg.units = units,
            Err(e) => warn!("UNITS ignored: {}", e),
        }
    }
    if let Some(v) = lookup("REFRESH_INTERVAL_MINUTES") {
        match v.trim().parse::<u64>() {
            Ok(minutes) => cfg.refresh_interval_minutes = minutes,
            Err(_) => warn!("REFRESH_INTERVAL_MINUTES='{}' is not a number, keeping configured value", v),
        }
    }
}

pub fn apply_cli_overrides(cfg: &mut Config, cli: &CliOptions) {
    if cli.simulate {
        cfg.display.mode = DisplayMode::Simulation;
    }
    if let Some(dir) = cli.output_dir.as_ref() {
        cfg.display.output_dir = dir.clone();
    }
}

fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from("config.json");
    if local.exists() {
        return Some(local);
    }
    if let Some(home) = home_dir() {
        let p = home.join(".config/paperweather/config.json");
        if p.exists() {
            return Some(p);
        }
    }
    let yaml = PathBuf::from("config.yaml");
    if yaml.exists() {
        return Some(yaml);
    }
    None
}

/// JSON unless the extension says YAML.
pub fn read_config(path: &Path) -> Result<Config, ConfigError> {
    info!("reading configuration from {}", path.display());
    let s = fs::read_to_string(path)?;
    let is_yaml = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    );
    if is_yaml {
        Ok(serde_yaml::from_str(&s)?)
    } else {
        Ok(serde_json::from_str(&s)?)
    }
}
