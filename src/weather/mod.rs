/*
 *  weather/mod.rs
 *
 *  PaperWeather - weather at a glance
 *  (c) 2020-26 Stuart Hunter
 *
 *  Weather snapshot model and the provider seam
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

pub mod openweather;
pub mod source;

use chrono::{DateTime, Duration as ChronoDuration, FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub use openweather::OpenWeatherProvider;
pub use source::{CacheEntry, SnapshotReading, SourceError, SourcePolicy, WeatherSource};

/// Measurement system a snapshot was acquired in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Metric,
    Imperial,
    Standard,
}

impl Units {
    pub fn as_query(self) -> &'static str {
        match self {
            Units::Metric => "metric",
            Units::Imperial => "imperial",
            Units::Standard => "standard",
        }
    }

    pub fn temperature_suffix(self) -> &'static str {
        match self {
            Units::Metric => "°C",
            Units::Imperial => "°F",
            Units::Standard => "K",
        }
    }

    pub fn wind_suffix(self) -> &'static str {
        match self {
            Units::Imperial => "mph",
            Units::Metric | Units::Standard => "m/s",
        }
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_query())
    }
}

impl FromStr for Units {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "metric" => Ok(Units::Metric),
            "imperial" => Ok(Units::Imperial),
            "standard" => Ok(Units::Standard),
            other => Err(format!("unknown units '{}' (expected metric, imperial or standard)", other)),
        }
    }
}

/// Icon family for a provider condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConditionKind {
    Clear,
    FewClouds,
    ScatteredClouds,
    BrokenClouds,
    ShowerRain,
    Rain,
    Thunderstorm,
    Snow,
    Mist,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Condition {
    /// provider condition id, e.g. 500 for light rain
    pub id: u16,
    /// provider icon code, e.g. "10d"
    pub icon: String,
    pub description: String,
}

impl Condition {
    pub fn new(id: u16, icon: impl Into<String>, description: impl Into<String>) -> Self {
        Self { id, icon: icon.into(), description: description.into() }
    }

    pub fn kind(&self) -> ConditionKind {
        match self.icon.get(..2) {
            Some("01") => ConditionKind::Clear,
            Some("02") => ConditionKind::FewClouds,
            Some("03") => ConditionKind::ScatteredClouds,
            Some("04") => ConditionKind::BrokenClouds,
            Some("09") => ConditionKind::ShowerRain,
            Some("10") => ConditionKind::Rain,
            Some("11") => ConditionKind::Thunderstorm,
            Some("13") => ConditionKind::Snow,
            Some("50") => ConditionKind::Mist,
            _ => Self::kind_from_id(self.id),
        }
    }

    pub fn is_night(&self) -> bool {
        self.icon.ends_with('n')
    }

    fn kind_from_id(id: u16) -> ConditionKind {
        match id {
            200..=299 => ConditionKind::Thunderstorm,
            300..=399 => ConditionKind::ShowerRain,
            500..=599 => ConditionKind::Rain,
            600..=699 => ConditionKind::Snow,
            700..=799 => ConditionKind::Mist,
            800 => ConditionKind::Clear,
            801 => ConditionKind::FewClouds,
            802 => ConditionKind::ScatteredClouds,
            803 | 804 => ConditionKind::BrokenClouds,
            _ => ConditionKind::Unknown,
        }
    }
}

/// One day of the short-range outlook.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastEntry {
    /// seconds after the snapshot timestamp
    pub offset_secs: i64,
    /// daily high
    pub temperature: f64,
    pub low: Option<f64>,
    pub condition: Condition,
}

/// Immutable observation of current conditions plus forecast.
///
/// Units are fixed at acquisition; everything downstream formats with
/// `units` rather than the configured value.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherSnapshot {
    pub timestamp: DateTime<Utc>,
    /// location's offset from UTC, used for every displayed wall-clock value
    pub utc_offset_secs: i32,
    pub location: String,
    pub units: Units,
    pub temperature: f64,
    pub condition: Condition,
    pub humidity: Option<u8>,
    pub pressure_hpa: Option<u32>,
    pub wind_speed: Option<f64>,
    pub uv_index: Option<f64>,
    pub sunrise: Option<DateTime<Utc>>,
    pub sunset: Option<DateTime<Utc>>,
    /// lunation fraction 0..1, 0 = new moon, 0.5 = full
    pub moon_phase: Option<f64>,
    forecast: Vec<ForecastEntry>,
}

impl WeatherSnapshot {
    pub fn new(
        timestamp: DateTime<Utc>,
        location: impl Into<String>,
        units: Units,
        temperature: f64,
        condition: Condition,
    ) -> Self {
        Self {
            timestamp,
            utc_offset_secs: 0,
            location: location.into(),
            units,
            temperature,
            condition,
            humidity: None,
            pressure_hpa: None,
            wind_speed: None,
            uv_index: None,
            sunrise: None,
            sunset: None,
            moon_phase: None,
            forecast: Vec::new(),
        }
    }

    /// Replace the forecast, ordered ascending by offset.
    pub fn with_forecast(mut self, mut entries: Vec<ForecastEntry>) -> Self {
        entries.sort_by_key(|e| e.offset_secs);
        self.forecast = entries;
        self
    }

    pub fn forecast(&self) -> &[ForecastEntry] {
        &self.forecast
    }

    pub fn offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_secs).unwrap_or_else(|| Utc.fix())
    }

    /// Observation time in the location's wall clock.
    pub fn local_time(&self) -> DateTime<FixedOffset> {
        self.timestamp.with_timezone(&self.offset())
    }

    pub fn to_local(&self, at: DateTime<Utc>) -> DateTime<FixedOffset> {
        at.with_timezone(&self.offset())
    }

    /// Wall-clock time of a forecast entry, `None` when the offset lands
    /// outside the representable calendar.
    pub fn forecast_time(&self, entry: &ForecastEntry) -> Option<DateTime<FixedOffset>> {
        let offset = ChronoDuration::try_seconds(entry.offset_secs)?;
        self.timestamp.checked_add_signed(offset).map(|t| self.to_local(t))
    }
}

/// Failure talking to a weather provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("request timed out")]
    Timeout,
    #[error("connection failed: {0}")]
    Connect(String),
    #[error("provider returned HTTP {0}")]
    Status(u16),
    #[error("malformed payload: {0}")]
    Malformed(String),
    #[error("http error: {0}")]
    Http(String),
}

impl FetchError {
    /// DNS and connect failures, the only class retried within a call.
    pub fn is_transient_connect(&self) -> bool {
        matches!(self, FetchError::Connect(_))
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::Timeout
        } else if e.is_connect() {
            FetchError::Connect(e.to_string())
        } else if e.is_decode() {
            FetchError::Malformed(e.to_string())
        } else {
            FetchError::Http(e.to_string())
        }
    }
}

/// Anything that can produce a fresh snapshot.
#[allow(async_fn_in_trait)]
pub trait WeatherProvider {
    /// Short name used in log lines.
    fn name(&self) -> &str;

    async fn fetch(&mut self) -> Result<WeatherSnapshot, FetchError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, TimeZone, Timelike};

    #[test]
    fn condition_kind_prefers_icon_code() {
        assert_eq!(Condition::new(500, "10d", "light rain").kind(), ConditionKind::Rain);
        assert_eq!(Condition::new(800, "01n", "clear sky").kind(), ConditionKind::Clear);
        assert!(Condition::new(800, "01n", "clear sky").is_night());
        assert_eq!(Condition::new(211, "", "thunder").kind(), ConditionKind::Thunderstorm);
        assert_eq!(Condition::new(0, "", "").kind(), ConditionKind::Unknown);
    }

    #[test]
    fn forecast_is_kept_sorted() {
        let ts = Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap();
        let day = |offset| ForecastEntry {
            offset_secs: offset,
            temperature: 10.0,
            low: None,
            condition: Condition::default(),
        };
        let snap = WeatherSnapshot::new(ts, "Here", Units::Metric, 4.0, Condition::default())
            .with_forecast(vec![day(172_800), day(0), day(86_400)]);
        let offsets: Vec<i64> = snap.forecast().iter().map(|e| e.offset_secs).collect();
        assert_eq!(offsets, vec![0, 86_400, 172_800]);
    }

    #[test]
    fn local_time_applies_offset() {
        let ts = Utc.with_ymd_and_hms(2025, 3, 1, 23, 30, 0).unwrap();
        let mut snap = WeatherSnapshot::new(ts, "Tokyo", Units::Metric, 4.0, Condition::default());
        snap.utc_offset_secs = 9 * 3600;
        assert_eq!(snap.local_time().hour(), 8);
    }

    #[test]
    fn forecast_time_outside_calendar_is_none() {
        let ts = Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap();
        let snap = WeatherSnapshot::new(ts, "Here", Units::Metric, 4.0, Condition::default());
        let entry = |offset_secs| ForecastEntry { offset_secs, temperature: 1.0, low: None, condition: Condition::default() };

        assert_eq!(snap.forecast_time(&entry(86_400)).map(|t| t.day()), Some(2));
        assert!(snap.forecast_time(&entry(1_000_000_000_000_000)).is_none());
        assert!(snap.forecast_time(&entry(i64::MAX)).is_none());
        assert!(snap.forecast_time(&entry(i64::MIN)).is_none());
    }

    #[test]
    fn units_parse_case_insensitively() {
        assert_eq!("Imperial".parse::<Units>(), Ok(Units::Imperial));
        assert!("kelvin".parse::<Units>().is_err());
    }

    #[test]
    fn only_connect_errors_are_transient() {
        assert!(FetchError::Connect("dns".into()).is_transient_connect());
        assert!(!FetchError::Timeout.is_transient_connect());
        assert!(!FetchError::Status(503).is_transient_connect());
    }
}
