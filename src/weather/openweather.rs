/*
 *  weather/openweather.rs
 *
 *  PaperWeather - weather at a glance
 *  (c) 2020-26 Stuart Hunter
 *
 *  OpenWeather One Call provider
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

use chrono::{DateTime, Utc};
use flate2::read::GzDecoder;
use log::{debug, info, warn};
use reqwest::{Client, StatusCode, header};
use serde::Deserialize;
use std::io::Read;
use std::time::Duration;

use crate::config::Config;
use crate::weather::{Condition, FetchError, ForecastEntry, Units, WeatherProvider, WeatherSnapshot};

pub const ONECALL_V3_URL: &str = "https://api.openweathermap.org/data/3.0/onecall";
pub const ONECALL_V25_URL: &str = "https://api.openweathermap.org/data/2.5/onecall";

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));
const FORECAST_DAYS: usize = 5;

pub struct OpenWeatherProvider {
    client: Client,
    base_url: String,
    appid: String,
    latitude: f64,
    longitude: f64,
    units: Units,
    lang: String,
    location_name: String,
}

impl OpenWeatherProvider {
    pub fn new(config: &Config) -> Result<Self, FetchError> {
        let mut headers = header::HeaderMap::new();
        headers.insert("User-Agent", header::HeaderValue::from_static(USER_AGENT));
        headers.insert("Accept", header::HeaderValue::from_static("application/json"));
        headers.insert("Accept-Encoding", header::HeaderValue::from_static("gzip"));

        let timeout = Duration::from_secs(config.request_timeout_secs);
        let client = Client::builder()
            .connect_timeout(timeout)
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        let latitude = config.latitude.unwrap_or_default();
        let longitude = config.longitude.unwrap_or_default();
        let location_name = config
            .location_name
            .clone()
            .unwrap_or_else(|| format!("{:.2}, {:.2}", latitude, longitude));

        Ok(Self {
            client,
            base_url: ONECALL_V3_URL.to_string(),
            appid: config.openweather_appid.clone(),
            latitude,
            longitude,
            units: config.units,
            lang: language_of(&config.locale).to_string(),
            location_name,
        })
    }

    /// Point the provider at another endpoint, used for local stubs.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn send(&self) -> Result<reqwest::Response, FetchError> {
        let params = [
            ("lat", self.latitude.to_string()),
            ("lon", self.longitude.to_string()),
            ("appid", self.appid.clone()),
            ("units", self.units.as_query().to_string()),
            ("lang", self.lang.clone()),
            ("exclude", "minutely".to_string()),
        ];
        debug!("GET {} units={} lang={}", self.base_url, self.units, self.lang);
        Ok(self.client.get(&self.base_url).query(&params).send().await?)
    }
}

impl WeatherProvider for OpenWeatherProvider {
    fn name(&self) -> &str {
        "openweather"
    }

    async fn fetch(&mut self) -> Result<WeatherSnapshot, FetchError> {
        let mut response = self.send().await?;

        // 3.0 needs a separate subscription, older keys only work on 2.5
        if response.status() == StatusCode::UNAUTHORIZED && self.base_url == ONECALL_V3_URL {
            info!("One Call 3.0 rejected the key, switching to 2.5");
            self.base_url = ONECALL_V25_URL.to_string();
            response = self.send().await?;
        }

        let status = response.status();
        if !status.is_success() {
            warn!("openweather answered {}", status);
            return Err(FetchError::Status(status.as_u16()));
        }

        let raw = response.bytes().await?;
        let body = decode_body(&raw);
        parse_onecall(&body, self.units, &self.location_name)
    }
}

/// `ja_JP` -> `ja`
pub fn language_of(locale: &str) -> &str {
    locale.split(['_', '-', '.']).next().unwrap_or(locale)
}

/// Gzip bodies are inflated, anything else passes through.
pub fn decode_body(raw: &[u8]) -> String {
    let mut decoder = GzDecoder::new(raw);
    let mut decoded = String::new();
    match decoder.read_to_string(&mut decoded) {
        Ok(_) => decoded,
        Err(_) => String::from_utf8_lossy(raw).to_string(),
    }
}

#[derive(Debug, Deserialize)]
struct OneCall {
    #[serde(default)]
    timezone_offset: i32,
    current: Option<Current>,
    #[serde(default)]
    daily: Vec<Daily>,
}

#[derive(Debug, Deserialize)]
struct Current {
    dt: Option<i64>,
    temp: Option<f64>,
    humidity: Option<f64>,
    pressure: Option<f64>,
    wind_speed: Option<f64>,
    uvi: Option<f64>,
    sunrise: Option<i64>,
    sunset: Option<i64>,
    #[serde(default)]
    weather: Vec<WireCondition>,
}

#[derive(Debug, Deserialize)]
struct Daily {
    dt: i64,
    temp: Option<DailyTemp>,
    moon_phase: Option<f64>,
    #[serde(default)]
    weather: Vec<WireCondition>,
}

#[derive(Debug, Deserialize)]
struct DailyTemp {
    max: Option<f64>,
    min: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct WireCondition {
    #[serde(default)]
    id: u16,
    #[serde(default)]
    icon: String,
    #[serde(default)]
    description: String,
}

impl WireCondition {
    fn into_condition(self) -> Condition {
        Condition::new(self.id, self.icon, self.description)
    }
}

fn first_condition(list: Vec<WireCondition>) -> Condition {
    list.into_iter().next().map(WireCondition::into_condition).unwrap_or_default()
}

fn utc(secs: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(secs, 0)
}

/// Map a One Call body to a snapshot.
pub fn parse_onecall(body: &str, units: Units, location: &str) -> Result<WeatherSnapshot, FetchError> {
    let payload: OneCall = serde_json::from_str(body).map_err(|e| FetchError::Malformed(e.to_string()))?;
    let current = payload
        .current
        .ok_or_else(|| FetchError::Malformed("missing 'current' block".into()))?;
    let dt = current
        .dt
        .ok_or_else(|| FetchError::Malformed("missing current.dt".into()))?;
    let timestamp = utc(dt).ok_or_else(|| FetchError::Malformed(format!("bad timestamp {}", dt)))?;
    let temperature = current
        .temp
        .ok_or_else(|| FetchError::Malformed("missing current.temp".into()))?;

    let moon_phase = payload.daily.first().and_then(|d| d.moon_phase);
    let forecast: Vec<ForecastEntry> = payload
        .daily
        .into_iter()
        .take(FORECAST_DAYS)
        .filter_map(|day| {
            // a day the calendar cannot place is dropped, not drawn
            utc(day.dt)?;
            let offset_secs = day.dt.checked_sub(dt)?;
            let temp = day.temp?;
            Some(ForecastEntry {
                offset_secs,
                temperature: temp.max?,
                low: temp.min,
                condition: first_condition(day.weather),
            })
        })
        .collect();

    let mut snapshot = WeatherSnapshot::new(timestamp, location, units, temperature, first_condition(current.weather))
        .with_forecast(forecast);
    snapshot.utc_offset_secs = payload.timezone_offset;
    snapshot.humidity = current.humidity.map(|h| h.round().clamp(0.0, 100.0) as u8);
    snapshot.pressure_hpa = current.pressure.map(|p| p.round().max(0.0) as u32);
    snapshot.wind_speed = current.wind_speed;
    snapshot.uv_index = current.uvi;
    snapshot.sunrise = current.sunrise.and_then(utc);
    snapshot.sunset = current.sunset.and_then(utc);
    snapshot.moon_phase = moon_phase;
    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::io::Write;

    const BODY: &str = r#"{
        "lat": 35.68, "lon": 139.76, "timezone": "Asia/Tokyo", "timezone_offset": 32400,
        "current": {
            "dt": 1748750400, "sunrise": 1748719800, "sunset": 1748771400,
            "temp": 21.46, "humidity": 63, "pressure": 1012, "uvi": 5.2, "wind_speed": 3.6,
            "weather": [{"id": 803, "main": "Clouds", "description": "broken clouds", "icon": "04d"}]
        },
        "daily": [
            {"dt": 1748833200, "moon_phase": 0.2,
             "temp": {"min": 17.1, "max": 24.9}, "weather": [{"id": 500, "description": "light rain", "icon": "10d"}]},
            {"dt": 1748746800, "moon_phase": 0.17,
             "temp": {"min": 16.0, "max": 23.0}, "weather": [{"id": 800, "description": "clear sky", "icon": "01d"}]}
        ]
    }"#;

    #[test]
    fn maps_current_and_daily_blocks() {
        let snap = parse_onecall(BODY, Units::Metric, "Tokyo").unwrap();
        assert_eq!(snap.location, "Tokyo");
        assert_eq!(snap.temperature, 21.46);
        assert_eq!(snap.utc_offset_secs, 32400);
        assert_eq!(snap.humidity, Some(63));
        assert_eq!(snap.pressure_hpa, Some(1012));
        assert_eq!(snap.condition.description, "broken clouds");
        assert_eq!(snap.moon_phase, Some(0.2));
        assert_eq!(snap.forecast().len(), 2);
        // sorted ascending even though the payload was not
        assert!(snap.forecast()[0].offset_secs < snap.forecast()[1].offset_secs);
        assert_eq!(snap.forecast()[0].temperature, 23.0);
        assert_eq!(snap.forecast()[0].low, Some(16.0));
    }

    #[test]
    fn missing_fields_stay_absent() {
        let body = r#"{"current": {"dt": 1748750400, "temp": -3.0, "weather": []}}"#;
        let snap = parse_onecall(body, Units::Imperial, "Nowhere").unwrap();
        assert_eq!(snap.humidity, None);
        assert_eq!(snap.sunrise, None);
        assert_eq!(snap.moon_phase, None);
        assert!(snap.forecast().is_empty());
        assert_eq!(snap.units, Units::Imperial);
    }

    #[test]
    fn out_of_range_daily_timestamps_are_dropped() {
        let body = r#"{
            "current": {"dt": 1748750400, "temp": 12.0, "weather": []},
            "daily": [
                {"dt": 1000000000000000, "temp": {"max": 1, "min": 0}},
                {"dt": -9223372036854775808, "temp": {"max": 2, "min": 0}},
                {"dt": 1748836800, "temp": {"max": 15.5, "min": 8.0}}
            ]
        }"#;
        let snap = parse_onecall(body, Units::Metric, "Here").unwrap();
        assert_eq!(snap.forecast().len(), 1);
        assert_eq!(snap.forecast()[0].offset_secs, 86_400);
        assert!(snap.forecast_time(&snap.forecast()[0]).is_some());
    }

    #[test]
    fn missing_temperature_is_malformed() {
        let body = r#"{"current": {"dt": 1748750400}}"#;
        assert!(matches!(parse_onecall(body, Units::Metric, "x"), Err(FetchError::Malformed(_))));
        assert!(matches!(parse_onecall("<html>", Units::Metric, "x"), Err(FetchError::Malformed(_))));
    }

    #[test]
    fn gzip_and_plain_bodies_decode() {
        let mut enc = GzEncoder::new(Vec::new(), Compression::default());
        enc.write_all(BODY.as_bytes()).unwrap();
        let zipped = enc.finish().unwrap();
        assert_eq!(decode_body(&zipped), BODY);
        assert_eq!(decode_body(BODY.as_bytes()), BODY);
    }

    #[test]
    fn language_is_locale_prefix() {
        assert_eq!(language_of("ja_JP"), "ja");
        assert_eq!(language_of("en"), "en");
        assert_eq!(language_of("de-DE.UTF-8"), "de");
    }
}
