/*
 *  error.rs
 *
 *  PaperWeather - weather at a glance
 *  (c) 2020-26 Stuart Hunter
 *
 *  Process-level failure classes
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

use thiserror::Error;

use crate::config::ConfigError;
use crate::display::DisplayError;
use crate::weather::FetchError;

#[derive(Debug, Error)]
pub enum AppError {
    /// Provider unreachable or answered badly. Absorbed by the cache when
    /// one exists.
    #[error("network failure: {0}")]
    NetworkFailure(#[from] FetchError),

    #[error("no weather data available: {0}")]
    NoDataAvailable(String),

    #[error("display hardware unavailable: {0}")]
    HardwareUnavailable(String),

    #[error("configuration invalid: {0}")]
    ConfigurationInvalid(#[from] ConfigError),

    #[error("display error: {0}")]
    Display(DisplayError),

    /// The sink refused a finished frame.
    #[error("frame not presented: {0}")]
    PresentFailed(String),
}

impl From<DisplayError> for AppError {
    fn from(e: DisplayError) -> Self {
        match e {
            DisplayError::HardwareUnavailable(msg) => AppError::HardwareUnavailable(msg),
            other => AppError::Display(other),
        }
    }
}
