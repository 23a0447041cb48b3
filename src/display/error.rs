/*
 *  display/error.rs
 *
 *  PaperWeather - weather at a glance
 *  (c) 2020-26 Stuart Hunter
 *
 *  Error type for the display sinks
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

use std::error::Error;
use std::fmt;

/// Unified error type for all sink operations
#[derive(Debug)]
pub enum DisplayError {
    /// Panel not attached, not accessible, or failed to initialise
    HardwareUnavailable(String),

    /// SPI communication error
    Spi(String),

    /// GPIO pin error
    Gpio(String),

    /// Packed buffer does not match the panel
    BufferSizeMismatch { expected: usize, actual: usize },

    /// Canvas does not match the sink's dimensions
    DimensionMismatch { expected: (u32, u32), actual: (u32, u32) },

    /// Writing simulation output failed
    Io(std::io::Error),

    /// Image encoding failed
    Encode(String),
}

impl DisplayError {
    pub fn is_hardware_unavailable(&self) -> bool {
        matches!(self, DisplayError::HardwareUnavailable(_))
    }
}

impl fmt::Display for DisplayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayError::HardwareUnavailable(msg) =>
                write!(f, "Display hardware unavailable: {}", msg),
            DisplayError::Spi(msg) =>
                write!(f, "SPI communication error: {}", msg),
            DisplayError::Gpio(msg) =>
                write!(f, "GPIO error: {}", msg),
            DisplayError::BufferSizeMismatch { expected, actual } =>
                write!(f, "Buffer size mismatch: expected {} bytes, got {}", expected, actual),
            DisplayError::DimensionMismatch { expected, actual } =>
                write!(f, "Canvas is {}x{}, display expects {}x{}", actual.0, actual.1, expected.0, expected.1),
            DisplayError::Io(err) =>
                write!(f, "I/O error: {}", err),
            DisplayError::Encode(msg) =>
                write!(f, "Image encoding failed: {}", msg),
        }
    }
}

impl Error for DisplayError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            DisplayError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for DisplayError {
    fn from(err: std::io::Error) -> Self {
        DisplayError::Io(err)
    }
}
