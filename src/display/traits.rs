/*
 *  display/traits.rs
 *
 *  PaperWeather - weather at a glance
 *  (c) 2020-26 Stuart Hunter
 *
 *  Core trait for anything that can show a finished frame
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

use embedded_graphics::prelude::*;

use crate::display::error::DisplayError;
use crate::render::CanvasPair;

/// A destination for rendered frames.
///
/// Implementations take ownership of the canvas; nothing is retained by the
/// caller after `present`.
pub trait DisplaySink: Send {
    /// Short name for log lines
    fn name(&self) -> &'static str;

    /// Dimensions frames must have
    fn size(&self) -> Size;

    /// Show one frame. Fails with `DimensionMismatch` when the canvas is not
    /// exactly `size()`.
    fn present(&mut self, canvas: CanvasPair) -> Result<(), DisplayError>;

    /// Low-power state between refreshes
    fn sleep(&mut self) -> Result<(), DisplayError> {
        Ok(())
    }
}

/// Shared dimension check for `present` implementations.
pub fn check_dimensions(expected: Size, canvas: &CanvasPair) -> Result<(), DisplayError> {
    let actual = canvas.size();
    if actual != expected || canvas.red.size() != expected {
        return Err(DisplayError::DimensionMismatch {
            expected: (expected.width, expected.height),
            actual: (actual.width, actual.height),
        });
    }
    Ok(())
}
