/*
 *  display/simulation.rs
 *
 *  PaperWeather - weather at a glance
 *  (c) 2020-26 Stuart Hunter
 *
 *  File-backed stand-in for the panel: plane images plus a color preview
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

use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use log::info;
use std::fs;
use std::path::{Path, PathBuf};
use tiny_skia::Pixmap;

use crate::display::error::DisplayError;
use crate::display::traits::{DisplaySink, check_dimensions};
use crate::render::{CanvasPair, PlaneBuffer};

pub const BLACK_FILE: &str = "screen_black.png";
pub const RED_FILE: &str = "screen_red.png";
pub const PREVIEW_FILE: &str = "screen_preview.png";

const WHITE: [u8; 4] = [255, 255, 255, 255];
const BLACK: [u8; 4] = [0, 0, 0, 255];
const RED: [u8; 4] = [255, 0, 0, 255];

/// Writes each presented frame to `output_dir`, overwriting the previous one.
pub struct SimulationPanel {
    output_dir: PathBuf,
    size: Size,
    frames: u64,
}

impl SimulationPanel {
    pub fn new(output_dir: impl Into<PathBuf>, size: Size) -> Result<Self, DisplayError> {
        let output_dir = output_dir.into();
        fs::create_dir_all(&output_dir)?;
        Ok(Self { output_dir, size, frames: 0 })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Frames presented so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    fn save(&self, pixmap: &Pixmap, name: &str) -> Result<(), DisplayError> {
        let path = self.output_dir.join(name);
        pixmap
            .save_png(&path)
            .map_err(|e| DisplayError::Encode(format!("{}: {}", path.display(), e)))
    }
}

impl DisplaySink for SimulationPanel {
    fn name(&self) -> &'static str {
        "simulation"
    }

    fn size(&self) -> Size {
        self.size
    }

    fn present(&mut self, canvas: CanvasPair) -> Result<(), DisplayError> {
        check_dimensions(self.size, &canvas)?;

        self.save(&plane_image(&canvas.black)?, BLACK_FILE)?;
        self.save(&plane_image(&canvas.red)?, RED_FILE)?;
        self.save(&preview_image(&canvas)?, PREVIEW_FILE)?;

        self.frames += 1;
        info!("simulation: frame {} written to {}", self.frames, self.output_dir.display());
        Ok(())
    }

    fn sleep(&mut self) -> Result<(), DisplayError> {
        info!("simulation: display sleeping");
        Ok(())
    }
}

fn blank_pixmap(size: Size) -> Result<Pixmap, DisplayError> {
    Pixmap::new(size.width, size.height)
        .ok_or_else(|| DisplayError::Encode(format!("cannot allocate {}x{} image", size.width, size.height)))
}

/// One plane as it would appear on a monochrome panel: ink black on white.
fn plane_image(plane: &PlaneBuffer) -> Result<Pixmap, DisplayError> {
    let mut pixmap = blank_pixmap(plane.size())?;
    for (px, c) in pixmap.data_mut().chunks_exact_mut(4).zip(plane.as_slice()) {
        px.copy_from_slice(if c.is_on() { &BLACK } else { &WHITE });
    }
    Ok(pixmap)
}

/// Composite: white paper, black ink, red over black.
fn preview_image(canvas: &CanvasPair) -> Result<Pixmap, DisplayError> {
    let mut pixmap = blank_pixmap(canvas.size())?;
    let planes = canvas.black.as_slice().iter().zip(canvas.red.as_slice());
    for (px, (black, red)) in pixmap.data_mut().chunks_exact_mut(4).zip(planes) {
        let rgba = match (*black, *red) {
            (_, BinaryColor::On) => &RED,
            (BinaryColor::On, BinaryColor::Off) => &BLACK,
            (BinaryColor::Off, BinaryColor::Off) => &WHITE,
        };
        px.copy_from_slice(rgba);
    }
    Ok(pixmap)
}
