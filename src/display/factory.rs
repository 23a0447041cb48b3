/*
 *  display/factory.rs
 *
 *  PaperWeather - weather at a glance
 *  (c) 2020-26 Stuart Hunter
 *
 *  Capability probing: pick the panel or the simulation once at startup
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

use log::{info, warn};

use crate::config::{DisplayConfig, DisplayMode};
use crate::display::error::DisplayError;
use crate::display::simulation::SimulationPanel;
use crate::display::traits::DisplaySink;

#[cfg(feature = "hardware")]
use crate::display::hardware::HardwarePanel;

/// Type alias for boxed display sink trait objects
pub type BoxedSink = Box<dyn DisplaySink>;

/// Choose the sink for this process.
///
/// `Auto` tries the panel and falls back to simulation when it is not
/// available; `Hardware` treats a missing panel as fatal.
pub fn open_display(config: &DisplayConfig) -> Result<BoxedSink, DisplayError> {
    match config.mode {
        DisplayMode::Simulation => simulation(config),
        DisplayMode::Hardware => open_hardware(config),
        DisplayMode::Auto => match open_hardware(config) {
            Ok(sink) => Ok(sink),
            Err(e) if e.is_hardware_unavailable() => {
                warn!("{}; falling back to simulation", e);
                simulation(config)
            }
            Err(e) => Err(e),
        },
    }
}

fn simulation(config: &DisplayConfig) -> Result<BoxedSink, DisplayError> {
    let panel = SimulationPanel::new(&config.output_dir, config.size())?;
    info!("using simulation panel, output in {}", panel.output_dir().display());
    Ok(Box::new(panel))
}

#[cfg(feature = "hardware")]
fn open_hardware(config: &DisplayConfig) -> Result<BoxedSink, DisplayError> {
    let panel = HardwarePanel::open(config)?;
    info!("using hardware panel {}", panel.name());
    Ok(Box::new(panel))
}

#[cfg(not(feature = "hardware"))]
fn open_hardware(_config: &DisplayConfig) -> Result<BoxedSink, DisplayError> {
    Err(DisplayError::HardwareUnavailable(
        "built without hardware support. Enable with --features hardware".to_string(),
    ))
}
