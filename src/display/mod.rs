/*
 *  display/mod.rs
 *
 *  PaperWeather - weather at a glance
 *  (c) 2020-26 Stuart Hunter
 *
 *  Display sinks: the e-paper panel and its file-based simulation
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

pub mod error;
pub mod factory;
pub mod simulation;
pub mod traits;

#[cfg(feature = "hardware")]
pub mod hardware;

pub use error::DisplayError;
pub use factory::{BoxedSink, open_display};
pub use simulation::SimulationPanel;
pub use traits::DisplaySink;

#[cfg(feature = "hardware")]
pub use hardware::HardwarePanel;
