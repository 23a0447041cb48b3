/*
 *  lib.rs
 *
 *  PaperWeather - weather at a glance
 *  (c) 2020-26 Stuart Hunter
 *
 *  Weather snapshot to three-color e-paper pipeline
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

pub mod config;
pub mod controller;
pub mod display;
pub mod error;
pub mod fonts;
pub mod i18n;
pub mod layout;
pub mod render;
pub mod weather;

pub use controller::{CycleOutcome, CycleReport, CycleState, RefreshController};
pub use error::AppError;

include!(concat!(env!("OUT_DIR"), "/build_info.rs"));

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    #[test]
    fn build_date_is_a_utc_timestamp() {
        assert!(NaiveDateTime::parse_from_str(BUILD_DATE, "%Y-%m-%d %H:%M:%S UTC").is_ok());
    }
}
