/*
 *  layout/mod.rs
 *
 *  PaperWeather - weather at a glance
 *  (c) 2020-26 Stuart Hunter
 *
 *  Named regions of the dashboard and their validation
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

pub mod engine;
pub mod instruction;
pub mod text;

use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::config::{ConfigError, PANEL_HEIGHT, PANEL_WIDTH};
use crate::fonts::FontRef;

pub use engine::{LayoutEngine, PLACEHOLDER};
pub use instruction::{Align, DrawInstruction, Glyph, Ink, Shape, TextBlock};

/// What a region shows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionSource {
    Date,
    Time,
    Location,
    Temperature,
    Description,
    ConditionIcon,
    Humidity,
    Pressure,
    Wind,
    UvIndex,
    Sunrise,
    Sunset,
    MoonIcon,
    MoonAge,
    /// horizontal rule through the middle of the region
    Rule,
    /// outline of the region
    Frame,
    /// fixed text, translated
    Label(String),
    ForecastDay(usize),
    ForecastIcon(usize),
    ForecastHigh(usize),
    ForecastLow(usize),
}

/// A region as written in the configuration file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionConfig {
    pub name: String,
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
    pub source: RegionSource,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default)]
    pub font: FontRef,
    #[serde(default)]
    pub align: Align,
    #[serde(default)]
    pub wrap: bool,
}

fn default_color() -> String {
    "black".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub regions: Vec<RegionConfig>,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self { regions: default_regions() }
    }
}

/// A validated region.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    pub name: String,
    pub bounds: Rectangle,
    pub source: RegionSource,
    pub ink: Ink,
    pub font: FontRef,
    pub align: Align,
    pub wrap: bool,
}

/// Validated layout: canvas size plus the ordered region list. Later regions
/// draw over earlier ones.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutSpec {
    size: Size,
    regions: Vec<Region>,
}

impl LayoutSpec {
    pub fn from_config(config: &LayoutConfig, size: Size) -> Result<Self, ConfigError> {
        if size != Size::new(PANEL_WIDTH, PANEL_HEIGHT) {
            return Err(ConfigError::Validation(format!(
                "canvas must be {}x{}, got {}x{}",
                PANEL_WIDTH, PANEL_HEIGHT, size.width, size.height
            )));
        }

        let mut seen = HashSet::new();
        let mut regions = Vec::with_capacity(config.regions.len());
        for rc in &config.regions {
            if rc.name.trim().is_empty() {
                return Err(ConfigError::Validation("layout region with an empty name".into()));
            }
            if !seen.insert(rc.name.as_str()) {
                return Err(ConfigError::Validation(format!("duplicate layout region '{}'", rc.name)));
            }
            if rc.width == 0 || rc.height == 0 {
                return Err(ConfigError::Validation(format!("layout region '{}' has zero size", rc.name)));
            }
            let ink = rc
                .color
                .parse::<Ink>()
                .map_err(|e| ConfigError::Validation(format!("layout region '{}': {}", rc.name, e)))?;
            regions.push(Region {
                name: rc.name.clone(),
                bounds: Rectangle::new(Point::new(rc.x, rc.y), Size::new(rc.width, rc.height)),
                source: rc.source.clone(),
                ink,
                font: rc.font,
                align: rc.align,
                wrap: rc.wrap,
            });
        }
        Ok(Self { size, regions })
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn region(&self, name: &str) -> Option<&Region> {
        self.regions.iter().find(|r| r.name == name)
    }

    /// Top-right corner box for the staleness marker.
    pub fn stale_marker_bounds(&self) -> Rectangle {
        Rectangle::new(Point::new(self.size.width as i32 - 30, 4), Size::new(26, 26))
    }
}

fn region(name: &str, x: i32, y: i32, w: u32, h: u32, font: FontRef, color: &str, source: RegionSource) -> RegionConfig {
    RegionConfig {
        name: name.to_string(),
        x,
        y,
        width: w,
        height: h,
        source,
        color: color.to_string(),
        font,
        align: Align::Left,
        wrap: false,
    }
}

/// The stock 800x480 dashboard.
pub fn default_regions() -> Vec<RegionConfig> {
    use FontRef::*;
    use RegionSource::*;

    let mut regions = vec![
        // header
        region("date", 20, 15, 400, 24, Medium, "black", Date),
        region("time", 20, 45, 120, 40, Large, "black", Time),
        region("location", 150, 58, 280, 20, Medium, "black", Location),
        // current conditions
        region("condition_icon", 20, 100, 150, 150, Medium, "black", ConditionIcon),
        region("temperature", 180, 110, 260, 60, Huge, "black", Temperature),
        RegionConfig { wrap: true, ..region("description", 180, 200, 260, 60, Medium, "black", Description) },
        // sun and moon
        region("sunrise_label", 450, 30, 80, 14, Small, "black", Label("Sunrise".into())),
        region("sunrise", 450, 50, 80, 20, Medium, "black", Sunrise),
        region("sunset_label", 540, 30, 80, 14, Small, "black", Label("Sunset".into())),
        region("sunset", 540, 50, 80, 20, Medium, "black", Sunset),
        region("moon_icon", 650, 30, 96, 96, Medium, "black", MoonIcon),
        RegionConfig { align: Align::Center, ..region("moon_age", 630, 134, 140, 14, Small, "black", MoonAge) },
        // stats
        region("humidity", 450, 160, 320, 20, Medium, "black", Humidity),
        region("pressure", 450, 195, 320, 20, Medium, "black", Pressure),
        region("wind", 450, 230, 320, 20, Medium, "black", Wind),
        region("uv_index", 450, 265, 320, 20, Medium, "black", UvIndex),
        region("rule", 20, 319, 760, 3, Medium, "black", Rule),
    ];

    let column = 760 / 5;
    for slot in 0..5 {
        let x = 20 + slot as i32 * column;
        regions.push(RegionConfig {
            align: Align::Center,
            ..region(&format!("forecast_day_{}", slot), x + 10, 340, 130, 20, Medium, "black", ForecastDay(slot))
        });
        regions.push(region(&format!("forecast_icon_{}", slot), x + 45, 368, 60, 60, Medium, "black", ForecastIcon(slot)));
        regions.push(RegionConfig {
            align: Align::Right,
            ..region(&format!("forecast_high_{}", slot), x + 10, 440, 60, 20, Medium, "red", ForecastHigh(slot))
        });
        regions.push(region(&format!("forecast_low_{}", slot), x + 80, 440, 60, 20, Medium, "black", ForecastLow(slot)));
    }
    regions
}
