/*
 *  layout/engine.rs
 *
 *  PaperWeather - weather at a glance
 *  (c) 2020-26 Stuart Hunter
 *
 *  Snapshot + layout to an ordered list of draw instructions
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
use embedded_graphics::primitives::Rectangle;
use log::debug;

use crate::fonts::FontRef;
use crate::i18n::I18n;
use crate::layout::instruction::{Align, DrawInstruction, Glyph, Ink, Shape, TextBlock};
use crate::layout::text::fit_lines;
use crate::layout::{LayoutSpec, Region, RegionSource};
use crate::weather::{Units, WeatherSnapshot};

/// Drawn in place of any value the snapshot does not carry.
pub const PLACEHOLDER: &str = "--";

/// Days in a synodic month, for the moon age readout.
const LUNATION_DAYS: f64 = 29.53;

/// Pure function of (snapshot, layout, staleness) to draw instructions.
/// Holds nothing but the translation table.
#[derive(Debug, Clone)]
pub struct LayoutEngine {
    i18n: I18n,
}

impl LayoutEngine {
    pub fn new(i18n: I18n) -> Self {
        Self { i18n }
    }

    pub fn i18n(&self) -> &I18n {
        &self.i18n
    }

    /// One instruction per region, in region order, then the staleness
    /// marker when `is_stale`.
    pub fn build_instructions(&self, snapshot: &WeatherSnapshot, spec: &LayoutSpec, is_stale: bool) -> Vec<DrawInstruction> {
        let mut out: Vec<DrawInstruction> = spec
            .regions()
            .iter()
            .map(|region| self.region_instruction(region, snapshot))
            .collect();

        if is_stale {
            out.push(DrawInstruction {
                region: "stale_marker".to_string(),
                ink: Ink::Red,
                bounds: spec.stale_marker_bounds(),
                shape: Shape::Icon(Glyph::StaleMarker),
            });
        }
        debug!("layout produced {} instructions (stale={})", out.len(), is_stale);
        out
    }

    /// Shown when no snapshot exists at all.
    pub fn build_error_instructions(&self, spec: &LayoutSpec, reason: &str) -> Vec<DrawInstruction> {
        let size = spec.size();
        let width = size.width.saturating_sub(80);
        let headline = Rectangle::new(Point::new(40, size.height as i32 / 2 - 60), Size::new(width, 40));
        let detail = Rectangle::new(Point::new(40, size.height as i32 / 2), Size::new(width, 60));
        let frame = Rectangle::new(Point::new(6, 6), Size::new(size.width.saturating_sub(12), size.height.saturating_sub(12)));

        vec![
            text_instruction("error_headline", Ink::Black, headline, FontRef::Large, Align::Center, false,
                self.i18n.tr("No Weather Data Available")),
            text_instruction("error_reason", Ink::Black, detail, FontRef::Medium, Align::Center, true, reason),
            DrawInstruction {
                region: "error_frame".to_string(),
                ink: Ink::Red,
                bounds: frame,
                shape: Shape::Rect { filled: false, stroke: 4 },
            },
        ]
    }

    fn region_instruction(&self, region: &Region, snap: &WeatherSnapshot) -> DrawInstruction {
        match &region.source {
            RegionSource::ConditionIcon => self.icon(
                region,
                Some(Glyph::Condition { kind: snap.condition.kind(), night: snap.condition.is_night() }),
            ),
            RegionSource::ForecastIcon(slot) => self.icon(
                region,
                snap.forecast()
                    .get(*slot)
                    .map(|f| Glyph::Condition { kind: f.condition.kind(), night: false }),
            ),
            RegionSource::MoonIcon => self.icon(region, snap.moon_phase.map(|phase| Glyph::Moon { phase })),
            RegionSource::Rule => {
                let b = region.bounds;
                let mid = b.top_left.y + b.size.height as i32 / 2;
                DrawInstruction {
                    region: region.name.clone(),
                    ink: region.ink,
                    bounds: b,
                    shape: Shape::Line {
                        start: Point::new(b.top_left.x, mid),
                        end: Point::new(b.top_left.x + b.size.width as i32 - 1, mid),
                        width: b.size.height,
                    },
                }
            }
            RegionSource::Frame => DrawInstruction {
                region: region.name.clone(),
                ink: region.ink,
                bounds: region.bounds,
                shape: Shape::Rect { filled: false, stroke: 2 },
            },
            _ => {
                let value = self.text_for(&region.source, snap);
                self.text(region, value.as_deref().unwrap_or(PLACEHOLDER))
            }
        }
    }

    fn text_for(&self, source: &RegionSource, snap: &WeatherSnapshot) -> Option<String> {
        let tr = |key: &str| self.i18n.tr(key).to_string();
        let units = snap.units;
        match source {
            RegionSource::Date => {
                let local = snap.local_time();
                let weekday = local.format("%a").to_string();
                Some(format!("{} ({})", local.format("%Y/%m/%d"), tr(&weekday)))
            }
            RegionSource::Time => Some(snap.local_time().format("%H:%M").to_string()),
            RegionSource::Location => non_empty(&snap.location),
            RegionSource::Temperature => Some(format_temperature(snap.temperature, units)),
            RegionSource::Description => non_empty(&snap.condition.description),
            RegionSource::Humidity => snap.humidity.map(|h| format!("{}: {}%", tr("Humidity"), h)),
            RegionSource::Pressure => snap.pressure_hpa.map(|p| format!("{}: {}hPa", tr("Pressure"), p)),
            RegionSource::Wind => snap
                .wind_speed
                .map(|w| format!("{}: {:.1}{}", tr("Wind"), w, units.wind_suffix())),
            RegionSource::UvIndex => snap.uv_index.map(|u| format!("{}: {:.1}", tr("UV Index"), u)),
            RegionSource::Sunrise => snap.sunrise.map(|t| snap.to_local(t).format("%H:%M").to_string()),
            RegionSource::Sunset => snap.sunset.map(|t| snap.to_local(t).format("%H:%M").to_string()),
            RegionSource::MoonAge => snap
                .moon_phase
                .map(|p| format!("{}: {:.1}", tr("Age"), p * LUNATION_DAYS)),
            RegionSource::Label(text) => non_empty(text).map(|t| tr(&t)),
            RegionSource::ForecastDay(slot) => snap
                .forecast()
                .get(*slot)
                .and_then(|f| snap.forecast_time(f))
                .map(|t| tr(&t.format("%a").to_string())),
            RegionSource::ForecastHigh(slot) => snap
                .forecast()
                .get(*slot)
                .map(|f| format_short_temperature(f.temperature, units)),
            RegionSource::ForecastLow(slot) => snap
                .forecast()
                .get(*slot)
                .and_then(|f| f.low)
                .map(|t| format_short_temperature(t, units)),
            RegionSource::ConditionIcon
            | RegionSource::ForecastIcon(_)
            | RegionSource::MoonIcon
            | RegionSource::Rule
            | RegionSource::Frame => None,
        }
    }

    fn text(&self, region: &Region, content: &str) -> DrawInstruction {
        text_instruction(&region.name, region.ink, region.bounds, region.font, region.align, region.wrap, content)
    }

    /// Icon, or the placeholder text when there is nothing to draw.
    fn icon(&self, region: &Region, glyph: Option<Glyph>) -> DrawInstruction {
        match glyph {
            Some(glyph) => DrawInstruction {
                region: region.name.clone(),
                ink: region.ink,
                bounds: region.bounds,
                shape: Shape::Icon(glyph),
            },
            None => text_instruction(&region.name, region.ink, region.bounds, region.font, Align::Center, false, PLACEHOLDER),
        }
    }
}

fn text_instruction(name: &str, ink: Ink, bounds: Rectangle, font: FontRef, align: Align, wrap: bool, content: &str) -> DrawInstruction {
    DrawInstruction {
        region: name.to_string(),
        ink,
        bounds,
        shape: Shape::Text(TextBlock {
            font,
            align,
            content: content.to_string(),
            lines: fit_lines(content, bounds.size, font, wrap),
        }),
    }
}

fn non_empty(s: &str) -> Option<String> {
    let t = s.trim();
    if t.is_empty() { None } else { Some(t.to_string()) }
}

/// `21.5°C`, `70.7°F`, `294.6K`
pub fn format_temperature(value: f64, units: Units) -> String {
    format!("{:.1}{}", value, units.temperature_suffix())
}

/// Whole degrees for the forecast strip.
pub fn format_short_temperature(value: f64, units: Units) -> String {
    match units {
        Units::Standard => format!("{:.0}K", value),
        Units::Metric | Units::Imperial => format!("{:.0}°", value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PANEL_HEIGHT, PANEL_WIDTH};
    use crate::layout::LayoutConfig;
    use crate::render::Plane;
    use crate::weather::{Condition, ForecastEntry};
    use chrono::{TimeZone, Utc};
    use std::collections::{BTreeMap, HashSet};

    fn spec() -> LayoutSpec {
        LayoutSpec::from_config(&LayoutConfig::default(), Size::new(PANEL_WIDTH, PANEL_HEIGHT)).unwrap()
    }

    fn full_snapshot() -> WeatherSnapshot {
        // 2025-06-04 is a Wednesday
        let ts = Utc.with_ymd_and_hms(2025, 6, 4, 3, 15, 0).unwrap();
        let forecast = (0..5)
            .map(|d| ForecastEntry {
                offset_secs: d * 86_400,
                temperature: 20.0 + d as f64,
                low: Some(10.0 + d as f64),
                condition: Condition::new(500, "10d", "light rain"),
            })
            .collect();
        let mut s = WeatherSnapshot::new(ts, "Tokyo", Units::Metric, 21.5, Condition::new(803, "04d", "broken clouds"))
            .with_forecast(forecast);
        s.utc_offset_secs = 9 * 3600;
        s.humidity = Some(45);
        s.pressure_hpa = Some(1013);
        s.wind_speed = Some(3.26);
        s.uv_index = Some(6.0);
        s.sunrise = Some(Utc.with_ymd_and_hms(2025, 6, 3, 19, 25, 0).unwrap());
        s.sunset = Some(Utc.with_ymd_and_hms(2025, 6, 4, 9, 55, 0).unwrap());
        s.moon_phase = Some(0.25);
        s
    }

    fn text_of<'a>(ins: &'a [DrawInstruction], region: &str) -> &'a TextBlock {
        ins.iter()
            .find(|i| i.region == region)
            .and_then(|i| i.text())
            .unwrap_or_else(|| panic!("no text for {}", region))
    }

    #[test]
    fn unplaceable_forecast_day_gets_placeholder() {
        let engine = LayoutEngine::new(I18n::english());
        let far = ForecastEntry {
            offset_secs: 1_000_000_000_000_000,
            temperature: 1.0,
            low: Some(0.0),
            condition: Condition::new(800, "01d", "clear sky"),
        };
        let snap = full_snapshot().with_forecast(vec![far]);
        let ins = engine.build_instructions(&snap, &spec(), false);
        assert_eq!(text_of(&ins, "forecast_day_0").content, PLACEHOLDER);
        assert_eq!(text_of(&ins, "forecast_high_0").content, "1°");
        assert_eq!(text_of(&ins, "forecast_day_1").content, PLACEHOLDER);
    }

    #[test]
    fn identical_inputs_give_identical_output() {
        let engine = LayoutEngine::new(I18n::english());
        let snap = full_snapshot();
        assert_eq!(engine.build_instructions(&snap, &spec(), false), engine.build_instructions(&snap, &spec(), false));
        assert_eq!(engine.build_instructions(&snap, &spec(), true), engine.build_instructions(&snap, &spec(), true));
    }

    #[test]
    fn formats_values_in_local_time() {
        let engine = LayoutEngine::new(I18n::english());
        let ins = engine.build_instructions(&full_snapshot(), &spec(), false);
        assert_eq!(text_of(&ins, "date").content, "2025/06/04 (Wed)");
        assert_eq!(text_of(&ins, "time").content, "12:15");
        assert_eq!(text_of(&ins, "temperature").content, "21.5°C");
        assert_eq!(text_of(&ins, "humidity").content, "Humidity: 45%");
        assert_eq!(text_of(&ins, "pressure").content, "Pressure: 1013hPa");
        assert_eq!(text_of(&ins, "wind").content, "Wind: 3.3m/s");
        assert_eq!(text_of(&ins, "sunrise").content, "04:25");
        assert_eq!(text_of(&ins, "sunset").content, "18:55");
        assert_eq!(text_of(&ins, "moon_age").content, "Age: 7.4");
        assert_eq!(text_of(&ins, "forecast_day_1").content, "Thu");
        assert_eq!(text_of(&ins, "forecast_high_2").content, "22°");
        assert_eq!(text_of(&ins, "forecast_low_2").content, "12°");
    }

    #[test]
    fn every_region_emits_something() {
        let engine = LayoutEngine::new(I18n::english());
        let spec = spec();
        for snap in [full_snapshot(), WeatherSnapshot::new(Utc::now(), "", Units::Metric, 0.0, Condition::default())] {
            let ins = engine.build_instructions(&snap, &spec, false);
            let produced: HashSet<&str> = ins.iter().map(|i| i.region.as_str()).collect();
            for region in spec.regions() {
                assert!(produced.contains(region.name.as_str()), "{} vanished", region.name);
            }
        }
    }

    #[test]
    fn absent_values_show_placeholder() {
        let engine = LayoutEngine::new(I18n::english());
        let mut snap = full_snapshot();
        snap.humidity = None;
        snap.moon_phase = None;
        let snap = snap.with_forecast(Vec::new());
        let ins = engine.build_instructions(&snap, &spec(), false);

        assert_eq!(text_of(&ins, "humidity").content, PLACEHOLDER);
        assert_eq!(text_of(&ins, "moon_icon").content, PLACEHOLDER);
        assert_eq!(text_of(&ins, "forecast_icon_0").content, PLACEHOLDER);
        assert_eq!(text_of(&ins, "forecast_high_4").content, PLACEHOLDER);
        let humidity = ins.iter().find(|i| i.region == "humidity").unwrap();
        assert_eq!(humidity.plane(), Plane::Black);
    }

    #[test]
    fn stale_adds_exactly_one_red_instruction() {
        let engine = LayoutEngine::new(I18n::english());
        let snap = full_snapshot();
        let fresh = engine.build_instructions(&snap, &spec(), false);
        let stale = engine.build_instructions(&snap, &spec(), true);

        let red = |v: &[DrawInstruction]| v.iter().filter(|i| i.plane() == Plane::Red).count();
        assert_eq!(stale.len(), fresh.len() + 1);
        assert_eq!(red(&stale), red(&fresh) + 1);
        assert_eq!(&stale[..fresh.len()], &fresh[..]);
        assert!(matches!(stale.last().map(|i| &i.shape), Some(Shape::Icon(Glyph::StaleMarker))));
    }

    #[test]
    fn long_description_is_fitted_not_dropped() {
        let engine = LayoutEngine::new(I18n::english());
        let mut snap = full_snapshot();
        snap.condition.description = "thunderstorm with heavy drizzle and very strong gusting winds tonight and tomorrow".to_string();
        let ins = engine.build_instructions(&snap, &spec(), false);
        let block = text_of(&ins, "description");
        assert!(block.content.starts_with("thunderstorm with heavy"));
        assert_eq!(block.lines.len(), 3);
        assert!(block.lines.iter().all(|l| l.chars().count() <= 26));
        assert!(block.lines[2].ends_with("..."));
    }

    #[test]
    fn labels_and_weekdays_are_translated() {
        let table = BTreeMap::from([
            ("Humidity".to_string(), "湿度".to_string()),
            ("Wed".to_string(), "水".to_string()),
        ]);
        let engine = LayoutEngine::new(I18n::from_messages("ja_JP", table));
        let ins = engine.build_instructions(&full_snapshot(), &spec(), false);
        assert_eq!(text_of(&ins, "humidity").content, "湿度: 45%");
        assert_eq!(text_of(&ins, "date").content, "2025/06/04 (水)");
    }

    #[test]
    fn error_layout_has_headline_reason_and_red_frame() {
        let engine = LayoutEngine::new(I18n::english());
        let ins = engine.build_error_instructions(&spec(), "connection failed: dns error");
        assert_eq!(text_of(&ins, "error_headline").content, "No Weather Data Available");
        assert_eq!(text_of(&ins, "error_reason").content, "connection failed: dns error");
        assert_eq!(ins.iter().filter(|i| i.plane() == Plane::Red).count(), 1);
    }

    #[test]
    fn temperatures_follow_snapshot_units() {
        assert_eq!(format_temperature(70.72, Units::Imperial), "70.7°F");
        assert_eq!(format_temperature(294.66, Units::Standard), "294.7K");
        assert_eq!(format_short_temperature(-3.4, Units::Metric), "-3°");
    }
}
