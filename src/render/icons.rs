/*
 *  render/icons.rs
 *
 *  PaperWeather - weather at a glance
 *  (c) 2020-26 Stuart Hunter
 *
 *  Weather pictograms, moon phase disc and the staleness marker,
 *  all built from embedded-graphics primitives
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

use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::mono_font::iso_8859_1::FONT_10X20;
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Circle, Line, PrimitiveStyle, Rectangle, Triangle};
use embedded_graphics::text::{Alignment, Baseline, Text, TextStyleBuilder};
use std::f32::consts::PI;

use crate::layout::Glyph;
use crate::weather::ConditionKind;

/// Knock-out color: white on whichever plane is being drawn.
const GAP: BinaryColor = BinaryColor::Off;

const HALF_LUNATION: f64 = 14.765;

pub fn draw_glyph<D>(target: &mut D, glyph: Glyph, bounds: Rectangle, color: BinaryColor) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    let sq = square_in(bounds);
    // halos and thick strokes never spill into a neighbouring region
    let mut target = target.clipped(&sq);
    match glyph {
        Glyph::Condition { kind, night } => draw_condition(&mut target, kind, night, sq, color),
        Glyph::Moon { phase } => draw_moon(&mut target, phase, sq, color),
        Glyph::StaleMarker => draw_stale_marker(&mut target, sq, color),
    }
}

/// Largest square centered in `bounds`.
fn square_in(bounds: Rectangle) -> Rectangle {
    let d = bounds.size.width.min(bounds.size.height);
    let dx = (bounds.size.width - d) / 2;
    let dy = (bounds.size.height - d) / 2;
    Rectangle::new(bounds.top_left + Point::new(dx as i32, dy as i32), Size::new_equal(d))
}

/// Point at a percentage of the square.
fn at(sq: Rectangle, px: i32, py: i32) -> Point {
    let d = sq.size.width as i32;
    sq.top_left + Point::new(d * px / 100, d * py / 100)
}

/// Sub-box at percentages of the square.
fn sub(sq: Rectangle, px: i32, py: i32, pw: u32, ph: u32) -> Rectangle {
    let d = sq.size.width;
    Rectangle::new(at(sq, px, py), Size::new(d * pw / 100, d * ph / 100))
}

fn stroke_for(d: u32) -> u32 {
    (d / 30).max(1)
}

fn draw_condition<D>(target: &mut D, kind: ConditionKind, night: bool, sq: Rectangle, c: BinaryColor) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    let d = sq.size.width;
    match kind {
        ConditionKind::Clear => {
            if night {
                crescent(target, at(sq, 50, 50), d * 70 / 100, c)
            } else {
                sun(target, at(sq, 50, 50), d, c)
            }
        }
        ConditionKind::FewClouds => {
            if night {
                crescent(target, at(sq, 36, 36), d * 45 / 100, c)?;
            } else {
                sun(target, at(sq, 36, 36), d * 65 / 100, c)?;
            }
            cloud_over(target, sub(sq, 25, 45, 72, 45), d, c)
        }
        ConditionKind::ScatteredClouds => cloud(target, sub(sq, 8, 22, 84, 55), c),
        ConditionKind::BrokenClouds => {
            cloud(target, sub(sq, 30, 12, 64, 42), c)?;
            cloud_over(target, sub(sq, 4, 34, 76, 48), d, c)
        }
        ConditionKind::ShowerRain => {
            cloud(target, sub(sq, 8, 5, 84, 50), c)?;
            rain(target, sq, 60, c)
        }
        ConditionKind::Rain => {
            sun(target, at(sq, 68, 24), d * 45 / 100, c)?;
            cloud_over(target, sub(sq, 4, 15, 78, 45), d, c)?;
            rain(target, sq, 64, c)
        }
        ConditionKind::Thunderstorm => {
            cloud(target, sub(sq, 8, 5, 84, 50), c)?;
            bolt(target, sq, c)
        }
        ConditionKind::Snow => {
            cloud(target, sub(sq, 8, 5, 84, 50), c)?;
            for (px, py) in [(25, 70), (50, 82), (75, 70)] {
                flake(target, at(sq, px, py), d * 14 / 100, c)?;
            }
            Ok(())
        }
        ConditionKind::Mist => {
            let style = PrimitiveStyle::with_stroke(c, (d / 16).max(1));
            for (i, (x0, x1)) in [(10, 80), (20, 90), (10, 80), (20, 90)].into_iter().enumerate() {
                let y = 25 + i as i32 * 17;
                Line::new(at(sq, x0, y), at(sq, x1, y)).into_styled(style).draw(target)?;
            }
            Ok(())
        }
        ConditionKind::Unknown => {
            Circle::with_center(at(sq, 50, 50), d * 80 / 100)
                .into_styled(PrimitiveStyle::with_stroke(c, stroke_for(d) + 1))
                .draw(target)?;
            let style = TextStyleBuilder::new().alignment(Alignment::Center).baseline(Baseline::Middle).build();
            Text::with_text_style("?", at(sq, 50, 50), MonoTextStyle::new(&FONT_10X20, c), style).draw(target)?;
            Ok(())
        }
    }
}

fn sun<D>(target: &mut D, center: Point, size: u32, c: BinaryColor) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    Circle::with_center(center, size / 2)
        .into_styled(PrimitiveStyle::with_fill(c))
        .draw(target)?;
    let ray = PrimitiveStyle::with_stroke(c, (size / 24).max(1));
    let (inner, outer) = (size as f32 * 0.32, size as f32 * 0.47);
    for i in 0..8 {
        let a = i as f32 * PI / 4.0;
        let p = |r: f32| center + Point::new((a.cos() * r).round() as i32, (a.sin() * r).round() as i32);
        Line::new(p(inner), p(outer)).into_styled(ray).draw(target)?;
    }
    Ok(())
}

fn crescent<D>(target: &mut D, center: Point, diameter: u32, c: BinaryColor) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    Circle::with_center(center, diameter)
        .into_styled(PrimitiveStyle::with_fill(c))
        .draw(target)?;
    let shift = Point::new(diameter as i32 * 30 / 100, -(diameter as i32) * 18 / 100);
    Circle::with_center(center + shift, diameter)
        .into_styled(PrimitiveStyle::with_fill(GAP))
        .draw(target)
}

/// Three puffs on a flat base, filling `area`.
fn cloud<D>(target: &mut D, area: Rectangle, c: BinaryColor) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    let (x, y) = (area.top_left.x, area.top_left.y);
    let (w, h) = (area.size.width as i32, area.size.height as i32);
    let fill = PrimitiveStyle::with_fill(c);
    let p = |px: i32, py: i32| Point::new(x + w * px / 100, y + h * py / 100);

    Circle::with_center(p(30, 60), (h * 60 / 100) as u32).into_styled(fill).draw(target)?;
    Circle::with_center(p(55, 42), (h * 80 / 100) as u32).into_styled(fill).draw(target)?;
    Circle::with_center(p(78, 62), (h * 55 / 100) as u32).into_styled(fill).draw(target)?;
    Rectangle::with_corners(p(30, 58), p(78, 89)).into_styled(fill).draw(target)
}

/// Cloud with a white halo so it reads in front of whatever is behind it.
fn cloud_over<D>(target: &mut D, area: Rectangle, d: u32, c: BinaryColor) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    cloud(target, area.offset(stroke_for(d) as i32 * 2), GAP)?;
    cloud(target, area, c)
}

fn rain<D>(target: &mut D, sq: Rectangle, top: i32, c: BinaryColor) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    let style = PrimitiveStyle::with_stroke(c, stroke_for(sq.size.width) + 1);
    for px in [28, 48, 68] {
        Line::new(at(sq, px, top), at(sq, px - 8, top + 26)).into_styled(style).draw(target)?;
    }
    Ok(())
}

fn bolt<D>(target: &mut D, sq: Rectangle, c: BinaryColor) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    let fill = PrimitiveStyle::with_fill(c);
    Triangle::new(at(sq, 55, 50), at(sq, 38, 76), at(sq, 52, 76)).into_styled(fill).draw(target)?;
    Triangle::new(at(sq, 44, 72), at(sq, 60, 72), at(sq, 40, 98)).into_styled(fill).draw(target)
}

fn flake<D>(target: &mut D, center: Point, size: u32, c: BinaryColor) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    let r = size as i32 / 2;
    let style = PrimitiveStyle::with_stroke(c, (size / 8).max(1));
    Line::new(center - Point::new(r, 0), center + Point::new(r, 0)).into_styled(style).draw(target)?;
    Line::new(center - Point::new(r / 2, r), center + Point::new(r / 2, r)).into_styled(style).draw(target)?;
    Line::new(center - Point::new(-r / 2, r), center + Point::new(-r / 2, r)).into_styled(style).draw(target)
}

/// Moon disc with the unlit part inked. `phase` 0 = new, 0.5 = full.
fn draw_moon<D>(target: &mut D, phase: f64, sq: Rectangle, c: BinaryColor) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    let d = sq.size.width;
    if d < 4 {
        return Ok(());
    }
    let center = sq.center();
    let r = (d / 2 - 1) as i32;
    Circle::with_center(center, (r * 2 + 1) as u32)
        .into_styled(PrimitiveStyle::with_stroke(c, 2))
        .draw(target)?;

    let age = phase.rem_euclid(1.0) * HALF_LUNATION * 2.0;
    let theta = age / HALF_LUNATION * std::f64::consts::PI;
    let fill = PrimitiveStyle::with_fill(c);
    for dy in -r..=r {
        let alpha = (dy as f64 / r as f64).acos();
        let x = r as f64 * alpha.sin();
        let length = r as f64 * theta.cos() * alpha.sin();
        let (from, to) = if age < HALF_LUNATION { (-x, length) } else { (-length, x) };
        let (from, to) = (from.round() as i32, to.round() as i32);
        if to < from {
            continue;
        }
        Rectangle::new(center + Point::new(from, dy), Size::new((to - from + 1) as u32, 1))
            .into_styled(fill)
            .draw(target)?;
    }
    Ok(())
}

/// Filled warning triangle with a knocked-out exclamation mark.
fn draw_stale_marker<D>(target: &mut D, sq: Rectangle, c: BinaryColor) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    Triangle::new(at(sq, 50, 0), at(sq, 0, 99), at(sq, 99, 99))
        .into_styled(PrimitiveStyle::with_fill(c))
        .draw(target)?;
    let gap = PrimitiveStyle::with_fill(GAP);
    let w = (sq.size.width / 8).max(1);
    let bar_top = at(sq, 50, 38) - Point::new(w as i32 / 2, 0);
    let bar_h = (sq.size.width * 30 / 100).max(1);
    Rectangle::new(bar_top, Size::new(w, bar_h)).into_styled(gap).draw(target)?;
    Rectangle::new(at(sq, 50, 78) - Point::new(w as i32 / 2, 0), Size::new_equal(w))
        .into_styled(gap)
        .draw(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::PlaneBuffer;

    fn draw(glyph: Glyph, size: u32) -> PlaneBuffer {
        let mut plane = PlaneBuffer::new(size, size);
        let bounds = Rectangle::new(Point::zero(), Size::new_equal(size));
        draw_glyph(&mut plane, glyph, bounds, BinaryColor::On).ok();
        plane
    }

    #[test]
    fn every_condition_draws_ink() {
        use ConditionKind::*;
        for kind in [Clear, FewClouds, ScatteredClouds, BrokenClouds, ShowerRain, Rain, Thunderstorm, Snow, Mist, Unknown] {
            for night in [false, true] {
                let plane = draw(Glyph::Condition { kind, night }, 60);
                assert!(plane.ink_count() > 20, "{:?} night={} drew almost nothing", kind, night);
            }
        }
    }

    #[test]
    fn new_moon_is_darker_than_full_moon() {
        let new = draw(Glyph::Moon { phase: 0.0 }, 96).ink_count();
        let quarter = draw(Glyph::Moon { phase: 0.25 }, 96).ink_count();
        let full = draw(Glyph::Moon { phase: 0.5 }, 96).ink_count();
        assert!(new > quarter && quarter > full);
    }

    #[test]
    fn waxing_moon_is_dark_on_the_left() {
        let plane = draw(Glyph::Moon { phase: 0.25 }, 96);
        assert_eq!(plane.pixel(20, 48), Some(BinaryColor::On));
        assert_eq!(plane.pixel(76, 48), Some(BinaryColor::Off));
    }

    #[test]
    fn stale_marker_has_a_knockout() {
        let plane = draw(Glyph::StaleMarker, 26);
        assert!(plane.ink_count() > 50);
        assert_eq!(plane.pixel(13, 14), Some(BinaryColor::Off));
    }

    #[test]
    fn icons_stay_inside_their_square() {
        use ConditionKind::*;
        let bounds = Rectangle::new(Point::new(50, 50), Size::new(100, 60));
        let square = Rectangle::new(Point::new(70, 50), Size::new(60, 60));
        let glyphs = [Clear, FewClouds, ScatteredClouds, BrokenClouds, ShowerRain, Rain, Thunderstorm, Snow, Mist, Unknown]
            .into_iter()
            .flat_map(|kind| [Glyph::Condition { kind, night: false }, Glyph::Condition { kind, night: true }])
            .chain([Glyph::Moon { phase: 0.3 }, Glyph::StaleMarker]);

        for glyph in glyphs {
            // ink on white paper
            let mut plane = PlaneBuffer::new(200, 200);
            draw_glyph(&mut plane, glyph, bounds, BinaryColor::On).ok();
            // knockouts on solid ink
            let mut inked = PlaneBuffer::new(200, 200);
            inked.clear(BinaryColor::On).ok();
            draw_glyph(&mut inked, glyph, bounds, BinaryColor::On).ok();

            for y in 0..200 {
                for x in 0..200 {
                    if square.contains(Point::new(x, y)) {
                        continue;
                    }
                    assert_eq!(plane.pixel(x, y), Some(BinaryColor::Off), "{:?} stray ink at {},{}", glyph, x, y);
                    assert_eq!(inked.pixel(x, y), Some(BinaryColor::On), "{:?} erased ink at {},{}", glyph, x, y);
                }
            }
        }
    }
}
