/*
 *  layout/instruction.rs
 *
 *  PaperWeather - weather at a glance
 *  (c) 2020-26 Stuart Hunter
 *
 *  Draw instructions handed from the layout engine to the renderer
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
use embedded_graphics::primitives::Rectangle;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::fonts::FontRef;
use crate::render::Plane;
use crate::weather::ConditionKind;

/// Ink color of an instruction. White knocks out ink on the black plane,
/// so every instruction touches exactly one plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Ink {
    Black,
    Red,
    White,
}

impl Ink {
    pub fn plane(self) -> Plane {
        match self {
            Ink::Red => Plane::Red,
            Ink::Black | Ink::White => Plane::Black,
        }
    }

    pub fn color(self) -> BinaryColor {
        match self {
            Ink::White => BinaryColor::Off,
            Ink::Black | Ink::Red => BinaryColor::On,
        }
    }
}

impl FromStr for Ink {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "black" => Ok(Ink::Black),
            "red" => Ok(Ink::Red),
            "white" => Ok(Ink::White),
            other => Err(format!("color '{}' is not one of black, red, white", other)),
        }
    }
}

impl fmt::Display for Ink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Ink::Black => "black",
            Ink::Red => "red",
            Ink::White => "white",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

/// Procedurally drawn pictograms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Glyph {
    Condition { kind: ConditionKind, night: bool },
    /// lunation fraction 0..1
    Moon { phase: f64 },
    StaleMarker,
}

/// Text already fitted to its region.
#[derive(Debug, Clone, PartialEq)]
pub struct TextBlock {
    pub font: FontRef,
    pub align: Align,
    /// full text before wrapping or truncation
    pub content: String,
    /// what actually gets drawn, one entry per row
    pub lines: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Text(TextBlock),
    Icon(Glyph),
    Line { start: Point, end: Point, width: u32 },
    Rect { filled: bool, stroke: u32 },
}

/// One drawable element, tagged with its ink (and therefore its plane).
#[derive(Debug, Clone, PartialEq)]
pub struct DrawInstruction {
    /// region that produced it
    pub region: String,
    pub ink: Ink,
    pub bounds: Rectangle,
    pub shape: Shape,
}

impl DrawInstruction {
    pub fn plane(&self) -> Plane {
        self.ink.plane()
    }

    pub fn text(&self) -> Option<&TextBlock> {
        match &self.shape {
            Shape::Text(t) => Some(t),
            _ => None,
        }
    }

    /// Area the instruction may touch.
    pub fn extent(&self) -> Rectangle {
        match &self.shape {
            Shape::Line { start, end, width } => {
                Rectangle::with_corners(*start, *end).offset((*width / 2) as i32)
            }
            _ => self.bounds,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn white_knocks_out_on_black_plane() {
        assert_eq!(Ink::White.plane(), Plane::Black);
        assert_eq!(Ink::White.color(), BinaryColor::Off);
        assert_eq!(Ink::Red.plane(), Plane::Red);
        assert_eq!(Ink::Red.color(), BinaryColor::On);
    }

    #[test]
    fn only_three_colors_parse() {
        assert_eq!("RED".parse::<Ink>(), Ok(Ink::Red));
        assert!("green".parse::<Ink>().is_err());
        assert!("#ff0000".parse::<Ink>().is_err());
    }

    #[test]
    fn line_extent_covers_stroke() {
        let ins = DrawInstruction {
            region: "rule".into(),
            ink: Ink::Black,
            bounds: Rectangle::new(Point::new(0, 10), Size::new(100, 4)),
            shape: Shape::Line { start: Point::new(0, 12), end: Point::new(99, 12), width: 4 },
        };
        let e = ins.extent();
        assert_eq!(e.top_left, Point::new(-2, 10));
        assert_eq!(e.size, Size::new(104, 5));
    }
}
