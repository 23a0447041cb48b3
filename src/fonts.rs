/*
 *  fonts.rs
 *
 *  PaperWeather - weather at a glance
 *  (c) 2020-26 Stuart Hunter
 *
 *  Compiled-in font references and their metrics
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

use embedded_graphics::mono_font::MonoFont;
use embedded_graphics::mono_font::iso_8859_1::{FONT_10X20, FONT_7X14};
use serde::{Deserialize, Serialize};

/// Font size reference used by layout regions.
///
/// Each size is a base ISO-8859-1 mono font drawn at an integer scale, so
/// the degree sign and Latin-1 accents are available at every size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontRef {
    /// 7x14
    Small,
    /// 10x20
    #[default]
    Medium,
    /// 10x20 at 2x
    Large,
    /// 10x20 at 3x
    Huge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FontMetrics {
    /// horizontal advance per character, in pixels
    pub advance: u32,
    /// height of one text line, in pixels
    pub line_height: u32,
}

impl FontRef {
    pub fn mono(self) -> &'static MonoFont<'static> {
        match self {
            FontRef::Small => &FONT_7X14,
            FontRef::Medium | FontRef::Large | FontRef::Huge => &FONT_10X20,
        }
    }

    pub fn scale(self) -> u32 {
        match self {
            FontRef::Small | FontRef::Medium => 1,
            FontRef::Large => 2,
            FontRef::Huge => 3,
        }
    }

    pub fn metrics(self) -> FontMetrics {
        let font = self.mono();
        let scale = self.scale();
        FontMetrics {
            advance: (font.character_size.width + font.character_spacing) * scale,
            line_height: font.character_size.height * scale,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metrics_scale_with_size() {
        assert_eq!(FontRef::Small.metrics(), FontMetrics { advance: 7, line_height: 14 });
        assert_eq!(FontRef::Medium.metrics(), FontMetrics { advance: 10, line_height: 20 });
        assert_eq!(FontRef::Large.metrics(), FontMetrics { advance: 20, line_height: 40 });
        assert_eq!(FontRef::Huge.metrics(), FontMetrics { advance: 30, line_height: 60 });
    }

    #[test]
    fn font_names_deserialize_lowercase() {
        let f: FontRef = serde_json::from_str("\"huge\"").unwrap();
        assert_eq!(f, FontRef::Huge);
    }
}
