/*
 *  layout/text.rs
 *
 *  PaperWeather - weather at a glance
 *  (c) 2020-26 Stuart Hunter
 *
 *  Word wrapping and ellipsis truncation against mono font metrics
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

use embedded_graphics::geometry::Size;

use crate::fonts::FontRef;

pub const ELLIPSIS: &str = "...";

/// Whole character cells of `font` that fit in `area`. Zero when not even
/// one cell fits.
pub fn capacity(area: Size, font: FontRef, wrap: bool) -> (usize, usize) {
    let m = font.metrics();
    let cols = (area.width / m.advance) as usize;
    let rows = (area.height / m.line_height) as usize;
    (cols, if wrap { rows } else { rows.min(1) })
}

/// Break `text` into the rows drawn for a region.
///
/// Single-line regions truncate with an ellipsis; wrapping regions break on
/// whitespace (hard-splitting words wider than the region) and ellipsize the
/// last row that fits.
pub fn fit_lines(text: &str, area: Size, font: FontRef, wrap: bool) -> Vec<String> {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() {
        return Vec::new();
    }
    let (cols, rows) = capacity(area, font, wrap);
    if cols == 0 || rows == 0 {
        return Vec::new();
    }

    let mut lines = if wrap { wrap_words(&words, cols) } else { vec![words.join(" ")] };

    if lines.len() > rows {
        lines.truncate(rows);
        if let Some(last) = lines.pop() {
            lines.push(ellipsize(&last, cols, true));
        }
    }
    lines.into_iter().map(|l| ellipsize(&l, cols, false)).collect()
}

fn wrap_words(words: &[&str], cols: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in words {
        let mut chars: Vec<char> = word.chars().collect();
        // words wider than a row get split at the row edge
        while chars.len() > cols {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let rest = chars.split_off(cols);
            lines.push(chars.into_iter().collect());
            chars = rest;
        }
        let word: String = chars.into_iter().collect();
        if word.is_empty() {
            continue;
        }
        let needed = if current.is_empty() { word.chars().count() } else { current.chars().count() + 1 + word.chars().count() };
        if needed <= cols {
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(&word);
        } else {
            lines.push(std::mem::replace(&mut current, word));
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Shorten `line` to `cols` characters ending in an ellipsis. With `force`
/// the ellipsis is added even when the line already fits.
pub fn ellipsize(line: &str, cols: usize, force: bool) -> String {
    let len = line.chars().count();
    if !force && len <= cols {
        return line.to_string();
    }
    if cols <= ELLIPSIS.len() {
        return ".".repeat(cols);
    }
    let keep = cols - ELLIPSIS.len();
    let head: String = line.chars().take(keep).collect();
    format!("{}{}", head.trim_end(), ELLIPSIS)
}
