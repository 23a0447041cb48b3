/*
 *  render/mod.rs
 *
 *  PaperWeather - weather at a glance
 *  (c) 2020-26 Stuart Hunter
 *
 *  Draw instructions to black and red planes
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

pub mod icons;
pub mod plane;
pub mod scaled;

use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Line, PrimitiveStyle, PrimitiveStyleBuilder, Rectangle, StrokeAlignment};
use embedded_text::TextBox;
use embedded_text::alignment::{HorizontalAlignment, VerticalAlignment};
use embedded_text::style::TextBoxStyleBuilder;
use log::debug;

use crate::layout::{Align, DrawInstruction, Shape, TextBlock};

pub use plane::{CanvasPair, Plane, PlaneBuffer};
pub use scaled::ScaledTarget;

/// Paint `instructions` in order onto two fresh white planes of `size`.
///
/// Later instructions overwrite earlier ones on the same plane. Anything
/// outside the canvas is clipped; an instruction entirely off-canvas is
/// skipped.
pub fn paint(instructions: &[DrawInstruction], size: Size) -> CanvasPair {
    let mut canvas = CanvasPair::blank(size);
    let frame = Rectangle::new(Point::zero(), size);

    for ins in instructions {
        if ins.extent().intersection(&frame).is_zero_sized() {
            debug!("skipping '{}': entirely off canvas", ins.region);
            continue;
        }
        let target = canvas.plane_mut(ins.plane());
        match draw_instruction(target, ins) {
            Ok(()) => {}
            Err(never) => match never {},
        }
    }
    canvas
}

fn draw_instruction<D>(target: &mut D, ins: &DrawInstruction) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    let color = ins.ink.color();
    match &ins.shape {
        Shape::Text(block) => draw_text(target, block, ins.bounds, color),
        Shape::Icon(glyph) => icons::draw_glyph(target, *glyph, ins.bounds, color),
        Shape::Line { start, end, width } => Line::new(*start, *end)
            .into_styled(PrimitiveStyle::with_stroke(color, (*width).max(1)))
            .draw(target),
        Shape::Rect { filled: true, .. } => ins.bounds.into_styled(PrimitiveStyle::with_fill(color)).draw(target),
        Shape::Rect { filled: false, stroke } => {
            let style = PrimitiveStyleBuilder::new()
                .stroke_color(color)
                .stroke_width((*stroke).max(1))
                .stroke_alignment(StrokeAlignment::Inside)
                .build();
            ins.bounds.into_styled(style).draw(target)
        }
    }
}

/// Draw pre-fitted rows inside `bounds`. Large sizes go through a scaling
/// target so the text box works in base-font pixels. Nothing lands outside
/// `bounds`.
fn draw_text<D>(target: &mut D, block: &TextBlock, bounds: Rectangle, color: BinaryColor) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    if block.lines.is_empty() {
        return Ok(());
    }
    let mut clipped = target.clipped(&bounds);
    let mut scaled = ScaledTarget::new(&mut clipped, bounds, block.font.scale());
    let logical = Rectangle::new(Point::zero(), scaled.size());

    let character_style = MonoTextStyle::new(block.font.mono(), color);
    let textbox_style = TextBoxStyleBuilder::new()
        .alignment(halign(block.align))
        .vertical_alignment(VerticalAlignment::Top)
        .build();
    let text = block.lines.join("\n");
    TextBox::with_textbox_style(&text, logical, character_style, textbox_style).draw(&mut scaled)?;
    Ok(())
}

fn halign(align: Align) -> HorizontalAlignment {
    match align {
        Align::Left => HorizontalAlignment::Left,
        Align::Center => HorizontalAlignment::Center,
        Align::Right => HorizontalAlignment::Right,
    }
}
