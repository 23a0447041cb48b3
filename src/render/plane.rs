/*
 *  render/plane.rs
 *
 *  PaperWeather - weather at a glance
 *  (c) 2020-26 Stuart Hunter
 *
 *  Runtime-sized 1-bit color planes and the black/red plane pair
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

use core::convert::Infallible;
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;

/// Which physical color layer an instruction lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Plane {
    Black,
    Red,
}

/// A runtime-sized 1-bit plane. `On` is ink, `Off` is the white background.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaneBuffer {
    buf: Vec<BinaryColor>,
    w: usize,
    h: usize,
}

impl PlaneBuffer {
    /// New plane initialised to white.
    pub fn new(width: u32, height: u32) -> Self {
        let (w, h) = (width as usize, height as usize);
        Self { buf: vec![BinaryColor::Off; w * h], w, h }
    }

    pub fn width(&self) -> usize { self.w }
    pub fn height(&self) -> usize { self.h }

    pub fn as_slice(&self) -> &[BinaryColor] { &self.buf }

    pub fn pixel(&self, x: i32, y: i32) -> Option<BinaryColor> {
        self.idx(Point::new(x, y)).map(|i| self.buf[i])
    }

    /// Number of inked pixels.
    pub fn ink_count(&self) -> usize {
        self.buf.iter().filter(|c| c.is_on()).count()
    }

    pub fn is_blank(&self) -> bool {
        self.buf.iter().all(|c| c.is_off())
    }

    /// Pack to the panel buffer layout: one bit per pixel, MSB first,
    /// rows padded to whole bytes, 1 = white and 0 = ink.
    pub fn to_packed(&self) -> Vec<u8> {
        let stride = self.w.div_ceil(8);
        let mut out = vec![0xFF_u8; stride * self.h];
        for y in 0..self.h {
            let row = &self.buf[y * self.w..(y + 1) * self.w];
            for (x, c) in row.iter().enumerate() {
                if c.is_on() {
                    out[y * stride + x / 8] &= !(0x80 >> (x % 8));
                }
            }
        }
        out
    }

    #[inline]
    fn idx(&self, p: Point) -> Option<usize> {
        if p.x >= 0 && p.y >= 0 {
            let (x, y) = (p.x as usize, p.y as usize);
            if x < self.w && y < self.h {
                return Some(y * self.w + x);
            }
        }
        None
    }
}

impl OriginDimensions for PlaneBuffer {
    fn size(&self) -> Size {
        Size::new(self.w as u32, self.h as u32)
    }
}

impl DrawTarget for PlaneBuffer {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        // anything off-plane is dropped
        for Pixel(p, c) in pixels {
            if let Some(i) = self.idx(p) {
                self.buf[i] = c;
            }
        }
        Ok(())
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        let clipped = area.intersection(&self.bounding_box());
        if clipped.is_zero_sized() {
            return Ok(());
        }
        let x0 = clipped.top_left.x as usize;
        let y0 = clipped.top_left.y as usize;
        let w = clipped.size.width as usize;
        for y in y0..y0 + clipped.size.height as usize {
            let base = y * self.w + x0;
            self.buf[base..base + w].fill(color);
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.buf.fill(color);
        Ok(())
    }
}

/// The two planes of one frame. Produced by the renderer and consumed by a sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanvasPair {
    pub black: PlaneBuffer,
    pub red: PlaneBuffer,
}

impl CanvasPair {
    /// Both planes white.
    pub fn blank(size: Size) -> Self {
        Self {
            black: PlaneBuffer::new(size.width, size.height),
            red: PlaneBuffer::new(size.width, size.height),
        }
    }

    pub fn size(&self) -> Size {
        self.black.size()
    }

    pub fn plane(&self, plane: Plane) -> &PlaneBuffer {
        match plane {
            Plane::Black => &self.black,
            Plane::Red => &self.red,
        }
    }

    pub fn plane_mut(&mut self, plane: Plane) -> &mut PlaneBuffer {
        match plane {
            Plane::Black => &mut self.black,
            Plane::Red => &mut self.red,
        }
    }

    /// Packed (black, red) buffers in panel layout.
    pub fn to_packed(&self) -> (Vec<u8>, Vec<u8>) {
        (self.black.to_packed(), self.red.to_packed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};

    #[test]
    fn new_plane_is_white() {
        let p = PlaneBuffer::new(800, 480);
        assert_eq!(p.size(), Size::new(800, 480));
        assert!(p.is_blank());
    }

    #[test]
    fn pixels_outside_are_dropped() {
        let mut p = PlaneBuffer::new(10, 10);
        p.draw_iter([
            Pixel(Point::new(-1, 0), BinaryColor::On),
            Pixel(Point::new(10, 3), BinaryColor::On),
            Pixel(Point::new(3, 3), BinaryColor::On),
        ])
        .ok();
        assert_eq!(p.ink_count(), 1);
        assert_eq!(p.pixel(3, 3), Some(BinaryColor::On));
        assert_eq!(p.pixel(10, 3), None);
    }

    #[test]
    fn fill_solid_clips_partial_rectangles() {
        let mut p = PlaneBuffer::new(10, 10);
        Rectangle::new(Point::new(-5, 8), Size::new(8, 8))
            .into_styled(PrimitiveStyle::with_fill(BinaryColor::On))
            .draw(&mut p)
            .ok();
        // x 0..3, y 8..10
        assert_eq!(p.ink_count(), 3 * 2);
    }

    #[test]
    fn packed_layout_is_msb_first_with_white_as_one() {
        let mut p = PlaneBuffer::new(10, 2);
        p.draw_iter([Pixel(Point::new(0, 0), BinaryColor::On), Pixel(Point::new(9, 1), BinaryColor::On)]).ok();
        let packed = p.to_packed();
        assert_eq!(packed.len(), 4);
        assert_eq!(packed[0], 0b0111_1111);
        assert_eq!(packed[1], 0xFF);
        assert_eq!(packed[2], 0xFF);
        assert_eq!(packed[3], 0b1011_1111);
    }

    #[test]
    fn full_panel_packs_to_48000_bytes() {
        let pair = CanvasPair::blank(Size::new(800, 480));
        let (b, r) = pair.to_packed();
        assert_eq!(b.len(), 48_000);
        assert_eq!(r.len(), 48_000);
        assert!(b.iter().all(|&x| x == 0xFF));
    }
}
