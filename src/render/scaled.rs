/*
 *  render/scaled.rs
 *
 *  PaperWeather - weather at a glance
 *  (c) 2020-26 Stuart Hunter
 *
 *  Integer-scaling draw target used for the larger font sizes
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

/// Draws into `area` of the inner target with every logical pixel blown up
/// to a `factor` x `factor` block. Logical coordinates start at (0, 0).
pub struct ScaledTarget<'a, D> {
    inner: &'a mut D,
    origin: Point,
    factor: u32,
    logical: Size,
}

impl<'a, D> ScaledTarget<'a, D>
where
    D: DrawTarget<Color = BinaryColor>,
{
    pub fn new(inner: &'a mut D, area: Rectangle, factor: u32) -> Self {
        let factor = factor.max(1);
        Self {
            inner,
            origin: area.top_left,
            factor,
            logical: Size::new(area.size.width / factor, area.size.height / factor),
        }
    }
}

impl<D> OriginDimensions for ScaledTarget<'_, D> {
    fn size(&self) -> Size {
        self.logical
    }
}

impl<D> DrawTarget for ScaledTarget<'_, D>
where
    D: DrawTarget<Color = BinaryColor>,
{
    type Color = BinaryColor;
    type Error = D::Error;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let f = self.factor as i32;
        let (w, h) = (self.logical.width as i32, self.logical.height as i32);
        for Pixel(p, color) in pixels {
            if p.x < 0 || p.y < 0 || p.x >= w || p.y >= h {
                continue;
            }
            if f == 1 {
                self.inner.draw_iter([Pixel(self.origin + p, color)])?;
            } else {
                let block = Rectangle::new(self.origin + Point::new(p.x * f, p.y * f), Size::new_equal(self.factor));
                self.inner.fill_solid(&block, color)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::PlaneBuffer;

    #[test]
    fn one_logical_pixel_becomes_a_block() {
        let mut plane = PlaneBuffer::new(40, 40);
        let area = Rectangle::new(Point::new(10, 10), Size::new(30, 30));
        let mut scaled = ScaledTarget::new(&mut plane, area, 3);
        assert_eq!(scaled.size(), Size::new(10, 10));
        scaled.draw_iter([Pixel(Point::new(1, 2), BinaryColor::On)]).ok();

        assert_eq!(plane.ink_count(), 9);
        assert_eq!(plane.pixel(13, 16), Some(BinaryColor::On));
        assert_eq!(plane.pixel(15, 18), Some(BinaryColor::On));
        assert_eq!(plane.pixel(16, 18), Some(BinaryColor::Off));
    }

    #[test]
    fn logical_pixels_outside_are_dropped() {
        let mut plane = PlaneBuffer::new(40, 40);
        let area = Rectangle::new(Point::zero(), Size::new(20, 20));
        let mut scaled = ScaledTarget::new(&mut plane, area, 2);
        scaled.draw_iter([Pixel(Point::new(10, 0), BinaryColor::On), Pixel(Point::new(-1, 0), BinaryColor::On)]).ok();
        assert!(plane.is_blank());
    }
}
