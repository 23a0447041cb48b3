/*
 *  display/hardware.rs
 *
 *  PaperWeather - weather at a glance
 *  (c) 2020-26 Stuart Hunter
 *
 *  Waveshare 7.5" (B) V2 black/white/red panel over spidev and sysfs GPIO
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
use embedded_hal::delay::DelayNs;
use epd_waveshare::epd7in5b_v2::{Epd7in5, HEIGHT, WIDTH};
use epd_waveshare::prelude::{WaveshareDisplay, WaveshareThreeColorDisplay};
use linux_embedded_hal::spidev::{SpiModeFlags, SpidevOptions};
use linux_embedded_hal::sysfs_gpio::Direction;
use linux_embedded_hal::{Delay, SpidevDevice, SysfsPin};
use log::{debug, info};

use crate::config::DisplayConfig;
use crate::display::error::DisplayError;
use crate::display::traits::{DisplaySink, check_dimensions};
use crate::render::CanvasPair;

type Panel = Epd7in5<SpidevDevice, SysfsPin, SysfsPin, SysfsPin, Delay>;

/// Bytes per packed plane.
const PLANE_BYTES: usize = (WIDTH as usize).div_ceil(8) * HEIGHT as usize;

pub struct HardwarePanel {
    spi: SpidevDevice,
    epd: Panel,
}

impl HardwarePanel {
    /// Open the bus and pins and initialise the controller. Every failure
    /// here means the panel is not usable on this machine.
    pub fn open(config: &DisplayConfig) -> Result<Self, DisplayError> {
        if (config.width, config.height) != (WIDTH, HEIGHT) {
            return Err(DisplayError::HardwareUnavailable(format!(
                "panel is {}x{}, configuration asks for {}x{}",
                WIDTH, HEIGHT, config.width, config.height
            )));
        }

        let mut spi = SpidevDevice::open(&config.spi_bus).map_err(|e| {
            DisplayError::HardwareUnavailable(format!("cannot open {}: {:?}", config.spi_bus, e))
        })?;
        let options = SpidevOptions::new()
            .bits_per_word(8)
            .max_speed_hz(config.spi_speed_hz)
            .mode(SpiModeFlags::SPI_MODE_0)
            .build();
        spi.configure(&options)
            .map_err(|e| DisplayError::HardwareUnavailable(format!("cannot configure {}: {}", config.spi_bus, e)))?;

        let busy = init_gpio(config.busy_pin, Direction::In).map_err(unavailable)?;
        let dc = init_gpio(config.dc_pin, Direction::Out).map_err(unavailable)?;
        let rst = init_gpio(config.rst_pin, Direction::Out).map_err(unavailable)?;

        let epd = Epd7in5::new(&mut spi, busy, dc, rst, &mut Delay, None)
            .map_err(|e| DisplayError::HardwareUnavailable(format!("panel init failed: {:?}", e)))?;

        info!("e-paper panel ready on {} (busy={} dc={} rst={})",
            config.spi_bus, config.busy_pin, config.dc_pin, config.rst_pin);
        Ok(Self { spi, epd })
    }
}

impl DisplaySink for HardwarePanel {
    fn name(&self) -> &'static str {
        "epd7in5b_v2"
    }

    fn size(&self) -> Size {
        Size::new(WIDTH, HEIGHT)
    }

    fn present(&mut self, canvas: CanvasPair) -> Result<(), DisplayError> {
        check_dimensions(self.size(), &canvas)?;
        let (black, red) = canvas.to_packed();
        if black.len() != PLANE_BYTES || red.len() != PLANE_BYTES {
            return Err(DisplayError::BufferSizeMismatch { expected: PLANE_BYTES, actual: black.len().max(red.len()) });
        }
        // the controller reads the red plane with 1 = red
        let red: Vec<u8> = red.iter().map(|b| !b).collect();

        self.epd
            .wake_up(&mut self.spi, &mut Delay)
            .map_err(|e| DisplayError::Spi(format!("wake failed: {:?}", e)))?;
        self.epd
            .update_color_frame(&mut self.spi, &mut Delay, &black, &red)
            .map_err(|e| DisplayError::Spi(format!("frame upload failed: {:?}", e)))?;
        self.epd
            .display_frame(&mut self.spi, &mut Delay)
            .map_err(|e| DisplayError::Spi(format!("refresh failed: {:?}", e)))?;
        debug!("panel refreshed");
        Ok(())
    }

    fn sleep(&mut self) -> Result<(), DisplayError> {
        self.epd
            .sleep(&mut self.spi, &mut Delay)
            .map_err(|e| DisplayError::Spi(format!("sleep failed: {:?}", e)))?;
        debug!("panel asleep");
        Ok(())
    }
}

fn unavailable(e: DisplayError) -> DisplayError {
    match e {
        DisplayError::HardwareUnavailable(_) => e,
        other => DisplayError::HardwareUnavailable(other.to_string()),
    }
}

fn init_gpio(pin: u64, direction: Direction) -> Result<SysfsPin, DisplayError> {
    let gpio = SysfsPin::new(pin);
    gpio.export()
        .map_err(|e| DisplayError::Gpio(format!("GPIO{} export failed: {}", pin, e)))?;

    // udev needs a moment before the direction file is writable
    let mut attempts = 0;
    while !gpio.is_exported() {
        Delay.delay_ms(10);
        attempts += 1;
        if attempts > 100 {
            return Err(DisplayError::Gpio(format!("GPIO{} never appeared after export", pin)));
        }
    }

    gpio.set_direction(direction)
        .map_err(|e| DisplayError::Gpio(format!("GPIO{} direction: {}", pin, e)))?;
    if direction == Direction::Out {
        gpio.set_value(1)
            .map_err(|e| DisplayError::Gpio(format!("GPIO{} set: {}", pin, e)))?;
    }
    Ok(gpio)
}
