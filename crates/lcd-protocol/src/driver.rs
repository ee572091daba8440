//! 4-bit LCD Driver

use crate::command::*;
use crate::error::DisplayError;
use crate::pins::{BACKLIGHT, ENABLE};
use crate::status::status_line;
use crate::DEGREE_GLYPH;
use batch_control::ControlState;
use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use std::time::Instant;
use tracing::{debug, info};

/// Settle time after a write with the enable strobe low (µs)
const SETTLE_US: u32 = 25;

/// Hold time after raising the enable strobe (µs)
const STROBE_HOLD_US: u32 = 50;

/// Register select for a transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Mode {
    /// Instruction register
    Command = 0x00,
    /// Data register (character to display)
    Character = 0x01,
}

/// DDRAM base address of each display line, with the set-address bit included
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Line {
    One = 0x80,
    Two = 0xC0,
    Three = 0x94,
    Four = 0xD4,
}

impl Line {
    pub fn address(self) -> u8 {
        self as u8
    }
}

/// HD44780 display behind a PCF8574 expander
pub struct LcdDriver<I, D> {
    bus: I,
    delay: D,
    address: u8,
}

impl<I: I2c, D: DelayNs> LcdDriver<I, D> {
    /// Take ownership of the bus and run the controller initialisation sequence
    pub fn new(bus: I, delay: D, address: u8) -> Result<Self, DisplayError> {
        let mut lcd = Self {
            bus,
            delay,
            address,
        };
        lcd.initialize()?;
        info!("LCD initialized at address {:#04x}", address);
        Ok(lcd)
    }

    fn initialize(&mut self) -> Result<(), DisplayError> {
        self.send(INIT_8BIT, Mode::Command)?;
        self.send(INIT_4BIT, Mode::Command)?;
        self.send(ENTRY_MODE_SET | ENTRY_LEFT, Mode::Command)?;
        self.send(DISPLAY_CONTROL | DISPLAY_ON | CURSOR_OFF | BLINK_OFF, Mode::Command)?;
        self.send(FUNCTION_SET | FOUR_BIT_MODE | TWO_LINE | FONT_5X8, Mode::Command)?;
        self.send(CLEAR_DISPLAY, Mode::Command)?;
        self.send(RETURN_HOME, Mode::Command)
    }

    /// Transfer one byte as two nibbles
    ///
    /// Writes, in order: high nibble, high nibble strobed, low nibble (which
    /// also releases the high nibble's strobe), low nibble strobed, idle.
    /// Each write is followed by the settle or strobe-hold delay; shorter
    /// delays garble the display.
    pub fn send(&mut self, byte: u8, mode: Mode) -> Result<(), DisplayError> {
        let control = BACKLIGHT | mode as u8;
        let high = byte & 0xF0;
        let low = (byte & 0x0F) << 4;

        self.write(high | control, SETTLE_US)?;
        self.write(high | ENABLE | control, STROBE_HOLD_US)?;
        self.write(low | control, SETTLE_US)?;
        self.write(low | ENABLE | control, STROBE_HOLD_US)?;
        self.write(control, SETTLE_US)
    }

    fn write(&mut self, value: u8, settle_us: u32) -> Result<(), DisplayError> {
        self.bus
            .write(self.address, &[value])
            .map_err(|e| DisplayError::Bus(format!("{:?}", e)))?;
        self.delay.delay_us(settle_us);
        Ok(())
    }

    /// Move the cursor to the start of a line
    pub fn move_to_line(&mut self, line: Line) -> Result<(), DisplayError> {
        self.send(line.address(), Mode::Command)
    }

    /// Write text at the cursor, one transfer per character
    ///
    /// `°` maps to the controller's degree glyph; other non-ASCII characters
    /// are shown as `?`.
    pub fn write_str(&mut self, text: &str) -> Result<(), DisplayError> {
        for c in text.chars() {
            self.send(glyph(c), Mode::Character)?;
        }
        Ok(())
    }

    /// Show a batch's temperature and running time on line 1
    ///
    /// Every batch renders to the same line, so with several probes only the
    /// last one rendered stays visible. The first failed bus write abandons
    /// the rest of the line instead of writing on past it.
    pub fn render_state(&mut self, state: &ControlState, now: Instant) -> Result<(), DisplayError> {
        let line = status_line(state, now);
        debug!("LCD <- {:?} ({})", line, state.probe_id());
        self.move_to_line(Line::One)?;
        self.write_str(&line)
    }
}

fn glyph(c: char) -> u8 {
    match c {
        '°' => DEGREE_GLYPH,
        c if c.is_ascii() => c as u8,
        _ => b'?',
    }
}
