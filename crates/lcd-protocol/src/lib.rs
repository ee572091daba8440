//! Character LCD Protocol
//!
//! Drives an HD44780-compatible 20x4 character display through a PCF8574
//! I2C port expander. The expander's upper four pins carry the data nibble
//! and the lower four carry register select, enable and backlight, so every
//! byte goes out as two nibble transfers with an enable strobe each.

mod driver;
mod error;
#[cfg(target_os = "linux")]
mod linux;
pub mod mock;
mod status;

pub use driver::{LcdDriver, Line, Mode};
pub use error::DisplayError;
#[cfg(target_os = "linux")]
pub use linux::{LinuxI2c, LinuxI2cError, StdDelay};
pub use status::{fahrenheit, status_line};

/// Default I2C address of the PCF8574 backpack
pub const DEFAULT_ADDRESS: u8 = 0x27;

/// Display width in characters
pub const COLUMNS: usize = 20;

/// Controller instruction set
pub mod command {
    pub const CLEAR_DISPLAY: u8 = 0x01;
    pub const RETURN_HOME: u8 = 0x02;
    pub const ENTRY_MODE_SET: u8 = 0x04;
    pub const DISPLAY_CONTROL: u8 = 0x08;
    pub const FUNCTION_SET: u8 = 0x20;

    // Entry mode flags
    pub const ENTRY_LEFT: u8 = 0x02;

    // Display control flags
    pub const DISPLAY_ON: u8 = 0x04;
    pub const CURSOR_OFF: u8 = 0x00;
    pub const BLINK_OFF: u8 = 0x00;

    // Function set flags
    pub const FOUR_BIT_MODE: u8 = 0x00;
    pub const TWO_LINE: u8 = 0x08;
    pub const FONT_5X8: u8 = 0x00;

    /// Sent twice while still in 8-bit mode to force the controller into 4-bit mode
    pub const INIT_8BIT: u8 = 0x33;
    pub const INIT_4BIT: u8 = 0x32;
}

/// PCF8574 control pins
pub mod pins {
    /// Register select: set for character data, clear for commands
    pub const REGISTER_SELECT: u8 = 0x01;
    /// Enable strobe
    pub const ENABLE: u8 = 0x04;
    /// Backlight transistor
    pub const BACKLIGHT: u8 = 0x08;
}

/// Character ROM (A00) code of the degree sign
pub const DEGREE_GLYPH: u8 = 0xDF;
