//! LED color and mode vocabulary for button customization.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Error for parsing LED colors and modes from user input.
#[derive(Debug, Clone, Error)]
#[error("unrecognized value: {0}")]
pub struct ParseLedError(String);

/// Named palette colors supported by the button LED.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamedColor {
    Red,
    Green,
    Blue,
    Yellow,
    Cyan,
    Magenta,
    White,
}

impl NamedColor {
    /// RGB value of this palette entry.
    #[must_use]
    pub fn rgb(self) -> (u8, u8, u8) {
        match self {
            Self::Red => (255, 0, 0),
            Self::Green => (0, 255, 0),
            Self::Blue => (0, 0, 255),
            Self::Yellow => (255, 255, 0),
            Self::Cyan => (0, 255, 255),
            Self::Magenta => (255, 0, 255),
            Self::White => (255, 255, 255),
        }
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Red => "red",
            Self::Green => "green",
            Self::Blue => "blue",
            Self::Yellow => "yellow",
            Self::Cyan => "cyan",
            Self::Magenta => "magenta",
            Self::White => "white",
        }
    }
}

impl FromStr for NamedColor {
    type Err = ParseLedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "red" => Ok(Self::Red),
            "green" => Ok(Self::Green),
            "blue" => Ok(Self::Blue),
            "yellow" => Ok(Self::Yellow),
            "cyan" => Ok(Self::Cyan),
            "magenta" => Ok(Self::Magenta),
            "white" => Ok(Self::White),
            other => Err(ParseLedError(other.to_string())),
        }
    }
}

/// An LED color: a palette entry or an arbitrary RGB triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Named(NamedColor),
    Custom { r: u8, g: u8, b: u8 },
}

impl Color {
    /// Build a custom color, clamping each channel to 0-255.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn custom(r: i32, g: i32, b: i32) -> Self {
        Self::Custom {
            r: r.clamp(0, 255) as u8,
            g: g.clamp(0, 255) as u8,
            b: b.clamp(0, 255) as u8,
        }
    }

    /// RGB value sent to the device.
    #[must_use]
    pub fn rgb(self) -> (u8, u8, u8) {
        match self {
            Self::Named(named) => named.rgb(),
            Self::Custom { r, g, b } => (r, g, b),
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(named) => f.write_str(named.name()),
            Self::Custom { r, g, b } => write!(f, "rgb({r}, {g}, {b})"),
        }
    }
}

/// LED illumination modes. Closed set; the device knows no others.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedMode {
    On,
    SlowPulse,
    FastPulse,
    Off,
}

impl LedMode {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::On => "on",
            Self::SlowPulse => "slow-pulse",
            Self::FastPulse => "fast-pulse",
            Self::Off => "off",
        }
    }
}

impl FromStr for LedMode {
    type Err = ParseLedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "on" => Ok(Self::On),
            "slow" | "slow-pulse" => Ok(Self::SlowPulse),
            "fast" | "fast-pulse" => Ok(Self::FastPulse),
            "off" => Ok(Self::Off),
            other => Err(ParseLedError(other.to_string())),
        }
    }
}

impl fmt::Display for LedMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
