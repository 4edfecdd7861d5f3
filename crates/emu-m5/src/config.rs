//! Machine configuration: expansion variant, DIP switches and ROM image.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Size of the machine ROM region. The monitor occupies the first 8K; the
/// rest reads as $FF unless a larger image is loaded.
pub const INTERNAL_ROM_SIZE: usize = 0x7000;

/// Expansion RAM board fitted to the machine.
///
/// The board decides which I/O port controls paging and how the written
/// value is decoded. The RAM itself lives on a RAM-kind cartridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExpansionVariant {
    /// No paging hardware. The machine runs on its own 4K SRAM plus
    /// whatever RAM cartridge is plugged in, with a fixed layout.
    #[serde(rename = "stock")]
    Stock,
    /// EM-64 / 64KBI: OUT $6C, bit 0 toggles ROM (0) and RAM (1).
    #[serde(rename = "em64")]
    Em64,
    /// 64KBF version 2C / LZR: OUT $30, bits 0-2 select one of 8 modes.
    #[serde(rename = "64kbf")]
    Kbf,
    /// 64KRD / 64KRX: OUT $7F, one ROM/RAM bit per 8K chunk.
    #[serde(rename = "64krx")]
    Krx,
}

impl ExpansionVariant {
    /// All variants, in declaration order.
    pub const ALL: [Self; 4] = [Self::Stock, Self::Em64, Self::Kbf, Self::Krx];

    /// I/O port (low byte) that selects the paging mode.
    #[must_use]
    pub const fn paging_port(self) -> Option<u8> {
        match self {
            Self::Stock => None,
            Self::Em64 => Some(0x6C),
            Self::Kbf => Some(0x30),
            Self::Krx => Some(0x7F),
        }
    }

    /// Decode a byte written to the paging port into a mode.
    #[must_use]
    pub const fn decode_mode(self, value: u8) -> u8 {
        match self {
            Self::Stock => 0,
            Self::Em64 => value & 0x01,
            Self::Kbf => value & 0x07,
            Self::Krx => value,
        }
    }

    /// Number of distinct modes the port can select.
    #[must_use]
    pub const fn mode_count(self) -> usize {
        match self {
            Self::Stock => 1,
            Self::Em64 => 2,
            Self::Kbf => 8,
            Self::Krx => 256,
        }
    }

    /// Mode selected at power-on and reset.
    ///
    /// The 64KRX comes up with every ROM paged in; the other boards come
    /// up in mode 0.
    #[must_use]
    pub const fn reset_mode(self) -> u8 {
        match self {
            Self::Krx => 0xFF,
            Self::Stock | Self::Em64 | Self::Kbf => 0,
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Stock => "stock",
            Self::Em64 => "em64",
            Self::Kbf => "64kbf",
            Self::Krx => "64krx",
        }
    }
}

impl fmt::Display for ExpansionVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ExpansionVariant {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stock" | "none" => Ok(Self::Stock),
            "em64" | "em-64" | "64kbi" => Ok(Self::Em64),
            "64kbf" | "kbf" | "lzr" => Ok(Self::Kbf),
            "64krx" | "krx" | "64krd" => Ok(Self::Krx),
            _ => Err(ConfigError::UnknownVariant(s.to_string())),
        }
    }
}

/// Board DIP switches that affect paging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DipSwitches {
    /// 64KRX: BASIC EPROMs (on) or MSX EPROMs (off) at $8000-$FFFF.
    pub krx_basic: bool,
}

impl Default for DipSwitches {
    fn default() -> Self {
        Self { krx_basic: true }
    }
}

/// Configuration for creating an M5 memory system.
#[derive(Debug, Clone)]
pub struct M5Config {
    pub variant: ExpansionVariant,
    pub dips: DipSwitches,
    /// Machine ROM, at most [`INTERNAL_ROM_SIZE`] bytes, loaded at $0000.
    pub rom: Vec<u8>,
}

/// On-disk form of the configuration. The ROM is supplied separately.
#[derive(Deserialize)]
struct ConfigFile {
    variant: String,
    #[serde(default)]
    dips: DipSwitches,
}

impl M5Config {
    #[must_use]
    pub fn new(variant: ExpansionVariant, rom: Vec<u8>) -> Self {
        Self {
            variant,
            dips: DipSwitches::default(),
            rom,
        }
    }

    /// Parse `{ "variant": "64kbf", "dips": { "krx_basic": false } }`.
    pub fn from_json(json: &str, rom: Vec<u8>) -> Result<Self, ConfigError> {
        let file: ConfigFile = serde_json::from_str(json)?;
        Ok(Self {
            variant: file.variant.parse()?,
            dips: file.dips,
            rom,
        })
    }

    /// Check the ROM fits the machine ROM region.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rom.len() > INTERNAL_ROM_SIZE {
            return Err(ConfigError::RomTooLarge {
                what: "Machine ROM",
                len: self.rom.len(),
                max: INTERNAL_ROM_SIZE,
            });
        }
        Ok(())
    }
}
