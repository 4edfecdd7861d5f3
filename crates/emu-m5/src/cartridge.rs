//! Cartridge slots and cartridge-source resolution.
//!
//! The M5 has two cartridge slots. A slot holds either a plain ROM
//! cartridge or a RAM expansion cartridge (EM-64, 64KBF, 64KRX). RAM
//! cartridges carry 64K of DRAM and, on some boards, firmware EPROMs.
//!
//! The slots own the bytes. The bank controller only sees which slot
//! supplies ROM and which supplies RAM, tracked by [`CartridgeSources`].

use std::fmt;

use crate::error::ConfigError;

/// RAM on an expansion cartridge: the full 64K address space.
pub const CART_RAM_SIZE: usize = 0x10000;

/// Largest plain ROM cartridge image: $0000-$6FFF.
pub const CART_ROM_MAX: usize = 0x7000;

/// Largest firmware image on a RAM cartridge. The 64KRX keeps a second
/// bank of high EPROMs (MSX) above the 64K mark.
pub const CART_FIRMWARE_MAX: usize = 0x18000;

/// One of the two cartridge slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotId {
    Slot1,
    Slot2,
}

impl SlotId {
    pub const ALL: [Self; 2] = [Self::Slot1, Self::Slot2];

    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Slot1 => 0,
            Self::Slot2 => 1,
        }
    }

    #[must_use]
    pub const fn other(self) -> Self {
        match self {
            Self::Slot1 => Self::Slot2,
            Self::Slot2 => Self::Slot1,
        }
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Slot1 => f.write_str("slot1"),
            Self::Slot2 => f.write_str("slot2"),
        }
    }
}

/// What a cartridge contributes to the memory map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CartridgeKind {
    Rom,
    Ram,
}

/// A cartridge plugged into a slot.
#[derive(Debug, Clone)]
pub struct Cartridge {
    kind: CartridgeKind,
    /// ROM image (plain cartridge) or firmware (RAM cartridge), addressed
    /// linearly from $0000.
    rom: Vec<u8>,
    /// Expansion RAM. Empty for ROM cartridges.
    ram: Vec<u8>,
}

impl Cartridge {
    /// A plain ROM cartridge.
    pub fn rom(image: &[u8]) -> Result<Self, ConfigError> {
        Self::from_image(CartridgeKind::Rom, image)
    }

    /// A RAM expansion cartridge with the given firmware (may be empty).
    pub fn ram(firmware: &[u8]) -> Result<Self, ConfigError> {
        Self::from_image(CartridgeKind::Ram, firmware)
    }

    /// Build a cartridge of the given kind, checking the image fits.
    pub fn from_image(kind: CartridgeKind, image: &[u8]) -> Result<Self, ConfigError> {
        let (what, max) = match kind {
            CartridgeKind::Rom => ("Cartridge ROM", CART_ROM_MAX),
            CartridgeKind::Ram => ("Cartridge firmware", CART_FIRMWARE_MAX),
        };
        if image.len() > max {
            return Err(ConfigError::RomTooLarge {
                what,
                len: image.len(),
                max,
            });
        }
        let ram = match kind {
            CartridgeKind::Rom => Vec::new(),
            CartridgeKind::Ram => vec![0; CART_RAM_SIZE],
        };
        Ok(Self {
            kind,
            rom: image.to_vec(),
            ram,
        })
    }

    #[must_use]
    pub fn kind(&self) -> CartridgeKind {
        self.kind
    }

    #[must_use]
    pub fn rom_bytes(&self) -> &[u8] {
        &self.rom
    }

    #[must_use]
    pub fn ram_bytes(&self) -> &[u8] {
        &self.ram
    }

    pub fn ram_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.ram
    }
}

/// The two cartridge slots.
#[derive(Debug, Clone, Default)]
pub struct CartridgeSlots {
    slots: [Option<Cartridge>; 2],
}

impl CartridgeSlots {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Plug a cartridge in, replacing whatever was there.
    ///
    /// Returns the change to forward to the bank controller.
    pub fn insert(&mut self, slot: SlotId, cart: Cartridge) -> (SlotId, Option<CartridgeKind>) {
        let kind = cart.kind();
        self.slots[slot.index()] = Some(cart);
        (slot, Some(kind))
    }

    /// Pull the cartridge out of a slot.
    pub fn remove(&mut self, slot: SlotId) -> (Option<Cartridge>, (SlotId, Option<CartridgeKind>)) {
        (self.slots[slot.index()].take(), (slot, None))
    }

    #[must_use]
    pub fn get(&self, slot: SlotId) -> Option<&Cartridge> {
        self.slots[slot.index()].as_ref()
    }

    pub fn get_mut(&mut self, slot: SlotId) -> Option<&mut Cartridge> {
        self.slots[slot.index()].as_mut()
    }
}

/// Which slot supplies cartridge ROM and which supplies expansion RAM.
///
/// Updated one slot change at a time. The slot most recently reported
/// with a given kind becomes that kind's source, so two RAM cartridges
/// resolve to whichever was processed last. Emptying a source slot hands
/// the role back to the other slot if it holds the same kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CartridgeSources {
    kinds: [Option<CartridgeKind>; 2],
    ram: Option<SlotId>,
    rom: Option<SlotId>,
}

impl CartridgeSources {
    /// Record a slot's new contents and re-resolve both sources.
    pub fn update(&mut self, slot: SlotId, kind: Option<CartridgeKind>) {
        self.kinds[slot.index()] = kind;

        if self.ram == Some(slot) && kind != Some(CartridgeKind::Ram) {
            self.ram = self.fallback(slot, CartridgeKind::Ram);
        }
        if self.rom == Some(slot) && kind != Some(CartridgeKind::Rom) {
            self.rom = self.fallback(slot, CartridgeKind::Rom);
        }

        match kind {
            Some(CartridgeKind::Ram) => self.ram = Some(slot),
            Some(CartridgeKind::Rom) => self.rom = Some(slot),
            None => {}
        }
    }

    fn fallback(&self, leaving: SlotId, kind: CartridgeKind) -> Option<SlotId> {
        let other = leaving.other();
        (self.kinds[other.index()] == Some(kind)).then_some(other)
    }

    /// Slot supplying expansion RAM.
    #[must_use]
    pub fn ram(&self) -> Option<SlotId> {
        self.ram
    }

    /// Slot supplying cartridge ROM.
    #[must_use]
    pub fn rom(&self) -> Option<SlotId> {
        self.rom
    }
}
