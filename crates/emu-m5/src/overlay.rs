//! Overlay table: where each 4K window's reads and writes go.
//!
//! The address space is split into 16 windows of 4K. Each window has an
//! independent read route and write route, so a window can read ROM while
//! writes land in the RAM underneath, or drop on the floor.
//!
//! ```text
//! window  0-1   $0000-$1FFF  MON   monitor ROM
//! window  2-6   $2000-$6FFF  MID   BASIC / cartridge ROM
//! window  7     $7000-$7FFF  SRAM  mainboard static RAM
//! window  8-15  $8000-$FFFF  HIGH
//! ```

use std::fmt;
use std::ops::Range;

use crate::cartridge::SlotId;

/// Size of one paging window.
pub const WINDOW_SIZE: usize = 0x1000;

/// Number of windows covering the 64K address space.
pub const WINDOW_COUNT: usize = 16;

const WINDOW_SHIFT: u32 = 12;
const WINDOW_MASK: u16 = 0x0FFF;

/// Monitor ROM, $0000-$1FFF.
pub const MON: Range<usize> = 0..2;
/// BASIC-F / cartridge ROM area, $2000-$6FFF.
pub const MID: Range<usize> = 2..7;
/// Mainboard SRAM, $7000-$7FFF.
pub const SRAM: Range<usize> = 7..8;
/// $8000-$FFFF.
pub const HIGH: Range<usize> = 8..16;

/// Window index holding an address.
#[must_use]
pub const fn window_of(address: u16) -> usize {
    (address >> WINDOW_SHIFT) as usize
}

/// First address of a window.
#[must_use]
pub const fn window_start(window: usize) -> u16 {
    (window << WINDOW_SHIFT) as u16
}

/// Byte array an access ends up in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackingStore {
    /// Machine ROM region, addressed from $0000.
    InternalRom,
    /// Mainboard RAM, offset 0 at $7000.
    InternalRam,
    /// ROM image of the cartridge in a slot (firmware, for RAM carts).
    CartridgeRom(SlotId),
    /// Expansion RAM of the cartridge in a slot.
    CartridgeRam(SlotId),
}

impl BackingStore {
    /// Can this store accept writes at all?
    #[must_use]
    pub const fn is_writable(self) -> bool {
        matches!(self, Self::InternalRam | Self::CartridgeRam(_))
    }
}

impl fmt::Display for BackingStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InternalRom => f.write_str("rom"),
            Self::InternalRam => f.write_str("ram"),
            Self::CartridgeRom(slot) => write!(f, "cart_rom({slot})"),
            Self::CartridgeRam(slot) => write!(f, "cart_ram({slot})"),
        }
    }
}

/// Direction of a memory access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read,
    Write,
}

/// A window routed to a store. The store offset of an address in the
/// window is `base + (address & $0FFF)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mapping {
    pub store: BackingStore,
    pub base: usize,
}

impl Mapping {
    /// Map `window` so the store's offset 0 sits at address `origin`.
    #[must_use]
    pub const fn linear(store: BackingStore, window: usize, origin: u16) -> Self {
        Self {
            store,
            base: window * WINDOW_SIZE - origin as usize,
        }
    }

    /// Map `window` at its own address plus `bank_offset` into the store.
    #[must_use]
    pub const fn banked(store: BackingStore, window: usize, bank_offset: usize) -> Self {
        Self {
            store,
            base: window * WINDOW_SIZE + bank_offset,
        }
    }
}

impl fmt::Display for Mapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}+{:#06X}", self.store, self.base)
    }
}

/// Read and write routes of one window. `None` means unmapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WindowRoute {
    pub read: Option<Mapping>,
    pub write: Option<Mapping>,
}

impl WindowRoute {
    #[must_use]
    pub fn get(&self, access: Access) -> Option<Mapping> {
        match access {
            Access::Read => self.read,
            Access::Write => self.write,
        }
    }
}

/// Result of resolving one access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The access reaches `store` at `offset`.
    Mapped { store: BackingStore, offset: usize },
    /// Nothing drives the bus: reads see the open-bus value, writes drop.
    OpenBus,
}

/// Per-window routing for the whole address space.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayTable {
    routes: [WindowRoute; WINDOW_COUNT],
}

impl Default for OverlayTable {
    fn default() -> Self {
        Self::unmapped()
    }
}

impl OverlayTable {
    /// Every window unmapped in both directions.
    #[must_use]
    pub const fn unmapped() -> Self {
        Self {
            routes: [WindowRoute {
                read: None,
                write: None,
            }; WINDOW_COUNT],
        }
    }

    #[must_use]
    pub fn route(&self, window: usize) -> &WindowRoute {
        &self.routes[window]
    }

    #[must_use]
    pub fn routes(&self) -> &[WindowRoute; WINDOW_COUNT] {
        &self.routes
    }

    /// Route reads of every window in `windows` through `map`.
    pub fn set_read(&mut self, windows: Range<usize>, map: impl Fn(usize) -> Option<Mapping>) {
        for w in windows {
            self.routes[w].read = map(w);
        }
    }

    /// Route writes of every window in `windows` through `map`.
    pub fn set_write(&mut self, windows: Range<usize>, map: impl Fn(usize) -> Option<Mapping>) {
        for w in windows {
            self.routes[w].write = map(w);
        }
    }

    /// Route both directions of every window in `windows` through `map`.
    pub fn set_both(&mut self, windows: Range<usize>, map: impl Fn(usize) -> Option<Mapping>) {
        for w in windows {
            let m = map(w);
            self.routes[w] = WindowRoute { read: m, write: m };
        }
    }

    /// Translate an address into a store and offset.
    #[must_use]
    pub fn resolve(&self, address: u16, access: Access) -> Resolution {
        match self.routes[window_of(address)].get(access) {
            Some(m) => Resolution::Mapped {
                store: m.store,
                offset: m.base + usize::from(address & WINDOW_MASK),
            },
            None => Resolution::OpenBus,
        }
    }
}
