//! Sord M5 expansion-memory paging.
//!
//! The stock M5 has an 8K monitor ROM, 4K of SRAM at $7000 and whatever
//! the cartridge slots add. RAM expansion boards (EM-64 / 64KBI, 64KBF /
//! LZR, 64KRD / 64KRX) overlay 64K of DRAM on the Z80 address space and
//! switch between RAM and ROM through an I/O port.
//!
//! [`BankController`] tracks the paging mode and cartridge sources and
//! keeps a per-window overlay table. [`M5Bus`] owns the memory and routes
//! CPU accesses through that table.

mod bus;
pub mod cartridge;
mod config;
mod controller;
mod error;
pub mod overlay;
mod paging;
mod snapshot;

pub use bus::{INTERNAL_RAM_SIZE, M5Bus, OPEN_BUS};
pub use cartridge::{Cartridge, CartridgeKind, CartridgeSlots, CartridgeSources, SlotId};
pub use config::{DipSwitches, ExpansionVariant, INTERNAL_ROM_SIZE, M5Config};
pub use controller::BankController;
pub use error::ConfigError;
pub use overlay::{Access, BackingStore, Mapping, OverlayTable, Resolution};
pub use snapshot::PagingSnapshot;
