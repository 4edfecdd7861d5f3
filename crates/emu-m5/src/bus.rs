//! M5 bus: memory and I/O routing.
//!
//! The bus owns the machine ROM, mainboard RAM, the cartridge slots and
//! the bank controller. Every memory access asks the controller where it
//! lands and dereferences that store. I/O is decoded on the low 8 bits of
//! the port; only the expansion board's paging port is handled here.

use emu_core::{Bus, IoBus};

use crate::cartridge::{Cartridge, CartridgeSlots, SlotId};
use crate::config::{INTERNAL_ROM_SIZE, M5Config};
use crate::controller::BankController;
use crate::error::ConfigError;
use crate::overlay::{Access, BackingStore, Resolution};

/// Value read when nothing drives the data bus.
pub const OPEN_BUS: u8 = 0xFF;

/// Mainboard RAM: 4K SRAM at $7000 plus 32K at $8000.
pub const INTERNAL_RAM_SIZE: usize = 0x9000;

/// The M5 memory system, implementing `emu_core::Bus` and `IoBus`.
pub struct M5Bus {
    rom: Vec<u8>,
    ram: Box<[u8; INTERNAL_RAM_SIZE]>,
    slots: CartridgeSlots,
    controller: BankController,
}

impl M5Bus {
    pub fn new(config: &M5Config) -> Result<Self, ConfigError> {
        let controller = BankController::new(config)?;
        log::debug!(
            "M5 bus: {} board, {} byte ROM",
            config.variant,
            config.rom.len()
        );
        Ok(Self {
            rom: config.rom.clone(),
            ram: Box::new([0; INTERNAL_RAM_SIZE]),
            slots: CartridgeSlots::new(),
            controller,
        })
    }

    /// Replace the machine ROM image.
    pub fn load_rom(&mut self, rom: &[u8]) -> Result<(), ConfigError> {
        if rom.len() > INTERNAL_ROM_SIZE {
            return Err(ConfigError::RomTooLarge {
                what: "Machine ROM",
                len: rom.len(),
                max: INTERNAL_ROM_SIZE,
            });
        }
        self.rom = rom.to_vec();
        Ok(())
    }

    /// Plug a cartridge into a slot, replacing any cartridge already there.
    pub fn insert_cartridge(&mut self, slot: SlotId, cart: Cartridge) {
        let (slot, kind) = self.slots.insert(slot, cart);
        self.controller.on_cartridge_changed(slot, kind);
    }

    /// Pull the cartridge out of a slot.
    pub fn remove_cartridge(&mut self, slot: SlotId) -> Option<Cartridge> {
        let (cart, (slot, kind)) = self.slots.remove(slot);
        if cart.is_some() {
            self.controller.on_cartridge_changed(slot, kind);
        }
        cart
    }

    /// Machine reset. RAM contents survive.
    pub fn reset(&mut self) {
        self.controller.reset_policy();
    }

    #[must_use]
    pub fn controller(&self) -> &BankController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut BankController {
        &mut self.controller
    }

    #[must_use]
    pub fn slots(&self) -> &CartridgeSlots {
        &self.slots
    }

    /// Read without side effects, for debuggers and tests.
    #[must_use]
    pub fn peek(&self, address: u16) -> u8 {
        let byte = match self.controller.resolve(address, Access::Read) {
            Resolution::Mapped { store, offset } => self.store(store).get(offset).copied(),
            Resolution::OpenBus => None,
        };
        byte.unwrap_or(OPEN_BUS)
    }

    fn store(&self, store: BackingStore) -> &[u8] {
        match store {
            BackingStore::InternalRom => &self.rom,
            BackingStore::InternalRam => &self.ram[..],
            BackingStore::CartridgeRom(slot) => {
                self.slots.get(slot).map_or(&[][..], Cartridge::rom_bytes)
            }
            BackingStore::CartridgeRam(slot) => {
                self.slots.get(slot).map_or(&[][..], Cartridge::ram_bytes)
            }
        }
    }

    fn store_mut(&mut self, store: BackingStore) -> Option<&mut [u8]> {
        if !store.is_writable() {
            return None;
        }
        match store {
            BackingStore::InternalRam => Some(&mut self.ram[..]),
            BackingStore::CartridgeRam(slot) => {
                self.slots.get_mut(slot).map(Cartridge::ram_bytes_mut)
            }
            BackingStore::InternalRom | BackingStore::CartridgeRom(_) => None,
        }
    }
}

impl Bus for M5Bus {
    fn read(&mut self, address: u16) -> u8 {
        self.peek(address)
    }

    fn write(&mut self, address: u16, value: u8) {
        let Resolution::Mapped { store, offset } = self.controller.resolve(address, Access::Write)
        else {
            return;
        };
        if let Some(byte) = self
            .store_mut(store)
            .and_then(|bytes| bytes.get_mut(offset))
        {
            *byte = value;
        }
    }
}

impl IoBus for M5Bus {
    fn read_io(&mut self, _port: u16) -> u8 {
        OPEN_BUS
    }

    fn write_io(&mut self, port: u16, value: u8) {
        let [low, _] = port.to_le_bytes();
        if self.controller.variant().paging_port() == Some(low) {
            log::trace!("OUT ({low:#04X}),{value:#04X}");
            self.controller.on_mode_write(value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExpansionVariant;

    fn make_bus(variant: ExpansionVariant) -> M5Bus {
        let mut rom = vec![0; 0x2000];
        rom[0] = 0xC3;
        M5Bus::new(&M5Config::new(variant, rom)).expect("valid config")
    }

    #[test]
    fn stock_layout_reads_rom_and_ram() {
        let mut bus = make_bus(ExpansionVariant::Stock);
        assert_eq!(bus.read(0x0000), 0xC3);
        // Past the 8K monitor image.
        assert_eq!(bus.read(0x2000), OPEN_BUS);
        bus.write(0x7000, 0x12);
        bus.write(0xFFFF, 0x34);
        assert_eq!(bus.read(0x7000), 0x12);
        assert_eq!(bus.read(0xFFFF), 0x34);
    }

    #[test]
    fn rom_writes_are_dropped() {
        let mut bus = make_bus(ExpansionVariant::Stock);
        bus.write(0x0000, 0x00);
        assert_eq!(bus.read(0x0000), 0xC3);
    }

    #[test]
    fn paging_port_decoded_on_low_byte() {
        let mut bus = make_bus(ExpansionVariant::Em64);
        bus.insert_cartridge(SlotId::Slot1, Cartridge::ram(&[]).expect("empty firmware"));
        bus.write_io(0xAB6C, 0x01);
        assert_eq!(bus.controller().mode(), 1);
        bus.write_io(0x006D, 0x00);
        assert_eq!(bus.controller().mode(), 1);
        assert_eq!(bus.read_io(0x006C), OPEN_BUS);
    }

    #[test]
    fn em64_ram_mode_shadows_rom() {
        let mut bus = make_bus(ExpansionVariant::Em64);
        bus.insert_cartridge(SlotId::Slot2, Cartridge::ram(&[]).expect("empty firmware"));
        // Mode 0: ROM visible, writes below $7000 discarded.
        bus.write(0x0000, 0x55);
        assert_eq!(bus.read(0x0000), 0xC3);
        bus.write_io(0x6C, 1);
        bus.write(0x0000, 0x55);
        assert_eq!(bus.read(0x0000), 0x55);
        bus.write_io(0x6C, 0);
        assert_eq!(bus.read(0x0000), 0xC3);
    }

    #[test]
    fn sram_is_mainboard_ram_with_expansion() {
        let mut bus = make_bus(ExpansionVariant::Kbf);
        bus.insert_cartridge(SlotId::Slot1, Cartridge::ram(&[]).expect("empty firmware"));
        bus.write_io(0x30, 1);
        bus.write(0x7000, 0xAA);
        bus.remove_cartridge(SlotId::Slot1);
        assert_eq!(bus.read(0x7000), 0xAA);
    }

    #[test]
    fn remove_empty_slot_is_a_no_op() {
        let mut bus = make_bus(ExpansionVariant::Kbf);
        assert!(bus.remove_cartridge(SlotId::Slot2).is_none());
        assert_eq!(bus.controller().sources().ram(), None);
    }

    #[test]
    fn load_rom_checks_size() {
        let mut bus = make_bus(ExpansionVariant::Stock);
        assert!(bus.load_rom(&vec![0; INTERNAL_ROM_SIZE + 1]).is_err());
        bus.load_rom(&[0x3E]).expect("fits");
        assert_eq!(bus.peek(0x0000), 0x3E);
    }
}
