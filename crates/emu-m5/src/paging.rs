//! Paging mode tables for the M5 RAM expansion boards.
//!
//! # EM-64 / 64KBI (OUT $6C)
//!
//! | Mode | $0000-$6FFF  | $7000-$FFFF |
//! |------|--------------|-------------|
//! | 0    | ROM (write-protected) | RAM |
//! | 1    | RAM          | RAM         |
//!
//! # 64KBF version 2C / LZR (OUT $30)
//!
//! | Mode | Read                        | Write              |
//! |------|-----------------------------|--------------------|
//! | 0    | 8K MON + 20K BF + 36K RAM   | 28K DIS + 36K RAM  |
//! | 1    | 64K RAM                     | 64K RAM            |
//! | 2    | 8K MON + 56K RAM            | 64K RAM            |
//! | 3    | 64K RAM                     | 28K DIS + 36K RAM  |
//! | 4    | 64K RAM                     | 16K DIS + 48K RAM  |
//! | 5    | 8K MON + 20K BF + 36K RAM   | 64K RAM            |
//! | 6    | 8K MON + 20K DIS + 36K RAM  | 64K RAM            |
//! | 7    | 64K DIS                     | 64K DIS            |
//!
//! # 64KRD / 64KRX (OUT $7F)
//!
//! Each bit pages one 8K chunk: 0 = RAM, 1 = ROM. Bit 0 = $0000,
//! bit 1 = $2000, bit 2 = $4000, bit 3 = unused ($6000 is always RAM),
//! bits 4-7 = $8000, $A000, $C000, $E000. Writes always reach RAM.
//!
//! Chunks 0-1 are the mainboard EPROMs (monitor, WINDOWS + BASIC-F part 3).
//! Chunk 2 is BASIC-I on the cartridge. Chunks 4-7 are BASIC-F/BASIC-G or
//! MSX 1.C, chosen by a DIP switch on the cartridge.
//!
//! # Common rules
//!
//! Cartridge ROM and the EM-64/64KBF firmware are decoded from $2000, so
//! offset 0 of the image is at $2000. The 64KRX EPROM set is addressed by
//! CPU address instead.
//!
//! $7000-$7FFF is always mainboard SRAM: it overlays expansion memory in
//! every mode. Without a RAM cartridge the boards have nothing to page and
//! the stock layout applies.

use crate::cartridge::{CartridgeSources, SlotId};
use crate::config::{DipSwitches, ExpansionVariant};
use crate::overlay::{
    BackingStore, HIGH, MID, MON, Mapping, OverlayTable, SRAM, WINDOW_COUNT, WINDOW_SIZE,
};

/// What a stretch of the address space maps to in a mode table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cell {
    /// Read-only view: monitor in MON, BASIC or cartridge ROM in MID.
    Rom,
    /// Expansion RAM.
    Ram,
    /// Disabled.
    Dis,
}

/// A stretch of `kib` kilobytes, as written in the board documentation.
#[derive(Debug, Clone, Copy)]
struct Span {
    kib: usize,
    cell: Cell,
}

const fn span(kib: usize, cell: Cell) -> Span {
    Span { kib, cell }
}

const RAM64: &[Span] = &[span(64, Cell::Ram)];
const DIS64: &[Span] = &[span(64, Cell::Dis)];
const ROM28_RAM36: &[Span] = &[span(8, Cell::Rom), span(20, Cell::Rom), span(36, Cell::Ram)];
const DIS28_RAM36: &[Span] = &[span(28, Cell::Dis), span(36, Cell::Ram)];

/// EM-64 / 64KBI: (read, write) per mode.
const EM64_MODES: [(&[Span], &[Span]); 2] = [(ROM28_RAM36, DIS28_RAM36), (RAM64, RAM64)];

/// 64KBF / LZR: (read, write) per mode.
const KBF_MODES: [(&[Span], &[Span]); 8] = [
    (ROM28_RAM36, DIS28_RAM36),
    (RAM64, RAM64),
    (&[span(8, Cell::Rom), span(56, Cell::Ram)], RAM64),
    (RAM64, DIS28_RAM36),
    (RAM64, &[span(16, Cell::Dis), span(48, Cell::Ram)]),
    (ROM28_RAM36, RAM64),
    (
        &[span(8, Cell::Rom), span(20, Cell::Dis), span(36, Cell::Ram)],
        RAM64,
    ),
    (DIS64, DIS64),
];

/// Address of the first byte of a cartridge ROM image.
const CART_ROM_ORIGIN: u16 = 0x2000;

/// Firmware offset of the MSX EPROM bank on a 64KRX.
const KRX_MSX_BANK: usize = 0x8000;

/// Everything a table rebuild depends on.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PagingInputs {
    pub variant: ExpansionVariant,
    pub mode: u8,
    pub sources: CartridgeSources,
    pub dips: DipSwitches,
}

/// Build the overlay table for the given inputs.
pub(crate) fn build_table(inputs: &PagingInputs) -> OverlayTable {
    let rom_cart = inputs.sources.rom();
    let Some(ram_cart) = inputs.sources.ram() else {
        return stock_layout(rom_cart);
    };

    let mut table = match inputs.variant {
        ExpansionVariant::Stock => return stock_layout(rom_cart),
        ExpansionVariant::Em64 => {
            let (read, write) = EM64_MODES[usize::from(inputs.mode & 0x01)];
            span_layout(read, write, ram_cart, rom_cart)
        }
        ExpansionVariant::Kbf => {
            let (read, write) = KBF_MODES[usize::from(inputs.mode & 0x07)];
            span_layout(read, write, ram_cart, rom_cart)
        }
        ExpansionVariant::Krx => krx_layout(inputs.mode, ram_cart, inputs.dips),
    };

    table.set_both(SRAM, sram);
    table
}

/// Mainboard SRAM at $7000, mapped linearly.
fn sram(window: usize) -> Option<Mapping> {
    Some(Mapping::linear(BackingStore::InternalRam, window, 0x7000))
}

/// Machine without expansion RAM.
///
/// A ROM cartridge is decoded at $2000-$6FFF with its first byte at $2000.
/// The cartridge also answers in the monitor window, where its first 8K
/// appear again from $0000; without a cartridge the monitor is there and
/// $2000-$6FFF is empty. Both windows are read-only. Mainboard RAM fills
/// $7000-$FFFF.
fn stock_layout(rom_cart: Option<SlotId>) -> OverlayTable {
    let mut table = OverlayTable::unmapped();
    let low_rom = rom_cart.map_or(BackingStore::InternalRom, BackingStore::CartridgeRom);
    table.set_read(MON, |w| Some(Mapping::linear(low_rom, w, 0)));
    table.set_read(MID, |w| rom_cart.map(|slot| cartridge_rom(slot, w)));
    table.set_both(SRAM.start..HIGH.end, sram);
    table
}

/// Cartridge ROM (or RAM-cartridge firmware) in the BASIC area. Offset 0
/// of the image sits at $2000.
fn cartridge_rom(slot: SlotId, window: usize) -> Mapping {
    Mapping::linear(BackingStore::CartridgeRom(slot), window, CART_ROM_ORIGIN)
}

/// Read-only view of a window in the EM-64 and 64KBF tables.
///
/// MON is always the monitor. MID is a plugged ROM cartridge if there is
/// one, otherwise the board's own firmware (BASIC-F on the 64KBF).
fn rom_view(window: usize, ram_cart: SlotId, rom_cart: Option<SlotId>) -> Mapping {
    if MON.contains(&window) {
        Mapping::linear(BackingStore::InternalRom, window, 0)
    } else {
        cartridge_rom(rom_cart.unwrap_or(ram_cart), window)
    }
}

fn cell_mapping(
    cell: Cell,
    window: usize,
    ram_cart: SlotId,
    rom_cart: Option<SlotId>,
) -> Option<Mapping> {
    match cell {
        Cell::Rom => Some(rom_view(window, ram_cart, rom_cart)),
        Cell::Ram => Some(Mapping::linear(
            BackingStore::CartridgeRam(ram_cart),
            window,
            0,
        )),
        Cell::Dis => None,
    }
}

/// Expand a documentation row into per-window cells.
fn expand(spans: &[Span]) -> [Cell; WINDOW_COUNT] {
    let mut cells = [Cell::Dis; WINDOW_COUNT];
    let mut window = 0;
    for s in spans {
        for _ in 0..(s.kib * 1024 / WINDOW_SIZE) {
            cells[window] = s.cell;
            window += 1;
        }
    }
    debug_assert_eq!(window, WINDOW_COUNT, "mode row must cover 64K");
    cells
}

fn span_layout(
    read: &[Span],
    write: &[Span],
    ram_cart: SlotId,
    rom_cart: Option<SlotId>,
) -> OverlayTable {
    let read = expand(read);
    let write = expand(write);
    let mut table = OverlayTable::unmapped();
    table.set_read(0..WINDOW_COUNT, |w| {
        cell_mapping(read[w], w, ram_cart, rom_cart)
    });
    table.set_write(0..WINDOW_COUNT, |w| {
        cell_mapping(write[w], w, ram_cart, rom_cart)
    });
    table
}

fn krx_layout(mode: u8, ram_cart: SlotId, dips: DipSwitches) -> OverlayTable {
    let ram = |w| Some(Mapping::linear(BackingStore::CartridgeRam(ram_cart), w, 0));
    let firmware = BackingStore::CartridgeRom(ram_cart);
    let high_bank = if dips.krx_basic { 0 } else { KRX_MSX_BANK };

    let mut table = OverlayTable::unmapped();
    table.set_both(0..WINDOW_COUNT, ram);

    for chunk in 0..8 {
        if chunk == 3 || mode & (1 << chunk) == 0 {
            continue;
        }
        let windows = chunk * 2..chunk * 2 + 2;
        match chunk {
            0 | 1 => table.set_read(windows, |w| {
                Some(Mapping::linear(BackingStore::InternalRom, w, 0))
            }),
            2 => table.set_read(windows, |w| Some(Mapping::linear(firmware, w, 0))),
            _ => table.set_read(windows, |w| {
                Some(Mapping::banked(firmware, w, high_bank))
            }),
        }
    }
    table
}
