//! Memory bank overlay controller.
//!
//! Holds the selected paging mode and the cartridge sources, and keeps an
//! overlay table in step with them. The table is rebuilt eagerly on every
//! trigger (mode write, cartridge change, reset, restore), so `resolve` is
//! a plain lookup.

use emu_core::{Observable, Value};

use crate::cartridge::{CartridgeKind, CartridgeSources, SlotId};
use crate::config::{DipSwitches, ExpansionVariant, M5Config};
use crate::error::ConfigError;
use crate::overlay::{Access, OverlayTable, Resolution, WINDOW_COUNT};
use crate::paging::{PagingInputs, build_table};
use crate::snapshot::PagingSnapshot;

/// Paging state of an M5 with (optionally) an expansion RAM board.
#[derive(Debug, Clone)]
pub struct BankController {
    variant: ExpansionVariant,
    dips: DipSwitches,
    mode: u8,
    sources: CartridgeSources,
    table: OverlayTable,
}

impl BankController {
    /// Create a controller for the configured board, in its reset mode.
    pub fn new(config: &M5Config) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::with_variant(config.variant, config.dips))
    }

    /// Create a controller without a full machine configuration.
    #[must_use]
    pub fn with_variant(variant: ExpansionVariant, dips: DipSwitches) -> Self {
        let mut ctrl = Self {
            variant,
            dips,
            mode: variant.reset_mode(),
            sources: CartridgeSources::default(),
            table: OverlayTable::unmapped(),
        };
        ctrl.rebuild();
        ctrl
    }

    #[must_use]
    pub fn variant(&self) -> ExpansionVariant {
        self.variant
    }

    /// Currently selected (decoded) paging mode.
    #[must_use]
    pub fn mode(&self) -> u8 {
        self.mode
    }

    #[must_use]
    pub fn sources(&self) -> &CartridgeSources {
        &self.sources
    }

    #[must_use]
    pub fn table(&self) -> &OverlayTable {
        &self.table
    }

    /// A byte was written to the paging port.
    ///
    /// Every value is legal. The table is rebuilt even when the decoded
    /// mode is unchanged.
    pub fn on_mode_write(&mut self, value: u8) {
        let mode = self.variant.decode_mode(value);
        if mode != self.mode {
            log::debug!(
                "{}: paging mode {:#04X} -> {:#04X}",
                self.variant,
                self.mode,
                mode
            );
        }
        self.mode = mode;
        self.rebuild();
    }

    /// A slot's contents changed: `None` means the slot is now empty.
    pub fn on_cartridge_changed(&mut self, slot: SlotId, kind: Option<CartridgeKind>) {
        let before = self.sources;
        self.sources.update(slot, kind);
        match kind {
            Some(kind) => log::info!("{slot}: {kind:?} cartridge inserted"),
            None => log::info!("{slot}: cartridge removed"),
        }
        if self.sources.ram() != before.ram() || self.sources.rom() != before.rom() {
            log::info!(
                "cartridge sources: ram={:?} rom={:?}",
                self.sources.ram(),
                self.sources.rom()
            );
        }
        self.rebuild();
    }

    /// Where an access to `address` lands under the current table.
    #[must_use]
    pub fn resolve(&self, address: u16, access: Access) -> Resolution {
        self.table.resolve(address, access)
    }

    /// Machine reset: back to the board's power-on mode.
    ///
    /// Cartridge sources stay as last resolved.
    pub fn reset_policy(&mut self) {
        self.mode = self.variant.reset_mode();
        log::debug!("{}: reset to mode {:#04X}", self.variant, self.mode);
        self.rebuild();
    }

    #[must_use]
    pub fn snapshot(&self) -> PagingSnapshot {
        PagingSnapshot {
            variant: self.variant,
            mode: self.mode,
        }
    }

    /// Restore a mode saved by [`Self::snapshot`].
    pub fn restore(&mut self, snapshot: &PagingSnapshot) -> Result<(), ConfigError> {
        if snapshot.variant != self.variant {
            return Err(ConfigError::SnapshotVariant {
                expected: self.variant,
                found: snapshot.variant,
            });
        }
        self.mode = self.variant.decode_mode(snapshot.mode);
        self.rebuild();
        Ok(())
    }

    fn rebuild(&mut self) {
        self.table = build_table(&PagingInputs {
            variant: self.variant,
            mode: self.mode,
            sources: self.sources,
            dips: self.dips,
        });
        log::debug!("overlay table rebuilt for mode {:#04X}", self.mode);
    }

    fn query_window(&self, rest: &str) -> Option<Value> {
        let (index, access) = rest.split_once('.')?;
        let window: usize = index.parse().ok()?;
        if window >= WINDOW_COUNT {
            return None;
        }
        let access = match access {
            "read" => Access::Read,
            "write" => Access::Write,
            _ => return None,
        };
        let mapping = self.table.route(window).get(access);
        Some(mapping.map(|m| m.to_string()).into())
    }
}

impl Observable for BankController {
    fn query(&self, path: &str) -> Option<Value> {
        if let Some(rest) = path.strip_prefix("window.") {
            return self.query_window(rest);
        }
        match path {
            "variant" => Some(self.variant.name().into()),
            "mode" => Some(self.mode.into()),
            "paging_port" => Some(self.variant.paging_port().into()),
            "ram_slot" => Some(self.sources.ram().map(|s| s.to_string()).into()),
            "rom_slot" => Some(self.sources.rom().map(|s| s.to_string()).into()),
            "dips.krx_basic" => Some(self.dips.krx_basic.into()),
            _ => None,
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &[
            "variant",
            "mode",
            "paging_port",
            "ram_slot",
            "rom_slot",
            "dips.krx_basic",
            "window.<n>.read",
            "window.<n>.write",
        ]
    }
}
