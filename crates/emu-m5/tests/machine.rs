//! Whole-bus behaviour: reset, cartridge arbitration, save state, 64KRX.

use emu_core::{Bus, IoBus, Observable, Value};
use emu_m5::{
    Cartridge, DipSwitches, ExpansionVariant, M5Bus, M5Config, OPEN_BUS, PagingSnapshot, SlotId,
};

/// 8K monitor with a recognisable first byte and a marker at $1FFF.
fn monitor() -> Vec<u8> {
    let mut rom = vec![0x00; 0x2000];
    rom[0x0000] = 0xF3;
    rom[0x1FFF] = 0x5A;
    rom
}

fn bus(variant: ExpansionVariant) -> M5Bus {
    M5Bus::new(&M5Config::new(variant, monitor())).expect("valid config")
}

fn firmware(fill: u8, len: usize) -> Cartridge {
    Cartridge::ram(&vec![fill; len]).expect("firmware fits")
}

#[test]
fn reset_without_cartridge_reads_internal_rom() {
    let mut bus = bus(ExpansionVariant::Kbf);
    bus.reset();
    assert_eq!(bus.read(0x0000), 0xF3);
    bus.write(0x0000, 0x99);
    assert_eq!(bus.read(0x0000), 0xF3);
    assert_eq!(bus.read(0x1FFF), 0x5A);
    // Nothing in the BASIC area without a cartridge.
    assert_eq!(bus.read(0x2000), OPEN_BUS);
}

#[test]
fn reset_with_rom_cartridge_maps_it_read_only() {
    let mut image = vec![0x11; 0x5000];
    image[0x0000] = 0xC3;
    image[0x1FFF] = 0x22;
    image[0x4FFF] = 0x33;

    let mut bus = bus(ExpansionVariant::Em64);
    bus.insert_cartridge(SlotId::Slot1, Cartridge::rom(&image).expect("image fits"));
    bus.reset();

    // Image offset 0 sits at $2000; the low window shows the same bytes.
    assert_eq!(bus.read(0x2000), 0xC3);
    assert_eq!(bus.read(0x3FFF), 0x22);
    assert_eq!(bus.read(0x6FFF), 0x33);
    assert_eq!(bus.read(0x0000), 0xC3);
    assert_eq!(bus.read(0x1FFF), 0x22);

    bus.write(0x0000, 0x00);
    bus.write(0x2000, 0x00);
    assert_eq!(bus.read(0x0000), 0xC3);
    assert_eq!(bus.read(0x2000), 0xC3);
}

#[test]
fn short_rom_cartridge_leaves_rest_of_basic_area_open() {
    let mut image = vec![0x00; 0x2000];
    image[0x0000] = 0xC3;

    let mut bus = bus(ExpansionVariant::Stock);
    bus.insert_cartridge(SlotId::Slot2, Cartridge::rom(&image).expect("image fits"));
    bus.reset();

    assert_eq!(bus.read(0x2000), 0xC3);
    assert_eq!(bus.read(0x4000), OPEN_BUS);
}

#[test]
fn rom_cartridge_visible_beside_ram_cartridge() {
    let mut image = vec![0x00; 0x2000];
    image[0x0000] = 0xC3;
    image[0x1FFF] = 0x5E;

    for (variant, port) in [(ExpansionVariant::Em64, 0x6C), (ExpansionVariant::Kbf, 0x30)] {
        let mut bus = bus(variant);
        bus.insert_cartridge(SlotId::Slot1, firmware(0xBF, 0x5000));
        bus.insert_cartridge(SlotId::Slot2, Cartridge::rom(&image).expect("image fits"));
        bus.reset();

        // Monitor stays at $0000, the cartridge starts at $2000.
        assert_eq!(bus.read(0x0000), 0xF3, "{variant}");
        assert_eq!(bus.read(0x2000), 0xC3, "{variant}");
        assert_eq!(bus.read(0x3FFF), 0x5E, "{variant}");
        assert_eq!(bus.read(0x4000), OPEN_BUS, "{variant}");

        bus.write_io(port, 1);
        assert_eq!(bus.read(0x2000), 0x00, "{variant} RAM mode");
    }
}

#[test]
fn kbf_firmware_starts_at_basic_area() {
    let mut fw = vec![0x00; 0x5000];
    fw[0x0000] = 0xBF;
    fw[0x4FFF] = 0xF0;

    let mut bus = bus(ExpansionVariant::Kbf);
    bus.insert_cartridge(SlotId::Slot1, Cartridge::ram(&fw).expect("firmware fits"));
    bus.reset();

    assert_eq!(bus.read(0x0000), 0xF3);
    assert_eq!(bus.read(0x2000), 0xBF);
    assert_eq!(bus.read(0x6FFF), 0xF0);
}

#[test]
fn two_ram_cartridges_last_inserted_wins() {
    let mut bus = bus(ExpansionVariant::Em64);
    bus.insert_cartridge(SlotId::Slot1, firmware(0xA1, 0x7000));
    bus.insert_cartridge(SlotId::Slot2, firmware(0xB2, 0x7000));
    assert_eq!(bus.controller().sources().ram(), Some(SlotId::Slot2));
    assert_eq!(bus.read(0x3000), 0xB2);

    let mut bus = self::bus(ExpansionVariant::Em64);
    bus.insert_cartridge(SlotId::Slot2, firmware(0xB2, 0x7000));
    bus.insert_cartridge(SlotId::Slot1, firmware(0xA1, 0x7000));
    assert_eq!(bus.controller().sources().ram(), Some(SlotId::Slot1));
    assert_eq!(bus.read(0x3000), 0xA1);
}

#[test]
fn removing_ram_source_hands_over_to_other_slot() {
    let mut bus = bus(ExpansionVariant::Em64);
    bus.insert_cartridge(SlotId::Slot1, firmware(0xA1, 0));
    bus.insert_cartridge(SlotId::Slot2, firmware(0xB2, 0));
    bus.write_io(0x6C, 1);
    bus.write(0x9000, 0x42);

    bus.remove_cartridge(SlotId::Slot2);
    assert_eq!(bus.controller().sources().ram(), Some(SlotId::Slot1));
    // Slot 1's RAM was never written.
    assert_eq!(bus.read(0x9000), 0x00);
}

#[test]
fn reset_returns_to_rom_but_keeps_ram() {
    let mut bus = bus(ExpansionVariant::Em64);
    bus.insert_cartridge(SlotId::Slot1, firmware(0xFF, 0));
    bus.write_io(0x6C, 1);
    bus.write(0x0000, 0x77);
    assert_eq!(bus.read(0x0000), 0x77);

    bus.reset();
    assert_eq!(bus.controller().mode(), 0);
    assert_eq!(bus.read(0x0000), 0xF3);

    bus.write_io(0x6C, 1);
    assert_eq!(bus.read(0x0000), 0x77);
}

#[test]
fn snapshot_survives_json_round_trip() {
    let mut bus = bus(ExpansionVariant::Kbf);
    bus.insert_cartridge(SlotId::Slot1, firmware(0x00, 0));
    bus.write_io(0x30, 6);
    let json = bus.controller().snapshot().to_json().expect("serialises");

    let mut restored = self::bus(ExpansionVariant::Kbf);
    restored.insert_cartridge(SlotId::Slot1, firmware(0x00, 0));
    let snap = PagingSnapshot::from_json(&json).expect("parses");
    restored.controller_mut().restore(&snap).expect("same variant");

    assert_eq!(restored.controller().mode(), 6);
    assert_eq!(restored.controller().table(), bus.controller().table());
}

#[test]
fn snapshot_from_other_variant_is_rejected() {
    let snap = PagingSnapshot {
        variant: ExpansionVariant::Krx,
        mode: 0x0F,
    };
    let mut bus = bus(ExpansionVariant::Kbf);
    assert!(bus.controller_mut().restore(&snap).is_err());
}

#[test]
fn krx_resets_with_all_roms_paged_in() {
    let mut fw = vec![0x00; 0x18000];
    fw[0x4000] = 0x1C; // BASIC-I
    fw[0x8000] = 0xBF; // BASIC-F high
    fw[0x10000] = 0x4D; // MSX

    let mut bus = bus(ExpansionVariant::Krx);
    bus.insert_cartridge(SlotId::Slot1, Cartridge::ram(&fw).expect("firmware fits"));
    bus.reset();

    assert_eq!(bus.controller().mode(), 0xFF);
    assert_eq!(bus.read(0x0000), 0xF3);
    assert_eq!(bus.read(0x4000), 0x1C);
    assert_eq!(bus.read(0x8000), 0xBF);

    // ROM reads, RAM writes underneath.
    bus.write(0x8000, 0x01);
    assert_eq!(bus.read(0x8000), 0xBF);
    bus.write_io(0x7F, 0x00);
    assert_eq!(bus.read(0x8000), 0x01);
}

#[test]
fn krx_dip_switch_selects_msx_bank() {
    let mut fw = vec![0x00; 0x18000];
    fw[0x8000] = 0xBF;
    fw[0x10000] = 0x4D;

    let mut config = M5Config::new(ExpansionVariant::Krx, monitor());
    config.dips = DipSwitches { krx_basic: false };
    let mut bus = M5Bus::new(&config).expect("valid config");
    bus.insert_cartridge(SlotId::Slot2, Cartridge::ram(&fw).expect("firmware fits"));

    assert_eq!(bus.read(0x8000), 0x4D);
    assert_eq!(bus.controller().query("dips.krx_basic"), Some(Value::Bool(false)));
}

#[test]
fn stock_machine_ignores_paging_ports() {
    let mut bus = bus(ExpansionVariant::Stock);
    bus.insert_cartridge(SlotId::Slot1, firmware(0x00, 0));
    for port in [0x30, 0x6C, 0x7F] {
        bus.write_io(port, 0xFF);
    }
    assert_eq!(bus.controller().mode(), 0);
    assert_eq!(bus.read(0x0000), 0xF3);
    bus.write(0x8000, 0x12);
    assert_eq!(bus.peek(0x8000), 0x12);
}

#[test]
fn observable_reports_routes() {
    let mut bus = bus(ExpansionVariant::Em64);
    bus.insert_cartridge(SlotId::Slot2, firmware(0x00, 0));
    bus.write_io(0x6C, 1);
    let ctrl = bus.controller();
    assert_eq!(ctrl.query("mode"), Some(Value::U8(1)));
    assert_eq!(ctrl.query("ram_slot"), Some(Value::String("slot2".into())));
    assert_eq!(
        ctrl.query("window.7.write"),
        Some(Value::String("ram+0x0000".into()))
    );
    assert_eq!(
        ctrl.query("window.8.read"),
        Some(Value::String("cart_ram(slot2)+0x8000".into()))
    );
    assert!(ctrl.query_paths().contains(&"window.<n>.read"));
}

#[test]
fn json_config_builds_machine() {
    let config = M5Config::from_json(r#"{ "variant": "em-64" }"#, monitor()).expect("parses");
    let bus = M5Bus::new(&config).expect("valid config");
    assert_eq!(bus.controller().variant(), ExpansionVariant::Em64);
    assert_eq!(bus.controller().query("paging_port"), Some(Value::U8(0x6C)));
}
