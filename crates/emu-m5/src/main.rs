//! Sord M5 paging inspector.
//!
//! Builds the memory system for an expansion board and cartridge setup and
//! prints where each 4K window's reads and writes land, for one paging
//! mode or for every mode the board supports.

use std::path::{Path, PathBuf};
use std::process;

use emu_core::IoBus;
use emu_m5::overlay::{WINDOW_COUNT, window_start};
use emu_m5::{Cartridge, CartridgeKind, ConfigError, ExpansionVariant, M5Bus, M5Config, SlotId};

// ---------------------------------------------------------------------------
// CLI argument parsing
// ---------------------------------------------------------------------------

struct CartArg {
    kind: CartridgeKind,
    path: Option<PathBuf>,
}

struct CliArgs {
    variant: String,
    config_path: Option<PathBuf>,
    rom_path: Option<PathBuf>,
    carts: [Option<CartArg>; 2],
    mode: Option<u8>,
}

fn parse_cart(spec: &str) -> Option<CartArg> {
    let (kind, rest) = if let Some(path) = spec.strip_prefix("rom:") {
        (CartridgeKind::Rom, path)
    } else if let Some(path) = spec.strip_prefix("ram:") {
        (CartridgeKind::Ram, path)
    } else if spec == "ram" {
        (CartridgeKind::Ram, "")
    } else {
        return None;
    };
    Some(CartArg {
        kind,
        path: (!rest.is_empty()).then(|| PathBuf::from(rest)),
    })
}

fn parse_number(s: &str) -> Option<u8> {
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix('$')) {
        u8::from_str_radix(hex, 16).ok()
    } else {
        s.parse().ok()
    }
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().collect();
    let mut cli = CliArgs {
        variant: "stock".to_string(),
        config_path: None,
        rom_path: None,
        carts: [None, None],
        mode: None,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--variant" => {
                i += 1;
                if let Some(s) = args.get(i) {
                    cli.variant.clone_from(s);
                }
            }
            "--config" => {
                i += 1;
                cli.config_path = args.get(i).map(PathBuf::from);
            }
            "--rom" => {
                i += 1;
                cli.rom_path = args.get(i).map(PathBuf::from);
            }
            flag @ ("--cart1" | "--cart2") => {
                i += 1;
                let index = usize::from(flag == "--cart2");
                match args.get(i).map(|s| parse_cart(s)) {
                    Some(Some(cart)) => cli.carts[index] = Some(cart),
                    _ => {
                        eprintln!("{flag} expects rom:<file>, ram:<file> or ram");
                        process::exit(1);
                    }
                }
            }
            "--mode" => {
                i += 1;
                match args.get(i).and_then(|s| parse_number(s)) {
                    Some(mode) => cli.mode = Some(mode),
                    None => {
                        eprintln!("--mode expects a byte value");
                        process::exit(1);
                    }
                }
            }
            "--help" | "-h" => {
                eprintln!("Usage: emu-m5 [OPTIONS]");
                eprintln!();
                eprintln!("Options:");
                eprintln!("  --variant <name>     Expansion board: stock, em64, 64kbf, 64krx [default: stock]");
                eprintln!("  --config <file>      JSON configuration (overrides --variant)");
                eprintln!("  --rom <file>         Machine ROM image, up to 28K");
                eprintln!("  --cart1 <cart>       Slot 1 cartridge: rom:<file>, ram:<file> or ram");
                eprintln!("  --cart2 <cart>       Slot 2 cartridge");
                eprintln!("  --mode <value>       Byte written to the paging port [default: every mode]");
                process::exit(0);
            }
            other => {
                eprintln!("Unknown argument: {other}");
                process::exit(1);
            }
        }
        i += 1;
    }

    cli
}

// ---------------------------------------------------------------------------
// Machine setup
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<Vec<u8>, String> {
    std::fs::read(path).map_err(|e| format!("{}: {e}", path.display()))
}

fn make_bus(cli: &CliArgs) -> Result<M5Bus, String> {
    let rom = match &cli.rom_path {
        Some(path) => read_file(path)?,
        None => Vec::new(),
    };

    let config = match &cli.config_path {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .map_err(|e| format!("{}: {e}", path.display()))?;
            M5Config::from_json(&json, rom)
        }
        None => cli
            .variant
            .parse::<ExpansionVariant>()
            .map(|variant| M5Config::new(variant, rom)),
    }
    .map_err(|e: ConfigError| e.to_string())?;

    let mut bus = M5Bus::new(&config).map_err(|e| e.to_string())?;

    for (slot, cart) in SlotId::ALL.into_iter().zip(&cli.carts) {
        let Some(cart) = cart else { continue };
        let image = match &cart.path {
            Some(path) => read_file(path)?,
            None => Vec::new(),
        };
        let cart = Cartridge::from_image(cart.kind, &image).map_err(|e| e.to_string())?;
        bus.insert_cartridge(slot, cart);
    }

    Ok(bus)
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

fn print_table(bus: &M5Bus) {
    let ctrl = bus.controller();
    println!("{} mode {:#04X}", ctrl.variant(), ctrl.mode());
    for window in 0..WINDOW_COUNT {
        let route = ctrl.table().route(window);
        let show = |m: Option<emu_m5::Mapping>| m.map_or_else(|| "-".to_string(), |m| m.to_string());
        println!(
            "  ${:04X}  read {:<24} write {}",
            window_start(window),
            show(route.read),
            show(route.write)
        );
    }
}

fn main() {
    env_logger::init();
    let cli = parse_args();

    let mut bus = match make_bus(&cli) {
        Ok(bus) => bus,
        Err(e) => {
            log::error!("{e}");
            eprintln!("Failed to set up machine: {e}");
            process::exit(1);
        }
    };

    let variant = bus.controller().variant();
    let Some(port) = variant.paging_port() else {
        print_table(&bus);
        return;
    };

    let modes: Vec<u8> = match cli.mode {
        Some(mode) => vec![mode],
        None => (0..=u8::MAX)
            .take(variant.mode_count())
            .collect(),
    };
    for mode in modes {
        bus.write_io(u16::from(port), mode);
        print_table(&bus);
    }
}
