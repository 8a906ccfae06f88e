//! `spif`: dry runs of spif configuration packets.
//!
//! Every command runs against an in-memory fabric and prints what would go
//! on the wire.
//!
//! ```text
//! USAGE:
//!   spif init --core N                   Route entries installed at start-up
//!   spif peripheral-key KEY              spiNNlink peripheral key
//!   spif routing-key SLOT KEY            spif input router entry key
//!   spif mapper-shift MAP FIELD SHIFT    Mapper field shift (negative = left)
//!   spif read-counter NAME               Counter read request
//!   spif reset-counters                  Clear every diagnostic counter
//!   spif layout                          Register map in use
//! ```

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use spif_chip::regs::DiagCounter;
use spif_driver::{
    initialize_routes, FixedCore, ProtocolConfig, RouterTable, SoftwareFabric, SpifController,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "spif", about = "spif configuration packet dry runs", version)]
struct Cli {
    /// Reject this many send attempts first, as a full output queue would.
    #[arg(long, global = true, default_value_t = 0)]
    reject: u64,

    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Show the router entries installed at start-up.
    Init {
        /// Core receiving counter replies.
        #[arg(long, default_value_t = 1)]
        core: u32,
        /// Router entries already taken by other code.
        #[arg(long, default_value_t = 0)]
        used: u32,
    },
    /// Set the key identifying input peripheral packets.
    PeripheralKey {
        #[arg(value_parser = parse_word)]
        key: u32,
    },
    /// Set the mask identifying input peripheral packets.
    PeripheralMask {
        #[arg(value_parser = parse_word)]
        mask: u32,
    },
    /// Set the key of a spif input router entry.
    RoutingKey {
        slot: u32,
        #[arg(value_parser = parse_word)]
        key: u32,
    },
    /// Set the mask of a spif input router entry.
    RoutingMask {
        slot: u32,
        #[arg(value_parser = parse_word)]
        mask: u32,
    },
    /// Set the route of a spif input router entry.
    RoutingRoute {
        slot: u32,
        #[arg(value_parser = parse_word)]
        route: u32,
    },
    /// Set the cycles an input packet waits before being dropped.
    DropWait { wait: u32 },
    /// Set the key stamped by a mapper.
    MapperKey {
        map: u32,
        #[arg(value_parser = parse_word)]
        key: u32,
    },
    /// Set the mask of a mapper field.
    MapperMask {
        map: u32,
        field: u32,
        #[arg(value_parser = parse_word)]
        mask: u32,
    },
    /// Set the shift of a mapper field (negative shifts left).
    MapperShift {
        map: u32,
        field: u32,
        #[arg(allow_negative_numbers = true)]
        shift: i32,
    },
    /// Let peripheral input in.
    Start,
    /// Stop peripheral input.
    Stop,
    /// Request a diagnostic counter value.
    ReadCounter {
        /// out-peripheral, config, dropped or in-peripheral.
        counter: DiagCounter,
    },
    /// Clear every diagnostic counter.
    ResetCounters,
    /// Print the register map in use.
    Layout,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()),
        )
        .init();

    let cli = Cli::parse();
    let cfg = ProtocolConfig::default();

    match cli.command {
        Cmd::Init { core, used } => cmd_init(&cfg, core, used)?,
        Cmd::Layout => cmd_layout(&cfg),
        cmd => cmd_configure(cfg, cli.reject, cmd)?,
    }

    Ok(())
}

/// Accept decimal or `0x`-prefixed hex.
fn parse_word(s: &str) -> Result<u32, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(&hex.replace('_', ""), 16),
        None => s.replace('_', "").parse(),
    };
    parsed.map_err(|e| format!("invalid 32-bit word {s:?}: {e}"))
}

fn cmd_init(cfg: &ProtocolConfig, core: u32, used: u32) -> Result<()> {
    let mut fabric = SoftwareFabric::new(core);
    if used > 0 {
        fabric
            .alloc(used)
            .with_context(|| format!("cannot pre-allocate {used} router entries"))?;
    }

    let routes = initialize_routes(&mut fabric, &FixedCore(core), cfg)?;
    println!("spif routes (core {core}):");
    for (slot, entry) in fabric.entries() {
        println!("  [{slot:>4}] {entry}");
    }
    info!("base slot {}", routes.base_slot);
    Ok(())
}

fn cmd_configure(cfg: ProtocolConfig, reject: u64, cmd: Cmd) -> Result<()> {
    let mut fabric = SoftwareFabric::new(0);
    fabric.reject_next(reject);

    let mut spif = SpifController::with_config(&mut fabric, cfg)?;
    match cmd {
        Cmd::PeripheralKey { key } => spif.set_peripheral_key(key)?,
        Cmd::PeripheralMask { mask } => spif.set_peripheral_mask(mask)?,
        Cmd::RoutingKey { slot, key } => spif.set_routing_key(slot, key)?,
        Cmd::RoutingMask { slot, mask } => spif.set_routing_mask(slot, mask)?,
        Cmd::RoutingRoute { slot, route } => spif.set_routing_route(slot, route)?,
        Cmd::DropWait { wait } => spif.set_input_drop_wait(wait)?,
        Cmd::MapperKey { map, key } => spif.set_mapper_key(map, key)?,
        Cmd::MapperMask { map, field, mask } => spif.set_mapper_field_mask(map, field, mask)?,
        Cmd::MapperShift { map, field, shift } => {
            spif.set_mapper_field_shift(map, field, shift)?;
        }
        Cmd::Start => spif.start_input()?,
        Cmd::Stop => spif.stop_input()?,
        Cmd::ReadCounter { counter } => spif.read_counter(counter)?,
        Cmd::ResetCounters => spif.reset_counters()?,
        Cmd::Init { .. } | Cmd::Layout => bail!("command sends no configuration packet"),
    }

    for packet in fabric.sent() {
        println!("{packet}");
    }
    if reject > 0 {
        println!("({} attempts for {} packets)", fabric.attempts(), fabric.sent().len());
    }
    Ok(())
}

fn cmd_layout(cfg: &ProtocolConfig) {
    let classes = &cfg.classes;
    println!("Classes");
    for (name, km) in [
        ("peripheral", classes.peripheral),
        ("local-config", classes.local_config),
        ("remote-config", classes.remote_config),
        ("reply", classes.reply),
    ] {
        println!("  {name:<14} key={:#010x} mask={:#010x}", km.key, km.mask);
    }

    let local = &cfg.local;
    println!("spiNNlink registers");
    for (name, code) in [
        ("peripheral key", local.peripheral_key),
        ("peripheral mask", local.peripheral_mask),
        ("local-config key", local.local_config_key),
        ("local-config mask", local.local_config_mask),
        ("remote-config key", local.remote_config_key),
        ("remote-config mask", local.remote_config_mask),
        ("stop", local.stop),
        ("start", local.start),
    ] {
        println!("  {name:<18} {code:>3}");
    }

    println!("spif registers");
    for (name, base, len) in cfg.layout.blocks() {
        println!("  {name:<18} {base:>3}..{:<3} ({len})", u64::from(base) + len);
    }
    println!("  mapper stride      {}", cfg.layout.registers_per_mapper);
    println!("Route to spif        {:#010x}", cfg.peripheral_route);
}
