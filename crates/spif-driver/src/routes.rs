//! Route table installer
//!
//! Programs the three multicast entries that let configuration reach spif
//! and counter replies reach the calling core:
//!
//! ```text
//! slot+0  local-config   -> spif link
//! slot+1  remote-config  -> spif link
//! slot+2  reply          -> calling core
//! ```
//!
//! Runs once at start-up, before any configuration is sent. Entries are
//! never freed. Calling it again allocates a fresh block; guarding against
//! that is the caller's job. Allocation is not locked; one allocator per
//! core is assumed.

use spif_chip::link;
use tracing::{info, warn};

use crate::config::ProtocolConfig;
use crate::error::{IndexKind, Result, SpifError};
use crate::fabric::{CoreIdentity, RouterTable};
use crate::packet::RouteEntry;

/// Router entries the installer needs
pub const ROUTE_ENTRIES: u32 = 3;

/// Entries programmed by [`initialize_routes`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstalledRoutes {
    /// First allocated slot
    pub base_slot: u32,
    /// Entries in slot order
    pub entries: [RouteEntry; ROUTE_ENTRIES as usize],
}

/// Route entries for a core, in installation order
///
/// # Errors
///
/// Returns [`SpifError::IndexOutOfRange`] if `core` is not a core of this
/// chip.
pub fn route_entries(cfg: &ProtocolConfig, core: u32) -> Result<[RouteEntry; 3]> {
    let reply_route = link::route_to_core(core)
        .ok_or(SpifError::out_of_range(IndexKind::Core, core, link::CORES))?;
    let classes = &cfg.classes;
    Ok([
        RouteEntry::new(
            classes.local_config.key,
            classes.local_config.mask,
            cfg.peripheral_route,
        ),
        RouteEntry::new(
            classes.remote_config.key,
            classes.remote_config.mask,
            cfg.peripheral_route,
        ),
        RouteEntry::new(classes.reply.key, classes.reply.mask, reply_route),
    ])
}

/// Allocate and program the configuration routes
///
/// # Errors
///
/// Returns [`SpifError::RouterAllocation`] if the pool cannot supply three
/// contiguous entries; nothing is programmed in that case. Returns
/// [`SpifError::IndexOutOfRange`] if the identity reports an impossible
/// core, before allocating.
pub fn initialize_routes<R, C>(
    table: &mut R,
    identity: &C,
    cfg: &ProtocolConfig,
) -> Result<InstalledRoutes>
where
    R: RouterTable + ?Sized,
    C: CoreIdentity + ?Sized,
{
    let core = identity.core_id();
    let entries = route_entries(cfg, core)?;

    let Some(base_slot) = table.alloc(ROUTE_ENTRIES) else {
        warn!("Router table exhausted: could not allocate {ROUTE_ENTRIES} entries");
        return Err(SpifError::RouterAllocation {
            requested: ROUTE_ENTRIES,
        });
    };

    for (slot, entry) in (base_slot..).zip(entries) {
        table.set_entry(slot, entry);
    }

    info!(
        "Installed spif routes at slots {}..{} (replies to core {})",
        base_slot,
        base_slot + ROUTE_ENTRIES,
        core
    );

    Ok(InstalledRoutes { base_slot, entries })
}
