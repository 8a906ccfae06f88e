// SPDX-License-Identifier: AGPL-3.0-only

//! Software (in-memory) fabric
//!
//! Implements the fabric traits without hardware so configuration sequences
//! can be dry-run and checked:
//!
//! 1. **Packet log**: every accepted packet is recorded in order.
//! 2. **Transient rejection**: the interface can be told to reject the next
//!    N attempts, like a full output queue.
//! 3. **Finite router pool**: allocation fails once the pool is used up,
//!    and every programmed entry is kept for inspection.

use tracing::debug;

use crate::fabric::{CoreIdentity, McInterface, RouterTable};
use crate::packet::{ConfigPacket, RouteEntry};

/// Multicast router entries on a chip
pub const DEFAULT_ROUTER_ENTRIES: u32 = 1024;

/// In-memory fabric for one core
#[derive(Debug, Clone)]
pub struct SoftwareFabric {
    core: u32,
    /// Accepted packets, in hand-over order
    sent: Vec<ConfigPacket>,
    /// Send attempts, accepted or not
    attempts: u64,
    /// Attempts still to be rejected
    reject_next: u64,
    /// Router pool size
    pool_size: u32,
    /// Next free router slot
    next_slot: u32,
    /// Allocation calls made
    allocations: u32,
    /// Programmed router entries as `(slot, entry)`, in call order
    entries: Vec<(u32, RouteEntry)>,
}

impl SoftwareFabric {
    /// Fabric for `core` with a full-size router pool
    pub fn new(core: u32) -> Self {
        Self::with_pool(core, DEFAULT_ROUTER_ENTRIES)
    }

    /// Fabric for `core` with `pool_size` router entries
    pub fn with_pool(core: u32, pool_size: u32) -> Self {
        Self {
            core,
            sent: Vec::new(),
            attempts: 0,
            reject_next: 0,
            pool_size,
            next_slot: 0,
            allocations: 0,
            entries: Vec::new(),
        }
    }

    /// Reject the next `n` send attempts
    pub fn reject_next(&mut self, n: u64) {
        self.reject_next = n;
    }

    /// Accepted packets, in order
    pub fn sent(&self) -> &[ConfigPacket] {
        &self.sent
    }

    /// Drain the accepted packets
    pub fn take_sent(&mut self) -> Vec<ConfigPacket> {
        std::mem::take(&mut self.sent)
    }

    /// Send attempts made so far
    pub const fn attempts(&self) -> u64 {
        self.attempts
    }

    /// Allocation calls made so far
    pub const fn allocations(&self) -> u32 {
        self.allocations
    }

    /// Programmed router entries as `(slot, entry)`
    pub fn entries(&self) -> &[(u32, RouteEntry)] {
        &self.entries
    }

    /// Route word the table would apply to `key`, OR'd over matching entries
    pub fn route_for(&self, key: u32) -> u32 {
        self.entries
            .iter()
            .filter(|(_, e)| e.matches(key))
            .fold(0, |acc, (_, e)| acc | e.route)
    }
}

impl McInterface for SoftwareFabric {
    fn try_send(&mut self, packet: &ConfigPacket) -> bool {
        self.attempts += 1;
        if self.reject_next > 0 {
            self.reject_next -= 1;
            return false;
        }
        self.sent.push(*packet);
        true
    }
}

impl RouterTable for SoftwareFabric {
    fn alloc(&mut self, n: u32) -> Option<u32> {
        self.allocations += 1;
        let end = self.next_slot.checked_add(n)?;
        if n == 0 || end > self.pool_size {
            debug!(
                "Software router pool exhausted: {} of {} used, {} requested",
                self.next_slot, self.pool_size, n
            );
            return None;
        }
        let slot = self.next_slot;
        self.next_slot = end;
        Some(slot)
    }

    fn set_entry(&mut self, slot: u32, entry: RouteEntry) {
        debug!("Router entry {}: {}", slot, entry);
        self.entries.push((slot, entry));
    }
}

impl CoreIdentity for SoftwareFabric {
    fn core_id(&self) -> u32 {
        self.core
    }
}
