//! Fabric abstraction
//!
//! The three platform services this crate needs from the local chip: a
//! multicast network interface, the multicast router table, and the
//! identity of the calling core. Hardware runtimes and the in-memory
//! [`SoftwareFabric`](crate::backends::SoftwareFabric) implement them.

use crate::packet::{ConfigPacket, RouteEntry};

/// Local network interface for multicast packets
pub trait McInterface {
    /// Offer one packet for transmission
    ///
    /// Returns `false` when the interface rejects the attempt (for example
    /// the output queue is full). A rejection is transient; the caller may
    /// try the identical packet again.
    fn try_send(&mut self, packet: &ConfigPacket) -> bool;
}

/// Multicast router table resource pool
pub trait RouterTable {
    /// Allocate `n` contiguous entries
    ///
    /// Returns the first slot, or `None` when the pool is exhausted.
    fn alloc(&mut self, n: u32) -> Option<u32>;

    /// Program one allocated entry
    fn set_entry(&mut self, slot: u32, entry: RouteEntry);
}

/// Identity of the calling core
pub trait CoreIdentity {
    /// Core number on this chip
    fn core_id(&self) -> u32;
}

/// Identity fixed at construction, for hosts that already know the core
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedCore(pub u32);

impl CoreIdentity for FixedCore {
    fn core_id(&self) -> u32 {
        self.0
    }
}

impl<T: McInterface + ?Sized> McInterface for &mut T {
    fn try_send(&mut self, packet: &ConfigPacket) -> bool {
        (**self).try_send(packet)
    }
}

impl<T: RouterTable + ?Sized> RouterTable for &mut T {
    fn alloc(&mut self, n: u32) -> Option<u32> {
        (**self).alloc(n)
    }

    fn set_entry(&mut self, slot: u32, entry: RouteEntry) {
        (**self).set_entry(slot, entry);
    }
}

impl<T: CoreIdentity + ?Sized> CoreIdentity for &T {
    fn core_id(&self) -> u32 {
        (**self).core_id()
    }
}

impl<T: CoreIdentity + ?Sized> CoreIdentity for &mut T {
    fn core_id(&self) -> u32 {
        (**self).core_id()
    }
}
