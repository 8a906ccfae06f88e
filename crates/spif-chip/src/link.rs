//! Fabric links and multicast route bits.
//!
//! A route word has one bit per output: bits 0..6 are the six inter-chip
//! links, bits 6..24 are the local cores. spif is always connected to the
//! south link of chip (0, 0).

/// Inter-chip links per chip.
pub const LINKS: u32 = 6;

/// Processing cores per chip.
pub const CORES: u32 = 18;

/// Inter-chip link directions, in route bit order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Link {
    /// Link 0.
    East = 0,
    /// Link 1.
    NorthEast = 1,
    /// Link 2.
    North = 2,
    /// Link 3.
    West = 3,
    /// Link 4.
    SouthWest = 4,
    /// Link 5, facing spif.
    South = 5,
}

impl Link {
    /// Route bit for this link.
    #[must_use]
    pub const fn route(self) -> u32 {
        1 << (self as u32)
    }
}

/// Route to the spif bridge.
pub const ROUTE_TO_SPIF: u32 = Link::South.route();

/// Route to a local core, or `None` if `core` is not below [`CORES`].
#[must_use]
pub const fn route_to_core(core: u32) -> Option<u32> {
    if core < CORES {
        Some(1 << (core + LINKS))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spif_is_south() {
        assert_eq!(ROUTE_TO_SPIF, 1 << 5);
        assert_eq!(ROUTE_TO_SPIF, 0x20);
    }

    #[test]
    fn core_routes_follow_links() {
        assert_eq!(route_to_core(0), Some(1 << 6));
        assert_eq!(route_to_core(1), Some(1 << 7));
        assert_eq!(route_to_core(CORES - 1), Some(1 << 23));
        assert_eq!(route_to_core(0).map(|r| r & ROUTE_TO_SPIF), Some(0));
    }

    #[test]
    fn cores_past_the_chip_have_no_route() {
        assert_eq!(route_to_core(CORES), None);
        assert_eq!(route_to_core(26), None);
        assert_eq!(route_to_core(u32::MAX), None);
    }
}
