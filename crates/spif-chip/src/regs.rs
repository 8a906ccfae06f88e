//! Register map for spiNNlink (local) and spif (remote) configuration.
//!
//! A configuration packet's key is its class key OR'd with one of the
//! register addresses below. Local registers live in spiNNlink and are
//! addressed with [`LOCAL_CONFIG_KEY`](crate::keys::LOCAL_CONFIG_KEY);
//! remote registers live in spif and are addressed with
//! [`REMOTE_CONFIG_KEY`](crate::keys::REMOTE_CONFIG_KEY).
//!
//! ## Remote layout
//!
//! ```text
//!   16..32   router entry key      (one per slot)
//!   32..48   router entry mask
//!   48..64   router entry route
//!   64..68   diagnostic counters   (contiguous, reset as a block)
//!   71       input drop wait
//!   72..74   mapper key            (one per mapper)
//!   80..88   mapper field mask     (mapper * REGISTERS_PER_MAPPER + field)
//!   96..104  mapper field shift
//! ```
//!
//! Indexed blocks are densely packed. An index past the end of a block
//! addresses the next register over, so callers validate before encoding.

/// spiNNlink registers, addressed through the local-config class.
///
/// In most cases the payload carries the value.
pub mod local {
    /// Key identifying input peripheral packets.
    pub const PERIPHERAL_KEY: u32 = 2;
    /// Mask identifying input peripheral packets.
    pub const PERIPHERAL_MASK: u32 = 3;
    /// Key spiNNlink recognises as local configuration.
    pub const LOCAL_CONFIG_KEY: u32 = 12;
    /// Mask spiNNlink recognises as local configuration.
    pub const LOCAL_CONFIG_MASK: u32 = 13;
    /// Key spiNNlink forwards to spif as remote configuration.
    pub const REMOTE_CONFIG_KEY: u32 = 14;
    /// Mask spiNNlink forwards to spif as remote configuration.
    pub const REMOTE_CONFIG_MASK: u32 = 15;
    /// Stop peripheral input (configuration still flows). No payload.
    pub const STOP: u32 = 16;
    /// Let peripheral input in. No payload.
    pub const START: u32 = 17;
}

/// spif registers, addressed through the remote-config class.
pub mod remote {
    // ── Input router ─────────────────────────────────────────────────────────

    /// Router entry key, slot 0.
    pub const ROUTER_KEY_BASE: u32 = 16;
    /// Router entry mask, slot 0.
    pub const ROUTER_MASK_BASE: u32 = 32;
    /// Router entry route, slot 0.
    pub const ROUTER_ROUTE_BASE: u32 = 48;
    /// Router slots per field block.
    pub const ROUTER_ENTRIES: u32 = 16;

    // ── Diagnostics ──────────────────────────────────────────────────────────

    /// First diagnostic counter (outbound peripheral packets).
    pub const COUNTER_BASE: u32 = 64;
    /// Diagnostic counters, contiguous from [`COUNTER_BASE`].
    pub const DIAG_COUNTERS: u32 = 4;

    // ── Input drop ───────────────────────────────────────────────────────────

    /// Cycles an input packet may wait before spif drops it.
    pub const INPUT_DROP_WAIT: u32 = 71;

    // ── Mappers ──────────────────────────────────────────────────────────────

    /// Mapper key, mapper 0.
    pub const MAPPER_KEY_BASE: u32 = 72;
    /// Mapper field mask, mapper 0 field 0.
    pub const MAPPER_MASK_BASE: u32 = 80;
    /// Mapper field shift, mapper 0 field 0. Negative shift means left.
    pub const MAPPER_SHIFT_BASE: u32 = 96;
    /// Register stride between consecutive mappers.
    pub const REGISTERS_PER_MAPPER: u32 = 4;
    /// Fields extracted by each mapper.
    pub const FIELDS_PER_MAPPER: u32 = 4;
    /// Mappers (one per input pipe).
    pub const MAPPERS: u32 = 2;
}

/// spif diagnostic counters, in register order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DiagCounter {
    /// Peripheral packets sent out to the fabric.
    OutboundPeripheral = 0,
    /// Configuration packets received.
    Config = 1,
    /// Packets dropped after waiting too long.
    Dropped = 2,
    /// Peripheral packets received from the fabric.
    InboundPeripheral = 3,
}

impl DiagCounter {
    /// All counters in ascending register order.
    pub const ALL: [Self; 4] = [
        Self::OutboundPeripheral,
        Self::Config,
        Self::Dropped,
        Self::InboundPeripheral,
    ];

    /// Offset inside the counter block.
    #[must_use]
    pub const fn index(self) -> u32 {
        self as u32
    }

    /// Remote register address with the default layout.
    #[must_use]
    pub const fn register(self) -> u32 {
        remote::COUNTER_BASE + self.index()
    }

    /// Counter at a block offset.
    #[must_use]
    pub const fn from_index(index: u32) -> Option<Self> {
        match index {
            0 => Some(Self::OutboundPeripheral),
            1 => Some(Self::Config),
            2 => Some(Self::Dropped),
            3 => Some(Self::InboundPeripheral),
            _ => None,
        }
    }

    /// Short lowercase name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::OutboundPeripheral => "out-peripheral",
            Self::Config => "config",
            Self::Dropped => "dropped",
            Self::InboundPeripheral => "in-peripheral",
        }
    }
}

impl std::str::FromStr for DiagCounter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.name() == s)
            .ok_or_else(|| format!("unknown diagnostic counter: {s}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_codes() {
        assert_eq!(local::PERIPHERAL_KEY, 2);
        assert_eq!(local::PERIPHERAL_MASK, 3);
        assert_eq!(local::STOP, 16);
        assert_eq!(local::START, 17);
        assert_ne!(local::STOP, local::START);
    }

    #[test]
    fn remote_blocks_do_not_overlap() {
        use super::remote::*;
        let blocks = [
            (ROUTER_KEY_BASE, ROUTER_ENTRIES),
            (ROUTER_MASK_BASE, ROUTER_ENTRIES),
            (ROUTER_ROUTE_BASE, ROUTER_ENTRIES),
            (COUNTER_BASE, DIAG_COUNTERS),
            (INPUT_DROP_WAIT, 1),
            (MAPPER_KEY_BASE, MAPPERS),
            (MAPPER_MASK_BASE, MAPPERS * REGISTERS_PER_MAPPER),
            (MAPPER_SHIFT_BASE, MAPPERS * REGISTERS_PER_MAPPER),
        ];
        for (i, &(a, alen)) in blocks.iter().enumerate() {
            assert!(a + alen <= 0x100, "block at {a} leaves the low byte");
            for &(b, blen) in &blocks[i + 1..] {
                assert!(a + alen <= b || b + blen <= a, "blocks at {a} and {b} overlap");
            }
        }
    }

    #[test]
    fn fields_fit_in_mapper_stride() {
        assert!(remote::FIELDS_PER_MAPPER <= remote::REGISTERS_PER_MAPPER);
    }

    #[test]
    fn counters_are_contiguous() {
        for (i, counter) in DiagCounter::ALL.into_iter().enumerate() {
            assert_eq!(counter.index() as usize, i);
            assert_eq!(counter.register(), remote::COUNTER_BASE + i as u32);
            assert_eq!(DiagCounter::from_index(counter.index()), Some(counter));
        }
        assert_eq!(DiagCounter::ALL.len() as u32, remote::DIAG_COUNTERS);
        assert_eq!(DiagCounter::from_index(remote::DIAG_COUNTERS), None);
    }

    #[test]
    fn counter_names_parse() {
        assert_eq!("dropped".parse::<DiagCounter>(), Ok(DiagCounter::Dropped));
        assert!("bogus".parse::<DiagCounter>().is_err());
    }
}
