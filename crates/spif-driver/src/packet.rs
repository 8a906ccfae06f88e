//! Wire objects: multicast packets and router entries

use spif_chip::keys::{register_of, RoutingClass};

/// A multicast packet: 32-bit key plus optional 32-bit payload.
///
/// Built by the encoder, handed to the sender, never retained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConfigPacket {
    /// Routing key (class key | register)
    pub key: u32,
    /// Payload, absent for pure control signals
    pub payload: Option<u32>,
}

impl ConfigPacket {
    /// Packet carrying a value
    pub const fn with_payload(key: u32, payload: u32) -> Self {
        Self {
            key,
            payload: Some(payload),
        }
    }

    /// Control packet without payload
    pub const fn without_payload(key: u32) -> Self {
        Self { key, payload: None }
    }

    /// Payload-present flag as it goes on the wire
    pub const fn has_payload(&self) -> bool {
        self.payload.is_some()
    }

    /// Payload word as it goes on the wire (0 when absent)
    pub const fn payload_word(&self) -> u32 {
        match self.payload {
            Some(word) => word,
            None => 0,
        }
    }

    /// `(key, payload, has_payload)` triple
    pub const fn triple(&self) -> (u32, u32, bool) {
        (self.key, self.payload_word(), self.has_payload())
    }

    /// Class of the key, with the default class constants
    pub fn class(&self) -> Option<RoutingClass> {
        RoutingClass::classify(self.key)
    }

    /// Register bits of the key, with the default class constants
    pub fn register(&self) -> Option<u32> {
        register_of(self.key)
    }
}

impl std::fmt::Display for ConfigPacket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "key={:#010x}", self.key)?;
        match (self.class(), self.register()) {
            (Some(class), Some(reg)) => write!(f, " {class:<13} reg={reg:>3}")?,
            _ => write!(f, " {:<13} reg=  ?", "unknown")?,
        }
        match self.payload {
            Some(word) => write!(f, " payload={word:#010x}"),
            None => write!(f, " payload=-"),
        }
    }
}

/// One multicast router table entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RouteEntry {
    /// Match key
    pub key: u32,
    /// Match mask
    pub mask: u32,
    /// Output links and cores
    pub route: u32,
}

impl RouteEntry {
    /// Create a route entry
    pub const fn new(key: u32, mask: u32, route: u32) -> Self {
        Self { key, mask, route }
    }

    /// True if a packet with `key` is routed by this entry
    pub const fn matches(&self, key: u32) -> bool {
        key & self.mask == self.key
    }
}

impl std::fmt::Display for RouteEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "key={:#010x} mask={:#010x} route={:#010x}",
            self.key, self.mask, self.route
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_payload_goes_out_as_zero() {
        let pkt = ConfigPacket::without_payload(0xffff_fe11);
        assert_eq!(pkt.triple(), (0xffff_fe11, 0, false));

        let pkt = ConfigPacket::with_payload(0xffff_fe02, 0);
        assert_eq!(pkt.triple(), (0xffff_fe02, 0, true));
    }

    #[test]
    fn display_labels_class_and_register() {
        let pkt = ConfigPacket::with_payload(0xffff_ff47, 0x10);
        let text = pkt.to_string();
        assert!(text.starts_with("key=0xffffff47 remote-config"));
        assert!(text.contains("reg= 71"));
        assert!(text.ends_with("payload=0x00000010"));

        let pkt = ConfigPacket::without_payload(0xffff_fe11);
        assert!(pkt.to_string().ends_with("payload=-"));
    }

    #[test]
    fn route_entry_matches_class() {
        let entry = RouteEntry::new(0xffff_fd00, 0xffff_ff00, 1 << 7);
        assert!(entry.matches(0xffff_fd42));
        assert!(!entry.matches(0xffff_fe42));
    }
}
