//! Multicast routing key classes.
//!
//! The top bits of a key select the packet class. For the three
//! configuration classes the low byte is left free by the class mask and
//! carries a register address.
//!
//! ```text
//! class              key          mask
//! peripheral data    0xfffe0000   0xffff0000
//! local config       0xfffffe00   0xffffff00   (consumed by spiNNlink)
//! remote config      0xffffff00   0xffffff00   (consumed by spif)
//! reply              0xfffffd00   0xffffff00   (counter values, to a core)
//! ```

// ── Peripheral data ──────────────────────────────────────────────────────────

/// Key of packets injected by the peripheral.
pub const PERIPHERAL_KEY: u32 = 0xfffe_0000;
/// Mask of packets injected by the peripheral.
pub const PERIPHERAL_MASK: u32 = 0xffff_0000;

// ── Configuration ────────────────────────────────────────────────────────────

/// spiNNlink (local) configuration key.
pub const LOCAL_CONFIG_KEY: u32 = 0xffff_fe00;
/// spiNNlink (local) configuration mask.
pub const LOCAL_CONFIG_MASK: u32 = 0xffff_ff00;

/// spif (remote) configuration key.
pub const REMOTE_CONFIG_KEY: u32 = 0xffff_ff00;
/// spif (remote) configuration mask.
pub const REMOTE_CONFIG_MASK: u32 = 0xffff_ff00;

// ── Replies ──────────────────────────────────────────────────────────────────

/// Key of diagnostic counter replies sent back by spif.
pub const REPLY_KEY: u32 = 0xffff_fd00;
/// Mask of diagnostic counter replies.
pub const REPLY_MASK: u32 = 0xffff_ff00;

/// Packet class selected by the top bits of a routing key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoutingClass {
    /// Events from the peripheral.
    PeripheralData,
    /// Configuration consumed by spiNNlink.
    LocalConfig,
    /// Configuration consumed by spif.
    RemoteConfig,
    /// Counter values returned by spif.
    Reply,
}

impl RoutingClass {
    /// All classes, most specific mask first.
    pub const ALL: [Self; 4] = [
        Self::LocalConfig,
        Self::RemoteConfig,
        Self::Reply,
        Self::PeripheralData,
    ];

    /// Class key.
    #[must_use]
    pub const fn key(self) -> u32 {
        match self {
            Self::PeripheralData => PERIPHERAL_KEY,
            Self::LocalConfig => LOCAL_CONFIG_KEY,
            Self::RemoteConfig => REMOTE_CONFIG_KEY,
            Self::Reply => REPLY_KEY,
        }
    }

    /// Class mask.
    #[must_use]
    pub const fn mask(self) -> u32 {
        match self {
            Self::PeripheralData => PERIPHERAL_MASK,
            Self::LocalConfig => LOCAL_CONFIG_MASK,
            Self::RemoteConfig => REMOTE_CONFIG_MASK,
            Self::Reply => REPLY_MASK,
        }
    }

    /// True if `key` falls in this class under the fabric's key/mask match.
    #[must_use]
    pub const fn matches(self, key: u32) -> bool {
        key & self.mask() == self.key()
    }

    /// Identify the class of a routing key, if any.
    #[must_use]
    pub fn classify(key: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|class| class.matches(key))
    }

    /// Short lowercase label, used in logs and CLI output.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::PeripheralData => "peripheral",
            Self::LocalConfig => "local-config",
            Self::RemoteConfig => "remote-config",
            Self::Reply => "reply",
        }
    }
}

impl std::fmt::Display for RoutingClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.label())
    }
}

/// Register bits of a key: whatever the class mask leaves free.
///
/// Returns `None` for keys outside every class.
#[must_use]
pub fn register_of(key: u32) -> Option<u32> {
    RoutingClass::classify(key).map(|class| key & !class.mask())
}
