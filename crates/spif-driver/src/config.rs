//! Protocol configuration
//!
//! The class keys, register codes and block sizes shared out-of-band with
//! spif. Built once, validated, then handed to the encoder and the route
//! installer. Defaults come from `spif_chip`.

use spif_chip::{keys, link, regs};
use tracing::debug;

use crate::error::{IndexKind, Result, SpifError};

/// Key/mask pair of one packet class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyMask {
    /// Class key
    pub key: u32,
    /// Class mask
    pub mask: u32,
}

impl KeyMask {
    /// Create a key/mask pair
    pub const fn new(key: u32, mask: u32) -> Self {
        Self { key, mask }
    }

    /// Number of register addresses left free by the mask
    pub const fn register_space(&self) -> u64 {
        (!self.mask as u64) + 1
    }
}

/// Key/mask pairs of every class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassKeys {
    /// Peripheral data
    pub peripheral: KeyMask,
    /// spiNNlink configuration
    pub local_config: KeyMask,
    /// spif configuration
    pub remote_config: KeyMask,
    /// Counter replies
    pub reply: KeyMask,
}

impl Default for ClassKeys {
    fn default() -> Self {
        Self {
            peripheral: KeyMask::new(keys::PERIPHERAL_KEY, keys::PERIPHERAL_MASK),
            local_config: KeyMask::new(keys::LOCAL_CONFIG_KEY, keys::LOCAL_CONFIG_MASK),
            remote_config: KeyMask::new(keys::REMOTE_CONFIG_KEY, keys::REMOTE_CONFIG_MASK),
            reply: KeyMask::new(keys::REPLY_KEY, keys::REPLY_MASK),
        }
    }
}

/// spiNNlink register codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalRegisters {
    /// Peripheral key
    pub peripheral_key: u32,
    /// Peripheral mask
    pub peripheral_mask: u32,
    /// Local-config key recognised by spiNNlink
    pub local_config_key: u32,
    /// Local-config mask recognised by spiNNlink
    pub local_config_mask: u32,
    /// Remote-config key forwarded to spif
    pub remote_config_key: u32,
    /// Remote-config mask forwarded to spif
    pub remote_config_mask: u32,
    /// Stop input
    pub stop: u32,
    /// Start input
    pub start: u32,
}

impl Default for LocalRegisters {
    fn default() -> Self {
        Self {
            peripheral_key: regs::local::PERIPHERAL_KEY,
            peripheral_mask: regs::local::PERIPHERAL_MASK,
            local_config_key: regs::local::LOCAL_CONFIG_KEY,
            local_config_mask: regs::local::LOCAL_CONFIG_MASK,
            remote_config_key: regs::local::REMOTE_CONFIG_KEY,
            remote_config_mask: regs::local::REMOTE_CONFIG_MASK,
            stop: regs::local::STOP,
            start: regs::local::START,
        }
    }
}

impl LocalRegisters {
    fn codes(&self) -> [u32; 8] {
        [
            self.peripheral_key,
            self.peripheral_mask,
            self.local_config_key,
            self.local_config_mask,
            self.remote_config_key,
            self.remote_config_mask,
            self.stop,
            self.start,
        ]
    }
}

/// spif register bases and block sizes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterLayout {
    /// Router entry key, slot 0
    pub router_key_base: u32,
    /// Router entry mask, slot 0
    pub router_mask_base: u32,
    /// Router entry route, slot 0
    pub router_route_base: u32,
    /// Router slots
    pub router_entries: u32,
    /// First diagnostic counter
    pub counter_base: u32,
    /// Diagnostic counters
    pub diag_counters: u32,
    /// Input drop wait
    pub input_drop_wait: u32,
    /// Mapper key, mapper 0
    pub mapper_key_base: u32,
    /// Mapper field mask, mapper 0 field 0
    pub mapper_mask_base: u32,
    /// Mapper field shift, mapper 0 field 0
    pub mapper_shift_base: u32,
    /// Register stride between mappers
    pub registers_per_mapper: u32,
    /// Fields per mapper
    pub fields_per_mapper: u32,
    /// Mappers
    pub mappers: u32,
}

impl Default for RegisterLayout {
    fn default() -> Self {
        use regs::remote;
        Self {
            router_key_base: remote::ROUTER_KEY_BASE,
            router_mask_base: remote::ROUTER_MASK_BASE,
            router_route_base: remote::ROUTER_ROUTE_BASE,
            router_entries: remote::ROUTER_ENTRIES,
            counter_base: remote::COUNTER_BASE,
            diag_counters: remote::DIAG_COUNTERS,
            input_drop_wait: remote::INPUT_DROP_WAIT,
            mapper_key_base: remote::MAPPER_KEY_BASE,
            mapper_mask_base: remote::MAPPER_MASK_BASE,
            mapper_shift_base: remote::MAPPER_SHIFT_BASE,
            registers_per_mapper: remote::REGISTERS_PER_MAPPER,
            fields_per_mapper: remote::FIELDS_PER_MAPPER,
            mappers: remote::MAPPERS,
        }
    }
}

impl RegisterLayout {
    /// Check an index against the size of its block
    ///
    /// # Errors
    ///
    /// Returns [`SpifError::IndexOutOfRange`] if `index` is past the end.
    pub fn check(&self, kind: IndexKind, index: u32) -> Result<u32> {
        let limit = match kind {
            IndexKind::RouterSlot => self.router_entries,
            IndexKind::Mapper => self.mappers,
            IndexKind::MapperField => self.fields_per_mapper,
            IndexKind::Counter => self.diag_counters,
            IndexKind::Core => link::CORES,
        };
        if index < limit {
            Ok(index)
        } else {
            Err(SpifError::out_of_range(kind, index, limit))
        }
    }

    /// `(name, base, length)` of every block
    ///
    /// Lengths are widened so oversized layouts cannot overflow.
    pub fn blocks(&self) -> [(&'static str, u32, u64); 8] {
        let mapper_span = u64::from(self.mappers) * u64::from(self.registers_per_mapper);
        [
            ("router key", self.router_key_base, u64::from(self.router_entries)),
            ("router mask", self.router_mask_base, u64::from(self.router_entries)),
            ("router route", self.router_route_base, u64::from(self.router_entries)),
            ("counters", self.counter_base, u64::from(self.diag_counters)),
            ("input drop wait", self.input_drop_wait, 1),
            ("mapper key", self.mapper_key_base, u64::from(self.mappers)),
            ("mapper mask", self.mapper_mask_base, mapper_span),
            ("mapper shift", self.mapper_shift_base, mapper_span),
        ]
    }
}

/// Everything the encoder and installer need to agree with spif
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProtocolConfig {
    /// Class key/mask pairs
    pub classes: ClassKeys,
    /// spiNNlink register codes
    pub local: LocalRegisters,
    /// spif register layout
    pub layout: RegisterLayout,
    /// Route word reaching spif from this chip
    pub peripheral_route: u32,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            classes: ClassKeys::default(),
            local: LocalRegisters::default(),
            layout: RegisterLayout::default(),
            peripheral_route: link::ROUTE_TO_SPIF,
        }
    }
}

impl ProtocolConfig {
    /// Default configuration for spif on the chip (0, 0) south link
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the class keys
    #[must_use]
    pub const fn with_classes(mut self, classes: ClassKeys) -> Self {
        self.classes = classes;
        self
    }

    /// Replace the spiNNlink register codes
    #[must_use]
    pub const fn with_local(mut self, local: LocalRegisters) -> Self {
        self.local = local;
        self
    }

    /// Replace the spif register layout
    #[must_use]
    pub const fn with_layout(mut self, layout: RegisterLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Replace the route word towards spif
    #[must_use]
    pub const fn with_peripheral_route(mut self, route: u32) -> Self {
        self.peripheral_route = route;
        self
    }

    /// Check that every register address stays inside its class
    ///
    /// # Errors
    ///
    /// Returns [`SpifError::InvalidConfig`] if a block leaves the bits freed
    /// by the remote-config mask, a local code leaves the local-config mask,
    /// mapper fields overrun the mapper stride, or no route reaches spif.
    pub fn validate(self) -> Result<Self> {
        if self.peripheral_route == 0 {
            return Err(SpifError::invalid_config("peripheral route is empty"));
        }

        if self.layout.fields_per_mapper > self.layout.registers_per_mapper {
            return Err(SpifError::invalid_config(format!(
                "{} fields per mapper exceed stride of {}",
                self.layout.fields_per_mapper, self.layout.registers_per_mapper
            )));
        }

        let remote_space = self.classes.remote_config.register_space();
        for (name, base, len) in self.layout.blocks() {
            let end = u64::from(base) + len;
            if end > remote_space {
                return Err(SpifError::invalid_config(format!(
                    "{name} block {base}..{end} exceeds remote register space {remote_space}"
                )));
            }
        }

        let local_space = self.classes.local_config.register_space();
        if let Some(code) = self
            .local
            .codes()
            .into_iter()
            .find(|&code| u64::from(code) >= local_space)
        {
            return Err(SpifError::invalid_config(format!(
                "local register {code} exceeds local register space {local_space}"
            )));
        }

        debug!(
            "Protocol config validated: remote space {}, local space {}",
            remote_space, local_space
        );
        Ok(self)
    }
}
