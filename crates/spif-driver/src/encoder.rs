//! Packet encoder
//!
//! Pure mapping from a logical configuration operation to the multicast
//! packet that carries it. Addresses are computed with unchecked (wrapping)
//! arithmetic: an index past the end of its block lands on a neighbouring
//! register. Range checks belong to [`ConfigOp::check`], which the
//! controller runs before encoding.

use tracing::debug;

use crate::config::ProtocolConfig;
use crate::error::{IndexKind, Result};
use crate::packet::ConfigPacket;

/// One logical configuration operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigOp {
    /// Key identifying input peripheral packets (spiNNlink)
    PeripheralKey(u32),
    /// Mask identifying input peripheral packets (spiNNlink)
    PeripheralMask(u32),
    /// Key spiNNlink treats as local configuration
    LocalConfigKey(u32),
    /// Mask spiNNlink treats as local configuration
    LocalConfigMask(u32),
    /// Key spiNNlink forwards as remote configuration
    RemoteConfigKey(u32),
    /// Mask spiNNlink forwards as remote configuration
    RemoteConfigMask(u32),
    /// spif input router key for a slot
    RouterKey {
        /// Router slot
        slot: u32,
        /// Match key
        key: u32,
    },
    /// spif input router mask for a slot
    RouterMask {
        /// Router slot
        slot: u32,
        /// Match mask
        mask: u32,
    },
    /// spif input router route for a slot
    RouterRoute {
        /// Router slot
        slot: u32,
        /// Output route
        route: u32,
    },
    /// Cycles an input packet waits before spif drops it
    InputDropWait(u32),
    /// Key stamped by a mapper
    MapperKey {
        /// Mapper
        mapper: u32,
        /// Key
        key: u32,
    },
    /// Mask of one mapper field
    MapperFieldMask {
        /// Mapper
        mapper: u32,
        /// Field
        field: u32,
        /// Mask
        mask: u32,
    },
    /// Shift of one mapper field; negative shifts left
    MapperFieldShift {
        /// Mapper
        mapper: u32,
        /// Field
        field: u32,
        /// Signed shift, sent as its two's-complement bits
        shift: i32,
    },
    /// Let peripheral input in
    Start,
    /// Stop peripheral input (configuration still flows)
    Stop,
    /// Ask spif to reply with a counter value
    ReadCounter {
        /// Register address of the counter
        register: u32,
    },
    /// Clear one diagnostic counter
    ResetCounter {
        /// Offset inside the counter block
        index: u32,
    },
}

impl ConfigOp {
    /// Check every index the operation carries against the layout
    ///
    /// # Errors
    ///
    /// Returns [`SpifError::IndexOutOfRange`](crate::SpifError::IndexOutOfRange)
    /// for a slot, mapper, field or counter past the end of its block.
    pub fn check(&self, cfg: &ProtocolConfig) -> Result<()> {
        let layout = &cfg.layout;
        match *self {
            Self::RouterKey { slot, .. }
            | Self::RouterMask { slot, .. }
            | Self::RouterRoute { slot, .. } => {
                layout.check(IndexKind::RouterSlot, slot)?;
            }
            Self::MapperKey { mapper, .. } => {
                layout.check(IndexKind::Mapper, mapper)?;
            }
            Self::MapperFieldMask { mapper, field, .. }
            | Self::MapperFieldShift { mapper, field, .. } => {
                layout.check(IndexKind::Mapper, mapper)?;
                layout.check(IndexKind::MapperField, field)?;
            }
            Self::ReadCounter { register } => {
                let index = register.wrapping_sub(layout.counter_base);
                layout.check(IndexKind::Counter, index)?;
            }
            Self::ResetCounter { index } => {
                layout.check(IndexKind::Counter, index)?;
            }
            Self::PeripheralKey(_)
            | Self::PeripheralMask(_)
            | Self::LocalConfigKey(_)
            | Self::LocalConfigMask(_)
            | Self::RemoteConfigKey(_)
            | Self::RemoteConfigMask(_)
            | Self::InputDropWait(_)
            | Self::Start
            | Self::Stop => {}
        }
        Ok(())
    }
}

/// Stateless encoder bound to one protocol configuration
#[derive(Debug, Clone, Copy)]
pub struct PacketEncoder {
    cfg: ProtocolConfig,
}

impl PacketEncoder {
    /// Create an encoder
    pub const fn new(cfg: ProtocolConfig) -> Self {
        Self { cfg }
    }

    /// Configuration in use
    pub const fn config(&self) -> &ProtocolConfig {
        &self.cfg
    }

    fn local(&self, code: u32) -> u32 {
        self.cfg.classes.local_config.key | code
    }

    fn remote(&self, register: u32) -> u32 {
        self.cfg.classes.remote_config.key | register
    }

    fn mapper_field(&self, base: u32, mapper: u32, field: u32) -> u32 {
        base.wrapping_add(mapper.wrapping_mul(self.cfg.layout.registers_per_mapper))
            .wrapping_add(field)
    }

    /// Encode one operation
    pub fn encode(&self, op: &ConfigOp) -> ConfigPacket {
        let local = &self.cfg.local;
        let layout = &self.cfg.layout;

        match *op {
            ConfigOp::PeripheralKey(key) => {
                ConfigPacket::with_payload(self.local(local.peripheral_key), key)
            }
            ConfigOp::PeripheralMask(mask) => {
                ConfigPacket::with_payload(self.local(local.peripheral_mask), mask)
            }
            ConfigOp::LocalConfigKey(key) => {
                ConfigPacket::with_payload(self.local(local.local_config_key), key)
            }
            ConfigOp::LocalConfigMask(mask) => {
                ConfigPacket::with_payload(self.local(local.local_config_mask), mask)
            }
            ConfigOp::RemoteConfigKey(key) => {
                ConfigPacket::with_payload(self.local(local.remote_config_key), key)
            }
            ConfigOp::RemoteConfigMask(mask) => {
                ConfigPacket::with_payload(self.local(local.remote_config_mask), mask)
            }
            ConfigOp::RouterKey { slot, key } => ConfigPacket::with_payload(
                self.remote(layout.router_key_base.wrapping_add(slot)),
                key,
            ),
            ConfigOp::RouterMask { slot, mask } => ConfigPacket::with_payload(
                self.remote(layout.router_mask_base.wrapping_add(slot)),
                mask,
            ),
            ConfigOp::RouterRoute { slot, route } => ConfigPacket::with_payload(
                self.remote(layout.router_route_base.wrapping_add(slot)),
                route,
            ),
            ConfigOp::InputDropWait(wait) => {
                ConfigPacket::with_payload(self.remote(layout.input_drop_wait), wait)
            }
            ConfigOp::MapperKey { mapper, key } => ConfigPacket::with_payload(
                self.remote(layout.mapper_key_base.wrapping_add(mapper)),
                key,
            ),
            ConfigOp::MapperFieldMask {
                mapper,
                field,
                mask,
            } => ConfigPacket::with_payload(
                self.remote(self.mapper_field(layout.mapper_mask_base, mapper, field)),
                mask,
            ),
            ConfigOp::MapperFieldShift {
                mapper,
                field,
                shift,
            } => ConfigPacket::with_payload(
                self.remote(self.mapper_field(layout.mapper_shift_base, mapper, field)),
                u32::from_ne_bytes(shift.to_ne_bytes()),
            ),
            ConfigOp::Start => ConfigPacket::without_payload(self.local(local.start)),
            ConfigOp::Stop => ConfigPacket::without_payload(self.local(local.stop)),
            ConfigOp::ReadCounter { register } => {
                ConfigPacket::without_payload(self.remote(register))
            }
            ConfigOp::ResetCounter { index } => ConfigPacket::with_payload(
                self.remote(layout.counter_base.wrapping_add(index)),
                0,
            ),
        }
    }

    /// Packets clearing every diagnostic counter, in ascending register order
    pub fn counter_reset_sequence(&self) -> impl Iterator<Item = ConfigPacket> + '_ {
        debug!(
            "Encoding reset of {} counters from register {}",
            self.cfg.layout.diag_counters, self.cfg.layout.counter_base
        );
        (0..self.cfg.layout.diag_counters)
            .map(move |index| self.encode(&ConfigOp::ResetCounter { index }))
    }
}

impl Default for PacketEncoder {
    fn default() -> Self {
        Self::new(ProtocolConfig::default())
    }
}
