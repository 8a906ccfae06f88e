//! spif configuration API
//!
//! One call per logical operation. Each call checks its indices, encodes the
//! packet and blocks until the local interface has taken it. Nothing comes
//! back from spif: success means the packet left this core, not that spif
//! applied it. Counter values arrive later as reply-class packets routed to
//! the core that ran [`initialize_routes`](crate::initialize_routes);
//! matching them to requests is up to whoever reads that stream.

use spif_chip::regs::DiagCounter;
use tracing::{debug, info};

use crate::config::ProtocolConfig;
use crate::encoder::{ConfigOp, PacketEncoder};
use crate::error::{IndexKind, Result};
use crate::fabric::McInterface;
use crate::sender::{ReliableSender, RetryPolicy, Spin};

/// Configuration handle for one spif bridge
#[derive(Debug)]
pub struct SpifController<I, P = Spin> {
    encoder: PacketEncoder,
    sender: ReliableSender<I, P>,
}

impl<I: McInterface> SpifController<I> {
    /// Controller with the default protocol and infinite retry
    ///
    /// # Errors
    ///
    /// Never fails with the built-in constants; kept fallible for symmetry
    /// with [`SpifController::with_config`].
    pub fn new(iface: I) -> Result<Self> {
        Self::with_config(iface, ProtocolConfig::default())
    }

    /// Controller with an explicit protocol and infinite retry
    ///
    /// # Errors
    ///
    /// Returns [`SpifError::InvalidConfig`](crate::SpifError::InvalidConfig)
    /// if `cfg` does not validate.
    pub fn with_config(iface: I, cfg: ProtocolConfig) -> Result<Self> {
        Self::build(cfg, ReliableSender::new(iface))
    }
}

impl<I: McInterface, P: RetryPolicy> SpifController<I, P> {
    /// Controller with an explicit protocol and retry policy
    ///
    /// # Errors
    ///
    /// Returns [`SpifError::InvalidConfig`](crate::SpifError::InvalidConfig)
    /// if `cfg` does not validate.
    pub fn with_policy(iface: I, cfg: ProtocolConfig, policy: P) -> Result<Self> {
        Self::build(cfg, ReliableSender::with_policy(iface, policy))
    }

    fn build(cfg: ProtocolConfig, sender: ReliableSender<I, P>) -> Result<Self> {
        let cfg = cfg.validate()?;
        info!(
            "spif controller ready: local {:#010x}, remote {:#010x}",
            cfg.classes.local_config.key, cfg.classes.remote_config.key
        );
        Ok(Self {
            encoder: PacketEncoder::new(cfg),
            sender,
        })
    }

    /// Protocol configuration in use
    pub const fn config(&self) -> &ProtocolConfig {
        self.encoder.config()
    }

    /// Encoder in use
    pub const fn encoder(&self) -> &PacketEncoder {
        &self.encoder
    }

    /// Underlying interface
    pub const fn interface(&self) -> &I {
        self.sender.interface()
    }

    /// Underlying interface, mutably
    pub fn interface_mut(&mut self) -> &mut I {
        self.sender.interface_mut()
    }

    /// Release the interface
    pub fn into_inner(self) -> I {
        self.sender.into_inner()
    }

    /// Check, encode and send one operation
    ///
    /// # Errors
    ///
    /// Returns [`SpifError::IndexOutOfRange`](crate::SpifError::IndexOutOfRange)
    /// before sending anything if an index is out of range, or
    /// [`SpifError::SendAborted`](crate::SpifError::SendAborted) if a
    /// bounded retry policy gives up.
    pub fn issue(&mut self, op: ConfigOp) -> Result<()> {
        op.check(self.encoder.config())?;
        let packet = self.encoder.encode(&op);
        debug!("spif {:?} -> {}", op, packet);
        self.sender.send(&packet)?;
        Ok(())
    }

    /// Set the key identifying input peripheral packets
    ///
    /// # Errors
    ///
    /// See [`SpifController::issue`].
    pub fn set_peripheral_key(&mut self, key: u32) -> Result<()> {
        self.issue(ConfigOp::PeripheralKey(key))
    }

    /// Set the mask identifying input peripheral packets
    ///
    /// # Errors
    ///
    /// See [`SpifController::issue`].
    pub fn set_peripheral_mask(&mut self, mask: u32) -> Result<()> {
        self.issue(ConfigOp::PeripheralMask(mask))
    }

    /// Set the key spiNNlink recognises as local configuration
    ///
    /// The protocol configuration of this controller is not changed; build a
    /// new one with matching [`ClassKeys`](crate::ClassKeys) afterwards.
    ///
    /// # Errors
    ///
    /// See [`SpifController::issue`].
    pub fn set_local_config_key(&mut self, key: u32) -> Result<()> {
        self.issue(ConfigOp::LocalConfigKey(key))
    }

    /// Set the mask spiNNlink recognises as local configuration
    ///
    /// # Errors
    ///
    /// See [`SpifController::issue`].
    pub fn set_local_config_mask(&mut self, mask: u32) -> Result<()> {
        self.issue(ConfigOp::LocalConfigMask(mask))
    }

    /// Set the key spiNNlink forwards to spif as remote configuration
    ///
    /// # Errors
    ///
    /// See [`SpifController::issue`].
    pub fn set_remote_config_key(&mut self, key: u32) -> Result<()> {
        self.issue(ConfigOp::RemoteConfigKey(key))
    }

    /// Set the mask spiNNlink forwards to spif as remote configuration
    ///
    /// # Errors
    ///
    /// See [`SpifController::issue`].
    pub fn set_remote_config_mask(&mut self, mask: u32) -> Result<()> {
        self.issue(ConfigOp::RemoteConfigMask(mask))
    }

    /// Set the key of spif input router entry `entry`
    ///
    /// # Errors
    ///
    /// See [`SpifController::issue`].
    pub fn set_routing_key(&mut self, entry: u32, key: u32) -> Result<()> {
        self.issue(ConfigOp::RouterKey { slot: entry, key })
    }

    /// Set the mask of spif input router entry `entry`
    ///
    /// # Errors
    ///
    /// See [`SpifController::issue`].
    pub fn set_routing_mask(&mut self, entry: u32, mask: u32) -> Result<()> {
        self.issue(ConfigOp::RouterMask { slot: entry, mask })
    }

    /// Set the route of spif input router entry `entry`
    ///
    /// # Errors
    ///
    /// See [`SpifController::issue`].
    pub fn set_routing_route(&mut self, entry: u32, route: u32) -> Result<()> {
        self.issue(ConfigOp::RouterRoute { slot: entry, route })
    }

    /// Set the cycles an input packet may wait before spif drops it
    ///
    /// # Errors
    ///
    /// See [`SpifController::issue`].
    pub fn set_input_drop_wait(&mut self, wait: u32) -> Result<()> {
        self.issue(ConfigOp::InputDropWait(wait))
    }

    /// Set the key stamped by mapper `map`
    ///
    /// # Errors
    ///
    /// See [`SpifController::issue`].
    pub fn set_mapper_key(&mut self, map: u32, key: u32) -> Result<()> {
        self.issue(ConfigOp::MapperKey { mapper: map, key })
    }

    /// Set the mask of field `field` of mapper `map`
    ///
    /// # Errors
    ///
    /// See [`SpifController::issue`].
    pub fn set_mapper_field_mask(&mut self, map: u32, field: u32, mask: u32) -> Result<()> {
        self.issue(ConfigOp::MapperFieldMask {
            mapper: map,
            field,
            mask,
        })
    }

    /// Set the shift of field `field` of mapper `map`
    ///
    /// A negative shift is a left shift; the value goes out as its raw
    /// two's-complement bits.
    ///
    /// # Errors
    ///
    /// See [`SpifController::issue`].
    pub fn set_mapper_field_shift(&mut self, map: u32, field: u32, shift: i32) -> Result<()> {
        self.issue(ConfigOp::MapperFieldShift {
            mapper: map,
            field,
            shift,
        })
    }

    /// Let peripheral input packets in
    ///
    /// # Errors
    ///
    /// See [`SpifController::issue`].
    pub fn start_input(&mut self) -> Result<()> {
        self.issue(ConfigOp::Start)
    }

    /// Stop peripheral input packets
    ///
    /// Input is held back in spiNNlink, not spif; configuration packets still
    /// flow.
    ///
    /// # Errors
    ///
    /// See [`SpifController::issue`].
    pub fn stop_input(&mut self) -> Result<()> {
        self.issue(ConfigOp::Stop)
    }

    /// Ask spif for a diagnostic counter value
    ///
    /// The value comes back as a reply-class packet.
    ///
    /// # Errors
    ///
    /// See [`SpifController::issue`].
    pub fn read_counter(&mut self, counter: DiagCounter) -> Result<()> {
        self.read_counter_at(counter.index())
    }

    /// Ask spif for the counter at `index` inside the counter block
    ///
    /// Reaches counters a wider layout adds past the named ones.
    ///
    /// # Errors
    ///
    /// Returns [`SpifError::IndexOutOfRange`](crate::SpifError::IndexOutOfRange)
    /// if `index` is past the configured counter block; otherwise see
    /// [`SpifController::issue`].
    pub fn read_counter_at(&mut self, index: u32) -> Result<()> {
        let layout = &self.encoder.config().layout;
        layout.check(IndexKind::Counter, index)?;
        let register = layout.counter_base.wrapping_add(index);
        self.issue(ConfigOp::ReadCounter { register })
    }

    /// Clear every diagnostic counter, lowest register first
    ///
    /// # Errors
    ///
    /// Returns [`SpifError::SendAborted`](crate::SpifError::SendAborted) if a
    /// bounded retry policy gives up; earlier counters stay cleared.
    pub fn reset_counters(&mut self) -> Result<()> {
        let Self { encoder, sender } = self;
        for packet in encoder.counter_reset_sequence() {
            sender.send(&packet)?;
        }
        debug!("spif counters reset");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::SoftwareFabric;
    use crate::config::RegisterLayout;
    use crate::error::SpifError;

    fn controller() -> SpifController<SoftwareFabric> {
        SpifController::new(SoftwareFabric::new(1)).unwrap()
    }

    #[test]
    fn peripheral_key_goes_to_spinnlink() {
        let mut spif = controller();
        spif.set_peripheral_key(0x0200_0000).unwrap();
        assert_eq!(spif.interface().sent()[0].triple(), (0xffff_fe02, 0x0200_0000, true));
    }

    #[test]
    fn out_of_range_sends_nothing() {
        let mut spif = controller();
        assert_eq!(
            spif.set_mapper_field_mask(0, 4, 0xff),
            Err(SpifError::out_of_range(IndexKind::MapperField, 4, 4))
        );
        assert_eq!(
            spif.set_routing_route(16, 1),
            Err(SpifError::out_of_range(IndexKind::RouterSlot, 16, 16))
        );
        assert!(spif.set_mapper_key(2, 0).is_err());
        assert!(spif.interface().sent().is_empty());
        assert_eq!(spif.interface().attempts(), 0);
    }

    #[test]
    fn read_counter_addresses_counter_block() {
        let mut spif = controller();
        spif.read_counter(DiagCounter::Dropped).unwrap();
        assert_eq!(spif.interface().sent()[0].triple(), (0xffff_ff42, 0, false));
    }

    #[test]
    fn wider_counter_block_is_readable() {
        let layout = RegisterLayout {
            diag_counters: 6,
            ..RegisterLayout::default()
        };
        let cfg = ProtocolConfig::default().with_layout(layout);
        let mut spif = SpifController::with_config(SoftwareFabric::new(1), cfg).unwrap();

        spif.read_counter_at(4).unwrap();
        spif.read_counter_at(5).unwrap();
        assert_eq!(
            spif.read_counter_at(6),
            Err(SpifError::out_of_range(IndexKind::Counter, 6, 6))
        );
        spif.reset_counters().unwrap();

        let sent = spif.interface().sent();
        assert_eq!(sent[0].triple(), (0xffff_ff44, 0, false));
        assert_eq!(sent[1].triple(), (0xffff_ff45, 0, false));
        assert_eq!(sent.len(), 2 + 6);
        assert_eq!(sent.last().map(|p| p.key), Some(0xffff_ff45));
    }

    #[test]
    fn retargeting_codes() {
        let mut spif = controller();
        spif.set_local_config_key(1).unwrap();
        spif.set_local_config_mask(2).unwrap();
        spif.set_remote_config_key(3).unwrap();
        spif.set_remote_config_mask(4).unwrap();
        let keys: Vec<u32> = spif.interface().sent().iter().map(|p| p.key).collect();
        assert_eq!(keys, vec![0xffff_fe0c, 0xffff_fe0d, 0xffff_fe0e, 0xffff_fe0f]);
    }

    #[test]
    fn invalid_config_refused() {
        let cfg = ProtocolConfig::default().with_peripheral_route(0);
        assert!(SpifController::with_config(SoftwareFabric::new(0), cfg).is_err());
    }
}
