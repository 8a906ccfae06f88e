//! Reliable packet sender
//!
//! The local interface may reject a packet transiently. The sender offers
//! the identical packet again until it is accepted. What happens between
//! attempts is a [`RetryPolicy`]: the default [`Spin`] retries forever with
//! no backoff, so a dead interface shows up as a hang rather than an error.
//! Packets are handed over strictly in call order.

use std::time::Duration;

use tracing::{trace, warn};

use crate::error::{Result, SpifError};
use crate::fabric::McInterface;
use crate::packet::ConfigPacket;

/// Decision taken after a rejected attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Retry {
    /// Offer the packet again
    Again,
    /// Give up and report [`SpifError::SendAborted`]
    Abort,
}

/// What to do between rejected attempts
pub trait RetryPolicy {
    /// Called after rejected attempt number `attempt` (starting at 1)
    fn on_reject(&mut self, attempt: u64) -> Retry;
}

/// Busy-wait forever
#[derive(Debug, Clone, Copy, Default)]
pub struct Spin;

impl RetryPolicy for Spin {
    fn on_reject(&mut self, _attempt: u64) -> Retry {
        std::hint::spin_loop();
        Retry::Again
    }
}

/// Busy-wait, giving up after a fixed number of attempts
#[derive(Debug, Clone, Copy)]
pub struct Bounded {
    /// Total attempts before aborting
    pub max_attempts: u64,
}

impl RetryPolicy for Bounded {
    fn on_reject(&mut self, attempt: u64) -> Retry {
        if attempt >= self.max_attempts {
            Retry::Abort
        } else {
            std::hint::spin_loop();
            Retry::Again
        }
    }
}

/// Sleep between attempts, doubling the delay up to a cap
#[derive(Debug, Clone, Copy)]
pub struct Backoff {
    /// Delay after the first rejection
    pub initial: Duration,
    /// Longest delay
    pub max: Duration,
    /// Total attempts before aborting; `None` retries forever
    pub max_attempts: Option<u64>,
}

impl Backoff {
    /// Delay after rejected attempt number `attempt`
    pub fn delay(&self, attempt: u64) -> Duration {
        let doublings = u32::try_from(attempt.saturating_sub(1)).unwrap_or(u32::MAX);
        self.initial
            .checked_mul(2u32.checked_pow(doublings).unwrap_or(u32::MAX))
            .map_or(self.max, |d| d.min(self.max))
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self {
            initial: Duration::from_micros(1),
            max: Duration::from_millis(1),
            max_attempts: None,
        }
    }
}

impl RetryPolicy for Backoff {
    fn on_reject(&mut self, attempt: u64) -> Retry {
        if self.max_attempts.is_some_and(|max| attempt >= max) {
            return Retry::Abort;
        }
        std::thread::sleep(self.delay(attempt));
        Retry::Again
    }
}

/// Blocking sender over a multicast interface
#[derive(Debug)]
pub struct ReliableSender<I, P = Spin> {
    iface: I,
    policy: P,
}

impl<I: McInterface> ReliableSender<I> {
    /// Sender that retries forever
    pub const fn new(iface: I) -> Self {
        Self {
            iface,
            policy: Spin,
        }
    }
}

impl<I: McInterface, P: RetryPolicy> ReliableSender<I, P> {
    /// Sender with an explicit retry policy
    pub const fn with_policy(iface: I, policy: P) -> Self {
        Self { iface, policy }
    }

    /// Hand one packet to the interface, retrying per policy
    ///
    /// Returns the number of attempts used. With [`Spin`] this never fails
    /// and may never return.
    ///
    /// # Errors
    ///
    /// Returns [`SpifError::SendAborted`] if the policy gives up.
    pub fn send(&mut self, packet: &ConfigPacket) -> Result<u64> {
        let mut attempts = 0u64;
        loop {
            attempts += 1;
            if self.iface.try_send(packet) {
                trace!(
                    key = packet.key,
                    payload = ?packet.payload,
                    attempts,
                    "packet accepted"
                );
                return Ok(attempts);
            }
            if self.policy.on_reject(attempts) == Retry::Abort {
                warn!(
                    "Send of key {:#010x} aborted after {} attempts",
                    packet.key, attempts
                );
                return Err(SpifError::SendAborted {
                    key: packet.key,
                    attempts,
                });
            }
        }
    }

    /// Underlying interface
    pub const fn interface(&self) -> &I {
        &self.iface
    }

    /// Underlying interface, mutably
    pub fn interface_mut(&mut self) -> &mut I {
        &mut self.iface
    }

    /// Release the interface
    pub fn into_inner(self) -> I {
        self.iface
    }
}
