//! Protocol model for the spif peripheral interface.
//!
//! This crate has **no dependencies** and **no hardware access**. It is a
//! pure model of the wire contract between a SpiNNaker core and the spif
//! bridge sitting behind the chip (0, 0) south link: routing key classes,
//! the spiNNlink (local) and spif (remote) register maps, the diagnostic
//! counter block, and the route bits used to reach the bridge and a core.
//!
//! Every value here must match the peripheral controller bit for bit. None
//! of it is negotiated on the wire.
//!
//! # Crate organisation
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`keys`] | Class keys and masks, key classification |
//! | [`regs`] | Local and remote register codes, block sizes, diagnostic counters |
//! | [`link`] | Fabric links, route bits, core count |

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod keys;
pub mod link;
pub mod regs;
