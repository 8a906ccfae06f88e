//! Configuration and control of a spif peripheral bridge from a SpiNNaker
//! core.
//!
//! spif sits behind the south link of chip (0, 0). It is configured by
//! sending multicast packets whose key selects a register and whose payload
//! carries the value. This crate encodes those packets, delivers them over
//! the local network interface with unbounded retry, and installs the router
//! entries that carry configuration out and counter replies back.
//!
//! # Layers
//!
//! ```text
//! SpifController        one call per logical operation, index checks
//!   └─ PacketEncoder    ConfigOp -> (key, payload, has_payload)
//!   └─ ReliableSender   retry until McInterface accepts (RetryPolicy)
//! initialize_routes     three RouterTable entries, run once at start-up
//! ```
//!
//! # Quick start
//!
//! ```
//! use spif_driver::{initialize_routes, FixedCore, ProtocolConfig, SoftwareFabric, SpifController};
//!
//! # fn main() -> spif_driver::Result<()> {
//! let mut fabric = SoftwareFabric::new(1);
//! let routes = initialize_routes(&mut fabric, &FixedCore(1), &ProtocolConfig::default())?;
//! assert_eq!(routes.entries.len(), 3);
//!
//! let mut spif = SpifController::new(&mut fabric)?;
//! spif.set_peripheral_key(0x0200_0000)?;
//! spif.set_mapper_field_shift(0, 1, -4)?;
//! spif.start_input()?;
//! assert_eq!(fabric.sent().len(), 3);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]

pub mod backends;
mod config;
mod controller;
mod encoder;
mod error;
pub mod fabric;
mod packet;
mod routes;
pub mod sender;

pub use backends::SoftwareFabric;
pub use config::{ClassKeys, KeyMask, LocalRegisters, ProtocolConfig, RegisterLayout};
pub use controller::SpifController;
pub use encoder::{ConfigOp, PacketEncoder};
pub use error::{IndexKind, Result, SpifError};
pub use fabric::{CoreIdentity, FixedCore, McInterface, RouterTable};
pub use packet::{ConfigPacket, RouteEntry};
pub use routes::{initialize_routes, route_entries, InstalledRoutes, ROUTE_ENTRIES};
pub use sender::{Backoff, Bounded, ReliableSender, Retry, RetryPolicy, Spin};

/// Commonly used types.
pub mod prelude {
    pub use crate::{
        initialize_routes, ConfigOp, ConfigPacket, McInterface, ProtocolConfig, Result,
        RouterTable, SoftwareFabric, SpifController, SpifError,
    };
    pub use spif_chip::regs::DiagCounter;
}
