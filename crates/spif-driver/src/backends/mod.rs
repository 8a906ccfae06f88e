//! Fabric implementations
//!
//! Hardware runtimes implement the [`fabric`](crate::fabric) traits over
//! their own send, router and identity calls. This crate ships:
//! - **Software**: in-memory fabric recording packets and router entries
//!   (dry runs, tests, CLI)

pub mod software;

pub use software::SoftwareFabric;
