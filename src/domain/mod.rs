//! Domain layer: pure aggregates, value objects and the repository ports.
//!
//! Everything here is synchronous, in-memory computation; persistence and
//! transport concerns live behind the traits in [`ports`].

pub mod courier;
pub mod interval;
pub mod order;
pub mod ports;
