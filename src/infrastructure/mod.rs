//! Reference implementations of the repository ports.

pub mod in_memory;
