//! Application layer containing the core business logic orchestration.
//!
//! This module defines the `DispatchEngine`, the single entry point for
//! assignment, reconciliation, completion and rating operations.

pub mod engine;
