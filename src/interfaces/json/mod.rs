//! JSON boundary: command DTOs, validation into typed commands, response
//! projections and the line-oriented script reader used by the binary.

pub mod commands;
pub mod responses;
pub mod script;
pub mod time;
