//! Data models
//!
//! Shared between the converters and the role client (via API).

pub mod role;

pub use role::*;
