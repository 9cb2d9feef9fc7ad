//! Shared types for the retail back office
//!
//! Role permission model and converters, role DTOs and the API response
//! envelope used by the role client.

pub mod error;
pub mod models;
pub mod permission;
pub mod response;

// Re-exports
pub use error::{ConversionError, ConversionResult, ConversionWarning};
pub use permission::{AccessLevel, ModuleKey, PermissionConverter, Permissions};
pub use response::ApiResponse;
pub use serde::{Deserialize, Serialize};
