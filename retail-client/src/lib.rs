//! Retail Client - HTTP client for the role service
//!
//! Role payloads are normalized on the way in and wire-encoded on the way
//! out, so callers only ever handle canonical [`Permissions`].

pub mod config;
pub mod error;
pub mod http;
pub mod roles;

pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use http::HttpClient;
pub use roles::RoleClient;

// Re-export shared types for convenience
pub use retail_shared::models::{Role, RoleCreate, RoleDto, RoleUpdate};
pub use retail_shared::{ApiResponse, PermissionConverter, Permissions};
