//! Permission conversion errors
//!
//! - [`ConversionError`]: a conversion that could not produce a value
//! - [`ConversionWarning`]: input that was dropped while converting
//!
//! The cached converter turns every [`ConversionError`] into the
//! allow-nothing default, so callers of the public API never see one.

use serde::Serialize;
use thiserror::Error;

/// Fatal conversion failure
#[derive(Debug, Error)]
pub enum ConversionError {
    /// JSON did not match the canonical permission shape
    #[error("malformed permissions: {0}")]
    Malformed(#[from] serde_json::Error),

    /// Input shape the converter does not handle
    #[error("unexpected permission shape: {0}")]
    UnexpectedShape(&'static str),
}

/// Result type for base conversions
pub type ConversionResult<T> = Result<T, ConversionError>;

/// Non-fatal issue found while converting
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConversionWarning {
    /// Token or key names a module that does not exist
    UnknownModule { module: String },
    /// Module exists but has no such field
    UnknownField { module: String, field: String },
    /// Level token is not one of `none|self|dept|all`
    InvalidLevel { token: String },
    /// Wire entry has more than three dot-separated parts
    MalformedToken { token: String },
    /// Array entry is not a string
    NonStringEntry { index: usize },
    /// Field value has the wrong JSON type for the field kind
    TypeMismatch { module: String, field: String },
}
