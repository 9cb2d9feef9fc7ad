//! Access level lattice
//!
//! `None < SelfOnly < Department < All`. The string form (`none`, `self`,
//! `dept`, `all`) is the canonical runtime and wire representation; the
//! numeric form only exists to migrate data written by older clients.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Graded access for a permission field
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum AccessLevel {
    /// No access
    #[default]
    #[serde(rename = "none")]
    None,
    /// Own records only
    #[serde(rename = "self")]
    SelfOnly,
    /// Records of the user's department
    #[serde(rename = "dept", alias = "department")]
    Department,
    /// Everything
    #[serde(rename = "all")]
    All,
}

impl AccessLevel {
    /// All levels in ascending order
    pub const ALL_LEVELS: [AccessLevel; 4] = [
        AccessLevel::None,
        AccessLevel::SelfOnly,
        AccessLevel::Department,
        AccessLevel::All,
    ];

    /// Wire token for this level
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::SelfOnly => "self",
            Self::Department => "dept",
            Self::All => "all",
        }
    }

    /// True when this level grants at least `required`
    pub fn satisfies(&self, required: AccessLevel) -> bool {
        *self >= required
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognized level token
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown access level: {0}")]
pub struct InvalidAccessLevel(pub String);

impl FromStr for AccessLevel {
    type Err = InvalidAccessLevel;

    /// Parses the four wire tokens exactly as [`AccessLevel::as_str`] writes them
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Self::None),
            "self" => Ok(Self::SelfOnly),
            "dept" => Ok(Self::Department),
            "all" => Ok(Self::All),
            other => Err(InvalidAccessLevel(other.to_string())),
        }
    }
}

/// Map a legacy numeric access code to a level
///
/// | code | level |
/// |------|-------|
/// | 0 | None |
/// | 1, 2, 3 | SelfOnly |
/// | 5 | Department |
/// | 4, 6, anything else | All |
///
/// Unknown codes grant `All`. This is the opposite of the deny-by-default
/// rule used everywhere else and is kept for compatibility with stored data.
pub fn convert_numeric_access_level(code: i64) -> AccessLevel {
    match code {
        0 => AccessLevel::None,
        1..=3 => AccessLevel::SelfOnly,
        5 => AccessLevel::Department,
        _ => AccessLevel::All,
    }
}

/// Map a level back to its legacy numeric code
///
/// Lossy with respect to [`convert_numeric_access_level`]: codes 1, 2 and 3
/// all come back as 6.
pub fn convert_string_access_level(level: AccessLevel) -> u8 {
    match level {
        AccessLevel::None => 0,
        AccessLevel::SelfOnly => 6,
        AccessLevel::Department => 5,
        AccessLevel::All => 4,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_order() {
        assert!(AccessLevel::None < AccessLevel::SelfOnly);
        assert!(AccessLevel::SelfOnly < AccessLevel::Department);
        assert!(AccessLevel::Department < AccessLevel::All);
        assert_eq!(AccessLevel::default(), AccessLevel::None);
    }

    #[test]
    fn test_satisfies() {
        assert!(AccessLevel::All.satisfies(AccessLevel::SelfOnly));
        assert!(AccessLevel::Department.satisfies(AccessLevel::Department));
        assert!(!AccessLevel::SelfOnly.satisfies(AccessLevel::Department));
        assert!(AccessLevel::None.satisfies(AccessLevel::None));
    }

    #[test]
    fn test_wire_tokens() {
        for level in AccessLevel::ALL_LEVELS {
            assert_eq!(level.as_str().parse::<AccessLevel>(), Ok(level));
        }
        assert!("ALL".parse::<AccessLevel>().is_err());
        assert!("department".parse::<AccessLevel>().is_err());
    }

    #[test]
    fn test_serde_representation() {
        let json = serde_json::to_string(&AccessLevel::Department).unwrap();
        assert_eq!(json, "\"dept\"");
        let level: AccessLevel = serde_json::from_str("\"self\"").unwrap();
        assert_eq!(level, AccessLevel::SelfOnly);
        let level: AccessLevel = serde_json::from_str("\"department\"").unwrap();
        assert_eq!(level, AccessLevel::Department);
    }

    #[test]
    fn test_numeric_bridge() {
        assert_eq!(convert_numeric_access_level(0), AccessLevel::None);
        assert_eq!(convert_numeric_access_level(1), AccessLevel::SelfOnly);
        assert_eq!(convert_numeric_access_level(2), AccessLevel::SelfOnly);
        assert_eq!(convert_numeric_access_level(3), AccessLevel::SelfOnly);
        assert_eq!(convert_numeric_access_level(4), AccessLevel::All);
        assert_eq!(convert_numeric_access_level(5), AccessLevel::Department);
        assert_eq!(convert_numeric_access_level(6), AccessLevel::All);
    }

    #[test]
    fn test_numeric_out_of_range_is_permissive() {
        // Unknown legacy codes grant full access, unlike every other fallback.
        assert_eq!(convert_numeric_access_level(99), AccessLevel::All);
        assert_eq!(convert_numeric_access_level(-1), AccessLevel::All);
    }

    #[test]
    fn test_numeric_bridge_is_lossy() {
        let back = convert_string_access_level(convert_numeric_access_level(2));
        assert_eq!(back, 6);
        assert_eq!(convert_string_access_level(AccessLevel::None), 0);
        assert_eq!(convert_string_access_level(AccessLevel::Department), 5);
        assert_eq!(convert_string_access_level(AccessLevel::All), 4);
    }
}
