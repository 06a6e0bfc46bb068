//! Authenticated roles.

use serde::{Deserialize, Serialize};

/// A role that can hold its own session token.
///
/// Administrator and doctor sessions are independent: both tokens may be
/// present at once, and each gates its own set of backend endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Clinic administrator.
    Admin,
    /// Doctor managing their own profile and appointments.
    Doctor,
}

impl Role {
    /// All roles, in display order.
    pub const ALL: [Self; 2] = [Self::Admin, Self::Doctor];

    /// Name of the request header that carries this role's token.
    ///
    /// The backend uses custom headers rather than a bearer scheme.
    #[must_use]
    pub const fn header_name(self) -> &'static str {
        match self {
            Self::Admin => "aToken",
            Self::Doctor => "dToken",
        }
    }

    /// Path segment of this role's API namespace (`/api/<scope>/...`).
    #[must_use]
    pub const fn api_scope(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Doctor => "doctor",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Admin => write!(f, "admin"),
            Self::Doctor => write!(f, "doctor"),
        }
    }
}

/// Error returned when a role name is not recognised.
#[derive(Debug, Clone, thiserror::Error)]
#[error("invalid role: {0} (expected admin or doctor)")]
pub struct RoleParseError(String);

impl std::str::FromStr for Role {
    type Err = RoleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "doctor" => Ok(Self::Doctor),
            _ => Err(RoleParseError(s.to_owned())),
        }
    }
}
