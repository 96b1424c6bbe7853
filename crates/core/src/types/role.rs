//! User roles and role-based capability checks.

use serde::{Deserialize, Serialize};

/// Account role, snapshotted into sessions at login time.
///
/// A session carries the role its user had when it was created; a later role
/// change on the user does not retroactively change existing sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Regular shopper account.
    User,
    /// Shop owner; may manage their own shops, items, and inventory.
    Vendor,
    /// Regional data contributor.
    StateContributor,
    /// Marketplace administrator.
    Admin,
    /// Full-control administrator.
    SuperAdmin,
}

impl Role {
    /// Canonical wire/storage spelling of the role.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::User => "USER",
            Self::Vendor => "VENDOR",
            Self::StateContributor => "STATE_CONTRIBUTOR",
            Self::Admin => "ADMIN",
            Self::SuperAdmin => "SUPER_ADMIN",
        }
    }

    /// Whether this role carries administrative privileges.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self, Self::Admin | Self::SuperAdmin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    /// Case-insensitive role parsing; allow-list comparisons at the auth
    /// boundary go through this.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "USER" => Ok(Self::User),
            "VENDOR" => Ok(Self::Vendor),
            "STATE_CONTRIBUTOR" => Ok(Self::StateContributor),
            "ADMIN" => Ok(Self::Admin),
            "SUPER_ADMIN" => Ok(Self::SuperAdmin),
            _ => Err(format!("invalid role: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_case_insensitive() {
        assert_eq!("vendor".parse::<Role>().unwrap(), Role::Vendor);
        assert_eq!("Admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!("SUPER_ADMIN".parse::<Role>().unwrap(), Role::SuperAdmin);
        assert_eq!(
            "state_contributor".parse::<Role>().unwrap(),
            Role::StateContributor
        );
    }

    #[test]
    fn test_parse_invalid() {
        assert!("OWNER".parse::<Role>().is_err());
        assert!("".parse::<Role>().is_err());
    }

    #[test]
    fn test_round_trip() {
        for role in [
            Role::User,
            Role::Vendor,
            Role::StateContributor,
            Role::Admin,
            Role::SuperAdmin,
        ] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
    }

    #[test]
    fn test_is_admin() {
        assert!(Role::Admin.is_admin());
        assert!(Role::SuperAdmin.is_admin());
        assert!(!Role::Vendor.is_admin());
        assert!(!Role::User.is_admin());
    }

    #[test]
    fn test_serde_screaming_snake() {
        let json = serde_json::to_string(&Role::StateContributor).unwrap();
        assert_eq!(json, "\"STATE_CONTRIBUTOR\"");
    }
}
