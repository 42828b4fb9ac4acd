//! The fixed GitLab access-level enumeration.
//!
//! Levels are ordered by privilege and carry the numeric codes the
//! GitLab members API uses. The name↔code mapping is total: unknown
//! codes and unknown names resolve to [`AccessLevel::None`] instead of
//! erroring, so one odd membership record never fails a whole page.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AccessLevel {
    None,
    Minimal,
    Guest,
    Reporter,
    Developer,
    Maintainer,
    Owner,
    Admin,
}

/// The levels a grant can target, ascending privilege. `None` and
/// `Admin` are recognized on the wire but never offered as
/// entitlements.
pub const GRANTABLE_LEVELS: [AccessLevel; 6] = [
    AccessLevel::Minimal,
    AccessLevel::Guest,
    AccessLevel::Reporter,
    AccessLevel::Developer,
    AccessLevel::Maintainer,
    AccessLevel::Owner,
];

impl AccessLevel {
    /// The numeric code GitLab's members API uses for this level.
    #[must_use]
    pub fn code(self) -> u64 {
        match self {
            AccessLevel::None => 0,
            AccessLevel::Minimal => 5,
            AccessLevel::Guest => 10,
            AccessLevel::Reporter => 20,
            AccessLevel::Developer => 30,
            AccessLevel::Maintainer => 40,
            AccessLevel::Owner => 50,
            AccessLevel::Admin => 60,
        }
    }

    /// Resolve a remote numeric code. Unknown codes map to `None`.
    #[must_use]
    pub fn from_code(code: u64) -> Self {
        match code {
            5 => AccessLevel::Minimal,
            10 => AccessLevel::Guest,
            20 => AccessLevel::Reporter,
            30 => AccessLevel::Developer,
            40 => AccessLevel::Maintainer,
            50 => AccessLevel::Owner,
            60 => AccessLevel::Admin,
            _ => AccessLevel::None,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            AccessLevel::None => "None",
            AccessLevel::Minimal => "Minimal",
            AccessLevel::Guest => "Guest",
            AccessLevel::Reporter => "Reporter",
            AccessLevel::Developer => "Developer",
            AccessLevel::Maintainer => "Maintainer",
            AccessLevel::Owner => "Owner",
            AccessLevel::Admin => "Admin",
        }
    }

    /// Resolve a level by name. Unknown names map to `None`, matching
    /// the code-side fallback; the remote call then rejects the grant
    /// with its own error.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name {
            "Minimal" => AccessLevel::Minimal,
            "Guest" => AccessLevel::Guest,
            "Reporter" => AccessLevel::Reporter,
            "Developer" => AccessLevel::Developer,
            "Maintainer" => AccessLevel::Maintainer,
            "Owner" => AccessLevel::Owner,
            "Admin" => AccessLevel::Admin,
            _ => AccessLevel::None,
        }
    }
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [AccessLevel; 8] = [
        AccessLevel::None,
        AccessLevel::Minimal,
        AccessLevel::Guest,
        AccessLevel::Reporter,
        AccessLevel::Developer,
        AccessLevel::Maintainer,
        AccessLevel::Owner,
        AccessLevel::Admin,
    ];

    #[test]
    fn name_round_trips_for_every_level() {
        for level in ALL {
            assert_eq!(AccessLevel::from_name(level.as_str()), level);
        }
    }

    #[test]
    fn code_round_trips_for_every_level() {
        for level in ALL {
            assert_eq!(AccessLevel::from_code(level.code()), level);
        }
    }

    #[test]
    fn unknown_inputs_fall_back_to_none() {
        assert_eq!(AccessLevel::from_code(15), AccessLevel::None);
        assert_eq!(AccessLevel::from_code(999), AccessLevel::None);
        assert_eq!(AccessLevel::from_name("Superuser"), AccessLevel::None);
        assert_eq!(AccessLevel::from_name(""), AccessLevel::None);
        // Case matters: the wire names are capitalized.
        assert_eq!(AccessLevel::from_name("developer"), AccessLevel::None);
    }

    #[test]
    fn grantable_levels_ascend_and_exclude_none_and_admin() {
        assert_eq!(GRANTABLE_LEVELS.len(), 6);
        for pair in GRANTABLE_LEVELS.windows(2) {
            assert!(pair[0] < pair[1]);
            assert!(pair[0].code() < pair[1].code());
        }
        assert!(!GRANTABLE_LEVELS.contains(&AccessLevel::None));
        assert!(!GRANTABLE_LEVELS.contains(&AccessLevel::Admin));
    }

    #[test]
    fn developer_code_is_30() {
        assert_eq!(AccessLevel::Developer.code(), 30);
        assert_eq!(AccessLevel::from_code(30).as_str(), "Developer");
    }
}
