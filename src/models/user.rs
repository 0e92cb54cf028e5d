//! User model and the derived club-affiliation projection.

use serde::{Deserialize, Serialize};

/// Points floor for any user with at least one club affiliation.
pub const MEMBERSHIP_FLOOR_POINTS: i64 = 10;

/// Authorization-bearing role of a user. Single-valued, authoritative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SystemRole {
    Admin,
    Faculty,
    ClubLeader,
    Student,
}

impl SystemRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            SystemRole::Admin => "admin",
            SystemRole::Faculty => "faculty",
            SystemRole::ClubLeader => "clubLeader",
            SystemRole::Student => "student",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "admin" => Some(SystemRole::Admin),
            "faculty" => Some(SystemRole::Faculty),
            "clubLeader" => Some(SystemRole::ClubLeader),
            "student" => Some(SystemRole::Student),
            _ => None,
        }
    }

    /// Roles that use the multi-club affiliation model.
    pub fn uses_multi_club(&self) -> bool {
        matches!(self, SystemRole::Faculty | SystemRole::ClubLeader)
    }
}

/// One entry of a faculty/leader user's multi-club affiliation list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClubAffiliation {
    pub club_id: String,
    pub role: String,
    pub join_date: String,
}

/// A platform user.
///
/// `primary_club` and `clubs` are read projections derived from the single
/// membership table: students expose at most one `primary_club` and an empty
/// `clubs` list, faculty and club leaders expose `clubs` and a null
/// `primary_club`. Neither field is written directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub username: String,
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    pub system_role: SystemRole,
    /// Cosmetic title within a club (e.g. "secretary"), not authorization-bearing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub club_role: Option<String>,
    pub points: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_club: Option<String>,
    pub clubs: Vec<ClubAffiliation>,
    pub rewards: Vec<String>,
    pub events_attended: Vec<String>,
    pub updated_at: String,
}

/// Request body for creating a new user.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub username: String,
    pub display_name: String,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default = "default_system_role")]
    pub system_role: SystemRole,
    #[serde(default)]
    pub club_role: Option<String>,
}

fn default_system_role() -> SystemRole {
    SystemRole::Student
}

/// Request body for updating an existing user.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub club_role: Option<String>,
    /// Administrative point reset. The only path by which a balance may decrease.
    #[serde(default)]
    pub points: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_role_round_trip() {
        for role in [
            SystemRole::Admin,
            SystemRole::Faculty,
            SystemRole::ClubLeader,
            SystemRole::Student,
        ] {
            assert_eq!(SystemRole::from_str(role.as_str()), Some(role));
        }
        assert_eq!(SystemRole::from_str("janitor"), None);
    }

    #[test]
    fn test_multi_club_roles() {
        assert!(SystemRole::Faculty.uses_multi_club());
        assert!(SystemRole::ClubLeader.uses_multi_club());
        assert!(!SystemRole::Student.uses_multi_club());
        assert!(!SystemRole::Admin.uses_multi_club());
    }

    #[test]
    fn test_system_role_serde_casing() {
        let json = serde_json::to_string(&SystemRole::ClubLeader).unwrap();
        assert_eq!(json, "\"clubLeader\"");
    }
}
