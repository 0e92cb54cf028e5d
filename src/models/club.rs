//! Club model and roster types.

use serde::{Deserialize, Serialize};

/// Club-specific roster title. Cosmetic within the roster, distinct from
/// the user's authorization-bearing system role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClubRole {
    President,
    VicePresident,
    Secretary,
    Treasurer,
    Member,
}

impl ClubRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClubRole::President => "president",
            ClubRole::VicePresident => "vice-president",
            ClubRole::Secretary => "secretary",
            ClubRole::Treasurer => "treasurer",
            ClubRole::Member => "member",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "president" => Some(ClubRole::President),
            "vice-president" => Some(ClubRole::VicePresident),
            "secretary" => Some(ClubRole::Secretary),
            "treasurer" => Some(ClubRole::Treasurer),
            "member" => Some(ClubRole::Member),
            _ => None,
        }
    }
}

impl Default for ClubRole {
    fn default() -> Self {
        ClubRole::Member
    }
}

/// One roster entry of a club.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClubMember {
    pub user_id: String,
    pub role: ClubRole,
    pub join_date: String,
}

/// A club with its roster and denormalized event index.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Club {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: String,
    /// At most one faculty coordinator (systemRole must be faculty).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub faculty: Option<String>,
    /// At most one club leader (systemRole must be clubLeader).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leader: Option<String>,
    pub members: Vec<ClubMember>,
    pub events: Vec<String>,
    pub updated_at: String,
}

/// Request body for creating a club. A faculty reference is required at creation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateClubRequest {
    pub name: String,
    pub description: String,
    pub category: String,
    pub faculty_id: String,
}

/// Request body for updating a club's descriptive fields.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateClubRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

/// Request body for assigning a faculty coordinator or leader.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignRequest {
    pub user_id: String,
}

/// Request body for adding a member to a club roster.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddMemberRequest {
    pub username: String,
    #[serde(default)]
    pub role: Option<ClubRole>,
    /// Display name used when the username does not exist yet and a new
    /// student account is provisioned.
    #[serde(default)]
    pub name: Option<String>,
}

/// Request body for updating a roster entry in place.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRosterRequest {
    #[serde(default)]
    pub role: Option<ClubRole>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
}

/// Result of an orphan-reference sweep over a club roster.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileReport {
    pub scanned: i64,
    pub removed: i64,
}
