//! Reward catalog model.

use serde::{Deserialize, Serialize};

/// A catalog reward. Referenced, never mutated by the engine; claiming only
/// affects the user's reward set and point balance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reward {
    pub id: String,
    pub name: String,
    pub icon: String,
    pub description: String,
    /// Point balance required to claim.
    pub required_points: i64,
    /// Point value granted on first claim.
    pub points: i64,
    pub category: String,
}

/// Request body for seeding a catalog reward.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRewardRequest {
    pub name: String,
    pub icon: String,
    pub description: String,
    pub required_points: i64,
    pub points: i64,
    pub category: String,
}

/// Request body for claiming a reward.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimRequest {
    pub user_id: String,
}
