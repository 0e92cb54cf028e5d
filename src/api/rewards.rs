//! Reward API endpoints.

use axum::{
    extract::{Path, State},
    Json,
};

use super::{error, success, ApiResult};
use crate::errors::AppError;
use crate::models::{ClaimRequest, CreateRewardRequest, Reward, User};
use crate::AppState;

/// GET /api/rewards - List the reward catalog.
pub async fn list_rewards(State(state): State<AppState>) -> ApiResult<Vec<Reward>> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.list_rewards().await {
        Ok(rewards) => success(rewards, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// POST /api/rewards - Add a reward to the catalog.
pub async fn create_reward(
    State(state): State<AppState>,
    Json(request): Json<CreateRewardRequest>,
) -> ApiResult<Reward> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    if request.name.trim().is_empty() {
        return error(
            AppError::Validation("Reward name is required".to_string()),
            revision_id,
        );
    }
    if request.required_points < 0 {
        return error(
            AppError::Validation("Required points must not be negative".to_string()),
            revision_id,
        );
    }

    match state.repo.create_reward(&request).await {
        Ok(reward) => {
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success(reward, new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}

/// POST /api/rewards/:id/claim - Claim a reward against the user's balance.
pub async fn claim_reward(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<ClaimRequest>,
) -> ApiResult<User> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.ledger.claim_reward(&request.user_id, &id).await {
        Ok(user) => {
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success(user, new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}
