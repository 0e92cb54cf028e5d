//! User API endpoints.

use axum::{
    extract::{Path, State},
    Json,
};

use super::{error, success, ApiResult};
use crate::errors::AppError;
use crate::models::{CreateUserRequest, UpdateUserRequest, User};
use crate::AppState;

/// GET /api/users - List all users.
pub async fn list_users(State(state): State<AppState>) -> ApiResult<Vec<User>> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.list_users().await {
        Ok(users) => success(users, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// GET /api/users/:id - Get a single user.
pub async fn get_user(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<User> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.get_user(&id).await {
        Ok(Some(user)) => success(user, revision_id),
        Ok(None) => error(
            AppError::NotFound(format!("User {} not found", id)),
            revision_id,
        ),
        Err(e) => error(e, revision_id),
    }
}

/// POST /api/users - Create a new user.
pub async fn create_user(
    State(state): State<AppState>,
    Json(request): Json<CreateUserRequest>,
) -> ApiResult<User> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    if request.username.trim().is_empty() {
        return error(
            AppError::Validation("Username is required".to_string()),
            revision_id,
        );
    }
    if request.display_name.trim().is_empty() {
        return error(
            AppError::Validation("Display name is required".to_string()),
            revision_id,
        );
    }

    let credential = state.credentials.issue_default();
    match state.repo.create_user(&request, &credential).await {
        Ok(user) => {
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success(user, new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}

/// PUT /api/users/:id - Update a user.
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateUserRequest>,
) -> ApiResult<User> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.update_user(&id, &request).await {
        Ok(user) => {
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success(user, new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}

/// DELETE /api/users/:id - Delete a user, clearing all references first.
pub async fn delete_user(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<()> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.delete_user(&id).await {
        Ok(()) => {
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success((), new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}

/// POST /api/users/repair-points - Periodic repair pass for the membership floor.
pub async fn repair_points(State(state): State<AppState>) -> ApiResult<serde_json::Value> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.ledger.repair_membership_floors().await {
        Ok(repaired) => {
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success(serde_json::json!({ "repaired": repaired }), new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}
