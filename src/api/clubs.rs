//! Club API endpoints.
//!
//! Roster and assignment routes delegate to the membership coordinator;
//! descriptive CRUD goes straight to the repository.

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use serde_json::json;

use super::{error, success, ApiResult};
use crate::errors::AppError;
use crate::models::{
    AddMemberRequest, AssignRequest, Club, CreateClubRequest, ReconcileReport, UpdateClubRequest,
    UpdateRosterRequest,
};
use crate::AppState;

/// GET /api/clubs - List all clubs.
pub async fn list_clubs(State(state): State<AppState>) -> ApiResult<Vec<Club>> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.list_clubs().await {
        Ok(clubs) => success(clubs, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// GET /api/clubs/:id - Get a single club.
pub async fn get_club(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Club> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.get_club(&id).await {
        Ok(Some(club)) => success(club, revision_id),
        Ok(None) => error(
            AppError::NotFound(format!("Club {} not found", id)),
            revision_id,
        ),
        Err(e) => error(e, revision_id),
    }
}

/// POST /api/clubs - Create a new club.
pub async fn create_club(
    State(state): State<AppState>,
    Json(request): Json<CreateClubRequest>,
) -> ApiResult<Club> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    if request.name.trim().is_empty() {
        return error(
            AppError::Validation("Club name is required".to_string()),
            revision_id,
        );
    }

    match state.repo.create_club(&request).await {
        Ok(club) => {
            state.notifier.publish(
                "club-updates",
                json!({
                    "type": "club-created",
                    "clubId": club.id,
                    "clubName": club.name,
                    "timestamp": Utc::now().to_rfc3339(),
                }),
            );
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success(club, new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}

/// PUT /api/clubs/:id - Update a club's descriptive fields.
pub async fn update_club(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateClubRequest>,
) -> ApiResult<Club> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.update_club(&id, &request).await {
        Ok(club) => {
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success(club, new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}

/// DELETE /api/clubs/:id - Delete a club with cascading clearance.
pub async fn delete_club(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<()> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.delete_club(&id).await {
        Ok(()) => {
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success((), new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}

/// PUT /api/clubs/:id/faculty - Assign a faculty coordinator.
pub async fn assign_faculty(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<AssignRequest>,
) -> ApiResult<Club> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.coordinator.assign_faculty(&id, &request.user_id).await {
        Ok(club) => {
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success(club, new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}

/// DELETE /api/clubs/:id/faculty - Clear the faculty coordinator.
pub async fn remove_faculty(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Club> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.coordinator.remove_faculty(&id).await {
        Ok(club) => {
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success(club, new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}

/// PUT /api/clubs/:id/leader - Assign a club leader.
pub async fn assign_leader(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<AssignRequest>,
) -> ApiResult<Club> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.coordinator.assign_leader(&id, &request.user_id).await {
        Ok(club) => {
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success(club, new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}

/// DELETE /api/clubs/:id/leader - Clear the club leader.
pub async fn remove_leader(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Club> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.coordinator.remove_leader(&id).await {
        Ok(club) => {
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success(club, new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}

/// POST /api/clubs/:id/members - Add a member to the roster.
pub async fn add_member(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<AddMemberRequest>,
) -> ApiResult<Club> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    if request.username.trim().is_empty() {
        return error(
            AppError::Validation("Username is required".to_string()),
            revision_id,
        );
    }

    match state.coordinator.add_member(&id, &request).await {
        Ok(club) => {
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success(club, new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}

/// PUT /api/clubs/:id/members/:user_id - Update a roster entry.
pub async fn update_member(
    State(state): State<AppState>,
    Path((id, user_id)): Path<(String, String)>,
    Json(request): Json<UpdateRosterRequest>,
) -> ApiResult<Club> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.coordinator.update_member(&id, &user_id, &request).await {
        Ok(club) => {
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success(club, new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}

/// DELETE /api/clubs/:id/members/:user_id - Remove a roster entry.
pub async fn remove_member(
    State(state): State<AppState>,
    Path((id, user_id)): Path<(String, String)>,
) -> ApiResult<Club> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.coordinator.remove_member(&id, &user_id).await {
        Ok(club) => {
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success(club, new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}

/// POST /api/clubs/:id/reconcile - Sweep orphan roster entries.
pub async fn reconcile_club(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<ReconcileReport> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.coordinator.reconcile_orphans(&id).await {
        Ok(report) => {
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success(report, new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}
