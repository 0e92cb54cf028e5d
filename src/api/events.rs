//! Event API endpoints.
//!
//! Registration routes go through the registrar so capacity checks and
//! attendance points happen in one transaction.

use axum::{
    extract::{Path, Query, State},
    Json,
};

use super::{error, success, ApiResult};
use crate::errors::AppError;
use crate::models::{CreateEventRequest, Event, EventFilter, RegisterRequest};
use crate::AppState;

/// GET /api/events - List events, optionally filtered.
pub async fn list_events(
    State(state): State<AppState>,
    Query(filter): Query<EventFilter>,
) -> ApiResult<Vec<Event>> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.list_events(&filter).await {
        Ok(events) => success(events, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// GET /api/events/:id - Get a single event.
pub async fn get_event(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Event> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.get_event(&id).await {
        Ok(Some(event)) => success(event, revision_id),
        Ok(None) => error(
            AppError::NotFound(format!("Event {} not found", id)),
            revision_id,
        ),
        Err(e) => error(e, revision_id),
    }
}

/// POST /api/events - Create an event directly (enters `pending`).
pub async fn create_event(
    State(state): State<AppState>,
    Json(request): Json<CreateEventRequest>,
) -> ApiResult<Event> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    if request.title.trim().is_empty() {
        return error(
            AppError::Validation("Event title is required".to_string()),
            revision_id,
        );
    }

    match state.repo.create_event(&request).await {
        Ok(event) => {
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success(event, new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}

/// POST /api/events/:id/register - Register a user for an event.
pub async fn register_for_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<RegisterRequest>,
) -> ApiResult<Event> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.registrar.register(&id, &request.user_id).await {
        Ok(event) => {
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success(event, new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}

/// DELETE /api/events/:id/register/:user_id - Remove a registration.
pub async fn unregister_from_event(
    State(state): State<AppState>,
    Path((id, user_id)): Path<(String, String)>,
) -> ApiResult<Event> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.registrar.unregister(&id, &user_id).await {
        Ok(event) => {
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success(event, new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}
