//! Approval API endpoints.

use axum::{
    extract::{Path, Query, State},
    Json,
};

use super::{error, success, ApiResult};
use crate::errors::AppError;
use crate::models::{Approval, ApprovalFilter, DecisionRequest, SubmitApprovalRequest};
use crate::AppState;

/// GET /api/approvals - List approvals, optionally filtered.
pub async fn list_approvals(
    State(state): State<AppState>,
    Query(filter): Query<ApprovalFilter>,
) -> ApiResult<Vec<Approval>> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.list_approvals(&filter).await {
        Ok(approvals) => success(approvals, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// GET /api/approvals/:id - Get a single approval.
pub async fn get_approval(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Approval> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.get_approval(&id).await {
        Ok(Some(approval)) => success(approval, revision_id),
        Ok(None) => error(
            AppError::NotFound(format!("Approval {} not found", id)),
            revision_id,
        ),
        Err(e) => error(e, revision_id),
    }
}

/// POST /api/approvals - Submit a new approval request.
pub async fn submit_approval(
    State(state): State<AppState>,
    Json(request): Json<SubmitApprovalRequest>,
) -> ApiResult<Approval> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.workflow.submit(&request).await {
        Ok(approval) => {
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success(approval, new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}

/// POST /api/approvals/:id/decision - Approve or reject a pending request.
pub async fn decide_approval(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<DecisionRequest>,
) -> ApiResult<Approval> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.workflow.decide(&id, &request).await {
        Ok(approval) => {
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success(approval, new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}
