//! Approval request model: a type-polymorphic request with a three-state lifecycle.

use serde::{Deserialize, Serialize};

/// Approval lifecycle status. Terminal once approved or rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
}

impl ApprovalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApprovalStatus::Pending => "pending",
            ApprovalStatus::Approved => "approved",
            ApprovalStatus::Rejected => "rejected",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(ApprovalStatus::Pending),
            "approved" => Some(ApprovalStatus::Approved),
            "rejected" => Some(ApprovalStatus::Rejected),
            _ => None,
        }
    }
}

/// Type-specific approval payload.
///
/// Modeled as a tagged union so the compiler enforces which fields are
/// required per approval type, instead of one record with many nullable
/// fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum ApprovalPayload {
    Event {
        title: String,
        description: String,
        date: String,
        venue: String,
        #[serde(default)]
        budget: i64,
    },
    Budget {
        amount: i64,
        purpose: String,
    },
    Leader {
        name: String,
    },
    Membership {
        name: String,
        username: String,
    },
}

impl ApprovalPayload {
    /// Discriminator string as stored and filtered on.
    pub fn kind(&self) -> &'static str {
        match self {
            ApprovalPayload::Event { .. } => "event",
            ApprovalPayload::Budget { .. } => "budget",
            ApprovalPayload::Leader { .. } => "leader",
            ApprovalPayload::Membership { .. } => "membership",
        }
    }
}

/// A pending or decided approval request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Approval {
    pub id: String,
    pub status: ApprovalStatus,
    pub club_id: String,
    pub requested_by: String,
    pub faculty: String,
    #[serde(flatten)]
    pub payload: ApprovalPayload,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approved_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approved_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    pub created_at: String,
}

/// Request body for submitting an approval.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitApprovalRequest {
    pub club_id: String,
    pub requested_by: String,
    #[serde(flatten)]
    pub payload: ApprovalPayload,
}

/// Terminal decision on a pending approval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Approved,
    Rejected,
}

/// Request body for deciding a pending approval.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionRequest {
    pub decision: Decision,
    pub actor_id: String,
    #[serde(default)]
    pub rejection_reason: Option<String>,
}

/// Query parameters for filtering the approval list.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalFilter {
    #[serde(default)]
    pub club_id: Option<String>,
    #[serde(default)]
    pub faculty_id: Option<String>,
    #[serde(default)]
    pub requested_by: Option<String>,
    #[serde(default)]
    pub status: Option<ApprovalStatus>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}
