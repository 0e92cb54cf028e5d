//! Event model and registration types.

use serde::{Deserialize, Serialize};

/// Points awarded for first attendance of an event.
pub const EVENT_ATTENDANCE_POINTS: i64 = 10;

/// Event lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Pending,
    Approved,
    Rejected,
    Completed,
    Cancelled,
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventStatus::Pending => "pending",
            EventStatus::Approved => "approved",
            EventStatus::Rejected => "rejected",
            EventStatus::Completed => "completed",
            EventStatus::Cancelled => "cancelled",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(EventStatus::Pending),
            "approved" => Some(EventStatus::Approved),
            "rejected" => Some(EventStatus::Rejected),
            "completed" => Some(EventStatus::Completed),
            "cancelled" => Some(EventStatus::Cancelled),
            _ => None,
        }
    }
}

/// One registration entry of an event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRegistration {
    pub user_id: String,
    pub registered_at: String,
}

/// A club event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    pub title: String,
    pub description: String,
    pub club_id: String,
    pub organizer: String,
    pub date: String,
    pub venue: String,
    pub budget: i64,
    /// Zero means unlimited capacity.
    pub max_participants: i64,
    pub status: EventStatus,
    pub registered_participants: Vec<EventRegistration>,
    pub updated_at: String,
}

/// Request body for creating an event directly (club leader path).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    pub title: String,
    pub description: String,
    pub club_id: String,
    pub organizer_id: String,
    pub date: String,
    pub venue: String,
    #[serde(default)]
    pub budget: i64,
    #[serde(default)]
    pub max_participants: i64,
}

/// Request body for registering a user for an event.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub user_id: String,
}

/// Query parameters for filtering the event list.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventFilter {
    #[serde(default)]
    pub status: Option<EventStatus>,
    #[serde(default)]
    pub club_id: Option<String>,
    #[serde(default)]
    pub upcoming: Option<bool>,
}
