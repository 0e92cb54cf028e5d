//! Event registration.
//!
//! Capacity-checked register/unregister for events, feeding the points
//! ledger: the first registration for an event awards the flat attendance
//! increment. Unregistering does not reverse points; the balance is a
//! one-way ratchet.

use sqlx::{Row, SqlitePool};

use crate::db::{bump_revision, fetch_event, fetch_user};
use crate::errors::AppError;
use crate::ledger::award_attendance;
use crate::models::Event;

#[derive(Clone)]
pub struct EventRegistrar {
    pool: SqlitePool,
}

impl EventRegistrar {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Register a user for an event.
    pub async fn register(&self, event_id: &str, user_id: &str) -> Result<Event, AppError> {
        let mut tx = self.pool.begin().await?;

        let event = fetch_event(&mut tx, event_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Event {} not found", event_id)))?;
        fetch_user(&mut tx, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))?;

        let listed = sqlx::query(
            "SELECT 1 AS present FROM event_registrations WHERE event_id = ? AND user_id = ?",
        )
        .bind(event_id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;
        if listed.is_some() {
            return Err(AppError::AlreadyRegistered(format!(
                "User {} is already registered for {}",
                user_id, event.title
            )));
        }

        if event.max_participants > 0 {
            let row = sqlx::query("SELECT COUNT(*) AS n FROM event_registrations WHERE event_id = ?")
                .bind(event_id)
                .fetch_one(&mut *tx)
                .await?;
            let count: i64 = row.get("n");
            if count >= event.max_participants {
                return Err(AppError::EventFull(format!(
                    "Event {} is full ({} participants)",
                    event.title, event.max_participants
                )));
            }
        }

        let now = chrono::Utc::now().to_rfc3339();
        sqlx::query(
            "INSERT INTO event_registrations (event_id, user_id, registered_at) VALUES (?, ?, ?)",
        )
        .bind(event_id)
        .bind(user_id)
        .bind(&now)
        .execute(&mut *tx)
        .await?;

        award_attendance(&mut tx, user_id, event_id).await?;

        bump_revision(&mut tx).await?;
        let event = fetch_event(&mut tx, event_id)
            .await?
            .ok_or_else(|| AppError::Internal("Event vanished".to_string()))?;
        tx.commit().await?;
        Ok(event)
    }

    /// Remove a user's registration. Previously awarded points stay.
    pub async fn unregister(&self, event_id: &str, user_id: &str) -> Result<Event, AppError> {
        let mut tx = self.pool.begin().await?;

        fetch_event(&mut tx, event_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Event {} not found", event_id)))?;

        let result = sqlx::query("DELETE FROM event_registrations WHERE event_id = ? AND user_id = ?")
            .bind(event_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotRegistered(format!(
                "User {} is not registered for event {}",
                user_id, event_id
            )));
        }

        bump_revision(&mut tx).await?;
        let event = fetch_event(&mut tx, event_id)
            .await?
            .ok_or_else(|| AppError::Internal("Event vanished".to_string()))?;
        tx.commit().await?;
        Ok(event)
    }
}
