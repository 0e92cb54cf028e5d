//! Membership coordinator.
//!
//! The only code path permitted to mutate a club's roster, its faculty and
//! leader references, and (through the derived projection) a user's club
//! affiliation. Every operation runs inside one transaction so the two sides
//! of each relationship can never disagree; assignment operations are
//! idempotent on re-application, add/remove are one-shot transitions guarded
//! by existence checks.

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use sqlx::{Row, SqlitePool};

use crate::credentials::CredentialIssuer;
use crate::db::{bump_revision, fetch_club, fetch_user, fetch_user_by_username};
use crate::errors::AppError;
use crate::ledger::apply_membership_floor;
use crate::models::{
    AddMemberRequest, Club, ReconcileReport, SystemRole, UpdateRosterRequest,
};
use crate::notify::NotificationSink;

#[derive(Clone)]
pub struct MembershipCoordinator {
    pool: SqlitePool,
    credentials: Arc<dyn CredentialIssuer>,
    notifier: Arc<dyn NotificationSink>,
}

impl MembershipCoordinator {
    pub fn new(
        pool: SqlitePool,
        credentials: Arc<dyn CredentialIssuer>,
        notifier: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            pool,
            credentials,
            notifier,
        }
    }

    /// Assign a faculty coordinator to a club.
    ///
    /// Replaces any current coordinator of this club, and releases the user
    /// from any other club they coordinate, so the derived affiliation always
    /// points at exactly one club per edge.
    pub async fn assign_faculty(&self, club_id: &str, user_id: &str) -> Result<Club, AppError> {
        let mut tx = self.pool.begin().await?;

        fetch_club(&mut tx, club_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Club {} not found", club_id)))?;
        let user = fetch_user(&mut tx, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))?;
        if user.system_role != SystemRole::Faculty {
            return Err(AppError::RoleMismatch(format!(
                "User {} is not faculty",
                user.username
            )));
        }

        let now = Utc::now().to_rfc3339();
        sqlx::query("UPDATE clubs SET faculty_id = NULL, updated_at = ? WHERE faculty_id = ? AND id != ?")
            .bind(&now)
            .bind(user_id)
            .bind(club_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("UPDATE clubs SET faculty_id = ?, updated_at = ? WHERE id = ?")
            .bind(user_id)
            .bind(&now)
            .bind(club_id)
            .execute(&mut *tx)
            .await?;

        bump_revision(&mut tx).await?;
        let club = fetch_club(&mut tx, club_id)
            .await?
            .ok_or_else(|| AppError::Internal("Club vanished".to_string()))?;
        tx.commit().await?;
        Ok(club)
    }

    /// Assign a leader to a club. Symmetric to [`Self::assign_faculty`].
    pub async fn assign_leader(&self, club_id: &str, user_id: &str) -> Result<Club, AppError> {
        let mut tx = self.pool.begin().await?;

        fetch_club(&mut tx, club_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Club {} not found", club_id)))?;
        let user = fetch_user(&mut tx, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))?;
        if user.system_role != SystemRole::ClubLeader {
            return Err(AppError::RoleMismatch(format!(
                "User {} is not a club leader",
                user.username
            )));
        }

        let now = Utc::now().to_rfc3339();
        sqlx::query("UPDATE clubs SET leader_id = NULL, updated_at = ? WHERE leader_id = ? AND id != ?")
            .bind(&now)
            .bind(user_id)
            .bind(club_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("UPDATE clubs SET leader_id = ?, updated_at = ? WHERE id = ?")
            .bind(user_id)
            .bind(&now)
            .bind(club_id)
            .execute(&mut *tx)
            .await?;

        bump_revision(&mut tx).await?;
        let club = fetch_club(&mut tx, club_id)
            .await?
            .ok_or_else(|| AppError::Internal("Club vanished".to_string()))?;
        tx.commit().await?;
        Ok(club)
    }

    /// Clear a club's faculty reference. No-op if already unset.
    pub async fn remove_faculty(&self, club_id: &str) -> Result<Club, AppError> {
        self.clear_assignment(club_id, "faculty_id").await
    }

    /// Clear a club's leader reference. No-op if already unset.
    pub async fn remove_leader(&self, club_id: &str) -> Result<Club, AppError> {
        self.clear_assignment(club_id, "leader_id").await
    }

    async fn clear_assignment(&self, club_id: &str, column: &str) -> Result<Club, AppError> {
        let mut tx = self.pool.begin().await?;

        let club = fetch_club(&mut tx, club_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Club {} not found", club_id)))?;

        let currently_set = match column {
            "faculty_id" => club.faculty.is_some(),
            _ => club.leader.is_some(),
        };
        if currently_set {
            let now = Utc::now().to_rfc3339();
            // column name is one of two fixed identifiers, never user input
            let sql = format!("UPDATE clubs SET {} = NULL, updated_at = ? WHERE id = ?", column);
            sqlx::query(&sql)
                .bind(&now)
                .bind(club_id)
                .execute(&mut *tx)
                .await?;
            bump_revision(&mut tx).await?;
        }

        let club = fetch_club(&mut tx, club_id)
            .await?
            .ok_or_else(|| AppError::Internal("Club vanished".to_string()))?;
        tx.commit().await?;
        Ok(club)
    }

    /// Add a member to a club roster by username.
    ///
    /// A missing username provisions a new student account with a default
    /// credential from the issuer. The membership floor is applied in the
    /// same transaction.
    pub async fn add_member(&self, club_id: &str, request: &AddMemberRequest) -> Result<Club, AppError> {
        let mut tx = self.pool.begin().await?;

        let club = fetch_club(&mut tx, club_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Club {} not found", club_id)))?;

        let user_id = match fetch_user_by_username(&mut tx, &request.username).await? {
            Some(user) => {
                let listed = sqlx::query(
                    "SELECT 1 AS present FROM memberships WHERE club_id = ? AND user_id = ?",
                )
                .bind(club_id)
                .bind(&user.id)
                .fetch_optional(&mut *tx)
                .await?;
                if listed.is_some() {
                    return Err(AppError::AlreadyMember(format!(
                        "User {} is already a member of {}",
                        user.username, club.name
                    )));
                }
                user.id
            }
            None => {
                let id = uuid::Uuid::new_v4().to_string();
                let now = Utc::now().to_rfc3339();
                let display_name = request.name.as_deref().unwrap_or(&request.username);
                let credential = self.credentials.issue_default();

                sqlx::query(
                    "INSERT INTO users (id, username, display_name, department, system_role, club_role, points, credential, updated_at) VALUES (?, ?, ?, NULL, ?, NULL, 0, ?, ?)"
                )
                .bind(&id)
                .bind(&request.username)
                .bind(display_name)
                .bind(SystemRole::Student.as_str())
                .bind(&credential)
                .bind(&now)
                .execute(&mut *tx)
                .await?;
                id
            }
        };

        let now = Utc::now().to_rfc3339();
        let role = request.role.unwrap_or_default();
        sqlx::query(
            "INSERT INTO memberships (id, club_id, user_id, role, joined_at) VALUES (?, ?, ?, ?, ?)"
        )
        .bind(uuid::Uuid::new_v4().to_string())
        .bind(club_id)
        .bind(&user_id)
        .bind(role.as_str())
        .bind(&now)
        .execute(&mut *tx)
        .await?;

        apply_membership_floor(&mut tx, &user_id).await?;

        bump_revision(&mut tx).await?;
        let club = fetch_club(&mut tx, club_id)
            .await?
            .ok_or_else(|| AppError::Internal("Club vanished".to_string()))?;
        tx.commit().await?;

        self.notifier.publish(
            "club-updates",
            json!({
                "type": "member-added",
                "clubId": club.id,
                "clubName": club.name,
                "userId": user_id,
                "timestamp": Utc::now().to_rfc3339(),
            }),
        );

        Ok(club)
    }

    /// Remove a roster entry. The user's derived primary club clears with it.
    pub async fn remove_member(&self, club_id: &str, user_id: &str) -> Result<Club, AppError> {
        let mut tx = self.pool.begin().await?;

        fetch_club(&mut tx, club_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Club {} not found", club_id)))?;

        let result = sqlx::query("DELETE FROM memberships WHERE club_id = ? AND user_id = ?")
            .bind(club_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "User {} is not on the roster of club {}",
                user_id, club_id
            )));
        }

        bump_revision(&mut tx).await?;
        let club = fetch_club(&mut tx, club_id)
            .await?
            .ok_or_else(|| AppError::Internal("Club vanished".to_string()))?;
        tx.commit().await?;
        Ok(club)
    }

    /// Update a roster entry in place, optionally renaming the user.
    pub async fn update_member(
        &self,
        club_id: &str,
        user_id: &str,
        request: &UpdateRosterRequest,
    ) -> Result<Club, AppError> {
        let mut tx = self.pool.begin().await?;

        fetch_club(&mut tx, club_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Club {} not found", club_id)))?;

        let listed = sqlx::query("SELECT 1 AS present FROM memberships WHERE club_id = ? AND user_id = ?")
            .bind(club_id)
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?;
        if listed.is_none() {
            return Err(AppError::NotFound(format!(
                "User {} is not on the roster of club {}",
                user_id, club_id
            )));
        }

        if let Some(role) = request.role {
            sqlx::query("UPDATE memberships SET role = ? WHERE club_id = ? AND user_id = ?")
                .bind(role.as_str())
                .bind(club_id)
                .bind(user_id)
                .execute(&mut *tx)
                .await?;
        }

        if request.display_name.is_some() || request.username.is_some() {
            let user = fetch_user(&mut tx, user_id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))?;

            if let Some(username) = &request.username {
                if username != &user.username {
                    if let Some(other) = fetch_user_by_username(&mut tx, username).await? {
                        if other.id != user.id {
                            return Err(AppError::Conflict(format!(
                                "Username {} is already taken",
                                username
                            )));
                        }
                    }
                }
            }

            let now = Utc::now().to_rfc3339();
            let display_name = request.display_name.as_ref().unwrap_or(&user.display_name);
            let username = request.username.as_ref().unwrap_or(&user.username);
            sqlx::query("UPDATE users SET display_name = ?, username = ?, updated_at = ? WHERE id = ?")
                .bind(display_name)
                .bind(username)
                .bind(&now)
                .bind(user_id)
                .execute(&mut *tx)
                .await?;
        }

        bump_revision(&mut tx).await?;
        let club = fetch_club(&mut tx, club_id)
            .await?
            .ok_or_else(|| AppError::Internal("Club vanished".to_string()))?;
        tx.commit().await?;
        Ok(club)
    }

    /// Sweep a club roster for entries whose user no longer resolves.
    ///
    /// Deletions elsewhere in the system do not transactionally update
    /// rosters, so drift is expected; this is the designated repair tool.
    /// Idempotent, invokable on demand or on a schedule.
    pub async fn reconcile_orphans(&self, club_id: &str) -> Result<ReconcileReport, AppError> {
        let mut tx = self.pool.begin().await?;

        fetch_club(&mut tx, club_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Club {} not found", club_id)))?;

        let row = sqlx::query("SELECT COUNT(*) AS n FROM memberships WHERE club_id = ?")
            .bind(club_id)
            .fetch_one(&mut *tx)
            .await?;
        let scanned: i64 = row.get("n");

        let result = sqlx::query(
            "DELETE FROM memberships WHERE club_id = ? AND user_id NOT IN (SELECT id FROM users)",
        )
        .bind(club_id)
        .execute(&mut *tx)
        .await?;
        let removed = result.rows_affected() as i64;

        if removed > 0 {
            bump_revision(&mut tx).await?;
        }
        tx.commit().await?;

        if removed > 0 {
            tracing::info!(club_id, scanned, removed, "removed orphan roster entries");
        }
        Ok(ReconcileReport { scanned, removed })
    }
}
