//! Points and rewards ledger.
//!
//! Single authority for `User.points` changes and for the club-membership
//! floor invariant. Points never decrease here; every increment is
//! idempotent per (user, source) pair so retried requests cannot double
//! award. The connection-level functions are shared with the membership
//! coordinator and the event registrar so awards land inside the caller's
//! transaction.

use sqlx::{SqliteConnection, SqlitePool};

use crate::db::{
    bump_revision, fetch_event, fetch_reward, fetch_user, has_affiliation,
};
use crate::errors::AppError;
use crate::models::{Reward, User, EVENT_ATTENDANCE_POINTS, MEMBERSHIP_FLOOR_POINTS};

/// Ledger over the entity store.
#[derive(Clone)]
pub struct PointsLedger {
    pool: SqlitePool,
}

impl PointsLedger {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Raise the user to the membership floor if they hold any club
    /// affiliation and sit below it.
    pub async fn ensure_membership_floor(&self, user_id: &str) -> Result<User, AppError> {
        let mut tx = self.pool.begin().await?;

        fetch_user(&mut tx, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))?;

        let raised = apply_membership_floor(&mut tx, user_id).await?;
        if raised {
            bump_revision(&mut tx).await?;
        }

        let user = fetch_user(&mut tx, user_id)
            .await?
            .ok_or_else(|| AppError::Internal("User vanished".to_string()))?;
        tx.commit().await?;
        Ok(user)
    }

    /// Record event attendance and award the flat increment on first attendance.
    pub async fn award_event_attendance(
        &self,
        user_id: &str,
        event_id: &str,
    ) -> Result<User, AppError> {
        let mut tx = self.pool.begin().await?;

        fetch_user(&mut tx, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))?;
        fetch_event(&mut tx, event_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Event {} not found", event_id)))?;

        let awarded = award_attendance(&mut tx, user_id, event_id).await?;
        if awarded {
            bump_revision(&mut tx).await?;
        }

        let user = fetch_user(&mut tx, user_id)
            .await?
            .ok_or_else(|| AppError::Internal("User vanished".to_string()))?;
        tx.commit().await?;
        Ok(user)
    }

    /// Grant a reward, adding its point value on first grant only.
    pub async fn award_reward(&self, user_id: &str, reward_id: &str) -> Result<User, AppError> {
        let mut tx = self.pool.begin().await?;

        fetch_user(&mut tx, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))?;
        let reward = fetch_reward(&mut tx, reward_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Reward {} not found", reward_id)))?;

        let granted = grant_reward(&mut tx, user_id, &reward).await?;
        if granted {
            bump_revision(&mut tx).await?;
        }

        let user = fetch_user(&mut tx, user_id)
            .await?
            .ok_or_else(|| AppError::Internal("User vanished".to_string()))?;
        tx.commit().await?;
        Ok(user)
    }

    /// Claim a reward against the user's balance.
    ///
    /// A claim is a milestone badge, not a purchase: the threshold gates the
    /// claim but no points are deducted.
    pub async fn claim_reward(&self, user_id: &str, reward_id: &str) -> Result<User, AppError> {
        let mut tx = self.pool.begin().await?;

        let user = fetch_user(&mut tx, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))?;
        let reward = fetch_reward(&mut tx, reward_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Reward {} not found", reward_id)))?;

        if user.rewards.iter().any(|r| r == reward_id) {
            return Err(AppError::AlreadyClaimed(format!(
                "Reward {} already claimed",
                reward.name
            )));
        }
        if user.points < reward.required_points {
            return Err(AppError::InsufficientPoints(format!(
                "Reward {} requires {} points, balance is {}",
                reward.name, reward.required_points, user.points
            )));
        }

        grant_reward(&mut tx, user_id, &reward).await?;
        bump_revision(&mut tx).await?;

        let user = fetch_user(&mut tx, user_id)
            .await?
            .ok_or_else(|| AppError::Internal("User vanished".to_string()))?;
        tx.commit().await?;
        Ok(user)
    }

    /// Periodic repair pass: raise every affiliated user below the floor.
    /// Returns the number of users repaired.
    pub async fn repair_membership_floors(&self) -> Result<i64, AppError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"UPDATE users SET points = ?1
               WHERE points < ?1 AND (
                   EXISTS(SELECT 1 FROM memberships WHERE user_id = users.id)
                   OR EXISTS(SELECT 1 FROM clubs WHERE faculty_id = users.id OR leader_id = users.id)
               )"#,
        )
        .bind(MEMBERSHIP_FLOOR_POINTS)
        .execute(&mut *tx)
        .await?;

        let repaired = result.rows_affected() as i64;
        if repaired > 0 {
            bump_revision(&mut tx).await?;
        }
        tx.commit().await?;

        if repaired > 0 {
            tracing::info!(repaired, "membership floor repair pass applied");
        }
        Ok(repaired)
    }
}

/// Floor invariant, applied inside the caller's transaction.
/// Returns true if the balance was raised.
pub(crate) async fn apply_membership_floor(
    conn: &mut SqliteConnection,
    user_id: &str,
) -> Result<bool, AppError> {
    if !has_affiliation(conn, user_id).await? {
        return Ok(false);
    }

    let result = sqlx::query("UPDATE users SET points = ? WHERE id = ? AND points < ?")
        .bind(MEMBERSHIP_FLOOR_POINTS)
        .bind(user_id)
        .bind(MEMBERSHIP_FLOOR_POINTS)
        .execute(&mut *conn)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Attendance award, idempotent per (user, event).
/// Returns true if this call performed the first award.
pub(crate) async fn award_attendance(
    conn: &mut SqliteConnection,
    user_id: &str,
    event_id: &str,
) -> Result<bool, AppError> {
    let existing = sqlx::query("SELECT 1 AS present FROM attendance WHERE user_id = ? AND event_id = ?")
        .bind(user_id)
        .bind(event_id)
        .fetch_optional(&mut *conn)
        .await?;
    if existing.is_some() {
        return Ok(false);
    }

    let now = chrono::Utc::now().to_rfc3339();
    sqlx::query("INSERT INTO attendance (user_id, event_id, awarded_at) VALUES (?, ?, ?)")
        .bind(user_id)
        .bind(event_id)
        .bind(&now)
        .execute(&mut *conn)
        .await?;
    sqlx::query("UPDATE users SET points = points + ? WHERE id = ?")
        .bind(EVENT_ATTENDANCE_POINTS)
        .bind(user_id)
        .execute(&mut *conn)
        .await?;
    Ok(true)
}

/// Reward grant, idempotent per (user, reward).
/// Returns true if this call performed the first grant.
pub(crate) async fn grant_reward(
    conn: &mut SqliteConnection,
    user_id: &str,
    reward: &Reward,
) -> Result<bool, AppError> {
    let existing = sqlx::query("SELECT 1 AS present FROM user_rewards WHERE user_id = ? AND reward_id = ?")
        .bind(user_id)
        .bind(&reward.id)
        .fetch_optional(&mut *conn)
        .await?;
    if existing.is_some() {
        return Ok(false);
    }

    let now = chrono::Utc::now().to_rfc3339();
    sqlx::query("INSERT INTO user_rewards (user_id, reward_id, granted_at) VALUES (?, ?, ?)")
        .bind(user_id)
        .bind(&reward.id)
        .bind(&now)
        .execute(&mut *conn)
        .await?;
    sqlx::query("UPDATE users SET points = points + ? WHERE id = ?")
        .bind(reward.points)
        .bind(user_id)
        .execute(&mut *conn)
        .await?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{init_database, Repository};
    use crate::models::{
        CreateClubRequest, CreateEventRequest, CreateRewardRequest, CreateUserRequest, SystemRole,
        EVENT_ATTENDANCE_POINTS,
    };
    use tempfile::TempDir;

    async fn setup() -> (TempDir, Repository, PointsLedger) {
        let temp_dir = TempDir::new().expect("temp dir");
        let pool = init_database(&temp_dir.path().join("test.sqlite"))
            .await
            .expect("init db");
        (
            temp_dir,
            Repository::new(pool.clone()),
            PointsLedger::new(pool),
        )
    }

    fn student(username: &str) -> CreateUserRequest {
        CreateUserRequest {
            username: username.to_string(),
            display_name: username.to_string(),
            department: None,
            system_role: SystemRole::Student,
            club_role: None,
        }
    }

    #[tokio::test]
    async fn test_floor_not_applied_without_affiliation() {
        let (_tmp, repo, ledger) = setup().await;
        let user = repo.create_user(&student("loner"), "pw").await.unwrap();

        let user = ledger.ensure_membership_floor(&user.id).await.unwrap();
        assert_eq!(user.points, 0);
    }

    #[tokio::test]
    async fn test_claim_reward_checks_threshold_and_duplicates() {
        let (_tmp, repo, ledger) = setup().await;
        let user = repo.create_user(&student("claimer"), "pw").await.unwrap();
        let reward = repo
            .create_reward(&CreateRewardRequest {
                name: "Gold Badge".into(),
                icon: "medal".into(),
                description: "For 20 points".into(),
                required_points: 20,
                points: 5,
                category: "milestone".into(),
            })
            .await
            .unwrap();

        let err = ledger.claim_reward(&user.id, &reward.id).await.unwrap_err();
        assert_eq!(err.error_code(), "INSUFFICIENT_POINTS");

        // Raise the balance through the administrative path, then claim.
        repo.update_user(
            &user.id,
            &crate::models::UpdateUserRequest {
                display_name: None,
                username: None,
                department: None,
                club_role: None,
                points: Some(25),
            },
        )
        .await
        .unwrap();

        let user = ledger.claim_reward(&user.id, &reward.id).await.unwrap();
        assert_eq!(user.points, 30);
        assert_eq!(user.rewards, vec![reward.id.clone()]);

        let err = ledger.claim_reward(&user.id, &reward.id).await.unwrap_err();
        assert_eq!(err.error_code(), "ALREADY_CLAIMED");
    }

    #[tokio::test]
    async fn test_award_event_attendance_is_idempotent() {
        let (_tmp, repo, ledger) = setup().await;
        let faculty = repo
            .create_user(
                &CreateUserRequest {
                    username: "fac".into(),
                    display_name: "Fac".into(),
                    department: None,
                    system_role: SystemRole::Faculty,
                    club_role: None,
                },
                "pw",
            )
            .await
            .unwrap();
        let club = repo
            .create_club(&CreateClubRequest {
                name: "Astronomy".into(),
                description: "Stargazing".into(),
                category: "science".into(),
                faculty_id: faculty.id.clone(),
            })
            .await
            .unwrap();
        let event = repo
            .create_event(&CreateEventRequest {
                title: "Star Party".into(),
                description: "Telescope night".into(),
                club_id: club.id,
                organizer_id: faculty.id,
                date: "2027-04-01T20:00:00Z".into(),
                venue: "Rooftop".into(),
                budget: 0,
                max_participants: 0,
            })
            .await
            .unwrap();
        let user = repo.create_user(&student("goer"), "pw").await.unwrap();

        let first = ledger
            .award_event_attendance(&user.id, &event.id)
            .await
            .unwrap();
        let second = ledger
            .award_event_attendance(&user.id, &event.id)
            .await
            .unwrap();
        assert_eq!(first.points, EVENT_ATTENDANCE_POINTS);
        assert_eq!(second.points, EVENT_ATTENDANCE_POINTS);
        assert_eq!(second.events_attended, vec![event.id]);
    }

    #[tokio::test]
    async fn test_award_reward_is_idempotent() {
        let (_tmp, repo, ledger) = setup().await;
        let user = repo.create_user(&student("collector"), "pw").await.unwrap();
        let reward = repo
            .create_reward(&CreateRewardRequest {
                name: "Sticker".into(),
                icon: "star".into(),
                description: "Participation".into(),
                required_points: 0,
                points: 7,
                category: "misc".into(),
            })
            .await
            .unwrap();

        let first = ledger.award_reward(&user.id, &reward.id).await.unwrap();
        let second = ledger.award_reward(&user.id, &reward.id).await.unwrap();
        assert_eq!(first.points, 7);
        assert_eq!(second.points, 7);
        assert_eq!(second.rewards.len(), 1);
    }
}
