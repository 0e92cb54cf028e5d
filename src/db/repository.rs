//! Entity store for User, Club, Event, Approval and Reward documents.
//!
//! Pool-level methods cover entity CRUD and filtered reads. The `pub(crate)`
//! connection-level helpers are shared with the engine modules so that
//! multi-document operations (coordinator, workflow, registrar) can compose
//! them inside a single transaction.

use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};

use crate::errors::AppError;
use crate::models::{
    Approval, ApprovalFilter, ApprovalPayload, ApprovalStatus, Club, ClubAffiliation, ClubMember,
    ClubRole, CreateClubRequest, CreateEventRequest, CreateRewardRequest, CreateUserRequest, Event,
    EventFilter, EventRegistration, EventStatus, Reward, SystemRole, UpdateClubRequest,
    UpdateUserRequest, User,
};

/// Database repository for all entity operations.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Get the current revision ID.
    pub async fn get_revision_id(&self) -> Result<i64, AppError> {
        let row = sqlx::query("SELECT revision_id FROM meta WHERE id = 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("revision_id"))
    }

    // ==================== USER OPERATIONS ====================

    /// List all users with their derived affiliation projections.
    pub async fn list_users(&self) -> Result<Vec<User>, AppError> {
        let mut conn = self.pool.acquire().await?;
        let rows = sqlx::query(
            "SELECT id, username, display_name, department, system_role, club_role, points, updated_at FROM users ORDER BY display_name"
        )
        .fetch_all(&mut *conn)
        .await?;

        let mut users = Vec::with_capacity(rows.len());
        for row in &rows {
            users.push(compose_user(&mut conn, row).await?);
        }
        Ok(users)
    }

    /// Get a user by ID.
    pub async fn get_user(&self, id: &str) -> Result<Option<User>, AppError> {
        let mut conn = self.pool.acquire().await?;
        fetch_user(&mut conn, id).await
    }

    /// Get a user by username.
    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let mut conn = self.pool.acquire().await?;
        fetch_user_by_username(&mut conn, username).await
    }

    /// Create a new user. The credential comes from the caller's issuer.
    pub async fn create_user(
        &self,
        request: &CreateUserRequest,
        credential: &str,
    ) -> Result<User, AppError> {
        let mut tx = self.pool.begin().await?;

        if fetch_user_by_username(&mut tx, &request.username)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(format!(
                "Username {} is already taken",
                request.username
            )));
        }

        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            "INSERT INTO users (id, username, display_name, department, system_role, club_role, points, credential, updated_at) VALUES (?, ?, ?, ?, ?, ?, 0, ?, ?)"
        )
        .bind(&id)
        .bind(&request.username)
        .bind(&request.display_name)
        .bind(&request.department)
        .bind(request.system_role.as_str())
        .bind(&request.club_role)
        .bind(credential)
        .bind(&now)
        .execute(&mut *tx)
        .await?;

        bump_revision(&mut tx).await?;
        let user = fetch_user(&mut tx, &id)
            .await?
            .ok_or_else(|| AppError::Internal("User vanished after insert".to_string()))?;
        tx.commit().await?;
        Ok(user)
    }

    /// Update a user's profile fields.
    ///
    /// A `points` value here is the administrative reset path, the only way a
    /// balance may decrease.
    pub async fn update_user(&self, id: &str, request: &UpdateUserRequest) -> Result<User, AppError> {
        let mut tx = self.pool.begin().await?;

        let existing = fetch_user(&mut tx, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", id)))?;

        if let Some(username) = &request.username {
            if username != &existing.username {
                if let Some(other) = fetch_user_by_username(&mut tx, username).await? {
                    if other.id != existing.id {
                        return Err(AppError::Conflict(format!(
                            "Username {} is already taken",
                            username
                        )));
                    }
                }
            }
        }

        let now = Utc::now().to_rfc3339();
        let display_name = request
            .display_name
            .as_ref()
            .unwrap_or(&existing.display_name);
        let username = request.username.as_ref().unwrap_or(&existing.username);
        let department = request.department.clone().or(existing.department.clone());
        let club_role = request.club_role.clone().or(existing.club_role.clone());
        let points = request.points.unwrap_or(existing.points).max(0);

        sqlx::query(
            "UPDATE users SET username = ?, display_name = ?, department = ?, club_role = ?, points = ?, updated_at = ? WHERE id = ?"
        )
        .bind(username)
        .bind(display_name)
        .bind(&department)
        .bind(&club_role)
        .bind(points)
        .bind(&now)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        bump_revision(&mut tx).await?;
        let user = fetch_user(&mut tx, id)
            .await?
            .ok_or_else(|| AppError::Internal("User vanished after update".to_string()))?;
        tx.commit().await?;
        Ok(user)
    }

    /// Delete a user, clearing every reference to them first.
    ///
    /// Roster rows, leader/faculty assignments, registrations, attendance and
    /// reward grants are removed in the same transaction so no club is left
    /// pointing at a missing user.
    pub async fn delete_user(&self, id: &str) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        let existing = sqlx::query("SELECT id FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        if existing.is_none() {
            return Err(AppError::NotFound(format!("User {} not found", id)));
        }

        sqlx::query("DELETE FROM memberships WHERE user_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("UPDATE clubs SET faculty_id = NULL WHERE faculty_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("UPDATE clubs SET leader_id = NULL WHERE leader_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM event_registrations WHERE user_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM attendance WHERE user_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM user_rewards WHERE user_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        bump_revision(&mut tx).await?;
        tx.commit().await?;
        Ok(())
    }

    // ==================== CLUB OPERATIONS ====================

    /// List all clubs with rosters and event indexes.
    pub async fn list_clubs(&self) -> Result<Vec<Club>, AppError> {
        let mut conn = self.pool.acquire().await?;
        let rows = sqlx::query(
            "SELECT id, name, description, category, faculty_id, leader_id, updated_at FROM clubs ORDER BY name"
        )
        .fetch_all(&mut *conn)
        .await?;

        let mut clubs = Vec::with_capacity(rows.len());
        for row in &rows {
            clubs.push(compose_club(&mut conn, row).await?);
        }
        Ok(clubs)
    }

    /// Get a club by ID.
    pub async fn get_club(&self, id: &str) -> Result<Option<Club>, AppError> {
        let mut conn = self.pool.acquire().await?;
        fetch_club(&mut conn, id).await
    }

    /// Create a new club. A faculty user reference is required at creation.
    pub async fn create_club(&self, request: &CreateClubRequest) -> Result<Club, AppError> {
        let mut tx = self.pool.begin().await?;

        let faculty = fetch_user(&mut tx, &request.faculty_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("User {} not found", request.faculty_id))
            })?;
        if faculty.system_role != SystemRole::Faculty {
            return Err(AppError::RoleMismatch(format!(
                "User {} is not faculty",
                faculty.username
            )));
        }

        let existing = sqlx::query("SELECT id FROM clubs WHERE name = ?")
            .bind(&request.name)
            .fetch_optional(&mut *tx)
            .await?;
        if existing.is_some() {
            return Err(AppError::Conflict(format!(
                "Club name {} already exists",
                request.name
            )));
        }

        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            "INSERT INTO clubs (id, name, description, category, faculty_id, leader_id, updated_at) VALUES (?, ?, ?, ?, ?, NULL, ?)"
        )
        .bind(&id)
        .bind(&request.name)
        .bind(&request.description)
        .bind(&request.category)
        .bind(&request.faculty_id)
        .bind(&now)
        .execute(&mut *tx)
        .await?;

        bump_revision(&mut tx).await?;
        let club = fetch_club(&mut tx, &id)
            .await?
            .ok_or_else(|| AppError::Internal("Club vanished after insert".to_string()))?;
        tx.commit().await?;
        Ok(club)
    }

    /// Update a club's descriptive fields.
    pub async fn update_club(&self, id: &str, request: &UpdateClubRequest) -> Result<Club, AppError> {
        let mut tx = self.pool.begin().await?;

        let existing = fetch_club(&mut tx, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Club {} not found", id)))?;

        if let Some(name) = &request.name {
            if name != &existing.name {
                let clash = sqlx::query("SELECT id FROM clubs WHERE name = ? AND id != ?")
                    .bind(name)
                    .bind(id)
                    .fetch_optional(&mut *tx)
                    .await?;
                if clash.is_some() {
                    return Err(AppError::Conflict(format!(
                        "Club name {} already exists",
                        name
                    )));
                }
            }
        }

        let now = Utc::now().to_rfc3339();
        let name = request.name.as_ref().unwrap_or(&existing.name);
        let description = request.description.as_ref().unwrap_or(&existing.description);
        let category = request.category.as_ref().unwrap_or(&existing.category);

        sqlx::query("UPDATE clubs SET name = ?, description = ?, category = ?, updated_at = ? WHERE id = ?")
            .bind(name)
            .bind(description)
            .bind(category)
            .bind(&now)
            .bind(id)
            .execute(&mut *tx)
            .await?;

        bump_revision(&mut tx).await?;
        let club = fetch_club(&mut tx, id)
            .await?
            .ok_or_else(|| AppError::Internal("Club vanished after update".to_string()))?;
        tx.commit().await?;
        Ok(club)
    }

    /// Delete a club by cascading clearance of all back-references.
    pub async fn delete_club(&self, id: &str) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        let existing = sqlx::query("SELECT id FROM clubs WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        if existing.is_none() {
            return Err(AppError::NotFound(format!("Club {} not found", id)));
        }

        sqlx::query(
            "DELETE FROM event_registrations WHERE event_id IN (SELECT id FROM events WHERE club_id = ?)"
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;
        sqlx::query(
            "DELETE FROM attendance WHERE event_id IN (SELECT id FROM events WHERE club_id = ?)",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;
        sqlx::query("DELETE FROM events WHERE club_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM memberships WHERE club_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM approvals WHERE club_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM clubs WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        bump_revision(&mut tx).await?;
        tx.commit().await?;
        Ok(())
    }

    // ==================== EVENT OPERATIONS ====================

    /// List events with optional status/club/upcoming filters.
    pub async fn list_events(&self, filter: &EventFilter) -> Result<Vec<Event>, AppError> {
        let mut qb = sqlx::QueryBuilder::new(
            "SELECT id, title, description, club_id, organizer_id, event_date, venue, budget, max_participants, status, updated_at FROM events WHERE 1=1"
        );
        if let Some(status) = &filter.status {
            qb.push(" AND status = ").push_bind(status.as_str());
        }
        if let Some(club_id) = &filter.club_id {
            qb.push(" AND club_id = ").push_bind(club_id.clone());
        }
        if filter.upcoming == Some(true) {
            qb.push(" AND event_date >= ").push_bind(Utc::now().to_rfc3339());
        }
        qb.push(" ORDER BY event_date");

        let rows = qb.build().fetch_all(&self.pool).await?;

        let mut conn = self.pool.acquire().await?;
        let mut events = Vec::with_capacity(rows.len());
        for row in &rows {
            events.push(compose_event(&mut conn, row).await?);
        }
        Ok(events)
    }

    /// Get an event by ID.
    pub async fn get_event(&self, id: &str) -> Result<Option<Event>, AppError> {
        let mut conn = self.pool.acquire().await?;
        fetch_event(&mut conn, id).await
    }

    /// Create an event directly (club leader path). Starts in `pending`.
    pub async fn create_event(&self, request: &CreateEventRequest) -> Result<Event, AppError> {
        let mut tx = self.pool.begin().await?;

        let club = fetch_club(&mut tx, &request.club_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Club {} not found", request.club_id)))?;
        fetch_user(&mut tx, &request.organizer_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("User {} not found", request.organizer_id))
            })?;

        let id = insert_event(
            &mut tx,
            &request.title,
            &request.description,
            &club.id,
            &request.organizer_id,
            &request.date,
            &request.venue,
            request.budget,
            request.max_participants,
            EventStatus::Pending,
        )
        .await?;

        bump_revision(&mut tx).await?;
        let event = fetch_event(&mut tx, &id)
            .await?
            .ok_or_else(|| AppError::Internal("Event vanished after insert".to_string()))?;
        tx.commit().await?;
        Ok(event)
    }

    // ==================== APPROVAL READS ====================

    /// List approvals with optional filters. Pure read, no state machine involvement.
    pub async fn list_approvals(&self, filter: &ApprovalFilter) -> Result<Vec<Approval>, AppError> {
        let mut qb = sqlx::QueryBuilder::new(
            "SELECT id, kind, status, club_id, requested_by, faculty_id, payload, approved_by, approved_at, rejection_reason, created_at FROM approvals WHERE 1=1"
        );
        if let Some(club_id) = &filter.club_id {
            qb.push(" AND club_id = ").push_bind(club_id.clone());
        }
        if let Some(faculty_id) = &filter.faculty_id {
            qb.push(" AND faculty_id = ").push_bind(faculty_id.clone());
        }
        if let Some(requested_by) = &filter.requested_by {
            qb.push(" AND requested_by = ").push_bind(requested_by.clone());
        }
        if let Some(status) = &filter.status {
            qb.push(" AND status = ").push_bind(status.as_str());
        }
        if let Some(kind) = &filter.kind {
            qb.push(" AND kind = ").push_bind(kind.clone());
        }
        qb.push(" ORDER BY created_at DESC");

        let rows = qb.build().fetch_all(&self.pool).await?;
        rows.iter().map(approval_from_row).collect()
    }

    /// Get an approval by ID.
    pub async fn get_approval(&self, id: &str) -> Result<Option<Approval>, AppError> {
        let mut conn = self.pool.acquire().await?;
        fetch_approval(&mut conn, id).await
    }

    // ==================== REWARD OPERATIONS ====================

    /// List the reward catalog.
    pub async fn list_rewards(&self) -> Result<Vec<Reward>, AppError> {
        let rows = sqlx::query(
            "SELECT id, name, icon, description, required_points, points, category FROM rewards ORDER BY required_points"
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(reward_from_row).collect())
    }

    /// Get a reward by ID.
    pub async fn get_reward(&self, id: &str) -> Result<Option<Reward>, AppError> {
        let mut conn = self.pool.acquire().await?;
        fetch_reward(&mut conn, id).await
    }

    /// Seed a catalog reward.
    pub async fn create_reward(&self, request: &CreateRewardRequest) -> Result<Reward, AppError> {
        let mut tx = self.pool.begin().await?;
        let id = uuid::Uuid::new_v4().to_string();

        sqlx::query(
            "INSERT INTO rewards (id, name, icon, description, required_points, points, category) VALUES (?, ?, ?, ?, ?, ?, ?)"
        )
        .bind(&id)
        .bind(&request.name)
        .bind(&request.icon)
        .bind(&request.description)
        .bind(request.required_points)
        .bind(request.points)
        .bind(&request.category)
        .execute(&mut *tx)
        .await?;

        bump_revision(&mut tx).await?;
        tx.commit().await?;

        Ok(Reward {
            id,
            name: request.name.clone(),
            icon: request.icon.clone(),
            description: request.description.clone(),
            required_points: request.required_points,
            points: request.points,
            category: request.category.clone(),
        })
    }
}

// ==================== CONNECTION-LEVEL HELPERS ====================

/// Increment the revision counter inside the caller's transaction.
pub(crate) async fn bump_revision(conn: &mut SqliteConnection) -> Result<i64, AppError> {
    let now = Utc::now().to_rfc3339();
    sqlx::query("UPDATE meta SET revision_id = revision_id + 1, generated_at = ? WHERE id = 1")
        .bind(&now)
        .execute(&mut *conn)
        .await?;
    let row = sqlx::query("SELECT revision_id FROM meta WHERE id = 1")
        .fetch_one(&mut *conn)
        .await?;
    Ok(row.get("revision_id"))
}

/// Fetch a user by ID with the derived affiliation projection.
pub(crate) async fn fetch_user(
    conn: &mut SqliteConnection,
    id: &str,
) -> Result<Option<User>, AppError> {
    let row = sqlx::query(
        "SELECT id, username, display_name, department, system_role, club_role, points, updated_at FROM users WHERE id = ?"
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    match row {
        Some(row) => Ok(Some(compose_user(conn, &row).await?)),
        None => Ok(None),
    }
}

/// Fetch a user by username.
pub(crate) async fn fetch_user_by_username(
    conn: &mut SqliteConnection,
    username: &str,
) -> Result<Option<User>, AppError> {
    let row = sqlx::query(
        "SELECT id, username, display_name, department, system_role, club_role, points, updated_at FROM users WHERE username = ?"
    )
    .bind(username)
    .fetch_optional(&mut *conn)
    .await?;

    match row {
        Some(row) => Ok(Some(compose_user(conn, &row).await?)),
        None => Ok(None),
    }
}

/// Build the full user view from a scalar row.
///
/// Affiliation is stored once (membership rows, club faculty/leader columns)
/// and projected here into the legacy dual shape: students get at most one
/// `primary_club`, faculty and leaders get the `clubs` list.
async fn compose_user(conn: &mut SqliteConnection, row: &SqliteRow) -> Result<User, AppError> {
    let id: String = row.get("id");
    let role_str: String = row.get("system_role");
    let system_role = SystemRole::from_str(&role_str).unwrap_or(SystemRole::Student);

    let membership_rows = sqlx::query(
        "SELECT club_id, role, joined_at FROM memberships WHERE user_id = ? ORDER BY joined_at",
    )
    .bind(&id)
    .fetch_all(&mut *conn)
    .await?;

    let mut affiliations: Vec<ClubAffiliation> = membership_rows
        .iter()
        .map(|r| ClubAffiliation {
            club_id: r.get("club_id"),
            role: r.get("role"),
            join_date: r.get("joined_at"),
        })
        .collect();

    if system_role.uses_multi_club() {
        let club_rows = sqlx::query(
            "SELECT id, faculty_id, leader_id, updated_at FROM clubs WHERE faculty_id = ? OR leader_id = ?"
        )
        .bind(&id)
        .bind(&id)
        .fetch_all(&mut *conn)
        .await?;

        for r in &club_rows {
            let faculty_id: Option<String> = r.get("faculty_id");
            let role = if faculty_id.as_deref() == Some(id.as_str()) {
                "faculty"
            } else {
                "leader"
            };
            affiliations.push(ClubAffiliation {
                club_id: r.get("id"),
                role: role.to_string(),
                join_date: r.get("updated_at"),
            });
        }
    }

    let (primary_club, clubs) = if system_role.uses_multi_club() {
        (None, affiliations)
    } else {
        (affiliations.first().map(|a| a.club_id.clone()), Vec::new())
    };

    let reward_rows = sqlx::query(
        "SELECT reward_id FROM user_rewards WHERE user_id = ? ORDER BY granted_at",
    )
    .bind(&id)
    .fetch_all(&mut *conn)
    .await?;
    let attendance_rows =
        sqlx::query("SELECT event_id FROM attendance WHERE user_id = ? ORDER BY awarded_at")
            .bind(&id)
            .fetch_all(&mut *conn)
            .await?;

    Ok(User {
        id,
        username: row.get("username"),
        display_name: row.get("display_name"),
        department: row.get("department"),
        system_role,
        club_role: row.get("club_role"),
        points: row.get("points"),
        primary_club,
        clubs,
        rewards: reward_rows.iter().map(|r| r.get("reward_id")).collect(),
        events_attended: attendance_rows.iter().map(|r| r.get("event_id")).collect(),
        updated_at: row.get("updated_at"),
    })
}

/// True if the user holds any club affiliation, by either representation.
pub(crate) async fn has_affiliation(
    conn: &mut SqliteConnection,
    user_id: &str,
) -> Result<bool, AppError> {
    let row = sqlx::query(
        r#"SELECT EXISTS(
               SELECT 1 FROM memberships WHERE user_id = ?1
               UNION ALL
               SELECT 1 FROM clubs WHERE faculty_id = ?1 OR leader_id = ?1
           ) AS affiliated"#,
    )
    .bind(user_id)
    .fetch_one(&mut *conn)
    .await?;
    let affiliated: i32 = row.get("affiliated");
    Ok(affiliated != 0)
}

/// Fetch a club by ID with roster and event index.
pub(crate) async fn fetch_club(
    conn: &mut SqliteConnection,
    id: &str,
) -> Result<Option<Club>, AppError> {
    let row = sqlx::query(
        "SELECT id, name, description, category, faculty_id, leader_id, updated_at FROM clubs WHERE id = ?"
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    match row {
        Some(row) => Ok(Some(compose_club(conn, &row).await?)),
        None => Ok(None),
    }
}

async fn compose_club(conn: &mut SqliteConnection, row: &SqliteRow) -> Result<Club, AppError> {
    let id: String = row.get("id");

    let member_rows = sqlx::query(
        "SELECT user_id, role, joined_at FROM memberships WHERE club_id = ? ORDER BY joined_at",
    )
    .bind(&id)
    .fetch_all(&mut *conn)
    .await?;

    let members = member_rows
        .iter()
        .map(|r| {
            let role_str: String = r.get("role");
            ClubMember {
                user_id: r.get("user_id"),
                role: ClubRole::from_str(&role_str).unwrap_or_default(),
                join_date: r.get("joined_at"),
            }
        })
        .collect();

    let event_rows = sqlx::query("SELECT id FROM events WHERE club_id = ? ORDER BY event_date")
        .bind(&id)
        .fetch_all(&mut *conn)
        .await?;

    Ok(Club {
        id,
        name: row.get("name"),
        description: row.get("description"),
        category: row.get("category"),
        faculty: row.get("faculty_id"),
        leader: row.get("leader_id"),
        members,
        events: event_rows.iter().map(|r| r.get("id")).collect(),
        updated_at: row.get("updated_at"),
    })
}

/// Fetch an event by ID with its registration list.
pub(crate) async fn fetch_event(
    conn: &mut SqliteConnection,
    id: &str,
) -> Result<Option<Event>, AppError> {
    let row = sqlx::query(
        "SELECT id, title, description, club_id, organizer_id, event_date, venue, budget, max_participants, status, updated_at FROM events WHERE id = ?"
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    match row {
        Some(row) => Ok(Some(compose_event(conn, &row).await?)),
        None => Ok(None),
    }
}

async fn compose_event(conn: &mut SqliteConnection, row: &SqliteRow) -> Result<Event, AppError> {
    let id: String = row.get("id");
    let status_str: String = row.get("status");

    let registration_rows = sqlx::query(
        "SELECT user_id, registered_at FROM event_registrations WHERE event_id = ? ORDER BY registered_at"
    )
    .bind(&id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(Event {
        id,
        title: row.get("title"),
        description: row.get("description"),
        club_id: row.get("club_id"),
        organizer: row.get("organizer_id"),
        date: row.get("event_date"),
        venue: row.get("venue"),
        budget: row.get("budget"),
        max_participants: row.get("max_participants"),
        status: EventStatus::from_str(&status_str).unwrap_or(EventStatus::Pending),
        registered_participants: registration_rows
            .iter()
            .map(|r| EventRegistration {
                user_id: r.get("user_id"),
                registered_at: r.get("registered_at"),
            })
            .collect(),
        updated_at: row.get("updated_at"),
    })
}

/// Insert an event row and return its generated ID.
#[allow(clippy::too_many_arguments)]
pub(crate) async fn insert_event(
    conn: &mut SqliteConnection,
    title: &str,
    description: &str,
    club_id: &str,
    organizer_id: &str,
    date: &str,
    venue: &str,
    budget: i64,
    max_participants: i64,
    status: EventStatus,
) -> Result<String, AppError> {
    let id = uuid::Uuid::new_v4().to_string();
    let now = Utc::now().to_rfc3339();

    sqlx::query(
        "INSERT INTO events (id, title, description, club_id, organizer_id, event_date, venue, budget, max_participants, status, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
    )
    .bind(&id)
    .bind(title)
    .bind(description)
    .bind(club_id)
    .bind(organizer_id)
    .bind(date)
    .bind(venue)
    .bind(budget)
    .bind(max_participants)
    .bind(status.as_str())
    .bind(&now)
    .execute(&mut *conn)
    .await?;

    Ok(id)
}

/// Fetch an approval by ID.
pub(crate) async fn fetch_approval(
    conn: &mut SqliteConnection,
    id: &str,
) -> Result<Option<Approval>, AppError> {
    let row = sqlx::query(
        "SELECT id, kind, status, club_id, requested_by, faculty_id, payload, approved_by, approved_at, rejection_reason, created_at FROM approvals WHERE id = ?"
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    row.as_ref().map(approval_from_row).transpose()
}

/// Fetch a reward by ID.
pub(crate) async fn fetch_reward(
    conn: &mut SqliteConnection,
    id: &str,
) -> Result<Option<Reward>, AppError> {
    let row = sqlx::query(
        "SELECT id, name, icon, description, required_points, points, category FROM rewards WHERE id = ?"
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(row.as_ref().map(reward_from_row))
}

// Helper functions for row conversion

pub(crate) fn approval_from_row(row: &SqliteRow) -> Result<Approval, AppError> {
    let status_str: String = row.get("status");
    let payload_json: String = row.get("payload");
    let payload: ApprovalPayload = serde_json::from_str(&payload_json).map_err(|e| {
        AppError::Internal(format!("Corrupt approval payload: {}", e))
    })?;

    Ok(Approval {
        id: row.get("id"),
        status: ApprovalStatus::from_str(&status_str).unwrap_or(ApprovalStatus::Pending),
        club_id: row.get("club_id"),
        requested_by: row.get("requested_by"),
        faculty: row.get("faculty_id"),
        payload,
        approved_by: row.get("approved_by"),
        approved_at: row.get("approved_at"),
        rejection_reason: row.get("rejection_reason"),
        created_at: row.get("created_at"),
    })
}

fn reward_from_row(row: &SqliteRow) -> Reward {
    Reward {
        id: row.get("id"),
        name: row.get("name"),
        icon: row.get("icon"),
        description: row.get("description"),
        required_points: row.get("required_points"),
        points: row.get("points"),
        category: row.get("category"),
    }
}
