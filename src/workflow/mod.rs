//! Approval workflow.
//!
//! A pending approval transitions exactly once to approved or rejected and is
//! never resurrected. Approving an event-type request materializes the Event
//! in the same transaction as the status flip; budget, leader and membership
//! approvals record the decision only.

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use sqlx::SqlitePool;

use crate::db::{bump_revision, fetch_approval, fetch_club, fetch_user, insert_event};
use crate::errors::AppError;
use crate::models::{
    Approval, ApprovalPayload, ApprovalStatus, Decision, DecisionRequest, EventStatus,
    SubmitApprovalRequest, SystemRole,
};
use crate::notify::NotificationSink;

#[derive(Clone)]
pub struct ApprovalWorkflow {
    pool: SqlitePool,
    notifier: Arc<dyn NotificationSink>,
}

impl ApprovalWorkflow {
    pub fn new(pool: SqlitePool, notifier: Arc<dyn NotificationSink>) -> Self {
        Self { pool, notifier }
    }

    /// Submit a new approval request in `pending`.
    ///
    /// The deciding faculty is resolved from the club's current faculty
    /// reference at submission time.
    pub async fn submit(&self, request: &SubmitApprovalRequest) -> Result<Approval, AppError> {
        let mut tx = self.pool.begin().await?;

        let club = fetch_club(&mut tx, &request.club_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Club {} not found", request.club_id)))?;
        fetch_user(&mut tx, &request.requested_by)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("User {} not found", request.requested_by))
            })?;
        let faculty_id = club.faculty.clone().ok_or_else(|| {
            AppError::Validation(format!("Club {} has no faculty coordinator", club.name))
        })?;

        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();
        let payload_json = serde_json::to_string(&request.payload)?;

        sqlx::query(
            "INSERT INTO approvals (id, kind, status, club_id, requested_by, faculty_id, payload, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?)"
        )
        .bind(&id)
        .bind(request.payload.kind())
        .bind(ApprovalStatus::Pending.as_str())
        .bind(&request.club_id)
        .bind(&request.requested_by)
        .bind(&faculty_id)
        .bind(&payload_json)
        .bind(&now)
        .execute(&mut *tx)
        .await?;

        bump_revision(&mut tx).await?;
        let approval = fetch_approval(&mut tx, &id)
            .await?
            .ok_or_else(|| AppError::Internal("Approval vanished after insert".to_string()))?;
        tx.commit().await?;
        Ok(approval)
    }

    /// Decide a pending approval. Fails with `InvalidState` once terminal.
    pub async fn decide(&self, id: &str, request: &DecisionRequest) -> Result<Approval, AppError> {
        let mut tx = self.pool.begin().await?;

        let approval = fetch_approval(&mut tx, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Approval {} not found", id)))?;
        if approval.status != ApprovalStatus::Pending {
            return Err(AppError::InvalidState(format!(
                "Approval {} is already {}",
                id,
                approval.status.as_str()
            )));
        }

        let actor = fetch_user(&mut tx, &request.actor_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", request.actor_id)))?;
        if !matches!(actor.system_role, SystemRole::Faculty | SystemRole::Admin) {
            return Err(AppError::RoleMismatch(format!(
                "User {} cannot decide approvals",
                actor.username
            )));
        }

        let now = Utc::now().to_rfc3339();
        let mut spawned_event_id: Option<String> = None;

        match request.decision {
            Decision::Approved => {
                sqlx::query(
                    "UPDATE approvals SET status = ?, approved_by = ?, approved_at = ? WHERE id = ?",
                )
                .bind(ApprovalStatus::Approved.as_str())
                .bind(&request.actor_id)
                .bind(&now)
                .bind(id)
                .execute(&mut *tx)
                .await?;

                // The one case where a decision materializes a new entity.
                if let ApprovalPayload::Event {
                    title,
                    description,
                    date,
                    venue,
                    budget,
                } = &approval.payload
                {
                    let event_id = insert_event(
                        &mut tx,
                        title,
                        description,
                        &approval.club_id,
                        &approval.requested_by,
                        date,
                        venue,
                        *budget,
                        0,
                        EventStatus::Approved,
                    )
                    .await?;
                    spawned_event_id = Some(event_id);
                }
            }
            Decision::Rejected => {
                sqlx::query("UPDATE approvals SET status = ?, rejection_reason = ? WHERE id = ?")
                    .bind(ApprovalStatus::Rejected.as_str())
                    .bind(&request.rejection_reason)
                    .bind(id)
                    .execute(&mut *tx)
                    .await?;
            }
        }

        bump_revision(&mut tx).await?;
        let approval = fetch_approval(&mut tx, id)
            .await?
            .ok_or_else(|| AppError::Internal("Approval vanished".to_string()))?;
        tx.commit().await?;

        if let Some(event_id) = spawned_event_id {
            self.notifier.publish(
                "event-updates",
                json!({
                    "type": "event-approved",
                    "eventId": event_id,
                    "clubId": approval.club_id,
                    "approvedBy": request.actor_id,
                    "timestamp": Utc::now().to_rfc3339(),
                }),
            );
        }

        Ok(approval)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{init_database, Repository};
    use crate::models::{CreateClubRequest, CreateUserRequest, EventFilter};
    use crate::notify::TracingSink;
    use tempfile::TempDir;

    struct Fixture {
        _temp_dir: TempDir,
        repo: Repository,
        workflow: ApprovalWorkflow,
        club_id: String,
        faculty_id: String,
        leader_id: String,
    }

    async fn setup() -> Fixture {
        let temp_dir = TempDir::new().expect("temp dir");
        let pool = init_database(&temp_dir.path().join("test.sqlite"))
            .await
            .expect("init db");
        let repo = Repository::new(pool.clone());
        let workflow = ApprovalWorkflow::new(pool, Arc::new(TracingSink));

        let faculty = repo
            .create_user(
                &CreateUserRequest {
                    username: "prof".into(),
                    display_name: "Prof".into(),
                    department: None,
                    system_role: SystemRole::Faculty,
                    club_role: None,
                },
                "pw",
            )
            .await
            .unwrap();
        let leader = repo
            .create_user(
                &CreateUserRequest {
                    username: "lead".into(),
                    display_name: "Lead".into(),
                    department: None,
                    system_role: SystemRole::ClubLeader,
                    club_role: None,
                },
                "pw",
            )
            .await
            .unwrap();
        let club = repo
            .create_club(&CreateClubRequest {
                name: "Makers".into(),
                description: "Makerspace".into(),
                category: "tech".into(),
                faculty_id: faculty.id.clone(),
            })
            .await
            .unwrap();

        Fixture {
            _temp_dir: temp_dir,
            repo,
            workflow,
            club_id: club.id,
            faculty_id: faculty.id,
            leader_id: leader.id,
        }
    }

    fn event_payload() -> ApprovalPayload {
        ApprovalPayload::Event {
            title: "Hack Night".into(),
            description: "Overnight hackathon".into(),
            date: "2027-03-01T18:00:00Z".into(),
            venue: "Lab 3".into(),
            budget: 500,
        }
    }

    #[tokio::test]
    async fn test_submit_resolves_faculty_from_club() {
        let fx = setup().await;

        let approval = fx
            .workflow
            .submit(&SubmitApprovalRequest {
                club_id: fx.club_id.clone(),
                requested_by: fx.leader_id.clone(),
                payload: event_payload(),
            })
            .await
            .unwrap();

        assert_eq!(approval.status, ApprovalStatus::Pending);
        assert_eq!(approval.faculty, fx.faculty_id);
        assert_eq!(approval.payload.kind(), "event");
    }

    #[tokio::test]
    async fn test_approving_event_request_spawns_event() {
        let fx = setup().await;
        let approval = fx
            .workflow
            .submit(&SubmitApprovalRequest {
                club_id: fx.club_id.clone(),
                requested_by: fx.leader_id.clone(),
                payload: event_payload(),
            })
            .await
            .unwrap();

        let approval = fx
            .workflow
            .decide(
                &approval.id,
                &DecisionRequest {
                    decision: Decision::Approved,
                    actor_id: fx.faculty_id.clone(),
                    rejection_reason: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(approval.status, ApprovalStatus::Approved);
        assert_eq!(approval.approved_by.as_deref(), Some(fx.faculty_id.as_str()));
        assert!(approval.approved_at.is_some());

        let events = fx.repo.list_events(&EventFilter::default()).await.unwrap();
        assert_eq!(events.len(), 1);
        let event = &events[0];
        assert_eq!(event.status, EventStatus::Approved);
        assert_eq!(event.organizer, fx.leader_id);
        assert_eq!(event.title, "Hack Night");

        let club = fx.repo.get_club(&fx.club_id).await.unwrap().unwrap();
        assert!(club.events.contains(&event.id));
    }

    #[tokio::test]
    async fn test_approved_event_publishes_notification() {
        let fx = setup().await;
        let sink = Arc::new(crate::notify::testing::RecordingSink::default());
        let workflow = ApprovalWorkflow::new(fx.repo.pool().clone(), sink.clone());

        let approval = workflow
            .submit(&SubmitApprovalRequest {
                club_id: fx.club_id.clone(),
                requested_by: fx.leader_id.clone(),
                payload: event_payload(),
            })
            .await
            .unwrap();
        workflow
            .decide(
                &approval.id,
                &DecisionRequest {
                    decision: Decision::Approved,
                    actor_id: fx.faculty_id.clone(),
                    rejection_reason: None,
                },
            )
            .await
            .unwrap();

        let messages = sink.messages.lock().unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].0, "event-updates");
        assert_eq!(messages[0].1["type"], "event-approved");
    }

    #[tokio::test]
    async fn test_decide_is_one_shot() {
        let fx = setup().await;
        let approval = fx
            .workflow
            .submit(&SubmitApprovalRequest {
                club_id: fx.club_id.clone(),
                requested_by: fx.leader_id.clone(),
                payload: ApprovalPayload::Budget {
                    amount: 200,
                    purpose: "Supplies".into(),
                },
            })
            .await
            .unwrap();

        let decision = DecisionRequest {
            decision: Decision::Rejected,
            actor_id: fx.faculty_id.clone(),
            rejection_reason: Some("Over budget".into()),
        };
        let approval = fx.workflow.decide(&approval.id, &decision).await.unwrap();
        assert_eq!(approval.status, ApprovalStatus::Rejected);
        assert_eq!(approval.rejection_reason.as_deref(), Some("Over budget"));

        let err = fx.workflow.decide(&approval.id, &decision).await.unwrap_err();
        assert_eq!(err.error_code(), "INVALID_STATE");

        // Status unchanged after the failed second decision.
        let approval = fx.repo.get_approval(&approval.id).await.unwrap().unwrap();
        assert_eq!(approval.status, ApprovalStatus::Rejected);
    }

    #[tokio::test]
    async fn test_membership_approval_records_decision_only() {
        let fx = setup().await;
        let approval = fx
            .workflow
            .submit(&SubmitApprovalRequest {
                club_id: fx.club_id.clone(),
                requested_by: fx.leader_id.clone(),
                payload: ApprovalPayload::Membership {
                    name: "New Student".into(),
                    username: "newbie".into(),
                },
            })
            .await
            .unwrap();

        fx.workflow
            .decide(
                &approval.id,
                &DecisionRequest {
                    decision: Decision::Approved,
                    actor_id: fx.faculty_id.clone(),
                    rejection_reason: None,
                },
            )
            .await
            .unwrap();

        // No roster mutation and no auto-provisioned user.
        let club = fx.repo.get_club(&fx.club_id).await.unwrap().unwrap();
        assert!(club.members.is_empty());
        assert!(fx
            .repo
            .get_user_by_username("newbie")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_decide_requires_faculty_or_admin() {
        let fx = setup().await;
        let approval = fx
            .workflow
            .submit(&SubmitApprovalRequest {
                club_id: fx.club_id.clone(),
                requested_by: fx.leader_id.clone(),
                payload: event_payload(),
            })
            .await
            .unwrap();

        let err = fx
            .workflow
            .decide(
                &approval.id,
                &DecisionRequest {
                    decision: Decision::Approved,
                    actor_id: fx.leader_id.clone(),
                    rejection_reason: None,
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "ROLE_MISMATCH");
    }
}
