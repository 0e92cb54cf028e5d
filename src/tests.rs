//! Integration tests for the ClubHub backend.

use std::sync::Arc;

use reqwest::Client;
use serde_json::{json, Value};
use tempfile::TempDir;

use crate::config::Config;
use crate::credentials::{CredentialIssuer, StaticCredentialIssuer};
use crate::db::{init_database, Repository};
use crate::ledger::PointsLedger;
use crate::membership::MembershipCoordinator;
use crate::notify::{NotificationSink, TracingSink};
use crate::registration::EventRegistrar;
use crate::workflow::ApprovalWorkflow;
use crate::{create_router, AppState};

/// Test fixture for integration tests.
struct TestFixture {
    client: Client,
    base_url: String,
    _temp_dir: TempDir,
}

impl TestFixture {
    async fn new() -> Self {
        Self::with_psk(Some("test-api-key".to_string())).await
    }

    async fn with_psk(psk: Option<String>) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.sqlite");

        let pool = init_database(&db_path).await.expect("Failed to init DB");

        let config = Config {
            api_psk: psk.clone(),
            db_path,
            bind_addr: "127.0.0.1:0".parse().unwrap(),
            log_level: "warn".to_string(),
            default_credential: "test-credential".to_string(),
        };

        let credentials: Arc<dyn CredentialIssuer> =
            Arc::new(StaticCredentialIssuer::new(config.default_credential.clone()));
        let notifier: Arc<dyn NotificationSink> = Arc::new(TracingSink);

        let state = AppState {
            repo: Arc::new(Repository::new(pool.clone())),
            coordinator: Arc::new(MembershipCoordinator::new(
                pool.clone(),
                credentials.clone(),
                notifier.clone(),
            )),
            ledger: Arc::new(PointsLedger::new(pool.clone())),
            workflow: Arc::new(ApprovalWorkflow::new(pool.clone(), notifier.clone())),
            registrar: Arc::new(EventRegistrar::new(pool)),
            credentials,
            notifier,
            config: Arc::new(config),
        };

        let app = create_router(state);

        // Bind to random port
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind");
        let addr = listener.local_addr().expect("Failed to get addr");
        let base_url = format!("http://{}", addr);

        // Spawn server
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Wait for server to start
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        let mut client_builder = Client::builder();
        if let Some(key) = psk {
            let mut headers = reqwest::header::HeaderMap::new();
            headers.insert("x-api-key", key.parse().unwrap());
            client_builder = client_builder.default_headers(headers);
        }

        TestFixture {
            client: client_builder.build().unwrap(),
            base_url,
            _temp_dir: temp_dir,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post(&self, path: &str, body: Value) -> (u16, Value) {
        let resp = self
            .client
            .post(self.url(path))
            .json(&body)
            .send()
            .await
            .unwrap();
        let status = resp.status().as_u16();
        (status, resp.json().await.unwrap())
    }

    async fn put(&self, path: &str, body: Value) -> (u16, Value) {
        let resp = self
            .client
            .put(self.url(path))
            .json(&body)
            .send()
            .await
            .unwrap();
        let status = resp.status().as_u16();
        (status, resp.json().await.unwrap())
    }

    async fn get(&self, path: &str) -> (u16, Value) {
        let resp = self.client.get(self.url(path)).send().await.unwrap();
        let status = resp.status().as_u16();
        (status, resp.json().await.unwrap())
    }

    async fn delete(&self, path: &str) -> (u16, Value) {
        let resp = self.client.delete(self.url(path)).send().await.unwrap();
        let status = resp.status().as_u16();
        (status, resp.json().await.unwrap())
    }

    /// Create a user and return its id.
    async fn make_user(&self, username: &str, role: &str) -> String {
        let (status, body) = self
            .post(
                "/api/users",
                json!({
                    "username": username,
                    "displayName": username,
                    "systemRole": role,
                }),
            )
            .await;
        assert_eq!(status, 200, "create user failed: {}", body);
        body["data"]["id"].as_str().unwrap().to_string()
    }

    /// Create a club coordinated by the given faculty and return its id.
    async fn make_club(&self, name: &str, faculty_id: &str) -> String {
        let (status, body) = self
            .post(
                "/api/clubs",
                json!({
                    "name": name,
                    "description": "A test club",
                    "category": "technical",
                    "facultyId": faculty_id,
                }),
            )
            .await;
        assert_eq!(status, 200, "create club failed: {}", body);
        body["data"]["id"].as_str().unwrap().to_string()
    }
}

#[tokio::test]
async fn test_health_check() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .get(fixture.url("/health"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.text().await.unwrap(), "OK");
}

#[tokio::test]
async fn test_auth_missing_psk() {
    let fixture = TestFixture::with_psk(Some("secret-key".to_string())).await;

    // Request without API key
    let client = Client::new();
    let resp = client
        .get(fixture.url("/api/users"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 401);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_auth_invalid_psk() {
    let fixture = TestFixture::with_psk(Some("correct-key".to_string())).await;

    let client = Client::new();
    let resp = client
        .get(fixture.url("/api/users"))
        .header("x-api-key", "wrong-key")
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 401);
}

#[tokio::test]
async fn test_auth_valid_psk() {
    let fixture = TestFixture::new().await;

    let (status, body) = fixture.get("/api/users").await;
    assert_eq!(status, 200);
    assert_eq!(body["success"], true);
}

#[tokio::test]
async fn test_user_crud() {
    let fixture = TestFixture::new().await;

    let (status, body) = fixture
        .post(
            "/api/users",
            json!({
                "username": "alice",
                "displayName": "Alice",
                "department": "CS",
            }),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["username"], "alice");
    assert_eq!(body["data"]["systemRole"], "student");
    assert_eq!(body["data"]["points"], 0);
    assert_eq!(body["data"]["primaryClub"], Value::Null);
    let id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = fixture
        .put(&format!("/api/users/{}", id), json!({"displayName": "Alice B."}))
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["displayName"], "Alice B.");

    let (status, _) = fixture.delete(&format!("/api/users/{}", id)).await;
    assert_eq!(status, 200);

    let (status, body) = fixture.get(&format!("/api/users/{}", id)).await;
    assert_eq!(status, 404);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_duplicate_username_conflict() {
    let fixture = TestFixture::new().await;
    fixture.make_user("bob", "student").await;

    let (status, body) = fixture
        .post(
            "/api/users",
            json!({"username": "bob", "displayName": "Other Bob"}),
        )
        .await;
    assert_eq!(status, 409);
    assert_eq!(body["error"]["code"], "CONFLICT");
}

#[tokio::test]
async fn test_add_member_existing_student() {
    let fixture = TestFixture::new().await;
    let faculty = fixture.make_user("prof-a", "faculty").await;
    let club = fixture.make_club("Robotics", &faculty).await;
    let student = fixture.make_user("stu-a", "student").await;

    let (status, body) = fixture
        .post(
            &format!("/api/clubs/{}/members", club),
            json!({"username": "stu-a", "role": "member"}),
        )
        .await;
    assert_eq!(status, 200);
    let members = body["data"]["members"].as_array().unwrap();
    assert_eq!(members.len(), 1);
    assert_eq!(members[0]["userId"], student);

    // Membership floor applied and primary club derived.
    let (_, body) = fixture.get(&format!("/api/users/{}", student)).await;
    assert_eq!(body["data"]["points"], 10);
    assert_eq!(body["data"]["primaryClub"], club);
}

#[tokio::test]
async fn test_add_member_provisions_unknown_username() {
    let fixture = TestFixture::new().await;
    let faculty = fixture.make_user("prof-b", "faculty").await;
    let club = fixture.make_club("Chess", &faculty).await;

    let (status, body) = fixture
        .post(
            &format!("/api/clubs/{}/members", club),
            json!({"username": "fresh", "name": "Fresh Face"}),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["members"].as_array().unwrap().len(), 1);

    // The new account is a student with the floor already applied.
    let (_, body) = fixture.get("/api/users").await;
    let user = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .find(|u| u["username"] == "fresh")
        .expect("provisioned user");
    assert_eq!(user["systemRole"], "student");
    assert_eq!(user["displayName"], "Fresh Face");
    assert_eq!(user["points"], 10);
}

#[tokio::test]
async fn test_add_member_rejects_duplicates() {
    let fixture = TestFixture::new().await;
    let faculty = fixture.make_user("prof-c", "faculty").await;
    let club = fixture.make_club("Drama", &faculty).await;
    fixture.make_user("stu-c", "student").await;

    let (status, _) = fixture
        .post(
            &format!("/api/clubs/{}/members", club),
            json!({"username": "stu-c"}),
        )
        .await;
    assert_eq!(status, 200);

    let (status, body) = fixture
        .post(
            &format!("/api/clubs/{}/members", club),
            json!({"username": "stu-c"}),
        )
        .await;
    assert_eq!(status, 409);
    assert_eq!(body["error"]["code"], "ALREADY_MEMBER");
}

#[tokio::test]
async fn test_remove_member_clears_projection() {
    let fixture = TestFixture::new().await;
    let faculty = fixture.make_user("prof-d", "faculty").await;
    let club = fixture.make_club("Debate", &faculty).await;
    let student = fixture.make_user("stu-d", "student").await;

    fixture
        .post(
            &format!("/api/clubs/{}/members", club),
            json!({"username": "stu-d"}),
        )
        .await;

    let (status, body) = fixture
        .delete(&format!("/api/clubs/{}/members/{}", club, student))
        .await;
    assert_eq!(status, 200);
    assert!(body["data"]["members"].as_array().unwrap().is_empty());

    // Points stay; the affiliation projection is gone.
    let (_, body) = fixture.get(&format!("/api/users/{}", student)).await;
    assert_eq!(body["data"]["points"], 10);
    assert_eq!(body["data"]["primaryClub"], Value::Null);
}

#[tokio::test]
async fn test_leader_reassignment_moves_between_clubs() {
    let fixture = TestFixture::new().await;
    let faculty = fixture.make_user("prof-e", "faculty").await;
    let club_a = fixture.make_club("Club A", &faculty).await;
    let club_b = fixture.make_club("Club B", &faculty).await;
    let leader = fixture.make_user("lead-e", "clubLeader").await;

    let (status, body) = fixture
        .put(&format!("/api/clubs/{}/leader", club_a), json!({"userId": leader}))
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["leader"], leader);

    // Reassigning to B must release A.
    let (status, _) = fixture
        .put(&format!("/api/clubs/{}/leader", club_b), json!({"userId": leader}))
        .await;
    assert_eq!(status, 200);

    let (_, body) = fixture.get(&format!("/api/clubs/{}", club_a)).await;
    assert_eq!(body["data"]["leader"], Value::Null);
    let (_, body) = fixture.get(&format!("/api/clubs/{}", club_b)).await;
    assert_eq!(body["data"]["leader"], leader);

    // The leader's club list follows the assignment.
    let (_, body) = fixture.get(&format!("/api/users/{}", leader)).await;
    let clubs = body["data"]["clubs"].as_array().unwrap();
    assert_eq!(clubs.len(), 1);
    assert_eq!(clubs[0]["clubId"], club_b);
}

#[tokio::test]
async fn test_assign_leader_role_mismatch() {
    let fixture = TestFixture::new().await;
    let faculty = fixture.make_user("prof-f", "faculty").await;
    let club = fixture.make_club("Club F", &faculty).await;
    let student = fixture.make_user("stu-f", "student").await;

    let (status, body) = fixture
        .put(&format!("/api/clubs/{}/leader", club), json!({"userId": student}))
        .await;
    assert_eq!(status, 403);
    assert_eq!(body["error"]["code"], "ROLE_MISMATCH");
}

#[tokio::test]
async fn test_event_capacity_enforced_over_http() {
    let fixture = TestFixture::new().await;
    let faculty = fixture.make_user("prof-g", "faculty").await;
    let club = fixture.make_club("Club G", &faculty).await;

    let (status, body) = fixture
        .post(
            "/api/events",
            json!({
                "title": "Workshop",
                "description": "Intro workshop",
                "clubId": club,
                "organizerId": faculty,
                "date": "2027-06-01T10:00:00Z",
                "venue": "Hall 1",
                "maxParticipants": 2,
            }),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["status"], "pending");
    let event = body["data"]["id"].as_str().unwrap().to_string();

    let a = fixture.make_user("reg-a", "student").await;
    let b = fixture.make_user("reg-b", "student").await;
    let c = fixture.make_user("reg-c", "student").await;

    for user in [&a, &b] {
        let (status, _) = fixture
            .post(&format!("/api/events/{}/register", event), json!({"userId": user}))
            .await;
        assert_eq!(status, 200);
    }

    let (status, body) = fixture
        .post(&format!("/api/events/{}/register", event), json!({"userId": c}))
        .await;
    assert_eq!(status, 409);
    assert_eq!(body["error"]["code"], "EVENT_FULL");

    // First registrant earned exactly the attendance increment.
    let (_, body) = fixture.get(&format!("/api/users/{}", a)).await;
    assert_eq!(body["data"]["points"], 10);
    assert_eq!(body["data"]["eventsAttended"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_unregister_keeps_points() {
    let fixture = TestFixture::new().await;
    let faculty = fixture.make_user("prof-h", "faculty").await;
    let club = fixture.make_club("Club H", &faculty).await;

    let (_, body) = fixture
        .post(
            "/api/events",
            json!({
                "title": "Talk",
                "description": "Guest talk",
                "clubId": club,
                "organizerId": faculty,
                "date": "2027-07-01T10:00:00Z",
                "venue": "Aud 2",
            }),
        )
        .await;
    let event = body["data"]["id"].as_str().unwrap().to_string();
    let user = fixture.make_user("reg-h", "student").await;

    fixture
        .post(&format!("/api/events/{}/register", event), json!({"userId": user}))
        .await;
    let (status, body) = fixture
        .delete(&format!("/api/events/{}/register/{}", event, user))
        .await;
    assert_eq!(status, 200);
    assert!(body["data"]["registeredParticipants"]
        .as_array()
        .unwrap()
        .is_empty());

    let (_, body) = fixture.get(&format!("/api/users/{}", user)).await;
    assert_eq!(body["data"]["points"], 10);
}

#[tokio::test]
async fn test_approval_flow_spawns_event() {
    let fixture = TestFixture::new().await;
    let faculty = fixture.make_user("prof-i", "faculty").await;
    let club = fixture.make_club("Club I", &faculty).await;
    let leader = fixture.make_user("lead-i", "clubLeader").await;

    let (status, body) = fixture
        .post(
            "/api/approvals",
            json!({
                "clubId": club,
                "requestedBy": leader,
                "type": "event",
                "title": "Symposium",
                "description": "Annual symposium",
                "date": "2027-09-01T09:00:00Z",
                "venue": "Main Hall",
                "budget": 1500,
            }),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["status"], "pending");
    assert_eq!(body["data"]["faculty"], faculty);
    let approval = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = fixture
        .post(
            &format!("/api/approvals/{}/decision", approval),
            json!({"decision": "approved", "actorId": faculty}),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["status"], "approved");
    assert_eq!(body["data"]["approvedBy"], faculty);

    // Approval materialized an approved event organized by the requester.
    let (_, body) = fixture
        .get(&format!("/api/events?clubId={}", club))
        .await;
    let events = body["data"].as_array().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["title"], "Symposium");
    assert_eq!(events[0]["status"], "approved");
    assert_eq!(events[0]["organizer"], leader);
    assert_eq!(events[0]["budget"], 1500);

    // Deciding again is rejected.
    let (status, body) = fixture
        .post(
            &format!("/api/approvals/{}/decision", approval),
            json!({"decision": "rejected", "actorId": faculty}),
        )
        .await;
    assert_eq!(status, 409);
    assert_eq!(body["error"]["code"], "INVALID_STATE");
}

#[tokio::test]
async fn test_approval_rejection_records_reason() {
    let fixture = TestFixture::new().await;
    let faculty = fixture.make_user("prof-j", "faculty").await;
    let club = fixture.make_club("Club J", &faculty).await;
    let leader = fixture.make_user("lead-j", "clubLeader").await;

    let (_, body) = fixture
        .post(
            "/api/approvals",
            json!({
                "clubId": club,
                "requestedBy": leader,
                "type": "budget",
                "amount": 900,
                "purpose": "Equipment",
            }),
        )
        .await;
    let approval = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = fixture
        .post(
            &format!("/api/approvals/{}/decision", approval),
            json!({
                "decision": "rejected",
                "actorId": faculty,
                "rejectionReason": "No budget left",
            }),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["status"], "rejected");
    assert_eq!(body["data"]["rejectionReason"], "No budget left");

    // No event came out of a budget request.
    let (_, body) = fixture.get("/api/events").await;
    assert!(body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_approval_filtering() {
    let fixture = TestFixture::new().await;
    let faculty = fixture.make_user("prof-k", "faculty").await;
    let club = fixture.make_club("Club K", &faculty).await;
    let leader = fixture.make_user("lead-k", "clubLeader").await;

    for (kind, extra) in [
        ("budget", json!({"amount": 100, "purpose": "Prizes"})),
        ("leader", json!({"name": "Next Lead"})),
    ] {
        let mut body = json!({
            "clubId": club,
            "requestedBy": leader,
            "type": kind,
        });
        body.as_object_mut()
            .unwrap()
            .extend(extra.as_object().unwrap().clone());
        let (status, _) = fixture.post("/api/approvals", body).await;
        assert_eq!(status, 200);
    }

    let (_, body) = fixture.get("/api/approvals?type=budget").await;
    let approvals = body["data"].as_array().unwrap();
    assert_eq!(approvals.len(), 1);
    assert_eq!(approvals[0]["type"], "budget");

    let (_, body) = fixture
        .get(&format!("/api/approvals?facultyId={}&status=pending", faculty))
        .await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_reward_claim_flow() {
    let fixture = TestFixture::new().await;
    let faculty = fixture.make_user("prof-l", "faculty").await;
    let club = fixture.make_club("Club L", &faculty).await;

    let (status, body) = fixture
        .post(
            "/api/rewards",
            json!({
                "name": "Sticker Pack",
                "icon": "sticker",
                "description": "A pack of stickers",
                "requiredPoints": 10,
                "points": 0,
                "category": "merch",
            }),
        )
        .await;
    assert_eq!(status, 200);
    let reward = body["data"]["id"].as_str().unwrap().to_string();

    let user = fixture.make_user("claimer", "student").await;

    // Below the threshold: claim refused.
    let (status, body) = fixture
        .post(&format!("/api/rewards/{}/claim", reward), json!({"userId": user}))
        .await;
    assert_eq!(status, 400);
    assert_eq!(body["error"]["code"], "INSUFFICIENT_POINTS");

    // Joining a club brings the user to the floor of 10.
    fixture
        .post(
            &format!("/api/clubs/{}/members", club),
            json!({"username": "claimer"}),
        )
        .await;

    let (status, body) = fixture
        .post(&format!("/api/rewards/{}/claim", reward), json!({"userId": user}))
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["points"], 10);
    assert_eq!(body["data"]["rewards"].as_array().unwrap().len(), 1);

    // Claiming the same reward twice is refused.
    let (status, body) = fixture
        .post(&format!("/api/rewards/{}/claim", reward), json!({"userId": user}))
        .await;
    assert_eq!(status, 409);
    assert_eq!(body["error"]["code"], "ALREADY_CLAIMED");
}

#[tokio::test]
async fn test_repair_points_endpoint() {
    let fixture = TestFixture::new().await;
    let faculty = fixture.make_user("prof-m", "faculty").await;
    let club = fixture.make_club("Club M", &faculty).await;
    let student = fixture.make_user("stu-m", "student").await;

    fixture
        .post(
            &format!("/api/clubs/{}/members", club),
            json!({"username": "stu-m"}),
        )
        .await;

    // Administrative reset below the floor, then repair restores it.
    fixture
        .put(&format!("/api/users/{}", student), json!({"points": 0}))
        .await;

    let (status, body) = fixture.post("/api/users/repair-points", json!({})).await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["repaired"], 1);

    let (_, body) = fixture.get(&format!("/api/users/{}", student)).await;
    assert_eq!(body["data"]["points"], 10);

    // Second pass finds nothing to fix.
    let (_, body) = fixture.post("/api/users/repair-points", json!({})).await;
    assert_eq!(body["data"]["repaired"], 0);
}

#[tokio::test]
async fn test_delete_user_then_reconcile() {
    let fixture = TestFixture::new().await;
    let faculty = fixture.make_user("prof-n", "faculty").await;
    let club = fixture.make_club("Club N", &faculty).await;
    let student = fixture.make_user("stu-n", "student").await;

    fixture
        .post(
            &format!("/api/clubs/{}/members", club),
            json!({"username": "stu-n"}),
        )
        .await;

    // Deleting the user cascades the roster entry with it.
    let (status, _) = fixture.delete(&format!("/api/users/{}", student)).await;
    assert_eq!(status, 200);

    let (_, body) = fixture.get(&format!("/api/clubs/{}", club)).await;
    assert!(body["data"]["members"].as_array().unwrap().is_empty());

    // Reconcile finds nothing left to sweep.
    let (status, body) = fixture
        .post(&format!("/api/clubs/{}/reconcile", club), json!({}))
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["removed"], 0);
}

#[tokio::test]
async fn test_club_delete_cascades() {
    let fixture = TestFixture::new().await;
    let faculty = fixture.make_user("prof-o", "faculty").await;
    let club = fixture.make_club("Club O", &faculty).await;
    let student = fixture.make_user("stu-o", "student").await;

    fixture
        .post(
            &format!("/api/clubs/{}/members", club),
            json!({"username": "stu-o"}),
        )
        .await;

    let (status, _) = fixture.delete(&format!("/api/clubs/{}", club)).await;
    assert_eq!(status, 200);

    // The member's affiliation projection is gone with the club.
    let (_, body) = fixture.get(&format!("/api/users/{}", student)).await;
    assert_eq!(body["data"]["primaryClub"], Value::Null);

    // So is the faculty edge.
    let (_, body) = fixture.get(&format!("/api/users/{}", faculty)).await;
    assert!(body["data"]["clubs"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_revision_id_advances_on_writes() {
    let fixture = TestFixture::new().await;

    let (_, body) = fixture.get("/api/users").await;
    let before = body["revisionId"].as_i64().unwrap();

    fixture.make_user("rev-user", "student").await;

    let (_, body) = fixture.get("/api/users").await;
    let after = body["revisionId"].as_i64().unwrap();
    assert!(after > before);
}
