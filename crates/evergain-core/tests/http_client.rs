//! HTTP adapter tests against a mocked Evergain API.
//!
//! Each test spins up its own mockito server, so no backend is required.

use std::time::Duration;

use evergain_core::api::{ApiClient, WorkoutBackend};
use evergain_core::error::{CoreError, Operation};
use evergain_core::models::LogSetRequest;
use mockito::{Matcher, Server};
use serde_json::json;

// ============================================================================
// Test Helpers
// ============================================================================

fn client(server: &Server) -> ApiClient {
    ApiClient::new(&format!("{}/api", server.url()), Duration::from_secs(5)).unwrap()
}

const ACTIVE_SESSION: &str = r#"{
    "_id": "S1",
    "user_id": "default_user",
    "session_type": "Push",
    "started_at": "2025-01-10T17:00:00+07:00",
    "ended_at": null,
    "total_sets": 2,
    "total_volume": 960,
    "exercises_performed": ["Bench Press"],
    "is_active": true
}"#;

// ============================================================================
// Sessions
// ============================================================================

#[tokio::test]
async fn active_session_none_when_inactive() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/api/sessions/active")
        .match_query(Matcher::UrlEncoded("user_id".into(), "default_user".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"active": false, "session": null}"#)
        .create_async()
        .await;

    let session = client(&server).active_session("default_user").await.unwrap();
    assert!(session.is_none());
    mock.assert_async().await;
}

#[tokio::test]
async fn active_session_parses_payload() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/api/sessions/active")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(format!(r#"{{"active": true, "session": {ACTIVE_SESSION}}}"#))
        .create_async()
        .await;

    let session = client(&server)
        .active_session("default_user")
        .await
        .unwrap()
        .expect("session");
    assert_eq!(session.id, "S1");
    assert_eq!(session.total_sets, 2);
    assert_eq!(session.total_volume, 960.0);
}

#[tokio::test]
async fn start_session_posts_user_and_type() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/api/sessions/start")
        .match_body(Matcher::Json(json!({
            "user_id": "default_user",
            "session_type": "Push"
        })))
        .with_status(201)
        .with_body(ACTIVE_SESSION)
        .create_async()
        .await;

    let session = client(&server)
        .start_session("default_user", "Push")
        .await
        .unwrap();
    assert_eq!(session.session_type, "Push");
    mock.assert_async().await;
}

#[tokio::test]
async fn server_error_message_is_surfaced() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/api/sessions/start")
        .with_status(400)
        .with_body(r#"{"error": "session_type is required"}"#)
        .create_async()
        .await;

    let err = client(&server).start_session("default_user", "").await.unwrap_err();
    match &err {
        CoreError::Server { status, message } => {
            assert_eq!(*status, 400);
            assert_eq!(message.as_deref(), Some("session_type is required"));
        }
        other => panic!("expected server error, got {other:?}"),
    }
    assert_eq!(err.alert(Operation::StartSession).message, "session_type is required");
}

#[tokio::test]
async fn server_error_without_body_uses_fallback_alert() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/api/sessions/end")
        .with_status(500)
        .with_body("Internal Server Error")
        .create_async()
        .await;

    let err = client(&server).end_session("default_user").await.unwrap_err();
    assert!(matches!(err, CoreError::Server { status: 500, message: None }));
    assert_eq!(err.alert(Operation::EndSession).message, "Failed to end session");
}

#[tokio::test]
async fn unreachable_server_is_a_network_error() {
    let api = ApiClient::new("http://127.0.0.1:1/api", Duration::from_secs(2)).unwrap();
    let err = api.session_types().await.unwrap_err();
    assert!(matches!(err, CoreError::Network(_)));
    assert_eq!(
        err.alert(Operation::LoadSessionTypes).message,
        "Failed to load session types. Make sure the backend server is running."
    );
}

#[tokio::test]
async fn history_passes_limit() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/api/sessions/history")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("user_id".into(), "default_user".into()),
            Matcher::UrlEncoded("limit".into(), "20".into()),
        ]))
        .with_status(200)
        .with_body("[]")
        .create_async()
        .await;

    let history = client(&server).session_history("default_user", 20).await.unwrap();
    assert!(history.is_empty());
    mock.assert_async().await;
}

#[tokio::test]
async fn categorized_session_types() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/api/sessions/types/categorized")
        .with_status(200)
        .with_body(
            json!({
                "Split": [
                    {"name": "Push", "description": "Chest, shoulders, triceps", "category": "Split"},
                    {"name": "Pull", "description": "Back, biceps", "category": "Split"}
                ],
                "Full Body": [
                    {"name": "Full Body", "description": "Everything", "category": "Full Body"}
                ]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let types = client(&server).session_types().await.unwrap();
    assert_eq!(types.len(), 2);
    assert_eq!(types["Split"][1].name, "Pull");
}

// ============================================================================
// Workout sets
// ============================================================================

#[tokio::test]
async fn last_set_null_means_none() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/api/workout-sets/last-set")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("session_id".into(), "S1".into()),
            Matcher::UrlEncoded("exercise_name".into(), "Bench Press".into()),
        ]))
        .with_status(200)
        .with_body(r#"{"last_set": null}"#)
        .create_async()
        .await;

    let last = client(&server).last_set("S1", "Bench Press").await.unwrap();
    assert!(last.is_none());
    mock.assert_async().await;
}

#[tokio::test]
async fn last_set_parses_set() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/api/workout-sets/last-set")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(
            json!({
                "_id": "W3",
                "session_id": "S1",
                "exercise_name": "Bench Press",
                "weight": 62.5,
                "reps": 6,
                "rpe": 8,
                "notes": null,
                "set_number": 3,
                "timestamp": "2025-01-10T17:20:00+07:00",
                "volume": 375
            })
            .to_string(),
        )
        .create_async()
        .await;

    let last = client(&server)
        .last_set("S1", "Bench Press")
        .await
        .unwrap()
        .expect("previous set");
    assert_eq!(last.weight, 62.5);
    assert_eq!(last.rpe, Some(8));
    assert_eq!(last.set_number, 3);
}

#[tokio::test]
async fn naive_backend_timestamps_are_read_as_utc() {
    let mut server = Server::new_async().await;
    let set = json!({
        "_id": "W1",
        "session_id": "S1",
        "exercise_name": "Bench Press",
        "weight": 60.0,
        "reps": 8,
        "rpe": null,
        "notes": null,
        "set_number": 1,
        "timestamp": "2025-01-10T10:05:00.123000",
        "volume": 480.0
    });
    let _last = server
        .mock("GET", "/api/workout-sets/last-set")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(set.to_string())
        .create_async()
        .await;
    let _sets = server
        .mock("GET", "/api/workout-sets/session/S1")
        .with_status(200)
        .with_body(json!([set]).to_string())
        .create_async()
        .await;

    let api = client(&server);
    let last = api
        .last_set("S1", "Bench Press")
        .await
        .unwrap()
        .expect("previous set");
    assert_eq!((last.weight, last.reps), (60.0, 8));
    assert_eq!(
        last.timestamp.unwrap().to_rfc3339(),
        "2025-01-10T10:05:00.123+00:00"
    );

    let sets = api.session_sets("S1").await.unwrap();
    assert_eq!(sets.len(), 1);
    assert_eq!(sets[0].timestamp, last.timestamp);
}

#[tokio::test]
async fn malformed_success_body_is_a_decode_error() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/api/workout-sets/session/S1")
        .with_status(200)
        .with_body(r#"[{"session_id": "S1", "weight": "heavy"}]"#)
        .create_async()
        .await;

    let err = client(&server).session_sets("S1").await.unwrap_err();
    assert!(matches!(err, CoreError::Json(_)), "got {err:?}");
}

#[tokio::test]
async fn set_count_reads_count_field() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/api/workout-sets/count")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"count": 3}"#)
        .create_async()
        .await;

    assert_eq!(client(&server).set_count("S1", "Bench Press").await.unwrap(), 3);
}

#[tokio::test]
async fn log_set_omits_missing_optionals() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/api/workout-sets/log")
        .match_body(Matcher::Json(json!({
            "session_id": "S1",
            "exercise_name": "Bench Press",
            "weight": 60.0,
            "reps": 8
        })))
        .with_status(201)
        .with_body(
            r#"{"_id":"W1","session_id":"S1","exercise_name":"Bench Press","weight":60,"reps":8,
                "rpe":null,"notes":null,"set_number":1,"timestamp":null,"volume":480}"#,
        )
        .create_async()
        .await;

    let logged = client(&server)
        .log_set(&LogSetRequest {
            session_id: "S1".into(),
            exercise_name: "Bench Press".into(),
            weight: 60.0,
            reps: 8,
            rpe: None,
            notes: None,
        })
        .await
        .unwrap();
    assert_eq!(logged.effective_volume(), 480.0);
    mock.assert_async().await;
}

// ============================================================================
// Auth
// ============================================================================

#[tokio::test]
async fn login_failure_uses_message_field() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/api/auth/login")
        .with_status(401)
        .with_body(r#"{"message": "Invalid email or password"}"#)
        .create_async()
        .await;

    let err = client(&server).login("a@b.c", "wrong").await.unwrap_err();
    assert_eq!(err.alert(Operation::SignIn).message, "Invalid email or password");
}

#[tokio::test]
async fn bearer_token_is_sent_when_present() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/api/sessions/exercises")
        .match_query(Matcher::UrlEncoded("session_type".into(), "Push".into()))
        .match_header("authorization", "Bearer jwt-123")
        .with_status(200)
        .with_body("[]")
        .create_async()
        .await;

    let api = client(&server).with_token(Some("jwt-123".into()));
    assert!(api.exercises("Push").await.unwrap().is_empty());
    mock.assert_async().await;
}
