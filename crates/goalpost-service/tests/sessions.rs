//! Session lifecycle integration tests.

mod common;

use axum::http::StatusCode;
use common::TestHarness;
use serde_json::json;

#[tokio::test]
async fn start_session_with_balance() {
    let harness = TestHarness::new();
    let user_id = harness.create_funded_user("starter", 30).await;

    let response = harness
        .server
        .post("/v1/sessions")
        .json(&json!({ "user_id": user_id }))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["adopted"], false);
    assert!(body["session_id"].as_str().is_some());
}

#[tokio::test]
async fn start_without_balance_is_payment_required() {
    let harness = TestHarness::new();
    let user_id = harness.create_user("broke").await;

    let response = harness
        .server
        .post("/v1/sessions")
        .json(&json!({ "user_id": user_id }))
        .await;

    response.assert_status(StatusCode::PAYMENT_REQUIRED);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"]["code"], "insufficient_balance");
    assert_eq!(body["error"]["details"]["balance"], 0);
}

#[tokio::test]
async fn second_start_adopts_the_open_session() {
    let harness = TestHarness::new();
    let user_id = harness.create_funded_user("double", 30).await;

    let first = harness.start_session(&user_id).await;

    let response = harness
        .server
        .post("/v1/sessions")
        .json(&json!({ "user_id": user_id }))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["adopted"], true);
    assert_eq!(body["session_id"], first.as_str());
}

#[tokio::test]
async fn stop_charges_and_reports_new_balance() {
    let harness = TestHarness::new();
    let user_id = harness.create_funded_user("stopper", 30).await;
    let session_id = harness.start_session(&user_id).await;

    let response = harness
        .server
        .post(&format!("/v1/sessions/{session_id}/stop"))
        .json(&json!({}))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], true);

    // The session ran for well under a minute; the charge is at most the
    // one-minute minimum (zero if no full second elapsed).
    let charged = body["credits_charged"].as_i64().unwrap();
    assert!(charged <= 1);
    assert_eq!(body["new_balance"].as_i64().unwrap(), 30 - charged);
}

#[tokio::test]
async fn stop_twice_is_conflict() {
    let harness = TestHarness::new();
    let user_id = harness.create_funded_user("twice", 30).await;
    let session_id = harness.start_session(&user_id).await;

    harness
        .server
        .post(&format!("/v1/sessions/{session_id}/stop"))
        .json(&json!({}))
        .await
        .assert_status_ok();

    let response = harness
        .server
        .post(&format!("/v1/sessions/{session_id}/stop"))
        .json(&json!({}))
        .await;

    response.assert_status(StatusCode::CONFLICT);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"]["code"], "conflict");
}

#[tokio::test]
async fn stop_unknown_session_is_not_found() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .post(&format!(
            "/v1/sessions/{}/stop",
            uuid::Uuid::new_v4()
        ))
        .json(&json!({}))
        .await;

    response.assert_status_not_found();
}

#[tokio::test]
async fn open_sessions_listing_shows_owner_details() {
    let harness = TestHarness::new();
    let user_id = harness.create_funded_user("visible", 30).await;
    let session_id = harness.start_session(&user_id).await;

    let response = harness.server.get("/v1/admin/sessions/open").await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["session_id"], session_id.as_str());
    assert_eq!(rows[0]["user_id"], user_id.as_str());
    assert_eq!(rows[0]["username"], "visible");
    assert_eq!(rows[0]["elapsed_minutes"], 0);
}

#[tokio::test]
async fn admin_delete_frees_the_slot_without_charging() {
    let harness = TestHarness::new();
    let user_id = harness.create_funded_user("stuck", 30).await;
    let session_id = harness.start_session(&user_id).await;

    harness
        .server
        .delete(&format!("/v1/admin/sessions/{session_id}"))
        .await
        .assert_status_ok();

    // Balance untouched, and a fresh start gets a new session.
    let balance: serde_json::Value = harness
        .server
        .get(&format!("/v1/users/{user_id}/balance"))
        .await
        .json();
    assert_eq!(balance["balance_minutes"], 30);

    let response = harness
        .server
        .post("/v1/sessions")
        .json(&json!({ "user_id": user_id }))
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["adopted"], false);
    assert_ne!(body["session_id"], session_id.as_str());
}
