//! Credit ledger integration tests.

mod common;

use axum::http::StatusCode;
use common::TestHarness;
use serde_json::json;

#[tokio::test]
async fn new_user_starts_with_zero_balance() {
    let harness = TestHarness::new();
    let user_id = harness.create_user("fresh").await;

    let response = harness
        .server
        .get(&format!("/v1/users/{user_id}/balance"))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["balance_minutes"], 0);
    assert!(body["transactions"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn admin_grant_shows_up_in_history() {
    let harness = TestHarness::new();
    let user_id = harness.create_user("funded").await;

    let response = harness
        .server
        .post("/v1/credits/add")
        .json(&json!({
            "user_id": user_id,
            "amount_minutes": 45,
            "description": "45 minute pack",
            "reference": "order_001",
        }))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["new_balance"], 45);

    let balance: serde_json::Value = harness
        .server
        .get(&format!("/v1/users/{user_id}/balance"))
        .await
        .json();
    assert_eq!(balance["balance_minutes"], 45);

    let transactions = balance["transactions"].as_array().unwrap();
    assert_eq!(transactions.len(), 1);
    assert_eq!(transactions[0]["amount_minutes"], 45);
    assert_eq!(transactions[0]["balance_after_minutes"], 45);
    assert_eq!(transactions[0]["description"], "45 minute pack");
    assert_eq!(transactions[0]["reference"], "order_001");
}

#[tokio::test]
async fn grant_rejects_non_positive_amounts() {
    let harness = TestHarness::new();
    let user_id = harness.create_user("zero").await;

    for amount in [0, -10] {
        let response = harness
            .server
            .post("/v1/credits/add")
            .json(&json!({
                "user_id": user_id,
                "amount_minutes": amount,
            }))
            .await;
        response.assert_status_bad_request();
    }
}

#[tokio::test]
async fn grant_to_unknown_user_is_not_found() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .post("/v1/credits/add")
        .json(&json!({
            "user_id": uuid::Uuid::new_v4().to_string(),
            "amount_minutes": 10,
        }))
        .await;

    response.assert_status_not_found();
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"]["code"], "not_found");
}

#[tokio::test]
async fn session_charge_is_a_ledger_entry() {
    let harness = TestHarness::new();
    let user_id = harness.create_funded_user("player", 30).await;
    let session_id = harness.start_session(&user_id).await;

    let stop: serde_json::Value = harness
        .server
        .post(&format!("/v1/sessions/{session_id}/stop"))
        .json(&json!({}))
        .await
        .json();
    let charged = stop["credits_charged"].as_i64().unwrap();

    let balance: serde_json::Value = harness
        .server
        .get(&format!("/v1/users/{user_id}/balance"))
        .await
        .json();

    let transactions = balance["transactions"].as_array().unwrap();
    if charged > 0 {
        // Newest first: the consumption precedes the funding grant.
        assert_eq!(transactions.len(), 2);
        assert_eq!(transactions[0]["amount_minutes"].as_i64().unwrap(), -charged);
        assert_eq!(
            transactions[0]["reference"],
            format!("session:{session_id}")
        );
    } else {
        assert_eq!(transactions.len(), 1);
    }
}

#[tokio::test]
async fn admin_user_listing() {
    let harness = TestHarness::new();
    harness.create_funded_user("alice", 10).await;
    harness.create_user("bob").await;

    let response = harness.server.get("/v1/admin/users").await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    let users = body.as_array().unwrap();
    assert_eq!(users.len(), 2);
    // Sorted by username.
    assert_eq!(users[0]["username"], "alice");
    assert_eq!(users[0]["balance_minutes"], 10);
    assert_eq!(users[1]["username"], "bob");
}

#[tokio::test]
async fn empty_username_is_rejected() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .post("/v1/users")
        .json(&json!({ "username": "  ", "email": "x@example.com" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}
