//! User profile handlers.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use goalpost_core::{UserId, UserProfile};
use goalpost_store::Store;

use crate::error::ApiError;
use crate::state::AppState;

/// Profile registration request.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    /// Display name.
    pub username: String,
    /// Contact email.
    pub email: String,
}

/// Profile in responses.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    /// User ID.
    pub user_id: String,
    /// Display name.
    pub username: String,
    /// Contact email.
    pub email: String,
    /// Credit balance in minutes.
    pub balance_minutes: i64,
}

impl From<UserProfile> for UserResponse {
    fn from(profile: UserProfile) -> Self {
        Self {
            user_id: profile.user_id.to_string(),
            username: profile.username,
            email: profile.email,
            balance_minutes: profile.balance_minutes,
        }
    }
}

/// Register a new profile with a zero balance.
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateUserRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    if body.username.trim().is_empty() {
        return Err(ApiError::BadRequest("username must not be empty".into()));
    }

    let profile = UserProfile::new(UserId::generate(), body.username, body.email);
    state.store.put_profile(&profile)?;

    tracing::info!(user_id = %profile.user_id, username = %profile.username, "profile created");
    Ok(Json(profile.into()))
}

/// All registered profiles (admin).
pub async fn list_users(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let profiles = state.store.list_profiles()?;
    Ok(Json(profiles.into_iter().map(Into::into).collect()))
}
