//! Account route handlers: registration, login, logout and the session user.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tower_sessions::Session;
use tracing::instrument;

use shopeasy_core::UserId;

use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::middleware::{OptionalAuth, RequireAuth, clear_current_user, set_current_user};
use crate::models::CurrentUser;
use crate::services::auth::AuthService;
use crate::services::notifications::Notification;
use crate::state::AppState;

/// Registration request body.
#[derive(Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Login request body.
#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// User as exposed to the client.
#[derive(Debug, Serialize)]
pub struct UserView {
    pub id: UserId,
    pub email: String,
    pub username: String,
    pub is_admin: bool,
}

impl From<&CurrentUser> for UserView {
    fn from(user: &CurrentUser) -> Self {
        Self {
            id: user.id,
            email: user.email.to_string(),
            username: user.username.clone(),
            is_admin: user.is_admin,
        }
    }
}

/// Create an account and log it in.
#[instrument(skip(state, session, body))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<RegisterRequest>,
) -> Result<Json<Value>> {
    let user = AuthService::new(state.pool())
        .register(&body.email, &body.username, &body.password)
        .await?;

    let current = CurrentUser::from(&user);
    set_current_user(&session, &current).await?;
    set_sentry_user(&user.id, Some(user.email.as_str()));

    state.notifications().enqueue(Notification::Welcome {
        to: user.email.to_string(),
        username: user.username.clone(),
    });

    tracing::info!(user_id = %user.id, "User registered");

    Ok(Json(json!({
        "success": true,
        "message": "Registration successful!",
        "user": UserView::from(&current),
    })))
}

/// Log in with email and password.
#[instrument(skip(state, session, body))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<LoginRequest>,
) -> Result<Json<Value>> {
    let user = AuthService::new(state.pool())
        .login(&body.email, &body.password)
        .await?;

    let current = CurrentUser::from(&user);
    set_current_user(&session, &current).await?;
    set_sentry_user(&user.id, Some(user.email.as_str()));

    tracing::info!(user_id = %user.id, "User logged in");

    Ok(Json(json!({
        "success": true,
        "message": "Login successful!",
        "user": UserView::from(&current),
    })))
}

/// Log out. The cart stays in the session.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn logout(RequireAuth(user): RequireAuth, session: Session) -> Result<Json<Value>> {
    clear_current_user(&session).await?;
    clear_sentry_user();

    Ok(Json(json!({
        "success": true,
        "message": "Logged out successfully",
    })))
}

/// The logged-in user, if any.
pub async fn current_user(OptionalAuth(user): OptionalAuth) -> Json<Value> {
    match user {
        Some(user) => Json(json!({
            "authenticated": true,
            "user": UserView::from(&user),
        })),
        None => Json(json!({ "authenticated": false })),
    }
}
