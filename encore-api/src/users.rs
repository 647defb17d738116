use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use encore_shared::{Masked, Role, User};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/v1/users", get(list_users))
        .route("/v1/users", post(create_user))
}

/// Directory view of an account. The bcrypt hash never leaves the server.
#[derive(Debug, Serialize)]
struct UserView {
    id: Uuid,
    email: String,
    role: Role,
    created_at: DateTime<Utc>,
    email_verified: bool,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            role: user.role,
            created_at: user.created_at,
            email_verified: user.email_verified,
        }
    }
}

async fn list_users(State(state): State<AppState>) -> Json<Vec<UserView>> {
    let users = state.users.read().await;
    let mut views: Vec<UserView> = users.iter().map(UserView::from).collect();
    views.sort_by(|a, b| a.email.cmp(&b.email));
    Json(views)
}

#[derive(Debug, Deserialize)]
struct CreateUserRequest {
    email: String,
    password: Masked<String>,
    role: Role,
}

/// Admin-created accounts (sellers, other admins). Verification is implied;
/// the admin vouches for the address.
async fn create_user(
    State(state): State<AppState>,
    Json(req): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserView>), AppError> {
    let email = req.email.trim().to_lowercase();
    if !email.contains('@') {
        return Err(AppError::Validation("A valid email is required".into()));
    }
    let password = req.password.into_inner();
    if password.len() < 8 {
        return Err(AppError::Validation(
            "Password must be at least 8 characters".into(),
        ));
    }

    let password_hash = bcrypt::hash(&password, bcrypt::DEFAULT_COST)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    let mut users = state.users.write().await;
    if users.iter().any(|u| u.email == email) {
        return Err(AppError::Conflict("Email is already registered".into()));
    }
    let mut user = User::new(email, password_hash, req.role);
    user.email_verified = true;
    users.push(user.clone());
    state.store.save_users(&users).await?;

    Ok((StatusCode::CREATED, Json(UserView::from(&user))))
}
