use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::Utc;
use encore_shared::{Masked, Role, User};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::Claims;
use crate::state::AppState;

pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/v1/auth/register", post(register))
        .route("/v1/auth/login", post(login))
        .route("/v1/auth/verify", get(verify_email))
}

pub fn authed_routes() -> Router<AppState> {
    Router::new().route("/v1/auth/me", get(me))
}

#[derive(Debug, Deserialize)]
struct RegisterRequest {
    email: String,
    password: Masked<String>,
}

#[derive(Debug, Serialize)]
struct RegisterResponse {
    id: Uuid,
    email: String,
    role: Role,
}

/// Claims for the one-shot email verification link.
#[derive(Debug, Serialize, Deserialize)]
struct VerifyClaims {
    sub: String,
    purpose: String,
    exp: usize,
}

async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
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

    let user = {
        let mut users = state.users.write().await;
        if users.iter().any(|u| u.email == email) {
            return Err(AppError::Conflict("Email is already registered".into()));
        }
        // Bootstrap: the very first account becomes the super admin.
        let role = if users.is_empty() {
            Role::SuperAdmin
        } else {
            Role::Client
        };
        let user = User::new(email.clone(), password_hash, role);
        users.push(user.clone());
        state.store.save_users(&users).await?;
        user
    };

    let token = verification_token(&state, &email)?;
    let url = format!("{}/verify-email?token={}", state.public_url, token);
    if let Err(err) = state.dispatcher.send_verification(&email, &url).await {
        // The account exists either way; the user can request a new link.
        warn!(email = %email, error = %err, "verification email failed");
    }

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            id: user.id,
            email: user.email,
            role: user.role,
        }),
    ))
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    email: String,
    password: Masked<String>,
}

#[derive(Debug, Serialize)]
struct LoginResponse {
    token: String,
    role: Role,
    email_verified: bool,
}

async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let email = req.email.trim().to_lowercase();
    let users = state.users.read().await;
    let user = users
        .iter()
        .find(|u| u.email == email)
        .ok_or_else(|| AppError::Unauthorized("Invalid credentials".into()))?;

    let ok = bcrypt::verify(req.password.into_inner(), &user.password_hash)
        .map_err(|e| AppError::Internal(e.to_string()))?;
    if !ok {
        return Err(AppError::Unauthorized("Invalid credentials".into()));
    }

    let claims = Claims {
        sub: user.id.to_string(),
        email: user.email.clone(),
        role: user.role,
        exp: (Utc::now().timestamp() as usize) + state.auth.expiration as usize,
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(state.auth.secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Json(LoginResponse {
        token,
        role: user.role,
        email_verified: user.email_verified,
    }))
}

#[derive(Debug, Serialize)]
struct MeResponse {
    id: String,
    email: String,
    role: Role,
    email_verified: bool,
}

async fn me(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<MeResponse>, AppError> {
    let users = state.users.read().await;
    let user = users
        .iter()
        .find(|u| u.email == claims.email)
        .ok_or_else(|| AppError::NotFound(format!("user {}", claims.email)))?;
    Ok(Json(MeResponse {
        id: user.id.to_string(),
        email: user.email.clone(),
        role: user.role,
        email_verified: user.email_verified,
    }))
}

#[derive(Debug, Deserialize)]
struct VerifyQuery {
    token: String,
}

async fn verify_email(
    State(state): State<AppState>,
    Query(query): Query<VerifyQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let data = decode::<VerifyClaims>(
        &query.token,
        &DecodingKey::from_secret(state.auth.secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::Unauthorized("Invalid or expired verification token".into()))?;

    if data.claims.purpose != "email_verification" {
        return Err(AppError::Unauthorized("Invalid verification token".into()));
    }

    let mut users = state.users.write().await;
    let user = users
        .iter_mut()
        .find(|u| u.email == data.claims.sub)
        .ok_or_else(|| AppError::NotFound(format!("user {}", data.claims.sub)))?;
    user.email_verified = true;
    state.store.save_users(&users).await?;

    Ok(Json(serde_json::json!({ "verified": true })))
}

fn verification_token(state: &AppState, email: &str) -> Result<String, AppError> {
    let claims = VerifyClaims {
        sub: email.to_string(),
        purpose: "email_verification".into(),
        // Links stay valid for a day.
        exp: (Utc::now().timestamp() as usize) + 86_400,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(state.auth.secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(e.to_string()))
}
