use axum::{
    extract::{Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use encore_shared::{Actor, Role};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::state::AppState;

/// Session claims issued at login. `role` is one of the directory roles;
/// the capability handed to the booking core is derived from it here and
/// nowhere else.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub role: Role,
    pub exp: usize,
}

impl Claims {
    /// The capability value the core receives.
    pub fn actor(&self) -> Actor {
        match self.role {
            Role::Client => Actor::Customer {
                id: self.sub.clone(),
            },
            role => Actor::Staff {
                id: self.sub.clone(),
                role,
            },
        }
    }
}

/// Pull valid claims out of an `Authorization: Bearer` header, if present.
/// The booking routes use this directly: they are open to guests, but an
/// authenticated staff token changes the capability handed to the core.
pub fn claims_from_headers(state: &AppState, headers: &HeaderMap) -> Option<Claims> {
    let token = headers
        .get("Authorization")
        .and_then(|h| h.to_str().ok())?
        .strip_prefix("Bearer ")?;

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(state.auth.secret.as_bytes()),
        &Validation::default(),
    )
    .ok()
    .map(|data| data.claims)
}

fn decode_claims(state: &AppState, req: &Request) -> Result<Claims, StatusCode> {
    claims_from_headers(state, req.headers()).ok_or(StatusCode::UNAUTHORIZED)
}

/// Any authenticated caller.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let claims = decode_claims(&state, &req)?;
    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

/// Admin or super-admin callers only.
pub async fn admin_auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let claims = decode_claims(&state, &req)?;
    if !claims.role.is_admin() {
        return Err(StatusCode::FORBIDDEN);
    }
    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}
