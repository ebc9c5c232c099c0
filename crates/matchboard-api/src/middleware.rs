use axum::extract::{Request, State};
use axum::http::header;
use axum::middleware::Next;
use axum::response::Response;
use jsonwebtoken::{decode, DecodingKey, Validation};
use matchboard_types::api::Claims;

use crate::auth::AppState;
use crate::error::ApiError;

/// The resolved principal on listing routes that allow anonymous reads.
#[derive(Debug, Clone)]
pub struct MaybeClaims(pub Option<Claims>);

/// Extract and validate the JWT from the Authorization header; reject the
/// request if it is missing or invalid.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let claims = bearer_claims(&req, &state.jwt_secret)
        .ok_or(ApiError::Unauthorized("not authenticated"))?;
    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

/// Like `require_auth`, but anonymous requests proceed with no principal.
/// A malformed or expired token also reads as anonymous rather than failing
/// the request.
pub async fn optional_auth(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let claims = bearer_claims(&req, &state.jwt_secret);
    req.extensions_mut().insert(MaybeClaims(claims));
    next.run(req).await
}

fn bearer_claims(req: &Request, secret: &str) -> Option<Claims> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())?;
    let token = auth_header.strip_prefix("Bearer ")?;

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .ok()
    .map(|data| data.claims)
}
