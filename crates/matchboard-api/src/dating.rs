use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Extension, Json};
use chrono::Utc;
use matchboard_types::api::{Claims, DatingPostCreate, DatingPostFilters, SendMessageRequest};

use crate::auth::AppState;
use crate::convert::{dating_post_response, message_response};
use crate::error::{blocking, ApiError};
use crate::middleware::MaybeClaims;

pub async fn create_dating_post(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<DatingPostCreate>,
) -> Result<impl IntoResponse, ApiError> {
    let actor = claims.sub;
    let db = state.clone();
    let post = blocking(move || db.db.create_dating_post(actor, &req, Utc::now())).await?;
    Ok((StatusCode::CREATED, Json(dating_post_response(post))))
}

pub async fn list_dating_posts(
    State(state): State<AppState>,
    Extension(MaybeClaims(claims)): Extension<MaybeClaims>,
    Query(filters): Query<DatingPostFilters>,
) -> Result<impl IntoResponse, ApiError> {
    let actor = claims.map(|c| c.sub);
    let db = state.clone();
    let rows = blocking(move || db.db.list_dating_posts(actor, &filters)).await?;

    let posts: Vec<_> = rows.into_iter().map(dating_post_response).collect();
    Ok(Json(posts))
}

pub async fn can_post_dating(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let actor = claims.sub;
    let db = state.clone();
    let can_post = blocking(move || db.db.can_post_dating(actor, Utc::now())).await?;
    Ok(Json(serde_json::json!({ "can_post": can_post })))
}

pub async fn send_message(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<SendMessageRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let actor = claims.sub;
    let db = state.clone();
    let message = blocking(move || db.db.send_message(actor, post_id, &req.content)).await?;
    Ok((StatusCode::CREATED, Json(message_response(message, actor))))
}
