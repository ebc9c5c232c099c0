use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Extension, Json};
use matchboard_types::api::{Claims, CommentPostCreate, CommentPostFilters};

use crate::auth::AppState;
use crate::convert::comment_post_response;
use crate::error::{blocking, ApiError};
use crate::middleware::MaybeClaims;

pub async fn create_comment_post(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CommentPostCreate>,
) -> Result<impl IntoResponse, ApiError> {
    let actor = claims.sub;
    let db = state.clone();
    let post = blocking(move || db.db.create_comment_post(actor, &req)).await?;
    Ok((StatusCode::CREATED, Json(comment_post_response(post))))
}

pub async fn list_comment_posts(
    State(state): State<AppState>,
    Extension(MaybeClaims(claims)): Extension<MaybeClaims>,
    Query(filters): Query<CommentPostFilters>,
) -> Result<impl IntoResponse, ApiError> {
    let actor = claims.map(|c| c.sub);
    let db = state.clone();
    let rows = blocking(move || db.db.list_comment_posts(actor, &filters)).await?;

    let posts: Vec<_> = rows.into_iter().map(comment_post_response).collect();
    Ok(Json(posts))
}

pub async fn update_comment_post(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CommentPostCreate>,
) -> Result<impl IntoResponse, ApiError> {
    let actor = claims.sub;
    let db = state.clone();
    let post = blocking(move || db.db.update_comment_post(actor, post_id, &req)).await?;
    Ok(Json(comment_post_response(post)))
}

pub async fn like_comment_post(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let actor = claims.sub;
    let db = state.clone();
    let liked = blocking(move || db.db.like_comment_post(actor, post_id)).await?;
    Ok(Json(serde_json::json!({ "liked": liked })))
}

pub async fn unlike_comment_post(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let actor = claims.sub;
    let db = state.clone();
    let unliked = blocking(move || db.db.unlike_comment_post(actor, post_id)).await?;
    Ok(Json(serde_json::json!({ "unliked": unliked })))
}
