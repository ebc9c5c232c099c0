use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Extension, Json};
use matchboard_types::api::{Claims, ReplyMessageRequest, UpdateMessageRequest};

use crate::auth::AppState;
use crate::convert::message_response;
use crate::error::{blocking, ApiError};

/// The mailbox: every message the actor sent or received.
pub async fn get_messages(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let actor = claims.sub;
    let db = state.clone();
    let rows = blocking(move || db.db.list_messages(actor)).await?;

    let messages: Vec<_> = rows
        .into_iter()
        .map(|row| message_response(row, actor))
        .collect();
    Ok(Json(messages))
}

pub async fn reply_message(
    State(state): State<AppState>,
    Path(message_id): Path<i64>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<ReplyMessageRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let actor = claims.sub;
    let db = state.clone();
    let message =
        blocking(move || db.db.reply_message(actor, message_id, &req.reply_content)).await?;
    Ok((StatusCode::CREATED, Json(message_response(message, actor))))
}

pub async fn update_message(
    State(state): State<AppState>,
    Path(message_id): Path<i64>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<UpdateMessageRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let actor = claims.sub;
    let db = state.clone();
    let message = blocking(move || db.db.update_message(actor, message_id, &req.content)).await?;
    Ok(Json(message_response(message, actor)))
}
