use axum::extract::State;
use axum::response::IntoResponse;
use axum::{Extension, Json};
use matchboard_db::StoreError;
use matchboard_types::api::{Claims, ProfileResponse};

use crate::auth::AppState;
use crate::convert::{comment_post_response, owned_dating_post_response, user_response};
use crate::error::{blocking, ApiError};

/// Read-only join across the three entity stores: the actor's user record
/// plus everything they own, with per-post counts.
pub async fn profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let actor = claims.sub;

    let db = state.clone();
    let (user, comment_posts, dating_posts) = blocking(move || {
        let user = db
            .db
            .get_user_by_id(actor)?
            .ok_or_else(|| StoreError::NotFound("user not found".into()))?;
        let comment_posts = db.db.get_user_comment_posts(actor)?;
        let dating_posts = db.db.get_user_dating_posts(actor)?;
        Ok((user, comment_posts, dating_posts))
    })
    .await?;

    Ok(Json(ProfileResponse {
        user: user_response(user),
        comment_posts: comment_posts
            .into_iter()
            .map(comment_post_response)
            .collect(),
        dating_posts: dating_posts
            .into_iter()
            .map(owned_dating_post_response)
            .collect(),
    }))
}
