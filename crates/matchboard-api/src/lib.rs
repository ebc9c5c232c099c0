pub mod auth;
pub mod convert;
pub mod dating;
pub mod error;
pub mod messages;
pub mod middleware;
pub mod posts;
pub mod users;

use axum::routing::{get, post, put};
use axum::Router;

pub use auth::{AppState, AppStateInner};

use crate::middleware::{optional_auth, require_auth};

/// The full operation surface. Public routes need no principal, the two
/// board listings resolve one when a bearer token is present, everything
/// else requires one.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .with_state(state.clone());

    let listing_routes = Router::new()
        .route("/comment_posts", get(posts::list_comment_posts))
        .route("/dating", get(dating::list_dating_posts))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            optional_auth,
        ))
        .with_state(state.clone());

    let protected_routes = Router::new()
        .route("/comment_posts", post(posts::create_comment_post))
        .route("/comment_posts/{post_id}", put(posts::update_comment_post))
        .route(
            "/comment_posts/{post_id}/like",
            post(posts::like_comment_post).delete(posts::unlike_comment_post),
        )
        .route("/dating", post(dating::create_dating_post))
        .route("/dating/can_post", get(dating::can_post_dating))
        .route("/dating/{post_id}/message", post(dating::send_message))
        .route("/messages", get(messages::get_messages))
        .route("/messages/{message_id}/reply", post(messages::reply_message))
        .route("/messages/{message_id}", put(messages::update_message))
        .route("/users/profile", get(users::profile))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            require_auth,
        ))
        .with_state(state);

    Router::new()
        .merge(public_routes)
        .merge(listing_routes)
        .merge(protected_routes)
}
