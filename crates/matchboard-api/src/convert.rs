//! Row-to-response mapping. Annotation fields are carried over from the
//! store's computed columns; timestamps and gender strings are decoded here,
//! tolerating (and logging) corrupt stored values rather than failing reads.

use matchboard_db::models::{
    parse_timestamp, CommentPostRow, DatingPostRow, MessageRow, OwnedDatingPostRow, UserRow,
};
use matchboard_types::api::{
    CommentPostResponse, DatingPostResponse, MessageResponse, OwnedDatingPostResponse, UserResponse,
};
use matchboard_types::Gender;
use tracing::warn;

fn parse_gender(raw: &str) -> Gender {
    raw.parse().unwrap_or_else(|e| {
        warn!("Corrupt gender value: {}", e);
        Gender::Any
    })
}

pub fn user_response(row: UserRow) -> UserResponse {
    UserResponse {
        id: row.id,
        username: row.username,
        email: row.email,
        hearts: row.hearts,
    }
}

pub fn comment_post_response(row: CommentPostRow) -> CommentPostResponse {
    CommentPostResponse {
        id: row.id,
        user_id: row.user_id,
        target_gender: parse_gender(&row.target_gender),
        target_job: row.target_job,
        target_birth_year: row.target_birth_year,
        target_height: row.target_height,
        target_app: row.target_app,
        comment: row.comment,
        created_at: parse_timestamp(&row.created_at),
        likes_count: row.likes_count,
        user_liked: row.user_liked,
        is_owner: row.is_owner,
    }
}

pub fn dating_post_response(row: DatingPostRow) -> DatingPostResponse {
    DatingPostResponse {
        id: row.id,
        user_id: row.user_id,
        username: row.username,
        title: row.title,
        description: row.description,
        target_gender: parse_gender(&row.target_gender),
        target_age_min: row.target_age_min,
        target_age_max: row.target_age_max,
        created_at: parse_timestamp(&row.created_at),
        is_owner: row.is_owner,
        already_messaged: row.already_messaged,
    }
}

pub fn owned_dating_post_response(row: OwnedDatingPostRow) -> OwnedDatingPostResponse {
    OwnedDatingPostResponse {
        id: row.id,
        title: row.title,
        description: row.description,
        target_gender: parse_gender(&row.target_gender),
        target_age_min: row.target_age_min,
        target_age_max: row.target_age_max,
        created_at: parse_timestamp(&row.created_at),
        message_count: row.message_count,
    }
}

/// `actor` is the requesting user; sender/receiver flags are derived here at
/// read time, never stored.
pub fn message_response(row: MessageRow, actor: i64) -> MessageResponse {
    MessageResponse {
        id: row.id,
        dating_post_id: row.dating_post_id,
        dating_post_title: row.dating_post_title,
        is_sender: row.sender_id == actor,
        is_receiver: row.receiver_id == actor,
        sender_id: row.sender_id,
        sender_username: row.sender_username,
        receiver_id: row.receiver_id,
        receiver_username: row.receiver_username,
        content: row.content,
        reply_to_message_id: row.reply_to_message_id,
        original_content: row.original_content,
        original_sender_username: row.original_sender_username,
        already_replied: row.already_replied,
        created_at: parse_timestamp(&row.created_at),
        updated_at: parse_timestamp(&row.updated_at),
    }
}
