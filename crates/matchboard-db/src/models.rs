//! Database row types — these map directly to SQLite rows plus the per-actor
//! annotation columns computed by the list queries. Distinct from the
//! matchboard-types API models to keep the store layer independent.

use chrono::{DateTime, Utc};
use tracing::warn;

#[derive(Debug)]
pub struct UserRow {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub hearts: i64,
    pub created_at: String,
}

#[derive(Debug)]
pub struct CommentPostRow {
    pub id: i64,
    pub user_id: i64,
    pub target_gender: String,
    pub target_job: String,
    pub target_birth_year: i32,
    pub target_height: i32,
    pub target_app: String,
    pub comment: String,
    pub created_at: String,
    pub likes_count: i64,
    pub user_liked: bool,
    pub is_owner: bool,
}

#[derive(Debug)]
pub struct DatingPostRow {
    pub id: i64,
    pub user_id: i64,
    pub username: String,
    pub title: String,
    pub description: String,
    pub target_gender: String,
    pub target_age_min: i32,
    pub target_age_max: i32,
    pub created_at: String,
    pub is_owner: bool,
    pub already_messaged: bool,
}

/// A dating post joined with its initial-message count, for the owner's
/// profile view.
pub struct OwnedDatingPostRow {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub target_gender: String,
    pub target_age_min: i32,
    pub target_age_max: i32,
    pub created_at: String,
    pub message_count: i64,
}

#[derive(Debug)]
pub struct MessageRow {
    pub id: i64,
    pub dating_post_id: i64,
    pub dating_post_title: String,
    pub sender_id: i64,
    pub sender_username: String,
    pub receiver_id: i64,
    pub receiver_username: String,
    pub content: String,
    pub reply_to_message_id: Option<i64>,
    pub original_content: Option<String>,
    pub original_sender_username: Option<String>,
    pub already_replied: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// SQLite stores timestamps as "YYYY-MM-DD HH:MM:SS" without timezone;
/// parse as naive UTC, accepting RFC 3339 if present.
pub fn parse_timestamp(raw: &str) -> DateTime<Utc> {
    raw.parse::<DateTime<Utc>>()
        .or_else(|_| {
            chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            warn!("Corrupt timestamp '{}': {}", raw, e);
            DateTime::default()
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_sqlite_datetime() {
        let ts = parse_timestamp("2026-08-31 10:00:00");
        assert_eq!(ts.to_rfc3339(), "2026-08-31T10:00:00+00:00");
    }

    #[test]
    fn parses_rfc3339() {
        assert_eq!(
            parse_timestamp("2026-08-31T10:00:00Z"),
            parse_timestamp("2026-08-31 10:00:00")
        );
    }
}
