use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::Gender;

// -- JWT Claims --

/// JWT claims shared between the REST middleware and the auth handlers.
/// Canonical definition lives here in matchboard-types to eliminate
/// duplication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,
    pub username: String,
    pub exp: usize,
}

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl RegisterRequest {
    pub fn validate(&self) -> Result<(), String> {
        let username_chars = self.username.chars().count();
        if !(3..=32).contains(&username_chars) {
            return Err("username must be 3-32 characters".into());
        }
        let (local, domain) = self
            .email
            .split_once('@')
            .ok_or_else(|| "email is not valid".to_string())?;
        if local.is_empty() || !domain.contains('.') || domain.starts_with('.') {
            return Err("email is not valid".into());
        }
        if self.password.len() < 8 {
            return Err("password must be at least 8 characters".into());
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub user: UserResponse,
    pub token: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user_id: i64,
    pub username: String,
    pub token: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub hearts: i64,
}

// -- Comment posts --

/// Create and full-field update share this shape; the update form on the
/// client submits every field again.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CommentPostCreate {
    pub target_gender: Gender,
    pub target_job: String,
    pub target_birth_year: i32,
    pub target_height: i32,
    pub target_app: String,
    pub comment: String,
}

impl CommentPostCreate {
    pub fn validate(&self) -> Result<(), String> {
        if self.target_job.trim().is_empty() {
            return Err("target_job must not be empty".into());
        }
        if !(1950..=2010).contains(&self.target_birth_year) {
            return Err("target_birth_year must be between 1950 and 2010".into());
        }
        if !(140..=220).contains(&self.target_height) {
            return Err("target_height must be between 140 and 220".into());
        }
        if self.target_app.trim().is_empty() {
            return Err("target_app must not be empty".into());
        }
        if self.comment.trim().is_empty() {
            return Err("comment must not be empty".into());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CommentPostResponse {
    pub id: i64,
    pub user_id: i64,
    pub target_gender: Gender,
    pub target_job: String,
    pub target_birth_year: i32,
    pub target_height: i32,
    pub target_app: String,
    pub comment: String,
    pub created_at: DateTime<Utc>,
    pub likes_count: i64,
    pub user_liked: bool,
    pub is_owner: bool,
}

/// Optional equality/range predicates for the comment-post board. Absent
/// fields match everything; present fields AND together.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommentPostFilters {
    pub target_gender: Option<Gender>,
    pub target_job: Option<String>,
    pub target_birth_year: Option<i32>,
    pub height_min: Option<i32>,
    pub height_max: Option<i32>,
    pub target_app: Option<String>,
}

// -- Dating posts --

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatingPostCreate {
    pub title: String,
    pub description: String,
    pub target_gender: Gender,
    pub target_age_min: i32,
    pub target_age_max: i32,
}

impl DatingPostCreate {
    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("title must not be empty".into());
        }
        if self.description.trim().is_empty() {
            return Err("description must not be empty".into());
        }
        if !(18..=100).contains(&self.target_age_min) || !(18..=100).contains(&self.target_age_max)
        {
            return Err("target ages must be between 18 and 100".into());
        }
        if self.target_age_min > self.target_age_max {
            return Err("target_age_min must not exceed target_age_max".into());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DatingPostResponse {
    pub id: i64,
    pub user_id: i64,
    pub username: String,
    pub title: String,
    pub description: String,
    pub target_gender: Gender,
    pub target_age_min: i32,
    pub target_age_max: i32,
    pub created_at: DateTime<Utc>,
    pub is_owner: bool,
    pub already_messaged: bool,
}

/// A dating post as shown on its owner's profile, with the count of initial
/// messages it has received.
#[derive(Debug, Clone, Serialize)]
pub struct OwnedDatingPostResponse {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub target_gender: Gender,
    pub target_age_min: i32,
    pub target_age_max: i32,
    pub created_at: DateTime<Utc>,
    pub message_count: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DatingPostFilters {
    pub target_gender: Option<Gender>,
    /// Requested age range; matches posts whose [min, max] overlaps it.
    pub age_min: Option<i32>,
    pub age_max: Option<i32>,
}

// -- Messages --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SendMessageRequest {
    pub content: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReplyMessageRequest {
    pub reply_content: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateMessageRequest {
    pub content: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub id: i64,
    pub dating_post_id: i64,
    pub dating_post_title: String,
    pub sender_id: i64,
    pub sender_username: String,
    pub receiver_id: i64,
    pub receiver_username: String,
    pub content: String,
    pub reply_to_message_id: Option<i64>,
    /// For replies: the content of the initial message being answered.
    pub original_content: Option<String>,
    pub original_sender_username: Option<String>,
    pub is_sender: bool,
    pub is_receiver: bool,
    pub already_replied: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// -- Profile --

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub user: UserResponse,
    pub comment_posts: Vec<CommentPostResponse>,
    pub dating_posts: Vec<OwnedDatingPostResponse>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comment_post() -> CommentPostCreate {
        CommentPostCreate {
            target_gender: Gender::Female,
            target_job: "designer".into(),
            target_birth_year: 1993,
            target_height: 165,
            target_app: "tinder".into(),
            comment: "we talked about hiking".into(),
        }
    }

    #[test]
    fn comment_post_ranges() {
        assert!(comment_post().validate().is_ok());

        let mut p = comment_post();
        p.target_birth_year = 1949;
        assert!(p.validate().is_err());

        let mut p = comment_post();
        p.target_height = 221;
        assert!(p.validate().is_err());

        let mut p = comment_post();
        p.comment = "  ".into();
        assert!(p.validate().is_err());
    }

    #[test]
    fn dating_post_age_bounds() {
        let base = DatingPostCreate {
            title: "coffee this weekend".into(),
            description: "looking for someone to explore cafes with".into(),
            target_gender: Gender::Any,
            target_age_min: 25,
            target_age_max: 35,
        };
        assert!(base.validate().is_ok());

        let mut p = base.clone();
        p.target_age_min = 40;
        p.target_age_max = 30;
        assert!(p.validate().is_err());

        let mut p = base.clone();
        p.target_age_min = 17;
        assert!(p.validate().is_err());

        let mut p = base;
        p.target_age_max = 101;
        assert!(p.validate().is_err());
    }

    #[test]
    fn register_request_shape() {
        let ok = RegisterRequest {
            username: "alice".into(),
            email: "alice@example.com".into(),
            password: "correcthorse".into(),
        };
        assert!(ok.validate().is_ok());

        let bad_email = RegisterRequest {
            username: "alice".into(),
            email: "not-an-email".into(),
            password: "correcthorse".into(),
        };
        assert!(bad_email.validate().is_err());

        let short_pw = RegisterRequest {
            username: "alice".into(),
            email: "alice@example.com".into(),
            password: "short".into(),
        };
        assert!(short_pw.validate().is_err());
    }

    #[test]
    fn username_length_counts_characters_not_bytes() {
        // Three Hangul characters are nine bytes but still a valid length.
        let multibyte = RegisterRequest {
            username: "김민준".into(),
            email: "minjun@example.com".into(),
            password: "correcthorse".into(),
        };
        assert!(multibyte.validate().is_ok());

        // Two characters stay too short no matter how many bytes they take.
        let too_short = RegisterRequest {
            username: "민준".into(),
            email: "minjun@example.com".into(),
            password: "correcthorse".into(),
        };
        assert!(too_short.validate().is_err());
    }
}
