//! Shared predicate matcher used by both boards' list operations.
//!
//! Each filter field, when present, contributes one predicate; matching is
//! conjunctive. Text fields use case-insensitive substring matching — the
//! same semantics the mailbox uses, kept unified across both boards.

use matchboard_types::api::{CommentPostFilters, DatingPostFilters};

use crate::models::{CommentPostRow, DatingPostRow};

fn text_matches(needle: &str, haystack: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

pub fn comment_post_matches(filters: &CommentPostFilters, row: &CommentPostRow) -> bool {
    if let Some(gender) = filters.target_gender {
        if row.target_gender != gender.as_str() {
            return false;
        }
    }
    if let Some(job) = &filters.target_job {
        if !text_matches(job, &row.target_job) {
            return false;
        }
    }
    if let Some(year) = filters.target_birth_year {
        if row.target_birth_year != year {
            return false;
        }
    }
    if let Some(min) = filters.height_min {
        if row.target_height < min {
            return false;
        }
    }
    if let Some(max) = filters.height_max {
        if row.target_height > max {
            return false;
        }
    }
    if let Some(app) = &filters.target_app {
        if !text_matches(app, &row.target_app) {
            return false;
        }
    }
    true
}

pub fn dating_post_matches(filters: &DatingPostFilters, row: &DatingPostRow) -> bool {
    if let Some(gender) = filters.target_gender {
        if row.target_gender != gender.as_str() {
            return false;
        }
    }
    // Inclusive overlap between the requested range and the post's range.
    if let Some(min) = filters.age_min {
        if row.target_age_max < min {
            return false;
        }
    }
    if let Some(max) = filters.age_max {
        if row.target_age_min > max {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use matchboard_types::Gender;

    fn comment_row() -> CommentPostRow {
        CommentPostRow {
            id: 1,
            user_id: 1,
            target_gender: "female".into(),
            target_job: "Graphic Designer".into(),
            target_birth_year: 1995,
            target_height: 168,
            target_app: "Bumble".into(),
            comment: "great conversation".into(),
            created_at: "2026-08-30 12:00:00".into(),
            likes_count: 0,
            user_liked: false,
            is_owner: false,
        }
    }

    fn dating_row() -> DatingPostRow {
        DatingPostRow {
            id: 1,
            user_id: 1,
            username: "alice".into(),
            title: "weekend hike".into(),
            description: "easy trail, coffee after".into(),
            target_gender: "male".into(),
            target_age_min: 25,
            target_age_max: 35,
            created_at: "2026-08-30 12:00:00".into(),
            is_owner: false,
            already_messaged: false,
        }
    }

    #[test]
    fn empty_filters_match_everything() {
        assert!(comment_post_matches(&CommentPostFilters::default(), &comment_row()));
        assert!(dating_post_matches(&DatingPostFilters::default(), &dating_row()));
    }

    #[test]
    fn text_filters_are_case_insensitive_substrings() {
        let filters = CommentPostFilters {
            target_job: Some("designer".into()),
            target_app: Some("bumble".into()),
            ..Default::default()
        };
        assert!(comment_post_matches(&filters, &comment_row()));

        let filters = CommentPostFilters {
            target_job: Some("engineer".into()),
            ..Default::default()
        };
        assert!(!comment_post_matches(&filters, &comment_row()));
    }

    #[test]
    fn height_range_straddles_the_value() {
        let filters = CommentPostFilters {
            height_min: Some(160),
            height_max: Some(170),
            ..Default::default()
        };
        assert!(comment_post_matches(&filters, &comment_row()));

        let filters = CommentPostFilters {
            height_min: Some(169),
            ..Default::default()
        };
        assert!(!comment_post_matches(&filters, &comment_row()));
    }

    #[test]
    fn filters_are_conjunctive() {
        let filters = CommentPostFilters {
            target_gender: Some(Gender::Female),
            target_birth_year: Some(1990),
            ..Default::default()
        };
        // Gender matches but birth year does not.
        assert!(!comment_post_matches(&filters, &comment_row()));
    }

    #[test]
    fn age_range_overlap_is_inclusive() {
        let filters = DatingPostFilters {
            age_min: Some(35),
            age_max: Some(40),
            ..Default::default()
        };
        assert!(dating_post_matches(&filters, &dating_row()));

        let filters = DatingPostFilters {
            age_min: Some(36),
            ..Default::default()
        };
        assert!(!dating_post_matches(&filters, &dating_row()));

        let filters = DatingPostFilters {
            age_max: Some(24),
            ..Default::default()
        };
        assert!(!dating_post_matches(&filters, &dating_row()));
    }
}
