//! Comment post board: creation, full-field update, filtered listing, and
//! the idempotent like relation with its one-time heart award.

use matchboard_types::api::{CommentPostCreate, CommentPostFilters};
use rusqlite::Connection;

use crate::filter;
use crate::models::CommentPostRow;
use crate::users::OptionalExt;
use crate::{Database, StoreError, StoreResult};

/// Per-actor annotations are computed in the query: ?1 is the acting user
/// (NULL for anonymous readers, which makes both EXISTS and the ownership
/// test false).
const COMMENT_POST_SELECT: &str = "
    SELECT p.id, p.user_id, p.target_gender, p.target_job, p.target_birth_year,
           p.target_height, p.target_app, p.comment, p.created_at,
           (SELECT COUNT(*) FROM comment_post_likes WHERE post_id = p.id),
           EXISTS(SELECT 1 FROM comment_post_likes
                  WHERE post_id = p.id AND user_id = ?1),
           COALESCE(p.user_id = ?1, 0)
    FROM comment_posts p";

impl Database {
    pub fn create_comment_post(
        &self,
        actor: i64,
        fields: &CommentPostCreate,
    ) -> StoreResult<CommentPostRow> {
        fields.validate().map_err(StoreError::Validation)?;

        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "INSERT INTO comment_posts (user_id, target_gender, target_job,
                     target_birth_year, target_height, target_app, comment)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                rusqlite::params![
                    actor,
                    fields.target_gender.as_str(),
                    fields.target_job,
                    fields.target_birth_year,
                    fields.target_height,
                    fields.target_app,
                    fields.comment,
                ],
            )?;
            let post = query_comment_post(&tx, tx.last_insert_rowid(), Some(actor))?
                .ok_or_else(|| StoreError::NotFound("post vanished after insert".into()))?;
            tx.commit()?;
            Ok(post)
        })
    }

    /// Newest-first listing. Annotation columns are computed per actor in
    /// SQL; the request filters are applied by the shared predicate matcher.
    pub fn list_comment_posts(
        &self,
        actor: Option<i64>,
        filters: &CommentPostFilters,
    ) -> StoreResult<Vec<CommentPostRow>> {
        self.with_conn(|conn| {
            let sql = format!("{COMMENT_POST_SELECT} ORDER BY p.created_at DESC, p.id DESC");
            let mut stmt = conn.prepare(&sql)?;
            let mut rows = stmt
                .query_map([actor], map_comment_post_row)?
                .collect::<Result<Vec<_>, _>>()?;
            rows.retain(|row| filter::comment_post_matches(filters, row));
            Ok(rows)
        })
    }

    /// Full-field replace, restricted to the owner. A failed update leaves
    /// the row untouched.
    pub fn update_comment_post(
        &self,
        actor: i64,
        post_id: i64,
        fields: &CommentPostCreate,
    ) -> StoreResult<CommentPostRow> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            let owner: i64 = tx
                .query_row(
                    "SELECT user_id FROM comment_posts WHERE id = ?1",
                    [post_id],
                    |row| row.get(0),
                )
                .optional()?
                .ok_or_else(|| StoreError::NotFound("comment post not found".into()))?;
            if owner != actor {
                return Err(StoreError::Authorization(
                    "only the owner may update this post".into(),
                ));
            }
            fields.validate().map_err(StoreError::Validation)?;

            tx.execute(
                "UPDATE comment_posts
                 SET target_gender = ?1, target_job = ?2, target_birth_year = ?3,
                     target_height = ?4, target_app = ?5, comment = ?6
                 WHERE id = ?7",
                rusqlite::params![
                    fields.target_gender.as_str(),
                    fields.target_job,
                    fields.target_birth_year,
                    fields.target_height,
                    fields.target_app,
                    fields.comment,
                    post_id,
                ],
            )?;

            let post = query_comment_post(&tx, post_id, Some(actor))?
                .ok_or_else(|| StoreError::NotFound("comment post not found".into()))?;
            tx.commit()?;
            Ok(post)
        })
    }

    /// Idempotent like: a repeat like is a silent no-op. The first like a
    /// given user ever puts on a given post also awards the post's owner a
    /// heart, recorded in heart_history so the award happens at most once
    /// even across like/unlike cycles. Returns whether a like row was added.
    pub fn like_comment_post(&self, actor: i64, post_id: i64) -> StoreResult<bool> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            let owner: i64 = tx
                .query_row(
                    "SELECT user_id FROM comment_posts WHERE id = ?1",
                    [post_id],
                    |row| row.get(0),
                )
                .optional()?
                .ok_or_else(|| StoreError::NotFound("comment post not found".into()))?;

            let inserted = tx.execute(
                "INSERT OR IGNORE INTO comment_post_likes (post_id, user_id) VALUES (?1, ?2)",
                [post_id, actor],
            )? == 1;

            if inserted {
                let first_heart = tx.execute(
                    "INSERT OR IGNORE INTO heart_history (post_id, user_id) VALUES (?1, ?2)",
                    [post_id, actor],
                )? == 1;
                if first_heart {
                    tx.execute("UPDATE users SET hearts = hearts + 1 WHERE id = ?1", [owner])?;
                }
            }

            tx.commit()?;
            Ok(inserted)
        })
    }

    /// Removing an absent like is a no-op, never an error. Returns whether a
    /// like row was removed. Hearts are not taken back.
    pub fn unlike_comment_post(&self, actor: i64, post_id: i64) -> StoreResult<bool> {
        self.with_conn(|conn| {
            let removed = conn.execute(
                "DELETE FROM comment_post_likes WHERE post_id = ?1 AND user_id = ?2",
                [post_id, actor],
            )? > 0;
            Ok(removed)
        })
    }
}

fn query_comment_post(
    conn: &Connection,
    post_id: i64,
    actor: Option<i64>,
) -> StoreResult<Option<CommentPostRow>> {
    let sql = format!("{COMMENT_POST_SELECT} WHERE p.id = ?2");
    let mut stmt = conn.prepare(&sql)?;
    let row = stmt
        .query_row(rusqlite::params![actor, post_id], map_comment_post_row)
        .optional()?;
    Ok(row)
}

fn map_comment_post_row(row: &rusqlite::Row<'_>) -> Result<CommentPostRow, rusqlite::Error> {
    Ok(CommentPostRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        target_gender: row.get(2)?,
        target_job: row.get(3)?,
        target_birth_year: row.get(4)?,
        target_height: row.get(5)?,
        target_app: row.get(6)?,
        comment: row.get(7)?,
        created_at: row.get(8)?,
        likes_count: row.get(9)?,
        user_liked: row.get(10)?,
        is_owner: row.get(11)?,
    })
}
