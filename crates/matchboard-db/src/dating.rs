//! Dating post board. Creation is rate-limited to one post per user per UTC
//! calendar day; the quota key is a stored `created_day` column under a
//! unique index, so the insert itself is the atomic quota check.

use chrono::{DateTime, Utc};
use matchboard_types::api::{DatingPostCreate, DatingPostFilters};
use rusqlite::Connection;

use crate::filter;
use crate::models::DatingPostRow;
use crate::users::OptionalExt;
use crate::{Database, StoreError, StoreResult};

const DATING_POST_SELECT: &str = "
    SELECT dp.id, dp.user_id, u.username, dp.title, dp.description,
           dp.target_gender, dp.target_age_min, dp.target_age_max, dp.created_at,
           COALESCE(dp.user_id = ?1, 0),
           EXISTS(SELECT 1 FROM messages m
                  WHERE m.dating_post_id = dp.id
                    AND m.sender_id = ?1
                    AND m.reply_to_message_id IS NULL)
    FROM dating_posts dp
    JOIN users u ON dp.user_id = u.id";

/// The quota bucket for a creation timestamp. `can_post_dating` and
/// `create_dating_post` both key on this, so the two cannot drift.
fn quota_day(now: DateTime<Utc>) -> String {
    now.format("%Y-%m-%d").to_string()
}

impl Database {
    /// `now` is supplied by the caller (the API layer passes `Utc::now()`),
    /// which keeps the quota window testable.
    pub fn create_dating_post(
        &self,
        actor: i64,
        fields: &DatingPostCreate,
        now: DateTime<Utc>,
    ) -> StoreResult<DatingPostRow> {
        fields.validate().map_err(StoreError::Validation)?;

        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "INSERT INTO dating_posts (user_id, title, description, target_gender,
                     target_age_min, target_age_max, created_day)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                rusqlite::params![
                    actor,
                    fields.title,
                    fields.description,
                    fields.target_gender.as_str(),
                    fields.target_age_min,
                    fields.target_age_max,
                    quota_day(now),
                ],
            )
            .map_err(|e| {
                if StoreError::is_unique_violation(&e, "dating_posts.user_id") {
                    StoreError::QuotaExceeded("only one dating post per day".into())
                } else {
                    e.into()
                }
            })?;

            let post = query_dating_post(&tx, tx.last_insert_rowid(), Some(actor))?
                .ok_or_else(|| StoreError::NotFound("post vanished after insert".into()))?;
            tx.commit()?;
            Ok(post)
        })
    }

    /// True iff a `create_dating_post` at `now` would not hit the quota.
    pub fn can_post_dating(&self, actor: i64, now: DateTime<Utc>) -> StoreResult<bool> {
        self.with_conn(|conn| {
            let taken: bool = conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM dating_posts
                               WHERE user_id = ?1 AND created_day = ?2)",
                rusqlite::params![actor, quota_day(now)],
                |row| row.get(0),
            )?;
            Ok(!taken)
        })
    }

    pub fn list_dating_posts(
        &self,
        actor: Option<i64>,
        filters: &DatingPostFilters,
    ) -> StoreResult<Vec<DatingPostRow>> {
        self.with_conn(|conn| {
            let sql = format!("{DATING_POST_SELECT} ORDER BY dp.created_at DESC, dp.id DESC");
            let mut stmt = conn.prepare(&sql)?;
            let mut rows = stmt
                .query_map([actor], map_dating_post_row)?
                .collect::<Result<Vec<_>, _>>()?;
            rows.retain(|row| filter::dating_post_matches(filters, row));
            Ok(rows)
        })
    }
}

fn query_dating_post(
    conn: &Connection,
    post_id: i64,
    actor: Option<i64>,
) -> StoreResult<Option<DatingPostRow>> {
    let sql = format!("{DATING_POST_SELECT} WHERE dp.id = ?2");
    let mut stmt = conn.prepare(&sql)?;
    let row = stmt
        .query_row(rusqlite::params![actor, post_id], map_dating_post_row)
        .optional()?;
    Ok(row)
}

fn map_dating_post_row(row: &rusqlite::Row<'_>) -> Result<DatingPostRow, rusqlite::Error> {
    Ok(DatingPostRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        username: row.get(2)?,
        title: row.get(3)?,
        description: row.get(4)?,
        target_gender: row.get(5)?,
        target_age_min: row.get(6)?,
        target_age_max: row.get(7)?,
        created_at: row.get(8)?,
        is_owner: row.get(9)?,
        already_messaged: row.get(10)?,
    })
}
