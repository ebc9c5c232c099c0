//! Identity store: user records and the profile aggregation reads.

use rusqlite::Connection;

use crate::models::{CommentPostRow, OwnedDatingPostRow, UserRow};
use crate::{Database, StoreError, StoreResult};

impl Database {
    /// Register a new user. The password hash is produced by the caller;
    /// this layer never sees plaintext credentials.
    pub fn create_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> StoreResult<UserRow> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "INSERT INTO users (username, email, password_hash) VALUES (?1, ?2, ?3)",
                (username, email, password_hash),
            )
            .map_err(|e| {
                if StoreError::is_unique_violation(&e, "users.username") {
                    StoreError::Conflict("username already exists".into())
                } else if StoreError::is_unique_violation(&e, "users.email") {
                    StoreError::Conflict("email already exists".into())
                } else {
                    e.into()
                }
            })?;

            let user = query_user(&tx, "id = ?1", &tx.last_insert_rowid())?
                .ok_or_else(|| StoreError::NotFound("user vanished after insert".into()))?;
            tx.commit()?;
            Ok(user)
        })
    }

    pub fn get_user_by_username(&self, username: &str) -> StoreResult<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "username = ?1", &username))
    }

    pub fn get_user_by_id(&self, id: i64) -> StoreResult<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "id = ?1", &id))
    }

    /// Comment posts owned by `user_id`, newest first, with like counts.
    pub fn get_user_comment_posts(&self, user_id: i64) -> StoreResult<Vec<CommentPostRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT p.id, p.user_id, p.target_gender, p.target_job, p.target_birth_year,
                        p.target_height, p.target_app, p.comment, p.created_at,
                        (SELECT COUNT(*) FROM comment_post_likes WHERE post_id = p.id),
                        EXISTS(SELECT 1 FROM comment_post_likes
                               WHERE post_id = p.id AND user_id = ?1)
                 FROM comment_posts p
                 WHERE p.user_id = ?1
                 ORDER BY p.created_at DESC, p.id DESC",
            )?;

            let rows = stmt
                .query_map([user_id], |row| {
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
                        is_owner: true,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    /// Dating posts owned by `user_id` with the count of initial messages
    /// each has received (replies excluded).
    pub fn get_user_dating_posts(&self, user_id: i64) -> StoreResult<Vec<OwnedDatingPostRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT dp.id, dp.title, dp.description, dp.target_gender,
                        dp.target_age_min, dp.target_age_max, dp.created_at,
                        (SELECT COUNT(*) FROM messages m
                         WHERE m.dating_post_id = dp.id
                           AND m.reply_to_message_id IS NULL)
                 FROM dating_posts dp
                 WHERE dp.user_id = ?1
                 ORDER BY dp.created_at DESC, dp.id DESC",
            )?;

            let rows = stmt
                .query_map([user_id], |row| {
                    Ok(OwnedDatingPostRow {
                        id: row.get(0)?,
                        title: row.get(1)?,
                        description: row.get(2)?,
                        target_gender: row.get(3)?,
                        target_age_min: row.get(4)?,
                        target_age_max: row.get(5)?,
                        created_at: row.get(6)?,
                        message_count: row.get(7)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }
}

fn query_user(
    conn: &Connection,
    predicate: &str,
    param: &dyn rusqlite::types::ToSql,
) -> StoreResult<Option<UserRow>> {
    let sql = format!(
        "SELECT id, username, email, password_hash, hearts, created_at FROM users WHERE {predicate}"
    );
    let mut stmt = conn.prepare(&sql)?;

    let row = stmt
        .query_row([param], |row| {
            Ok(UserRow {
                id: row.get(0)?,
                username: row.get(1)?,
                email: row.get(2)?,
                password_hash: row.get(3)?,
                hearts: row.get(4)?,
                created_at: row.get(5)?,
            })
        })
        .optional()?;

    Ok(row)
}

/// Extension trait for optional query results
pub(crate) trait OptionalExt<T> {
    fn optional(self) -> StoreResult<Option<T>>;
}

impl<T> OptionalExt<T> for Result<T, rusqlite::Error> {
    fn optional(self) -> StoreResult<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::testutil::test_db;
    use crate::StoreError;

    #[test]
    fn creates_and_fetches_users() {
        let db = test_db();
        let user = db.create_user("alice", "alice@example.com", "hash").unwrap();
        assert_eq!(user.username, "alice");
        assert_eq!(user.hearts, 0);

        let by_name = db.get_user_by_username("alice").unwrap().unwrap();
        assert_eq!(by_name.id, user.id);
        assert!(db.get_user_by_username("nobody").unwrap().is_none());
    }

    #[test]
    fn duplicate_username_and_email_conflict() {
        let db = test_db();
        db.create_user("alice", "alice@example.com", "hash").unwrap();

        let err = db
            .create_user("alice", "other@example.com", "hash")
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(ref m) if m.contains("username")));

        let err = db
            .create_user("alice2", "alice@example.com", "hash")
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(ref m) if m.contains("email")));
    }

    #[test]
    fn ids_are_monotonic() {
        let db = test_db();
        let a = db.create_user("a1", "a1@example.com", "h").unwrap();
        let b = db.create_user("b1", "b1@example.com", "h").unwrap();
        assert!(b.id > a.id);
    }
}
