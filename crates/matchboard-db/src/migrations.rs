use rusqlite::Connection;
use tracing::info;

use crate::StoreResult;

/// The uniqueness rules that back the engine's invariants are declared here
/// as constraints so a conditional insert is the atomic check-then-act:
/// one initial message per (dating post, sender), one reply per message,
/// one like per (post, user), one dating post per (user, UTC day).
pub fn run(conn: &Connection) -> StoreResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            username        TEXT NOT NULL UNIQUE,
            email           TEXT NOT NULL UNIQUE,
            password_hash   TEXT NOT NULL,
            hearts          INTEGER NOT NULL DEFAULT 0 CHECK (hearts >= 0),
            created_at      TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS comment_posts (
            id                  INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id             INTEGER NOT NULL REFERENCES users(id),
            target_gender       TEXT NOT NULL,
            target_job          TEXT NOT NULL,
            target_birth_year   INTEGER NOT NULL,
            target_height       INTEGER NOT NULL,
            target_app          TEXT NOT NULL,
            comment             TEXT NOT NULL,
            created_at          TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_comment_posts_user
            ON comment_posts(user_id, created_at);

        CREATE TABLE IF NOT EXISTS comment_post_likes (
            post_id     INTEGER NOT NULL REFERENCES comment_posts(id),
            user_id     INTEGER NOT NULL REFERENCES users(id),
            created_at  TEXT NOT NULL DEFAULT (datetime('now')),
            PRIMARY KEY (post_id, user_id)
        );

        -- Permanent record of heart awards, so like/unlike/like cycles
        -- grant at most one heart per (post, user) ever.
        CREATE TABLE IF NOT EXISTS heart_history (
            post_id     INTEGER NOT NULL REFERENCES comment_posts(id),
            user_id     INTEGER NOT NULL REFERENCES users(id),
            created_at  TEXT NOT NULL DEFAULT (datetime('now')),
            PRIMARY KEY (post_id, user_id)
        );

        CREATE TABLE IF NOT EXISTS dating_posts (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id         INTEGER NOT NULL REFERENCES users(id),
            title           TEXT NOT NULL,
            description     TEXT NOT NULL,
            target_gender   TEXT NOT NULL,
            target_age_min  INTEGER NOT NULL,
            target_age_max  INTEGER NOT NULL,
            created_day     TEXT NOT NULL,
            created_at      TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- The daily-quota key: one post per user per UTC calendar day.
        CREATE UNIQUE INDEX IF NOT EXISTS idx_dating_posts_quota
            ON dating_posts(user_id, created_day);

        CREATE TABLE IF NOT EXISTS messages (
            id                  INTEGER PRIMARY KEY AUTOINCREMENT,
            dating_post_id      INTEGER NOT NULL REFERENCES dating_posts(id),
            sender_id           INTEGER NOT NULL REFERENCES users(id),
            receiver_id         INTEGER NOT NULL REFERENCES users(id),
            content             TEXT NOT NULL,
            reply_to_message_id INTEGER REFERENCES messages(id),
            created_at          TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at          TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- One initial message per (dating post, sender).
        CREATE UNIQUE INDEX IF NOT EXISTS idx_messages_initial
            ON messages(dating_post_id, sender_id)
            WHERE reply_to_message_id IS NULL;

        -- One reply per initial message.
        CREATE UNIQUE INDEX IF NOT EXISTS idx_messages_reply
            ON messages(reply_to_message_id)
            WHERE reply_to_message_id IS NOT NULL;

        CREATE INDEX IF NOT EXISTS idx_messages_sender
            ON messages(sender_id, created_at);
        CREATE INDEX IF NOT EXISTS idx_messages_receiver
            ON messages(receiver_id, created_at);
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
