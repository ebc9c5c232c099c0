//! Messaging on dating posts. Each (dating post, sender) contact is a bounded
//! two-message exchange: one initial message from a non-owner, at most one
//! reply from the post owner. Both uniqueness rules are enforced by partial
//! unique indexes, so the insert is the atomic state transition.

use rusqlite::Connection;

use crate::models::MessageRow;
use crate::users::OptionalExt;
use crate::{Database, StoreError, StoreResult};

const MESSAGE_SELECT: &str = "
    SELECT m.id, m.dating_post_id, dp.title, m.sender_id, s.username,
           m.receiver_id, r.username, m.content, m.reply_to_message_id,
           orig.content, orig_sender.username,
           EXISTS(SELECT 1 FROM messages reply
                  WHERE reply.reply_to_message_id = m.id),
           m.created_at, m.updated_at
    FROM messages m
    JOIN users s ON m.sender_id = s.id
    JOIN users r ON m.receiver_id = r.id
    JOIN dating_posts dp ON m.dating_post_id = dp.id
    LEFT JOIN messages orig ON m.reply_to_message_id = orig.id
    LEFT JOIN users orig_sender ON orig.sender_id = orig_sender.id";

struct MessageHead {
    dating_post_id: i64,
    sender_id: i64,
    receiver_id: i64,
    reply_to_message_id: Option<i64>,
}

impl Database {
    /// First contact on a dating post. The receiver is always the post's
    /// owner; owners cannot message their own post, and each sender gets
    /// exactly one initial message per post.
    pub fn send_message(
        &self,
        actor: i64,
        dating_post_id: i64,
        content: &str,
    ) -> StoreResult<MessageRow> {
        validate_content(content)?;

        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            let owner: i64 = tx
                .query_row(
                    "SELECT user_id FROM dating_posts WHERE id = ?1",
                    [dating_post_id],
                    |row| row.get(0),
                )
                .optional()?
                .ok_or_else(|| StoreError::NotFound("dating post not found".into()))?;
            if owner == actor {
                return Err(StoreError::Authorization(
                    "cannot send a message to your own post".into(),
                ));
            }

            tx.execute(
                "INSERT INTO messages (dating_post_id, sender_id, receiver_id, content)
                 VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![dating_post_id, actor, owner, content],
            )
            .map_err(|e| {
                if StoreError::is_unique_violation(&e, "messages.dating_post_id") {
                    StoreError::Conflict("already sent a message to this post".into())
                } else {
                    e.into()
                }
            })?;

            let message = query_message(&tx, tx.last_insert_rowid())?
                .ok_or_else(|| StoreError::NotFound("message vanished after insert".into()))?;
            tx.commit()?;
            Ok(message)
        })
    }

    /// The one permitted response to an initial message, sent by its
    /// receiver (the dating post's owner) back to the original sender.
    pub fn reply_message(
        &self,
        actor: i64,
        message_id: i64,
        content: &str,
    ) -> StoreResult<MessageRow> {
        validate_content(content)?;

        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            let head = query_message_head(&tx, message_id)?
                .ok_or_else(|| StoreError::NotFound("message not found".into()))?;
            if head.receiver_id != actor {
                return Err(StoreError::Authorization(
                    "only the recipient may reply to this message".into(),
                ));
            }
            if head.reply_to_message_id.is_some() {
                return Err(StoreError::Conflict("cannot reply to a reply".into()));
            }

            tx.execute(
                "INSERT INTO messages
                     (dating_post_id, sender_id, receiver_id, content, reply_to_message_id)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![
                    head.dating_post_id,
                    actor,
                    head.sender_id,
                    content,
                    message_id,
                ],
            )
            .map_err(|e| {
                if StoreError::is_unique_violation(&e, "messages.reply_to_message_id") {
                    StoreError::Conflict("already replied to this message".into())
                } else {
                    e.into()
                }
            })?;

            let message = query_message(&tx, tx.last_insert_rowid())?
                .ok_or_else(|| StoreError::NotFound("message vanished after insert".into()))?;
            tx.commit()?;
            Ok(message)
        })
    }

    /// Edit a message's content. Authorship, not post ownership: only the
    /// sender may edit, whatever the thread's reply state.
    pub fn update_message(
        &self,
        actor: i64,
        message_id: i64,
        content: &str,
    ) -> StoreResult<MessageRow> {
        validate_content(content)?;

        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            let sender: i64 = tx
                .query_row(
                    "SELECT sender_id FROM messages WHERE id = ?1",
                    [message_id],
                    |row| row.get(0),
                )
                .optional()?
                .ok_or_else(|| StoreError::NotFound("message not found".into()))?;
            if sender != actor {
                return Err(StoreError::Authorization(
                    "only the sender may edit a message".into(),
                ));
            }

            tx.execute(
                "UPDATE messages SET content = ?1, updated_at = datetime('now') WHERE id = ?2",
                rusqlite::params![content, message_id],
            )?;

            let message = query_message(&tx, message_id)?
                .ok_or_else(|| StoreError::NotFound("message not found".into()))?;
            tx.commit()?;
            Ok(message)
        })
    }

    /// The actor's mailbox: every message they sent or received, newest
    /// first, joined with the display fields the client threads by.
    pub fn list_messages(&self, actor: i64) -> StoreResult<Vec<MessageRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "{MESSAGE_SELECT}
                 WHERE m.sender_id = ?1 OR m.receiver_id = ?1
                 ORDER BY m.created_at DESC, m.id DESC"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([actor], map_message_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }
}

fn validate_content(content: &str) -> StoreResult<()> {
    if content.trim().is_empty() {
        return Err(StoreError::Validation("content must not be empty".into()));
    }
    Ok(())
}

fn query_message_head(conn: &Connection, message_id: i64) -> StoreResult<Option<MessageHead>> {
    conn.query_row(
        "SELECT dating_post_id, sender_id, receiver_id, reply_to_message_id
         FROM messages WHERE id = ?1",
        [message_id],
        |row| {
            Ok(MessageHead {
                dating_post_id: row.get(0)?,
                sender_id: row.get(1)?,
                receiver_id: row.get(2)?,
                reply_to_message_id: row.get(3)?,
            })
        },
    )
    .optional()
}

fn query_message(conn: &Connection, message_id: i64) -> StoreResult<Option<MessageRow>> {
    let sql = format!("{MESSAGE_SELECT} WHERE m.id = ?1");
    let mut stmt = conn.prepare(&sql)?;
    let row = stmt.query_row([message_id], map_message_row).optional()?;
    Ok(row)
}

fn map_message_row(row: &rusqlite::Row<'_>) -> Result<MessageRow, rusqlite::Error> {
    Ok(MessageRow {
        id: row.get(0)?,
        dating_post_id: row.get(1)?,
        dating_post_title: row.get(2)?,
        sender_id: row.get(3)?,
        sender_username: row.get(4)?,
        receiver_id: row.get(5)?,
        receiver_username: row.get(6)?,
        content: row.get(7)?,
        reply_to_message_id: row.get(8)?,
        original_content: row.get(9)?,
        original_sender_username: row.get(10)?,
        already_replied: row.get(11)?,
        created_at: row.get(12)?,
        updated_at: row.get(13)?,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::testutil::{seed_dating_post, seed_user, test_db};
    use crate::StoreError;

    #[test]
    fn first_message_succeeds_and_repeat_conflicts() {
        let db = test_db();
        let alice = seed_user(&db, "alice");
        let bob = seed_user(&db, "bob");
        let post = seed_dating_post(&db, alice);

        let msg = db.send_message(bob, post, "hi").unwrap();
        assert_eq!(msg.sender_id, bob);
        assert_eq!(msg.receiver_id, alice);
        assert!(msg.reply_to_message_id.is_none());

        let err = db.send_message(bob, post, "hi again").unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[test]
    fn cannot_message_own_post() {
        let db = test_db();
        let alice = seed_user(&db, "alice");
        let post = seed_dating_post(&db, alice);

        let err = db.send_message(alice, post, "hello me").unwrap_err();
        assert!(matches!(err, StoreError::Authorization(_)));
    }

    #[test]
    fn message_to_unknown_post_is_not_found() {
        let db = test_db();
        let bob = seed_user(&db, "bob");
        let err = db.send_message(bob, 404, "hi").unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[test]
    fn empty_content_is_rejected() {
        let db = test_db();
        let alice = seed_user(&db, "alice");
        let bob = seed_user(&db, "bob");
        let post = seed_dating_post(&db, alice);

        let err = db.send_message(bob, post, "   ").unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
    }

    #[test]
    fn concurrent_sends_admit_exactly_one() {
        let db = Arc::new(test_db());
        let alice = seed_user(&db, "alice");
        let bob = seed_user(&db, "bob");
        let post = seed_dating_post(&db, alice);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let db = Arc::clone(&db);
                std::thread::spawn(move || db.send_message(bob, post, "hi").is_ok())
            })
            .collect();

        let successes = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|&ok| ok)
            .count();
        assert_eq!(successes, 1);
    }

    #[test]
    fn reply_is_owner_only_and_one_shot() {
        let db = test_db();
        let alice = seed_user(&db, "alice");
        let bob = seed_user(&db, "bob");
        let carol = seed_user(&db, "carol");
        let post = seed_dating_post(&db, alice);
        let msg = db.send_message(bob, post, "hi").unwrap();

        let err = db.reply_message(carol, msg.id, "intercepted").unwrap_err();
        assert!(matches!(err, StoreError::Authorization(_)));
        let err = db.reply_message(bob, msg.id, "to myself").unwrap_err();
        assert!(matches!(err, StoreError::Authorization(_)));

        let reply = db.reply_message(alice, msg.id, "hello back").unwrap();
        assert_eq!(reply.sender_id, alice);
        assert_eq!(reply.receiver_id, bob);
        assert_eq!(reply.reply_to_message_id, Some(msg.id));
        assert_eq!(reply.original_content.as_deref(), Some("hi"));
        assert_eq!(reply.original_sender_username.as_deref(), Some("bob"));

        let err = db.reply_message(alice, msg.id, "again").unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));

        // The reply itself is terminal.
        let err = db.reply_message(bob, reply.id, "but wait").unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[test]
    fn reply_to_unknown_message_is_not_found() {
        let db = test_db();
        let alice = seed_user(&db, "alice");
        let err = db.reply_message(alice, 999, "hello?").unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[test]
    fn concurrent_replies_admit_exactly_one() {
        let db = Arc::new(test_db());
        let alice = seed_user(&db, "alice");
        let bob = seed_user(&db, "bob");
        let post = seed_dating_post(&db, alice);
        let msg = db.send_message(bob, post, "hi").unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let db = Arc::clone(&db);
                let id = msg.id;
                std::thread::spawn(move || db.reply_message(alice, id, "hello back"))
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        for reply in results.into_iter().flatten() {
            assert_eq!(reply.sender_id, alice);
        }
    }

    #[test]
    fn sender_may_edit_their_own_message_only() {
        let db = test_db();
        let alice = seed_user(&db, "alice");
        let bob = seed_user(&db, "bob");
        let post = seed_dating_post(&db, alice);
        let msg = db.send_message(bob, post, "hi").unwrap();

        let err = db.update_message(alice, msg.id, "edited by owner").unwrap_err();
        assert!(matches!(err, StoreError::Authorization(_)));

        let edited = db.update_message(bob, msg.id, "hi there").unwrap();
        assert_eq!(edited.content, "hi there");

        // Editing does not consume or grant the reply.
        let mailbox = db.list_messages(alice).unwrap();
        assert!(!mailbox[0].already_replied);
        db.reply_message(alice, msg.id, "hello back").unwrap();
    }

    #[test]
    fn update_unknown_message_is_not_found() {
        let db = test_db();
        let bob = seed_user(&db, "bob");
        let err = db.update_message(bob, 512, "ghost").unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[test]
    fn mailbox_covers_both_directions_with_threading_fields() {
        let db = test_db();
        let alice = seed_user(&db, "alice");
        let bob = seed_user(&db, "bob");
        let post = seed_dating_post(&db, alice);
        let msg = db.send_message(bob, post, "hi").unwrap();
        db.reply_message(alice, msg.id, "hello back").unwrap();

        for actor in [alice, bob] {
            let mailbox = db.list_messages(actor).unwrap();
            assert_eq!(mailbox.len(), 2);
        }

        let mailbox = db.list_messages(bob).unwrap();
        // Newest first: the reply precedes the initial message.
        let reply = &mailbox[0];
        let initial = &mailbox[1];
        assert_eq!(reply.reply_to_message_id, Some(initial.id));
        assert_eq!(reply.original_content.as_deref(), Some("hi"));
        assert_eq!(reply.original_sender_username.as_deref(), Some("bob"));
        assert!(initial.already_replied);
        assert!(!reply.already_replied);
        assert_eq!(initial.dating_post_title, "picnic by the river");

        let carol = seed_user(&db, "carol");
        assert!(db.list_messages(carol).unwrap().is_empty());
    }
}
