use rusqlite::{OptionalExtension, params};

use super::{MESSAGE_SELECT, message_from_row};
use crate::models::MessageRow;
use crate::{Database, DbResult};

/// Largest page the home timeline shows.
pub const TIMELINE_LIMIT: u32 = 100;

impl Database {
    // -- Messages --

    pub fn insert_message(&self, user_id: i64, text: &str) -> DbResult<MessageRow> {
        let id = self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO messages (text, user_id) VALUES (?1, ?2)",
                params![text, user_id],
            )?;
            Ok(conn.last_insert_rowid())
        })?;

        self.with_conn(|conn| {
            let sql = format!("{MESSAGE_SELECT} WHERE m.id = ?1");
            Ok(conn.query_row(&sql, [id], message_from_row)?)
        })
    }

    pub fn get_message(&self, id: i64) -> DbResult<Option<MessageRow>> {
        self.with_conn(|conn| {
            let sql = format!("{MESSAGE_SELECT} WHERE m.id = ?1");
            Ok(conn.query_row(&sql, [id], message_from_row).optional()?)
        })
    }

    /// Every message the user owns, in creation order.
    pub fn user_messages(&self, user_id: i64) -> DbResult<Vec<MessageRow>> {
        self.with_conn(|conn| {
            let sql = format!("{MESSAGE_SELECT} WHERE m.user_id = ?1 ORDER BY m.id");
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([user_id], message_from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn count_messages(&self) -> DbResult<usize> {
        self.with_conn(|conn| {
            let n: i64 = conn.query_row("SELECT COUNT(*) FROM messages", [], |r| r.get(0))?;
            Ok(n as usize)
        })
    }

    /// Messages by the user and by everyone they follow, newest first,
    /// capped at `limit` (and never more than `TIMELINE_LIMIT`).
    pub fn timeline(&self, user_id: i64, limit: u32) -> DbResult<Vec<MessageRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "{MESSAGE_SELECT}
                 WHERE m.user_id = ?1
                    OR m.user_id IN (SELECT user_being_followed_id FROM follows WHERE user_following_id = ?1)
                 ORDER BY m.timestamp DESC, m.id DESC
                 LIMIT ?2"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(params![user_id, limit.min(TIMELINE_LIMIT)], message_from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Returns false when no such message existed.
    pub fn delete_message(&self, id: i64) -> DbResult<bool> {
        self.with_conn(|conn| Ok(conn.execute("DELETE FROM messages WHERE id = ?1", [id])? > 0))
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use crate::DbError;
    use crate::queries::fixtures::{Seeded, seeded};

    #[rstest]
    fn message_belongs_to_owner(seeded: Seeded) {
        let db = &seeded.db;
        db.insert_message(seeded.user1, "this is a test").unwrap();

        let messages = db.user_messages(seeded.user1).unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].text, "this is a test");
        assert_eq!(messages[0].author_username, "test1");
        assert!(db.user_messages(seeded.user2).unwrap().is_empty());
    }

    #[rstest]
    fn owner_listing_keeps_creation_order(seeded: Seeded) {
        let db = &seeded.db;
        for text in ["first", "second", "third"] {
            db.insert_message(seeded.user1, text).unwrap();
        }
        let texts: Vec<_> = db
            .user_messages(seeded.user1)
            .unwrap()
            .into_iter()
            .map(|m| m.text)
            .collect();
        assert_eq!(texts, ["first", "second", "third"]);
    }

    #[rstest]
    fn message_requires_existing_owner(seeded: Seeded) {
        let err = seeded.db.insert_message(9999, "orphan").unwrap_err();
        assert!(matches!(err, DbError::MissingReference));
        assert_eq!(seeded.db.count_messages().unwrap(), 0);
    }

    #[rstest]
    #[case::empty("")]
    #[case::too_long(&"x".repeat(141))]
    fn text_length_is_checked(seeded: Seeded, #[case] text: &str) {
        let err = seeded.db.insert_message(seeded.user1, text).unwrap_err();
        assert!(matches!(err, DbError::Invalid(_)), "unexpected error: {err:?}");
    }

    #[rstest]
    fn timeline_covers_self_and_followed(seeded: Seeded) {
        let db = &seeded.db;
        db.insert_message(seeded.user1, "own").unwrap();
        db.insert_message(seeded.user2, "followed").unwrap();
        db.insert_message(seeded.user3, "stranger").unwrap();
        db.add_follow(seeded.user1, seeded.user2).unwrap();

        let texts: Vec<_> = db
            .timeline(seeded.user1, 100)
            .unwrap()
            .into_iter()
            .map(|m| m.text)
            .collect();
        assert_eq!(texts, ["followed", "own"]);
    }

    #[rstest]
    #[case::capped(500, 100)]
    #[case::exact(100, 100)]
    #[case::smaller(10, 10)]
    fn timeline_is_capped(seeded: Seeded, #[case] limit: u32, #[case] expected: usize) {
        let db = &seeded.db;
        for i in 0..101 {
            db.insert_message(seeded.user1, &format!("warble {i}")).unwrap();
        }

        let timeline = db.timeline(seeded.user1, limit).unwrap();
        assert_eq!(timeline.len(), expected);
        assert_eq!(timeline[0].text, "warble 100");
    }

    #[rstest]
    fn delete_reports_whether_row_existed(seeded: Seeded) {
        let db = &seeded.db;
        let msg = db.insert_message(seeded.user1, "bye").unwrap();
        assert!(db.delete_message(msg.id).unwrap());
        assert!(!db.delete_message(msg.id).unwrap());
        assert!(db.get_message(msg.id).unwrap().is_none());
    }
}
