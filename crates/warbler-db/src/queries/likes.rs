use rusqlite::{OptionalExtension, params};
use tracing::debug;

use super::{MESSAGE_SELECT, message_from_row};
use crate::models::{LikeRow, MessageRow};
use crate::{Database, DbResult};

impl Database {
    // -- Likes --

    /// A second like of the same message by the same user is a `Conflict`.
    pub fn add_like(&self, user_id: i64, message_id: i64) -> DbResult<LikeRow> {
        let id = self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO likes (user_id, message_id) VALUES (?1, ?2)",
                params![user_id, message_id],
            )?;
            Ok(conn.last_insert_rowid())
        })?;

        Ok(LikeRow {
            id,
            user_id,
            message_id,
        })
    }

    pub fn remove_like(&self, user_id: i64, message_id: i64) -> DbResult<bool> {
        self.with_conn(|conn| {
            Ok(conn.execute(
                "DELETE FROM likes WHERE user_id = ?1 AND message_id = ?2",
                params![user_id, message_id],
            )? > 0)
        })
    }

    /// Toggle a like: removes if it exists, inserts if not.
    /// Returns true when the like was added.
    pub fn toggle_like(&self, user_id: i64, message_id: i64) -> DbResult<bool> {
        let added = self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            let existing: Option<i64> = tx
                .query_row(
                    "SELECT id FROM likes WHERE user_id = ?1 AND message_id = ?2",
                    params![user_id, message_id],
                    |row| row.get(0),
                )
                .optional()?;

            if let Some(like_id) = existing {
                tx.execute("DELETE FROM likes WHERE id = ?1", [like_id])?;
            } else {
                tx.execute(
                    "INSERT INTO likes (user_id, message_id) VALUES (?1, ?2)",
                    params![user_id, message_id],
                )?;
            }

            tx.commit()?;
            Ok(existing.is_none())
        })?;

        debug!(user_id, message_id, added, "Like toggled");
        Ok(added)
    }

    /// Drops every like the user has made. Returns how many rows went away.
    pub fn clear_likes(&self, user_id: i64) -> DbResult<usize> {
        self.with_conn(|conn| Ok(conn.execute("DELETE FROM likes WHERE user_id = ?1", [user_id])?))
    }

    /// Like rows for the user, in the order they were made.
    pub fn likes(&self, user_id: i64) -> DbResult<Vec<LikeRow>> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare("SELECT id, user_id, message_id FROM likes WHERE user_id = ?1 ORDER BY id")?;
            let rows = stmt
                .query_map([user_id], |row| {
                    Ok(LikeRow {
                        id: row.get(0)?,
                        user_id: row.get(1)?,
                        message_id: row.get(2)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Messages the user liked, most recent like first.
    pub fn liked_messages(&self, user_id: i64) -> DbResult<Vec<MessageRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "{MESSAGE_SELECT}
                 JOIN likes l ON l.message_id = m.id
                 WHERE l.user_id = ?1
                 ORDER BY l.id DESC"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([user_id], message_from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }
}
