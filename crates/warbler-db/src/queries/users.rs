use rusqlite::{OptionalExtension, params};
use tracing::info;
use warbler_types::{DEFAULT_HEADER_IMAGE_URL, DEFAULT_IMAGE_URL};

use super::{USER_COLUMNS, user_from_row};
use crate::models::{NewUser, ProfileCounts, UserChanges, UserRow};
use crate::{Database, DbResult};

impl Database {
    /// Single atomic insert. A taken username or email comes back as
    /// `DbError::Conflict` naming `users.username` or `users.email`.
    pub fn create_user(&self, new: &NewUser<'_>) -> DbResult<UserRow> {
        let id = self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (username, email, password, image_url) VALUES (?1, ?2, ?3, ?4)",
                params![
                    new.username,
                    new.email,
                    new.password_hash,
                    new.image_url.unwrap_or(DEFAULT_IMAGE_URL),
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })?;

        info!(user_id = id, username = new.username, "User created");
        self.require_user(id)
    }

    pub fn get_user(&self, id: i64) -> DbResult<Option<UserRow>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {USER_COLUMNS} FROM users u WHERE u.id = ?1");
            Ok(conn.query_row(&sql, [id], user_from_row).optional()?)
        })
    }

    pub fn get_user_by_username(&self, username: &str) -> DbResult<Option<UserRow>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {USER_COLUMNS} FROM users u WHERE u.username = ?1");
            Ok(conn.query_row(&sql, [username], user_from_row).optional()?)
        })
    }

    /// All users in id order, optionally filtered by a username substring.
    pub fn list_users(&self, search: Option<&str>) -> DbResult<Vec<UserRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {USER_COLUMNS} FROM users u
                 WHERE ?1 IS NULL OR u.username LIKE ?1 ESCAPE '\\'
                 ORDER BY u.id"
            );
            let pattern = search.map(|q| format!("%{}%", escape_like(q)));
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([pattern], user_from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Message, following, follower and like counts for a profile header.
    pub fn profile_counts(&self, user_id: i64) -> DbResult<ProfileCounts> {
        self.with_conn(|conn| {
            Ok(conn.query_row(
                "SELECT
                    (SELECT COUNT(*) FROM messages WHERE user_id = ?1),
                    (SELECT COUNT(*) FROM follows WHERE user_following_id = ?1),
                    (SELECT COUNT(*) FROM follows WHERE user_being_followed_id = ?1),
                    (SELECT COUNT(*) FROM likes WHERE user_id = ?1)",
                [user_id],
                |r| {
                    Ok(ProfileCounts {
                        messages: r.get::<_, i64>(0)? as usize,
                        following: r.get::<_, i64>(1)? as usize,
                        followers: r.get::<_, i64>(2)? as usize,
                        likes: r.get::<_, i64>(3)? as usize,
                    })
                },
            )?)
        })
    }

    pub fn update_user(&self, id: i64, changes: &UserChanges) -> DbResult<Option<UserRow>> {
        let updated = self.with_conn(|conn| {
            Ok(conn.execute(
                "UPDATE users
                 SET username = ?2, email = ?3, image_url = ?4, header_image_url = ?5,
                     bio = ?6, location = ?7
                 WHERE id = ?1",
                params![
                    id,
                    changes.username,
                    changes.email,
                    changes.image_url.as_deref().unwrap_or(DEFAULT_IMAGE_URL),
                    changes.header_image_url.as_deref().unwrap_or(DEFAULT_HEADER_IMAGE_URL),
                    changes.bio,
                    changes.location,
                ],
            )?)
        })?;

        if updated == 0 {
            return Ok(None);
        }
        self.get_user(id)
    }

    /// Removes the user. Messages, follows and likes go with it (ON DELETE CASCADE).
    pub fn delete_user(&self, id: i64) -> DbResult<bool> {
        let deleted = self.with_conn(|conn| Ok(conn.execute("DELETE FROM users WHERE id = ?1", [id])?))?;
        if deleted > 0 {
            info!(user_id = id, "User deleted");
        }
        Ok(deleted > 0)
    }

    fn require_user(&self, id: i64) -> DbResult<UserRow> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {USER_COLUMNS} FROM users u WHERE u.id = ?1");
            Ok(conn.query_row(&sql, [id], user_from_row)?)
        })
    }
}

/// Escape LIKE wildcards so user input only matches literally.
fn escape_like(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
