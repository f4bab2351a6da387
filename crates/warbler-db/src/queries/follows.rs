use rusqlite::params;
use tracing::debug;

use super::{USER_COLUMNS, user_from_row};
use crate::models::{FollowRow, UserRow};
use crate::{Database, DbResult};

impl Database {
    // -- Follows --

    /// Adds the edge `follower -> followee`. An existing edge is a `Conflict`.
    pub fn add_follow(&self, follower: i64, followee: i64) -> DbResult<FollowRow> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO follows (user_being_followed_id, user_following_id) VALUES (?1, ?2)",
                params![followee, follower],
            )?;
            Ok(())
        })?;

        debug!(follower, followee, "Follow added");
        Ok(FollowRow {
            user_being_followed_id: followee,
            user_following_id: follower,
        })
    }

    pub fn remove_follow(&self, follower: i64, followee: i64) -> DbResult<bool> {
        self.with_conn(|conn| {
            Ok(conn.execute(
                "DELETE FROM follows WHERE user_being_followed_id = ?1 AND user_following_id = ?2",
                params![followee, follower],
            )? > 0)
        })
    }

    /// True iff `user` follows `other`.
    pub fn is_following(&self, user: i64, other: i64) -> DbResult<bool> {
        self.with_conn(|conn| {
            Ok(conn.query_row(
                "SELECT EXISTS (SELECT 1 FROM follows
                                WHERE user_following_id = ?1 AND user_being_followed_id = ?2)",
                params![user, other],
                |r| r.get(0),
            )?)
        })
    }

    /// True iff `other` follows `user`.
    pub fn is_followed_by(&self, user: i64, other: i64) -> DbResult<bool> {
        self.is_following(other, user)
    }

    /// Users that `user_id` follows, in user id order.
    pub fn following(&self, user_id: i64) -> DbResult<Vec<UserRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {USER_COLUMNS} FROM follows f
                 JOIN users u ON u.id = f.user_being_followed_id
                 WHERE f.user_following_id = ?1
                 ORDER BY u.id"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([user_id], user_from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Users following `user_id`, in user id order.
    pub fn followers(&self, user_id: i64) -> DbResult<Vec<UserRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {USER_COLUMNS} FROM follows f
                 JOIN users u ON u.id = f.user_following_id
                 WHERE f.user_being_followed_id = ?1
                 ORDER BY u.id"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([user_id], user_from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use crate::DbError;
    use crate::queries::fixtures::{Seeded, seeded};

    #[rstest]
    fn following_is_asymmetric(seeded: Seeded) {
        let db = &seeded.db;
        db.add_follow(seeded.user1, seeded.user2).unwrap();

        assert!(db.is_following(seeded.user1, seeded.user2).unwrap());
        assert!(!db.is_following(seeded.user2, seeded.user1).unwrap());
    }

    #[rstest]
    fn followed_by_is_the_reverse_edge(seeded: Seeded) {
        let db = &seeded.db;
        db.add_follow(seeded.user1, seeded.user2).unwrap();

        assert!(db.is_followed_by(seeded.user2, seeded.user1).unwrap());
        assert!(!db.is_followed_by(seeded.user1, seeded.user2).unwrap());
    }

    #[rstest]
    fn duplicate_edge_is_rejected(seeded: Seeded) {
        let db = &seeded.db;
        db.add_follow(seeded.user1, seeded.user2).unwrap();
        let err = db.add_follow(seeded.user1, seeded.user2).unwrap_err();
        assert!(err.is_conflict_on("follows.user_following_id"), "unexpected error: {err:?}");
    }

    #[rstest]
    fn edge_requires_existing_users(seeded: Seeded) {
        let err = seeded.db.add_follow(seeded.user1, 4242).unwrap_err();
        assert!(matches!(err, DbError::MissingReference));
    }

    #[rstest]
    fn lists_both_directions(seeded: Seeded) {
        let db = &seeded.db;
        db.add_follow(seeded.user3, seeded.user1).unwrap();
        db.add_follow(seeded.user1, seeded.user3).unwrap();
        db.add_follow(seeded.user3, seeded.user2).unwrap();

        let following: Vec<_> = db
            .following(seeded.user3)
            .unwrap()
            .into_iter()
            .map(|u| u.username)
            .collect();
        assert_eq!(following, ["test1", "test2"]);

        let followers: Vec<_> = db
            .followers(seeded.user3)
            .unwrap()
            .into_iter()
            .map(|u| u.username)
            .collect();
        assert_eq!(followers, ["test1"]);
    }

    #[rstest]
    fn unfollow_removes_only_that_edge(seeded: Seeded) {
        let db = &seeded.db;
        db.add_follow(seeded.user1, seeded.user2).unwrap();
        db.add_follow(seeded.user2, seeded.user1).unwrap();

        assert!(db.remove_follow(seeded.user1, seeded.user2).unwrap());
        assert!(!db.remove_follow(seeded.user1, seeded.user2).unwrap());
        assert!(db.is_following(seeded.user2, seeded.user1).unwrap());
    }
}
