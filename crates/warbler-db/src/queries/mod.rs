mod follows;
mod likes;
mod messages;
mod users;

pub use messages::TIMELINE_LIMIT;

use rusqlite::Row;

use crate::models::{MessageRow, UserRow};

const USER_COLUMNS: &str =
    "u.id, u.email, u.username, u.image_url, u.header_image_url, u.bio, u.location, u.password";

// JOIN users to fetch the author's display fields in a single query (no N+1)
const MESSAGE_SELECT: &str = "SELECT m.id, m.text, m.timestamp, m.user_id, u.username, u.image_url
     FROM messages m
     JOIN users u ON m.user_id = u.id";

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        email: row.get(1)?,
        username: row.get(2)?,
        image_url: row.get(3)?,
        header_image_url: row.get(4)?,
        bio: row.get(5)?,
        location: row.get(6)?,
        password: row.get(7)?,
    })
}

fn message_from_row(row: &Row<'_>) -> rusqlite::Result<MessageRow> {
    Ok(MessageRow {
        id: row.get(0)?,
        text: row.get(1)?,
        timestamp: row.get(2)?,
        user_id: row.get(3)?,
        author_username: row.get(4)?,
        author_image_url: row.get(5)?,
    })
}

#[cfg(test)]
pub(crate) mod fixtures {
    use rstest::fixture;

    use crate::Database;
    use crate::models::NewUser;

    pub struct Seeded {
        pub db: Database,
        pub user1: i64,
        pub user2: i64,
        pub user3: i64,
    }

    /// Three users with placeholder password hashes.
    #[fixture]
    pub fn seeded() -> Seeded {
        let db = Database::open_in_memory().unwrap();
        let create = |name: &str| {
            let email = format!("{name}@gmail.com");
            db.create_user(&NewUser {
                username: name,
                email: &email,
                password_hash: "HASHED_PASSWORD",
                image_url: None,
            })
            .unwrap()
            .id
        };
        let (user1, user2, user3) = (create("test1"), create("test2"), create("test3"));
        Seeded {
            db,
            user1,
            user2,
            user3,
        }
    }
}
