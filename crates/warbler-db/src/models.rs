//! Database row types. These map directly to SQLite rows and are kept
//! distinct from warbler-types view models so the password hash stays here.
use chrono::{DateTime, NaiveDateTime, Utc};
use tracing::warn;
use warbler_types::models::{Message, User};

#[derive(Debug, Clone)]
pub struct UserRow {
    pub id: i64,
    pub email: String,
    pub username: String,
    pub image_url: String,
    pub header_image_url: String,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub password: String,
}

/// Insert payload. `password` must already be hashed.
#[derive(Debug, Clone)]
pub struct NewUser<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub image_url: Option<&'a str>,
}

/// Profile update. `None` image URLs reset to the defaults.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub username: String,
    pub email: String,
    pub image_url: Option<String>,
    pub header_image_url: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
}

/// Message joined with its author's display fields.
#[derive(Debug, Clone)]
pub struct MessageRow {
    pub id: i64,
    pub text: String,
    pub timestamp: String,
    pub user_id: i64,
    pub author_username: String,
    pub author_image_url: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProfileCounts {
    pub messages: usize,
    pub following: usize,
    pub followers: usize,
    pub likes: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LikeRow {
    pub id: i64,
    pub user_id: i64,
    pub message_id: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FollowRow {
    pub user_being_followed_id: i64,
    pub user_following_id: i64,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            username: row.username,
            email: row.email,
            image_url: row.image_url,
            header_image_url: row.header_image_url,
            bio: row.bio,
            location: row.location,
        }
    }
}

impl From<MessageRow> for Message {
    fn from(row: MessageRow) -> Self {
        let timestamp = parse_timestamp(&row.timestamp).unwrap_or_else(|| {
            warn!("Corrupt timestamp '{}' on message {}", row.timestamp, row.id);
            DateTime::default()
        });

        Message {
            id: row.id,
            text: row.text,
            timestamp,
            user_id: row.user_id,
            author_username: row.author_username,
            author_image_url: row.author_image_url,
        }
    }
}

/// SQLite stores timestamps as "YYYY-MM-DD HH:MM:SS.SSS" without a timezone.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    raw.parse::<DateTime<Utc>>().ok().or_else(|| {
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f")
            .ok()
            .map(|ndt| ndt.and_utc())
    })
}
