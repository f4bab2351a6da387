use chrono::{DateTime, Utc};
use serde::Serialize;

/// Public view of an account. The password hash never leaves the db crate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub image_url: String,
    pub header_image_url: String,
    pub bio: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Message {
    pub id: i64,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    pub user_id: i64,
    pub author_username: String,
    pub author_image_url: String,
}

impl Message {
    /// Short human date used by the message cards, e.g. "14 October 2026".
    pub fn posted_on(&self) -> String {
        self.timestamp.format("%d %B %Y").to_string()
    }
}

/// Message as rendered in a list, with the viewer's like state resolved.
#[derive(Debug, Clone, Serialize)]
pub struct MessageCard {
    #[serde(flatten)]
    pub message: Message,
    pub posted_on: String,
    pub liked: bool,
}

impl MessageCard {
    pub fn new(message: Message, liked: bool) -> Self {
        Self {
            posted_on: message.posted_on(),
            message,
            liked,
        }
    }
}

/// Header block shared by the profile, following, followers and likes pages.
#[derive(Debug, Clone, Serialize)]
pub struct Profile {
    pub user: User,
    pub message_count: usize,
    pub following_count: usize,
    pub followers_count: usize,
    pub likes_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn message() -> Message {
        Message {
            id: 1,
            text: "Hello".into(),
            timestamp: Utc.with_ymd_and_hms(2017, 1, 21, 11, 4, 53).unwrap(),
            user_id: 1001,
            author_username: "test1".into(),
            author_image_url: crate::DEFAULT_IMAGE_URL.into(),
        }
    }

    #[test]
    fn card_formats_date() {
        let card = MessageCard::new(message(), true);
        assert_eq!(card.posted_on, "21 January 2017");
    }

    #[test]
    fn card_flattens_message_fields() {
        let value = serde_json::to_value(MessageCard::new(message(), false)).unwrap();
        assert_eq!(value["text"], "Hello");
        assert_eq!(value["user_id"], 1001);
        assert_eq!(value["liked"], false);
    }
}
