pub mod forms;
pub mod models;

/// Longest message body accepted, in characters.
pub const MAX_MESSAGE_LEN: u64 = 140;

pub const DEFAULT_IMAGE_URL: &str = "/static/images/default-pic.png";
pub const DEFAULT_HEADER_IMAGE_URL: &str = "/static/images/warbler-hero.png";
