use serde::{Deserialize, Deserializer};
use validator::{Validate, ValidationError, ValidationErrors};

// -- Accounts --

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SignupForm {
    #[validate(
        length(max = 50, message = "Username must be 1 to 50 characters."),
        custom(function = "username_present")
    )]
    pub username: String,
    #[validate(email(message = "Invalid email address."))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters."))]
    pub password: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    #[validate(url(message = "Image URL must be a valid URL."))]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginForm {
    #[validate(length(min = 1, message = "Username is required."))]
    pub username: String,
    #[validate(length(min = 1, message = "Password is required."))]
    pub password: String,
}

/// Profile edit. `password` is the current password, re-checked before any change.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ProfileForm {
    #[validate(
        length(max = 50, message = "Username must be 1 to 50 characters."),
        custom(function = "username_present")
    )]
    pub username: String,
    #[validate(email(message = "Invalid email address."))]
    pub email: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    #[validate(url(message = "Image URL must be a valid URL."))]
    pub image_url: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    #[validate(url(message = "Header image URL must be a valid URL."))]
    pub header_image_url: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub bio: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub location: Option<String>,
    pub password: String,
}

// -- Messages --

/// New message payload. `user_id` and `timestamp` are never trusted: the
/// owner always comes from the session, the timestamp from the database.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct MessageForm {
    #[validate(length(min = 1, max = 140, message = "Message must be 1 to 140 characters."))]
    pub text: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub user_id: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub timestamp: Option<String>,
}

impl MessageForm {
    /// True when the payload names an owner other than `session_user`.
    pub fn claims_other_owner(&self, session_user: i64) -> bool {
        match &self.user_id {
            None => false,
            Some(claimed) => claimed.trim().parse::<i64>().ok() != Some(session_user),
        }
    }
}

// -- Queries --

#[derive(Debug, Default, Deserialize)]
pub struct UserSearch {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub q: Option<String>,
}

/// Flatten validation failures into display strings, ordered by field name.
pub fn error_messages(errors: &ValidationErrors) -> Vec<String> {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    fields
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter()
                .map(|e| match &e.message {
                    Some(msg) => msg.to_string(),
                    None => format!("{}: {}", field, e.code),
                })
                .collect::<Vec<_>>()
        })
        .collect()
}

/// Usernames are stored trimmed, so whitespace alone counts as missing.
fn username_present(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("Username must be 1 to 50 characters.".into());
        return Err(err);
    }
    Ok(())
}

/// HTML forms submit blank inputs as empty strings.
fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signup(username: &str, email: &str, password: &str) -> SignupForm {
        SignupForm {
            username: username.into(),
            email: email.into(),
            password: password.into(),
            image_url: None,
        }
    }

    #[test]
    fn valid_signup_passes() {
        assert!(signup("test1", "jenkins@gmail.com", "password").validate().is_ok());
    }

    #[test]
    fn malformed_email_is_rejected() {
        let errors = signup("test1", "hello@gmail..com", "password")
            .validate()
            .unwrap_err();
        assert_eq!(error_messages(&errors), vec!["Invalid email address."]);
    }

    #[test]
    fn missing_username_and_short_password_both_reported() {
        let errors = signup("", "a@b.com", "abc").validate().unwrap_err();
        assert_eq!(
            error_messages(&errors),
            vec![
                "Password must be at least 6 characters.",
                "Username must be 1 to 50 characters.",
            ]
        );
    }

    #[test]
    fn whitespace_username_is_missing() {
        let errors = signup("   ", "a@b.com", "password").validate().unwrap_err();
        assert_eq!(error_messages(&errors), vec!["Username must be 1 to 50 characters."]);
        assert!(signup(" test1 ", "a@b.com", "password").validate().is_ok());
    }

    #[test]
    fn message_length_is_bounded() {
        let form = MessageForm {
            text: "x".repeat(141),
            user_id: None,
            timestamp: None,
        };
        assert!(form.validate().is_err());

        let form = MessageForm {
            text: "x".repeat(140),
            ..form
        };
        assert!(form.validate().is_ok());
    }

    #[test]
    fn foreign_owner_claim_is_detected() {
        let mut form = MessageForm {
            text: "Hello".into(),
            user_id: None,
            timestamp: None,
        };
        assert!(!form.claims_other_owner(1001));

        form.user_id = Some("1001".into());
        assert!(!form.claims_other_owner(1001));

        form.user_id = Some("99".into());
        assert!(form.claims_other_owner(1001));

        form.user_id = Some("not-a-number".into());
        assert!(form.claims_other_owner(1001));
    }
}
