use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use thiserror::Error;
use tracing::warn;
use validator::Validate;

use warbler_db::models::{NewUser, UserChanges, UserRow};
use warbler_db::{Database, DbError};
use warbler_types::forms::{ProfileForm, SignupForm, error_messages};

#[derive(Debug, Error)]
pub enum AccountError {
    #[error("{}", .0.join(" "))]
    Invalid(Vec<String>),

    #[error("Username already taken.")]
    UsernameTaken,

    #[error("Email already registered.")]
    EmailTaken,

    #[error("Wrong password, please try again.")]
    WrongPassword,

    #[error("no such user")]
    UnknownUser,

    #[error("password hashing failed: {0}")]
    Hash(String),

    #[error(transparent)]
    Db(DbError),
}

impl From<DbError> for AccountError {
    fn from(err: DbError) -> Self {
        if err.is_conflict_on("users.username") {
            AccountError::UsernameTaken
        } else if err.is_conflict_on("users.email") {
            AccountError::EmailTaken
        } else {
            AccountError::Db(err)
        }
    }
}

/// Validate the form, hash the password with Argon2id and insert the user.
/// A taken username or email fails here, at the call site.
pub fn signup(db: &Database, form: &SignupForm) -> Result<UserRow, AccountError> {
    form.validate()
        .map_err(|e| AccountError::Invalid(error_messages(&e)))?;

    let password_hash = hash_password(&form.password)?;

    let user = db.create_user(&NewUser {
        username: form.username.trim(),
        email: form.email.trim(),
        password_hash: &password_hash,
        image_url: form.image_url.as_deref(),
    })?;

    Ok(user)
}

/// `Some(user)` only when the username exists and the password matches.
pub fn authenticate(
    db: &Database,
    username: &str,
    password: &str,
) -> Result<Option<UserRow>, AccountError> {
    let Some(user) = db.get_user_by_username(username)? else {
        return Ok(None);
    };

    Ok(verify_password(&user, password).then_some(user))
}

/// Apply a profile edit after re-checking the current password.
pub fn update_profile(
    db: &Database,
    user_id: i64,
    form: &ProfileForm,
) -> Result<UserRow, AccountError> {
    form.validate()
        .map_err(|e| AccountError::Invalid(error_messages(&e)))?;

    let user = db.get_user(user_id)?.ok_or(AccountError::UnknownUser)?;
    if !verify_password(&user, &form.password) {
        return Err(AccountError::WrongPassword);
    }

    let changes = UserChanges {
        username: form.username.trim().to_string(),
        email: form.email.trim().to_string(),
        image_url: form.image_url.clone(),
        header_image_url: form.header_image_url.clone(),
        bio: form.bio.clone(),
        location: form.location.clone(),
    };

    db.update_user(user_id, &changes)?
        .ok_or(AccountError::UnknownUser)
}

fn hash_password(password: &str) -> Result<String, AccountError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AccountError::Hash(e.to_string()))
}

fn verify_password(user: &UserRow, password: &str) -> bool {
    let parsed = match PasswordHash::new(&user.password) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!(user_id = user.id, "Stored password hash is unreadable: {}", e);
            return false;
        }
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};

    use super::*;

    fn form(username: &str, email: &str) -> SignupForm {
        SignupForm {
            username: username.into(),
            email: email.into(),
            password: "password".into(),
            image_url: None,
        }
    }

    #[fixture]
    fn db() -> Database {
        let db = Database::open_in_memory().unwrap();
        signup(&db, &form("test1", "jenkins@gmail.com")).unwrap();
        db
    }

    #[rstest]
    fn password_is_stored_hashed(db: Database) {
        let user = db.get_user_by_username("test1").unwrap().unwrap();
        assert_ne!(user.password, "password");
        assert!(user.password.starts_with("$argon2"));
    }

    #[rstest]
    fn authenticate_accepts_correct_password(db: Database) {
        let user = authenticate(&db, "test1", "password").unwrap().unwrap();
        assert_eq!(user.username, "test1");
    }

    #[rstest]
    #[case::unknown_username("dumbusername", "password")]
    #[case::wrong_password("test1", "dumbpassword")]
    fn authenticate_failures_are_none(db: Database, #[case] username: &str, #[case] password: &str) {
        assert!(authenticate(&db, username, password).unwrap().is_none());
    }

    #[rstest]
    fn unreadable_hash_never_authenticates(db: Database) {
        db.create_user(&NewUser {
            username: "legacy",
            email: "legacy@test.com",
            password_hash: "HASHED_PASSWORD",
            image_url: None,
        })
        .unwrap();
        assert!(authenticate(&db, "legacy", "HASHED_PASSWORD").unwrap().is_none());
    }

    #[rstest]
    fn duplicate_username_is_typed(db: Database) {
        let err = signup(&db, &form("test1", "other@gmail.com")).unwrap_err();
        assert!(matches!(err, AccountError::UsernameTaken));
    }

    #[rstest]
    fn duplicate_email_is_typed(db: Database) {
        let err = signup(&db, &form("test9", "jenkins@gmail.com")).unwrap_err();
        assert!(matches!(err, AccountError::EmailTaken));
    }

    #[rstest]
    fn invalid_fields_never_reach_the_database(db: Database) {
        let err = signup(&db, &form("", "hello@gmail..com")).unwrap_err();
        match err {
            AccountError::Invalid(messages) => assert_eq!(messages.len(), 2),
            other => panic!("expected validation failure, got {other:?}"),
        }
        assert_eq!(db.list_users(None).unwrap().len(), 1);
    }

    #[rstest]
    fn blank_username_is_never_stored(db: Database) {
        let err = signup(&db, &form("   ", "blank@gmail.com")).unwrap_err();
        assert!(matches!(err, AccountError::Invalid(_)));

        let id = db.get_user_by_username("test1").unwrap().unwrap().id;
        let edit = ProfileForm {
            username: " \t ".into(),
            email: "jenkins@gmail.com".into(),
            image_url: None,
            header_image_url: None,
            bio: None,
            location: None,
            password: "password".into(),
        };
        let err = update_profile(&db, id, &edit).unwrap_err();
        assert!(matches!(err, AccountError::Invalid(_)));

        assert_eq!(db.list_users(None).unwrap().len(), 1);
        assert!(db.get_user_by_username("test1").unwrap().is_some());
    }

    #[rstest]
    fn profile_update_requires_current_password(db: Database) {
        let id = db.get_user_by_username("test1").unwrap().unwrap().id;
        let mut edit = ProfileForm {
            username: "test1".into(),
            email: "jenkins@gmail.com".into(),
            image_url: None,
            header_image_url: None,
            bio: Some("bird watcher".into()),
            location: None,
            password: "nope".into(),
        };

        let err = update_profile(&db, id, &edit).unwrap_err();
        assert!(matches!(err, AccountError::WrongPassword));

        edit.password = "password".into();
        let user = update_profile(&db, id, &edit).unwrap();
        assert_eq!(user.bio.as_deref(), Some("bird watcher"));
    }
}
