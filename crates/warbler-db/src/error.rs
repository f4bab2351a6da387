use rusqlite::ErrorCode;
use rusqlite::ffi;
use thiserror::Error;

pub type DbResult<T> = Result<T, DbError>;

/// Storage errors, with constraint failures classified so callers can
/// branch on them right where the insert or update happens.
#[derive(Debug, Error)]
pub enum DbError {
    /// A UNIQUE or PRIMARY KEY constraint rejected the write.
    /// `target` is SQLite's column list, e.g. `users.username`.
    #[error("already exists: {target}")]
    Conflict { target: String },

    /// A FOREIGN KEY constraint rejected the write.
    #[error("referenced row does not exist")]
    MissingReference,

    /// NOT NULL or CHECK failure.
    #[error("invalid value: {0}")]
    Invalid(String),

    #[error("database lock poisoned")]
    LockPoisoned,

    #[error(transparent)]
    Sqlite(rusqlite::Error),
}

impl DbError {
    /// True for a conflict on `column`, given as `table.column`.
    pub fn is_conflict_on(&self, column: &str) -> bool {
        match self {
            DbError::Conflict { target } => target.split(", ").any(|c| c == column),
            _ => false,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(err: rusqlite::Error) -> Self {
        let (code, detail) = match err {
            rusqlite::Error::SqliteFailure(e, detail) if e.code == ErrorCode::ConstraintViolation => {
                (e.extended_code, detail.unwrap_or_default())
            }
            other => return DbError::Sqlite(other),
        };

        match code {
            ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY => DbError::Conflict {
                target: detail
                    .rsplit_once(": ")
                    .map(|(_, cols)| cols.to_string())
                    .unwrap_or(detail),
            },
            ffi::SQLITE_CONSTRAINT_FOREIGNKEY => DbError::MissingReference,
            _ => DbError::Invalid(detail),
        }
    }
}
