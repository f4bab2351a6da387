use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;
use tracing::warn;

use warbler_types::models::User;

use crate::{AppError, AppState, with_db};

/// Session key holding the logged-in user's id.
pub const CURR_USER_KEY: &str = "curr_user";

/// Who is making the request. Built from the session for every handler
/// that asks for it; handlers gate on `require` / `require_owner`.
pub struct AuthContext {
    session: Session,
    user: Option<User>,
}

impl AuthContext {
    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    /// The logged-in user, or `AppError::Unauthorized`.
    pub fn require(&self) -> Result<&User, AppError> {
        self.user.as_ref().ok_or_else(|| {
            warn!("Rejected anonymous request");
            AppError::Unauthorized
        })
    }

    /// The logged-in user, provided they are `owner_id`.
    pub fn require_owner(&self, owner_id: i64) -> Result<&User, AppError> {
        let user = self.require()?;
        if user.id != owner_id {
            warn!(user_id = user.id, owner_id, "Rejected non-owner request");
            return Err(AppError::Unauthorized);
        }
        Ok(user)
    }

    pub async fn login(&self, user_id: i64) -> Result<(), AppError> {
        self.session.cycle_id().await?;
        self.session.insert(CURR_USER_KEY, user_id).await?;
        Ok(())
    }

    pub async fn logout(&self) -> Result<(), AppError> {
        self.session.flush().await?;
        Ok(())
    }
}

impl FromRequestParts<AppState> for AuthContext {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(|(_, msg)| AppError::Internal(msg.to_string()))?;

        let Some(user_id) = session.get::<i64>(CURR_USER_KEY).await? else {
            return Ok(Self { session, user: None });
        };

        let user = with_db(state, move |db| db.get_user(user_id)).await?;
        if user.is_none() {
            // Account deleted while the session was alive
            warn!(user_id, "Session points at a missing user");
            session.remove::<i64>(CURR_USER_KEY).await?;
        }

        Ok(Self {
            session,
            user: user.map(User::from),
        })
    }
}
