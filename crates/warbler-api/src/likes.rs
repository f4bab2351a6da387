use axum::{
    extract::{Path, State},
    response::Response,
};
use tracing::warn;

use crate::middleware::AuthContext;
use crate::{AppError, AppState, redirect_to, with_db};

/// POST /users/add_like/{message_id}: like, or un-like if already liked.
/// Users cannot like their own messages.
pub async fn toggle_like(
    State(state): State<AppState>,
    Path(message_id): Path<i64>,
    auth: AuthContext,
) -> Result<Response, AppError> {
    let user_id = auth.require()?.id;

    let msg = with_db(&state, move |db| db.get_message(message_id))
        .await?
        .ok_or(AppError::NotFound)?;

    if msg.user_id == user_id {
        warn!(user_id, message_id, "Refused like of own message");
        return Err(AppError::Unauthorized);
    }

    with_db(&state, move |db| db.toggle_like(user_id, message_id)).await?;
    Ok(redirect_to("/"))
}
