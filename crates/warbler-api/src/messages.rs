use axum::{
    Form,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use tracing::{info, warn};
use validator::Validate;

use warbler_types::MAX_MESSAGE_LEN;
use warbler_types::forms::{MessageForm, error_messages};
use warbler_types::models::{Message, MessageCard};

use crate::middleware::AuthContext;
use crate::templates::{page, render};
use crate::{AppError, AppState, redirect_to, with_db};

/// GET /messages/new
pub async fn new_message_form(auth: AuthContext) -> Result<Response, AppError> {
    auth.require()?;

    let mut ctx = page(&auth);
    ctx.insert("text", "");
    ctx.insert("max_len", &MAX_MESSAGE_LEN);
    Ok(render("messages/new.html", &ctx)?.into_response())
}

/// POST /messages/new
///
/// The owner is always the session user. A payload naming a different
/// `user_id` is refused outright; a supplied `timestamp` is ignored.
pub async fn add_message(
    State(state): State<AppState>,
    auth: AuthContext,
    Form(form): Form<MessageForm>,
) -> Result<Response, AppError> {
    let user_id = auth.require()?.id;

    if form.claims_other_owner(user_id) {
        warn!(user_id, claimed = ?form.user_id, "Message payload claims another owner");
        return Err(AppError::Unauthorized);
    }

    if let Err(errors) = form.validate() {
        let mut ctx = page(&auth);
        ctx.insert("alerts", &error_messages(&errors));
        ctx.insert("text", &form.text);
        ctx.insert("max_len", &MAX_MESSAGE_LEN);
        return Ok(render("messages/new.html", &ctx)?.into_response());
    }

    let text = form.text;
    let msg = with_db(&state, move |db| db.insert_message(user_id, &text)).await?;
    info!(user_id, message_id = msg.id, "Message posted");

    Ok(redirect_to(&format!("/users/{}", user_id)))
}

/// GET /messages/{id}
pub async fn show_message(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    auth: AuthContext,
) -> Result<Response, AppError> {
    let row = with_db(&state, move |db| db.get_message(id))
        .await?
        .ok_or(AppError::NotFound)?;

    let mut ctx = page(&auth);
    ctx.insert("msg", &MessageCard::new(Message::from(row), false));
    Ok(render("messages/show.html", &ctx)?.into_response())
}

/// POST /messages/{id}/delete: owner only.
pub async fn delete_message(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    auth: AuthContext,
) -> Result<Response, AppError> {
    let user_id = auth.require()?.id;

    let msg = with_db(&state, move |db| db.get_message(id))
        .await?
        .ok_or(AppError::NotFound)?;
    auth.require_owner(msg.user_id)?;

    with_db(&state, move |db| db.delete_message(id)).await?;
    info!(user_id, message_id = id, "Message deleted");

    Ok(redirect_to(&format!("/users/{}", user_id)))
}
