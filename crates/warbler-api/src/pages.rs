use std::collections::HashSet;

use axum::{
    extract::State,
    response::{IntoResponse, Response},
};

use warbler_db::Database;
use warbler_db::models::MessageRow;
use warbler_db::queries::TIMELINE_LIMIT;
use warbler_types::models::{Message, MessageCard};

use crate::middleware::AuthContext;
use crate::templates::{page, render};
use crate::{AppError, AppState, with_db};

/// GET /: landing page for visitors, timeline for logged-in users.
pub async fn home(State(state): State<AppState>, auth: AuthContext) -> Result<Response, AppError> {
    let Some(user) = auth.user() else {
        return Ok(render("home-anon.html", &page(&auth))?.into_response());
    };

    let user_id = user.id;
    let messages = with_db(&state, move |db| {
        let rows = db.timeline(user_id, TIMELINE_LIMIT)?;
        message_cards(db, rows, Some(user_id))
    })
    .await?;

    let mut ctx = page(&auth);
    ctx.insert("messages", &messages);
    Ok(render("home.html", &ctx)?.into_response())
}

pub async fn not_found() -> AppError {
    AppError::NotFound
}

/// Resolve the viewer's like state for a list of messages.
pub(crate) fn message_cards(
    db: &Database,
    rows: Vec<MessageRow>,
    viewer: Option<i64>,
) -> Result<Vec<MessageCard>, warbler_db::DbError> {
    let liked: HashSet<i64> = match viewer {
        Some(id) => db.likes(id)?.into_iter().map(|l| l.message_id).collect(),
        None => HashSet::new(),
    };

    Ok(rows
        .into_iter()
        .map(|row| {
            let liked = liked.contains(&row.id);
            MessageCard::new(Message::from(row), liked)
        })
        .collect())
}
