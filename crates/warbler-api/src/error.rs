use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use tera::Context;
use thiserror::Error;
use tracing::{error, warn};

use warbler_db::DbError;

use crate::accounts::AccountError;
use crate::templates::render;

/// Marker shown whenever a login or ownership check fails.
pub const ACCESS_UNAUTHORIZED: &str = "Access unauthorized.";

#[derive(Debug, Error)]
pub enum AppError {
    /// Not logged in, or not the owner. Answered with 200 and the marker
    /// page, never with 401/403.
    #[error("access unauthorized")]
    Unauthorized,

    #[error("not found")]
    NotFound,

    #[error(transparent)]
    Db(#[from] DbError),

    #[error(transparent)]
    Account(#[from] AccountError),

    #[error("template error: {0}")]
    Template(#[from] tera::Error),

    #[error("session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    #[error("background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("{0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Unauthorized => {
                let mut ctx = Context::new();
                ctx.insert("alerts", &[ACCESS_UNAUTHORIZED]);
                match render("denied.html", &ctx) {
                    Ok(html) => (StatusCode::OK, html).into_response(),
                    Err(e) => {
                        error!("Failed to render denial page: {}", e);
                        (StatusCode::OK, Html(ACCESS_UNAUTHORIZED)).into_response()
                    }
                }
            }
            AppError::NotFound => {
                let mut ctx = Context::new();
                ctx.insert("alerts", &Vec::<String>::new());
                match render("404.html", &ctx) {
                    Ok(html) => (StatusCode::NOT_FOUND, html).into_response(),
                    Err(_) => StatusCode::NOT_FOUND.into_response(),
                }
            }
            AppError::Db(DbError::Conflict { target }) => {
                warn!("Unhandled conflict on {}", target);
                (StatusCode::CONFLICT, "Conflict").into_response()
            }
            other => {
                error!("Internal error: {}", other);
                (StatusCode::INTERNAL_SERVER_ERROR, "An internal error occurred").into_response()
            }
        }
    }
}
