pub mod accounts;
pub mod auth;
pub mod error;
pub mod likes;
pub mod messages;
pub mod middleware;
pub mod pages;
pub mod templates;
pub mod users;

use axum::{
    Router,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use warbler_db::Database;

pub use auth::{AppState, AppStateInner};
pub use error::AppError;

/// Build the full application router. Sessions live in memory and expire
/// after `session_idle_minutes` of inactivity.
pub fn router(state: AppState) -> Router {
    let session_layer = SessionManagerLayer::new(MemoryStore::default())
        .with_name("warbler_session")
        .with_secure(false)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::minutes(
            state.session_idle_minutes,
        )));

    let static_files = ServeDir::new(&state.static_dir);

    Router::new()
        .route("/", get(pages::home))
        .route("/signup", get(auth::signup_form).post(auth::signup))
        .route("/login", get(auth::login_form).post(auth::login))
        .route("/logout", get(auth::logout))
        .route("/users", get(users::list_users))
        .route("/users/profile", get(users::edit_profile_form).post(users::edit_profile))
        .route("/users/delete", post(users::delete_user))
        .route("/users/follow/{id}", post(users::follow))
        .route("/users/stop-following/{id}", post(users::stop_following))
        .route("/users/add_like/{message_id}", post(likes::toggle_like))
        .route("/users/{id}", get(users::show_user))
        .route("/users/{id}/following", get(users::show_following))
        .route("/users/{id}/followers", get(users::show_followers))
        .route("/users/{id}/likes", get(users::show_likes))
        .route("/messages/new", get(messages::new_message_form).post(messages::add_message))
        .route("/messages/{id}", get(messages::show_message))
        .route("/messages/{id}/delete", post(messages::delete_message))
        .nest_service("/static", static_files)
        .fallback(pages::not_found)
        .layer(session_layer)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Run blocking database work (queries, password hashing) off the async runtime.
pub(crate) async fn with_db<F, T, E>(state: &AppState, f: F) -> Result<T, AppError>
where
    F: FnOnce(&Database) -> Result<T, E> + Send + 'static,
    T: Send + 'static,
    E: Into<AppError> + Send + 'static,
{
    let state = state.clone();
    tokio::task::spawn_blocking(move || f(&state.db))
        .await?
        .map_err(Into::into)
}

/// 302 Found, which is what the browser-facing forms expect after a POST.
pub(crate) fn redirect_to(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}
