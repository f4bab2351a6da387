use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Response},
};
use tracing::{info, warn};

use warbler_db::Database;
use warbler_types::forms::{LoginForm, SignupForm};

use crate::accounts::{self, AccountError};
use crate::middleware::AuthContext;
use crate::templates::{page, render};
use crate::{AppError, redirect_to, with_db};

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub session_idle_minutes: i64,
    pub static_dir: PathBuf,
}

impl AppStateInner {
    pub fn new(db: Database) -> Self {
        Self {
            db,
            session_idle_minutes: 60,
            static_dir: PathBuf::from("static"),
        }
    }
}

/// GET /signup
pub async fn signup_form(auth: AuthContext) -> Result<Response, AppError> {
    let mut ctx = page(&auth);
    ctx.insert("form", &FormEcho::default());
    Ok(render("users/signup.html", &ctx)?.into_response())
}

/// POST /signup: create the account and log it in.
pub async fn signup(
    State(state): State<AppState>,
    auth: AuthContext,
    Form(form): Form<SignupForm>,
) -> Result<Response, AppError> {
    let submitted = form.clone();
    let result = with_db(&state, move |db| Ok::<_, AppError>(accounts::signup(db, &form))).await?;

    let errors = match result {
        Ok(user) => {
            auth.login(user.id).await?;
            info!(user_id = user.id, "Signed up");
            return Ok(redirect_to("/"));
        }
        Err(AccountError::Invalid(errors)) => errors,
        Err(err @ (AccountError::UsernameTaken | AccountError::EmailTaken)) => vec![err.to_string()],
        Err(err) => return Err(err.into()),
    };

    let mut ctx = page(&auth);
    ctx.insert("alerts", &errors);
    ctx.insert("form", &FormEcho {
        username: submitted.username,
        email: submitted.email,
        image_url: submitted.image_url.unwrap_or_default(),
    });
    Ok(render("users/signup.html", &ctx)?.into_response())
}

/// GET /login
pub async fn login_form(auth: AuthContext) -> Result<Response, AppError> {
    let mut ctx = page(&auth);
    ctx.insert("username", "");
    Ok(render("users/login.html", &ctx)?.into_response())
}

/// POST /login
pub async fn login(
    State(state): State<AppState>,
    auth: AuthContext,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let username = form.username.trim().to_string();
    let lookup = username.clone();
    let user = with_db(&state, move |db| accounts::authenticate(db, &lookup, &form.password))
    .await?;

    match user {
        Some(user) => {
            auth.login(user.id).await?;
            info!(user_id = user.id, "Logged in");
            Ok(redirect_to("/"))
        }
        None => {
            warn!(username = %username, "Failed login");
            let mut ctx = page(&auth);
            ctx.insert("alerts", &["Invalid credentials."]);
            ctx.insert("username", &username);
            Ok(render("users/login.html", &ctx)?.into_response())
        }
    }
}

/// GET /logout
pub async fn logout(auth: AuthContext) -> Result<impl IntoResponse, AppError> {
    if let Some(user) = auth.user() {
        info!(user_id = user.id, "Logged out");
    }
    auth.logout().await?;
    Ok(redirect_to("/login"))
}

/// Values written back into the signup form after a failed attempt.
#[derive(serde::Serialize, Default)]
struct FormEcho {
    username: String,
    email: String,
    image_url: String,
}
