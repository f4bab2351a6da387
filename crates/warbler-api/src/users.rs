use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::info;

use warbler_db::{Database, DbError};
use warbler_types::forms::{ProfileForm, UserSearch};
use warbler_types::models::{Profile, User};

use crate::accounts::{self, AccountError};
use crate::middleware::AuthContext;
use crate::pages::message_cards;
use crate::templates::{page, render};
use crate::{AppError, AppState, redirect_to, with_db};

/// GET /users?q=
pub async fn list_users(
    State(state): State<AppState>,
    auth: AuthContext,
    Query(search): Query<UserSearch>,
) -> Result<Response, AppError> {
    let viewer = auth.user().map(|u| u.id);
    let (users, following) = with_db(&state, move |db| {
        let users: Vec<User> = db
            .list_users(search.q.as_deref())?
            .into_iter()
            .map(User::from)
            .collect();
        Ok::<_, DbError>((users, viewer_following(db, viewer)?))
    })
    .await?;

    let mut ctx = page(&auth);
    ctx.insert("users", &users);
    ctx.insert("viewer_following", &following);
    Ok(render("users/index.html", &ctx)?.into_response())
}

/// GET /users/{id}: profile and messages, newest first.
pub async fn show_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    auth: AuthContext,
) -> Result<Response, AppError> {
    let viewer = auth.user().map(|u| u.id);
    let (profile, messages, following) = with_db(&state, move |db| {
        let Some(profile) = load_profile(db, id)? else {
            return Ok(None);
        };
        let mut rows = db.user_messages(id)?;
        rows.reverse();
        let messages = message_cards(db, rows, viewer)?;
        Ok::<_, DbError>(Some((profile, messages, viewer_following(db, viewer)?)))
    })
    .await?
    .ok_or(AppError::NotFound)?;

    let mut ctx = page(&auth);
    ctx.insert("profile", &profile);
    ctx.insert("messages", &messages);
    ctx.insert("viewer_following", &following);
    Ok(render("users/show.html", &ctx)?.into_response())
}

#[derive(Clone, Copy)]
enum Direction {
    Following,
    Followers,
}

/// GET /users/{id}/following
pub async fn show_following(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    auth: AuthContext,
) -> Result<Response, AppError> {
    follow_page(state, id, auth, Direction::Following).await
}

/// GET /users/{id}/followers
pub async fn show_followers(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    auth: AuthContext,
) -> Result<Response, AppError> {
    follow_page(state, id, auth, Direction::Followers).await
}

async fn follow_page(
    state: AppState,
    id: i64,
    auth: AuthContext,
    direction: Direction,
) -> Result<Response, AppError> {
    let viewer = auth.require()?.id;

    let (profile, users, following) = with_db(&state, move |db| {
        let Some(profile) = load_profile(db, id)? else {
            return Ok(None);
        };
        let rows = match direction {
            Direction::Following => db.following(id)?,
            Direction::Followers => db.followers(id)?,
        };
        let users: Vec<User> = rows.into_iter().map(User::from).collect();
        Ok::<_, DbError>(Some((profile, users, viewer_following(db, Some(viewer))?)))
    })
    .await?
    .ok_or(AppError::NotFound)?;

    let template = match direction {
        Direction::Following => "users/following.html",
        Direction::Followers => "users/followers.html",
    };

    let mut ctx = page(&auth);
    ctx.insert("profile", &profile);
    ctx.insert("users", &users);
    ctx.insert("viewer_following", &following);
    Ok(render(template, &ctx)?.into_response())
}

/// GET /users/{id}/likes
pub async fn show_likes(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    auth: AuthContext,
) -> Result<Response, AppError> {
    let viewer = auth.require()?.id;

    let (profile, messages, following) = with_db(&state, move |db| {
        let Some(profile) = load_profile(db, id)? else {
            return Ok(None);
        };
        let rows = db.liked_messages(id)?;
        let messages = message_cards(db, rows, Some(viewer))?;
        Ok::<_, DbError>(Some((profile, messages, viewer_following(db, Some(viewer))?)))
    })
    .await?
    .ok_or(AppError::NotFound)?;

    let mut ctx = page(&auth);
    ctx.insert("profile", &profile);
    ctx.insert("messages", &messages);
    ctx.insert("viewer_following", &following);
    Ok(render("users/likes.html", &ctx)?.into_response())
}

/// POST /users/follow/{id}
pub async fn follow(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    auth: AuthContext,
) -> Result<Response, AppError> {
    let user_id = auth.require()?.id;

    let found = with_db(&state, move |db| {
        if db.get_user(id)?.is_none() {
            return Ok(false);
        }
        match db.add_follow(user_id, id) {
            Ok(_) | Err(DbError::Conflict { .. }) => Ok(true),
            Err(e) => Err(e),
        }
    })
    .await?;

    if !found {
        return Err(AppError::NotFound);
    }
    Ok(redirect_to(&format!("/users/{}/following", user_id)))
}

/// POST /users/stop-following/{id}
pub async fn stop_following(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    auth: AuthContext,
) -> Result<Response, AppError> {
    let user_id = auth.require()?.id;
    with_db(&state, move |db| db.remove_follow(user_id, id)).await?;
    Ok(redirect_to(&format!("/users/{}/following", user_id)))
}

/// GET /users/profile
pub async fn edit_profile_form(auth: AuthContext) -> Result<Response, AppError> {
    let user = auth.require()?;
    let form = ProfileEcho::from_user(user);

    let mut ctx = page(&auth);
    ctx.insert("form", &form);
    Ok(render("users/edit.html", &ctx)?.into_response())
}

/// POST /users/profile: apply changes once the current password checks out.
pub async fn edit_profile(
    State(state): State<AppState>,
    auth: AuthContext,
    Form(form): Form<ProfileForm>,
) -> Result<Response, AppError> {
    let user_id = auth.require()?.id;

    let echo = ProfileEcho::from_form(&form);
    let result = with_db(&state, move |db| {
        Ok::<_, AppError>(accounts::update_profile(db, user_id, &form))
    })
    .await?;

    let errors = match result {
        Ok(user) => {
            info!(user_id = user.id, "Profile updated");
            return Ok(redirect_to(&format!("/users/{}", user.id)));
        }
        Err(AccountError::Invalid(errors)) => errors,
        Err(
            err @ (AccountError::UsernameTaken
            | AccountError::EmailTaken
            | AccountError::WrongPassword),
        ) => vec![err.to_string()],
        Err(err) => return Err(err.into()),
    };

    let mut ctx = page(&auth);
    ctx.insert("alerts", &errors);
    ctx.insert("form", &echo);
    Ok(render("users/edit.html", &ctx)?.into_response())
}

/// POST /users/delete: remove the account and end the session.
pub async fn delete_user(
    State(state): State<AppState>,
    auth: AuthContext,
) -> Result<Response, AppError> {
    let user_id = auth.require()?.id;

    with_db(&state, move |db| db.delete_user(user_id)).await?;
    auth.logout().await?;

    Ok(redirect_to("/signup"))
}

fn load_profile(db: &Database, user_id: i64) -> Result<Option<Profile>, DbError> {
    let Some(user) = db.get_user(user_id)? else {
        return Ok(None);
    };

    let counts = db.profile_counts(user_id)?;
    Ok(Some(Profile {
        message_count: counts.messages,
        following_count: counts.following,
        followers_count: counts.followers,
        likes_count: counts.likes,
        user: user.into(),
    }))
}

/// Ids the viewer follows, for the follow/unfollow buttons.
fn viewer_following(db: &Database, viewer: Option<i64>) -> Result<Vec<i64>, DbError> {
    match viewer {
        Some(id) => Ok(db.following(id)?.into_iter().map(|u| u.id).collect()),
        None => Ok(Vec::new()),
    }
}

/// Profile form values as plain strings for the template.
#[derive(Serialize)]
struct ProfileEcho {
    username: String,
    email: String,
    image_url: String,
    header_image_url: String,
    bio: String,
    location: String,
}

impl ProfileEcho {
    fn from_user(user: &User) -> Self {
        Self {
            username: user.username.clone(),
            email: user.email.clone(),
            image_url: user.image_url.clone(),
            header_image_url: user.header_image_url.clone(),
            bio: user.bio.clone().unwrap_or_default(),
            location: user.location.clone().unwrap_or_default(),
        }
    }

    fn from_form(form: &ProfileForm) -> Self {
        Self {
            username: form.username.clone(),
            email: form.email.clone(),
            image_url: form.image_url.clone().unwrap_or_default(),
            header_image_url: form.header_image_url.clone().unwrap_or_default(),
            bio: form.bio.clone().unwrap_or_default(),
            location: form.location.clone().unwrap_or_default(),
        }
    }
}
