#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, Response, StatusCode, header},
};
use http_body_util::BodyExt;
use rstest::fixture;
use tower::ServiceExt;

use warbler_api::{AppState, AppStateInner, accounts};
use warbler_db::Database;
use warbler_types::forms::SignupForm;

pub const PASSWORD: &str = "password";

pub struct TestApp {
    pub app: Router,
    pub state: AppState,
    pub user1: i64,
    pub user2: i64,
    pub user3: i64,
}

/// Fresh in-memory database with three signed-up users.
#[fixture]
pub fn app() -> TestApp {
    let db = Database::open_in_memory().expect("Failed to open database");
    let mut inner = AppStateInner::new(db);
    inner.static_dir = PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/../../static"));
    let state: AppState = Arc::new(inner);

    let user1 = signup(&state, "test1", "jenkins@gmail.com");
    let user2 = signup(&state, "test2", "hello@gmail.com");
    let user3 = signup(&state, "test3", "scooby@gmail.com");

    TestApp {
        app: warbler_api::router(state.clone()),
        state,
        user1,
        user2,
        user3,
    }
}

pub fn signup(state: &AppState, username: &str, email: &str) -> i64 {
    let form = SignupForm {
        username: username.into(),
        email: email.into(),
        password: PASSWORD.into(),
        image_url: None,
    };
    accounts::signup(&state.db, &form).expect("signup failed").id
}

impl TestApp {
    pub fn username(&self, id: i64) -> String {
        self.state.db.get_user(id).unwrap().unwrap().username
    }

    /// Log in through the real form and return the session cookie.
    pub async fn login_as(&self, user_id: i64) -> String {
        let body = format!("username={}&password={}", self.username(user_id), PASSWORD);
        let response = self.post_form("/login", &body, None).await;
        assert_eq!(response.status(), StatusCode::FOUND);
        session_cookie(&response).expect("login did not set a session cookie")
    }

    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> Response<Body> {
        let mut request = Request::builder().uri(uri);
        if let Some(cookie) = cookie {
            request = request.header(header::COOKIE, cookie);
        }
        self.send(request.body(Body::empty()).unwrap()).await
    }

    pub async fn post_form(&self, uri: &str, body: &str, cookie: Option<&str>) -> Response<Body> {
        let mut request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            request = request.header(header::COOKIE, cookie);
        }
        self.send(request.body(Body::from(body.to_string())).unwrap()).await
    }

    async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.app.clone().oneshot(request).await.unwrap()
    }
}

pub fn session_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with("warbler_session="))
        .and_then(|v| v.split(';').next())
        .map(str::to_string)
}

pub fn location(response: &Response<Body>) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}
