use std::sync::LazyLock;

use axum::response::Html;
use tera::{Context, Tera};
use tracing::error;

use crate::AppError;
use crate::middleware::AuthContext;

const SOURCES: &[(&str, &str)] = &[
    ("base.html", include_str!("../templates/base.html")),
    ("denied.html", include_str!("../templates/denied.html")),
    ("404.html", include_str!("../templates/404.html")),
    ("home.html", include_str!("../templates/home.html")),
    ("home-anon.html", include_str!("../templates/home-anon.html")),
    ("messages/_list.html", include_str!("../templates/messages/_list.html")),
    ("messages/new.html", include_str!("../templates/messages/new.html")),
    ("messages/show.html", include_str!("../templates/messages/show.html")),
    ("users/_profile.html", include_str!("../templates/users/_profile.html")),
    ("users/_cards.html", include_str!("../templates/users/_cards.html")),
    ("users/signup.html", include_str!("../templates/users/signup.html")),
    ("users/login.html", include_str!("../templates/users/login.html")),
    ("users/index.html", include_str!("../templates/users/index.html")),
    ("users/show.html", include_str!("../templates/users/show.html")),
    ("users/following.html", include_str!("../templates/users/following.html")),
    ("users/followers.html", include_str!("../templates/users/followers.html")),
    ("users/likes.html", include_str!("../templates/users/likes.html")),
    ("users/edit.html", include_str!("../templates/users/edit.html")),
];

static TEMPLATES: LazyLock<Tera> = LazyLock::new(|| {
    let mut tera = Tera::default();
    if let Err(e) = tera.add_raw_templates(SOURCES.iter().copied()) {
        error!("Failed to load templates: {:?}", e);
    }
    tera
});

pub fn render(name: &str, ctx: &Context) -> Result<Html<String>, AppError> {
    Ok(Html(TEMPLATES.render(name, ctx)?))
}

/// Context every page starts from: the navbar's current user and an empty alert list.
pub fn page(auth: &AuthContext) -> Context {
    let mut ctx = Context::new();
    if let Some(user) = auth.user() {
        ctx.insert("current_user", user);
    }
    ctx.insert("alerts", &Vec::<String>::new());
    ctx
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_templates_parse() {
        let mut tera = Tera::default();
        tera.add_raw_templates(SOURCES.iter().copied()).unwrap();
        assert_eq!(tera.get_template_names().count(), SOURCES.len());
    }

    #[test]
    fn denial_page_shows_marker_and_escapes() {
        let mut ctx = Context::new();
        ctx.insert("alerts", &["Access unauthorized.", "<script>"]);
        let html = render("denied.html", &ctx).unwrap().0;
        assert!(html.contains("Access unauthorized."));
        assert!(html.contains("&lt;script&gt;"));
    }
}
