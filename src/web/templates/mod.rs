pub mod auth;

use askama::Template;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;
use cookie::{Cookie, SameSite};

use crate::domain::User;

const FLASH_COOKIE: &str = "flash";

/// Who is browsing, as the layout needs it.
#[derive(Debug, Clone)]
pub struct UserInfo {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
}

impl From<&User> for UserInfo {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role.as_str().to_string(),
        }
    }
}

/// One-shot message shown on the page after a form action redirects.
#[derive(Debug, Clone)]
pub struct Flash {
    pub message: String,
    pub is_error: bool,
}

/// Takes the pending flash message, if any, and clears it.
pub fn take_flash(jar: CookieJar) -> (CookieJar, Option<Flash>) {
    let Some(cookie) = jar.get(FLASH_COOKIE) else {
        return (jar, None);
    };

    let raw = cookie.value().to_string();
    let flash = match raw.split_once(':') {
        Some(("error", message)) => Flash {
            message: message.to_string(),
            is_error: true,
        },
        Some((_, message)) => Flash {
            message: message.to_string(),
            is_error: false,
        },
        None => Flash {
            message: raw,
            is_error: false,
        },
    };

    (
        jar.remove(Cookie::build(FLASH_COOKIE).path("/").build()),
        Some(flash),
    )
}

/// Redirects to `to`, carrying a notice (or an error) for the next page.
pub fn redirect_with_flash(jar: CookieJar, to: &str, message: &str, is_error: bool) -> Response {
    let kind = if is_error { "error" } else { "notice" };
    let cookie = Cookie::build((FLASH_COOKIE, format!("{}:{}", kind, message)))
        .path("/")
        .same_site(SameSite::Lax)
        .http_only(true)
        .build();

    (jar.add(cookie), Redirect::to(to)).into_response()
}

// Make askama templates work with axum
pub struct HtmlTemplate<T>(pub T);

impl<T> IntoResponse for HtmlTemplate<T>
where
    T: Template,
{
    fn into_response(self) -> Response {
        match self.0.render() {
            Ok(html) => Html(html).into_response(),
            Err(err) => {
                tracing::error!("Failed to render template: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Failed to render template: {}", err),
                )
                    .into_response()
            }
        }
    }
}
