use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;

use crate::{
    api::state::AppState,
    auth::TOKEN_COOKIE,
    domain::User,
    error::AppError,
};

#[derive(Clone)]
pub struct CurrentUser {
    pub user: User,
}

/// Bearer header first, then the token cookie.
pub fn extract_token(headers: &HeaderMap, jar: &CookieJar) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty());

    bearer
        .map(str::to_string)
        .or_else(|| jar.get(TOKEN_COOKIE).map(|c| c.value().to_string()))
        .filter(|token| !token.is_empty())
}

async fn resolve_user(state: &AppState, headers: &HeaderMap, jar: &CookieJar) -> Result<User, AppError> {
    let token = extract_token(headers, jar).ok_or(AppError::Unauthorized)?;
    state.service_context.user_service.authenticate(&token).await
}

pub async fn require_auth(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user = resolve_user(&state, request.headers(), &jar).await?;

    request.extensions_mut().insert(CurrentUser { user });

    Ok(next.run(request).await)
}

pub async fn optional_auth(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    if let Ok(user) = resolve_user(&state, request.headers(), &jar).await {
        request.extensions_mut().insert(CurrentUser { user });
    }

    next.run(request).await
}

/// Page variant of `require_auth`: sends anonymous visitors to the login form.
pub async fn require_auth_redirect(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    match resolve_user(&state, request.headers(), &jar).await {
        Ok(user) => {
            request.extensions_mut().insert(CurrentUser { user });
            next.run(request).await
        }
        Err(_) => Redirect::to("/login").into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use cookie::Cookie;

    #[test]
    fn bearer_header_wins_over_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        let jar = CookieJar::new().add(Cookie::new(TOKEN_COOKIE, "from-cookie"));
        assert_eq!(extract_token(&headers, &jar).as_deref(), Some("abc"));
    }

    #[test]
    fn cookie_is_used_without_header() {
        let jar = CookieJar::new().add(Cookie::new(TOKEN_COOKIE, "from-cookie"));
        assert_eq!(
            extract_token(&HeaderMap::new(), &jar).as_deref(),
            Some("from-cookie")
        );
        assert_eq!(extract_token(&HeaderMap::new(), &CookieJar::new()), None);
    }
}
