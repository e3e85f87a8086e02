use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Extension, Json,
};
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};

use crate::{
    api::{middleware::auth::CurrentUser, state::AppState},
    auth::AuthService,
    domain::{LoginRequest, RegisterRequest, User},
    error::Result,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub message: String,
    pub token: String,
    pub user: User,
}

pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: std::result::Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, CookieJar, Json<AuthResponse>)> {
    let Json(request) = payload?;
    let (user, token) = state.service_context.user_service.register(request).await?;

    let cookie = state
        .service_context
        .auth_service
        .create_token_cookie(&token, state.settings.auth.secure_cookies);

    Ok((
        StatusCode::CREATED,
        jar.add(cookie),
        Json(AuthResponse {
            message: "User registered successfully".to_string(),
            token,
            user,
        }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: std::result::Result<Json<LoginRequest>, JsonRejection>,
) -> Result<(CookieJar, Json<AuthResponse>)> {
    let Json(request) = payload?;
    let (user, token) = state.service_context.user_service.login(request).await?;

    let cookie = state
        .service_context
        .auth_service
        .create_token_cookie(&token, state.settings.auth.secure_cookies);

    Ok((
        jar.add(cookie),
        Json(AuthResponse {
            message: "Login successful".to_string(),
            token,
            user,
        }),
    ))
}

pub async fn me(Extension(current): Extension<CurrentUser>) -> Json<User> {
    Json(current.user)
}

/// Tokens are stateless; logging out only drops the browser cookie.
pub async fn logout(jar: CookieJar) -> (CookieJar, StatusCode) {
    (
        jar.add(AuthService::create_logout_cookie()),
        StatusCode::NO_CONTENT,
    )
}
