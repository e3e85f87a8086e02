use askama::Template;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Form,
};
use axum_extra::extract::CookieJar;
use serde::Deserialize;

use crate::{
    api::state::AppState,
    auth::AuthService,
    domain::LoginRequest,
    error::AppError,
    web::templates::{take_flash, Flash, HtmlTemplate, UserInfo},
};

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub current_user: Option<UserInfo>,
    pub flash: Option<Flash>,
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

// GET /login
pub async fn login_page(jar: CookieJar) -> impl IntoResponse {
    let (jar, flash) = take_flash(jar);
    let template = LoginTemplate {
        current_user: None,
        flash,
        email: String::new(),
    };
    (jar, HtmlTemplate(template))
}

// POST /login
pub async fn login_handler(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Response {
    let request = LoginRequest {
        email: form.email.clone(),
        password: form.password,
    };

    match state.service_context.user_service.login(request).await {
        Ok((_user, token)) => {
            let cookie = state
                .service_context
                .auth_service
                .create_token_cookie(&token, state.settings.auth.secure_cookies);
            (jar.add(cookie), Redirect::to("/")).into_response()
        }
        Err(err) => {
            let message = match err {
                AppError::Unauthorized => "Invalid email or password".to_string(),
                other => {
                    tracing::error!("Login failed: {}", other);
                    "Login is unavailable right now".to_string()
                }
            };
            let template = LoginTemplate {
                current_user: None,
                flash: Some(Flash {
                    message,
                    is_error: true,
                }),
                email: form.email,
            };
            (StatusCode::UNAUTHORIZED, HtmlTemplate(template)).into_response()
        }
    }
}

// POST /logout
pub async fn logout_handler(jar: CookieJar) -> impl IntoResponse {
    (jar.add(AuthService::create_logout_cookie()), Redirect::to("/"))
}
