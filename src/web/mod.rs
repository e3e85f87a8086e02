pub mod portal;
pub mod templates;

use axum::{
    routing::{get, post},
    Router,
};
use crate::api::state::AppState;

pub fn create_web_routes(state: AppState) -> Router {
    Router::new()
        // Auth pages
        .route("/login", get(templates::auth::login_page))
        .route("/login", post(templates::auth::login_handler))
        .route("/logout", post(templates::auth::logout_handler))

        // Browsing pages and form actions
        .merge(portal::create_portal_routes(state.clone()))

        .with_state(state)
}
