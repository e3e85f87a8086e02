pub mod handlers;
pub mod middleware;
pub mod state;

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::{config::Settings, service::ServiceContext, web};
use state::AppState;

/// The full application: JSON API under `/api` plus the server-rendered pages.
pub fn create_app(service_context: Arc<ServiceContext>, settings: Arc<Settings>) -> Router {
    let app_state = AppState::new(service_context, settings);

    Router::new()
        .route("/health", get(handlers::root::health_check))
        .route("/api", get(handlers::root::api_info))
        .nest("/api", api_routes(app_state.clone()))
        .with_state(app_state.clone())
        .merge(web::create_web_routes(app_state))
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .nest("/auth", auth_routes(state.clone()))
        .nest("/clubs", club_routes(state.clone()))
        .nest("/events", event_routes(state.clone()))
        .nest("/announcements", announcement_routes(state.clone()))
        .nest("/users", user_routes(state))
}

fn auth_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login))
        .route("/logout", post(handlers::auth::logout))
        .merge(
            Router::new()
                .route("/me", get(handlers::auth::me))
                .route_layer(axum::middleware::from_fn_with_state(
                    state,
                    middleware::auth::require_auth,
                )),
        )
}

fn club_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // Browsing is public
        .route("/", get(handlers::clubs::list))
        .route("/:id", get(handlers::clubs::get))
        .merge(
            Router::new()
                .route("/", post(handlers::clubs::create))
                .route("/:id", put(handlers::clubs::update))
                .route("/:id", delete(handlers::clubs::delete))
                .route("/:id/join", post(handlers::clubs::join))
                .route("/:id/leave", post(handlers::clubs::leave))
                .route_layer(axum::middleware::from_fn_with_state(
                    state,
                    middleware::auth::require_auth,
                )),
        )
}

fn event_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::events::list))
        .route("/:id", get(handlers::events::get))
        .merge(
            Router::new()
                .route("/", post(handlers::events::create))
                .route("/:id", put(handlers::events::update))
                .route("/:id", delete(handlers::events::delete))
                .route("/:id/register", post(handlers::events::register))
                .route("/:id/unregister", post(handlers::events::unregister))
                .route_layer(axum::middleware::from_fn_with_state(
                    state,
                    middleware::auth::require_auth,
                )),
        )
}

fn announcement_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // Reads resolve the caller when a token is present
        .route("/", get(handlers::announcements::list))
        .route("/:id", get(handlers::announcements::get))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::optional_auth,
        ))
        .merge(
            Router::new()
                .route("/", post(handlers::announcements::create))
                .route("/:id", put(handlers::announcements::update))
                .route("/:id", delete(handlers::announcements::delete))
                .route_layer(axum::middleware::from_fn_with_state(
                    state,
                    middleware::auth::require_auth,
                )),
        )
}

fn user_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/search", get(handlers::users::search))
        .merge(
            Router::new()
                .route("/profile", get(handlers::users::profile))
                .route("/profile", put(handlers::users::update_profile))
                .route("/clubs", get(handlers::users::clubs))
                .route("/events", get(handlers::users::events))
                .route_layer(axum::middleware::from_fn_with_state(
                    state,
                    middleware::auth::require_auth,
                )),
        )
}
