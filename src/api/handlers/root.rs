use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

pub async fn health_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({
            "status": "OK",
            "timestamp": chrono::Utc::now().to_rfc3339()
        })),
    )
}

pub async fn api_info() -> impl IntoResponse {
    Json(json!({
        "name": "ClubHub API",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "College clubs, events and announcements directory",
        "status": "operational",
        "endpoints": {
            "auth": "/api/auth",
            "clubs": "/api/clubs",
            "events": "/api/events",
            "announcements": "/api/announcements",
            "users": "/api/users",
            "health": "/health"
        }
    }))
}
