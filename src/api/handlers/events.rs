use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Extension, Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    api::{handlers::MessageResponse, middleware::auth::CurrentUser, state::AppState},
    domain::{
        CreateEventRequest, Event, EventDetails, EventFilter, EventListItem, EventStatus,
        EventType, Page, PageInfo, UpdateEventRequest,
    },
    error::Result,
};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListEventsQuery {
    pub club: Option<Uuid>,
    pub event_type: Option<EventType>,
    pub status: Option<EventStatus>,
    pub search: Option<String>,
    /// Only events that have not started yet.
    #[serde(default)]
    pub upcoming: bool,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventListResponse {
    pub events: Vec<EventListItem>,
    #[serde(flatten)]
    pub page_info: PageInfo,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventResponse {
    pub message: String,
    pub event: Event,
}

pub async fn list(
    State(state): State<AppState>,
    query: std::result::Result<Query<ListEventsQuery>, QueryRejection>,
) -> Result<Json<EventListResponse>> {
    let Query(params) = query?;
    let page = Page::new(params.page, params.limit, &state.settings.pagination);
    let filter = EventFilter {
        club_id: params.club,
        event_type: params.event_type,
        status: params.status,
        search: params.search,
        starts_after: params.upcoming.then(Utc::now),
        participant_id: None,
    };

    let result = state.service_context.event_service.list(&filter, page).await?;

    Ok(Json(EventListResponse {
        page_info: result.info(),
        events: result.items,
    }))
}

pub async fn get(
    State(state): State<AppState>,
    path: std::result::Result<Path<Uuid>, PathRejection>,
) -> Result<Json<EventDetails>> {
    let Path(id) = path?;
    let event = state.service_context.event_service.get(id).await?;
    Ok(Json(event))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    payload: std::result::Result<Json<CreateEventRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<EventResponse>)> {
    let Json(request) = payload?;
    let event = state
        .service_context
        .event_service
        .create(&current.user, request)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(EventResponse {
            message: "Event created successfully".to_string(),
            event,
        }),
    ))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    path: std::result::Result<Path<Uuid>, PathRejection>,
    payload: std::result::Result<Json<UpdateEventRequest>, JsonRejection>,
) -> Result<Json<EventResponse>> {
    let Path(id) = path?;
    let Json(request) = payload?;
    let event = state
        .service_context
        .event_service
        .update(&current.user, id, request)
        .await?;

    Ok(Json(EventResponse {
        message: "Event updated successfully".to_string(),
        event,
    }))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    path: std::result::Result<Path<Uuid>, PathRejection>,
) -> Result<Json<MessageResponse>> {
    let Path(id) = path?;
    state
        .service_context
        .event_service
        .delete(&current.user, id)
        .await?;

    Ok(Json(MessageResponse::new("Event deleted successfully")))
}

pub async fn register(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    path: std::result::Result<Path<Uuid>, PathRejection>,
) -> Result<Json<MessageResponse>> {
    let Path(id) = path?;
    state
        .service_context
        .event_service
        .register(current.user.id, id)
        .await?;

    Ok(Json(MessageResponse::new("Successfully registered for the event")))
}

pub async fn unregister(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    path: std::result::Result<Path<Uuid>, PathRejection>,
) -> Result<Json<MessageResponse>> {
    let Path(id) = path?;
    state
        .service_context
        .event_service
        .unregister(current.user.id, id)
        .await?;

    Ok(Json(MessageResponse::new("Successfully unregistered from the event")))
}
