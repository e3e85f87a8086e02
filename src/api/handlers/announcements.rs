use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    api::{handlers::MessageResponse, middleware::auth::CurrentUser, state::AppState},
    domain::{
        Announcement, AnnouncementDetails, AnnouncementListItem, CreateAnnouncementRequest, Page,
        PageInfo, Priority, UpdateAnnouncementRequest,
    },
    error::Result,
    service::AnnouncementQuery,
};

#[derive(Debug, Default, Deserialize)]
pub struct ListAnnouncementsQuery {
    pub club: Option<Uuid>,
    pub priority: Option<Priority>,
    pub search: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnouncementListResponse {
    pub announcements: Vec<AnnouncementListItem>,
    #[serde(flatten)]
    pub page_info: PageInfo,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnouncementResponse {
    pub message: String,
    pub announcement: Announcement,
}

/// Visibility depends on who is asking; anonymous callers get broadcasts only.
pub async fn list(
    State(state): State<AppState>,
    current: Option<Extension<CurrentUser>>,
    query: std::result::Result<Query<ListAnnouncementsQuery>, QueryRejection>,
) -> Result<Json<AnnouncementListResponse>> {
    let Query(params) = query?;
    let page = Page::new(params.page, params.limit, &state.settings.pagination);
    let viewer = current.as_ref().map(|Extension(c)| &c.user);
    let query = AnnouncementQuery {
        club_id: params.club,
        priority: params.priority,
        search: params.search,
    };

    let result = state
        .service_context
        .announcement_service
        .list(viewer, query, page)
        .await?;

    Ok(Json(AnnouncementListResponse {
        page_info: result.info(),
        announcements: result.items,
    }))
}

pub async fn get(
    State(state): State<AppState>,
    current: Option<Extension<CurrentUser>>,
    path: std::result::Result<Path<Uuid>, PathRejection>,
) -> Result<Json<AnnouncementDetails>> {
    let Path(id) = path?;
    let viewer = current.as_ref().map(|Extension(c)| &c.user);
    let announcement = state
        .service_context
        .announcement_service
        .get(viewer, id)
        .await?;

    Ok(Json(announcement))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    payload: std::result::Result<Json<CreateAnnouncementRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AnnouncementResponse>)> {
    let Json(request) = payload?;
    let announcement = state
        .service_context
        .announcement_service
        .create(&current.user, request)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(AnnouncementResponse {
            message: "Announcement created successfully".to_string(),
            announcement,
        }),
    ))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    path: std::result::Result<Path<Uuid>, PathRejection>,
    payload: std::result::Result<Json<UpdateAnnouncementRequest>, JsonRejection>,
) -> Result<Json<AnnouncementResponse>> {
    let Path(id) = path?;
    let Json(request) = payload?;
    let announcement = state
        .service_context
        .announcement_service
        .update(&current.user, id, request)
        .await?;

    Ok(Json(AnnouncementResponse {
        message: "Announcement updated successfully".to_string(),
        announcement,
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
        .announcement_service
        .delete(&current.user, id)
        .await?;

    Ok(Json(MessageResponse::new("Announcement deleted successfully")))
}
