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
        Club, ClubCategory, ClubDetails, ClubFilter, ClubListItem, CreateClubRequest, Page,
        PageInfo, UpdateClubRequest,
    },
    error::Result,
};

#[derive(Debug, Default, Deserialize)]
pub struct ListClubsQuery {
    pub category: Option<ClubCategory>,
    pub search: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClubListResponse {
    pub clubs: Vec<ClubListItem>,
    #[serde(flatten)]
    pub page_info: PageInfo,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClubResponse {
    pub message: String,
    pub club: Club,
}

pub async fn list(
    State(state): State<AppState>,
    query: std::result::Result<Query<ListClubsQuery>, QueryRejection>,
) -> Result<Json<ClubListResponse>> {
    let Query(params) = query?;
    let page = Page::new(params.page, params.limit, &state.settings.pagination);
    let filter = ClubFilter {
        category: params.category,
        search: params.search,
    };

    let result = state.service_context.club_service.list(&filter, page).await?;

    Ok(Json(ClubListResponse {
        page_info: result.info(),
        clubs: result.items,
    }))
}

pub async fn get(
    State(state): State<AppState>,
    path: std::result::Result<Path<Uuid>, PathRejection>,
) -> Result<Json<ClubDetails>> {
    let Path(id) = path?;
    let club = state.service_context.club_service.get(id).await?;
    Ok(Json(club))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    payload: std::result::Result<Json<CreateClubRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ClubResponse>)> {
    let Json(request) = payload?;
    let club = state
        .service_context
        .club_service
        .create(&current.user, request)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ClubResponse {
            message: "Club created successfully".to_string(),
            club,
        }),
    ))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    path: std::result::Result<Path<Uuid>, PathRejection>,
    payload: std::result::Result<Json<UpdateClubRequest>, JsonRejection>,
) -> Result<Json<ClubResponse>> {
    let Path(id) = path?;
    let Json(request) = payload?;
    let club = state
        .service_context
        .club_service
        .update(&current.user, id, request)
        .await?;

    Ok(Json(ClubResponse {
        message: "Club updated successfully".to_string(),
        club,
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
        .club_service
        .delete(&current.user, id)
        .await?;

    Ok(Json(MessageResponse::new("Club deleted successfully")))
}

pub async fn join(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    path: std::result::Result<Path<Uuid>, PathRejection>,
) -> Result<Json<MessageResponse>> {
    let Path(id) = path?;
    state
        .service_context
        .club_service
        .join(current.user.id, id)
        .await?;

    Ok(Json(MessageResponse::new("Successfully joined the club")))
}

pub async fn leave(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    path: std::result::Result<Path<Uuid>, PathRejection>,
) -> Result<Json<MessageResponse>> {
    let Path(id) = path?;
    state
        .service_context
        .club_service
        .leave(current.user.id, id)
        .await?;

    Ok(Json(MessageResponse::new("Successfully left the club")))
}
