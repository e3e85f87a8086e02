use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use crate::{
    api::{handlers::events::EventListResponse, middleware::auth::CurrentUser, state::AppState},
    domain::{
        ClubListItem, EventStatus, Page, PageInfo, PublicProfile, UpdateProfileRequest, User,
        UserProfile,
    },
    error::Result,
};

#[derive(Debug, Default, Deserialize)]
pub struct UserEventsQuery {
    pub status: Option<EventStatus>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub message: String,
    pub user: User,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSearchResponse {
    pub users: Vec<PublicProfile>,
    #[serde(flatten)]
    pub page_info: PageInfo,
}

pub async fn profile(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<UserProfile>> {
    let profile = state
        .service_context
        .user_service
        .profile(current.user.id)
        .await?;

    Ok(Json(profile))
}

pub async fn update_profile(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    payload: std::result::Result<Json<UpdateProfileRequest>, JsonRejection>,
) -> Result<Json<ProfileResponse>> {
    let Json(request) = payload?;
    let user = state
        .service_context
        .user_service
        .update_profile(current.user.id, request)
        .await?;

    Ok(Json(ProfileResponse {
        message: "Profile updated successfully".to_string(),
        user,
    }))
}

pub async fn clubs(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<Vec<ClubListItem>>> {
    let clubs = state
        .service_context
        .club_service
        .joined_by(current.user.id)
        .await?;

    Ok(Json(clubs))
}

pub async fn events(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    query: std::result::Result<Query<UserEventsQuery>, QueryRejection>,
) -> Result<Json<EventListResponse>> {
    let Query(params) = query?;
    let page = Page::new(params.page, params.limit, &state.settings.pagination);
    let result = state
        .service_context
        .event_service
        .registered_for(current.user.id, params.status, page)
        .await?;

    Ok(Json(EventListResponse {
        page_info: result.info(),
        events: result.items,
    }))
}

pub async fn search(
    State(state): State<AppState>,
    query: std::result::Result<Query<SearchQuery>, QueryRejection>,
) -> Result<Json<UserSearchResponse>> {
    let Query(params) = query?;
    let page = Page::new(params.page, params.limit, &state.settings.pagination);
    let result = state
        .service_context
        .user_service
        .search(params.q.as_deref(), page)
        .await?;

    Ok(Json(UserSearchResponse {
        page_info: result.info(),
        users: result.items,
    }))
}
