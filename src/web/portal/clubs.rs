use askama::Template;
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    Extension,
};
use axum_extra::extract::CookieJar;
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    api::{middleware::auth::CurrentUser, state::AppState},
    domain::{ClubCategory, ClubFilter, Page},
    error::Result,
    web::templates::{redirect_with_flash, take_flash, Flash, HtmlTemplate, UserInfo},
};
use super::{choices, non_blank, Choice, ClubCard, Pager};

#[derive(Template)]
#[template(path = "clubs.html")]
pub struct ClubsTemplate {
    pub current_user: Option<UserInfo>,
    pub flash: Option<Flash>,
    pub clubs: Vec<ClubCard>,
    pub categories: Vec<Choice>,
    pub search: String,
    pub total: i64,
    pub pager: Pager,
}

#[derive(Debug, Default, Deserialize)]
pub struct ClubsQuery {
    pub category: Option<String>,
    pub search: Option<String>,
    pub page: Option<i64>,
}

pub async fn clubs_page(
    State(state): State<AppState>,
    current: Option<Extension<CurrentUser>>,
    jar: CookieJar,
    Query(query): Query<ClubsQuery>,
) -> Result<Response> {
    let viewer = current.as_ref().map(|Extension(c)| &c.user);
    let ctx = &state.service_context;

    // Unknown categories are ignored
    let category = non_blank(query.category).and_then(|c| c.parse::<ClubCategory>().ok());
    let search = non_blank(query.search);

    let filter = ClubFilter {
        category,
        search: search.clone(),
    };
    let page = Page::new(query.page, None, &state.settings.pagination);
    let result = ctx.club_service.list(&filter, page).await?;

    let memberships = match viewer {
        Some(user) => ctx.club_repo.club_ids_for_member(user.id).await?,
        None => Vec::new(),
    };

    let pager = Pager::new(
        "/clubs",
        result.info(),
        &[
            ("category", category.map(|c| c.as_str())),
            ("search", search.as_deref()),
        ],
    );

    let (jar, flash) = take_flash(jar);
    let template = ClubsTemplate {
        current_user: viewer.map(UserInfo::from),
        flash,
        clubs: result
            .items
            .iter()
            .map(|item| ClubCard::new(item, memberships.contains(&item.club.id)))
            .collect(),
        categories: choices(
            ClubCategory::ALL.iter().map(|c| c.as_str()),
            category.map(|c| c.as_str()),
        ),
        search: search.unwrap_or_default(),
        total: result.total,
        pager,
    };

    Ok((jar, HtmlTemplate(template)).into_response())
}

// POST /clubs/:id/join
pub async fn join_club(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    jar: CookieJar,
    Path(id): Path<Uuid>,
) -> Response {
    match state.service_context.club_service.join(current.user.id, id).await {
        Ok(()) => redirect_with_flash(jar, "/clubs", "Successfully joined the club", false),
        Err(err) => redirect_with_flash(jar, "/clubs", &super::flash_message(&err), true),
    }
}

// POST /clubs/:id/leave
pub async fn leave_club(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    jar: CookieJar,
    Path(id): Path<Uuid>,
) -> Response {
    match state.service_context.club_service.leave(current.user.id, id).await {
        Ok(()) => redirect_with_flash(jar, "/clubs", "Successfully left the club", false),
        Err(err) => redirect_with_flash(jar, "/clubs", &super::flash_message(&err), true),
    }
}
