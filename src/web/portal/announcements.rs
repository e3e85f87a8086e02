use askama::Template;
use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
    Extension,
};
use axum_extra::extract::CookieJar;
use serde::Deserialize;

use crate::{
    api::{middleware::auth::CurrentUser, state::AppState},
    domain::{Page, Priority},
    error::Result,
    service::AnnouncementQuery,
    web::templates::{take_flash, Flash, HtmlTemplate, UserInfo},
};
use super::{choices, non_blank, AnnouncementCard, Choice, Pager};

#[derive(Template)]
#[template(path = "announcements.html")]
pub struct AnnouncementsTemplate {
    pub current_user: Option<UserInfo>,
    pub flash: Option<Flash>,
    pub announcements: Vec<AnnouncementCard>,
    pub priorities: Vec<Choice>,
    pub search: String,
    pub total: i64,
    pub pager: Pager,
}

#[derive(Debug, Default, Deserialize)]
pub struct AnnouncementsQuery {
    pub priority: Option<String>,
    pub search: Option<String>,
    pub page: Option<i64>,
}

pub async fn announcements_page(
    State(state): State<AppState>,
    current: Option<Extension<CurrentUser>>,
    jar: CookieJar,
    Query(query): Query<AnnouncementsQuery>,
) -> Result<Response> {
    let viewer = current.as_ref().map(|Extension(c)| &c.user);

    let priority = non_blank(query.priority).and_then(|p| p.parse::<Priority>().ok());
    let search = non_blank(query.search);
    let page = Page::new(query.page, None, &state.settings.pagination);

    let result = state
        .service_context
        .announcement_service
        .list(
            viewer,
            AnnouncementQuery {
                club_id: None,
                priority,
                search: search.clone(),
            },
            page,
        )
        .await?;

    let pager = Pager::new(
        "/announcements",
        result.info(),
        &[
            ("priority", priority.map(|p| p.as_str())),
            ("search", search.as_deref()),
        ],
    );

    let (jar, flash) = take_flash(jar);
    let template = AnnouncementsTemplate {
        current_user: viewer.map(UserInfo::from),
        flash,
        announcements: result.items.iter().map(AnnouncementCard::from).collect(),
        priorities: choices(
            [Priority::Urgent, Priority::High, Priority::Medium, Priority::Low]
                .iter()
                .map(|p| p.as_str()),
            priority.map(|p| p.as_str()),
        ),
        search: search.unwrap_or_default(),
        total: result.total,
        pager,
    };

    Ok((jar, HtmlTemplate(template)).into_response())
}
