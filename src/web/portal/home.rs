use askama::Template;
use axum::{
    extract::State,
    response::{IntoResponse, Response},
    Extension,
};
use axum_extra::extract::CookieJar;

use crate::{
    api::{middleware::auth::CurrentUser, state::AppState},
    domain::Page,
    error::Result,
    service::AnnouncementQuery,
    web::templates::{take_flash, Flash, HtmlTemplate, UserInfo},
};
use super::{AnnouncementCard, ClubCard, EventCard};

const TRENDING_CLUBS: i64 = 6;
const UPCOMING_EVENTS: i64 = 6;
const RECENT_ANNOUNCEMENTS: i64 = 5;

#[derive(Template)]
#[template(path = "index.html")]
pub struct HomeTemplate {
    pub current_user: Option<UserInfo>,
    pub flash: Option<Flash>,
    pub clubs: Vec<ClubCard>,
    pub events: Vec<EventCard>,
    pub announcements: Vec<AnnouncementCard>,
}

pub async fn home_page(
    State(state): State<AppState>,
    current: Option<Extension<CurrentUser>>,
    jar: CookieJar,
) -> Result<Response> {
    let viewer = current.as_ref().map(|Extension(c)| &c.user);
    let ctx = &state.service_context;

    let memberships = match viewer {
        Some(user) => ctx.club_repo.club_ids_for_member(user.id).await?,
        None => Vec::new(),
    };

    let clubs = ctx
        .club_service
        .trending(TRENDING_CLUBS)
        .await?
        .iter()
        .map(|item| ClubCard::new(item, memberships.contains(&item.club.id)))
        .collect();

    let mut events = Vec::new();
    for item in ctx.event_service.upcoming(UPCOMING_EVENTS).await? {
        let registered = match viewer {
            Some(user) => ctx.event_service.is_registered(item.event.id, user.id).await?,
            None => false,
        };
        events.push(EventCard::new(&item, registered));
    }

    let page = Page {
        page: 1,
        limit: RECENT_ANNOUNCEMENTS,
    };
    let announcements = ctx
        .announcement_service
        .list(viewer, AnnouncementQuery::default(), page)
        .await?
        .items
        .iter()
        .map(AnnouncementCard::from)
        .collect();

    let (jar, flash) = take_flash(jar);
    let template = HomeTemplate {
        current_user: viewer.map(UserInfo::from),
        flash,
        clubs,
        events,
        announcements,
    };

    Ok((jar, HtmlTemplate(template)).into_response())
}
