use askama::Template;
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    Extension,
};
use axum_extra::extract::CookieJar;
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    api::{middleware::auth::CurrentUser, state::AppState},
    domain::{EventFilter, EventType, Page},
    error::Result,
    web::templates::{redirect_with_flash, take_flash, Flash, HtmlTemplate, UserInfo},
};
use super::{choices, flash_message, non_blank, Choice, EventCard, Pager};

#[derive(Template)]
#[template(path = "events.html")]
pub struct EventsTemplate {
    pub current_user: Option<UserInfo>,
    pub flash: Option<Flash>,
    pub events: Vec<EventCard>,
    pub event_types: Vec<Choice>,
    pub search: String,
    pub show_past: bool,
    pub total: i64,
    pub pager: Pager,
}

#[derive(Debug, Default, Deserialize)]
pub struct EventsQuery {
    pub event_type: Option<String>,
    pub search: Option<String>,
    pub show_past: Option<String>,
    pub page: Option<i64>,
}

pub async fn events_page(
    State(state): State<AppState>,
    current: Option<Extension<CurrentUser>>,
    jar: CookieJar,
    Query(query): Query<EventsQuery>,
) -> Result<Response> {
    let viewer = current.as_ref().map(|Extension(c)| &c.user);
    let ctx = &state.service_context;

    let event_type = non_blank(query.event_type).and_then(|t| t.parse::<EventType>().ok());
    let search = non_blank(query.search);
    let show_past = non_blank(query.show_past).is_some();

    let filter = EventFilter {
        event_type,
        search: search.clone(),
        starts_after: (!show_past).then(Utc::now),
        ..Default::default()
    };
    let page = Page::new(query.page, None, &state.settings.pagination);
    let result = ctx.event_service.list(&filter, page).await?;

    let mut events = Vec::with_capacity(result.items.len());
    for item in &result.items {
        let registered = match viewer {
            Some(user) => ctx.event_service.is_registered(item.event.id, user.id).await?,
            None => false,
        };
        events.push(EventCard::new(item, registered));
    }

    let pager = Pager::new(
        "/events",
        result.info(),
        &[
            ("event_type", event_type.map(|t| t.as_str())),
            ("search", search.as_deref()),
            ("show_past", show_past.then_some("1")),
        ],
    );

    let (jar, flash) = take_flash(jar);
    let template = EventsTemplate {
        current_user: viewer.map(UserInfo::from),
        flash,
        events,
        event_types: choices(
            EventType::ALL.iter().map(|t| t.as_str()),
            event_type.map(|t| t.as_str()),
        ),
        search: search.unwrap_or_default(),
        show_past,
        total: result.total,
        pager,
    };

    Ok((jar, HtmlTemplate(template)).into_response())
}

// POST /events/:id/register
pub async fn register_event(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    jar: CookieJar,
    Path(id): Path<Uuid>,
) -> Response {
    match state.service_context.event_service.register(current.user.id, id).await {
        Ok(()) => redirect_with_flash(jar, "/events", "Successfully registered for the event", false),
        Err(err) => redirect_with_flash(jar, "/events", &flash_message(&err), true),
    }
}

// POST /events/:id/unregister
pub async fn unregister_event(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    jar: CookieJar,
    Path(id): Path<Uuid>,
) -> Response {
    match state.service_context.event_service.unregister(current.user.id, id).await {
        Ok(()) => redirect_with_flash(jar, "/events", "Successfully unregistered from the event", false),
        Err(err) => redirect_with_flash(jar, "/events", &flash_message(&err), true),
    }
}
