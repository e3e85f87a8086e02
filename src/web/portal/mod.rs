mod announcements;
mod clubs;
mod events;
mod home;
mod profile;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};

use crate::{
    api::{middleware::auth, state::AppState},
    domain::{AnnouncementListItem, ClubListItem, EventListItem, PageInfo},
    error::AppError,
};

pub fn create_portal_routes(state: AppState) -> Router<AppState> {
    let browsing = Router::new()
        .route("/", get(home::home_page))
        .route("/clubs", get(clubs::clubs_page))
        .route("/events", get(events::events_page))
        .route("/announcements", get(announcements::announcements_page))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::optional_auth,
        ));

    let actions = Router::new()
        .route("/profile", get(profile::profile_page))
        .route("/profile", post(profile::update_profile))
        .route("/clubs/:id/join", post(clubs::join_club))
        .route("/clubs/:id/leave", post(clubs::leave_club))
        .route("/events/:id/register", post(events::register_event))
        .route("/events/:id/unregister", post(events::unregister_event))
        .route_layer(middleware::from_fn_with_state(
            state,
            auth::require_auth_redirect,
        ));

    browsing.merge(actions)
}

pub fn format_date(dt: &DateTime<Utc>) -> String {
    dt.format("%B %d, %Y %H:%M UTC").to_string()
}

/// The text shown to a visitor when a form action fails.
pub fn flash_message(err: &AppError) -> String {
    match err {
        AppError::NotFound(msg)
        | AppError::BadRequest(msg)
        | AppError::Forbidden(msg)
        | AppError::Conflict(msg) => msg.clone(),
        AppError::Validation(violations) => violations
            .iter()
            .map(|v| v.message.clone())
            .collect::<Vec<_>>()
            .join(", "),
        AppError::Unauthorized => "Please log in again".to_string(),
        AppError::Database(_) | AppError::Internal(_) => {
            tracing::error!("Form action failed: {}", err);
            "Something went wrong, please try again".to_string()
        }
    }
}

/// Drops blank query values so `?category=` means "no filter".
pub fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// One `<option>` of a filter dropdown.
#[derive(Debug, Clone)]
pub struct Choice {
    pub value: &'static str,
    pub selected: bool,
}

pub fn choices(values: impl IntoIterator<Item = &'static str>, selected: Option<&str>) -> Vec<Choice> {
    values
        .into_iter()
        .map(|value| Choice {
            value,
            selected: selected == Some(value),
        })
        .collect()
}

/// Previous/next links that keep the current filters.
#[derive(Debug, Clone)]
pub struct Pager {
    pub current_page: i64,
    pub total_pages: i64,
    pub prev_href: Option<String>,
    pub next_href: Option<String>,
}

impl Pager {
    pub fn new(path: &str, info: PageInfo, filters: &[(&str, Option<&str>)]) -> Self {
        let href = |page: i64| {
            let mut pairs: Vec<(&str, String)> = filters
                .iter()
                .filter_map(|(key, value)| value.map(|v| (*key, v.to_string())))
                .collect();
            pairs.push(("page", page.to_string()));
            match serde_urlencoded::to_string(&pairs) {
                Ok(query) => format!("{}?{}", path, query),
                Err(_) => format!("{}?page={}", path, page),
            }
        };

        Self {
            current_page: info.current_page,
            total_pages: info.total_pages,
            prev_href: (info.current_page > 1).then(|| href(info.current_page - 1)),
            next_href: (info.current_page < info.total_pages).then(|| href(info.current_page + 1)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClubCard {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: String,
    pub logo: String,
    pub president: String,
    pub member_count: i64,
    pub is_member: bool,
}

impl ClubCard {
    pub fn new(item: &ClubListItem, is_member: bool) -> Self {
        Self {
            id: item.club.id.to_string(),
            name: item.club.name.clone(),
            description: item.club.description.clone(),
            category: item.club.category.as_str().to_string(),
            logo: item.club.logo.clone(),
            president: item
                .president
                .as_ref()
                .map(|p| p.name.clone())
                .unwrap_or_default(),
            member_count: item.member_count,
            is_member,
        }
    }
}

#[derive(Debug, Clone)]
pub struct EventCard {
    pub id: String,
    pub title: String,
    pub description: String,
    pub club: String,
    pub event_type: String,
    pub status: String,
    pub starts: String,
    pub location: String,
    pub venue: String,
    pub capacity: String,
    pub fee: String,
    pub requires_registration: bool,
    pub is_registered: bool,
}

impl EventCard {
    pub fn new(item: &EventListItem, is_registered: bool) -> Self {
        let event = &item.event;
        let capacity = if event.has_capacity_limit() {
            format!("{} / {}", item.registered_count, event.max_participants)
        } else {
            format!("{} registered", item.registered_count)
        };
        let fee = if event.registration_fee > 0.0 {
            format!("${:.2}", event.registration_fee)
        } else {
            "Free".to_string()
        };

        Self {
            id: event.id.to_string(),
            title: event.title.clone(),
            description: event.description.clone(),
            club: item.club.as_ref().map(|c| c.name.clone()).unwrap_or_default(),
            event_type: event.event_type.as_str().to_string(),
            status: event.status.as_str().to_string(),
            starts: format_date(&event.start_date),
            location: event.location.clone(),
            venue: event.venue.clone(),
            capacity,
            fee,
            requires_registration: event.is_registration_required,
            is_registered,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AnnouncementCard {
    pub title: String,
    pub content: String,
    pub priority: String,
    pub author: String,
    pub club: Option<String>,
    pub posted: String,
}

impl From<&AnnouncementListItem> for AnnouncementCard {
    fn from(item: &AnnouncementListItem) -> Self {
        let announcement = &item.announcement;
        Self {
            title: announcement.title.clone(),
            content: announcement.content.clone(),
            priority: announcement.priority.as_str().to_string(),
            author: item
                .author
                .as_ref()
                .map(|a| a.name.clone())
                .unwrap_or_default(),
            club: item.club.as_ref().map(|c| c.name.clone()),
            posted: format_date(&announcement.created_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pager_keeps_filters_and_encodes_them() {
        let info = PageInfo {
            total_pages: 3,
            current_page: 2,
            total: 25,
        };
        let pager = Pager::new("/clubs", info, &[("search", Some("chess & go")), ("category", None)]);
        assert_eq!(pager.prev_href.as_deref(), Some("/clubs?search=chess+%26+go&page=1"));
        assert_eq!(pager.next_href.as_deref(), Some("/clubs?search=chess+%26+go&page=3"));
    }

    #[test]
    fn choices_mark_the_selected_value() {
        let options = choices(["academic", "sports"], Some("sports"));
        assert!(!options[0].selected);
        assert!(options[1].selected);
        assert!(choices(["academic"], None).iter().all(|c| !c.selected));
    }

    #[test]
    fn pager_has_no_links_on_a_single_page() {
        let info = PageInfo {
            total_pages: 1,
            current_page: 1,
            total: 4,
        };
        let pager = Pager::new("/events", info, &[]);
        assert!(pager.prev_href.is_none());
        assert!(pager.next_href.is_none());
    }
}
