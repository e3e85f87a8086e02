use askama::Template;
use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
    Extension, Form,
};
use axum_extra::extract::CookieJar;
use serde::Deserialize;

use crate::{
    api::{middleware::auth::CurrentUser, state::AppState},
    domain::{Page, UpdateProfileRequest},
    error::Result,
    web::templates::{redirect_with_flash, take_flash, Flash, HtmlTemplate, UserInfo},
};
use super::{flash_message, format_date, non_blank, ClubCard, EventCard, Pager};

#[derive(Template)]
#[template(path = "profile.html")]
pub struct ProfileTemplate {
    pub current_user: Option<UserInfo>,
    pub flash: Option<Flash>,
    pub name: String,
    pub email: String,
    pub role: String,
    pub bio: String,
    pub interests: String,
    pub profile_picture: String,
    pub member_since: String,
    pub clubs: Vec<ClubCard>,
    pub events: Vec<EventCard>,
    pub events_total: i64,
    pub pager: Pager,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProfileQuery {
    /// Page of the registered events list.
    pub page: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct ProfileForm {
    pub name: String,
    #[serde(default)]
    pub bio: String,
    /// Comma separated.
    #[serde(default)]
    pub interests: String,
    #[serde(default)]
    pub profile_picture: String,
}

impl From<ProfileForm> for UpdateProfileRequest {
    fn from(form: ProfileForm) -> Self {
        Self {
            name: Some(form.name),
            bio: Some(form.bio.trim().to_string()),
            interests: Some(
                form.interests
                    .split(',')
                    .map(|i| i.trim().to_string())
                    .filter(|i| !i.is_empty())
                    .collect(),
            ),
            profile_picture: Some(non_blank(Some(form.profile_picture))),
        }
    }
}

// GET /profile
pub async fn profile_page(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    jar: CookieJar,
    Query(query): Query<ProfileQuery>,
) -> Result<Response> {
    let ctx = &state.service_context;
    let user = ctx.user_service.get(current.user.id).await?;

    let clubs = ctx
        .club_service
        .joined_by(user.id)
        .await?
        .iter()
        .map(|item| ClubCard::new(item, true))
        .collect();

    let page = Page::new(query.page, None, &state.settings.pagination);
    let registered = ctx.event_service.registered_for(user.id, None, page).await?;
    let events = registered
        .items
        .iter()
        .map(|item| EventCard::new(item, true))
        .collect();
    let pager = Pager::new("/profile", registered.info(), &[]);

    let (jar, flash) = take_flash(jar);
    let template = ProfileTemplate {
        current_user: Some(UserInfo::from(&user)),
        flash,
        email: user.email.clone(),
        role: user.role.as_str().to_string(),
        bio: user.bio.clone().unwrap_or_default(),
        interests: user.interests.join(", "),
        profile_picture: user.profile_picture.clone().unwrap_or_default(),
        member_since: format_date(&user.created_at),
        name: user.name,
        clubs,
        events,
        events_total: registered.total,
        pager,
    };

    Ok((jar, HtmlTemplate(template)).into_response())
}

// POST /profile
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    jar: CookieJar,
    Form(form): Form<ProfileForm>,
) -> Response {
    match state
        .service_context
        .user_service
        .update_profile(current.user.id, form.into())
        .await
    {
        Ok(_) => redirect_with_flash(jar, "/profile", "Profile updated successfully", false),
        Err(err) => redirect_with_flash(jar, "/profile", &flash_message(&err), true),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interests_are_split_on_commas() {
        let form = ProfileForm {
            name: "Ada".to_string(),
            bio: " ".to_string(),
            interests: "chess, ,robotics ,".to_string(),
            profile_picture: "".to_string(),
        };
        let request = UpdateProfileRequest::from(form);
        assert_eq!(
            request.interests,
            Some(vec!["chess".to_string(), "robotics".to_string()])
        );
        // A blank field clears the picture
        assert_eq!(request.profile_picture, Some(None));
    }
}
