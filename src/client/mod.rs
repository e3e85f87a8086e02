//! Typed HTTP wrapper around the `/api` routes.
//!
//! Holds the bearer token returned by `login`/`register` and attaches it to
//! every later call. Non-2xx responses surface as [`ClientError::Api`] with
//! the server's `error` message.

use reqwest::{Method, RequestBuilder, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::{
    api::handlers::{
        announcements::{AnnouncementListResponse, AnnouncementResponse},
        auth::AuthResponse,
        clubs::{ClubListResponse, ClubResponse},
        events::{EventListResponse, EventResponse},
        users::{ProfileResponse, UserSearchResponse},
        MessageResponse,
    },
    domain::{
        AnnouncementDetails, ClubCategory, ClubDetails, ClubListItem, CreateAnnouncementRequest,
        CreateClubRequest, CreateEventRequest, EventDetails, EventStatus, EventType,
        LoginRequest, Priority, RegisterRequest, UpdateAnnouncementRequest, UpdateClubRequest,
        UpdateEventRequest, UpdateProfileRequest, User, UserProfile,
    },
};

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    Api { status: StatusCode, message: String },
}

pub type ClientResult<T> = std::result::Result<T, ClientError>;

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// Filters for [`ApiClient::clubs`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct ClubQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<ClubCategory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
}

/// Filters for [`ApiClient::events`].
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub club: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_type: Option<EventType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<EventStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub upcoming: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
}

/// Filters for [`ApiClient::announcements`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct AnnouncementQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub club: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize)]
struct PageQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<EventStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    page: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    limit: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
struct SearchQuery<'a> {
    q: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    page: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    /// `base_url` is the server root, e.g. `http://localhost:5000`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self
            .http
            .request(method, format!("{}/api{}", self.base_url, path));
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send<T: DeserializeOwned>(builder: RequestBuilder) -> ClientResult<T> {
        let response = Self::checked(builder).await?;
        Ok(response.json().await?)
    }

    async fn checked(builder: RequestBuilder) -> ClientResult<reqwest::Response> {
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = match response.json::<ErrorBody>().await {
            Ok(body) => body.error,
            Err(_) => status
                .canonical_reason()
                .unwrap_or("Request failed")
                .to_string(),
        };
        tracing::debug!("API call failed with {}: {}", status, message);
        Err(ClientError::Api { status, message })
    }

    // Auth

    pub async fn register(&mut self, request: &RegisterRequest) -> ClientResult<AuthResponse> {
        let response: AuthResponse =
            Self::send(self.request(Method::POST, "/auth/register").json(request)).await?;
        self.token = Some(response.token.clone());
        Ok(response)
    }

    pub async fn login(&mut self, email: &str, password: &str) -> ClientResult<AuthResponse> {
        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let response: AuthResponse =
            Self::send(self.request(Method::POST, "/auth/login").json(&request)).await?;
        self.token = Some(response.token.clone());
        Ok(response)
    }

    pub async fn current_user(&self) -> ClientResult<User> {
        Self::send(self.request(Method::GET, "/auth/me")).await
    }

    /// Drops the stored token once the server has cleared its cookie.
    pub async fn logout(&mut self) -> ClientResult<()> {
        Self::checked(self.request(Method::POST, "/auth/logout")).await?;
        self.token = None;
        Ok(())
    }

    // Clubs

    pub async fn clubs(&self, query: &ClubQuery) -> ClientResult<ClubListResponse> {
        Self::send(self.request(Method::GET, "/clubs").query(query)).await
    }

    pub async fn club(&self, id: Uuid) -> ClientResult<ClubDetails> {
        Self::send(self.request(Method::GET, &format!("/clubs/{}", id))).await
    }

    pub async fn create_club(&self, request: &CreateClubRequest) -> ClientResult<ClubResponse> {
        Self::send(self.request(Method::POST, "/clubs").json(request)).await
    }

    pub async fn update_club(
        &self,
        id: Uuid,
        request: &UpdateClubRequest,
    ) -> ClientResult<ClubResponse> {
        Self::send(self.request(Method::PUT, &format!("/clubs/{}", id)).json(request)).await
    }

    pub async fn delete_club(&self, id: Uuid) -> ClientResult<MessageResponse> {
        Self::send(self.request(Method::DELETE, &format!("/clubs/{}", id))).await
    }

    pub async fn join_club(&self, id: Uuid) -> ClientResult<MessageResponse> {
        Self::send(self.request(Method::POST, &format!("/clubs/{}/join", id))).await
    }

    pub async fn leave_club(&self, id: Uuid) -> ClientResult<MessageResponse> {
        Self::send(self.request(Method::POST, &format!("/clubs/{}/leave", id))).await
    }

    // Events

    pub async fn events(&self, query: &EventQuery) -> ClientResult<EventListResponse> {
        Self::send(self.request(Method::GET, "/events").query(query)).await
    }

    pub async fn event(&self, id: Uuid) -> ClientResult<EventDetails> {
        Self::send(self.request(Method::GET, &format!("/events/{}", id))).await
    }

    pub async fn create_event(&self, request: &CreateEventRequest) -> ClientResult<EventResponse> {
        Self::send(self.request(Method::POST, "/events").json(request)).await
    }

    pub async fn update_event(
        &self,
        id: Uuid,
        request: &UpdateEventRequest,
    ) -> ClientResult<EventResponse> {
        Self::send(self.request(Method::PUT, &format!("/events/{}", id)).json(request)).await
    }

    pub async fn delete_event(&self, id: Uuid) -> ClientResult<MessageResponse> {
        Self::send(self.request(Method::DELETE, &format!("/events/{}", id))).await
    }

    pub async fn register_for_event(&self, id: Uuid) -> ClientResult<MessageResponse> {
        Self::send(self.request(Method::POST, &format!("/events/{}/register", id))).await
    }

    pub async fn unregister_from_event(&self, id: Uuid) -> ClientResult<MessageResponse> {
        Self::send(self.request(Method::POST, &format!("/events/{}/unregister", id))).await
    }

    // Announcements

    pub async fn announcements(
        &self,
        query: &AnnouncementQuery,
    ) -> ClientResult<AnnouncementListResponse> {
        Self::send(self.request(Method::GET, "/announcements").query(query)).await
    }

    pub async fn announcement(&self, id: Uuid) -> ClientResult<AnnouncementDetails> {
        Self::send(self.request(Method::GET, &format!("/announcements/{}", id))).await
    }

    pub async fn create_announcement(
        &self,
        request: &CreateAnnouncementRequest,
    ) -> ClientResult<AnnouncementResponse> {
        Self::send(self.request(Method::POST, "/announcements").json(request)).await
    }

    pub async fn update_announcement(
        &self,
        id: Uuid,
        request: &UpdateAnnouncementRequest,
    ) -> ClientResult<AnnouncementResponse> {
        Self::send(
            self.request(Method::PUT, &format!("/announcements/{}", id))
                .json(request),
        )
        .await
    }

    pub async fn delete_announcement(&self, id: Uuid) -> ClientResult<MessageResponse> {
        Self::send(self.request(Method::DELETE, &format!("/announcements/{}", id))).await
    }

    // Users

    pub async fn user_profile(&self) -> ClientResult<UserProfile> {
        Self::send(self.request(Method::GET, "/users/profile")).await
    }

    pub async fn update_user_profile(
        &self,
        request: &UpdateProfileRequest,
    ) -> ClientResult<ProfileResponse> {
        Self::send(self.request(Method::PUT, "/users/profile").json(request)).await
    }

    pub async fn user_clubs(&self) -> ClientResult<Vec<ClubListItem>> {
        Self::send(self.request(Method::GET, "/users/clubs")).await
    }

    pub async fn user_events(
        &self,
        status: Option<EventStatus>,
        page: Option<i64>,
    ) -> ClientResult<EventListResponse> {
        let query = PageQuery {
            status,
            page,
            limit: None,
        };
        Self::send(self.request(Method::GET, "/users/events").query(&query)).await
    }

    pub async fn search_users(&self, q: &str, page: Option<i64>) -> ClientResult<UserSearchResponse> {
        let query = SearchQuery { q, page };
        Self::send(self.request(Method::GET, "/users/search").query(&query)).await
    }
}
