pub mod announcement_repository;
pub mod club_repository;
pub mod event_repository;
pub mod user_repository;

pub use announcement_repository::SqliteAnnouncementRepository;
pub use club_repository::SqliteClubRepository;
pub use event_repository::SqliteEventRepository;
pub use user_repository::SqliteUserRepository;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};
use uuid::Uuid;

use crate::{
    domain::*,
    error::{AppError, Result},
};

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: NewUser) -> Result<User>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;
    /// The user plus their stored password hash, for login.
    async fn find_credentials(&self, email: &str) -> Result<Option<(User, String)>>;
    async fn update_profile(&self, id: Uuid, update: UpdateProfileRequest) -> Result<User>;
    async fn search(&self, query: &str, limit: i64, offset: i64) -> Result<Vec<User>>;
    async fn count_search(&self, query: &str) -> Result<i64>;
    async fn find_summaries(&self, ids: &[Uuid]) -> Result<Vec<UserSummary>>;
}

#[async_trait]
pub trait ClubRepository: Send + Sync {
    /// Creates the club and enrols the president as its first member.
    async fn create(&self, president_id: Uuid, request: CreateClubRequest) -> Result<Club>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Club>>;
    async fn list(&self, filter: &ClubFilter, limit: i64, offset: i64) -> Result<Vec<Club>>;
    async fn count(&self, filter: &ClubFilter) -> Result<i64>;
    async fn list_trending(&self, limit: i64) -> Result<Vec<Club>>;
    async fn update(&self, club: &Club) -> Result<Club>;
    async fn delete(&self, id: Uuid) -> Result<()>;
    /// Returns false when the user was already a member.
    async fn add_member(&self, club_id: Uuid, user_id: Uuid) -> Result<bool>;
    /// Returns false when the user was not a member. Clears any vice
    /// president or secretary office the user held.
    async fn remove_member(&self, club_id: Uuid, user_id: Uuid) -> Result<bool>;
    async fn is_member(&self, club_id: Uuid, user_id: Uuid) -> Result<bool>;
    async fn member_ids(&self, club_id: Uuid) -> Result<Vec<Uuid>>;
    async fn member_count(&self, club_id: Uuid) -> Result<i64>;
    async fn list_for_member(&self, user_id: Uuid) -> Result<Vec<Club>>;
    async fn club_ids_for_member(&self, user_id: Uuid) -> Result<Vec<Uuid>>;
    async fn find_summaries(&self, ids: &[Uuid]) -> Result<Vec<ClubSummary>>;
}

#[async_trait]
pub trait EventRepository: Send + Sync {
    async fn create(&self, organizer_id: Uuid, request: CreateEventRequest) -> Result<Event>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Event>>;
    async fn list(&self, filter: &EventFilter, limit: i64, offset: i64) -> Result<Vec<Event>>;
    async fn count(&self, filter: &EventFilter) -> Result<i64>;
    async fn update(&self, event: &Event) -> Result<Event>;
    async fn delete(&self, id: Uuid) -> Result<()>;
    /// Inserts the registration only while the event has room. Returns
    /// false when nothing was inserted (full or already registered).
    async fn register(&self, event_id: Uuid, user_id: Uuid) -> Result<bool>;
    async fn unregister(&self, event_id: Uuid, user_id: Uuid) -> Result<bool>;
    async fn is_registered(&self, event_id: Uuid, user_id: Uuid) -> Result<bool>;
    async fn registration_count(&self, event_id: Uuid) -> Result<i64>;
    async fn participant_ids(&self, event_id: Uuid) -> Result<Vec<Uuid>>;
}

#[async_trait]
pub trait AnnouncementRepository: Send + Sync {
    async fn create(&self, announcement: Announcement) -> Result<Announcement>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Announcement>>;
    async fn list(&self, filter: &AnnouncementFilter, limit: i64, offset: i64) -> Result<Vec<Announcement>>;
    async fn count(&self, filter: &AnnouncementFilter) -> Result<i64>;
    async fn update(&self, announcement: &Announcement) -> Result<Announcement>;
    async fn delete(&self, id: Uuid) -> Result<()>;
}

pub(crate) fn parse_uuid(s: &str) -> Result<Uuid> {
    Uuid::parse_str(s).map_err(|e| AppError::Database(e.to_string()))
}

pub(crate) fn parse_optional_uuid(s: Option<&str>) -> Result<Option<Uuid>> {
    s.map(parse_uuid).transpose()
}

pub(crate) fn utc(dt: NaiveDateTime) -> DateTime<Utc> {
    DateTime::from_naive_utc_and_offset(dt, Utc)
}

pub(crate) fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(|e| AppError::Internal(e.to_string()))
}

pub(crate) fn from_json<T: DeserializeOwned>(raw: &str) -> Result<T> {
    serde_json::from_str(raw).map_err(|e| AppError::Database(e.to_string()))
}

/// Builds a `LIKE ... ESCAPE '\'` pattern matching `query` anywhere.
pub(crate) fn like_pattern(query: &str) -> String {
    let escaped = query
        .trim()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}
