use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::{
    double_option, normalize_tags, trim_in_place, trim_option, ClubSummary, ParseEnumError,
    UserSummary,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub club_id: Uuid,
    pub organizer_id: Uuid,
    pub event_type: EventType,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub location: String,
    pub venue: String,
    /// Zero means no limit.
    pub max_participants: i32,
    pub registration_deadline: Option<DateTime<Utc>>,
    pub is_registration_required: bool,
    pub registration_fee: f64,
    pub images: Vec<String>,
    pub tags: Vec<String>,
    pub is_active: bool,
    pub status: EventStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Why a registration attempt was turned down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RegistrationRefusal {
    #[error("Event is not open for registration")]
    Closed,
    #[error("Registration not required for this event")]
    NotRequired,
    #[error("Registration deadline has passed")]
    DeadlinePassed,
    #[error("Already registered for this event")]
    AlreadyRegistered,
    #[error("Event is full")]
    Full,
}

impl Event {
    pub fn has_capacity_limit(&self) -> bool {
        self.max_participants > 0
    }

    pub fn is_full(&self, registered: i64) -> bool {
        self.has_capacity_limit() && registered >= i64::from(self.max_participants)
    }

    /// Checks, in order, every rule a new registration must pass.
    pub fn check_registration(
        &self,
        now: DateTime<Utc>,
        registered: i64,
        already_registered: bool,
    ) -> Result<(), RegistrationRefusal> {
        if !self.is_active || matches!(self.status, EventStatus::Cancelled | EventStatus::Completed) {
            return Err(RegistrationRefusal::Closed);
        }
        if !self.is_registration_required {
            return Err(RegistrationRefusal::NotRequired);
        }
        if self.registration_deadline.is_some_and(|deadline| now > deadline) {
            return Err(RegistrationRefusal::DeadlinePassed);
        }
        if already_registered {
            return Err(RegistrationRefusal::AlreadyRegistered);
        }
        if self.is_full(registered) {
            return Err(RegistrationRefusal::Full);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Workshop,
    Seminar,
    Competition,
    Social,
    Sports,
    Cultural,
    Other,
}

impl EventType {
    pub const ALL: [EventType; 7] = [
        EventType::Workshop,
        EventType::Seminar,
        EventType::Competition,
        EventType::Social,
        EventType::Sports,
        EventType::Cultural,
        EventType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Workshop => "workshop",
            EventType::Seminar => "seminar",
            EventType::Competition => "competition",
            EventType::Social => "social",
            EventType::Sports => "sports",
            EventType::Cultural => "cultural",
            EventType::Other => "other",
        }
    }
}

impl FromStr for EventType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ParseEnumError::new("event type", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Upcoming,
    Ongoing,
    Completed,
    Cancelled,
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventStatus::Upcoming => "upcoming",
            EventStatus::Ongoing => "ongoing",
            EventStatus::Completed => "completed",
            EventStatus::Cancelled => "cancelled",
        }
    }
}

impl FromStr for EventStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "upcoming" => Ok(EventStatus::Upcoming),
            "ongoing" => Ok(EventStatus::Ongoing),
            "completed" => Ok(EventStatus::Completed),
            "cancelled" => Ok(EventStatus::Cancelled),
            _ => Err(ParseEnumError::new("event status", s)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventListItem {
    #[serde(flatten)]
    pub event: Event,
    pub club: Option<ClubSummary>,
    pub organizer: Option<UserSummary>,
    pub registered_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDetails {
    #[serde(flatten)]
    pub event: Event,
    pub club: Option<ClubSummary>,
    pub organizer: Option<UserSummary>,
    pub registered_participants: Vec<UserSummary>,
}

#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    pub club_id: Option<Uuid>,
    pub event_type: Option<EventType>,
    pub status: Option<EventStatus>,
    pub search: Option<String>,
    /// Only events starting at or after this instant.
    pub starts_after: Option<DateTime<Utc>>,
    /// Only events this user is registered for.
    pub participant_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    #[validate(length(min = 2, message = "Event title must be at least 2 characters"))]
    pub title: String,
    #[validate(length(
        min = 10,
        max = 2000,
        message = "Description must be between 10 and 2000 characters"
    ))]
    pub description: String,
    pub club: Uuid,
    pub event_type: EventType,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    #[validate(length(min = 1, message = "Location is required"))]
    pub location: String,
    #[validate(length(min = 1, message = "Venue is required"))]
    pub venue: String,
    #[serde(default)]
    #[validate(range(min = 0, message = "Maximum participants cannot be negative"))]
    pub max_participants: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registration_deadline: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_registration_required: bool,
    #[serde(default)]
    #[validate(range(min = 0.0, message = "Registration fee cannot be negative"))]
    pub registration_fee: f64,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl CreateEventRequest {
    pub fn normalize(&mut self) {
        trim_in_place(&mut self.title);
        trim_in_place(&mut self.description);
        trim_in_place(&mut self.location);
        trim_in_place(&mut self.venue);
        normalize_tags(&mut self.tags);
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEventRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 2, message = "Event title must be at least 2 characters"))]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(
        min = 10,
        max = 2000,
        message = "Description must be between 10 and 2000 characters"
    ))]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_type: Option<EventType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "Location is required"))]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "Venue is required"))]
    pub venue: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0, message = "Maximum participants cannot be negative"))]
    pub max_participants: Option<i32>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub registration_deadline: Option<Option<DateTime<Utc>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_registration_required: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0.0, message = "Registration fee cannot be negative"))]
    pub registration_fee: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<EventStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl UpdateEventRequest {
    pub fn normalize(&mut self) {
        trim_option(&mut self.title);
        trim_option(&mut self.description);
        trim_option(&mut self.location);
        trim_option(&mut self.venue);
        if let Some(tags) = self.tags.as_mut() {
            normalize_tags(tags);
        }
    }

    pub fn apply_to(self, event: &mut Event) {
        if let Some(title) = self.title {
            event.title = title;
        }
        if let Some(description) = self.description {
            event.description = description;
        }
        if let Some(event_type) = self.event_type {
            event.event_type = event_type;
        }
        if let Some(start_date) = self.start_date {
            event.start_date = start_date;
        }
        if let Some(end_date) = self.end_date {
            event.end_date = end_date;
        }
        if let Some(location) = self.location {
            event.location = location;
        }
        if let Some(venue) = self.venue {
            event.venue = venue;
        }
        if let Some(max_participants) = self.max_participants {
            event.max_participants = max_participants;
        }
        if let Some(registration_deadline) = self.registration_deadline {
            event.registration_deadline = registration_deadline;
        }
        if let Some(required) = self.is_registration_required {
            event.is_registration_required = required;
        }
        if let Some(fee) = self.registration_fee {
            event.registration_fee = fee;
        }
        if let Some(images) = self.images {
            event.images = images;
        }
        if let Some(tags) = self.tags {
            event.tags = tags;
        }
        if let Some(status) = self.status {
            event.status = status;
        }
        if let Some(is_active) = self.is_active {
            event.is_active = is_active;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn event(max_participants: i32) -> Event {
        let now = Utc::now();
        Event {
            id: Uuid::new_v4(),
            title: "Web Development Workshop".to_string(),
            description: "Learn modern web development".to_string(),
            club_id: Uuid::new_v4(),
            organizer_id: Uuid::new_v4(),
            event_type: EventType::Workshop,
            start_date: now + Duration::days(7),
            end_date: now + Duration::days(7) + Duration::hours(3),
            location: "Computer Lab".to_string(),
            venue: "Tech Building Room 101".to_string(),
            max_participants,
            registration_deadline: None,
            is_registration_required: true,
            registration_fee: 0.0,
            images: vec![],
            tags: vec![],
            is_active: true,
            status: EventStatus::Upcoming,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn zero_capacity_means_unlimited() {
        let e = event(0);
        assert!(!e.is_full(10_000));
        assert_eq!(e.check_registration(Utc::now(), 10_000, false), Ok(()));
    }

    #[test]
    fn capacity_is_enforced_at_the_boundary() {
        let e = event(2);
        assert_eq!(e.check_registration(Utc::now(), 1, false), Ok(()));
        assert_eq!(
            e.check_registration(Utc::now(), 2, false),
            Err(RegistrationRefusal::Full)
        );
    }

    #[test]
    fn refusals_are_checked_in_order() {
        let mut e = event(1);
        e.registration_deadline = Some(Utc::now() - Duration::hours(1));
        // deadline wins over duplicate and capacity
        assert_eq!(
            e.check_registration(Utc::now(), 1, true),
            Err(RegistrationRefusal::DeadlinePassed)
        );

        e.registration_deadline = None;
        assert_eq!(
            e.check_registration(Utc::now(), 1, true),
            Err(RegistrationRefusal::AlreadyRegistered)
        );

        e.is_registration_required = false;
        assert_eq!(
            e.check_registration(Utc::now(), 0, false),
            Err(RegistrationRefusal::NotRequired)
        );

        e.status = EventStatus::Cancelled;
        assert_eq!(
            e.check_registration(Utc::now(), 0, false),
            Err(RegistrationRefusal::Closed)
        );
    }

    #[test]
    fn refusal_messages_match_the_api_contract() {
        assert_eq!(RegistrationRefusal::Full.to_string(), "Event is full");
        assert_eq!(
            RegistrationRefusal::NotRequired.to_string(),
            "Registration not required for this event"
        );
    }
}
