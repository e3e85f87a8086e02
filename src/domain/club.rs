use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::{double_option, trim_in_place, trim_option, ParseEnumError, UserSummary};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Club {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub category: ClubCategory,
    pub logo: String,
    pub cover_image: String,
    pub president_id: Uuid,
    pub vice_president_id: Option<Uuid>,
    pub secretary_id: Option<Uuid>,
    pub social_links: SocialLinks,
    pub meeting_schedule: MeetingSchedule,
    pub is_active: bool,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Club {
    pub fn summary(&self) -> ClubSummary {
        ClubSummary {
            id: self.id,
            name: self.name.clone(),
            logo: self.logo.clone(),
            category: self.category,
        }
    }

    /// President or platform admin.
    pub fn can_be_managed_by(&self, user_id: Uuid, is_admin: bool) -> bool {
        is_admin || self.president_id == user_id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClubCategory {
    Academic,
    Sports,
    Cultural,
    Technical,
    Social,
    Volunteer,
    Other,
}

impl ClubCategory {
    pub const ALL: [ClubCategory; 7] = [
        ClubCategory::Academic,
        ClubCategory::Sports,
        ClubCategory::Cultural,
        ClubCategory::Technical,
        ClubCategory::Social,
        ClubCategory::Volunteer,
        ClubCategory::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ClubCategory::Academic => "academic",
            ClubCategory::Sports => "sports",
            ClubCategory::Cultural => "cultural",
            ClubCategory::Technical => "technical",
            ClubCategory::Social => "social",
            ClubCategory::Volunteer => "volunteer",
            ClubCategory::Other => "other",
        }
    }
}

impl FromStr for ClubCategory {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ClubCategory::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| ParseEnumError::new("category", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    pub fn as_str(&self) -> &'static str {
        match self {
            Weekday::Monday => "Monday",
            Weekday::Tuesday => "Tuesday",
            Weekday::Wednesday => "Wednesday",
            Weekday::Thursday => "Thursday",
            Weekday::Friday => "Friday",
            Weekday::Saturday => "Saturday",
            Weekday::Sunday => "Sunday",
        }
    }
}

impl FromStr for Weekday {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Monday" => Ok(Weekday::Monday),
            "Tuesday" => Ok(Weekday::Tuesday),
            "Wednesday" => Ok(Weekday::Wednesday),
            "Thursday" => Ok(Weekday::Thursday),
            "Friday" => Ok(Weekday::Friday),
            "Saturday" => Ok(Weekday::Saturday),
            "Sunday" => Ok(Weekday::Sunday),
            _ => Err(ParseEnumError::new("meeting day", s)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialLinks {
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub instagram: Option<String>,
    #[serde(default)]
    pub facebook: Option<String>,
    #[serde(default)]
    pub twitter: Option<String>,
    #[serde(default)]
    pub linkedin: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingSchedule {
    #[serde(default)]
    pub day: Option<Weekday>,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClubSummary {
    pub id: Uuid,
    pub name: String,
    pub logo: String,
    pub category: ClubCategory,
}

/// A club as it appears in listings: president populated, members counted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClubListItem {
    #[serde(flatten)]
    pub club: Club,
    pub president: Option<UserSummary>,
    pub member_count: i64,
}

/// A club with every user reference populated.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClubDetails {
    #[serde(flatten)]
    pub club: Club,
    pub president: Option<UserSummary>,
    pub vice_president: Option<UserSummary>,
    pub secretary: Option<UserSummary>,
    pub members: Vec<UserSummary>,
}

#[derive(Debug, Clone, Default)]
pub struct ClubFilter {
    pub category: Option<ClubCategory>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateClubRequest {
    #[validate(length(min = 2, message = "Club name must be at least 2 characters"))]
    pub name: String,
    #[validate(length(
        min = 10,
        max = 1000,
        message = "Description must be between 10 and 1000 characters"
    ))]
    pub description: String,
    pub category: ClubCategory,
    #[serde(default)]
    pub logo: String,
    #[serde(default)]
    pub cover_image: String,
    #[serde(default)]
    pub social_links: SocialLinks,
    #[serde(default)]
    pub meeting_schedule: MeetingSchedule,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl CreateClubRequest {
    pub fn normalize(&mut self) {
        trim_in_place(&mut self.name);
        trim_in_place(&mut self.description);
        normalize_tags(&mut self.tags);
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateClubRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 2, message = "Club name must be at least 2 characters"))]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(
        min = 10,
        max = 1000,
        message = "Description must be between 10 and 1000 characters"
    ))]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<ClubCategory>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub vice_president: Option<Option<Uuid>>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub secretary: Option<Option<Uuid>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub social_links: Option<SocialLinks>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meeting_schedule: Option<MeetingSchedule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl UpdateClubRequest {
    pub fn normalize(&mut self) {
        trim_option(&mut self.name);
        trim_option(&mut self.description);
        if let Some(tags) = self.tags.as_mut() {
            normalize_tags(tags);
        }
    }

    pub fn apply_to(self, club: &mut Club) {
        if let Some(name) = self.name {
            club.name = name;
        }
        if let Some(description) = self.description {
            club.description = description;
        }
        if let Some(category) = self.category {
            club.category = category;
        }
        if let Some(logo) = self.logo {
            club.logo = logo;
        }
        if let Some(cover_image) = self.cover_image {
            club.cover_image = cover_image;
        }
        if let Some(vice_president) = self.vice_president {
            club.vice_president_id = vice_president;
        }
        if let Some(secretary) = self.secretary {
            club.secretary_id = secretary;
        }
        if let Some(social_links) = self.social_links {
            club.social_links = social_links;
        }
        if let Some(meeting_schedule) = self.meeting_schedule {
            club.meeting_schedule = meeting_schedule;
        }
        if let Some(is_active) = self.is_active {
            club.is_active = is_active;
        }
        if let Some(tags) = self.tags {
            club.tags = tags;
        }
    }
}

/// Lowercased, trimmed, de-duplicated in first-seen order.
pub fn normalize_tags(tags: &mut Vec<String>) {
    let mut seen = Vec::with_capacity(tags.len());
    for tag in tags.drain(..) {
        let tag = tag.trim().to_lowercase();
        if !tag.is_empty() && !seen.contains(&tag) {
            seen.push(tag);
        }
    }
    *tags = seen;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_parses_only_known_values() {
        assert_eq!("technical".parse::<ClubCategory>().unwrap(), ClubCategory::Technical);
        assert!("Technical".parse::<ClubCategory>().is_err());
        assert!("gaming".parse::<ClubCategory>().is_err());
    }

    #[test]
    fn tags_are_deduplicated_case_insensitively() {
        let mut tags = vec![" Rust ".to_string(), "rust".to_string(), "".to_string(), "CTF".to_string()];
        normalize_tags(&mut tags);
        assert_eq!(tags, vec!["rust".to_string(), "ctf".to_string()]);
    }

    #[test]
    fn trimmed_name_must_still_be_two_characters() {
        let mut req = CreateClubRequest {
            name: " X ".to_string(),
            description: "A description long enough".to_string(),
            category: ClubCategory::Social,
            logo: String::new(),
            cover_image: String::new(),
            social_links: SocialLinks::default(),
            meeting_schedule: MeetingSchedule::default(),
            tags: vec![],
        };
        req.normalize();
        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("name"));
    }

    #[test]
    fn explicit_null_clears_an_officer() {
        let patch: UpdateClubRequest = serde_json::from_str(r#"{"vicePresident": null}"#).unwrap();
        assert_eq!(patch.vice_president, Some(None));
    }
}
