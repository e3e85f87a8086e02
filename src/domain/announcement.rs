use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::{double_option, normalize_tags, trim_in_place, trim_option, ClubSummary, ParseEnumError, UserSummary};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Announcement {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub author_id: Uuid,
    pub club_id: Option<Uuid>,
    pub priority: Priority,
    pub target_audience: TargetAudience,
    pub target_club_id: Option<Uuid>,
    pub target_user_ids: Vec<Uuid>,
    pub attachments: Vec<Attachment>,
    pub is_active: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Urgent => "urgent",
        }
    }

    /// Sort key: higher is more important.
    pub fn rank(&self) -> i32 {
        match self {
            Priority::Low => 0,
            Priority::Medium => 1,
            Priority::High => 2,
            Priority::Urgent => 3,
        }
    }
}

impl FromStr for Priority {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            "urgent" => Ok(Priority::Urgent),
            _ => Err(ParseEnumError::new("priority", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetAudience {
    #[default]
    All,
    ClubMembers,
    SpecificClub,
    SpecificUsers,
}

impl TargetAudience {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetAudience::All => "all",
            TargetAudience::ClubMembers => "club_members",
            TargetAudience::SpecificClub => "specific_club",
            TargetAudience::SpecificUsers => "specific_users",
        }
    }
}

impl FromStr for TargetAudience {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(TargetAudience::All),
            "club_members" => Ok(TargetAudience::ClubMembers),
            "specific_club" => Ok(TargetAudience::SpecificClub),
            "specific_users" => Ok(TargetAudience::SpecificUsers),
            _ => Err(ParseEnumError::new("target audience", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    pub name: String,
    pub url: String,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TargetingError {
    #[error("Target club is required for specific club announcements")]
    MissingTargetClub,
    #[error("Target users are required for specific users announcements")]
    MissingTargetUsers,
    #[error("A club is required for club member announcements")]
    MissingClub,
}

/// Checks that the audience mode has the references it needs.
pub fn validate_targeting(
    audience: TargetAudience,
    club: Option<Uuid>,
    target_club: Option<Uuid>,
    target_users: &[Uuid],
) -> Result<(), TargetingError> {
    match audience {
        TargetAudience::All => Ok(()),
        TargetAudience::ClubMembers if club.is_none() => Err(TargetingError::MissingClub),
        TargetAudience::SpecificClub if target_club.is_none() => {
            Err(TargetingError::MissingTargetClub)
        }
        TargetAudience::SpecificUsers if target_users.is_empty() => {
            Err(TargetingError::MissingTargetUsers)
        }
        _ => Ok(()),
    }
}

/// Who is looking at announcements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience {
    Anonymous,
    User(Uuid),
    Admin(Uuid),
}

impl Announcement {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }

    /// `memberships` are the ids of clubs the viewer belongs to.
    pub fn is_visible_to(&self, audience: Audience, memberships: &[Uuid]) -> bool {
        let viewer = match audience {
            Audience::Admin(_) => return true,
            Audience::Anonymous => return self.target_audience == TargetAudience::All,
            Audience::User(id) => id,
        };
        if viewer == self.author_id {
            return true;
        }
        match self.target_audience {
            TargetAudience::All => true,
            TargetAudience::ClubMembers => self.club_id.is_some_and(|c| memberships.contains(&c)),
            TargetAudience::SpecificClub => {
                self.target_club_id.is_some_and(|c| memberships.contains(&c))
            }
            TargetAudience::SpecificUsers => self.target_user_ids.contains(&viewer),
        }
    }

    pub fn can_be_managed_by(&self, user_id: Uuid, is_admin: bool) -> bool {
        is_admin || self.author_id == user_id
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnouncementListItem {
    #[serde(flatten)]
    pub announcement: Announcement,
    pub author: Option<UserSummary>,
    pub club: Option<ClubSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnouncementDetails {
    #[serde(flatten)]
    pub announcement: Announcement,
    pub author: Option<UserSummary>,
    pub club: Option<ClubSummary>,
    pub target_club: Option<ClubSummary>,
    pub target_users: Vec<UserSummary>,
}

#[derive(Debug, Clone)]
pub struct AnnouncementFilter {
    pub club_id: Option<Uuid>,
    pub priority: Option<Priority>,
    pub search: Option<String>,
    pub audience: Audience,
    pub now: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateAnnouncementRequest {
    #[validate(length(min = 2, message = "Title must be at least 2 characters"))]
    pub title: String,
    #[validate(length(
        min = 10,
        max = 2000,
        message = "Content must be between 10 and 2000 characters"
    ))]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub club: Option<Uuid>,
    #[serde(default)]
    pub priority: Priority,
    pub target_audience: TargetAudience,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_club: Option<Uuid>,
    #[serde(default)]
    pub target_users: Vec<Uuid>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl CreateAnnouncementRequest {
    pub fn normalize(&mut self) {
        trim_in_place(&mut self.title);
        trim_in_place(&mut self.content);
        dedup_targets(&mut self.target_users);
        normalize_tags(&mut self.tags);
    }
}

/// Drops repeated ids, keeping first-seen order.
fn dedup_targets(target_users: &mut Vec<Uuid>) {
    let mut seen = Vec::with_capacity(target_users.len());
    target_users.retain(|id| {
        let fresh = !seen.contains(id);
        if fresh {
            seen.push(*id);
        }
        fresh
    });
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAnnouncementRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 2, message = "Title must be at least 2 characters"))]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(
        min = 10,
        max = 2000,
        message = "Content must be between 10 and 2000 characters"
    ))]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_audience: Option<TargetAudience>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub target_club: Option<Option<Uuid>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_users: Option<Vec<Uuid>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachments: Option<Vec<Attachment>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub expires_at: Option<Option<DateTime<Utc>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl UpdateAnnouncementRequest {
    pub fn normalize(&mut self) {
        trim_option(&mut self.title);
        trim_option(&mut self.content);
        if let Some(target_users) = self.target_users.as_mut() {
            dedup_targets(target_users);
        }
        if let Some(tags) = self.tags.as_mut() {
            normalize_tags(tags);
        }
    }

    pub fn apply_to(self, announcement: &mut Announcement) {
        if let Some(title) = self.title {
            announcement.title = title;
        }
        if let Some(content) = self.content {
            announcement.content = content;
        }
        if let Some(priority) = self.priority {
            announcement.priority = priority;
        }
        if let Some(audience) = self.target_audience {
            announcement.target_audience = audience;
        }
        if let Some(target_club) = self.target_club {
            announcement.target_club_id = target_club;
        }
        if let Some(target_users) = self.target_users {
            announcement.target_user_ids = target_users;
        }
        if let Some(attachments) = self.attachments {
            announcement.attachments = attachments;
        }
        if let Some(is_active) = self.is_active {
            announcement.is_active = is_active;
        }
        if let Some(expires_at) = self.expires_at {
            announcement.expires_at = expires_at;
        }
        if let Some(tags) = self.tags {
            announcement.tags = tags;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn announcement(audience: TargetAudience) -> Announcement {
        let now = Utc::now();
        Announcement {
            id: Uuid::new_v4(),
            title: "Club fair".to_string(),
            content: "Come meet every club on the quad".to_string(),
            author_id: Uuid::new_v4(),
            club_id: Some(Uuid::new_v4()),
            priority: Priority::High,
            target_audience: audience,
            target_club_id: Some(Uuid::new_v4()),
            target_user_ids: vec![Uuid::new_v4()],
            attachments: vec![],
            is_active: true,
            expires_at: None,
            tags: vec![],
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn targeting_requires_the_matching_reference() {
        assert_eq!(
            validate_targeting(TargetAudience::SpecificClub, None, None, &[]),
            Err(TargetingError::MissingTargetClub)
        );
        assert_eq!(
            validate_targeting(TargetAudience::SpecificUsers, None, None, &[]),
            Err(TargetingError::MissingTargetUsers)
        );
        assert_eq!(
            validate_targeting(TargetAudience::ClubMembers, None, None, &[]),
            Err(TargetingError::MissingClub)
        );
        assert_eq!(validate_targeting(TargetAudience::All, None, None, &[]), Ok(()));
    }

    #[test]
    fn anonymous_viewers_only_see_broadcasts() {
        assert!(announcement(TargetAudience::All).is_visible_to(Audience::Anonymous, &[]));
        assert!(!announcement(TargetAudience::ClubMembers).is_visible_to(Audience::Anonymous, &[]));
    }

    #[test]
    fn club_member_announcements_follow_membership() {
        let a = announcement(TargetAudience::ClubMembers);
        let viewer = Audience::User(Uuid::new_v4());
        assert!(!a.is_visible_to(viewer, &[]));
        assert!(a.is_visible_to(viewer, &[a.club_id.unwrap()]));
        // target club is irrelevant for this mode
        assert!(!a.is_visible_to(viewer, &[a.target_club_id.unwrap()]));
    }

    #[test]
    fn specific_users_and_authors_and_admins() {
        let a = announcement(TargetAudience::SpecificUsers);
        assert!(a.is_visible_to(Audience::User(a.target_user_ids[0]), &[]));
        assert!(a.is_visible_to(Audience::User(a.author_id), &[]));
        assert!(a.is_visible_to(Audience::Admin(Uuid::new_v4()), &[]));
        assert!(!a.is_visible_to(Audience::User(Uuid::new_v4()), &[]));
    }

    #[test]
    fn priorities_rank_urgent_first() {
        let mut ps = vec![Priority::Medium, Priority::Urgent, Priority::Low, Priority::High];
        ps.sort_by_key(|p| std::cmp::Reverse(p.rank()));
        assert_eq!(ps, vec![Priority::Urgent, Priority::High, Priority::Medium, Priority::Low]);
    }

    #[test]
    fn update_drops_repeated_target_users() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let mut request = UpdateAnnouncementRequest {
            target_users: Some(vec![a, b, a, a]),
            ..Default::default()
        };
        request.normalize();
        assert_eq!(request.target_users, Some(vec![a, b]));
    }
}
