use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::{double_option, trim_in_place, trim_option, ClubSummary, ParseEnumError};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub bio: Option<String>,
    pub interests: Vec<String>,
    pub profile_picture: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            profile_picture: self.profile_picture.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Student,
    ClubLeader,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Student => "student",
            UserRole::ClubLeader => "club_leader",
            UserRole::Admin => "admin",
        }
    }
}

impl FromStr for UserRole {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "student" => Ok(UserRole::Student),
            "club_leader" => Ok(UserRole::ClubLeader),
            "admin" => Ok(UserRole::Admin),
            _ => Err(ParseEnumError::new("user role", s)),
        }
    }
}

/// The projection of a user embedded in other records' responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub profile_picture: Option<String>,
}

/// The signed-in user's own view, with the clubs they belong to.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(flatten)]
    pub user: User,
    pub joined_clubs: Vec<ClubSummary>,
}

/// What user search exposes about other people.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicProfile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub profile_picture: Option<String>,
    pub bio: Option<String>,
}

impl From<User> for PublicProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            profile_picture: user.profile_picture,
            bio: user.bio,
        }
    }
}

/// Insert payload handed to the repository once the password is hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: UserRole,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 2, message = "Name must be at least 2 characters"))]
    pub name: String,
    #[validate(email(message = "Please provide a valid email"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<UserRole>,
}

impl RegisterRequest {
    pub fn normalize(&mut self) {
        trim_in_place(&mut self.name);
        self.email = self.email.trim().to_lowercase();
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Only these profile fields are user-editable; anything else in the
/// payload is ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 2, message = "Name must be at least 2 characters"))]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 500, message = "Bio must be less than 500 characters"))]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interests: Option<Vec<String>>,
    /// `null` or a blank string removes the picture.
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub profile_picture: Option<Option<String>>,
}

impl UpdateProfileRequest {
    pub fn normalize(&mut self) {
        trim_option(&mut self.name);
        if let Some(picture) = self.profile_picture.as_mut() {
            trim_option(picture);
            if picture.as_deref() == Some("") {
                *picture = None;
            }
        }
        if let Some(interests) = self.interests.as_mut() {
            interests.iter_mut().for_each(trim_in_place);
            interests.retain(|i| !i.is_empty());
        }
    }
}
