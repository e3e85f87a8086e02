pub mod announcements;
pub mod auth;
pub mod clubs;
pub mod events;
pub mod root;
pub mod users;

use serde::{Deserialize, Serialize};

/// Body of action endpoints that have nothing to return but a confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
