pub mod announcement;
pub mod club;
pub mod event;
pub mod pagination;
pub mod user;

pub use announcement::*;
pub use club::*;
pub use event::*;
pub use pagination::*;
pub use user::*;

use serde::{Deserialize, Deserializer};

/// Distinguishes an absent field (`None`) from an explicit `null`
/// (`Some(None)`) in partial update payloads.
pub(crate) fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Trims a string in place.
pub(crate) fn trim_in_place(value: &mut String) {
    let trimmed = value.trim();
    if trimmed.len() != value.len() {
        *value = trimmed.to_string();
    }
}

pub(crate) fn trim_option(value: &mut Option<String>) {
    if let Some(v) = value.as_mut() {
        trim_in_place(v);
    }
}

/// Splits an enum string lookup failure into a uniform message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid {kind}: {value}")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseEnumError {
    pub(crate) fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}
