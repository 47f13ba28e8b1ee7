//! Author Records
//!
//! Entity types exchanged with the store and the field validation rules
//! applied before any write.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Maximum accepted length for an author name, in characters
pub const MAX_NAME_LEN: usize = 100;

lazy_static! {
    static ref EMAIL_RE: Regex =
        Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9-]+(\.[A-Za-z0-9-]+)*\.[A-Za-z]{2,}$")
            .expect("Failed to compile email pattern");
}

/// Errors raised by store operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// No record with the requested id
    #[error("Author not found")]
    NotFound,

    /// Name failed validation
    #[error("Invalid name: {0}")]
    InvalidName(String),

    /// Email failed format validation
    #[error("Invalid email address: {0}")]
    InvalidEmail(String),
}

/// A stored author record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    /// Store-assigned identifier, unique and immutable
    pub id: u64,

    /// Author name, at most [`MAX_NAME_LEN`] characters
    pub name: String,

    /// Author email address
    pub email: String,
}

/// Payload for creating or fully replacing an author
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorDraft {
    /// Author name
    pub name: String,

    /// Author email address
    pub email: String,
}

impl AuthorDraft {
    /// Validate both fields, returning the first violation found
    pub fn validate(&self) -> Result<(), StoreError> {
        validate_name(&self.name)?;
        validate_email(&self.email)?;
        Ok(())
    }
}

/// Payload for a partial update; absent fields are left untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthorPatch {
    /// Replacement name, if provided
    #[serde(default)]
    pub name: Option<String>,

    /// Replacement email, if provided
    #[serde(default)]
    pub email: Option<String>,
}

impl AuthorPatch {
    /// True when the patch carries no fields at all
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none()
    }

    /// Overlay the provided fields onto an existing record, yielding the
    /// draft to write back
    pub fn apply_to(&self, existing: &Author) -> AuthorDraft {
        AuthorDraft {
            name: self.name.clone().unwrap_or_else(|| existing.name.clone()),
            email: self
                .email
                .clone()
                .unwrap_or_else(|| existing.email.clone()),
        }
    }
}

/// Validate an author name: non-empty, at most [`MAX_NAME_LEN`] characters
pub fn validate_name(name: &str) -> Result<(), StoreError> {
    if name.trim().is_empty() {
        return Err(StoreError::InvalidName("name must not be empty".into()));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(StoreError::InvalidName(format!(
            "name exceeds {} characters",
            MAX_NAME_LEN
        )));
    }
    Ok(())
}

/// Validate an email address against a conservative format pattern
pub fn validate_email(email: &str) -> Result<(), StoreError> {
    if EMAIL_RE.is_match(email) {
        Ok(())
    } else {
        Err(StoreError::InvalidEmail(email.to_string()))
    }
}
