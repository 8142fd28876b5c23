//! Tag entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use dormhub_core::AppError;
use dormhub_core::types::{RegistrantId, TagId};

/// An identification tag handed out in serial order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Tag {
    /// Unique tag identifier.
    pub id: TagId,
    /// Printed tag number, unique across all tags.
    pub tag_number: String,
    /// Whether a registrant holds this tag.
    pub is_assigned: bool,
    /// The holder, when assigned.
    pub assigned_user_id: Option<RegistrantId>,
    /// When the tag was handed out.
    pub assigned_at: Option<DateTime<Utc>>,
    /// When the tag was imported.
    pub created_at: DateTime<Utc>,
    /// When the tag was last updated.
    pub updated_at: DateTime<Utc>,
}

/// A tag row supplied by bulk import. Imported tags start unassigned.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewTag {
    /// Printed tag number.
    #[validate(length(min = 1, max = 32, message = "tag number must not be empty"))]
    pub tag_number: String,
}

impl NewTag {
    /// Validate field constraints.
    pub fn check(&self) -> Result<(), AppError> {
        self.validate()
            .map_err(|e| AppError::validation(format!("Invalid tag '{}': {e}", self.tag_number)))?;
        if self.tag_number.trim().is_empty() {
            return Err(AppError::validation("Tag number must not be blank"));
        }
        Ok(())
    }

    /// Materialize the row as the store will persist it.
    pub fn into_tag(self, id: TagId, now: DateTime<Utc>) -> Tag {
        Tag {
            id,
            tag_number: self.tag_number.trim().to_string(),
            is_assigned: false,
            assigned_user_id: None,
            assigned_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}
