//! Registrant entity model.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use dormhub_core::AppError;
use dormhub_core::types::{Gender, RegistrantId, RoomId, TagId};

use super::status::AssignmentStatus;

/// A registered trainee and whatever room-bed and tag they hold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Registrant {
    /// Unique registrant identifier.
    pub id: RegistrantId,
    /// Full name.
    pub full_name: String,
    /// Date of birth.
    pub date_of_birth: NaiveDate,
    /// Gender; selects the room pool.
    pub gender: Gender,
    /// Contact phone number.
    pub phone: String,
    /// Contact email.
    pub email: Option<String>,
    /// Preferred locale.
    pub locale: Option<String>,
    /// Wing of the assigned room.
    pub wing: Option<String>,
    /// Assigned room number; `None` while pending.
    pub room_number: Option<String>,
    /// Assigned bed label; `None` while pending.
    pub bed_number: Option<String>,
    /// Room assignment status.
    pub room_status: AssignmentStatus,
    /// Assigned tag number; `None` while pending.
    pub tag_number: Option<String>,
    /// Tag assignment status.
    pub tag_status: AssignmentStatus,
    /// When the registrant was created.
    pub created_at: DateTime<Utc>,
    /// When the registrant was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Registrant {
    /// Whether the registrant still waits for a room.
    pub fn is_room_pending(&self) -> bool {
        self.room_status == AssignmentStatus::Pending
    }

    /// Whether the registrant still waits for a tag.
    pub fn is_tag_pending(&self) -> bool {
        self.tag_status == AssignmentStatus::Pending
    }

    /// Record a bed assignment.
    pub fn record_room(
        &mut self,
        wing: &str,
        room_number: &str,
        bed_number: String,
        now: DateTime<Utc>,
    ) {
        self.wing = Some(wing.to_string());
        self.room_number = Some(room_number.to_string());
        self.bed_number = Some(bed_number);
        self.room_status = AssignmentStatus::Assigned;
        self.updated_at = now;
    }

    /// Record a tag assignment.
    pub fn record_tag(&mut self, tag_number: &str, now: DateTime<Utc>) {
        self.tag_number = Some(tag_number.to_string());
        self.tag_status = AssignmentStatus::Assigned;
        self.updated_at = now;
    }
}

/// Self-registration input, including optional picker selections.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct RegistrationRequest {
    /// Full name.
    #[validate(length(min = 1, max = 200, message = "full name is required"))]
    pub full_name: String,
    /// Date of birth.
    #[validate(required(message = "date of birth is required"))]
    pub date_of_birth: Option<NaiveDate>,
    /// Gender.
    #[validate(required(message = "gender is required"))]
    pub gender: Option<Gender>,
    /// Contact phone number.
    #[validate(length(min = 1, max = 32, message = "phone is required"))]
    pub phone: String,
    /// Contact email.
    #[validate(email(message = "email is malformed"))]
    pub email: Option<String>,
    /// Preferred locale.
    #[validate(length(max = 16))]
    pub locale: Option<String>,
    /// Room the registrant picked, if any.
    #[serde(default)]
    pub selected_room_id: Option<RoomId>,
    /// Tag the registrant picked, if any.
    #[serde(default)]
    pub selected_tag_id: Option<TagId>,
    /// Allow rooms of either gender.
    #[serde(default)]
    pub allow_cross_gender: bool,
}

impl RegistrationRequest {
    /// Validate the request and extract the identity to persist.
    pub fn check(&self) -> Result<NewRegistrant, AppError> {
        self.validate()
            .map_err(|e| AppError::validation(format!("Invalid registration: {e}")))?;

        let full_name = self.full_name.trim();
        if full_name.is_empty() {
            return Err(AppError::validation("Full name must not be blank"));
        }
        let phone = self.phone.trim();
        if phone.is_empty() {
            return Err(AppError::validation("Phone must not be blank"));
        }
        let (Some(gender), Some(date_of_birth)) = (self.gender, self.date_of_birth) else {
            return Err(AppError::validation("Gender and date of birth are required"));
        };

        Ok(NewRegistrant {
            full_name: full_name.to_string(),
            date_of_birth,
            gender,
            phone: phone.to_string(),
            email: self.email.clone(),
            locale: self.locale.clone(),
        })
    }
}

/// Validated identity of a registrant about to be created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRegistrant {
    /// Full name.
    pub full_name: String,
    /// Date of birth.
    pub date_of_birth: NaiveDate,
    /// Gender.
    pub gender: Gender,
    /// Contact phone number.
    pub phone: String,
    /// Contact email.
    pub email: Option<String>,
    /// Preferred locale.
    pub locale: Option<String>,
}

impl NewRegistrant {
    /// Materialize the registrant with both resources pending.
    pub fn into_registrant(self, id: RegistrantId, now: DateTime<Utc>) -> Registrant {
        Registrant {
            id,
            full_name: self.full_name,
            date_of_birth: self.date_of_birth,
            gender: self.gender,
            phone: self.phone,
            email: self.email,
            locale: self.locale,
            wing: None,
            room_number: None,
            bed_number: None,
            room_status: AssignmentStatus::Pending,
            tag_number: None,
            tag_status: AssignmentStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Edit of identity fields. Room, tag, and gender are not editable here.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct IdentityUpdate {
    /// New full name.
    #[validate(length(min = 1, max = 200))]
    pub full_name: Option<String>,
    /// New date of birth.
    pub date_of_birth: Option<NaiveDate>,
    /// New phone number.
    #[validate(length(min = 1, max = 32))]
    pub phone: Option<String>,
    /// New email.
    #[validate(email)]
    pub email: Option<String>,
    /// New locale.
    #[validate(length(max = 16))]
    pub locale: Option<String>,
}

impl IdentityUpdate {
    /// Whether the update changes nothing.
    pub fn is_empty(&self) -> bool {
        self.full_name.is_none()
            && self.date_of_birth.is_none()
            && self.phone.is_none()
            && self.email.is_none()
            && self.locale.is_none()
    }

    /// Apply the update to `registrant` in place.
    pub fn apply(&self, registrant: &mut Registrant, now: DateTime<Utc>) {
        if let Some(name) = &self.full_name {
            registrant.full_name = name.trim().to_string();
        }
        if let Some(dob) = self.date_of_birth {
            registrant.date_of_birth = dob;
        }
        if let Some(phone) = &self.phone {
            registrant.phone = phone.trim().to_string();
        }
        if let Some(email) = &self.email {
            registrant.email = Some(email.clone());
        }
        if let Some(locale) = &self.locale {
            registrant.locale = Some(locale.clone());
        }
        registrant.updated_at = now;
    }
}
