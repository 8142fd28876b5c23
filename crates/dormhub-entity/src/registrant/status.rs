//! Room/tag assignment status.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether a registrant holds a resource or is waiting for one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "assignment_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AssignmentStatus {
    /// The resource is held.
    Assigned,
    /// No resource was available; the sweeper will assign one later.
    Pending,
}

impl AssignmentStatus {
    /// Status matching whether a resource was obtained.
    pub fn from_assigned(assigned: bool) -> Self {
        if assigned {
            Self::Assigned
        } else {
            Self::Pending
        }
    }

    /// Return the status as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Assigned => "assigned",
            Self::Pending => "pending",
        }
    }
}

impl fmt::Display for AssignmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
