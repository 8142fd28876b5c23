//! Gender segregation value shared by rooms and registrants.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Gender of a registrant, and of the room pool a registrant may occupy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(type_name = "gender", rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    /// Male rooms and registrants.
    Male,
    /// Female rooms and registrants.
    Female,
}

impl Gender {
    /// Every gender, in a stable order. Sweeps iterate pools in this order.
    pub const ALL: [Gender; 2] = [Gender::Male, Gender::Female];

    /// Return the gender as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Gender {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "male" | "m" => Ok(Self::Male),
            "female" | "f" => Ok(Self::Female),
            _ => Err(AppError::validation(format!(
                "Invalid gender: '{s}'. Expected one of: male, female"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("Female".parse::<Gender>().expect("parse"), Gender::Female);
        assert_eq!(" M ".parse::<Gender>().expect("parse"), Gender::Male);
        assert!("other".parse::<Gender>().is_err());
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&Gender::Male).expect("serialize");
        assert_eq!(json, "\"male\"");
    }
}
