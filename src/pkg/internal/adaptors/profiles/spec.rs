use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Deserialize, Debug, Clone)]
pub struct ProfileEntry {
    pub id: String,
    pub full_name: String,
    pub email: String,
    #[serde(default)]
    pub account_type: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: String,
    pub full_name: String,
    pub email: String,
    pub account_type: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<ProfileEntry> for Profile {
    fn from(row: ProfileEntry) -> Self {
        Profile {
            id: row.id,
            full_name: row.full_name,
            email: row.email,
            account_type: row.account_type.filter(|t| !t.is_empty()),
            created_at: row.created_at,
        }
    }
}

/// The header only needs the name.
#[derive(Deserialize, Debug, Clone)]
pub struct ProfileNameEntry {
    pub full_name: String,
}
