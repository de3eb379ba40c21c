use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Deserialize, Debug, Clone)]
pub struct PostEntry {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub company: String,
    #[serde(alias = "location")]
    pub area: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub experience: f64,
    #[serde(default)]
    pub requires_apartment: bool,
    pub posted_at: DateTime<Utc>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub company: String,
    pub area: String,
    pub description: String,
    pub experience: f64,
    pub requires_apartment: bool,
    pub posted_at: DateTime<Utc>,
}

impl From<PostEntry> for Post {
    fn from(row: PostEntry) -> Self {
        Post {
            id: row.id,
            title: row.title,
            company: row.company,
            area: row.area.trim().to_string(),
            description: row.description,
            experience: row.experience,
            requires_apartment: row.requires_apartment,
            posted_at: row.posted_at,
        }
    }
}
