use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

pub const DEFAULT_AUTHOR: &str = "Anonymous";

/// Blog post as stored and returned to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Blog {
    pub id: Uuid,
    pub title: Option<String>,
    pub author: String,
    pub image: Option<String>, // path of the uploaded file, if any
    pub date: Option<String>,  // display date supplied by the client
    pub content: Option<String>,
    #[serde(rename = "user")]
    pub user_id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Fields needed to insert a blog; timestamps and id come from the store.
#[derive(Debug, Clone)]
pub struct NewBlog {
    pub title: Option<String>,
    pub author: String,
    pub image: Option<String>,
    pub date: Option<String>,
    pub content: Option<String>,
    pub user_id: Uuid,
}

pub fn author_or_default(author: Option<String>) -> String {
    author
        .map(|a| a.trim().to_string())
        .filter(|a| !a.is_empty())
        .unwrap_or_else(|| DEFAULT_AUTHOR.to_string())
}
