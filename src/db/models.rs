//! Database Models - rows read from and written to the posts tables.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Post joined with the name of its category
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct PostWithCategory {
    pub id: i32,
    pub title: String,
    pub image: String,
    pub category_id: i32,
    pub description: String,
    pub content: String,
    pub status_id: i32,
    pub category: String,
}

/// Post fields for insertion or full replacement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPost {
    pub title: String,
    pub image: String,
    pub category_id: i32,
    pub description: String,
    pub content: String,
    pub status_id: i32,
}
