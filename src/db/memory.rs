//! In-memory stores standing in for Postgres in router tests.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;

use super::models::{NewPost, PostWithCategory};
use super::{DbError, PostStore};

struct Category {
    id: i32,
    name: String,
}

#[derive(Default)]
struct Tables {
    next_id: i32,
    categories: Vec<Category>,
    posts: Vec<(i32, NewPost)>,
}

/// Behaves like the posts/categories tables, including the category foreign key.
#[derive(Default)]
pub struct MemoryPostStore {
    tables: RwLock<Tables>,
    writes: AtomicUsize,
}

impl MemoryPostStore {
    pub fn with_categories(categories: &[(i32, &str)]) -> Self {
        let store = Self::default();
        {
            let mut tables = store.tables.try_write().expect("fresh lock");
            tables.next_id = 1;
            tables.categories = categories
                .iter()
                .map(|(id, name)| Category {
                    id: *id,
                    name: name.to_string(),
                })
                .collect();
        }
        store
    }

    /// Number of insert/update/delete statements that reached the store.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn joined(tables: &Tables, id: i32, post: &NewPost) -> Option<PostWithCategory> {
        let category = tables.categories.iter().find(|c| c.id == post.category_id)?;
        Some(PostWithCategory {
            id,
            title: post.title.clone(),
            image: post.image.clone(),
            category_id: post.category_id,
            description: post.description.clone(),
            content: post.content.clone(),
            status_id: post.status_id,
            category: category.name.clone(),
        })
    }

    fn check_category(tables: &Tables, category_id: i32) -> Result<(), DbError> {
        if tables.categories.iter().any(|c| c.id == category_id) {
            Ok(())
        } else {
            Err(DbError::Query(sqlx::Error::Protocol(format!(
                "insert or update on table \"posts\" violates foreign key constraint: category_id={category_id}"
            ))))
        }
    }
}

#[async_trait]
impl PostStore for MemoryPostStore {
    async fn list_posts(&self) -> Result<Vec<PostWithCategory>, DbError> {
        let tables = self.tables.read().await;
        Ok(tables
            .posts
            .iter()
            .filter_map(|(id, post)| Self::joined(&tables, *id, post))
            .collect())
    }

    async fn find_post(&self, id: i32) -> Result<Option<PostWithCategory>, DbError> {
        let tables = self.tables.read().await;
        Ok(tables
            .posts
            .iter()
            .find(|(post_id, _)| *post_id == id)
            .and_then(|(post_id, post)| Self::joined(&tables, *post_id, post)))
    }

    async fn create_post(&self, post: &NewPost) -> Result<u64, DbError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        let mut tables = self.tables.write().await;
        Self::check_category(&tables, post.category_id)?;
        let id = tables.next_id;
        tables.next_id += 1;
        tables.posts.push((id, post.clone()));
        Ok(1)
    }

    async fn update_post(&self, id: i32, post: &NewPost) -> Result<u64, DbError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        let mut tables = self.tables.write().await;
        Self::check_category(&tables, post.category_id)?;
        match tables.posts.iter_mut().find(|(post_id, _)| *post_id == id) {
            Some((_, existing)) => {
                *existing = post.clone();
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn post_exists(&self, id: i32) -> Result<bool, DbError> {
        let tables = self.tables.read().await;
        Ok(tables.posts.iter().any(|(post_id, _)| *post_id == id))
    }

    async fn delete_post(&self, id: i32) -> Result<u64, DbError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        let mut tables = self.tables.write().await;
        let before = tables.posts.len();
        tables.posts.retain(|(post_id, _)| *post_id != id);
        Ok((before - tables.posts.len()) as u64)
    }
}

/// Every call fails as if the pool could not reach the database.
pub struct UnavailableStore;

fn unavailable<T>() -> Result<T, DbError> {
    Err(DbError::Connection(sqlx::Error::PoolTimedOut))
}

#[async_trait]
impl PostStore for UnavailableStore {
    async fn list_posts(&self) -> Result<Vec<PostWithCategory>, DbError> {
        unavailable()
    }

    async fn find_post(&self, _id: i32) -> Result<Option<PostWithCategory>, DbError> {
        unavailable()
    }

    async fn create_post(&self, _post: &NewPost) -> Result<u64, DbError> {
        unavailable()
    }

    async fn update_post(&self, _id: i32, _post: &NewPost) -> Result<u64, DbError> {
        unavailable()
    }

    async fn post_exists(&self, _id: i32) -> Result<bool, DbError> {
        unavailable()
    }

    async fn delete_post(&self, _id: i32) -> Result<u64, DbError> {
        unavailable()
    }
}
