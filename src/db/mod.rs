pub mod models;

#[cfg(test)]
pub mod memory;

use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use thiserror::Error;

use models::{NewPost, PostWithCategory};

const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 5;

const SELECT_POSTS: &str = r#"
    SELECT posts.id, posts.title, posts.image, posts.category_id,
           posts.description, posts.content, posts.status_id,
           categories.name AS category
    FROM posts
    INNER JOIN categories ON posts.category_id = categories.id
"#;

#[derive(Debug, Clone)]
pub struct DbConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

impl DbConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            acquire_timeout: Duration::from_secs(DEFAULT_ACQUIRE_TIMEOUT_SECS),
        }
    }
}

#[derive(Debug, Error)]
pub enum DbError {
    /// The pool could not hand out a working connection.
    #[error("database connection failed: {0}")]
    Connection(#[source] sqlx::Error),

    /// A statement reached the server and failed there.
    #[error("query failed: {0}")]
    Query(#[source] sqlx::Error),
}

impl From<sqlx::Error> for DbError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_) => DbError::Connection(e),
            _ => DbError::Query(e),
        }
    }
}

/// Persistence operations behind the `/posts` routes.
#[async_trait]
pub trait PostStore: Send + Sync {
    /// All posts with their category names, in storage order.
    async fn list_posts(&self) -> Result<Vec<PostWithCategory>, DbError>;

    async fn find_post(&self, id: i32) -> Result<Option<PostWithCategory>, DbError>;

    /// Returns the number of inserted rows.
    async fn create_post(&self, post: &NewPost) -> Result<u64, DbError>;

    /// Replaces every field of post `id`. Returns the number of updated rows.
    async fn update_post(&self, id: i32, post: &NewPost) -> Result<u64, DbError>;

    async fn post_exists(&self, id: i32) -> Result<bool, DbError>;

    /// Returns the number of deleted rows.
    async fn delete_post(&self, id: i32) -> Result<u64, DbError>;
}

/// Build the process-wide pool. Connections are opened on first use, so an
/// unreachable database does not block startup.
pub fn init_pool(config: &DbConfig) -> Result<PgPool, sqlx::Error> {
    tracing::info!("Initializing database connection pool...");
    tracing::debug!(
        max_connections = config.max_connections,
        acquire_timeout_secs = config.acquire_timeout.as_secs(),
        "pool options"
    );

    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout)
        .connect_lazy(&config.url)
}

/// Round-trip a trivial statement to confirm the database is reachable.
pub async fn ping(pool: &PgPool) -> Result<(), DbError> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Postgres-backed post store.
#[derive(Debug, Clone)]
pub struct PgPostStore {
    pool: PgPool,
}

impl PgPostStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl PostStore for PgPostStore {
    async fn list_posts(&self) -> Result<Vec<PostWithCategory>, DbError> {
        let posts = sqlx::query_as::<_, PostWithCategory>(SELECT_POSTS)
            .fetch_all(&self.pool)
            .await?;
        Ok(posts)
    }

    async fn find_post(&self, id: i32) -> Result<Option<PostWithCategory>, DbError> {
        let sql = format!("{SELECT_POSTS} WHERE posts.id = $1");
        let post = sqlx::query_as::<_, PostWithCategory>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(post)
    }

    async fn create_post(&self, post: &NewPost) -> Result<u64, DbError> {
        let result = sqlx::query(
            r#"
            INSERT INTO posts (title, image, category_id, description, content, status_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(&post.title)
        .bind(&post.image)
        .bind(post.category_id)
        .bind(&post.description)
        .bind(&post.content)
        .bind(post.status_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn update_post(&self, id: i32, post: &NewPost) -> Result<u64, DbError> {
        let result = sqlx::query(
            r#"
            UPDATE posts
            SET title = $2, image = $3, category_id = $4,
                description = $5, content = $6, status_id = $7
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&post.title)
        .bind(&post.image)
        .bind(post.category_id)
        .bind(&post.description)
        .bind(&post.content)
        .bind(post.status_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn post_exists(&self, id: i32) -> Result<bool, DbError> {
        let row: Option<(i32,)> = sqlx::query_as("SELECT id FROM posts WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }

    async fn delete_post(&self, id: i32) -> Result<u64, DbError> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
