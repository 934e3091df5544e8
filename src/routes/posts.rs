/**
 * Post Routes
 * CRUD endpoints for posts, joined with their category names
 */
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::db::models::{NewPost, PostWithCategory};
use crate::error::{ApiError, MessageResponse};
use crate::state::AppState;

/// `{ "data": ... }` envelope for read responses
#[derive(Debug, Serialize, Deserialize)]
pub struct DataResponse<T> {
    pub data: T,
}

pub type PostListResponse = DataResponse<Vec<PostWithCategory>>;
pub type PostResponse = DataResponse<PostWithCategory>;

/// Path ids that are not integers cannot name a row.
fn parse_post_id(raw: &str) -> Result<i32, ApiError> {
    raw.trim()
        .parse::<i32>()
        .map_err(|_| ApiError::post_not_found(raw))
}

/// GET /posts - List every post with its category name
pub async fn list_posts(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let posts = state
        .posts()
        .list_posts()
        .await
        .map_err(ApiError::database("Server could not read posts because of a database issue"))?;

    Ok((StatusCode::OK, Json(PostListResponse { data: posts })))
}

/// GET /posts/{postId}
pub async fn get_post(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_post_id(&post_id)?;

    let post = state
        .posts()
        .find_post(id)
        .await
        .map_err(ApiError::database("Server could not read post because of a database issue"))?
        .ok_or_else(|| ApiError::post_not_found(id))?;

    Ok((StatusCode::OK, Json(PostResponse { data: post })))
}

/// POST /posts - Body already checked by `require_post_fields`
pub async fn create_post(
    State(state): State<AppState>,
    payload: Result<Json<NewPost>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(payload) = payload?;

    state
        .posts()
        .create_post(&payload)
        .await
        .map_err(ApiError::database("Server could not create post because of a database issue"))?;

    tracing::info!(title = %payload.title, category_id = payload.category_id, "post created");

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("Created post successfully")),
    ))
}

/// PUT /posts/{postId} - Replace every field of an existing post
pub async fn update_post(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
    payload: Result<Json<NewPost>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_post_id(&post_id)?;
    let Json(payload) = payload?;

    let updated = state
        .posts()
        .update_post(id, &payload)
        .await
        .map_err(ApiError::database("Server could not update post because of a database issue"))?;

    if updated == 0 {
        return Err(ApiError::post_not_found(id));
    }

    tracing::info!(post_id = id, "post updated");

    Ok((
        StatusCode::OK,
        Json(MessageResponse::new("Updated post successfully")),
    ))
}

/// DELETE /posts/{postId} - Existence check, then delete. The two statements
/// are not wrapped in a transaction.
pub async fn delete_post(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_post_id(&post_id)?;
    let store = state.posts();
    let on_error = "Server could not delete post because of a database issue";

    if !store
        .post_exists(id)
        .await
        .map_err(ApiError::database(on_error))?
    {
        return Err(ApiError::post_not_found(id));
    }

    let deleted = store
        .delete_post(id)
        .await
        .map_err(ApiError::database(on_error))?;

    // Removed by someone else between the check and the delete
    if deleted == 0 {
        return Err(ApiError::post_not_found(id));
    }

    tracing::info!(post_id = id, "post deleted");

    Ok((
        StatusCode::OK,
        Json(MessageResponse::new("Deleted post successfully")),
    ))
}
