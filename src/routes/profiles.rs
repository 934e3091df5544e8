/**
 * Profile Routes
 * Fixed profile stub, not backed by storage
 */
use axum::{response::IntoResponse, Json};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    pub age: u32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub data: Profile,
}

/// GET /profiles
pub async fn get_profile() -> impl IntoResponse {
    Json(ProfileResponse {
        data: Profile {
            name: "john".to_string(),
            age: 20,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_profile_is_static() {
        let res = get_profile().await.into_response();
        assert_eq!(res.status(), axum::http::StatusCode::OK);

        let body = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value, serde_json::json!({ "data": { "name": "john", "age": 20 } }));
    }
}
