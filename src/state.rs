//! Application state shared across handlers

use std::sync::Arc;

use crate::db::PostStore;

#[derive(Clone)]
pub struct AppState {
    posts: Arc<dyn PostStore>,
}

impl AppState {
    pub fn new(posts: Arc<dyn PostStore>) -> Self {
        Self { posts }
    }

    pub fn posts(&self) -> &dyn PostStore {
        self.posts.as_ref()
    }
}
