// api.rs
use chrono::{DateTime, Utc};
use poem_openapi::{Object, OpenApi, param::{Path, Query}, payload::Json};

use crate::AppState;
use crate::error::AppError;
use crate::store::PostRecord;

#[derive(Object)]
pub struct PostSummary {
    id: i32,
    title: String,
    content: String,
    category: String,
    date_created: DateTime<Utc>,
}

impl From<&PostRecord> for PostSummary {
    fn from(record: &PostRecord) -> Self {
        Self {
            id: record.blog.id,
            title: record.blog.title.clone(),
            content: record.blog.content.clone(),
            category: record.category_name().to_string(),
            date_created: record.blog.date_created,
        }
    }
}

/// Read-only JSON view of the blog.
pub struct Api {
    state: AppState,
}

impl Api {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

#[OpenApi]
impl Api {
    /// Posts, oldest first (paginated)
    #[oai(path = "/posts", method = "get")]
    async fn list_posts(
        &self,
        Query(page): Query<Option<u64>>,
        Query(per_page): Query<Option<u64>>,
    ) -> poem::Result<Json<Vec<PostSummary>>> {
        let page = page.unwrap_or(1).max(1) - 1;
        let per = per_page.unwrap_or(20).clamp(1, 100);
        let rows = self
            .state
            .store
            .list_posts_page(page, per)
            .await
            .map_err(AppError::from)?;
        Ok(Json(rows.iter().map(PostSummary::from).collect()))
    }

    /// Single post
    #[oai(path = "/posts/:id", method = "get")]
    async fn get_post(&self, Path(id): Path<i32>) -> poem::Result<Json<PostSummary>> {
        let post = self.state.store.post(id).await.map_err(AppError::from)?;
        Ok(Json(PostSummary::from(&post)))
    }
}
