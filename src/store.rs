//! Persistence for posts, categories and users.
//!
//! Every mutating call runs in its own transaction. A transaction that is
//! dropped before `commit` is rolled back by sea-orm, so an early `?` return
//! leaves the database untouched.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, SqlErr, TransactionTrait,
};
use thiserror::Error;

use crate::entities::{blog, category, user};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,
    #[error("record conflicts with an existing one")]
    Conflict,
    #[error("database operation failed")]
    Persistence(#[source] DbErr),
}

impl From<DbErr> for StoreError {
    fn from(err: DbErr) -> Self {
        if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
            StoreError::Conflict
        } else {
            StoreError::Persistence(err)
        }
    }
}

/// A post together with the category it belongs to.
#[derive(Debug, Clone)]
pub struct PostRecord {
    pub blog: blog::Model,
    pub category: Option<category::Model>,
}

impl PostRecord {
    pub fn category_name(&self) -> &str {
        self.category.as_ref().map(|c| c.name.as_str()).unwrap_or("")
    }
}

impl From<(blog::Model, Option<category::Model>)> for PostRecord {
    fn from((blog, category): (blog::Model, Option<category::Model>)) -> Self {
        Self { blog, category }
    }
}

#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub category: String,
}

/// Fields left as `None` keep their stored value.
#[derive(Debug, Clone, Default)]
pub struct PostChanges {
    pub title: Option<String>,
    pub content: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub username: String,
    pub password_hash: String,
}

#[derive(Debug, Clone)]
pub struct ProfileChanges {
    pub name: String,
    pub username: String,
}

#[derive(Clone, Debug)]
pub struct Store {
    db: DatabaseConnection,
}

impl Store {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    pub async fn create_post(&self, input: NewPost) -> Result<blog::Model, StoreError> {
        let txn = self.db.begin().await?;
        let category = category_named(&txn, &input.category).await?;
        let created = blog::ActiveModel {
            title: Set(input.title),
            content: Set(input.content),
            date_created: Set(Utc::now()),
            category_id: Set(category.id),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        txn.commit().await?;

        tracing::info!(post_id = created.id, category_id = category.id, "post created");
        Ok(created)
    }

    pub async fn post(&self, id: i32) -> Result<PostRecord, StoreError> {
        blog::Entity::find_by_id(id)
            .find_also_related(category::Entity)
            .one(&self.db)
            .await?
            .map(PostRecord::from)
            .ok_or(StoreError::NotFound)
    }

    /// Posts in publish order, oldest first.
    pub async fn list_posts(&self) -> Result<Vec<PostRecord>, StoreError> {
        let rows = blog::Entity::find()
            .find_also_related(category::Entity)
            .order_by_asc(blog::Column::DateCreated)
            .order_by_asc(blog::Column::Id)
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(PostRecord::from).collect())
    }

    /// One zero-based page of [`Store::list_posts`]. A page whose offset
    /// does not fit a SQL `BIGINT` lies past the end and is empty.
    pub async fn list_posts_page(
        &self,
        page: u64,
        per_page: u64,
    ) -> Result<Vec<PostRecord>, StoreError> {
        let Some(offset) = page
            .checked_mul(per_page)
            .filter(|offset| i64::try_from(*offset).is_ok())
        else {
            return Ok(Vec::new());
        };
        let rows = blog::Entity::find()
            .find_also_related(category::Entity)
            .order_by_asc(blog::Column::DateCreated)
            .order_by_asc(blog::Column::Id)
            .offset(offset)
            .limit(per_page)
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(PostRecord::from).collect())
    }

    /// Read-then-write without row locking: concurrent edits of the same post
    /// are last-writer-wins.
    pub async fn update_post(
        &self,
        id: i32,
        changes: PostChanges,
    ) -> Result<blog::Model, StoreError> {
        let txn = self.db.begin().await?;
        let found = blog::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(StoreError::NotFound)?;

        let mut am: blog::ActiveModel = found.into();
        if let Some(title) = changes.title {
            am.title = Set(title);
        }
        if let Some(content) = changes.content {
            am.content = Set(content);
        }
        if let Some(name) = changes.category {
            let category = category_named(&txn, &name).await?;
            am.category_id = Set(category.id);
        }
        let updated = am.update(&txn).await?;
        txn.commit().await?;

        tracing::info!(post_id = id, "post updated");
        Ok(updated)
    }

    pub async fn delete_post(&self, id: i32) -> Result<(), StoreError> {
        let txn = self.db.begin().await?;
        let res = blog::Entity::delete_by_id(id).exec(&txn).await?;
        if res.rows_affected == 0 {
            return Err(StoreError::NotFound);
        }
        txn.commit().await?;

        tracing::info!(post_id = id, "post deleted");
        Ok(())
    }

    pub async fn create_user(&self, input: NewUser) -> Result<user::Model, StoreError> {
        let txn = self.db.begin().await?;
        let created = user::ActiveModel {
            name: Set(input.name),
            username: Set(input.username),
            password_hash: Set(input.password_hash),
            avatar: Set(None),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        txn.commit().await?;

        tracing::info!(user_id = created.id, "user created");
        Ok(created)
    }

    pub async fn user(&self, id: i32) -> Result<user::Model, StoreError> {
        user::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(StoreError::NotFound)
    }

    pub async fn user_by_username(
        &self,
        username: &str,
    ) -> Result<Option<user::Model>, StoreError> {
        Ok(user::Entity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await?)
    }

    /// Fails with [`StoreError::Conflict`] when the new handle belongs to
    /// another user.
    pub async fn update_user(
        &self,
        id: i32,
        changes: ProfileChanges,
    ) -> Result<user::Model, StoreError> {
        let txn = self.db.begin().await?;
        let found = user::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(StoreError::NotFound)?;

        if found.username != changes.username {
            let taken = user::Entity::find()
                .filter(user::Column::Username.eq(changes.username.as_str()))
                .one(&txn)
                .await?
                .is_some();
            if taken {
                return Err(StoreError::Conflict);
            }
        }

        let mut am: user::ActiveModel = found.into();
        am.name = Set(changes.name);
        am.username = Set(changes.username);
        let updated = am.update(&txn).await?;
        txn.commit().await?;

        tracing::info!(user_id = id, "profile updated");
        Ok(updated)
    }
}

/// Finds the category with this exact name, creating it when absent.
async fn category_named(
    txn: &DatabaseTransaction,
    name: &str,
) -> Result<category::Model, DbErr> {
    let existing = category::Entity::find()
        .filter(category::Column::Name.eq(name))
        .one(txn)
        .await?;
    if let Some(category) = existing {
        return Ok(category);
    }

    category::ActiveModel {
        name: Set(name.to_owned()),
        ..Default::default()
    }
    .insert(txn)
    .await
}

#[cfg(test)]
mod tests {
    use sea_orm::PaginatorTrait;

    use super::*;
    use crate::config::DatabaseConfig;

    async fn store() -> Store {
        Store::new(crate::db::connect(&DatabaseConfig::in_memory()).await.unwrap())
    }

    fn new_post(title: &str, category: &str) -> NewPost {
        NewPost {
            title: title.to_string(),
            content: "body".to_string(),
            category: category.to_string(),
        }
    }

    fn new_user(username: &str) -> NewUser {
        NewUser {
            name: "Ann".to_string(),
            username: username.to_string(),
            password_hash: "$argon2id$placeholder".to_string(),
        }
    }

    #[tokio::test]
    async fn test_list_posts_in_creation_order() {
        let store = store().await;
        store.create_post(new_post("first", "Tech")).await.unwrap();
        store.create_post(new_post("second", "Life")).await.unwrap();

        let posts = store.list_posts().await.unwrap();
        let titles: Vec<_> = posts.iter().map(|p| p.blog.title.as_str()).collect();
        assert_eq!(titles, ["first", "second"]);
        assert_eq!(posts[0].category_name(), "Tech");
        assert_eq!(posts[1].category_name(), "Life");
    }

    #[tokio::test]
    async fn test_category_is_shared_by_name() {
        let store = store().await;
        let a = store.create_post(new_post("a", "Tech")).await.unwrap();
        let b = store.create_post(new_post("b", "Tech")).await.unwrap();

        assert_eq!(a.category_id, b.category_id);
        let count = category::Entity::find()
            .count(store.connection())
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_update_post_moves_category_and_keeps_other_fields() {
        let store = store().await;
        let created = store.create_post(new_post("old", "Tech")).await.unwrap();

        let updated = store
            .update_post(
                created.id,
                PostChanges {
                    title: Some("new".to_string()),
                    category: Some("News".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.title, "new");
        assert_eq!(updated.content, "body");

        let record = store.post(created.id).await.unwrap();
        assert_eq!(record.category_name(), "News");
    }

    #[tokio::test]
    async fn test_update_missing_post_is_not_found() {
        let store = store().await;
        let err = store
            .update_post(42, PostChanges::default())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound));
    }

    #[tokio::test]
    async fn test_delete_post_removes_it_from_list() {
        let store = store().await;
        let keep = store.create_post(new_post("keep", "Tech")).await.unwrap();
        let gone = store.create_post(new_post("gone", "Tech")).await.unwrap();

        store.delete_post(gone.id).await.unwrap();

        let posts = store.list_posts().await.unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].blog.id, keep.id);
        assert!(matches!(store.post(gone.id).await, Err(StoreError::NotFound)));
    }

    #[tokio::test]
    async fn test_delete_missing_post_is_not_found() {
        let store = store().await;
        let err = store.delete_post(7).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound));
    }

    #[tokio::test]
    async fn test_list_posts_page_slices_in_order() {
        let store = store().await;
        for title in ["a", "b", "c"] {
            store.create_post(new_post(title, "Tech")).await.unwrap();
        }

        let page = store.list_posts_page(1, 2).await.unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].blog.title, "c");
    }

    #[tokio::test]
    async fn test_list_posts_page_far_past_the_end_is_empty() {
        let store = store().await;
        store.create_post(new_post("a", "Tech")).await.unwrap();

        assert!(store.list_posts_page(u64::MAX, 100).await.unwrap().is_empty());
        assert!(store.list_posts_page(u64::MAX / 2, 2).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_username_is_conflict() {
        let store = store().await;
        store.create_user(new_user("ann1")).await.unwrap();

        let err = store.create_user(new_user("ann1")).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict));
        let count = user::Entity::find().count(store.connection()).await.unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_update_user_rejects_taken_handle() {
        let store = store().await;
        let ann = store.create_user(new_user("ann1")).await.unwrap();
        store.create_user(new_user("bob")).await.unwrap();

        let err = store
            .update_user(
                ann.id,
                ProfileChanges {
                    name: "Ann B".to_string(),
                    username: "bob".to_string(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict));
        assert_eq!(store.user(ann.id).await.unwrap().name, "Ann");
    }

    #[tokio::test]
    async fn test_update_user_keeps_own_handle() {
        let store = store().await;
        let ann = store.create_user(new_user("ann1")).await.unwrap();

        let updated = store
            .update_user(
                ann.id,
                ProfileChanges {
                    name: "Annie".to_string(),
                    username: "ann1".to_string(),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "Annie");
        assert_eq!(
            store.user_by_username("ann1").await.unwrap().map(|u| u.id),
            Some(ann.id)
        );
    }
}
