use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::posts::models::{NewPost, Post, PostResponse, PostWithAuthorRow};
use crate::store::StoreError;

/// Operations the post endpoints need from the document store
#[async_trait]
pub trait PostStore: Send + Sync {
    /// All posts in insertion order, with author name and email populated
    async fn list_with_authors(&self) -> Result<Vec<PostResponse>, StoreError>;

    async fn insert(&self, post: NewPost) -> Result<Post, StoreError>;

    /// Returns whether a post was removed
    async fn delete_by_id(&self, id: Uuid) -> Result<bool, StoreError>;
}

/// Postgres-backed post repository
#[derive(Clone)]
pub struct PgPostRepository {
    pool: PgPool,
}

impl PgPostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PostStore for PgPostRepository {
    async fn list_with_authors(&self) -> Result<Vec<PostResponse>, StoreError> {
        let rows = sqlx::query_as::<_, PostWithAuthorRow>(
            r#"
            SELECT p.id, p.title, p.content, p.author_id, p.created_at, p.updated_at,
                   u.name AS author_name, u.email AS author_email
            FROM posts p
            LEFT JOIN users u ON u.id = p.author_id
            ORDER BY p.created_at, p.id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(PostResponse::from).collect())
    }

    async fn insert(&self, post: NewPost) -> Result<Post, StoreError> {
        let post = sqlx::query_as::<_, Post>(
            r#"
            INSERT INTO posts (id, title, content, author_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, title, content, author_id, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&post.title)
        .bind(&post.content)
        .bind(post.author_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(post)
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
