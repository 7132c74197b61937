// Post data models and DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::validation::validate_not_blank;

/// Post database model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub author_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Author fields exposed alongside a post
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PostAuthor {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

/// Post with its author populated
///
/// `author` is `None` when the referenced user no longer resolves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PostResponse {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub author: Option<PostAuthor>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PostResponse {
    pub fn new(post: Post, author: Option<PostAuthor>) -> Self {
        Self {
            id: post.id,
            title: post.title,
            content: post.content,
            author,
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }
}

/// Flat row produced by the posts/users join
#[derive(Debug, FromRow)]
pub struct PostWithAuthorRow {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub author_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub author_name: Option<String>,
    pub author_email: Option<String>,
}

impl From<PostWithAuthorRow> for PostResponse {
    fn from(row: PostWithAuthorRow) -> Self {
        let author = match (row.author_name, row.author_email) {
            (Some(name), Some(email)) => Some(PostAuthor {
                id: row.author_id,
                name,
                email,
            }),
            _ => None,
        };

        Self {
            id: row.id,
            title: row.title,
            content: row.content,
            author,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Data needed to persist a new post
#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub author_id: Uuid,
}

/// Create post request DTO
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreatePostRequest {
    #[validate(custom = "validate_not_blank", length(max = 200))]
    #[schema(example = "Hello, world")]
    pub title: String,
    #[validate(custom = "validate_not_blank")]
    #[schema(example = "First post on the new blog.")]
    pub content: String,
}
