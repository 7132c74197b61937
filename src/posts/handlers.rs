// HTTP handlers for post endpoints

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::auth::{middleware::RequireRole, models::MessageResponse, AuthenticatedUser};
use crate::config::DeletePolicy;
use crate::error::{ApiError, ErrorResponse};
use crate::posts::models::{CreatePostRequest, NewPost, PostAuthor, PostResponse};
use crate::AppState;

/// List all posts with author name and email
#[utoipa::path(
    get,
    path = "/api/posts/get/posts",
    responses(
        (status = 200, description = "All posts", body = Vec<PostResponse>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "posts"
)]
pub async fn get_posts(State(state): State<AppState>) -> Result<Json<Vec<PostResponse>>, ApiError> {
    let posts = state.posts.list_with_authors().await?;
    tracing::debug!("Retrieved {} posts", posts.len());
    Ok(Json(posts))
}

/// Create a post authored by the session user
#[utoipa::path(
    post,
    path = "/api/posts/create/posts",
    request_body = CreatePostRequest,
    responses(
        (status = 201, description = "Post created", body = PostResponse),
        (status = 400, description = "Invalid post data", body = ErrorResponse),
        (status = 401, description = "No valid session", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "posts"
)]
pub async fn create_post(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    payload: Result<Json<CreatePostRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<PostResponse>), ApiError> {
    let Json(payload) = payload?;
    payload.validate()?;

    let post = state
        .posts
        .insert(NewPost {
            title: payload.title,
            content: payload.content,
            author_id: user.id,
        })
        .await?;

    tracing::info!("User {} created post {}", user.id, post.id);

    let author = PostAuthor {
        id: user.id,
        name: user.name,
        email: user.email,
    };
    Ok((StatusCode::CREATED, Json(PostResponse::new(post, Some(author)))))
}

/// Delete a post by id
///
/// Under the default policy any authenticated user may delete any post;
/// `DeletePolicy::AdminOnly` additionally requires the admin role.
#[utoipa::path(
    delete,
    path = "/api/posts/{id}",
    params(
        ("id" = String, Path, description = "Post id")
    ),
    responses(
        (status = 200, description = "Post deleted", body = MessageResponse),
        (status = 401, description = "No valid session", body = ErrorResponse),
        (status = 403, description = "Admin role required (admin-only policy)", body = ErrorResponse),
        (status = 404, description = "Post not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "posts"
)]
pub async fn delete_post(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    if state.delete_policy == DeletePolicy::AdminOnly {
        RequireRole::admin().check(&user)?;
    }

    // An id that is not a UUID cannot name a stored post
    let id = Uuid::parse_str(&id).map_err(|_| ApiError::NotFound("Post"))?;

    if !state.posts.delete_by_id(id).await? {
        return Err(ApiError::NotFound("Post"));
    }

    tracing::info!("User {} ({}) deleted post {}", user.id, user.role, id);

    Ok(Json(MessageResponse::new("Post deleted successfully")))
}
