// Blog posts: public feed plus session-gated create and delete

pub mod handlers;
pub mod models;
pub mod repository;

pub use handlers::{create_post, delete_post, get_posts};
pub use models::{CreatePostRequest, Post, PostAuthor, PostResponse};
pub use repository::{PgPostRepository, PostStore};
