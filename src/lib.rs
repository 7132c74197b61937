pub mod auth;
pub mod client;
pub mod config;
pub mod db;
pub mod error;
pub mod posts;
pub mod store;
pub mod validation;

use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    response::Json,
    routing::{delete, get, post},
    Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use auth::{AuthService, SessionCookie};
use config::DeletePolicy;
use posts::PostStore;

/// OpenAPI documentation structure
#[derive(OpenApi)]
#[openapi(
    paths(
        auth::handlers::signup_handler,
        auth::handlers::login_handler,
        auth::handlers::logout_handler,
        auth::handlers::me_handler,
        posts::handlers::get_posts,
        posts::handlers::create_post,
        posts::handlers::delete_post,
    ),
    components(
        schemas(
            auth::models::SignupRequest,
            auth::models::LoginRequest,
            auth::models::UserResponse,
            auth::models::UserProfile,
            auth::models::Role,
            auth::models::MessageResponse,
            posts::models::CreatePostRequest,
            posts::models::PostResponse,
            posts::models::PostAuthor,
            error::ErrorResponse,
        )
    ),
    tags(
        (name = "auth", description = "Signup, login, logout and session identity"),
        (name = "posts", description = "Blog post endpoints")
    ),
    info(
        title = "Blog API",
        version = "1.0.0",
        description = "Minimal blog backend with cookie-carried JWT sessions"
    )
)]
pub struct ApiDoc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub posts: Arc<dyn PostStore>,
    pub cookies: SessionCookie,
    pub delete_policy: DeletePolicy,
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Creates and configures the application router
///
/// Session-gated routes sit behind `require_session`; everything else is public.
/// CORS allows credentials for the single configured client origin.
pub fn create_router(state: AppState, client_origin: HeaderValue) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(client_origin)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true);

    let protected = Router::new()
        .route("/api/auth/get", get(auth::me_handler))
        .route("/api/posts/create/posts", post(posts::create_post))
        .route("/api/posts/:id", delete(posts::delete_post))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_session,
        ));

    let public = Router::new()
        .route("/api/auth/signup", post(auth::signup_handler))
        .route("/api/auth/login", post(auth::login_handler))
        .route("/api/auth/logout", post(auth::logout_handler))
        .route("/api/posts/get/posts", get(posts::get_posts))
        .route("/health", get(health));

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public)
        .merge(protected)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::auth::TokenService;
    use crate::store::InMemoryStore;

    pub const TEST_SECRET: &str = "test_secret_key_for_sessions";

    pub fn test_state() -> AppState {
        test_state_with_policy(DeletePolicy::default())
    }

    /// In-memory state; one store backs both users and posts so authors resolve
    pub fn test_state_with_policy(delete_policy: DeletePolicy) -> AppState {
        let store = Arc::new(InMemoryStore::new());
        let auth = AuthService::new(store.clone(), TokenService::new(TEST_SECRET));
        let cookies = SessionCookie::new(auth.tokens().ttl_secs(), false);

        AppState {
            auth: Arc::new(auth),
            posts: store,
            cookies,
            delete_policy,
        }
    }
}
