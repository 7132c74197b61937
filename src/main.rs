use std::sync::Arc;

use axum::http::HeaderValue;
use tracing_subscriber::EnvFilter;

use blog_api::{
    auth::{AuthService, PgUserRepository, SessionCookie, TokenService, UserStore},
    config::Config,
    create_router, db,
    posts::{PgPostRepository, PostStore},
    store::InMemoryStore,
    AppState,
};

#[tokio::main]
async fn main() {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("blog_api=debug,tower_http=info")),
        )
        .with_target(false)
        .with_level(true)
        .init();

    tracing::info!("Blog API - Starting...");

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    let client_origin = match HeaderValue::from_str(&config.client_origin) {
        Ok(origin) => origin,
        Err(_) => {
            tracing::error!("CLIENT_ORIGIN is not a valid header value: {}", config.client_origin);
            std::process::exit(1);
        }
    };

    let (users, posts): (Arc<dyn UserStore>, Arc<dyn PostStore>) = match &config.database_url {
        Some(database_url) => {
            tracing::info!("Connecting to database...");
            let pool = db::create_pool(database_url)
                .await
                .expect("Failed to create database pool");

            db::run_migrations(&pool)
                .await
                .expect("Failed to run database migrations");

            let users: Arc<dyn UserStore> = Arc::new(PgUserRepository::new(pool.clone()));
            let posts: Arc<dyn PostStore> = Arc::new(PgPostRepository::new(pool));
            (users, posts)
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory store; data is lost on restart");
            let store = Arc::new(InMemoryStore::new());
            let users: Arc<dyn UserStore> = store.clone();
            let posts: Arc<dyn PostStore> = store;
            (users, posts)
        }
    };

    let auth = AuthService::new(users, TokenService::new(&config.jwt_secret));
    // Cookie lifetime follows the token lifetime
    let cookies = SessionCookie::new(auth.tokens().ttl_secs(), config.cookie_secure);

    let state = AppState {
        auth: Arc::new(auth),
        posts,
        cookies,
        delete_policy: config.delete_policy,
    };

    tracing::info!("Post delete policy: {:?}", config.delete_policy);

    let app = create_router(state, client_origin);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Blog API is running on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui", addr);

    axum::serve(listener, app).await.expect("Server error");
}
