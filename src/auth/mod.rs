// Authentication module
// Cookie-carried JWT sessions with signup, login, logout and identity lookup

pub mod cookie;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod password;
pub mod repository;
pub mod service;
pub mod token;

// Re-export commonly used types
pub use cookie::{SessionCookie, SESSION_COOKIE_NAME};
pub use error::AuthError;
pub use handlers::{login_handler, logout_handler, me_handler, signup_handler};
pub use middleware::{require_session, AuthenticatedUser, RequireRole};
pub use models::{LoginRequest, Role, SignupRequest, User, UserProfile, UserResponse};
pub use repository::{PgUserRepository, UserStore};
pub use service::{AuthService, IssuedSession};
pub use token::TokenService;
