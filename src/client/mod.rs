// Client-side session layer
// HTTP transport, session state and route guarding for a front end talking to this API

pub mod api;
pub mod guard;
pub mod session;

pub use api::{AuthApi, ClientError, HttpApi, UnauthorizedHook};
pub use guard::{guard, guard_path, login_destination, Access, ClientRoute, GuardDecision};
pub use session::{ActionOutcome, AuthPhase, PendingAction, SessionState, SessionStore};
