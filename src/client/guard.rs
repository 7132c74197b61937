// Route table and access guard for the client views

use crate::client::session::{AuthPhase, SessionState};

pub const LOGIN_PATH: &str = "/login";
pub const DEFAULT_DESTINATION: &str = "/";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    Authenticated,
    Admin,
}

/// Known client views
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientRoute {
    Home,
    Login,
    Signup,
    Dashboard,
    NotFound,
}

impl ClientRoute {
    pub fn resolve(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or(path);
        match path.trim_end_matches('/') {
            "" => ClientRoute::Home,
            "/login" => ClientRoute::Login,
            "/signup" => ClientRoute::Signup,
            "/dashboard" => ClientRoute::Dashboard,
            _ => ClientRoute::NotFound,
        }
    }

    /// The dashboard needs a session, and its content is admin-only
    pub fn access(&self) -> Access {
        match self {
            ClientRoute::Dashboard => Access::Admin,
            _ => Access::Public,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// Session state not settled yet
    Loading,
    /// Send to the login view, remembering where the user was headed
    Redirect { to: &'static str, from: String },
    /// Signed in without the required role
    AccessDenied,
    Render,
}

/// Decide what to show for `location` given the current session
pub fn guard(state: &SessionState, access: Access, location: &str) -> GuardDecision {
    if access == Access::Public {
        return GuardDecision::Render;
    }

    if state.loading || state.phase() == AuthPhase::Unknown {
        return GuardDecision::Loading;
    }

    if !state.is_authenticated() {
        return GuardDecision::Redirect {
            to: LOGIN_PATH,
            from: location.to_string(),
        };
    }

    if access == Access::Admin && !state.is_admin() {
        return GuardDecision::AccessDenied;
    }

    GuardDecision::Render
}

/// Guard a raw path using the route table
pub fn guard_path(state: &SessionState, location: &str) -> GuardDecision {
    guard(state, ClientRoute::resolve(location).access(), location)
}

/// A path on this site: a single leading slash, no scheme or authority
fn is_local_path(path: &str) -> bool {
    path.starts_with('/') && !path.starts_with("//") && !path.starts_with("/\\")
}

/// Where to go after a successful login; anything off-site falls back to `/`
pub fn login_destination(from: Option<&str>) -> String {
    match from {
        Some(path) if is_local_path(path) && ClientRoute::resolve(path) != ClientRoute::Login => {
            path.to_string()
        }
        _ => DEFAULT_DESTINATION.to_string(),
    }
}
