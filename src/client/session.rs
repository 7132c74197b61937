// Client-side session state
//
// One store per application instance, handed to whoever needs it. Actions are
// spawned as soon as they are issued and cannot be cancelled; a result that
// arrives after the store is gone is dropped.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::task::{Context, Poll};
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::auth::models::{LoginRequest, Role, SignupRequest, UserResponse};
use crate::client::api::{AuthApi, ClientError};

/// Default bound on every auth request
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Shown when the startup probe fails for a reason other than "no session"
pub const SESSION_LOAD_ERROR: &str = "Failed to load user session";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthPhase {
    /// Startup probe has not resolved yet
    Unknown,
    Authenticated,
    Anonymous,
}

/// Snapshot of the session as the UI sees it
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub identity: Option<UserResponse>,
    pub loading: bool,
    pub last_error: Option<String>,
    resolved: bool,
    in_flight: usize,
}

impl SessionState {
    /// A resolved state with no request in flight; `None` is anonymous
    pub fn settled(identity: Option<UserResponse>) -> Self {
        Self {
            identity,
            resolved: true,
            ..Self::default()
        }
    }

    pub fn phase(&self) -> AuthPhase {
        match (&self.identity, self.resolved) {
            (Some(_), _) => AuthPhase::Authenticated,
            (None, true) => AuthPhase::Anonymous,
            (None, false) => AuthPhase::Unknown,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }

    pub fn is_admin(&self) -> bool {
        matches!(&self.identity, Some(user) if user.role == Role::Admin)
    }
}

/// What an issued action ended up doing
#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutcome {
    Success,
    Failed(String),
    /// The store was dropped before the response arrived
    Discarded,
}

/// Handle to an issued action; awaiting it is optional
pub struct PendingAction {
    handle: JoinHandle<ActionOutcome>,
}

impl Future for PendingAction {
    type Output = ActionOutcome;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.handle)
            .poll(cx)
            .map(|joined| joined.unwrap_or(ActionOutcome::Discarded))
    }
}

struct Shared {
    api: Arc<dyn AuthApi>,
    state: Mutex<SessionState>,
    timeout: Duration,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, SessionState> {
        // A panic while holding the lock cannot leave the plain-data state half-written
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn begin(&self, clear_error: bool) {
        let mut state = self.lock();
        state.in_flight += 1;
        state.loading = true;
        if clear_error {
            state.last_error = None;
        }
    }

    fn finish<F>(&self, apply: F) -> ActionOutcome
    where
        F: FnOnce(&mut SessionState) -> ActionOutcome,
    {
        let mut state = self.lock();
        state.in_flight = state.in_flight.saturating_sub(1);
        state.loading = state.in_flight > 0;
        apply(&mut state)
    }
}

/// Owner of the client session state
#[derive(Clone)]
pub struct SessionStore {
    shared: Arc<Shared>,
}

impl SessionStore {
    pub fn new(api: Arc<dyn AuthApi>) -> Self {
        Self::with_timeout(api, DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn with_timeout(api: Arc<dyn AuthApi>, timeout: Duration) -> Self {
        Self {
            shared: Arc::new(Shared {
                api,
                state: Mutex::new(SessionState::default()),
                timeout,
            }),
        }
    }

    pub fn snapshot(&self) -> SessionState {
        self.shared.lock().clone()
    }

    pub fn phase(&self) -> AuthPhase {
        self.shared.lock().phase()
    }

    pub fn clear_error(&self) {
        self.shared.lock().last_error = None;
    }

    /// Startup probe: ask the server who the cookie belongs to.
    /// A 401 simply means "not logged in" and leaves no error behind.
    pub fn initialize(&self) -> PendingAction {
        self.dispatch(false, |api| async move { api.current_user().await }, |state, result| {
            state.resolved = true;
            match result {
                Ok(profile) => {
                    state.identity = Some(profile.into());
                    ActionOutcome::Success
                }
                Err(ClientError::Unauthorized) => {
                    state.identity = None;
                    ActionOutcome::Failed(ClientError::Unauthorized.to_string())
                }
                Err(err) => {
                    tracing::warn!("Session probe failed: {}", err);
                    state.identity = None;
                    state.last_error = Some(SESSION_LOAD_ERROR.to_string());
                    ActionOutcome::Failed(SESSION_LOAD_ERROR.to_string())
                }
            }
        })
    }

    pub fn login(&self, credentials: LoginRequest) -> PendingAction {
        self.dispatch(
            true,
            move |api| async move { api.login(credentials).await },
            record_identity,
        )
    }

    pub fn signup(&self, request: SignupRequest) -> PendingAction {
        self.dispatch(
            true,
            move |api| async move { api.signup(request).await },
            record_identity,
        )
    }

    /// Identity is cleared locally whatever the server says
    pub fn logout(&self) -> PendingAction {
        self.dispatch(true, |api| async move { api.logout().await }, |state, result| {
            state.identity = None;
            state.resolved = true;
            match result {
                Ok(()) => ActionOutcome::Success,
                Err(err) => {
                    let message = err.to_string();
                    state.last_error = Some(message.clone());
                    ActionOutcome::Failed(message)
                }
            }
        })
    }

    fn dispatch<T, C, Fut, A>(&self, clear_error: bool, call: C, apply: A) -> PendingAction
    where
        T: Send + 'static,
        C: FnOnce(Arc<dyn AuthApi>) -> Fut,
        Fut: Future<Output = Result<T, ClientError>> + Send + 'static,
        A: FnOnce(&mut SessionState, Result<T, ClientError>) -> ActionOutcome + Send + 'static,
    {
        self.shared.begin(clear_error);

        let weak: Weak<Shared> = Arc::downgrade(&self.shared);
        let timeout = self.shared.timeout;
        let request = call(self.shared.api.clone());

        let handle = tokio::spawn(async move {
            let result = match tokio::time::timeout(timeout, request).await {
                Ok(result) => result,
                Err(_) => Err(ClientError::Timeout),
            };

            match weak.upgrade() {
                Some(shared) => shared.finish(|state| apply(state, result)),
                None => {
                    tracing::debug!("Session store dropped, discarding response");
                    ActionOutcome::Discarded
                }
            }
        });

        PendingAction { handle }
    }
}

fn record_identity(
    state: &mut SessionState,
    result: Result<UserResponse, ClientError>,
) -> ActionOutcome {
    state.resolved = true;
    match result {
        Ok(user) => {
            state.identity = Some(user);
            state.last_error = None;
            ActionOutcome::Success
        }
        Err(err) => {
            let message = err.to_string();
            state.last_error = Some(message.clone());
            ActionOutcome::Failed(message)
        }
    }
}
