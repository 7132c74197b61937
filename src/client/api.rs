// HTTP transport used by the client-side session layer

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;
use uuid::Uuid;

use crate::auth::models::{LoginRequest, MessageResponse, SignupRequest, UserProfile, UserResponse};
use crate::error::ErrorResponse;
use crate::posts::models::{CreatePostRequest, PostResponse};

/// Client-side request failures
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClientError {
    /// The server rejected the session (401)
    #[error("Unauthorized")]
    Unauthorized,

    /// Any other non-success response; `message` is the server's `error` field
    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("Request timed out")]
    Timeout,

    #[error("Network error: {0}")]
    Transport(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClientError::Timeout
        } else {
            ClientError::Transport(err.to_string())
        }
    }
}

/// Auth endpoints as seen by the session store
#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn login(&self, credentials: LoginRequest) -> Result<UserResponse, ClientError>;

    async fn signup(&self, request: SignupRequest) -> Result<UserResponse, ClientError>;

    async fn logout(&self) -> Result<(), ClientError>;

    /// Identity behind the current session cookie
    async fn current_user(&self) -> Result<UserProfile, ClientError>;
}

/// Callback run when a non-auth endpoint answers 401
pub type UnauthorizedHook = Arc<dyn Fn() + Send + Sync>;

/// reqwest-backed API client
///
/// The session cookie lives only in the client's cookie jar; it is never
/// read into application state.
#[derive(Clone)]
pub struct HttpApi {
    client: Client,
    base_url: String,
    on_unauthorized: Option<UnauthorizedHook>,
}

impl HttpApi {
    /// `base_url` is the API root, e.g. `http://localhost:5000/api`
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let client = Client::builder().cookie_store(true).build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            on_unauthorized: None,
        })
    }

    /// Install the global "session lost" handler, typically a redirect to the login view
    pub fn with_unauthorized_hook(mut self, hook: UnauthorizedHook) -> Self {
        self.on_unauthorized = Some(hook);
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn get_posts(&self) -> Result<Vec<PostResponse>, ClientError> {
        self.send(self.client.get(self.url("/posts/get/posts")), true).await
    }

    pub async fn create_post(&self, request: &CreatePostRequest) -> Result<PostResponse, ClientError> {
        self.send(self.client.post(self.url("/posts/create/posts")).json(request), true)
            .await
    }

    pub async fn delete_post(&self, id: Uuid) -> Result<MessageResponse, ClientError> {
        self.send(self.client.delete(self.url(&format!("/posts/{}", id))), true)
            .await
    }

    /// Send a request and decode the JSON body.
    /// `intercept` marks non-auth endpoints whose 401 triggers the hook.
    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        intercept: bool,
    ) -> Result<T, ClientError> {
        let response = request.send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response.json::<T>().await?);
        }

        if status == StatusCode::UNAUTHORIZED {
            if intercept {
                if let Some(hook) = &self.on_unauthorized {
                    tracing::debug!("Session rejected by API, running unauthorized hook");
                    hook();
                }
            }
            return Err(ClientError::Unauthorized);
        }

        let message = match response.json::<ErrorResponse>().await {
            Ok(body) => body.error,
            Err(_) => status
                .canonical_reason()
                .unwrap_or("Request failed")
                .to_string(),
        };

        Err(ClientError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl AuthApi for HttpApi {
    async fn login(&self, credentials: LoginRequest) -> Result<UserResponse, ClientError> {
        self.send(self.client.post(self.url("/auth/login")).json(&credentials), false)
            .await
    }

    async fn signup(&self, request: SignupRequest) -> Result<UserResponse, ClientError> {
        self.send(self.client.post(self.url("/auth/signup")).json(&request), false)
            .await
    }

    async fn logout(&self) -> Result<(), ClientError> {
        let _: MessageResponse = self
            .send(self.client.post(self.url("/auth/logout")), false)
            .await?;
        Ok(())
    }

    async fn current_user(&self) -> Result<UserProfile, ClientError> {
        self.send(self.client.get(self.url("/auth/get")), false).await
    }
}
