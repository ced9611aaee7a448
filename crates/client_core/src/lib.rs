use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, Client, Method, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use shared::{
    domain::{Note, NoteId},
    error::ApiError,
    protocol::{
        AuthResponse, Credentials, DataEnvelope, ErrorEnvelope, HealthResponse, NoteDraft,
        NoteUpdate,
    },
};
use tracing::{debug, info, warn};

pub mod board;
pub mod config;
pub mod error;
pub mod forms;
pub mod session;

pub use board::{LoadState, NotesBoard, NotesView};
pub use config::ClientSettings;
pub use error::{ClientError, Result};
pub use forms::{AuthForm, AuthMode, CreatedNote, FormError, NoteForm};
pub use session::{FileTokenStore, MemoryTokenStore, TokenStore};

/// Operations the front ends drive. [`NotesClient`] is the HTTP implementation.
#[async_trait]
pub trait NotesApi: Send + Sync {
    async fn signup(&self, credentials: &Credentials) -> Result<AuthResponse>;
    async fn login(&self, credentials: &Credentials) -> Result<AuthResponse>;
    fn logout(&self) -> Result<()>;
    fn is_authenticated(&self) -> bool;
    async fn list_notes(&self) -> Result<Vec<Note>>;
    async fn get_note(&self, id: NoteId) -> Result<Note>;
    async fn create_note(&self, draft: &NoteDraft) -> Result<Note>;
    async fn update_note(&self, id: NoteId, update: &NoteUpdate) -> Result<Note>;
    async fn delete_note(&self, id: NoteId) -> Result<()>;
    async fn toggle_star(&self, id: NoteId) -> Result<Note>;

    /// Drops the stored token when `err` means the session is gone.
    ///
    /// Returns whether the caller should send the user back to sign-in.
    fn end_session_on_auth_failure(&self, err: &ClientError) -> bool {
        if !err.requires_reauth() {
            return false;
        }
        if let Err(clear_err) = self.logout() {
            warn!("failed to clear session after auth failure: {clear_err}");
        }
        true
    }
}

pub struct NotesClient {
    http: Client,
    base_url: String,
    tokens: Arc<dyn TokenStore>,
}

impl NotesClient {
    pub fn new(base_url: impl Into<String>, tokens: Arc<dyn TokenStore>) -> Self {
        Self {
            http: Client::new(),
            base_url: config::normalize_base_url(&base_url.into()),
            tokens,
        }
    }

    pub fn from_settings(settings: &ClientSettings, tokens: Arc<dyn TokenStore>) -> Result<Self> {
        let http = Client::builder()
            .timeout(settings.request_timeout())
            .build()?;
        Ok(Self {
            http,
            base_url: config::normalize_base_url(&settings.api_base_url),
            tokens,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn token(&self) -> Result<Option<String>> {
        Ok(self.tokens.load()?)
    }

    pub async fn health(&self) -> Result<HealthResponse> {
        let response = self.call(Method::GET, "/health", None).await?;
        decode(response).await
    }

    async fn authenticate(&self, path: &str, credentials: &Credentials) -> Result<AuthResponse> {
        let body = serde_json::to_value(credentials)?;
        let response = self.call(Method::POST, path, Some(body)).await?;
        let auth: AuthResponse = decode(response).await?;
        if !auth.token.is_empty() {
            self.tokens.save(&auth.token)?;
            info!(email = %credentials.email, "session established");
        } else {
            warn!(path, "auth response carried no token");
        }
        Ok(auth)
    }

    fn require_session(&self) -> Result<()> {
        match self.tokens.load()? {
            Some(_) => Ok(()),
            None => Err(ClientError::NotAuthenticated),
        }
    }

    async fn call(&self, method: Method, path: &str, body: Option<Value>) -> Result<Response> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self
            .http
            .request(method.clone(), &url)
            .header(CONTENT_TYPE, "application/json");
        if let Some(token) = self.tokens.load()? {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await?;
        let status = response.status();
        debug!(%method, path, status = status.as_u16(), "api response");
        if status.is_success() {
            return Ok(response);
        }

        let raw = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorEnvelope>(&raw)
            .ok()
            .and_then(|envelope| envelope.error);
        let err = ApiError::from_envelope(status.as_u16(), message);
        warn!(%method, path, status = err.status, "api request failed: {}", err.message);
        Err(err.into())
    }

    async fn data<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<T> {
        let response = self.call(method, path, body).await?;
        let envelope: DataEnvelope<T> = decode(response).await?;
        Ok(envelope.data)
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[async_trait]
impl NotesApi for NotesClient {
    async fn signup(&self, credentials: &Credentials) -> Result<AuthResponse> {
        self.authenticate("/auth/signup", credentials).await
    }

    async fn login(&self, credentials: &Credentials) -> Result<AuthResponse> {
        self.authenticate("/auth/login", credentials).await
    }

    fn logout(&self) -> Result<()> {
        self.tokens.clear()?;
        info!("session cleared");
        Ok(())
    }

    fn is_authenticated(&self) -> bool {
        matches!(self.tokens.load(), Ok(Some(_)))
    }

    async fn list_notes(&self) -> Result<Vec<Note>> {
        self.require_session()?;
        self.data(Method::GET, "/notes", None).await
    }

    async fn get_note(&self, id: NoteId) -> Result<Note> {
        self.require_session()?;
        self.data(Method::GET, &format!("/notes/{id}"), None).await
    }

    async fn create_note(&self, draft: &NoteDraft) -> Result<Note> {
        self.require_session()?;
        let body = serde_json::to_value(draft)?;
        self.data(Method::POST, "/notes", Some(body)).await
    }

    async fn update_note(&self, id: NoteId, update: &NoteUpdate) -> Result<Note> {
        self.require_session()?;
        let body = serde_json::to_value(update)?;
        self.data(Method::PUT, &format!("/notes/{id}"), Some(body))
            .await
    }

    async fn delete_note(&self, id: NoteId) -> Result<()> {
        self.require_session()?;
        self.call(Method::DELETE, &format!("/notes/{id}"), None)
            .await?;
        Ok(())
    }

    async fn toggle_star(&self, id: NoteId) -> Result<Note> {
        self.require_session()?;
        self.data(Method::PATCH, &format!("/notes/{id}/star"), None)
            .await
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
