use shared::{error::ApiError, validation::CredentialErrors};
use thiserror::Error;

use crate::forms::FormError;

pub type Result<T, E = ClientError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("not signed in")]
    NotAuthenticated,
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("token storage failed: {0}")]
    TokenStore(#[from] std::io::Error),
}

impl ClientError {
    /// True when the stored session is unusable and the user has to sign in again.
    pub fn requires_reauth(&self) -> bool {
        match self {
            ClientError::NotAuthenticated => true,
            ClientError::Api(err) => err.requires_reauth(),
            _ => false,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api(err) => Some(err.status),
            ClientError::Transport(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

impl From<FormError> for ClientError {
    fn from(value: FormError) -> Self {
        ClientError::Validation(value.to_string())
    }
}

impl From<CredentialErrors> for ClientError {
    fn from(value: CredentialErrors) -> Self {
        ClientError::Validation(value.to_string())
    }
}
