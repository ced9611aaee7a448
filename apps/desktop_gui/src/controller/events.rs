//! Backend-to-UI events and error modeling for the desktop controller.

use client_core::ClientError;
use shared::domain::{Note, NoteId};

#[derive(Debug, Clone)]
pub enum UiEvent {
    Info(String),
    Authenticated { email: String },
    LoggedOut,
    NotesLoaded(Vec<Note>),
    NoteLoaded(Note),
    NoteSaved(Note),
    /// The note was created but the follow-up star request failed.
    CreatedWithoutStar { note: Note, error: UiError },
    NoteDeleted(NoteId),
    StarToggled(Note),
    StarToggleFailed { id: NoteId, error: UiError },
    Error(UiError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    Auth,
    Transport,
    Validation,
    NotFound,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    BackendStartup,
    Login,
    Signup,
    LoadNotes,
    LoadNote,
    SaveNote,
    DeleteNote,
    ToggleStar,
    General,
}

impl UiErrorContext {
    /// Failures here come from the sign-in form itself, so they never end a session.
    pub fn is_sign_in(self) -> bool {
        matches!(self, UiErrorContext::Login | UiErrorContext::Signup)
    }

    /// Whether the failure still matters once the session it belonged to is gone.
    pub fn outlives_session(self) -> bool {
        matches!(
            self,
            UiErrorContext::Login
                | UiErrorContext::Signup
                | UiErrorContext::BackendStartup
                | UiErrorContext::General
        )
    }

    fn fallback(self) -> &'static str {
        match self {
            UiErrorContext::BackendStartup => "Backend worker failed to start",
            UiErrorContext::Login => "Login failed",
            UiErrorContext::Signup => "Sign up failed",
            UiErrorContext::LoadNotes => "Failed to fetch notes",
            UiErrorContext::LoadNote => "Failed to fetch note",
            UiErrorContext::SaveNote => "Failed to save note",
            UiErrorContext::DeleteNote => "Failed to delete note",
            UiErrorContext::ToggleStar => "Failed to update note",
            UiErrorContext::General => "Something went wrong",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiError {
    category: UiErrorCategory,
    context: UiErrorContext,
    message: String,
}

impl UiError {
    pub fn from_client_error(context: UiErrorContext, err: &ClientError) -> Self {
        let category = if err.requires_reauth() {
            UiErrorCategory::Auth
        } else {
            match err {
                ClientError::Validation(_) => UiErrorCategory::Validation,
                ClientError::Transport(_) => UiErrorCategory::Transport,
                ClientError::Api(api) if api.status == 404 => UiErrorCategory::NotFound,
                _ => UiErrorCategory::Unknown,
            }
        };
        let message = match err {
            ClientError::Transport(_) => {
                format!("{}: server unreachable, check the API URL and network", context.fallback())
            }
            ClientError::NotAuthenticated => "Please sign in to continue".to_string(),
            other => {
                let text = other.to_string();
                if text.trim().is_empty() {
                    context.fallback().to_string()
                } else {
                    text
                }
            }
        };
        Self {
            category,
            context,
            message,
        }
    }

    /// Worker failures that happen before any request is made.
    pub fn startup(message: impl Into<String>) -> Self {
        Self {
            category: UiErrorCategory::Unknown,
            context: UiErrorContext::BackendStartup,
            message: message.into(),
        }
    }

    pub fn requires_reauth(&self) -> bool {
        self.category == UiErrorCategory::Auth
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}
