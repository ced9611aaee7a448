use shared::{
    domain::{Note, NoteColor, NoteId, NoteStatus},
    protocol::{Credentials, NoteDraft, NoteUpdate},
    validation::{self, CredentialErrors},
};
use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    error::{ClientError, Result},
    NotesApi,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AuthMode {
    #[default]
    Login,
    Signup,
}

/// Email/password fields of the login or sign-up tab.
#[derive(Debug, Clone, Default)]
pub struct AuthForm {
    pub email: String,
    pub password: String,
    pub errors: CredentialErrors,
}

impl AuthForm {
    /// Validates the fields, recording inline errors on failure.
    pub fn submit(&mut self) -> Option<Credentials> {
        match validation::validate_credentials(&self.email, &self.password) {
            Ok(credentials) => {
                self.errors = CredentialErrors::default();
                Some(credentials)
            }
            Err(errors) => {
                self.errors = errors;
                None
            }
        }
    }

    pub fn reset_errors(&mut self) {
        self.errors = CredentialErrors::default();
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("Title is required")]
    TitleRequired,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteForm {
    pub title: String,
    pub content: String,
    pub color: NoteColor,
    pub status: NoteStatus,
    pub starred: bool,
}

impl NoteForm {
    pub fn from_note(note: &Note) -> Self {
        Self {
            title: note.title.clone(),
            content: note.content.clone(),
            color: note.color,
            status: note.status,
            starred: note.starred,
        }
    }

    pub fn can_submit(&self) -> bool {
        validation::is_valid_title(&self.title)
    }

    pub fn to_draft(&self) -> Result<NoteDraft, FormError> {
        if !self.can_submit() {
            return Err(FormError::TitleRequired);
        }
        Ok(NoteDraft {
            title: self.title.trim().to_string(),
            content: self.content.trim().to_string(),
            color: self.color,
            status: self.status,
        })
    }

    pub fn to_update(&self) -> Result<NoteUpdate, FormError> {
        let draft = self.to_draft()?;
        Ok(NoteUpdate {
            title: draft.title,
            content: draft.content,
            color: draft.color,
            status: draft.status,
            starred: Some(self.starred),
        })
    }
}

/// Result of [`create_from_form`]. The note exists on the server even when `star_error` is set.
#[derive(Debug)]
pub struct CreatedNote {
    pub note: Note,
    pub star_error: Option<ClientError>,
}

/// Creates the note, then stars it when the form asked for that.
///
/// Only validation and the create call itself fail the operation; a failed star
/// step is reported alongside the created note so callers never submit it twice.
pub async fn create_from_form<A>(api: &A, form: &NoteForm) -> Result<CreatedNote>
where
    A: NotesApi + ?Sized,
{
    let draft = form.to_draft()?;
    let note = api.create_note(&draft).await?;
    if !form.starred || note.starred {
        return Ok(CreatedNote {
            note,
            star_error: None,
        });
    }

    debug!(note_id = note.id.0, "starring newly created note");
    match api.toggle_star(note.id).await {
        Ok(starred) => Ok(CreatedNote {
            note: starred,
            star_error: None,
        }),
        Err(err) => {
            warn!(note_id = note.id.0, "note created but starring failed: {err}");
            Ok(CreatedNote {
                note,
                star_error: Some(err),
            })
        }
    }
}

pub async fn save_from_form<A>(api: &A, id: NoteId, form: &NoteForm) -> Result<Note>
where
    A: NotesApi + ?Sized,
{
    let update = form.to_update()?;
    api.update_note(id, &update).await
}

#[cfg(test)]
#[path = "tests/forms_tests.rs"]
mod tests;
